//! # 美化输出工具
//!
//! 提供统一的终端输出样式。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 失败列表最多显示的条目数
const MAX_LISTED_FAILURES: usize = 10;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印转换成功消息
pub fn print_conversion(from: &str, to: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        from.dimmed(),
        "->".cyan(),
        to
    );
}

/// 打印计算参数：缩放因子、截断半径与权重
pub fn print_sro_settings(scale: f64, cutoffs: &[f64], weights: &[f64]) {
    let join = |xs: &[f64]| {
        xs.iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("  {:<10} {} Å", "scale".dimmed(), scale);
    println!("  {:<10} [{}] Å", "cutoffs".dimmed(), join(cutoffs));
    println!("  {:<10} [{}]", "weights".dimmed(), join(weights));
}

/// 打印失败文件列表，超过上限时只显示前几条
pub fn print_failures(failures: &[(String, String)]) {
    if failures.is_empty() {
        return;
    }
    print_warning("Failed files:");
    for (path, err) in failures.iter().take(MAX_LISTED_FAILURES) {
        print_error(&format!("  {}: {}", path, err));
    }
    if failures.len() > MAX_LISTED_FAILURES {
        print_warning(&format!(
            "  ... and {} more",
            failures.len() - MAX_LISTED_FAILURES
        ));
    }
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
