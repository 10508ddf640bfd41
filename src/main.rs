//! # sqsro - SQS 短程有序分析工具
//!
//! 读取 ATAT `mcsqs` 生成的 bestsqs.out 结构，计算 Warren–Cowley
//! 短程有序参数，并可批量汇总或转换为 POSCAR。
//!
//! ## 子命令
//! - `sro`     - 计算各壳层及加权平均 SRO（单文件或目录批量）
//! - `convert` - bestsqs.out -> POSCAR
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (bestsqs.out 解析, POSCAR 导出)
//!   │     ├── models/    (元素表, 周期结构)
//!   │     ├── sro/       (近邻搜索, SRO 计算, 结果导出)
//!   │     └── batch/     (文件收集, 并行执行)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod sro;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
