//! # 解析器模块
//!
//! 提供 SQS 结构文件解析和 POSCAR 导出。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: sqs, poscar

pub mod poscar;
pub mod sqs;

use std::path::Path;

/// 由文件名推断结构名称，如 `bestsqs-7.out` -> `bestsqs-7`
pub fn structure_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('.').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
