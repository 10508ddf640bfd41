//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `sro`: 计算 Warren–Cowley 短程有序参数（单文件或批量目录）
//! - `convert`: bestsqs.out -> POSCAR
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: sro, convert

pub mod convert;
pub mod sro;

use clap::{Parser, Subcommand};

/// sqsro - SQS 短程有序分析工具
#[derive(Parser)]
#[command(name = "sqsro")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Warren-Cowley short-range order analysis for SQS structures", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compute Warren-Cowley SRO parameters for bestsqs.out files
    Sro(sro::SroArgs),

    /// Convert bestsqs.out files to VASP POSCAR
    Convert(convert::ConvertArgs),
}
