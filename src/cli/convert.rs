//! # convert 子命令 CLI 定义
//!
//! 将 bestsqs.out 转换为 VASP POSCAR
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use crate::batch::collector::DEFAULT_PATTERN;

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input: bestsqs.out file or directory containing them
    pub input: PathBuf,

    /// Lattice constant used to scale lattice vectors and positions (Å)
    #[arg(short, long, env = "SQSRO_SCALE", default_value_t = 3.13275)]
    pub scale: f64,

    /// Regex for input file names
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
