//! # sro 子命令 CLI 定义
//!
//! 计算 SQS 结构的 Warren–Cowley 短程有序参数。
//! 输入可以是单个 bestsqs.out 文件，也可以是包含多个文件的目录。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sro.rs`

use crate::batch::collector::DEFAULT_PATTERN;
use crate::sro::SroConfig;

use clap::Args;
use std::path::PathBuf;

/// sro 子命令参数
#[derive(Args, Debug)]
pub struct SroArgs {
    /// Input: bestsqs.out file or directory containing them
    pub input: PathBuf,

    /// Lattice constant used to scale lattice vectors and positions (Å)
    #[arg(short, long, env = "SQSRO_SCALE", default_value_t = 3.13275)]
    pub scale: f64,

    /// Neighbor-shell cutoff radii in Å, comma separated (shell 0 = smallest)
    #[arg(
        short,
        long,
        env = "SQSRO_CUTOFFS",
        value_delimiter = ',',
        default_value = "2.9229,3.7816"
    )]
    pub cutoffs: Vec<f64>,

    /// Shell weights for the averaged SRO, comma separated (same length as cutoffs)
    #[arg(
        short,
        long,
        env = "SQSRO_WEIGHTS",
        value_delimiter = ',',
        default_value = "8,6"
    )]
    pub weights: Vec<f64>,

    /// Restrict element pairs to these elements, comma separated (e.g. "Nb,Ta")
    #[arg(short, long, env = "SQSRO_ELEMENTS", value_delimiter = ',')]
    pub elements: Option<Vec<String>>,

    /// JSON report path (batch mode default: results.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a CSV table of all SRO values
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write "AB v0 v1 ... avg" text lines (single file mode)
    #[arg(long)]
    pub sro_out: Option<PathBuf>,

    /// Write <file>.POSCAR next to each analysed structure (off by default; use `convert` for POSCAR-only runs)
    #[arg(long, default_value_t = false)]
    pub write_poscar: bool,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Regex for input file names (batch mode)
    #[arg(long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,
}

impl SroArgs {
    /// 提取计算配置
    pub fn config(&self) -> SroConfig {
        SroConfig {
            scale: self.scale,
            cutoffs: self.cutoffs.clone(),
            weights: self.weights.clone(),
            elements: self.elements.clone(),
        }
    }
}
