//! # 统一错误处理模块
//!
//! 定义 sqsro 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::fmt;
use thiserror::Error;

/// 单个文件分析流程的阶段，用于定位失败位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Build,
    NeighborSearch,
    SroCompute,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parse => write!(f, "parse"),
            Stage::Build => write!(f, "build"),
            Stage::NeighborSearch => write!(f, "neighbor-search"),
            Stage::SroCompute => write!(f, "sro-compute"),
            Stage::Export => write!(f, "export"),
        }
    }
}

/// sqsro 统一错误类型
#[derive(Error, Debug)]
pub enum SqsroError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Malformed structure file: {path}\nReason: {reason}")]
    MalformedStructureFile { path: String, reason: String },

    #[error("Unknown element symbol: '{0}'")]
    UnknownElement(String),

    #[error("Invalid structure format: {0}")]
    InvalidFormat(String),

    // ─────────────────────────────────────────────────────────────
    // SRO 计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Random-mixing baseline is zero for pair {pair} at shell {shell} (cutoff {cutoff} Å)")]
    DivisionByZeroInSro {
        pair: String,
        shell: usize,
        cutoff: f64,
    },

    #[error("No element pair could be evaluated ({skipped} skipped)")]
    NoPairsEvaluated { skipped: usize },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("{path}: {stage} stage failed: {source}")]
    AnalysisFailed {
        path: String,
        stage: Stage,
        #[source]
        source: Box<SqsroError>,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

impl SqsroError {
    /// 附加文件路径和失败阶段信息
    pub fn at_stage(self, path: impl Into<String>, stage: Stage) -> Self {
        SqsroError::AnalysisFailed {
            path: path.into(),
            stage,
            source: Box::new(self),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SqsroError>;
