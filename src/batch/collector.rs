//! # 文件收集器
//!
//! 根据输入路径和文件名正则收集待处理文件列表。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 正则匹配文件名（默认 `^bestsqs-\d+\.out$`）
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/sro.rs` 调用
//! - 使用 `walkdir` 遍历目录
//! - 使用 `regex` 匹配文件名

use crate::error::{Result, SqsroError};

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// bestsqs 输出文件的默认匹配模式
pub const DEFAULT_PATTERN: &str = r"^bestsqs-\d+\.out$";

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 文件名匹配正则
    pattern: Regex,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            pattern: Regex::new(DEFAULT_PATTERN).expect("default pattern is valid"),
            recursive: false,
        }
    }

    /// 设置文件名匹配正则
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = Regex::new(pattern).map_err(|e| SqsroError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// 检查文件名是否匹配
    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.pattern.is_match(name))
            .unwrap_or(false)
    }
}
