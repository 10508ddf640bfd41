//! # ATAT bestsqs.out 格式解析器
//!
//! 解析 `mcsqs` 输出的 SQS 结构文件。
//!
//! ## bestsqs.out 格式说明
//! ```text
//! b11 b12 b13            # 坐标系基矢 (3 行)
//! b21 b22 b23
//! b31 b32 b33
//! a1 a2 a3               # 超胞晶格向量 (3 行)
//! b1 b2 b3
//! c1 c2 c3
//! x y z Element          # 原子坐标与元素，其余行
//! ...
//! ```
//!
//! 少于 4 个字段的行（如结尾空行）直接跳过。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 和 `commands/` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SqsroError};
use crate::models::structure::Matrix3;
use crate::models::RawGeometry;
use std::fs;
use std::path::Path;

/// 解析 bestsqs.out 文件
pub fn read_bestsqs_file(path: &Path) -> Result<RawGeometry> {
    let content = fs::read_to_string(path).map_err(|e| SqsroError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_bestsqs_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 bestsqs.out 格式
pub fn parse_bestsqs_content(content: &str, source_name: &str) -> Result<RawGeometry> {
    let malformed = |reason: String| SqsroError::MalformedStructureFile {
        path: source_name.to_string(),
        reason,
    };

    let mut lines = content.lines();

    let mut header = [[0.0; 3]; 6];
    for (i, row) in header.iter_mut().enumerate() {
        let line = lines
            .next()
            .ok_or_else(|| malformed(format!("expected 6 header lines, found {}", i)))?;
        *row = parse_vector(line).map_err(|reason| malformed(format!("line {}: {}", i + 1, reason)))?;
    }

    let basis: Matrix3 = [header[0], header[1], header[2]];
    let lattice: Matrix3 = [header[3], header[4], header[5]];

    let mut positions = Vec::new();
    let mut elements = Vec::new();

    for (offset, line) in lines.enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            continue;
        }

        let mut position = [0.0; 3];
        for (k, token) in tokens[..3].iter().enumerate() {
            position[k] = token.parse().map_err(|_| {
                malformed(format!(
                    "line {}: invalid coordinate '{}'",
                    offset + 7,
                    token
                ))
            })?;
        }

        positions.push(position);
        elements.push(tokens[3].to_string());
    }

    Ok(RawGeometry {
        basis,
        lattice,
        positions,
        elements,
    })
}

/// 解析一行中恰好 3 个浮点数
fn parse_vector(line: &str) -> std::result::Result<[f64; 3], String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(format!("expected 3 numbers, found {}", tokens.len()));
    }

    let mut v = [0.0; 3];
    for (k, token) in tokens.iter().enumerate() {
        v[k] = token
            .parse()
            .map_err(|_| format!("invalid number '{}'", token))?;
    }
    Ok(v)
}

/// 从文件名提取 SQS 编号，如 `bestsqs-12.out` -> 12
pub fn sqs_id_from_name(file_name: &str) -> Option<u64> {
    let stem = file_name.split('.').next()?;
    stem.rsplit('-').next()?.parse().ok()
}
