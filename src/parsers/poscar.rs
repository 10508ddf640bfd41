//! # VASP POSCAR 格式导出
//!
//! 将缩放、排序后的 SQS 结构写成 POSCAR，供后续 DFT 计算使用。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Direct                 # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, SqsroError};
use crate::models::PeriodicStructure;
use std::fs;
use std::path::{Path, PathBuf};

/// 将结构转换为 POSCAR 格式字符串（Direct 坐标）
pub fn to_poscar_string(structure: &PeriodicStructure, comment: &str) -> Result<String> {
    let frac = structure.fractional_positions().ok_or_else(|| {
        SqsroError::InvalidFormat(format!("{}: singular lattice", structure.name))
    })?;

    // 原子已按原子序数分组，按出现顺序统计即可
    let elem_order = structure.unique_elements();
    let counts = structure.element_counts();

    let mut result = String::new();

    // Line 0: Comment
    result.push_str(&format!("{}\n", comment));

    // Line 1: Scale
    result.push_str("1.0\n");

    // Lines 2-4: Lattice
    for row in &structure.lattice.matrix {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }

    // Line 5: Elements
    result.push_str(&format!("   {}\n", elem_order.join("   ")));

    // Line 6: Counts
    let count_line: Vec<String> = elem_order
        .iter()
        .map(|e| counts.get(e).copied().unwrap_or(0).to_string())
        .collect();
    result.push_str(&format!("   {}\n", count_line.join("   ")));

    // Coordinate type
    result.push_str("Direct\n");

    // Atom positions
    for pos in &frac {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            pos[0], pos[1], pos[2]
        ));
    }

    Ok(result)
}

/// POSCAR 输出路径: `<input>.POSCAR`
pub fn poscar_path_for(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".POSCAR");
    PathBuf::from(name)
}

/// 写出 POSCAR 文件，返回输出路径
pub fn write_poscar(
    structure: &PeriodicStructure,
    input: &Path,
    sqs_id: Option<u64>,
) -> Result<PathBuf> {
    let comment = match sqs_id {
        Some(id) => format!("{} (sqs {}) {}", structure.name, id, structure.formula()),
        None => format!("{} {}", structure.name, structure.formula()),
    };
    let content = to_poscar_string(structure, &comment)?;

    let output = poscar_path_for(input);
    fs::write(&output, content).map_err(|e| SqsroError::FileWriteError {
        path: output.display().to_string(),
        source: e,
    })?;

    Ok(output)
}
