//! # SRO 计算模块
//!
//! 计算 Warren–Cowley 短程有序参数。
//!
//! ## 子模块
//! - `neighbor`: 周期性近邻搜索（cell list）与分壳层计数
//! - `calculator`: 元素对 SRO 与多壳层加权平均
//! - `export`: 结果导出 (JSON/CSV/文本)
//!
//! ## 依赖关系
//! - 被 `commands/sro.rs` 使用
//! - 使用 `models/structure.rs`, `models/element.rs`

pub mod calculator;
pub mod export;
pub mod neighbor;

pub use calculator::{SroCalculator, SroResult};
pub use export::FileReport;
pub use neighbor::NeighborIndex;

use crate::error::{Result, SqsroError};
use crate::models::element;
use serde::{Deserialize, Serialize};

/// SRO 分析配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SroConfig {
    /// 晶格常数缩放因子 (Å)
    pub scale: f64,
    /// 各壳层截断半径 (Å)
    pub cutoffs: Vec<f64>,
    /// 各壳层权重（通常为配位数）
    pub weights: Vec<f64>,
    /// 仅计算这些元素之间的元素对
    pub elements: Option<Vec<String>>,
}

impl SroConfig {
    /// 在任何近邻搜索之前检查配置
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(SqsroError::InvalidArgument(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }

        check_shapes(&self.cutoffs, &self.weights)?;

        if let Some(elements) = &self.elements {
            if elements.is_empty() {
                return Err(SqsroError::InvalidArgument(
                    "element subset is empty".to_string(),
                ));
            }
            for el in elements {
                element::lookup(el)?;
            }
        }

        Ok(())
    }
}

/// 截断半径与权重的形状、取值检查
pub fn check_shapes(cutoffs: &[f64], weights: &[f64]) -> Result<()> {
    if cutoffs.len() < 2 {
        return Err(SqsroError::ShapeMismatch(format!(
            "weighted average needs at least 2 cutoffs, got {}",
            cutoffs.len()
        )));
    }
    if weights.len() != cutoffs.len() {
        return Err(SqsroError::ShapeMismatch(format!(
            "{} weights for {} cutoffs",
            weights.len(),
            cutoffs.len()
        )));
    }
    if let Some(c) = cutoffs.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
        return Err(SqsroError::InvalidArgument(format!(
            "cutoff must be positive, got {}",
            c
        )));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(SqsroError::InvalidArgument(format!(
            "weight must be positive, got {}",
            w
        )));
    }
    Ok(())
}
