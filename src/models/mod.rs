//! # 数据模型模块
//!
//! 定义周期性原子结构和元素数据。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `sro/` 使用
//! - 子模块: element, structure

pub mod element;
pub mod structure;

pub use structure::{Lattice, PeriodicStructure, RawGeometry};
