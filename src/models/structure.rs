//! # 周期性原子结构数据模型
//!
//! - `RawGeometry`: bestsqs.out 解析得到的原始几何（未缩放、未排序）
//! - `PeriodicStructure`: 缩放并按原子序数排序后的周期性结构
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `sro/` 使用
//! - 使用 `models/element.rs` 获取原子序数

use crate::error::{Result, SqsroError};
use crate::models::element;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 3x3 矩阵（行向量）
pub type Matrix3 = [[f64; 3]; 3];

/// 晶格参数表示
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: Matrix3,
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: Matrix3) -> Self {
        Lattice { matrix }
    }

    /// 各向同性缩放
    pub fn scaled(&self, factor: f64) -> Self {
        Lattice {
            matrix: self.matrix.map(|row| row.map(|x| x * factor)),
        }
    }

    /// 计算晶格体积（有符号）
    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.matrix;
        dot(a, cross(b, c))
    }

    /// 三组晶面 (bc, ca, ab) 的面间距
    ///
    /// 沿分数坐标轴 i 平移 1 个周期对应的最短垂直距离为 |V| / |b_j x b_k|。
    pub fn plane_spacings(&self) -> [f64; 3] {
        let [a, b, c] = self.matrix;
        let vol = self.volume().abs();
        [
            vol / norm(cross(b, c)),
            vol / norm(cross(c, a)),
            vol / norm(cross(a, b)),
        ]
    }

    /// 逆矩阵，体积为零时返回 None
    pub fn inverse(&self) -> Option<Matrix3> {
        let m = self.matrix;
        let det = self.volume();
        if det.abs() < 1e-10 {
            return None;
        }

        Some([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ])
    }

    /// 分数坐标转笛卡尔坐标: r = f · M
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标: f = r · M⁻¹
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> Option<[f64; 3]> {
        let inv = self.inverse()?;
        Some([
            cart[0] * inv[0][0] + cart[1] * inv[1][0] + cart[2] * inv[2][0],
            cart[0] * inv[0][1] + cart[1] * inv[1][1] + cart[2] * inv[2][1],
            cart[0] * inv[0][2] + cart[1] * inv[1][2] + cart[2] * inv[2][2],
        ])
    }
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(v: [f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

/// bestsqs.out 中读取的原始几何
#[derive(Debug, Clone, PartialEq)]
pub struct RawGeometry {
    /// 坐标系基矢（前 3 行）
    pub basis: Matrix3,
    /// 晶格向量（第 4-6 行）
    pub lattice: Matrix3,
    /// 原子坐标（以晶格常数为单位的笛卡尔坐标）
    pub positions: Vec<[f64; 3]>,
    /// 与 positions 一一对应的元素符号
    pub elements: Vec<String>,
}

impl RawGeometry {
    /// 基矢是否为单位矩阵（否则缩放后的笛卡尔坐标与 ATAT 约定不一致）
    pub fn basis_is_identity(&self) -> bool {
        self.basis.iter().enumerate().all(|(i, row)| {
            row.iter().enumerate().all(|(j, &x)| {
                let expected = if i == j { 1.0 } else { 0.0 };
                (x - expected).abs() < 1e-8
            })
        })
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 笛卡尔坐标 [x, y, z] (Å)
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }
}

/// 周期性结构
///
/// 原子按原子序数升序稳定排序，同种元素连续排列。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodicStructure {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl PeriodicStructure {
    /// 由原始几何和缩放因子构建结构
    pub fn from_geometry(
        name: impl Into<String>,
        raw: &RawGeometry,
        scale: f64,
    ) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SqsroError::InvalidArgument(format!(
                "scale must be a positive number, got {}",
                scale
            )));
        }
        if raw.positions.len() != raw.elements.len() {
            return Err(SqsroError::InvalidFormat(format!(
                "{} positions but {} element labels",
                raw.positions.len(),
                raw.elements.len()
            )));
        }

        let lattice = Lattice::from_vectors(raw.lattice).scaled(scale);
        if lattice.inverse().is_none() {
            return Err(SqsroError::InvalidFormat(
                "lattice vectors are linearly dependent".to_string(),
            ));
        }

        let mut keyed = raw
            .elements
            .iter()
            .zip(&raw.positions)
            .map(|(el, pos)| {
                let z = element::atomic_number(el)?;
                Ok((z, Atom::new(el.clone(), pos.map(|x| x * scale))))
            })
            .collect::<Result<Vec<_>>>()?;

        // sort_by_key 是稳定排序
        keyed.sort_by_key(|(z, _)| *z);

        Ok(PeriodicStructure {
            name: name.into(),
            lattice,
            atoms: keyed.into_iter().map(|(_, atom)| atom).collect(),
        })
    }

    /// 原子总数
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// 元素符号序列
    pub fn symbols(&self) -> Vec<&str> {
        self.atoms.iter().map(|a| a.element.as_str()).collect()
    }

    /// 按出现顺序去重的元素列表（即原子序数升序）
    pub fn unique_elements(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for atom in &self.atoms {
            if !seen.contains(&atom.element) {
                seen.push(atom.element.clone());
            }
        }
        seen
    }

    /// 各元素的原子数
    pub fn element_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// 各元素的原子分数，总和为 1
    pub fn element_ratios(&self) -> BTreeMap<String, f64> {
        let total = self.atoms.len() as f64;
        self.element_counts()
            .into_iter()
            .map(|(el, count)| (el, count as f64 / total))
            .collect()
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        let counts = self.element_counts();
        self.unique_elements()
            .into_iter()
            .map(|el| {
                let count = counts.get(&el).copied().unwrap_or(0);
                if count == 1 {
                    el
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 分数坐标（未折回晶胞）
    pub fn fractional_positions(&self) -> Option<Vec<[f64; 3]>> {
        self.atoms
            .iter()
            .map(|a| self.lattice.cart_to_frac(a.position))
            .collect()
    }
}
