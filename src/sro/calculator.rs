//! # Warren–Cowley SRO 计算器
//!
//! ## 公式
//! 对元素对 (A, B) 和壳层 k：
//! ```text
//! R_random   = x_A * x_B * N_bond(k)
//! R_observed = N_{A->B}(k)            # A 周围的 B 近邻数
//! α_AB(k)    = 1 - R_observed / R_random
//! ```
//! 各壳层结果保留 3 位小数，最后追加按壳层权重的加权平均。
//!
//! ## 依赖关系
//! - 被 `commands/sro.rs` 调用
//! - 使用 `sro/neighbor.rs` 的 NeighborIndex
//! - 使用 `models/element.rs` 规范化元素对

use crate::error::{Result, SqsroError};
use crate::models::element;
use crate::sro::neighbor::NeighborIndex;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 因随机基准为零而未计算的元素对
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub pair: String,
    pub reason: String,
}

/// 一个结构的全部 SRO 结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SroResult {
    /// 元素对 -> [壳层 0, 壳层 1, ..., 加权平均]
    pub values: BTreeMap<String, Vec<f64>>,
    /// 被跳过的元素对
    pub skipped: Vec<SkippedPair>,
}

/// SRO 计算器
pub struct SroCalculator {
    index: NeighborIndex,
    ratios: BTreeMap<String, f64>,
    /// 结构中的元素，原子序数升序
    elements: Vec<String>,
    weights: Vec<f64>,
}

impl SroCalculator {
    /// 对结构做近邻搜索并准备计算，形状检查在近邻搜索之前完成
    #[cfg(test)]
    pub fn new(
        structure: &crate::models::PeriodicStructure,
        cutoffs: &[f64],
        weights: &[f64],
    ) -> Result<Self> {
        crate::sro::check_shapes(cutoffs, weights)?;
        let index = NeighborIndex::build(structure, cutoffs)?;
        Self::with_index(index, structure.element_ratios(), weights)
    }

    /// 由已构建的近邻索引和元素分数创建
    pub fn with_index(
        index: NeighborIndex,
        ratios: BTreeMap<String, f64>,
        weights: &[f64],
    ) -> Result<Self> {
        if weights.len() != index.num_shells() {
            return Err(SqsroError::ShapeMismatch(format!(
                "{} weights for {} shells",
                weights.len(),
                index.num_shells()
            )));
        }

        let mut keyed = ratios
            .keys()
            .map(|el| Ok((element::atomic_number(el)?, el.clone())))
            .collect::<Result<Vec<_>>>()?;
        keyed.sort();

        Ok(SroCalculator {
            index,
            ratios,
            elements: keyed.into_iter().map(|(_, el)| el).collect(),
            weights: weights.to_vec(),
        })
    }

    /// 结构中的元素（原子序数升序）
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// 按壳层编号排列的截断半径
    pub fn shell_cutoffs(&self) -> Vec<f64> {
        self.index.iter_shells().map(|s| s.cutoff).collect()
    }

    /// 元素原子分数，不存在的元素为 0
    pub fn ratio(&self, el: &str) -> f64 {
        self.ratios.get(el).copied().unwrap_or(0.0)
    }

    /// 计算单个元素对的 SRO 序列（末尾为加权平均）
    pub fn pair_sro(&self, a: &str, b: &str) -> Result<Vec<f64>> {
        let (a, b) = element::canonical_pair(a, b);
        let key = pair_key(a, b);

        let mut sros = Vec::with_capacity(self.index.num_shells() + 1);
        let shells = (0..self.index.num_shells()).filter_map(|k| self.index.shell(k).map(|s| (k, s)));
        for (k, shell) in shells {
            let random = self.ratio(a) * self.ratio(b) * shell.total_bonds as f64;
            let observed = shell.count(a, b) as f64;

            let ratio = checked_div(observed, random).ok_or_else(|| {
                SqsroError::DivisionByZeroInSro {
                    pair: key.clone(),
                    shell: k,
                    cutoff: shell.cutoff,
                }
            })?;
            sros.push(round3(1.0 - ratio));
        }

        sros.push(weighted_average(&sros, &self.weights));
        Ok(sros)
    }

    /// 计算所有元素对（可限定元素子集）
    ///
    /// 随机基准为零的元素对被跳过并记录在 `skipped` 中。
    pub fn all_sro(&self, subset: Option<&[String]>) -> SroResult {
        let elements: Vec<&str> = match subset {
            Some(list) => {
                let mut seen: Vec<&str> = Vec::new();
                for el in list {
                    if !seen.contains(&el.as_str()) {
                        seen.push(el);
                    }
                }
                seen
            }
            None => self.elements.iter().map(String::as_str).collect(),
        };

        let mut result = SroResult::default();
        for (i, a) in elements.iter().enumerate() {
            for b in &elements[i..] {
                let (lo, hi) = element::canonical_pair(a, b);
                match self.pair_sro(lo, hi) {
                    Ok(values) => {
                        result.values.insert(pair_key(lo, hi), values);
                    }
                    Err(e) => result.skipped.push(SkippedPair {
                        pair: pair_key(lo, hi),
                        reason: e.to_string(),
                    }),
                }
            }
        }

        result
    }
}

/// 元素对键，如 "NiCo"
pub fn pair_key(a: &str, b: &str) -> String {
    format!("{}{}", a, b)
}

/// 保留 3 位小数（四舍六入五成双）
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round_ties_even() / 1000.0
}

/// Σ sᵢwᵢ / Σ wᵢ，结果保留 3 位小数
///
/// `values` 可以比 `weights` 长（末尾多余项不参与计算）。
pub fn weighted_average(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    let weighted: f64 = values.iter().zip(weights).map(|(s, w)| s * w).sum();
    round3(weighted / total)
}

fn checked_div(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 || !den.is_finite() {
        None
    } else {
        Some(num / den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PeriodicStructure, RawGeometry};
    use crate::sro::neighbor::ShellCounts;

    fn structure(lattice: [[f64; 3]; 3], atoms: &[(&str, [f64; 3])], scale: f64) -> PeriodicStructure {
        let raw = RawGeometry {
            basis: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            lattice,
            positions: atoms.iter().map(|(_, p)| *p).collect(),
            elements: atoms.iter().map(|(e, _)| e.to_string()).collect(),
        };
        PeriodicStructure::from_geometry("test", &raw, scale).unwrap()
    }

    fn cubic(a: f64) -> [[f64; 3]; 3] {
        [[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]]
    }

    /// B2 (CsCl 型) 有序 AlNi，a = 3 Å
    fn b2_alni() -> PeriodicStructure {
        structure(
            cubic(1.0),
            &[("Ni", [0.5, 0.5, 0.5]), ("Al", [0.0, 0.0, 0.0])],
            3.0,
        )
    }

    #[test]
    fn test_weighted_average_reference_case() {
        assert_eq!(weighted_average(&[0.120, -0.040], &[8.0, 6.0]), 0.051);
        // 末尾的平均值本身不参与计算
        assert_eq!(weighted_average(&[0.120, -0.040, 9.9], &[8.0, 6.0]), 0.051);
    }

    #[test]
    fn test_round3_half_to_even() {
        assert_eq!(round3(0.0514285), 0.051);
        assert_eq!(round3(-0.1428571), -0.143);
        assert_eq!(round3(0.0625), 0.062);
        assert_eq!(round3(1.0), 1.0);
    }

    #[test]
    fn test_single_element_is_homogeneous() {
        let s = structure(cubic(1.0), &[("Fe", [0.0; 3])], 1.0);
        let calc = SroCalculator::new(&s, &[1.1, 1.5], &[6.0, 12.0]).unwrap();
        let result = calc.all_sro(None);

        assert_eq!(result.values.len(), 1);
        assert_eq!(result.values["FeFe"], vec![0.0, 0.0, 0.0]);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_random_binary_chain_is_zero() {
        // 一维 AlAlNiNi 链：每个原子恰有 1 个同类和 1 个异类最近邻
        let s = structure(
            [[4.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]],
            &[
                ("Al", [0.0, 0.0, 0.0]),
                ("Al", [1.0, 0.0, 0.0]),
                ("Ni", [2.0, 0.0, 0.0]),
                ("Ni", [3.0, 0.0, 0.0]),
            ],
            1.0,
        );
        let calc = SroCalculator::new(&s, &[1.05, 1.5], &[8.0, 6.0]).unwrap();
        let result = calc.all_sro(None);

        let keys: Vec<&str> = result.values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["AlAl", "AlNi", "NiNi"]);
        for values in result.values.values() {
            assert_eq!(values, &vec![0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_b2_ordered_alloy() {
        let calc = SroCalculator::new(&b2_alni(), &[2.8, 3.5], &[8.0, 6.0]).unwrap();
        let result = calc.all_sro(None);

        // 第一壳层全为异类近邻；第二壳层 8 异类 + 6 同类
        assert_eq!(result.values["AlNi"], vec![-1.0, -0.143, -0.633]);
        assert_eq!(result.values["AlAl"], vec![1.0, 0.143, 0.633]);
        assert_eq!(result.values["NiNi"], vec![1.0, 0.143, 0.633]);
    }

    #[test]
    fn test_shell_zero_is_smallest_cutoff() {
        let ascending = SroCalculator::new(&b2_alni(), &[2.8, 3.5], &[8.0, 6.0]).unwrap();
        let descending = SroCalculator::new(&b2_alni(), &[3.5, 2.8], &[8.0, 6.0]).unwrap();

        assert_eq!(ascending.shell_cutoffs(), vec![2.8, 3.5]);
        assert_eq!(descending.shell_cutoffs(), vec![2.8, 3.5]);
        assert_eq!(ascending.all_sro(None), descending.all_sro(None));
    }

    #[test]
    fn test_pair_order_is_irrelevant() {
        let calc = SroCalculator::new(&b2_alni(), &[2.8, 3.5], &[8.0, 6.0]).unwrap();
        assert_eq!(calc.pair_sro("Ni", "Al").unwrap(), calc.pair_sro("Al", "Ni").unwrap());
    }

    #[test]
    fn test_mass_canonical_key() {
        let s = structure(
            cubic(1.0),
            &[("Co", [0.0, 0.0, 0.0]), ("Ni", [0.5, 0.5, 0.5])],
            3.0,
        );
        let calc = SroCalculator::new(&s, &[2.8, 3.5], &[8.0, 6.0]).unwrap();
        assert_eq!(calc.elements(), &["Co".to_string(), "Ni".to_string()]);

        let result = calc.all_sro(None);
        assert!(result.values.contains_key("NiCo"));
        assert!(!result.values.contains_key("CoNi"));
    }

    #[test]
    fn test_subset_with_absent_element_is_skipped() {
        let calc = SroCalculator::new(&b2_alni(), &[2.8, 3.5], &[8.0, 6.0]).unwrap();
        let subset = vec!["Al".to_string(), "Fe".to_string(), "Al".to_string()];
        let result = calc.all_sro(Some(&subset));

        assert_eq!(result.values.len(), 1);
        assert!(result.values.contains_key("AlAl"));
        let skipped: Vec<&str> = result.skipped.iter().map(|s| s.pair.as_str()).collect();
        assert_eq!(skipped, vec!["AlFe", "FeFe"]);
    }

    #[test]
    fn test_zero_bonds_is_division_by_zero() {
        let s = structure(cubic(1.0), &[("Fe", [0.0; 3])], 1.0);
        let calc = SroCalculator::new(&s, &[0.5, 1.1], &[1.0, 1.0]).unwrap();

        match calc.pair_sro("Fe", "Fe") {
            Err(SqsroError::DivisionByZeroInSro { pair, shell, .. }) => {
                assert_eq!(pair, "FeFe");
                assert_eq!(shell, 0);
            }
            other => panic!("unexpected: {:?}", other),
        }

        let result = calc.all_sro(None);
        assert!(result.values.is_empty());
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn test_shape_mismatch_before_search() {
        let s = structure(cubic(1.0), &[("Fe", [0.0; 3])], 1.0);
        assert!(matches!(
            SroCalculator::new(&s, &[1.1, 1.5], &[1.0]),
            Err(SqsroError::ShapeMismatch(_))
        ));
        assert!(matches!(
            SroCalculator::new(&s, &[1.1], &[1.0]),
            Err(SqsroError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_self_pair_not_double_counted() {
        // 人为构造计数：Al-Al 有序对 4 个，总键 10
        let mut counts = BTreeMap::new();
        counts.insert(
            "Al".to_string(),
            BTreeMap::from([("Al".to_string(), 4), ("Ni".to_string(), 3)]),
        );
        counts.insert("Ni".to_string(), BTreeMap::from([("Al".to_string(), 3)]));
        let shell = |cutoff| ShellCounts {
            cutoff,
            total_bonds: 10,
            counts: counts.clone(),
        };
        let index = NeighborIndex::from_shells(vec![shell(3.0), shell(4.0)]);
        let ratios = BTreeMap::from([("Al".to_string(), 0.5), ("Ni".to_string(), 0.5)]);
        let calc = SroCalculator::with_index(index, ratios, &[1.0, 1.0]).unwrap();

        // 1 - 4 / (0.25 * 10)
        assert_eq!(calc.pair_sro("Al", "Al").unwrap(), vec![-0.6, -0.6, -0.6]);
        // 1 - 3 / 2.5
        assert_eq!(calc.pair_sro("Ni", "Al").unwrap(), vec![-0.2, -0.2, -0.2]);
    }

    #[test]
    fn test_idempotent() {
        let s = b2_alni();
        let first = SroCalculator::new(&s, &[2.8, 3.5], &[8.0, 6.0]).unwrap().all_sro(None);
        let second = SroCalculator::new(&s, &[2.8, 3.5], &[8.0, 6.0]).unwrap().all_sro(None);
        assert_eq!(first, second);
    }
}
