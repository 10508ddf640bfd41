//! # 周期性近邻搜索
//!
//! 对每个截断半径，找出所有距离严格小于截断半径的有序原子对 (i, j)。
//! 同一对原子经不同周期像形成的键分别计数，原子与自身的周期像也算作近邻，
//! 仅排除零平移的 (i, i)。
//!
//! ## 算法概述
//! 1. 笛卡尔坐标转分数坐标并折回 [0, 1)
//! 2. 按最大截断半径在分数空间划分 cell，每个 cell 的面间距不小于截断半径
//! 3. 对每个截断半径，扫描相邻 cell 及其周期像（小超胞时扫描多圈）
//! 4. 统计每种中心元素周围各元素的近邻数以及总键数
//!
//! ## 依赖关系
//! - 被 `sro/calculator.rs` 调用
//! - 使用 `models/structure.rs` 的 PeriodicStructure, Lattice
//! - 使用 `rayon` 并行处理各截断半径

use crate::error::{Result, SqsroError};
use crate::models::structure::dot;
use crate::models::{Lattice, PeriodicStructure};

use rayon::prelude::*;
use std::collections::BTreeMap;

/// 每个方向上 cell 数的上限
const MAX_CELLS_PER_AXIS: usize = 64;

/// 分数空间中的 cell list
pub struct CellList {
    lattice: Lattice,
    /// 折回 [0, 1) 的分数坐标
    frac: Vec<[f64; 3]>,
    /// 各方向 cell 数
    dims: [usize; 3],
    /// 各方向晶面间距 (Å)
    spacings: [f64; 3],
    /// 每个原子所在 cell
    cell_of: Vec<[usize; 3]>,
    /// 每个 cell 中的原子下标
    cells: Vec<Vec<usize>>,
}

impl CellList {
    /// 以 `max_cutoff` 为 cell 尺寸构建
    pub fn build(structure: &PeriodicStructure, max_cutoff: f64) -> Result<Self> {
        let frac = structure.fractional_positions().ok_or_else(|| {
            SqsroError::InvalidFormat(format!("{}: singular lattice", structure.name))
        })?;
        let frac: Vec<[f64; 3]> = frac.into_iter().map(|f| f.map(wrap_unit)).collect();

        let spacings = structure.lattice.plane_spacings();
        let dims = spacings.map(|d| ((d / max_cutoff).floor() as usize).clamp(1, MAX_CELLS_PER_AXIS));

        let mut cells = vec![Vec::new(); dims[0] * dims[1] * dims[2]];
        let mut cell_of = Vec::with_capacity(frac.len());
        for (i, f) in frac.iter().enumerate() {
            let c = [0, 1, 2].map(|a| ((f[a] * dims[a] as f64) as usize).min(dims[a] - 1));
            cells[flat_index(c, dims)].push(i);
            cell_of.push(c);
        }

        Ok(CellList {
            lattice: structure.lattice,
            frac,
            dims,
            spacings,
            cell_of,
            cells,
        })
    }

    /// 所有距离 < cutoff 的有序原子对，按中心原子 i 升序
    pub fn neighbor_pairs(&self, cutoff: f64) -> Vec<(usize, usize)> {
        let rc2 = cutoff * cutoff;

        // cutoff 可能大于建表时的尺寸，此时多扫几圈
        let reach: [i64; 3] = [0, 1, 2].map(|a| {
            ((cutoff * self.dims[a] as f64 / self.spacings[a]).ceil() as i64).max(1)
        });

        let mut pairs = Vec::new();
        for (i, ci) in self.cell_of.iter().enumerate() {
            let fi = self.frac[i];
            for ox in -reach[0]..=reach[0] {
                let (sx, cx) = wrap_cell(ci[0] as i64 + ox, self.dims[0]);
                for oy in -reach[1]..=reach[1] {
                    let (sy, cy) = wrap_cell(ci[1] as i64 + oy, self.dims[1]);
                    for oz in -reach[2]..=reach[2] {
                        let (sz, cz) = wrap_cell(ci[2] as i64 + oz, self.dims[2]);
                        let is_home = sx == 0 && sy == 0 && sz == 0;

                        for &j in &self.cells[flat_index([cx, cy, cz], self.dims)] {
                            if i == j && is_home {
                                continue;
                            }
                            let fj = self.frac[j];
                            let d = self.lattice.frac_to_cart([
                                fj[0] + sx as f64 - fi[0],
                                fj[1] + sy as f64 - fi[1],
                                fj[2] + sz as f64 - fi[2],
                            ]);
                            if dot(d, d) < rc2 {
                                pairs.push((i, j));
                            }
                        }
                    }
                }
            }
        }

        pairs
    }
}

fn wrap_unit(x: f64) -> f64 {
    let w = x - x.floor();
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// 扩展 cell 下标 -> (周期平移, cell 下标)
fn wrap_cell(index: i64, dim: usize) -> (i64, usize) {
    let dim = dim as i64;
    (index.div_euclid(dim), index.rem_euclid(dim) as usize)
}

fn flat_index(c: [usize; 3], dims: [usize; 3]) -> usize {
    c[0] + dims[0] * (c[1] + dims[1] * c[2])
}

/// 单个截断半径下的近邻统计
#[derive(Debug, Clone, PartialEq)]
pub struct ShellCounts {
    /// 截断半径 (Å)
    pub cutoff: f64,
    /// 总键数（有序原子对数）
    pub total_bonds: usize,
    /// 中心元素 -> (近邻元素 -> 数目)
    pub counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl ShellCounts {
    /// 由原子对列表和元素符号序列统计
    pub fn from_pairs(cutoff: f64, pairs: &[(usize, usize)], symbols: &[&str]) -> Self {
        let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for &(i, j) in pairs {
            *counts
                .entry(symbols[i].to_string())
                .or_default()
                .entry(symbols[j].to_string())
                .or_insert(0) += 1;
        }

        ShellCounts {
            cutoff,
            total_bonds: pairs.len(),
            counts,
        }
    }

    /// `origin` 周围 `target` 的近邻数
    pub fn count(&self, origin: &str, target: &str) -> usize {
        self.counts
            .get(origin)
            .and_then(|m| m.get(target))
            .copied()
            .unwrap_or(0)
    }
}

/// 各壳层近邻索引
///
/// 内部按截断半径降序存储；壳层 k 对应下标 `len - 1 - k`，
/// 即壳层 0 为最小截断半径。
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborIndex {
    shells: Vec<ShellCounts>,
}

impl NeighborIndex {
    /// 构建近邻索引，cell list 只建一次，各截断半径并行查询
    pub fn build(structure: &PeriodicStructure, cutoffs: &[f64]) -> Result<Self> {
        if cutoffs.is_empty() {
            return Err(SqsroError::ShapeMismatch("no cutoffs given".to_string()));
        }
        if let Some(c) = cutoffs.iter().find(|c| !(c.is_finite() && **c > 0.0)) {
            return Err(SqsroError::InvalidArgument(format!(
                "cutoff must be positive, got {}",
                c
            )));
        }

        if structure.is_empty() {
            return Err(SqsroError::InvalidFormat(format!(
                "{}: structure contains no atoms",
                structure.name
            )));
        }

        let mut sorted = cutoffs.to_vec();
        sorted.sort_by(|a, b| b.total_cmp(a));

        let cell_list = CellList::build(structure, sorted[0])?;
        let symbols = structure.symbols();

        let shells = sorted
            .par_iter()
            .map(|&rc| {
                let pairs = cell_list.neighbor_pairs(rc);
                ShellCounts::from_pairs(rc, &pairs, &symbols)
            })
            .collect();

        Ok(NeighborIndex { shells })
    }

    /// 由已有统计构建（按截断半径降序重排）
    #[cfg(test)]
    pub fn from_shells(mut shells: Vec<ShellCounts>) -> Self {
        shells.sort_by(|a, b| b.cutoff.total_cmp(&a.cutoff));
        NeighborIndex { shells }
    }

    /// 壳层数
    pub fn num_shells(&self) -> usize {
        self.shells.len()
    }

    /// 第 k 壳层
    pub fn shell(&self, k: usize) -> Option<&ShellCounts> {
        let idx = self.shells.len().checked_sub(k + 1)?;
        self.shells.get(idx)
    }

    /// 按壳层编号顺序（截断半径升序）迭代
    pub fn iter_shells(&self) -> impl Iterator<Item = &ShellCounts> {
        self.shells.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawGeometry;

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

    /// 直接枚举周期像的参考实现
    fn brute_force_pairs(s: &PeriodicStructure, cutoff: f64) -> Vec<(usize, usize)> {
        let spacings = s.lattice.plane_spacings();
        let n = spacings.map(|d| (cutoff / d).ceil() as i64 + 2);
        let mut pairs = Vec::new();
        for i in 0..s.len() {
            for j in 0..s.len() {
                for a in -n[0]..=n[0] {
                    for b in -n[1]..=n[1] {
                        for c in -n[2]..=n[2] {
                            if i == j && a == 0 && b == 0 && c == 0 {
                                continue;
                            }
                            let t = s.lattice.frac_to_cart([a as f64, b as f64, c as f64]);
                            let pi = s.atoms[i].position;
                            let pj = s.atoms[j].position;
                            let d = [
                                pj[0] + t[0] - pi[0],
                                pj[1] + t[1] - pi[1],
                                pj[2] + t[2] - pi[2],
                            ];
                            if dot(d, d) < cutoff * cutoff {
                                pairs.push((i, j));
                            }
                        }
                    }
                }
            }
        }
        pairs.sort();
        pairs
    }

    fn sorted_pairs(s: &PeriodicStructure, cutoff: f64) -> Vec<(usize, usize)> {
        let mut pairs = CellList::build(s, cutoff).unwrap().neighbor_pairs(cutoff);
        pairs.sort();
        pairs
    }

    #[test]
    fn test_simple_cubic_self_images() {
        let s = structure(cubic(1.0), &[("Fe", [0.0, 0.0, 0.0])], 1.0);
        // 6 个最近邻全是自身周期像
        assert_eq!(sorted_pairs(&s, 1.1).len(), 6);
        // 加上 12 个次近邻
        assert_eq!(sorted_pairs(&s, 1.5).len(), 18);
        // 小于最近邻距离时没有键
        assert!(sorted_pairs(&s, 0.9).is_empty());
    }

    #[test]
    fn test_cutoff_is_strict() {
        let s = structure(cubic(1.0), &[("Fe", [0.0, 0.0, 0.0])], 2.0);
        // 最近邻距离恰为 2.0
        assert!(sorted_pairs(&s, 2.0).is_empty());
        assert_eq!(sorted_pairs(&s, 2.0 + 1e-9).len(), 6);
    }

    #[test]
    fn test_bcc_conventional_cell() {
        let a = 3.13275;
        let s = structure(
            cubic(1.0),
            &[("W", [0.0, 0.0, 0.0]), ("W", [0.5, 0.5, 0.5])],
            a,
        );
        let index = NeighborIndex::build(&s, &[2.9229, 3.7816]).unwrap();
        // 壳层 0 = 较小截断半径: 8 个最近邻
        assert_eq!(index.shell(0).unwrap().total_bonds, 2 * 8);
        assert_eq!(index.shell(1).unwrap().total_bonds, 2 * 14);
        assert!(index.shell(2).is_none());
    }

    #[test]
    fn test_bcc_primitive_cell_non_orthogonal() {
        let h = 0.5;
        let s = structure(
            [[-h, h, h], [h, -h, h], [h, h, -h]],
            &[("Mo", [0.0, 0.0, 0.0])],
            3.13275,
        );
        // 截断半径大于面间距，需要扫描多圈周期像
        let index = NeighborIndex::build(&s, &[3.7816, 2.9229]).unwrap();
        assert_eq!(index.shell(0).unwrap().total_bonds, 8);
        assert_eq!(index.shell(1).unwrap().total_bonds, 14);
        assert_eq!(index.shell(1).unwrap().count("Mo", "Mo"), 14);
    }

    #[test]
    fn test_matches_brute_force_triclinic() {
        let s = structure(
            [[5.1, 0.0, 0.0], [1.3, 4.7, 0.0], [-0.8, 0.9, 6.2]],
            &[
                ("Ni", [0.1, 0.2, 0.3]),
                ("Al", [2.4, 1.1, 0.2]),
                ("Co", [4.9, 4.0, 5.9]),
                ("Ni", [-0.3, 2.2, 3.1]),
                ("Al", [3.0, 3.0, 3.0]),
                ("Cr", [1.0, 4.5, 5.0]),
            ],
            1.0,
        );
        for cutoff in [1.5, 2.9, 4.2, 7.35] {
            assert_eq!(sorted_pairs(&s, cutoff), brute_force_pairs(&s, cutoff), "cutoff {}", cutoff);
        }
    }

    #[test]
    fn test_matches_brute_force_large_supercell() {
        // 4x4x4 bcc 超胞，多个 cell
        let mut atoms = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    let el = if (x + y + z) % 3 == 0 { "Ta" } else { "Nb" };
                    atoms.push((el, [x as f64, y as f64, z as f64]));
                    atoms.push(("Ti", [x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5]));
                }
            }
        }
        let s = structure(cubic(4.0), &atoms, 3.3);
        let cell_list = CellList::build(&s, 3.0).unwrap();
        assert!(cell_list.dims.iter().all(|&d| d > 1));

        for cutoff in [3.0, 3.5] {
            let mut pairs = cell_list.neighbor_pairs(cutoff);
            pairs.sort();
            assert_eq!(pairs, brute_force_pairs(&s, cutoff));
        }
    }

    #[test]
    fn test_positions_outside_cell_are_wrapped() {
        let inside = structure(cubic(3.0), &[("Fe", [0.0; 3]), ("Ni", [1.5, 1.5, 1.5])], 1.0);
        let outside = structure(cubic(3.0), &[("Fe", [-3.0, 6.0, 3.0]), ("Ni", [1.5, -1.5, 4.5])], 1.0);
        for cutoff in [2.7, 3.5] {
            assert_eq!(sorted_pairs(&inside, cutoff), sorted_pairs(&outside, cutoff));
        }
    }

    #[test]
    fn test_shell_counts_histogram() {
        let symbols = ["Al", "Al", "Ni"];
        let pairs = [(0, 1), (1, 0), (0, 2), (2, 0), (2, 2)];
        let shell = ShellCounts::from_pairs(3.0, &pairs, &symbols);
        assert_eq!(shell.total_bonds, 5);
        assert_eq!(shell.count("Al", "Al"), 2);
        assert_eq!(shell.count("Al", "Ni"), 1);
        assert_eq!(shell.count("Ni", "Ni"), 1);
        assert_eq!(shell.count("Ni", "Fe"), 0);
        assert_eq!(shell.count("Fe", "Ni"), 0);
    }

    #[test]
    fn test_empty_structure_rejected() {
        let raw = RawGeometry {
            basis: cubic(1.0),
            lattice: cubic(3.0),
            positions: vec![],
            elements: vec![],
        };
        let s = PeriodicStructure::from_geometry("empty", &raw, 1.0).unwrap();
        assert!(matches!(
            NeighborIndex::build(&s, &[2.0, 3.0]),
            Err(SqsroError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_shell_numbering_is_ascending_radius() {
        let index = NeighborIndex::from_shells(vec![
            ShellCounts::from_pairs(2.0, &[], &[]),
            ShellCounts::from_pairs(4.0, &[], &[]),
            ShellCounts::from_pairs(3.0, &[], &[]),
        ]);
        assert_eq!(index.num_shells(), 3);
        assert_eq!(index.shell(0).unwrap().cutoff, 2.0);
        assert_eq!(index.shell(2).unwrap().cutoff, 4.0);
        let radii: Vec<f64> = index.iter_shells().map(|s| s.cutoff).collect();
        assert_eq!(radii, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_build_rejects_bad_cutoffs() {
        let s = structure(cubic(1.0), &[("Fe", [0.0; 3])], 1.0);
        assert!(NeighborIndex::build(&s, &[]).is_err());
        assert!(NeighborIndex::build(&s, &[1.0, -1.0]).is_err());
    }
}
