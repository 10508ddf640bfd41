//! # SRO 结果导出
//!
//! ## 支持格式
//! - JSON: 每个结构一条记录（文件名、编号、修改时间、SRO 结果）
//! - CSV: 每个元素对一行，列为各壳层 SRO 与加权平均
//! - 文本: `AB v0 v1 ... avg`，每行一个元素对
//!
//! ## 依赖关系
//! - 被 `commands/sro.rs` 调用
//! - 使用 `sro/calculator.rs` 的 SroResult
//! - 使用 `serde_json` 和 `csv` 库

use crate::error::{Result, SqsroError};
use crate::sro::calculator::{SkippedPair, SroResult};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// 单个结构文件的分析记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    /// 文件名
    pub name: String,
    /// SQS 编号（由文件名提取）
    pub sqs_id: Option<u64>,
    /// 修改时间（Unix 秒）
    pub time: f64,
    /// 修改时间（本地时区, `YYYY-MM-DD HH:MM:SS`）
    pub time_human: String,
    /// 截断半径，按壳层编号排列
    pub cutoffs: Vec<f64>,
    /// 元素对 -> [壳层 0, 壳层 1, ..., 加权平均]
    pub sros: BTreeMap<String, Vec<f64>>,
    /// 被跳过的元素对
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedPair>,
}

impl FileReport {
    pub fn new(
        name: impl Into<String>,
        sqs_id: Option<u64>,
        time: f64,
        time_human: impl Into<String>,
        cutoffs: Vec<f64>,
        result: SroResult,
    ) -> Self {
        FileReport {
            name: name.into(),
            sqs_id,
            time,
            time_human: time_human.into(),
            cutoffs,
            sros: result.values,
            skipped: result.skipped,
        }
    }
}

/// 按 sqs_id、文件名排序，保证输出稳定
pub fn sort_reports(reports: &mut [FileReport]) {
    reports.sort_by(|a, b| {
        a.sqs_id
            .unwrap_or(u64::MAX)
            .cmp(&b.sqs_id.unwrap_or(u64::MAX))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// 导出为 JSON 列表
pub fn write_json(reports: &[FileReport], output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| SqsroError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, reports)?;
    writer.flush().map_err(|e| SqsroError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}

/// 导出为 CSV 表格
pub fn write_csv(reports: &[FileReport], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    let n_shells = reports.iter().map(|r| r.cutoffs.len()).max().unwrap_or(0);
    let mut header = vec!["name".to_string(), "sqs_id".to_string(), "pair".to_string()];
    header.extend((0..n_shells).map(|k| format!("shell_{}", k)));
    header.push("weighted".to_string());
    wtr.write_record(&header)?;

    for report in reports {
        for (pair, values) in &report.sros {
            let mut record = vec![
                report.name.clone(),
                report.sqs_id.map(|id| id.to_string()).unwrap_or_default(),
                pair.clone(),
            ];
            record.extend(values.iter().map(|v| format!("{:.3}", v)));
            wtr.write_record(&record)?;
        }
    }

    wtr.flush().map_err(|e| SqsroError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 文本格式：每行 `AB v0 v1 ... avg`，保留 4 位小数
pub fn to_sro_string(result: &SroResult) -> String {
    let mut out = String::new();
    for (key, values) in &result.values {
        let formatted: Vec<String> = values
            .iter()
            .map(|v| format!("{:?}", (v * 10000.0).round_ties_even() / 10000.0))
            .collect();
        out.push_str(&format!("{} {}\n", key, formatted.join(" ")));
    }
    out
}

/// 导出为文本文件
pub fn write_sro_text(result: &SroResult, output_path: &Path) -> Result<()> {
    fs::write(output_path, to_sro_string(result)).map_err(|e| SqsroError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })
}
