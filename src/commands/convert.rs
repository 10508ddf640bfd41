//! # convert 命令实现
//!
//! 批量将 bestsqs.out 转换为 VASP POSCAR（分数坐标）。
//!
//! ## 功能
//! - 单文件或目录输入，按正则匹配文件名
//! - 输出写在输入旁边：`<file>.POSCAR`
//! - 已存在的输出默认跳过，`--overwrite` 覆盖
//! - 支持并行处理
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `parsers/`, `models/`
//! - 使用 `batch/` 进行批量处理

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::convert::ConvertArgs;
use crate::error::{Result, SqsroError, Stage};
use crate::models::PeriodicStructure;
use crate::parsers::{self, poscar, sqs};
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header("Converting bestsqs.out to POSCAR");

    if !args.input.exists() {
        return Err(SqsroError::DirectoryNotFound {
            path: args.input.display().to_string(),
        });
    }

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} files to convert", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| {
        match convert_file(file, args.scale, args.overwrite) {
            Ok(Some(out)) => ProcessResult::Success((file.clone(), out)),
            Ok(None) => ProcessResult::Skipped(file.display().to_string()),
            Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
        }
    });

    for (from, to) in &result.outputs {
        output::print_conversion(&from.display().to_string(), &to.display().to_string());
    }
    output::print_done(&format!(
        "Converted {} file(s) to POSCAR ({} skipped, {} failed)",
        result.success, result.skipped, result.failed
    ));
    output::print_failures(&result.failures);

    Ok(())
}

/// 转换单个文件，已存在且不覆盖时返回 `None`
fn convert_file(path: &Path, scale: f64, overwrite: bool) -> Result<Option<PathBuf>> {
    if !overwrite && poscar::poscar_path_for(path).exists() {
        return Ok(None);
    }

    let display = path.display().to_string();
    let raw = sqs::read_bestsqs_file(path).map_err(|e| e.at_stage(&display, Stage::Parse))?;
    let structure = PeriodicStructure::from_geometry(parsers::structure_name(path), &raw, scale)
        .map_err(|e| e.at_stage(&display, Stage::Build))?;

    let sqs_id = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(sqs::sqs_id_from_name);

    poscar::write_poscar(&structure, path, sqs_id)
        .map(Some)
        .map_err(|e| e.at_stage(&display, Stage::Export))
}
