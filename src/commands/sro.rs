//! # sro 命令实现
//!
//! 计算 SQS 结构的 Warren–Cowley 短程有序参数。
//!
//! ## 功能
//! - 单文件模式：打印元素对 SRO 表格，可导出文本
//! - 批量模式：按正则收集 bestsqs 文件，并行计算，汇总为 JSON/CSV
//! - 可选写出 POSCAR
//!
//! ## 依赖关系
//! - 使用 `cli/sro.rs` 定义的参数
//! - 使用 `parsers/`, `models/`, `sro/`
//! - 使用 `batch/` 进行批量处理

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::sro::SroArgs;
use crate::error::{Result, SqsroError, Stage};
use crate::models::PeriodicStructure;
use crate::parsers::{self, poscar, sqs};
use crate::sro::{self, export, FileReport, NeighborIndex, SroCalculator, SroConfig, SroResult};
use crate::utils::{output, time};

use std::path::{Path, PathBuf};

/// 单个文件的分析结果
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: FileReport,
    pub formula: String,
    /// 结构中的元素（原子序数升序）
    pub elements: Vec<String>,
    pub n_atoms: usize,
    pub poscar: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// 执行 sro 命令
pub fn execute(args: SroArgs) -> Result<()> {
    output::print_header("Warren-Cowley Short-Range Order");

    let config = args.config();
    config.validate()?;

    output::print_sro_settings(config.scale, &config.cutoffs, &config.weights);

    if args.input.is_file() {
        execute_single_file(&args, &config)
    } else if args.input.is_dir() {
        execute_batch(&args, &config)
    } else {
        Err(SqsroError::FileNotFound {
            path: args.input.display().to_string(),
        })
    }
}

/// 分析单个结构文件：解析 -> 构建 -> 近邻搜索 -> SRO
pub fn analyze_file(path: &Path, config: &SroConfig, write_poscar: bool) -> Result<Analysis> {
    let display = path.display().to_string();
    let mut warnings = Vec::new();

    let raw = sqs::read_bestsqs_file(path).map_err(|e| e.at_stage(&display, Stage::Parse))?;
    if !raw.basis_is_identity() {
        warnings.push(format!(
            "{}: coordinate basis is not the identity matrix and is ignored",
            display
        ));
    }

    let structure = PeriodicStructure::from_geometry(parsers::structure_name(path), &raw, config.scale)
        .map_err(|e| e.at_stage(&display, Stage::Build))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| display.clone());
    let sqs_id = sqs::sqs_id_from_name(&file_name);

    let poscar = if write_poscar {
        Some(
            poscar::write_poscar(&structure, path, sqs_id)
                .map_err(|e| e.at_stage(&display, Stage::Export))?,
        )
    } else {
        None
    };

    sro::check_shapes(&config.cutoffs, &config.weights)
        .map_err(|e| e.at_stage(&display, Stage::SroCompute))?;
    let index = NeighborIndex::build(&structure, &config.cutoffs)
        .map_err(|e| e.at_stage(&display, Stage::NeighborSearch))?;
    let calculator = SroCalculator::with_index(index, structure.element_ratios(), &config.weights)
        .map_err(|e| e.at_stage(&display, Stage::SroCompute))?;
    let result = calculator.all_sro(config.elements.as_deref());

    if result.values.is_empty() {
        return Err(SqsroError::NoPairsEvaluated {
            skipped: result.skipped.len(),
        }
        .at_stage(&display, Stage::SroCompute));
    }
    for skipped in &result.skipped {
        warnings.push(format!("{}: skipped {}: {}", display, skipped.pair, skipped.reason));
    }

    let modified = time::modified_seconds(path).map_err(|e| e.at_stage(&display, Stage::Export))?;

    Ok(Analysis {
        report: FileReport::new(
            file_name,
            sqs_id,
            modified,
            time::format_timestamp(modified),
            calculator.shell_cutoffs(),
            result,
        ),
        formula: structure.formula(),
        elements: calculator.elements().to_vec(),
        n_atoms: structure.len(),
        poscar,
        warnings,
    })
}

/// 单文件模式
fn execute_single_file(args: &SroArgs, config: &SroConfig) -> Result<()> {
    output::print_info(&format!("Single file mode: '{}'", args.input.display()));

    let analysis = analyze_file(&args.input, config, args.write_poscar)?;

    output::print_success(&format!(
        "Loaded structure: {} ({} atoms)",
        analysis.formula, analysis.n_atoms
    ));
    output::print_info(&format!("Elements: {}", analysis.elements.join(", ")));
    if let Some(path) = &analysis.poscar {
        output::print_success(&format!("POSCAR saved to '{}'", path.display()));
    }
    for warning in &analysis.warnings {
        output::print_warning(warning);
    }

    print_sro_table(&analysis.report);

    let result = SroResult {
        values: analysis.report.sros.clone(),
        skipped: analysis.report.skipped.clone(),
    };
    if let Some(path) = &args.sro_out {
        export::write_sro_text(&result, path)?;
        output::print_success(&format!("SRO values saved to '{}'", path.display()));
    }

    let reports = [analysis.report];
    write_reports(&reports, args.output.as_deref(), args.csv.as_deref())
}

/// 批量处理模式
fn execute_batch(args: &SroArgs, config: &SroConfig) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        return Err(SqsroError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    output::print_info(&format!("Found {} structure files", files.len()));
    if args.sro_out.is_some() {
        output::print_warning("--sro-out only applies to single file mode, ignoring");
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Using {} parallel jobs", runner.jobs()));
    let write_poscar = args.write_poscar;
    let result = runner.run(files, |file| match analyze_file(file, config, write_poscar) {
        Ok(analysis) => ProcessResult::Success(analysis),
        Err(e) => ProcessResult::Failed(file.display().to_string(), e.to_string()),
    });

    let total = result.total();
    let mut reports: Vec<FileReport> = Vec::with_capacity(result.outputs.len());
    for analysis in result.outputs {
        for warning in &analysis.warnings {
            output::print_warning(warning);
        }
        reports.push(analysis.report);
    }
    export::sort_reports(&mut reports);

    print_summary_table(&reports);

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {}/{} succeeded, {} failed",
        result.success, total, result.failed
    ));

    output::print_failures(&result.failures);

    let json = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("results.json"));
    write_reports(&reports, Some(&json), args.csv.as_deref())
}

/// 写出 JSON / CSV 报告
fn write_reports(reports: &[FileReport], json: Option<&Path>, csv: Option<&Path>) -> Result<()> {
    if let Some(path) = json {
        export::write_json(reports, path)?;
        output::print_done(&format!("JSON report saved to '{}'", path.display()));
    }
    if let Some(path) = csv {
        export::write_csv(reports, path)?;
        output::print_done(&format!("CSV table saved to '{}'", path.display()));
    }
    Ok(())
}

/// 打印单个结构的 SRO 表格
fn print_sro_table(report: &FileReport) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct SroRow {
        #[tabled(rename = "Pair")]
        pair: String,
        #[tabled(rename = "Shells")]
        shells: String,
        #[tabled(rename = "Weighted")]
        weighted: String,
    }

    let rows: Vec<SroRow> = report
        .sros
        .iter()
        .map(|(pair, values)| {
            let (shells, weighted) = values.split_at(values.len().saturating_sub(1));
            SroRow {
                pair: pair.clone(),
                shells: shells
                    .iter()
                    .map(|v| format!("{:>7.3}", v))
                    .collect::<Vec<_>>()
                    .join(" "),
                weighted: weighted
                    .first()
                    .map(|v| format!("{:.3}", v))
                    .unwrap_or_default(),
            }
        })
        .collect();

    if !rows.is_empty() {
        let radii: Vec<String> = report.cutoffs.iter().map(|c| format!("{:.4}", c)).collect();
        output::print_header(&format!("SRO by shell (cutoffs: {} Å)", radii.join(", ")));
        println!("{}", Table::new(&rows));
    }
}

/// 打印批量模式汇总表
fn print_summary_table(reports: &[FileReport]) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "File")]
        name: String,
        #[tabled(rename = "ID")]
        sqs_id: String,
        #[tabled(rename = "Modified")]
        time: String,
        #[tabled(rename = "max |SRO| (weighted)")]
        max_sro: String,
    }

    let rows: Vec<SummaryRow> = reports
        .iter()
        .map(|r| {
            let max_sro = r
                .sros
                .values()
                .filter_map(|v| v.last())
                .map(|v| v.abs())
                .fold(0.0_f64, f64::max);
            SummaryRow {
                name: r.name.clone(),
                sqs_id: r.sqs_id.map(|id| id.to_string()).unwrap_or_default(),
                time: r.time_human.clone(),
                max_sro: format!("{:.3}", max_sro),
            }
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("{} SQS structures", rows.len()));
        println!("{}", Table::new(&rows));
    }
}
