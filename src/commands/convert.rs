//! # convert 命令实现
//!
//! OUTCAR -> extended-XYZ 转换流程。
//!
//! ## 功能
//! - 收集输入文件（文件或目录）
//! - 逐个解析并合并，失败文件被跳过
//! - 输出警告、失败信息和每个文件的统计表
//! - 写出 train.xyz，或按比例划分为 train/test
//!
//! ## 依赖关系
//! - 使用 `cli/mod.rs` 定义的参数
//! - 使用 `batch/`, `export/`, `parsers/outcar.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::batch::{Aggregator, FileCollector, FileOutcome, FileReport};
use crate::cli::Cli;
use crate::error::{XyzError, Result};
use crate::export::{self, SplitOptions};
use crate::parsers::outcar::ExtractOptions;
use crate::utils::{output, progress};

use tabled::{Table, Tabled};

/// 文件统计行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Steps")]
    steps: String,
    #[tabled(rename = "Frames")]
    frames: String,
    #[tabled(rename = "Warnings")]
    warnings: usize,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&FileReport> for SummaryRow {
    fn from(report: &FileReport) -> Self {
        let file = report.path.display().to_string();
        match &report.outcome {
            FileOutcome::Extracted {
                accepted_steps,
                records,
                diagnostics,
            } => SummaryRow {
                file,
                steps: accepted_steps.to_string(),
                frames: records.to_string(),
                warnings: diagnostics.len(),
                status: "ok".to_string(),
            },
            FileOutcome::Failed(_) => SummaryRow {
                file,
                steps: "-".to_string(),
                frames: "-".to_string(),
                warnings: 0,
                status: "failed".to_string(),
            },
        }
    }
}

/// 执行 convert 命令
pub fn execute(args: Cli) -> Result<()> {
    let extract_options = ExtractOptions {
        interval: args.interval,
        only_final: args.only_final,
    };
    extract_options.validate()?;

    let split_options = SplitOptions {
        test_ratio: args.test_ratio,
        random_seed: args.random_seed,
    };
    if args.train_test_split {
        split_options.validate()?;
    }

    output::print_header("Converting OUTCAR to extended XYZ");

    let files = FileCollector::new(args.inputs.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        return Err(XyzError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    output::print_info(&format!("Found {} file(s) to extract", files.len()));

    let pb = progress::create_progress_bar(files.len() as u64, "Extracting");
    let batch = Aggregator::new(extract_options).run(&files, |report| {
        pb.suspend(|| report_file(report));
        pb.inc(1);
    });
    pb.finish_and_clear();

    let rows: Vec<SummaryRow> = batch.reports.iter().map(SummaryRow::from).collect();
    println!("{}", Table::new(&rows));

    if batch.failed() > 0 {
        output::print_warning(&format!(
            "{} of {} file(s) failed and were skipped",
            batch.failed(),
            batch.reports.len()
        ));
    }

    let (succeeded, total) = (batch.success(), batch.reports.len());
    let records = batch.records;

    if args.train_test_split {
        let split = export::partition(records.len(), &split_options);
        output::print_info(&format!("The total number of data is {}", split.total()));
        output::print_info(&format!(
            "{} data will be utilized in {}, and {} data will be utilized in {}",
            split.train.len(),
            args.train_name.display(),
            split.test.len(),
            args.test_name.display()
        ));

        let (n_train, n_test) =
            export::write_train_test(&records, &split, &args.train_name, &args.test_name)?;
        output::print_success(&format!(
            "Wrote {} frame(s) to '{}'",
            n_train,
            args.train_name.display()
        ));
        output::print_success(&format!(
            "Wrote {} frame(s) to '{}'",
            n_test,
            args.test_name.display()
        ));
    } else {
        let n_train = export::write_xyz(&records, &args.train_name)?;
        output::print_success(&format!(
            "Wrote {} frame(s) to '{}'",
            n_train,
            args.train_name.display()
        ));
    }

    output::print_done(&format!("Converted {} of {} file(s)", succeeded, total));

    Ok(())
}

/// 输出单个文件的诊断和错误
fn report_file(report: &FileReport) {
    match &report.outcome {
        FileOutcome::Extracted { diagnostics, .. } => {
            for diag in diagnostics {
                output::print_warning(&format!("{}: {}", report.path.display(), diag));
            }
        }
        FileOutcome::Failed(err) => {
            output::print_error(&format!(
                "Error processing file {}: {}",
                report.path.display(),
                err
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    const STEP: &str = r#" aborting loop because EDIFF is reached
  direct lattice vectors                 reciprocal lattice vectors
     2.000000000  0.000000000  0.000000000     0.500000000  0.000000000  0.000000000
     0.000000000  2.000000000  0.000000000     0.000000000  0.500000000  0.000000000
     0.000000000  0.000000000  2.000000000     0.000000000  0.000000000  0.500000000

 POSITION                                       TOTAL-FORCE (eV/Angst)
 -----------------------------------------------------------------------------------
      0.00000      0.00000      0.00000         0.010000     -0.020000      0.030000
 -----------------------------------------------------------------------------------
    total drift:                                0.000000      0.000000      0.000000
  free  energy   TOTEN  =        -3.25000000 eV
 --------------------------------------- Ionic step -------------------------------
"#;

    fn write_outcar(path: &Path, steps: usize) {
        let mut content = " POSCAR = Si1\n".to_string();
        for _ in 0..steps {
            content.push_str(STEP);
        }
        fs::write(path, content).unwrap();
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("outcar2xyz").chain(args.iter().copied())).unwrap()
    }

    fn frame_count(path: &Path) -> usize {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .filter(|l| l.starts_with("Lattice="))
            .count()
    }

    #[test]
    fn test_convert_without_split() {
        let dir = tempfile::tempdir().unwrap();
        let outcar = dir.path().join("OUTCAR");
        let train = dir.path().join("train.xyz");
        write_outcar(&outcar, 3);

        execute(cli(&[
            outcar.to_str().unwrap(),
            "--train_name",
            train.to_str().unwrap(),
        ]))
        .unwrap();

        let content = fs::read_to_string(&train).unwrap();
        assert_eq!(frame_count(&train), 3);
        assert!(content.starts_with(
            "1\nLattice=\"2.000000000 0.000000000 0.000000000 \
             0.000000000 2.000000000 0.000000000 \
             0.000000000 0.000000000 2.000000000\" \
             Properties=species:S:1:pos:R:3:forces:R:3 energy=\"-3.25\"\n\
             Si    0.00000    0.00000    0.00000    0.010000    -0.020000    0.030000\n"
        ));
    }

    #[test]
    fn test_positive_energy_step_dropped_from_output() {
        let dir = tempfile::tempdir().unwrap();
        let outcar = dir.path().join("OUTCAR");
        let train = dir.path().join("train.xyz");

        let mut content = " POSCAR = Si1\n".to_string();
        content.push_str(&STEP.replace("-3.25000000", "0.50000000"));
        for _ in 1..100 {
            content.push_str(STEP);
        }
        fs::write(&outcar, content).unwrap();

        execute(cli(&[
            outcar.to_str().unwrap(),
            "--train_name",
            train.to_str().unwrap(),
        ]))
        .unwrap();

        let text = fs::read_to_string(&train).unwrap();
        assert_eq!(frame_count(&train), 99);
        assert!(!text.contains("energy=\"0.5\""));
    }

    #[test]
    fn test_convert_with_split_and_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        write_outcar(&dir.path().join("OUTCAR_a"), 6);
        write_outcar(&dir.path().join("OUTCAR_b"), 4);
        let train = dir.path().join("tr.xyz");
        let test = dir.path().join("te.xyz");

        execute(cli(&[
            dir.path().to_str().unwrap(),
            "--train_test_split",
            "--test_ratio",
            "0.2",
            "--train_name",
            train.to_str().unwrap(),
            "--test_name",
            test.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(frame_count(&test), 2);
        assert_eq!(frame_count(&train), 8);
    }

    #[test]
    fn test_invalid_interval_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let outcar = dir.path().join("OUTCAR");
        let train = dir.path().join("train.xyz");
        write_outcar(&outcar, 1);

        let result = execute(cli(&[
            outcar.to_str().unwrap(),
            "--interval",
            "0",
            "--train_name",
            train.to_str().unwrap(),
        ]));
        assert!(matches!(result, Err(XyzError::InvalidArgument(_))));
        assert!(!train.exists());
    }

    #[test]
    fn test_all_files_failing_still_writes_empty_output() {
        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train.xyz");
        let missing = dir.path().join("OUTCAR_missing");

        execute(cli(&[
            missing.to_str().unwrap(),
            "--train_name",
            train.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(fs::read_to_string(&train).unwrap(), "");
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(cli(&[dir.path().to_str().unwrap()]));
        assert!(matches!(result, Err(XyzError::NoFilesFound { .. })));
    }
}
