//! # 多文件聚合
//!
//! 按顺序解析每个 OUTCAR，把结果拼接成一个记录列表。
//!
//! ## 功能
//! - 单个文件的任何错误（读取失败、结构不完整、列表不对齐）
//!   只让该文件被跳过，其余文件继续处理
//! - 失败文件不保留任何部分结果
//! - 每个文件生成一个 `FileReport`，由调用方负责输出
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `parsers/outcar.rs`, `models/`

use crate::error::{XyzError, Result};
use crate::models::{Diagnostic, StepRecord};
use crate::parsers::outcar::{self, ExtractOptions};

use std::path::{Path, PathBuf};

/// 单个文件的处理结果
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// 解析成功
    Extracted {
        accepted_steps: usize,
        records: usize,
        diagnostics: Vec<Diagnostic>,
    },
    /// 解析失败（错误信息）
    Failed(String),
}

/// 单个文件的报告
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Extracted { .. })
    }
}

/// 聚合结果
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 按文件顺序拼接的记录
    pub records: Vec<StepRecord>,
    /// 每个文件的报告
    pub reports: Vec<FileReport>,
}

impl BatchResult {
    /// 成功数量
    pub fn success(&self) -> usize {
        self.reports.iter().filter(|r| r.is_success()).count()
    }

    /// 失败数量
    pub fn failed(&self) -> usize {
        self.reports.len() - self.success()
    }
}

/// 多文件聚合器
pub struct Aggregator {
    options: ExtractOptions,
}

impl Aggregator {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// 解析并校验单个文件
    pub fn extract_file(&self, path: &Path) -> Result<(Vec<StepRecord>, usize, Vec<Diagnostic>)> {
        if !path.exists() {
            return Err(XyzError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let extraction = outcar::extract_outcar(path, &self.options)?;
        let records = extraction
            .steps
            .into_records()
            .map_err(|reason| XyzError::MisalignedSteps {
                path: path.display().to_string(),
                reason,
            })?;

        Ok((records, extraction.accepted_steps, extraction.diagnostics))
    }

    /// 顺序处理文件列表，每处理完一个文件回调一次
    pub fn run<F>(&self, files: &[PathBuf], mut on_file: F) -> BatchResult
    where
        F: FnMut(&FileReport),
    {
        let mut result = BatchResult::default();

        for path in files {
            let outcome = match self.extract_file(path) {
                Ok((records, accepted_steps, diagnostics)) => {
                    let outcome = FileOutcome::Extracted {
                        accepted_steps,
                        records: records.len(),
                        diagnostics,
                    };
                    result.records.extend(records);
                    outcome
                }
                Err(e) => FileOutcome::Failed(e.to_string()),
            };

            let report = FileReport {
                path: path.clone(),
                outcome,
            };
            on_file(&report);
            result.reports.push(report);
        }

        result
    }
}
