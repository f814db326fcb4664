//! # 统一错误处理模块
//!
//! 定义 outcar2xyz 的所有错误类型，使用 `thiserror` 派生。
//!
//! 单个 token 的问题（畸形元素标记、正能量）不是错误，
//! 而是以 `Diagnostic` 形式随数据返回，见 `models/diagnostic.rs`。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// outcar2xyz 统一错误类型
#[derive(Error, Debug)]
pub enum XyzError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误（单文件级别，由聚合器捕获）
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse OUTCAR file: {path} (line {line})\nReason: {reason}")]
    ParseError {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Extracted step data is inconsistent in {path}: {reason}")]
    MisalignedSteps { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

impl XyzError {
    /// 构造解析错误
    pub fn parse(path: impl Into<String>, line: usize, reason: impl Into<String>) -> Self {
        XyzError::ParseError {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, XyzError>;
