//! # 数据模型模块
//!
//! 定义离子步记录和解析诊断的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `batch/`, `export/` 和 `commands/` 使用
//! - 子模块: step, diagnostic

pub mod diagnostic;
pub mod step;

pub use diagnostic::{Diagnostic, DiscardReason, Parsed};
pub use step::{Number, StepLists, StepRecord, Vec3};
