//! # 批量处理模块
//!
//! 收集输入文件并逐个解析，合并为一个数据集。
//!
//! ## 功能
//! - 输入可以是文件或目录（目录按 glob 模式匹配）
//! - 顺序解析，单个文件失败不影响其余文件
//! - 每个文件的统计与诊断信息
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `parsers/outcar.rs`
//! - 使用 `walkdir`, `glob` 遍历目录

pub mod aggregator;
pub mod collector;

pub use aggregator::{Aggregator, FileOutcome, FileReport};
pub use collector::FileCollector;
