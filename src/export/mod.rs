//! # 数据集导出模块
//!
//! 把离子步记录写成 extended-XYZ 训练集，可选按比例划分 train/test。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `models/step.rs`
//! - 子模块: extxyz, split

pub mod extxyz;
pub mod split;

pub use extxyz::{write_train_test, write_xyz};
pub use split::{partition, SplitOptions};
