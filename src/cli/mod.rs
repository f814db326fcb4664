//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数。
//!
//! ```text
//! outcar2xyz OUTCAR_1 OUTCAR_2 runs/ --interval 5 --train_test_split --test_ratio 0.1
//! ```
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Parser;
use std::path::PathBuf;

/// outcar2xyz - VASP OUTCAR 转 extended-XYZ 训练集
#[derive(Parser, Debug)]
#[command(name = "outcar2xyz")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Extract and convert VASP OUTCAR data to extended-XYZ format for ML training",
    long_about = None
)]
pub struct Cli {
    /// OUTCAR files, or directories to scan for them
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Keep every Nth converged ionic step (the first step is always kept)
    #[arg(long, default_value_t = 1)]
    pub interval: usize,

    /// Keep only the final configuration of each file
    #[arg(long = "only_final", default_value_t = false)]
    pub only_final: bool,

    /// Name of the output training XYZ file
    #[arg(long = "train_name", default_value = "train.xyz")]
    pub train_name: PathBuf,

    /// Name of the output testing XYZ file
    #[arg(long = "test_name", default_value = "test.xyz")]
    pub test_name: PathBuf,

    /// Split the data into training and testing sets
    #[arg(long = "train_test_split", default_value_t = false)]
    pub train_test_split: bool,

    /// Ratio of data to be used for testing
    #[arg(long = "test_ratio", default_value_t = 0.1)]
    pub test_ratio: f64,

    /// Random seed for data shuffling
    #[arg(long = "random_seed", default_value_t = 42)]
    pub random_seed: u64,

    /// Glob pattern for files inside directory inputs
    #[arg(short, long, default_value = "OUTCAR*")]
    pub pattern: String,

    /// Recurse into subdirectories of directory inputs
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,
}
