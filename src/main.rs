//! # outcar2xyz - VASP OUTCAR 转 extended-XYZ
//!
//! 从 VASP 分子动力学/结构弛豫的 OUTCAR 中提取每个收敛离子步的
//! 元素、坐标、受力、晶格和能量，写成机器学习势训练用的 extended-XYZ。
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (转换流程)
//!   │     ├── batch/     (文件收集与多文件聚合)
//!   │     ├── parsers/   (OUTCAR 解析器)
//!   │     ├── export/    (extended-XYZ 写出与 train/test 划分)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (终端输出与进度条)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod export;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
