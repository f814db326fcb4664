//! # 文件收集器
//!
//! 根据输入路径列表和模式收集待解析的 OUTCAR 文件。
//!
//! ## 功能
//! - 文件直接保留（不存在的路径交给聚合器报告）
//! - 目录按 glob 模式匹配，结果按路径排序
//! - 可选递归搜索
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名

use crate::error::{XyzError, Result};

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 默认匹配模式
pub const DEFAULT_PATTERN: &str = "OUTCAR*";

/// 文件收集器
pub struct FileCollector {
    /// 输入路径（按给定顺序）
    inputs: Vec<PathBuf>,
    /// 目录内的匹配模式
    pattern: glob::Pattern,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            pattern: glob::Pattern::new(DEFAULT_PATTERN).expect("valid default pattern"),
            recursive: false,
        }
    }

    /// 设置目录内的匹配模式
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.pattern = glob::Pattern::new(pattern).map_err(|e| {
            XyzError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e))
        })?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有文件，保持输入顺序
    pub fn collect(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                files.extend(self.scan_directory(input));
            } else {
                files.push(input.clone());
            }
        }
        files
    }

    fn scan_directory(&self, dir: &Path) -> Vec<PathBuf> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| self.pattern.matches(name))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }
}
