//! # 解析诊断
//!
//! 解析器不直接打印警告：可跳过的问题以 `Parsed::Discarded` 返回，
//! 再由解析器收集为 `Diagnostic` 列表，与数据一起交给调用方输出。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 产生
//! - 被 `batch/aggregator.rs`, `commands/convert.rs` 消费

use std::fmt;

/// 单个值的解析结果：有效值，或带原因的丢弃标记
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Valid(T),
    Discarded(DiscardReason),
}

/// 丢弃原因
#[derive(Debug, Clone, PartialEq)]
pub enum DiscardReason {
    /// 以 '-' 开头的元素标记
    NegativeSpeciesToken(String),
    /// 不符合 `<字母><数字>` 的元素标记
    MalformedSpeciesToken(String),
    /// 正的自由能
    PositiveEnergy(f64),
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::NegativeSpeciesToken(token) => {
                write!(f, "Skipping element starting with '-': {}", token)
            }
            DiscardReason::MalformedSpeciesToken(token) => {
                write!(f, "Skipping invalid element format: {}", token)
            }
            DiscardReason::PositiveEnergy(energy) => {
                write!(f, "Skipping positive energy value: {}", energy)
            }
        }
    }
}

/// 带行号的诊断信息
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based 行号
    pub line: usize,
    pub reason: DiscardReason,
}

impl Diagnostic {
    pub fn new(line: usize, reason: DiscardReason) -> Self {
        Diagnostic { line, reason }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(12, DiscardReason::NegativeSpeciesToken("-X5".to_string()));
        assert_eq!(
            diag.to_string(),
            "line 12: Skipping element starting with '-': -X5"
        );
    }

    #[test]
    fn test_positive_energy_message() {
        let reason = DiscardReason::PositiveEnergy(2.5);
        assert_eq!(reason.to_string(), "Skipping positive energy value: 2.5");
    }
}
