//! # train/test 划分
//!
//! 用固定种子的伪随机数发生器打乱索引，前 `floor(N * test_ratio)` 个
//! 作为测试集，其余为训练集。相同种子得到相同划分。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `export/extxyz.rs` 使用
//! - 使用 `rand` 的 `StdRng`

use crate::error::{XyzError, Result};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// 划分选项
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitOptions {
    pub test_ratio: f64,
    pub random_seed: u64,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            test_ratio: 0.1,
            random_seed: 42,
        }
    }
}

impl SplitOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.test_ratio) {
            return Err(XyzError::InvalidArgument(format!(
                "--test_ratio must be within [0, 1], got {}",
                self.test_ratio
            )));
        }
        Ok(())
    }
}

/// 划分结果（索引按打乱后的顺序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }

    /// 按原始索引标记是否属于测试集
    pub fn test_mask(&self) -> Vec<bool> {
        let mut mask = vec![false; self.total()];
        for &n in &self.test {
            mask[n] = true;
        }
        mask
    }
}

/// 打乱 `0..total` 并切分
pub fn partition(total: usize, options: &SplitOptions) -> Partition {
    let mut idx: Vec<usize> = (0..total).collect();
    let mut rng = StdRng::seed_from_u64(options.random_seed);
    idx.shuffle(&mut rng);

    let test_size = (total as f64 * options.test_ratio).floor() as usize;
    let train = idx.split_off(test_size.min(total));

    Partition { train, test: idx }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(test_ratio: f64, random_seed: u64) -> SplitOptions {
        SplitOptions {
            test_ratio,
            random_seed,
        }
    }

    #[test]
    fn test_partition_sizes() {
        let split = partition(25, &opts(0.1, 42));
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 23);
        assert_eq!(split.total(), 25);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_partition_deterministic() {
        assert_eq!(partition(100, &opts(0.2, 7)), partition(100, &opts(0.2, 7)));
        assert_ne!(
            partition(100, &opts(0.2, 7)).test,
            partition(100, &opts(0.2, 8)).test
        );
    }

    #[test]
    fn test_partition_edges() {
        let none = partition(10, &opts(0.0, 42));
        assert!(none.test.is_empty());
        assert_eq!(none.train.len(), 10);

        let all = partition(10, &opts(1.0, 42));
        assert_eq!(all.test.len(), 10);

        let empty = partition(0, &opts(0.5, 42));
        assert_eq!(empty.total(), 0);
    }

    #[test]
    fn test_test_mask() {
        let split = partition(5, &opts(0.4, 1));
        let mask = split.test_mask();
        assert_eq!(mask.iter().filter(|&&m| m).count(), 2);
        for &n in &split.test {
            assert!(mask[n]);
        }
    }

    #[test]
    fn test_validate_ratio() {
        assert!(opts(0.1, 42).validate().is_ok());
        assert!(opts(-0.1, 42).validate().is_err());
        assert!(opts(1.5, 42).validate().is_err());
    }
}
