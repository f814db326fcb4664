//! # 离子步数据模型
//!
//! - `StepRecord`: 一个保留的离子步（元素、坐标、力、晶格、能量）
//! - `StepLists`: 解析器按列累积的五个独立列表
//!
//! 解析器对五个列表分别追加，不保证同一步原子提交；
//! `StepLists::into_records` 负责校验对齐并组装成 `StepRecord`。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 填充
//! - 被 `batch/aggregator.rs` 校验并合并
//! - 被 `export/extxyz.rs` 序列化

use std::fmt;

/// OUTCAR 中的数值，保留原始文本用于写出
#[derive(Debug, Clone)]
pub struct Number {
    value: f64,
    text: String,
}

impl Number {
    /// 解析单个数值字段
    pub fn parse(token: &str) -> Option<Self> {
        token.parse().ok().map(|value| Number {
            value,
            text: token.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// 由浮点数构造时使用最短往返表示
impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number {
            value,
            text: format!("{:?}", value),
        }
    }
}

/// 按数值比较，忽略原始文本
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl PartialEq<f64> for Number {
    fn eq(&self, other: &f64) -> bool {
        self.value == *other
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 三分量向量（坐标或力）
pub type Vec3 = [Number; 3];

/// 晶格分量数 (3x3, 行优先)
pub const LATTICE_LEN: usize = 9;

/// 一个保留的离子步
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// 每个原子的元素符号
    pub atom_types: Vec<String>,

    /// 笛卡尔坐标 (Å)
    pub positions: Vec<Vec3>,

    /// 原子受力 (eV/Å)
    pub forces: Vec<Vec3>,

    /// 晶格矢量，行优先展平
    pub lattice: Vec<Number>,

    /// 自由能 TOTEN (eV)
    pub energy: f64,
}

impl StepRecord {
    pub fn atom_count(&self) -> usize {
        self.atom_types.len()
    }

    /// 没有元素信息的记录在输出时被跳过
    pub fn is_empty(&self) -> bool {
        self.atom_types.is_empty()
    }
}

/// 按列累积的解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepLists {
    pub atom_types: Vec<Vec<String>>,
    pub positions: Vec<Vec<Vec3>>,
    pub forces: Vec<Vec<Vec3>>,
    pub lattices: Vec<Vec<Number>>,
    pub energies: Vec<f64>,
}

impl StepLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// 校验五个列表的对齐关系，并组装为记录列表
    ///
    /// 元素列表为空的记录只要求列表长度一致，
    /// 其余记录还要求坐标/力数目等于原子数、晶格为 9 个分量。
    pub fn into_records(self) -> std::result::Result<Vec<StepRecord>, String> {
        let n = self.energies.len();
        let counts = [
            ("species lists", self.atom_types.len()),
            ("position tables", self.positions.len()),
            ("force tables", self.forces.len()),
            ("lattices", self.lattices.len()),
        ];
        for (name, count) in counts {
            if count != n {
                return Err(format!("{} {} but {} energies", count, name, n));
            }
        }

        let mut records = Vec::with_capacity(n);
        let columns = self
            .atom_types
            .into_iter()
            .zip(self.positions)
            .zip(self.forces)
            .zip(self.lattices)
            .zip(self.energies);

        for (i, ((((atom_types, positions), forces), lattice), energy)) in columns.enumerate() {
            let record = StepRecord {
                atom_types,
                positions,
                forces,
                lattice,
                energy,
            };

            if !record.is_empty() {
                let natoms = record.atom_count();
                if record.positions.len() != natoms || record.forces.len() != natoms {
                    return Err(format!(
                        "step {} has {} atoms but {} positions and {} forces",
                        i + 1,
                        natoms,
                        record.positions.len(),
                        record.forces.len()
                    ));
                }
                if record.lattice.len() != LATTICE_LEN {
                    return Err(format!(
                        "step {} has {} lattice components, expected {}",
                        i + 1,
                        record.lattice.len(),
                        LATTICE_LEN
                    ));
                }
            }

            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v3(x: f64, y: f64, z: f64) -> Vec3 {
        [x.into(), y.into(), z.into()]
    }

    fn identity() -> Vec<Number> {
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
            .into_iter()
            .map(Number::from)
            .collect()
    }

    fn single_step() -> StepLists {
        StepLists {
            atom_types: vec![vec!["Fe".to_string(), "O".to_string()]],
            positions: vec![vec![v3(0.0, 0.0, 0.0), v3(1.0, 1.0, 1.0)]],
            forces: vec![vec![v3(0.0, 0.0, 0.0), v3(0.0, 0.0, 0.0)]],
            lattices: vec![identity()],
            energies: vec![-5.0],
        }
    }

    #[test]
    fn test_into_records_aligned() {
        let records = single_step().into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].atom_count(), 2);
        assert_eq!(records[0].positions[1], [1.0, 1.0, 1.0]);
        assert_eq!(records[0].energy, -5.0);
    }

    #[test]
    fn test_number_keeps_text() {
        let n = Number::parse("-0.020000").unwrap();
        assert_eq!(n, -0.02);
        assert_eq!(n.as_str(), "-0.020000");
        assert_eq!(n.to_string(), "-0.020000");
        assert_eq!(Number::parse("0.00000").unwrap(), Number::from(0.0));
        assert!(Number::parse("abc").is_none());
    }

    #[test]
    fn test_into_records_list_count_mismatch() {
        let mut lists = single_step();
        lists.energies.push(-4.0);
        let err = lists.into_records().unwrap_err();
        assert!(err.contains("1 species lists but 2 energies"));
    }

    #[test]
    fn test_into_records_atom_count_mismatch() {
        let mut lists = single_step();
        lists.forces[0].pop();
        assert!(lists.into_records().is_err());
    }

    #[test]
    fn test_into_records_bad_lattice() {
        let mut lists = single_step();
        lists.lattices[0].truncate(6);
        assert!(lists.into_records().is_err());
    }

    #[test]
    fn test_empty_species_record_kept() {
        let mut lists = single_step();
        lists.atom_types[0].clear();
        lists.lattices[0].clear();

        let records = lists.into_records().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_empty());
    }
}
