//! # extended-XYZ 写出
//!
//! ## 帧格式
//! ```text
//! 2
//! Lattice="5.000000000 0.000000000 ..." Properties=species:S:1:pos:R:3:forces:R:3 energy="-5.0"
//! Fe    0.00000    0.00000    0.00000    0.000000    0.000000    0.000000
//! O    1.00000    1.00000    1.00000    0.000000    0.000000    0.000000
//! ```
//! 字段之间用 4 个空格分隔。坐标、力和晶格按 OUTCAR 原文写出，
//! 能量用最短往返表示。没有原子的记录不写出。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `export/split.rs` 的划分结果

use crate::error::{XyzError, Result};
use crate::export::split::Partition;
use crate::models::{Number, StepRecord};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 每原子属性定义
pub const PROPERTIES: &str = "species:S:1:pos:R:3:forces:R:3";

const FIELD_SEP: &str = "    ";

/// 最短往返表示，整数值保留 `.0`
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn join_numbers(values: &[Number], sep: &str) -> String {
    values
        .iter()
        .map(Number::as_str)
        .collect::<Vec<_>>()
        .join(sep)
}

/// 转换为单帧 extended-XYZ 文本
pub fn to_extxyz_string(record: &StepRecord) -> String {
    let mut result = String::new();
    result.push_str(&format!("{}\n", record.atom_count()));
    result.push_str(&format!(
        "Lattice=\"{}\" Properties={} energy=\"{}\"\n",
        join_numbers(&record.lattice, " "),
        PROPERTIES,
        format_float(record.energy)
    ));

    let atoms = record
        .atom_types
        .iter()
        .zip(&record.positions)
        .zip(&record.forces);
    for ((species, pos), force) in atoms {
        result.push_str(&format!(
            "{}{}{}{}{}\n",
            species,
            FIELD_SEP,
            join_numbers(pos, FIELD_SEP),
            FIELD_SEP,
            join_numbers(force, FIELD_SEP)
        ));
    }

    result
}

/// 帧写出器，记录写入的帧数
struct FrameWriter {
    path: String,
    out: BufWriter<File>,
    frames: usize,
}

impl FrameWriter {
    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| XyzError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(FrameWriter {
            path: path.display().to_string(),
            out: BufWriter::new(file),
            frames: 0,
        })
    }

    fn write(&mut self, record: &StepRecord) -> Result<()> {
        self.out
            .write_all(to_extxyz_string(record).as_bytes())
            .map_err(|e| XyzError::FileWriteError {
                path: self.path.clone(),
                source: e,
            })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<usize> {
        self.out.flush().map_err(|e| XyzError::FileWriteError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(self.frames)
    }
}

/// 写出全部记录到单个文件，返回写出的帧数
pub fn write_xyz(records: &[StepRecord], output_path: &Path) -> Result<usize> {
    let mut writer = FrameWriter::create(output_path)?;
    for record in records.iter().filter(|r| !r.is_empty()) {
        writer.write(record)?;
    }
    writer.finish()
}

/// 按划分结果写出 train/test 文件，文件内保持原始顺序
///
/// 返回 (train 帧数, test 帧数)。
pub fn write_train_test(
    records: &[StepRecord],
    partition: &Partition,
    train_path: &Path,
    test_path: &Path,
) -> Result<(usize, usize)> {
    let mut train = FrameWriter::create(train_path)?;
    let mut test = FrameWriter::create(test_path)?;
    let test_mask = partition.test_mask();

    for (n, record) in records.iter().enumerate() {
        if record.is_empty() {
            continue;
        }
        if test_mask[n] {
            test.write(record)?;
        } else {
            train.write(record)?;
        }
    }

    Ok((train.finish()?, test.finish()?))
}
