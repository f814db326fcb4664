//! # VASP OUTCAR 轨迹解析器
//!
//! 单遍扫描 OUTCAR，逐行分类，提取每个保留离子步的元素列表、
//! 坐标/受力表、晶格矢量和自由能。
//!
//! ## 识别的行
//! ```text
//!  POSCAR = Fe2 O3                                   # 元素 + 数目
//!  aborting loop because EDIFF is reached            # 离子步收敛，步计数 +1
//!  ---------------- Ionic step      2 -------------  # 新离子步开始
//!   direct lattice vectors   reciprocal lattice ...  # 晶格表头
//!  POSITION                  TOTAL-FORCE (eV/Angst)  # 坐标/受力表头
//!     total drift:   ...                             # 坐标/受力表结束
//!   free  energy   TOTEN  =      -24.41538150 eV     # 自由能
//! ```
//!
//! 每个保留条件 (`counter % interval == 0 || counter == 1`) 在各个
//! 捕获点独立判断，五个列表独立追加。保留步的能量为正时，
//! 该步已追加的数据被撤回，之后也不再追加。
//!
//! 数值保留 OUTCAR 中的原始文本。
//!
//! ## 依赖关系
//! - 被 `batch/aggregator.rs` 调用
//! - 使用 `models/step.rs`, `models/diagnostic.rs`
//! - 使用 `regex` 拆分元素标记和粘连的负数

use crate::error::{XyzError, Result};
use crate::models::{Diagnostic, DiscardReason, Number, Parsed, StepLists, Vec3};

use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

const SPECIES_MARKER: &str = "POSCAR = ";
const STEP_ACCEPT_MARKER: &str = "aborting loop because EDIFF is reached";
const STEP_BOUNDARY_MARKER: &str = "Ionic step ";
const ENERGY_MARKER: &str = "free  energy";
const POSITION_MARKER: &str = "POSITION";
const FORCE_MARKER: &str = "TOTAL-FORCE";
const DRIFT_MARKER: &str = "total drift";
const LATTICE_MARKER: &str = "direct lattice vectors";
const SEPARATOR_MARKER: &str = "------------";

/// 坐标/受力表：表头之后第 3 行起为数据行
const POSITION_FIRST_ROW: usize = 3;
/// 晶格表：表头之后第 2 行起为数据行
const LATTICE_FIRST_ROW: usize = 2;

static SPECIES_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z]+\d+)+").expect("valid species regex"));
static SPECIES_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z]+)(\d+)").expect("valid species regex"));
static GLUED_MINUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)-").expect("valid lattice regex"));

/// 解析选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// 每隔多少个收敛步保留一次（第一步总是保留）
    pub interval: usize,
    /// 只保留文件中最后一个构型
    pub only_final: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            interval: 1,
            only_final: false,
        }
    }
}

impl ExtractOptions {
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(XyzError::InvalidArgument(
                "--interval must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// 单个文件的解析结果
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub steps: StepLists,
    /// 文件中收敛的离子步总数
    pub accepted_steps: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// 当前解析状态
#[derive(Debug)]
enum Mode {
    /// 不在收敛步内，忽略数据行
    Idle,
    InAcceptedStep,
    InPositionTable(PositionTable),
    InLatticeTable(LatticeTable),
}

#[derive(Debug, Default)]
struct PositionTable {
    lines_seen: usize,
    positions: Vec<Vec3>,
    forces: Vec<Vec3>,
}

#[derive(Debug, Default)]
struct LatticeTable {
    lines_seen: usize,
    components: Vec<Number>,
}

/// 当前步开始时各列表的长度，用于撤回被拒绝的步
#[derive(Debug, Default, Clone, Copy)]
struct StepMark {
    atom_types: usize,
    positions: usize,
    forces: usize,
    lattices: usize,
    energies: usize,
}

impl StepMark {
    fn of(steps: &StepLists) -> Self {
        StepMark {
            atom_types: steps.atom_types.len(),
            positions: steps.positions.len(),
            forces: steps.forces.len(),
            lattices: steps.lattices.len(),
            energies: steps.energies.len(),
        }
    }

    fn rollback(&self, steps: &mut StepLists) {
        steps.atom_types.truncate(self.atom_types);
        steps.positions.truncate(self.positions);
        steps.forces.truncate(self.forces);
        steps.lattices.truncate(self.lattices);
        steps.energies.truncate(self.energies);
    }
}

/// 最后一次解析到的数据（不受 interval 过滤）
#[derive(Debug, Default)]
struct FinalConfig {
    positions: Option<Vec<Vec3>>,
    forces: Option<Vec<Vec3>>,
    lattice: Option<Vec<Number>>,
    energy: Option<f64>,
}

/// OUTCAR 逐行解析状态机
pub struct OutcarExtractor {
    source: String,
    options: ExtractOptions,
    mode: Mode,
    step_counter: usize,
    step_mark: StepMark,
    /// 当前步因正能量被拒绝
    step_rejected: bool,
    species: Option<Vec<String>>,
    steps: StepLists,
    last: FinalConfig,
    diagnostics: Vec<Diagnostic>,
    lines_read: usize,
}

impl OutcarExtractor {
    /// `source` 仅用于错误信息
    pub fn new(source: impl Into<String>, options: ExtractOptions) -> Self {
        OutcarExtractor {
            source: source.into(),
            options,
            mode: Mode::Idle,
            step_counter: 0,
            step_mark: StepMark::default(),
            step_rejected: false,
            species: None,
            steps: StepLists::new(),
            last: FinalConfig::default(),
            diagnostics: Vec::new(),
            lines_read: 0,
        }
    }

    /// 当前步是否保留
    fn retains(&self) -> bool {
        !self.step_rejected
            && (self.step_counter % self.options.interval == 0 || self.step_counter == 1)
    }

    /// 处理一行（`line_no` 从 1 开始）
    pub fn feed_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        self.lines_read = line_no;

        if line.contains(SPECIES_MARKER) {
            self.read_species(line_no, line);
        }

        if line.contains(STEP_ACCEPT_MARKER) {
            self.accept_step(line_no)?;
        }

        if line.contains(STEP_BOUNDARY_MARKER) {
            self.mode = Mode::Idle;
        }

        if matches!(self.mode, Mode::Idle) {
            return Ok(());
        }

        if line.contains(ENERGY_MARKER) {
            self.read_energy(line_no, line)?;
        }

        let mode = std::mem::replace(&mut self.mode, Mode::Idle);
        self.mode = match mode {
            Mode::Idle | Mode::InAcceptedStep => {
                if line.contains(POSITION_MARKER) && line.contains(FORCE_MARKER) {
                    Mode::InPositionTable(PositionTable {
                        lines_seen: 1,
                        ..Default::default()
                    })
                } else if line.contains(LATTICE_MARKER) {
                    Mode::InLatticeTable(LatticeTable {
                        lines_seen: 1,
                        ..Default::default()
                    })
                } else {
                    Mode::InAcceptedStep
                }
            }
            Mode::InPositionTable(table) => self.read_position_row(table, line_no, line)?,
            Mode::InLatticeTable(table) => self.read_lattice_row(table, line_no, line)?,
        };

        Ok(())
    }

    fn read_species(&mut self, line_no: usize, line: &str) {
        let (species, discarded) = parse_species_line(line);
        self.diagnostics.extend(
            discarded
                .into_iter()
                .map(|reason| Diagnostic::new(line_no, reason)),
        );
        self.species = Some(species);
    }

    fn accept_step(&mut self, line_no: usize) -> Result<()> {
        self.step_counter += 1;
        self.step_rejected = false;
        self.step_mark = StepMark::of(&self.steps);

        if self.retains() {
            let species = self.species.clone().ok_or_else(|| {
                XyzError::parse(
                    &self.source,
                    line_no,
                    "ionic step converged before any POSCAR species header",
                )
            })?;
            self.steps.atom_types.push(species);
        }

        if matches!(self.mode, Mode::Idle) {
            self.mode = Mode::InAcceptedStep;
        }
        Ok(())
    }

    fn read_energy(&mut self, line_no: usize, line: &str) -> Result<()> {
        let parsed = parse_energy_line(line)
            .map_err(|reason| XyzError::parse(&self.source, line_no, reason))?;

        match parsed {
            Parsed::Valid(energy) => {
                if self.retains() {
                    self.steps.energies.push(energy);
                }
                self.last.energy = Some(energy);
            }
            Parsed::Discarded(reason) => {
                if self.retains() {
                    self.diagnostics.push(Diagnostic::new(line_no, reason));
                    self.step_mark.rollback(&mut self.steps);
                    self.step_rejected = true;
                }
            }
        }
        Ok(())
    }

    fn read_position_row(
        &mut self,
        mut table: PositionTable,
        line_no: usize,
        line: &str,
    ) -> Result<Mode> {
        table.lines_seen += 1;

        if line.contains(SEPARATOR_MARKER) {
            return Ok(Mode::InPositionTable(table));
        }

        if line.contains(DRIFT_MARKER) {
            if self.retains() {
                self.steps.positions.push(table.positions.clone());
                self.steps.forces.push(table.forces.clone());
            }
            self.last.positions = Some(table.positions);
            self.last.forces = Some(table.forces);
            return Ok(Mode::InAcceptedStep);
        }

        if table.lines_seen >= POSITION_FIRST_ROW {
            let [x, y, z, fx, fy, fz] = parse_leading_numbers::<6>(line)
                .map_err(|reason| XyzError::parse(&self.source, line_no, reason))?;
            table.positions.push([x, y, z]);
            table.forces.push([fx, fy, fz]);
        }

        Ok(Mode::InPositionTable(table))
    }

    fn read_lattice_row(
        &mut self,
        mut table: LatticeTable,
        line_no: usize,
        line: &str,
    ) -> Result<Mode> {
        table.lines_seen += 1;

        if line.trim().is_empty() {
            if self.retains() {
                self.steps.lattices.push(table.components.clone());
            }
            self.last.lattice = Some(table.components);
            return Ok(Mode::InAcceptedStep);
        }

        if table.lines_seen >= LATTICE_FIRST_ROW {
            let line = GLUED_MINUS.replace_all(line, "$1 -");
            let values = parse_leading_numbers::<3>(&line)
                .map_err(|reason| XyzError::parse(&self.source, line_no, reason))?;
            table.components.extend(values);
        }

        Ok(Mode::InLatticeTable(table))
    }

    /// 结束解析
    ///
    /// `only_final` 模式下返回最后解析到的构型（每个列表一个元素），
    /// 缺少任一部分时报错。
    pub fn finish(self) -> Result<Extraction> {
        let steps = if self.options.only_final {
            let missing = |what: &str| {
                XyzError::parse(
                    &self.source,
                    self.lines_read,
                    format!("no final configuration: missing {}", what),
                )
            };
            let species = self.species.clone().ok_or_else(|| missing("species header"))?;
            let last = self.last;
            StepLists {
                atom_types: vec![species],
                positions: vec![last.positions.ok_or_else(|| missing("positions"))?],
                forces: vec![last.forces.ok_or_else(|| missing("forces"))?],
                lattices: vec![last.lattice.ok_or_else(|| missing("lattice vectors"))?],
                energies: vec![last.energy.ok_or_else(|| missing("energy"))?],
            }
        } else {
            self.steps
        };

        Ok(Extraction {
            steps,
            accepted_steps: self.step_counter,
            diagnostics: self.diagnostics,
        })
    }
}

/// 解析 OUTCAR 文件
pub fn extract_outcar(path: &Path, options: &ExtractOptions) -> Result<Extraction> {
    let file = File::open(path).map_err(|e| XyzError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    extract_from_reader(BufReader::new(file), &path.display().to_string(), options)
}

/// 从任意行读取器解析
pub fn extract_from_reader<R: BufRead>(
    reader: R,
    source: &str,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let mut extractor = OutcarExtractor::new(source, *options);

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| XyzError::FileReadError {
            path: source.to_string(),
            source: e,
        })?;
        extractor.feed_line(i + 1, &line)?;
    }

    extractor.finish()
}

/// 解析单个元素标记，如 `Fe2` -> [Fe, Fe]，`Fe2O3` -> [Fe, Fe, O, O, O]
///
/// 标记必须以 `<字母><数字>` 开头；其后无法识别的尾部被忽略。
pub fn parse_species_token(token: &str) -> Parsed<Vec<String>> {
    if token.starts_with('-') {
        return Parsed::Discarded(DiscardReason::NegativeSpeciesToken(token.to_string()));
    }

    let prefix = match SPECIES_PREFIX.find(token) {
        Some(m) => m.as_str(),
        None => return Parsed::Discarded(DiscardReason::MalformedSpeciesToken(token.to_string())),
    };

    let mut species = Vec::new();
    for caps in SPECIES_GROUP.captures_iter(prefix) {
        let count: usize = match caps[2].parse() {
            Ok(n) => n,
            Err(_) => {
                return Parsed::Discarded(DiscardReason::MalformedSpeciesToken(token.to_string()))
            }
        };
        species.extend(std::iter::repeat(caps[1].to_string()).take(count));
    }

    Parsed::Valid(species)
}

/// 解析元素行，返回展开后的逐原子元素列表和被丢弃的标记
pub fn parse_species_line(line: &str) -> (Vec<String>, Vec<DiscardReason>) {
    let stripped = line.replace(SPECIES_MARKER, "");
    let mut species = Vec::new();
    let mut discarded = Vec::new();

    for token in stripped.split_whitespace() {
        match parse_species_token(token) {
            Parsed::Valid(atoms) => species.extend(atoms),
            Parsed::Discarded(reason) => discarded.push(reason),
        }
    }

    (species, discarded)
}

/// 解析能量行：取倒数第二个字段，正值被丢弃
pub fn parse_energy_line(line: &str) -> std::result::Result<Parsed<f64>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(format!("energy line has too few fields: '{}'", line.trim()));
    }

    let token = tokens[tokens.len() - 2];
    let energy: f64 = token
        .parse()
        .map_err(|_| format!("invalid energy value '{}'", token))?;

    if energy > 0.0 {
        Ok(Parsed::Discarded(DiscardReason::PositiveEnergy(energy)))
    } else {
        Ok(Parsed::Valid(energy))
    }
}

/// 解析行首的 `N` 个数值
fn parse_leading_numbers<const N: usize>(
    line: &str,
) -> std::result::Result<[Number; N], String> {
    let values: Vec<Number> = line
        .split_whitespace()
        .take(N)
        .map(Number::parse)
        .collect::<Option<_>>()
        .ok_or_else(|| format!("expected {} numeric fields: '{}'", N, line.trim()))?;

    let found = values.len();
    values.try_into().map_err(|_| {
        format!(
            "expected {} numeric fields, found {}: '{}'",
            N,
            found,
            line.trim()
        )
    })
}
