use anyhow::{bail, Result};
use tracing::debug;

use crate::callback::LoadCallback;
use crate::element::{AttribLookup, Element};
use crate::migration;
use crate::scoring::{EventConfig, ScoringMethod, ScoringStyle};
use crate::version::ArbVersion;

pub const TREE_BY_TIME: &str = "ByTime";
pub const TREE_BY_OPEN_CLOSE: &str = "ByOpenClose";
pub const TREE_BY_POINTS: &str = "ByPoints";

const ATTRIB_TIME: &str = "Time";
const ATTRIB_FAULTS: &str = "Faults";
const ATTRIB_BONUS_TITLE_PTS: &str = "BonusTitlePts";
const ATTRIB_OBSTACLES: &str = "Obstacles";
const ATTRIB_SCT: &str = "SCT";
const ATTRIB_SCT2: &str = "SCT2";
const ATTRIB_YARDS: &str = "Yards";
const ATTRIB_NEED_OPEN: &str = "NeedOpenPts";
const ATTRIB_NEED_CLOSE: &str = "NeedClosePts";
const ATTRIB_OPEN: &str = "OpenPts";
const ATTRIB_CLOSE: &str = "ClosePts";
const ATTRIB_NEED_POINTS: &str = "NeedPts";
const ATTRIB_POINTS: &str = "Points";

/// Seconds assumed spent on the table.
const TABLE_TIME: f64 = 5.0;

/// Shape of a run's measurements, fixed by the scoring style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunScoringType {
    #[default]
    Unknown,
    ByTime,
    ByOpenClose,
    ByPoints,
}

impl RunScoringType {
    pub fn from_style(style: ScoringStyle) -> Self {
        match style {
            ScoringStyle::FaultsThenTime
            | ScoringStyle::Faults100ThenTime
            | ScoringStyle::Faults200ThenTime
            | ScoringStyle::TimePlusFaults => RunScoringType::ByTime,
            ScoringStyle::OpenCloseThenTime => RunScoringType::ByOpenClose,
            ScoringStyle::ScoreThenTime => RunScoringType::ByPoints,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            TREE_BY_TIME => Some(RunScoringType::ByTime),
            TREE_BY_OPEN_CLOSE => Some(RunScoringType::ByOpenClose),
            TREE_BY_POINTS => Some(RunScoringType::ByPoints),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            RunScoringType::ByTime => Some(TREE_BY_TIME),
            RunScoringType::ByOpenClose => Some(TREE_BY_OPEN_CLOSE),
            RunScoringType::ByPoints => Some(TREE_BY_POINTS),
            RunScoringType::Unknown => None,
        }
    }
}

/// Raw measurements of one run plus the values derived from them.
///
/// `ByPoints` runs keep their needed and earned points in the opening
/// fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunScoring {
    scoring_type: RunScoringType,
    round_time_faults: bool,
    table_needs_conversion: bool,
    pub sct: f64,
    pub sct2: f64,
    pub yards: f64,
    pub obstacles: i16,
    pub time: f64,
    pub has_table: bool,
    pub course_faults: i16,
    pub needed_open_points: i16,
    pub needed_close_points: i16,
    pub open_points: i16,
    pub close_points: i16,
    pub bonus_title_points: f64,
}

impl RunScoring {
    /// Empty run scored under `method`.
    pub fn for_method(method: &ScoringMethod) -> Self {
        Self {
            scoring_type: method.run_scoring_type(),
            round_time_faults: method.drop_fractions,
            ..Self::default()
        }
    }

    pub fn scoring_type(&self) -> RunScoringType {
        self.scoring_type
    }

    pub fn round_time_faults(&self) -> bool {
        self.round_time_faults
    }

    /// Legacy has-table data still waiting for the event configuration.
    pub fn table_needs_conversion(&self) -> bool {
        self.table_needs_conversion
    }

    /// Settle a deferred legacy table flag from the event configuration.
    pub fn resolve_table_conversion(&mut self, event_has_table: bool) {
        if self.table_needs_conversion {
            self.has_table = event_has_table;
            self.table_needs_conversion = false;
        }
    }

    /// Load a run node (`ByTime`, `ByOpenClose` or `ByPoints`).
    ///
    /// The run type follows `method`'s style. `config_version` is the
    /// version embedded in the document's venue configuration. Fails on a tag
    /// that is unknown or does not match the method, a missing required
    /// value, or an unparsable number.
    pub fn load(
        config_version: u16,
        event: &EventConfig,
        method: &ScoringMethod,
        node: &Element,
        doc_version: ArbVersion,
        callback: &mut dyn LoadCallback,
    ) -> Result<Self> {
        let scoring_type = method.run_scoring_type();
        if RunScoringType::from_tag(node.name()).is_none() {
            bail!("Unknown run scoring <{}>", node.name());
        }
        if scoring_type.tag() != Some(node.name()) {
            bail!(
                "Run scored <{}> but event '{}' uses {} scoring",
                node.name(),
                event.name,
                method.style().as_str()
            );
        }

        let mut run = RunScoring {
            scoring_type,
            round_time_faults: method.drop_fractions,
            ..RunScoring::default()
        };

        run.time = read_required(node, ATTRIB_TIME)?;
        run.course_faults = read_optional(node, ATTRIB_FAULTS)?;
        run.bonus_title_points = read_optional(node, ATTRIB_BONUS_TITLE_PTS)?;
        run.obstacles = read_optional(node, ATTRIB_OBSTACLES)?;

        match scoring_type {
            RunScoringType::ByTime => {
                run.sct = read_optional(node, ATTRIB_SCT)?;
                run.yards = read_optional(node, ATTRIB_YARDS)?;
                let state = migration::run_table_state(node, doc_version, callback);
                run.table_needs_conversion = state.needs_conversion;
                run.has_table = migration::repair_table_flag(
                    state.has_table,
                    doc_version,
                    event.has_table,
                    config_version,
                );
                if run.table_needs_conversion {
                    debug!("Table flag of run in '{}' left for configuration merge", event.name);
                }
            }
            RunScoringType::ByOpenClose => {
                run.sct = read_optional(node, ATTRIB_SCT)?;
                run.sct2 = read_optional(node, ATTRIB_SCT2)?;
                run.needed_open_points = read_required(node, ATTRIB_NEED_OPEN)?;
                run.needed_close_points = read_required(node, ATTRIB_NEED_CLOSE)?;
                run.open_points = read_required(node, ATTRIB_OPEN)?;
                run.close_points = read_required(node, ATTRIB_CLOSE)?;
            }
            RunScoringType::ByPoints => {
                run.sct = read_optional(node, ATTRIB_SCT)?;
                run.needed_open_points = read_required(node, ATTRIB_NEED_POINTS)?;
                run.open_points = read_required(node, ATTRIB_POINTS)?;
            }
            RunScoringType::Unknown => bail!("Unknown run scoring <{}>", node.name()),
        }

        Ok(run)
    }

    /// Append this run as a child of `parent`. Zero-valued optional fields
    /// are left out; time and point fields are always written.
    pub fn save(&self, parent: &mut Element) -> Result<()> {
        let Some(tag) = self.scoring_type.tag() else {
            bail!("Cannot save run scoring of unknown type");
        };
        let node = parent.add_child(tag);

        if self.course_faults != 0 {
            node.set_attrib(ATTRIB_FAULTS, self.course_faults);
        }
        node.set_attrib(ATTRIB_TIME, self.time);
        if self.bonus_title_points != 0.0 {
            node.set_attrib(ATTRIB_BONUS_TITLE_PTS, self.bonus_title_points);
        }
        if self.obstacles != 0 {
            node.set_attrib(ATTRIB_OBSTACLES, self.obstacles);
        }
        if self.sct != 0.0 {
            node.set_attrib(ATTRIB_SCT, self.sct);
        }

        match self.scoring_type {
            RunScoringType::ByTime => {
                node.set_attrib(ATTRIB_YARDS, self.yards);
                if self.has_table {
                    node.set_attrib_bool(migration::ATTRIB_HAS_TABLE, true);
                }
            }
            RunScoringType::ByOpenClose => {
                if self.sct2 != 0.0 {
                    node.set_attrib(ATTRIB_SCT2, self.sct2);
                }
                node.set_attrib(ATTRIB_NEED_OPEN, self.needed_open_points);
                node.set_attrib(ATTRIB_NEED_CLOSE, self.needed_close_points);
                node.set_attrib(ATTRIB_OPEN, self.open_points);
                node.set_attrib(ATTRIB_CLOSE, self.close_points);
            }
            RunScoringType::ByPoints => {
                node.set_attrib(ATTRIB_NEED_POINTS, self.needed_open_points);
                node.set_attrib(ATTRIB_POINTS, self.open_points);
            }
            RunScoringType::Unknown => {}
        }
        Ok(())
    }

    fn speed_time(&self, t: f64, table_in_yps: bool) -> f64 {
        if self.has_table && t > TABLE_TIME && !table_in_yps {
            t - TABLE_TIME
        } else {
            t
        }
    }

    /// Yards per second needed to make standard course time.
    pub fn min_yps(&self, table_in_yps: bool) -> Option<f64> {
        if self.scoring_type != RunScoringType::ByTime || self.yards <= 0.0 || self.sct <= 0.0 {
            return None;
        }
        Some(self.yards / self.speed_time(self.sct, table_in_yps))
    }

    /// Yards per second for the run's time, or for `time` when given.
    pub fn yps(&self, table_in_yps: bool, time: Option<f64>) -> Option<f64> {
        let t = time.unwrap_or(self.time);
        if self.scoring_type != RunScoringType::ByTime || self.yards <= 0.0 || t <= 0.0 {
            return None;
        }
        Some(self.yards / self.speed_time(t, table_in_yps))
    }

    /// Obstacles per second.
    ///
    /// Gamble-style runs that went past the opening time are measured
    /// against the opening time unless `run_time_in_ops` asks for the full
    /// run time.
    pub fn obstacles_ps(&self, table_in_yps: bool, run_time_in_ops: bool) -> Option<f64> {
        if self.obstacles <= 0 || self.time <= 0.0 {
            return None;
        }
        let t = match self.scoring_type {
            RunScoringType::ByTime => self.speed_time(self.time, table_in_yps),
            RunScoringType::ByOpenClose
                if !run_time_in_ops && self.time > self.sct && self.sct2 > 0.0 =>
            {
                self.sct
            }
            _ => self.time,
        };
        if t <= 0.0 {
            return None;
        }
        Some(f64::from(self.obstacles) / t)
    }

    /// Time faults under `method`, already multiplied.
    pub fn time_faults(&self, method: &ScoringMethod) -> f64 {
        if self.scoring_type == RunScoringType::Unknown {
            return 0.0;
        }
        let mut sct = self.sct;
        let (add_under, add_over) = if self.scoring_type == RunScoringType::ByTime {
            if method.style() == ScoringStyle::TimePlusFaults {
                (method.time_faults_under, method.time_faults_over)
            } else {
                (false, true)
            }
        } else {
            sct += self.sct2;
            (method.time_faults_under, method.time_faults_over)
        };

        let mut faults = 0.0;
        if sct > 0.0 {
            if add_under {
                let t = if self.round_time_faults { self.time.ceil() } else { self.time };
                if t < sct {
                    faults = sct - t;
                }
            }
            if add_over {
                let t = if self.round_time_faults { self.time.floor() } else { self.time };
                // TODO: decide with the rules owner whether under and over faults should add rather than replace
                if t > sct {
                    faults = t - sct;
                }
            }
        }
        faults * f64::from(method.time_fault_multiplier())
    }

    pub fn total_faults(&self, method: &ScoringMethod) -> f64 {
        f64::from(self.course_faults) + self.time_faults(method)
    }

    /// Score in the method's own terms.
    pub fn score(&self, method: &ScoringMethod) -> f64 {
        let time_faults = self.time_faults(method);
        let subtract = if method.subtract_time_faults { time_faults } else { 0.0 };
        let total = f64::from(self.course_faults) + time_faults;
        match method.style() {
            ScoringStyle::FaultsThenTime => total,
            ScoringStyle::Faults100ThenTime => 100.0 - total,
            ScoringStyle::Faults200ThenTime => 200.0 - total,
            ScoringStyle::TimePlusFaults => self.time + total,
            ScoringStyle::OpenCloseThenTime => {
                f64::from(self.open_points) + f64::from(self.close_points) - subtract
            }
            ScoringStyle::ScoreThenTime => f64::from(self.open_points) - subtract,
        }
    }

    /// Whether the measured values satisfy the method's requirements.
    pub fn meets_requirements(&self, method: &ScoringMethod) -> bool {
        match self.scoring_type {
            RunScoringType::ByTime => {
                !method.clean_q_required || self.total_faults(method) == 0.0
            }
            RunScoringType::ByOpenClose => {
                // Tournament gambles set no closing requirement and count
                // closing points toward the opening total.
                (self.open_points >= self.needed_open_points
                    && self.close_points >= self.needed_close_points)
                    || (self.needed_close_points == 0
                        && self.needed_open_points <= self.open_points + self.close_points)
            }
            RunScoringType::ByPoints => self.open_points >= self.needed_open_points,
            RunScoringType::Unknown => false,
        }
    }
}

fn read_required<T: std::str::FromStr>(node: &Element, name: &str) -> Result<T> {
    match node.get_attrib::<T>(name) {
        AttribLookup::Found(v) => Ok(v),
        AttribLookup::NotFound => {
            bail!("Missing required attribute '{}' on <{}>", name, node.name())
        }
        AttribLookup::Invalid(raw) => bail!(
            "Invalid value '{}' for attribute '{}' on <{}>",
            raw,
            name,
            node.name()
        ),
    }
}

fn read_optional<T: std::str::FromStr + Default>(node: &Element, name: &str) -> Result<T> {
    match node.get_attrib::<T>(name) {
        AttribLookup::Found(v) => Ok(v),
        AttribLookup::NotFound => Ok(T::default()),
        AttribLookup::Invalid(raw) => bail!(
            "Invalid value '{}' for attribute '{}' on <{}>",
            raw,
            name,
            node.name()
        ),
    }
}
