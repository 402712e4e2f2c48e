use anyhow::{bail, Result};
use chrono::NaiveDate;

use super::placement::PlacementTable;
use super::points_table::PointsTable;
use super::{WILDCARD_DIVISION, WILDCARD_LEVEL};
use crate::callback::{invalid_value_message, LoadCallback};
use crate::element::{AttribLookup, Element, DATE_FORMAT};
use crate::migration;
use crate::run::RunScoringType;
use crate::version::ArbVersion;

pub const TREE_SCORING: &str = "Scoring";
pub const TREE_NOTE: &str = "Note";
pub const TREE_TITLE_POINTS: &str = "TitlePoints";
pub const TREE_LIFETIME_POINTS: &str = "LifeTime";

const ATTRIB_VALID_FROM: &str = "ValidFrom";
const ATTRIB_VALID_TO: &str = "ValidTo";
const ATTRIB_DIVISION: &str = "Division";
const ATTRIB_LEVEL: &str = "Level";
const ATTRIB_TYPE: &str = "Type";
const ATTRIB_DROP_FRACTIONS: &str = "DropFractions";
const ATTRIB_CLEAN_Q: &str = "CleanQ";
const ATTRIB_TIME_FAULTS_UNDER: &str = "TimeFaultsUnder";
const ATTRIB_TIME_FAULTS_OVER: &str = "TimeFaultsOver";
const ATTRIB_SUBTRACT_TIME_FAULTS: &str = "SubtractTimeFaults";
const ATTRIB_TF_MULTIPLIER: &str = "TimeFaultMultiplier";
const ATTRIB_OPENING_PTS: &str = "OpeningPts";
const ATTRIB_CLOSING_PTS: &str = "ClosingPts";
const ATTRIB_SUPER_Q: &str = "SuperQ";
const ATTRIB_DOUBLE_Q: &str = "DoubleQ";
const ATTRIB_BONUS_TITLE_PTS: &str = "BonusTitlePts";

/// How runs under a scoring method are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringStyle {
    #[default]
    FaultsThenTime,
    Faults100ThenTime,
    Faults200ThenTime,
    OpenCloseThenTime,
    ScoreThenTime,
    TimePlusFaults,
}

impl ScoringStyle {
    pub const ALL: [ScoringStyle; 6] = [
        ScoringStyle::FaultsThenTime,
        ScoringStyle::Faults100ThenTime,
        ScoringStyle::Faults200ThenTime,
        ScoringStyle::OpenCloseThenTime,
        ScoringStyle::ScoreThenTime,
        ScoringStyle::TimePlusFaults,
    ];

    /// Persisted `Type` attribute value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStyle::FaultsThenTime => "FaultsThenTime",
            ScoringStyle::Faults100ThenTime => "Faults100ThenTime",
            ScoringStyle::Faults200ThenTime => "Faults200ThenTime",
            ScoringStyle::OpenCloseThenTime => "OCScoreThenTime",
            ScoringStyle::ScoreThenTime => "ScoreThenTime",
            ScoringStyle::TimePlusFaults => "TimePlusFaults",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|style| style.as_str() == s)
    }

    /// Opening/closing point requirements only mean something here.
    pub fn uses_points(&self) -> bool {
        matches!(self, ScoringStyle::OpenCloseThenTime | ScoringStyle::ScoreThenTime)
    }
}

/// One venue/division/level/date-range scoring rule.
///
/// Division and level may be the wildcard. The style, time-fault multiplier
/// and point requirements keep invariants and so are only reachable through
/// setters; the tables keep their own.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringMethod {
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub division: String,
    pub level: String,
    pub drop_fractions: bool,
    pub clean_q_required: bool,
    pub time_faults_under: bool,
    pub time_faults_over: bool,
    pub subtract_time_faults: bool,
    pub super_q: bool,
    pub double_q: bool,
    pub speed_points: bool,
    pub bonus_title_points: bool,
    pub note: String,
    style: ScoringStyle,
    time_fault_multiplier: i16,
    opening_points: i16,
    closing_points: i16,
    placements: PlacementTable,
    title_points: PointsTable,
    lifetime_points: PointsTable,
}

impl Default for ScoringMethod {
    fn default() -> Self {
        Self {
            valid_from: None,
            valid_to: None,
            division: WILDCARD_DIVISION.to_string(),
            level: WILDCARD_LEVEL.to_string(),
            drop_fractions: false,
            clean_q_required: false,
            time_faults_under: false,
            time_faults_over: false,
            subtract_time_faults: false,
            super_q: false,
            double_q: false,
            speed_points: false,
            bonus_title_points: false,
            note: String::new(),
            style: ScoringStyle::FaultsThenTime,
            time_fault_multiplier: 1,
            opening_points: 0,
            closing_points: 0,
            placements: PlacementTable::new(),
            title_points: PointsTable::new(),
            lifetime_points: PointsTable::new(),
        }
    }
}

impl ScoringMethod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown dates are always in range; unset bounds are open.
    pub fn is_valid_on(&self, date: Option<NaiveDate>) -> bool {
        let Some(date) = date else {
            return true;
        };
        if let Some(from) = self.valid_from {
            if date < from {
                return false;
            }
        }
        if let Some(to) = self.valid_to {
            if date > to {
                return false;
            }
        }
        true
    }

    /// Display form of the validity window, empty when unbounded.
    pub fn valid_date_string(&self) -> String {
        let from = self.valid_from.map(|d| d.format(DATE_FORMAT).to_string());
        let to = self.valid_to.map(|d| d.format(DATE_FORMAT).to_string());
        match (from, to) {
            (None, None) => String::new(),
            (Some(from), None) => format!("{} -", from),
            (None, Some(to)) => format!("- {}", to),
            (Some(from), Some(to)) => format!("{} - {}", from, to),
        }
    }

    pub fn style(&self) -> ScoringStyle {
        self.style
    }

    /// Changing to a style without point requirements clears them.
    pub fn set_style(&mut self, style: ScoringStyle) {
        self.style = style;
        if !style.uses_points() {
            self.opening_points = 0;
            self.closing_points = 0;
        }
    }

    pub fn run_scoring_type(&self) -> RunScoringType {
        RunScoringType::from_style(self.style)
    }

    pub fn time_fault_multiplier(&self) -> i16 {
        self.time_fault_multiplier
    }

    /// Values below 1 become 1.
    pub fn set_time_fault_multiplier(&mut self, multiplier: i16) {
        self.time_fault_multiplier = multiplier.max(1);
    }

    pub fn opening_points(&self) -> i16 {
        self.opening_points
    }

    pub fn set_opening_points(&mut self, points: i16) {
        self.opening_points = points;
    }

    pub fn closing_points(&self) -> i16 {
        self.closing_points
    }

    pub fn set_closing_points(&mut self, points: i16) {
        self.closing_points = points;
    }

    pub fn placements(&self) -> &PlacementTable {
        &self.placements
    }

    pub fn placements_mut(&mut self) -> &mut PlacementTable {
        &mut self.placements
    }

    pub fn title_points(&self) -> &PointsTable {
        &self.title_points
    }

    pub fn title_points_mut(&mut self) -> &mut PointsTable {
        &mut self.title_points
    }

    pub fn lifetime_points(&self) -> &PointsTable {
        &self.lifetime_points
    }

    pub fn lifetime_points_mut(&mut self) -> &mut PointsTable {
        &mut self.lifetime_points
    }

    pub fn is_wildcard_division(&self) -> bool {
        self.division == WILDCARD_DIVISION
    }

    pub fn is_wildcard_level(&self) -> bool {
        self.level == WILDCARD_LEVEL
    }

    /// Load a `Scoring` node.
    ///
    /// Missing division, level or type, and unparsable numbers, abort the
    /// load. Unknown enum values and malformed booleans or dates are logged
    /// through `callback` and replaced by defaults.
    pub fn load(node: &Element, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> Result<Self> {
        if node.name() != TREE_SCORING {
            bail!("Expected <{}>, found <{}>", TREE_SCORING, node.name());
        }
        let mut method = ScoringMethod::new();

        method.valid_from = read_date(node, ATTRIB_VALID_FROM, callback);
        method.valid_to = read_date(node, ATTRIB_VALID_TO, callback);
        method.division = read_required_string(node, ATTRIB_DIVISION)?;
        method.level = read_required_string(node, ATTRIB_LEVEL)?;

        let style = match node.attrib(ATTRIB_TYPE) {
            None => bail!("Missing required attribute '{}' on <{}>", ATTRIB_TYPE, TREE_SCORING),
            Some(raw) => ScoringStyle::parse(raw).unwrap_or_else(|| {
                callback.log_message(&invalid_value_message(TREE_SCORING, ATTRIB_TYPE, raw));
                ScoringStyle::FaultsThenTime
            }),
        };

        method.drop_fractions = read_bool(node, ATTRIB_DROP_FRACTIONS, callback);
        method.clean_q_required = read_bool(node, ATTRIB_CLEAN_Q, callback);
        method.time_faults_under = read_bool(node, ATTRIB_TIME_FAULTS_UNDER, callback);
        method.time_faults_over = read_bool(node, ATTRIB_TIME_FAULTS_OVER, callback);
        method.subtract_time_faults = read_bool(node, ATTRIB_SUBTRACT_TIME_FAULTS, callback);
        method.super_q = read_bool(node, ATTRIB_SUPER_Q, callback);
        method.double_q = read_bool(node, ATTRIB_DOUBLE_Q, callback);
        method.bonus_title_points = read_bool(node, ATTRIB_BONUS_TITLE_PTS, callback);
        method.speed_points = migration::speed_points(node, doc_version, callback);

        method.set_time_fault_multiplier(read_number(node, ATTRIB_TF_MULTIPLIER, 1)?);
        method.opening_points = read_number(node, ATTRIB_OPENING_PTS, 0)?;
        method.closing_points = read_number(node, ATTRIB_CLOSING_PTS, 0)?;
        method.set_style(style);

        if let Some(note) = node.find_child(TREE_NOTE) {
            method.note = note.value().to_string();
        }

        method.placements.load(node, callback)?;
        for &(place, value) in migration::default_speed_multipliers(method.speed_points, doc_version) {
            method.placements.add_entry(place, value);
        }

        match migration::legacy_title_points(node, doc_version)? {
            Some(entries) => {
                for entry in entries {
                    method.title_points.add_entry(entry.points, entry.faults);
                }
            }
            None => method.title_points.load(node, TREE_TITLE_POINTS, callback)?,
        }

        match migration::legacy_lifetime_points(node, TREE_TITLE_POINTS, doc_version, callback)? {
            Some(entries) => {
                for entry in entries {
                    method.lifetime_points.add_entry(entry.points, entry.faults);
                }
            }
            None => method
                .lifetime_points
                .load(node, TREE_LIFETIME_POINTS, callback)?,
        }

        Ok(method)
    }

    /// Append this method as a `Scoring` child of `parent`.
    pub fn save(&self, parent: &mut Element) {
        let node = parent.add_child(TREE_SCORING);
        if let Some(from) = self.valid_from {
            node.set_attrib_date(ATTRIB_VALID_FROM, from);
        }
        if let Some(to) = self.valid_to {
            node.set_attrib_date(ATTRIB_VALID_TO, to);
        }
        node.set_attrib(ATTRIB_DIVISION, &self.division);
        node.set_attrib(ATTRIB_LEVEL, &self.level);
        node.set_attrib(ATTRIB_TYPE, self.style.as_str());

        let flags = [
            (ATTRIB_DROP_FRACTIONS, self.drop_fractions),
            (ATTRIB_CLEAN_Q, self.clean_q_required),
            (ATTRIB_TIME_FAULTS_UNDER, self.time_faults_under),
            (ATTRIB_TIME_FAULTS_OVER, self.time_faults_over),
            (ATTRIB_SUBTRACT_TIME_FAULTS, self.subtract_time_faults),
            (ATTRIB_SUPER_Q, self.super_q),
            (ATTRIB_DOUBLE_Q, self.double_q),
            (migration::ATTRIB_SPEED_PTS, self.speed_points),
            (ATTRIB_BONUS_TITLE_PTS, self.bonus_title_points),
        ];
        for (name, value) in flags {
            if value {
                node.set_attrib_bool(name, true);
            }
        }

        if self.time_fault_multiplier > 1 {
            node.set_attrib(ATTRIB_TF_MULTIPLIER, self.time_fault_multiplier);
        }
        if self.style.uses_points() {
            node.set_attrib(ATTRIB_OPENING_PTS, self.opening_points);
            node.set_attrib(ATTRIB_CLOSING_PTS, self.closing_points);
        }
        if !self.note.is_empty() {
            node.add_child(TREE_NOTE).set_value(self.note.as_str());
        }
        self.placements.save(node);
        self.title_points.save(node, TREE_TITLE_POINTS);
        self.lifetime_points.save(node, TREE_LIFETIME_POINTS);
    }
}

fn read_required_string(node: &Element, name: &str) -> Result<String> {
    match node.attrib(name) {
        Some(v) => Ok(v.to_string()),
        None => bail!("Missing required attribute '{}' on <{}>", name, node.name()),
    }
}

fn read_bool(node: &Element, name: &str, callback: &mut dyn LoadCallback) -> bool {
    match node.get_attrib_bool(name) {
        AttribLookup::Found(v) => v,
        AttribLookup::NotFound => false,
        AttribLookup::Invalid(raw) => {
            callback.log_message(&invalid_value_message(node.name(), name, &raw));
            false
        }
    }
}

fn read_date(node: &Element, name: &str, callback: &mut dyn LoadCallback) -> Option<NaiveDate> {
    match node.get_attrib_date(name) {
        AttribLookup::Found(d) => Some(d),
        AttribLookup::NotFound => None,
        AttribLookup::Invalid(raw) => {
            callback.log_message(&invalid_value_message(node.name(), name, &raw));
            None
        }
    }
}

fn read_number(node: &Element, name: &str, default: i16) -> Result<i16> {
    match node.get_attrib::<i16>(name) {
        AttribLookup::Found(v) => Ok(v),
        AttribLookup::NotFound => Ok(default),
        AttribLookup::Invalid(raw) => bail!(
            "Invalid value '{}' for attribute '{}' on <{}>",
            raw,
            name,
            node.name()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CollectingCallback;
    use crate::scoring::{PointsCalc, PointsEntry};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn load(node: &Element) -> (Result<ScoringMethod>, CollectingCallback) {
        let mut cb = CollectingCallback::new();
        let result = ScoringMethod::load(node, ArbVersion::CURRENT, &mut cb);
        (result, cb)
    }

    fn full_method() -> ScoringMethod {
        let mut method = ScoringMethod::new();
        method.division = "Open".to_string();
        method.level = "Novice".to_string();
        method.valid_from = Some(date(2010, 1, 1));
        method.valid_to = Some(date(2012, 12, 31));
        method.set_style(ScoringStyle::OpenCloseThenTime);
        method.set_opening_points(50);
        method.set_closing_points(35);
        method.drop_fractions = true;
        method.time_faults_over = true;
        method.subtract_time_faults = true;
        method.super_q = true;
        method.speed_points = true;
        method.bonus_title_points = true;
        method.set_time_fault_multiplier(2);
        method.note = "Gamblers".to_string();
        method.placements_mut().add_entry(1, 2.0);
        method.title_points_mut().add_entry(10.0, 0.0);
        method.title_points_mut().add_entry(5.0, 5.0);
        method.lifetime_points_mut().add_entry(1.0, 0.0);
        method
    }

    #[test]
    fn test_defaults() {
        let method = ScoringMethod::new();
        assert!(method.is_wildcard_division());
        assert!(method.is_wildcard_level());
        assert_eq!(method.style(), ScoringStyle::FaultsThenTime);
        assert_eq!(method.time_fault_multiplier(), 1);
        assert_eq!(method.run_scoring_type(), RunScoringType::ByTime);
    }

    #[test]
    fn test_style_tags() {
        for style in ScoringStyle::ALL {
            assert_eq!(ScoringStyle::parse(style.as_str()), Some(style));
        }
        assert_eq!(ScoringStyle::parse("OCScoreThenTime"), Some(ScoringStyle::OpenCloseThenTime));
        assert_eq!(ScoringStyle::parse("PassFail"), None);
    }

    #[test]
    fn test_is_valid_on() {
        let mut method = ScoringMethod::new();
        assert!(method.is_valid_on(Some(date(1990, 1, 1))));
        assert!(method.is_valid_on(None));

        method.valid_from = Some(date(2010, 1, 1));
        assert!(!method.is_valid_on(Some(date(2009, 12, 31))));
        assert!(method.is_valid_on(Some(date(2010, 1, 1))));
        assert!(method.is_valid_on(Some(date(2030, 1, 1))));

        method.valid_to = Some(date(2012, 12, 31));
        assert!(method.is_valid_on(Some(date(2012, 12, 31))));
        assert!(!method.is_valid_on(Some(date(2013, 1, 1))));
        assert!(method.is_valid_on(None));
    }

    #[test]
    fn test_valid_date_string() {
        let mut method = ScoringMethod::new();
        assert_eq!(method.valid_date_string(), "");
        method.valid_to = Some(date(2012, 12, 31));
        assert_eq!(method.valid_date_string(), "- 2012-12-31");
        method.valid_from = Some(date(2010, 1, 1));
        assert_eq!(method.valid_date_string(), "2010-01-01 - 2012-12-31");
        method.valid_to = None;
        assert_eq!(method.valid_date_string(), "2010-01-01 -");
    }

    #[test]
    fn test_set_style_clears_points() {
        let mut method = ScoringMethod::new();
        method.set_style(ScoringStyle::OpenCloseThenTime);
        method.set_opening_points(50);
        method.set_closing_points(35);

        method.set_style(ScoringStyle::ScoreThenTime);
        assert_eq!(method.opening_points(), 50);

        method.set_style(ScoringStyle::FaultsThenTime);
        assert_eq!(method.opening_points(), 0);
        assert_eq!(method.closing_points(), 0);
    }

    #[test]
    fn test_time_fault_multiplier_floor() {
        let mut method = ScoringMethod::new();
        method.set_time_fault_multiplier(0);
        assert_eq!(method.time_fault_multiplier(), 1);
        method.set_time_fault_multiplier(-5);
        assert_eq!(method.time_fault_multiplier(), 1);
        method.set_time_fault_multiplier(3);
        assert_eq!(method.time_fault_multiplier(), 3);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let method = full_method();
        let mut parent = Element::new("Event");
        method.save(&mut parent);

        let node = parent.find_child(TREE_SCORING).unwrap();
        let (loaded, cb) = load(node);
        assert_eq!(loaded.unwrap(), method);
        assert!(cb.messages().is_empty());
    }

    #[test]
    fn test_roundtrip_plain_method() {
        let mut method = ScoringMethod::new();
        method.title_points_mut().set_calc(PointsCalc::T2B);
        let mut parent = Element::new("Event");
        method.save(&mut parent);

        let node = parent.find_child(TREE_SCORING).unwrap();
        assert!(!node.has_attrib("OpeningPts"));
        assert!(!node.has_attrib("DropFractions"));
        let (loaded, _) = load(node);
        assert_eq!(loaded.unwrap(), method);
    }

    #[test]
    fn test_load_points_ignored_for_time_styles() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Open");
        node.set_attrib("Level", "Novice");
        node.set_attrib("Type", "FaultsThenTime");
        node.set_attrib("OpeningPts", 50);
        let (loaded, _) = load(&node);
        assert_eq!(loaded.unwrap().opening_points(), 0);
    }

    #[test]
    fn test_load_wrong_tag() {
        let node = Element::new("Event");
        let (loaded, _) = load(&node);
        assert!(loaded.is_err());
    }

    #[test]
    fn test_load_missing_required() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Open");
        node.set_attrib("Type", "FaultsThenTime");
        let (loaded, _) = load(&node);
        assert!(loaded.unwrap_err().to_string().contains("'Level'"));

        node.set_attrib("Level", "Novice");
        node.set_attrib("Type", "Nonsense");
        let (loaded, cb) = load(&node);
        assert_eq!(loaded.unwrap().style(), ScoringStyle::FaultsThenTime);
        assert_eq!(cb.messages().len(), 1);
    }

    #[test]
    fn test_load_soft_problems() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Open");
        node.set_attrib("Level", "Novice");
        node.set_attrib("Type", "FaultsThenTime");
        node.set_attrib("DropFractions", "perhaps");
        node.set_attrib("ValidFrom", "yesterday");
        let (loaded, cb) = load(&node);
        let method = loaded.unwrap();
        assert!(!method.drop_fractions);
        assert!(method.valid_from.is_none());
        assert_eq!(cb.messages().len(), 2);

        node.set_attrib("TimeFaultMultiplier", "lots");
        let (loaded, _) = load(&node);
        assert!(loaded.is_err());
    }

    #[test]
    fn test_load_legacy_points() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Standard");
        node.set_attrib("Level", "Novice");
        node.set_attrib("Type", "FaultsThenTime");
        node.set_attrib("Clean", 10);
        node.set_attrib("FaultsAllowed", 5);
        node.set_attrib("WithFaults", 5);
        node.set_attrib("MachPts", "y");

        let mut cb = CollectingCallback::new();
        let method = ScoringMethod::load(&node, ArbVersion::new(4, 0), &mut cb).unwrap();
        assert_eq!(method.title_points().len(), 2);
        assert_eq!(method.title_points().lookup(3.0), 5.0);
        assert!(method.lifetime_points().is_empty());
        assert!(method.speed_points);
        assert_eq!(method.placements().lookup(1), Some(2.0));
        assert_eq!(method.placements().lookup(2), Some(1.5));
    }

    #[test]
    fn test_load_legacy_missing_clean() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Standard");
        node.set_attrib("Level", "Novice");
        node.set_attrib("Type", "FaultsThenTime");
        node.set_attrib("FaultsAllowed", 5);
        node.set_attrib("WithFaults", 5);

        let mut cb = CollectingCallback::new();
        let err = ScoringMethod::load(&node, ArbVersion::new(4, 0), &mut cb).unwrap_err();
        assert!(err.to_string().contains("'Clean'"));
    }

    #[test]
    fn test_load_legacy_lifetime_entry() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Standard");
        node.set_attrib("Level", "Novice");
        node.set_attrib("Type", "FaultsThenTime");
        let tp = node.add_child(TREE_TITLE_POINTS);
        tp.set_attrib("Points", 10);
        tp.set_attrib("Faults", 0);
        tp.set_attrib("LifeTime", "y");
        let tp = node.add_child(TREE_TITLE_POINTS);
        tp.set_attrib("Points", 5);
        tp.set_attrib("Faults", 5);
        // Not read before lifetime tables existed
        let lt = node.add_child(TREE_LIFETIME_POINTS);
        lt.set_attrib("Points", 3);
        lt.set_attrib("Faults", 10);

        let mut cb = CollectingCallback::new();
        let method = ScoringMethod::load(&node, ArbVersion::new(9, 0), &mut cb).unwrap();
        assert_eq!(method.title_points().len(), 2);
        assert_eq!(method.lifetime_points().entries(), &[PointsEntry { faults: 0.0, points: 10.0 }]);

        let current = ScoringMethod::load(&node, ArbVersion::CURRENT, &mut cb).unwrap();
        assert_eq!(current.lifetime_points().entries(), &[PointsEntry { faults: 10.0, points: 3.0 }]);
    }

    #[test]
    fn test_load_speed_multipliers_kept_in_new_documents() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "Masters");
        node.set_attrib("Level", "Excellent");
        node.set_attrib("Type", "FaultsThenTime");
        node.set_attrib("SpeedPts", "y");
        let place = node.add_child("PlaceInfo");
        place.set_attrib("Place", 1);
        place.set_attrib("Value", 3);

        let mut cb = CollectingCallback::new();
        let old = ScoringMethod::load(&node, ArbVersion::new(12, 0), &mut cb).unwrap();
        assert_eq!(old.placements().lookup(1), Some(3.0));
        assert_eq!(old.placements().lookup(2), Some(1.5));

        let new = ScoringMethod::load(&node, ArbVersion::new(12, 3), &mut cb).unwrap();
        assert_eq!(new.placements().len(), 1);
    }

    #[test]
    fn test_load_drop_fractions_numeric() {
        let mut node = Element::new(TREE_SCORING);
        node.set_attrib("Division", "*");
        node.set_attrib("Level", "*");
        node.set_attrib("Type", "FaultsThenTime");
        node.set_attrib("DropFractions", "1");
        let tp = node.add_child(TREE_TITLE_POINTS);
        tp.set_attrib("Points", 10);
        tp.set_attrib("Faults", 0);

        let (loaded, _) = load(&node);
        let method = loaded.unwrap();
        assert!(method.drop_fractions);
        assert_eq!(method.title_points().lookup(0.0), 10.0);
    }
}
