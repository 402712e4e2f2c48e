use anyhow::{bail, Result};

use super::calc::{step_lookup, PointsCalc, PointsContext};
use super::nearly_equal;
use crate::callback::{invalid_value_message, LoadCallback};
use crate::element::{AttribLookup, Element};

pub const ATTRIB_POINTS: &str = "Points";
pub const ATTRIB_FAULTS: &str = "Faults";
pub const ATTRIB_CALC: &str = "Type";

/// One step of a title or lifetime points table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointsEntry {
    pub faults: f64,
    pub points: f64,
}

/// Fault-threshold to points step function.
///
/// Entries stay sorted ascending by faults: every mutation goes through this
/// API and re-sorts when a fault value changes. Fixed calculators (T2B, UKI)
/// hold a single marker entry and refuse edits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointsTable {
    calc: PointsCalc,
    entries: Vec<PointsEntry>,
}

impl PointsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calc(&self) -> PointsCalc {
        self.calc
    }

    /// Switch calculators. A fixed calculator replaces the whole table with
    /// its marker; going back to `Normal` starts from an empty table.
    pub fn set_calc(&mut self, calc: PointsCalc) {
        if calc == self.calc {
            return;
        }
        self.calc = calc;
        self.entries.clear();
        if !calc.is_configurable() {
            self.entries.push(PointsEntry {
                faults: 0.0,
                points: 0.0,
            });
        }
    }

    pub fn is_configurable(&self) -> bool {
        self.calc.is_configurable()
    }

    pub fn entries(&self) -> &[PointsEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_exact(&self, faults: f64) -> Option<&PointsEntry> {
        self.entries.iter().find(|e| nearly_equal(e.faults, faults))
    }

    /// Returns false if the table is fixed or the fault value already exists.
    pub fn add_entry(&mut self, points: f64, faults: f64) -> bool {
        if !self.is_configurable() || self.find_exact(faults).is_some() {
            return false;
        }
        self.entries.push(PointsEntry { faults, points });
        self.sort();
        true
    }

    pub fn delete_entry(&mut self, faults: f64) -> bool {
        if !self.is_configurable() {
            return false;
        }
        match self.entries.iter().position(|e| nearly_equal(e.faults, faults)) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Change the threshold of an existing entry, keeping the table sorted.
    pub fn set_entry_faults(&mut self, old_faults: f64, new_faults: f64) -> bool {
        if !self.is_configurable() {
            return false;
        }
        if !nearly_equal(old_faults, new_faults) && self.find_exact(new_faults).is_some() {
            return false;
        }
        match self.entries.iter_mut().find(|e| nearly_equal(e.faults, old_faults)) {
            Some(entry) => {
                entry.faults = new_faults;
                self.sort();
                true
            }
            None => false,
        }
    }

    pub fn set_entry_points(&mut self, faults: f64, points: f64) -> bool {
        if !self.is_configurable() {
            return false;
        }
        match self.entries.iter_mut().find(|e| nearly_equal(e.faults, faults)) {
            Some(entry) => {
                entry.points = points;
                true
            }
            None => false,
        }
    }

    /// Plain fault lookup, 0 when no threshold covers `faults`.
    pub fn lookup(&self, faults: f64) -> f64 {
        step_lookup(&self.entries, faults)
    }

    /// Points through whichever calculator the table uses.
    pub fn points(&self, ctx: &PointsContext) -> f64 {
        self.calc.points(&self.entries, ctx)
    }

    /// Stable ascending sort by faults. Idempotent.
    pub fn sort(&mut self) {
        if self.entries.len() < 2 {
            return;
        }
        self.entries
            .sort_by(|a, b| a.faults.partial_cmp(&b.faults).unwrap_or(std::cmp::Ordering::Equal));
    }

    /// Load every `tag` child of `parent` into this table.
    pub fn load(&mut self, parent: &Element, tag: &str, callback: &mut dyn LoadCallback) -> Result<()> {
        for node in parent.children_named(tag) {
            if let Some(raw) = node.attrib(ATTRIB_CALC) {
                match PointsCalc::parse(raw) {
                    Some(PointsCalc::Normal) => {}
                    Some(calc) => {
                        self.set_calc(calc);
                        continue;
                    }
                    None => callback.log_message(&invalid_value_message(tag, ATTRIB_CALC, raw)),
                }
            }
            if !self.is_configurable() {
                callback.log_message(&format!(
                    "Ignoring <{}> entry: table uses the {} calculator",
                    tag,
                    self.calc.as_str()
                ));
                continue;
            }
            let points = match node.get_attrib::<f64>(ATTRIB_POINTS) {
                AttribLookup::Found(v) => v,
                AttribLookup::NotFound => {
                    bail!("Missing required attribute '{}' on <{}>", ATTRIB_POINTS, tag)
                }
                AttribLookup::Invalid(raw) => bail!(
                    "Invalid value '{}' for attribute '{}' on <{}>",
                    raw,
                    ATTRIB_POINTS,
                    tag
                ),
            };
            let faults = match node.get_attrib::<f64>(ATTRIB_FAULTS) {
                AttribLookup::Found(v) => v,
                AttribLookup::NotFound => 0.0,
                AttribLookup::Invalid(raw) => bail!(
                    "Invalid value '{}' for attribute '{}' on <{}>",
                    raw,
                    ATTRIB_FAULTS,
                    tag
                ),
            };
            if !self.add_entry(points, faults) {
                callback.log_message(&format!(
                    "Duplicate <{}> entry for {} faults ignored",
                    tag, faults
                ));
            }
        }
        Ok(())
    }

    pub fn save(&self, parent: &mut Element, tag: &str) {
        if !self.is_configurable() {
            parent.add_child(tag).set_attrib(ATTRIB_CALC, self.calc.as_str());
            return;
        }
        for entry in &self.entries {
            let node = parent.add_child(tag);
            node.set_attrib(ATTRIB_POINTS, entry.points);
            node.set_attrib(ATTRIB_FAULTS, entry.faults);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CollectingCallback;

    fn sample_table() -> PointsTable {
        let mut table = PointsTable::new();
        assert!(table.add_entry(5.0, 5.0));
        assert!(table.add_entry(10.0, 0.0));
        table
    }

    #[test]
    fn test_add_keeps_sorted() {
        let table = sample_table();
        let faults: Vec<f64> = table.entries().iter().map(|e| e.faults).collect();
        assert_eq!(faults, vec![0.0, 5.0]);
    }

    #[test]
    fn test_lookup_step_function() {
        let table = sample_table();
        assert_eq!(table.lookup(0.0), 10.0);
        assert_eq!(table.lookup(3.0), 5.0);
        assert_eq!(table.lookup(5.0), 5.0);
        assert_eq!(table.lookup(6.0), 0.0);
    }

    #[test]
    fn test_duplicate_faults_rejected() {
        let mut table = sample_table();
        assert!(!table.add_entry(99.0, 5.0));
        assert!(!table.add_entry(99.0, 5.0 + 1e-12));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_delete_entry() {
        let mut table = sample_table();
        assert!(table.delete_entry(5.0));
        assert!(!table.delete_entry(5.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_set_entry_faults_resorts() {
        let mut table = sample_table();
        assert!(table.set_entry_faults(0.0, 10.0));
        let faults: Vec<f64> = table.entries().iter().map(|e| e.faults).collect();
        assert_eq!(faults, vec![5.0, 10.0]);
        assert_eq!(table.lookup(7.0), 10.0);

        // Moving onto an existing threshold is refused
        assert!(!table.set_entry_faults(10.0, 5.0));
        assert!(!table.set_entry_faults(42.0, 1.0));
    }

    #[test]
    fn test_set_entry_points() {
        let mut table = sample_table();
        assert!(table.set_entry_points(5.0, 3.0));
        assert_eq!(table.lookup(4.0), 3.0);
        assert!(!table.set_entry_points(1.0, 3.0));
    }

    #[test]
    fn test_fixed_calc_rejects_edits() {
        let mut table = sample_table();
        table.set_calc(PointsCalc::T2B);
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
        assert!(!table.add_entry(1.0, 1.0));
        assert!(!table.delete_entry(0.0));
        assert!(!table.set_entry_points(0.0, 4.0));

        table.set_calc(PointsCalc::Normal);
        assert!(table.is_empty());
        assert!(table.add_entry(1.0, 1.0));
    }

    #[test]
    fn test_sort_idempotent() {
        let mut table = sample_table();
        table.sort();
        let once = table.clone();
        table.sort();
        assert_eq!(table, once);
    }

    #[test]
    fn test_load_save() {
        let mut parent = Element::new("Scoring");
        sample_table().save(&mut parent, "TitlePoints");
        assert_eq!(parent.children_named("TitlePoints").count(), 2);

        let mut cb = CollectingCallback::new();
        let mut loaded = PointsTable::new();
        loaded.load(&parent, "TitlePoints", &mut cb).unwrap();
        assert_eq!(loaded, sample_table());
        assert!(cb.messages().is_empty());
    }

    #[test]
    fn test_load_fixed_calc() {
        let mut parent = Element::new("Scoring");
        parent.add_child("TitlePoints").set_attrib("Type", "UKI");

        let mut cb = CollectingCallback::new();
        let mut loaded = PointsTable::new();
        loaded.load(&parent, "TitlePoints", &mut cb).unwrap();
        assert_eq!(loaded.calc(), PointsCalc::Uki);
        assert_eq!(loaded.len(), 1);

        let mut saved = Element::new("Scoring");
        loaded.save(&mut saved, "TitlePoints");
        assert_eq!(saved, parent);
    }

    #[test]
    fn test_load_missing_points_fails() {
        let mut parent = Element::new("Scoring");
        parent.add_child("TitlePoints").set_attrib("Faults", 0);

        let mut cb = CollectingCallback::new();
        let err = PointsTable::new()
            .load(&parent, "TitlePoints", &mut cb)
            .unwrap_err();
        assert!(err.to_string().contains("'Points'"));
    }

    #[test]
    fn test_load_duplicate_is_soft() {
        let mut parent = Element::new("Scoring");
        for _ in 0..2 {
            let node = parent.add_child("TitlePoints");
            node.set_attrib("Points", 10);
            node.set_attrib("Faults", 0);
        }

        let mut cb = CollectingCallback::new();
        let mut loaded = PointsTable::new();
        loaded.load(&parent, "TitlePoints", &mut cb).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(cb.messages().len(), 1);
    }
}
