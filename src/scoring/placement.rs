use anyhow::{bail, Result};

use crate::callback::LoadCallback;
use crate::element::{AttribLookup, Element};

pub const TREE_PLACE_INFO: &str = "PlaceInfo";
pub const ATTRIB_PLACE: &str = "Place";
pub const ATTRIB_VALUE: &str = "Value";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementEntry {
    pub place: u16,
    pub value: f64,
}

/// Placement to value (speed-point multiplier, sweepstakes points).
///
/// Exact-match lookup only; places are unique and kept ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlacementTable {
    entries: Vec<PlacementEntry>,
}

impl PlacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PlacementEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Places start at 1. Returns false for 0 or a place already present.
    pub fn add_entry(&mut self, place: u16, value: f64) -> bool {
        if place == 0 || self.entries.iter().any(|e| e.place == place) {
            return false;
        }
        self.entries.push(PlacementEntry { place, value });
        self.sort();
        true
    }

    pub fn delete_entry(&mut self, place: u16) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.place != place);
        self.entries.len() != before
    }

    pub fn lookup(&self, place: u16) -> Option<f64> {
        self.entries.iter().find(|e| e.place == place).map(|e| e.value)
    }

    pub fn sort(&mut self) {
        if self.entries.len() < 2 {
            return;
        }
        self.entries.sort_by_key(|e| e.place);
    }

    pub fn load(&mut self, parent: &Element, callback: &mut dyn LoadCallback) -> Result<()> {
        for node in parent.children_named(TREE_PLACE_INFO) {
            let place = match node.get_attrib::<u16>(ATTRIB_PLACE) {
                AttribLookup::Found(v) => v,
                AttribLookup::NotFound => bail!(
                    "Missing required attribute '{}' on <{}>",
                    ATTRIB_PLACE,
                    TREE_PLACE_INFO
                ),
                AttribLookup::Invalid(raw) => bail!(
                    "Invalid value '{}' for attribute '{}' on <{}>",
                    raw,
                    ATTRIB_PLACE,
                    TREE_PLACE_INFO
                ),
            };
            let value = match node.get_attrib::<f64>(ATTRIB_VALUE) {
                AttribLookup::Found(v) => v,
                AttribLookup::NotFound => 0.0,
                AttribLookup::Invalid(raw) => bail!(
                    "Invalid value '{}' for attribute '{}' on <{}>",
                    raw,
                    ATTRIB_VALUE,
                    TREE_PLACE_INFO
                ),
            };
            if !self.add_entry(place, value) {
                callback.log_message(&format!(
                    "<{}> for place {} ignored: duplicate or invalid place",
                    TREE_PLACE_INFO, place
                ));
            }
        }
        Ok(())
    }

    pub fn save(&self, parent: &mut Element) {
        for entry in &self.entries {
            let node = parent.add_child(TREE_PLACE_INFO);
            node.set_attrib(ATTRIB_PLACE, entry.place);
            node.set_attrib(ATTRIB_VALUE, entry.value);
        }
    }
}
