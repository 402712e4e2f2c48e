//! Conversions from older document layouts into the current model.
//!
//! Every branch on document version lives here. Each function reads the raw
//! attributes of one node together with the document version and returns
//! current-model values; the loaders never look at the version themselves.

use anyhow::{bail, Result};

use crate::callback::{invalid_value_message, LoadCallback};
use crate::element::{AttribLookup, Element};
use crate::scoring::PointsEntry;
use crate::version::ArbVersion;

/// Flat `Clean`/`FaultsAllowed`/`WithFaults` points replaced by tables.
pub const VERSION_TITLE_TABLES: ArbVersion = ArbVersion::new(5, 0);
/// `TableInYPS` replaced by an explicit has-table flag.
pub const VERSION_HAS_TABLE: ArbVersion = ArbVersion::new(8, 6);
/// `LifeTime` flag replaced by lifetime tables; `MachPts` renamed `SpeedPts`.
pub const VERSION_LIFETIME_TABLES: ArbVersion = ArbVersion::new(10, 0);
/// Speed points gained default placement multipliers.
pub const VERSION_SPEED_MULTIPLIERS: ArbVersion = ArbVersion::new(12, 3);
/// Documents from here on may carry a wrongly migrated has-table flag.
pub const VERSION_TABLE_REPAIR: ArbVersion = ArbVersion::new(12, 6);
/// Lowest embedded config version for which the table repair applies.
pub const CONFIG_VERSION_TABLE_REPAIR: u16 = 3;

const ATTRIB_LEGACY_CLEAN: &str = "Clean";
const ATTRIB_LEGACY_FAULTS_ALLOWED: &str = "FaultsAllowed";
const ATTRIB_LEGACY_WITH_FAULTS: &str = "WithFaults";
const ATTRIB_LEGACY_LIFETIME: &str = "LifeTime";
const ATTRIB_POINTS: &str = "Points";
const ATTRIB_FAULTS: &str = "Faults";

/// Placement multipliers given to speed-point methods saved before they
/// were configurable.
const DEFAULT_SPEED_MULTIPLIERS: [(u16, f64); 2] = [(1, 2.0), (2, 1.5)];
const ATTRIB_LEGACY_MACH_PTS: &str = "MachPts";
const ATTRIB_LEGACY_TABLE_IN_YPS: &str = "TableInYPS";

pub const ATTRIB_SPEED_PTS: &str = "SpeedPts";
pub const ATTRIB_HAS_TABLE: &str = "HasTable";

/// Title points synthesized from the pre-5.0 flat attributes.
///
/// Returns `None` for current documents, so the caller reads the
/// `TitlePoints` children instead. `Clean` is required in old documents.
pub fn legacy_title_points(node: &Element, doc_version: ArbVersion) -> Result<Option<Vec<PointsEntry>>> {
    if doc_version >= VERSION_TITLE_TABLES {
        return Ok(None);
    }
    let clean = match node.get_attrib::<f64>(ATTRIB_LEGACY_CLEAN) {
        AttribLookup::Found(v) => v,
        AttribLookup::NotFound => bail!(
            "Missing required attribute '{}' on <{}>",
            ATTRIB_LEGACY_CLEAN,
            node.name()
        ),
        AttribLookup::Invalid(raw) => bail!(
            "Invalid value '{}' for attribute '{}' on <{}>",
            raw,
            ATTRIB_LEGACY_CLEAN,
            node.name()
        ),
    };
    let faults_allowed = read_legacy_number(node, ATTRIB_LEGACY_FAULTS_ALLOWED)?;
    let with_faults = read_legacy_number(node, ATTRIB_LEGACY_WITH_FAULTS)?;

    let mut entries = Vec::new();
    if clean > 0.0 {
        entries.push(PointsEntry {
            faults: 0.0,
            points: clean,
        });
    }
    if faults_allowed > 0.0 && with_faults > 0.0 {
        entries.push(PointsEntry {
            faults: faults_allowed,
            points: with_faults,
        });
    }
    Ok(Some(entries))
}

/// Lifetime points of a pre-10.0 scoring method.
///
/// Those documents had no lifetime tables; each `title_tag` entry flagged
/// `LifeTime` also counted toward lifetime points. Returns `None` for
/// current documents, so the caller reads the lifetime children instead.
pub fn legacy_lifetime_points(
    node: &Element,
    title_tag: &str,
    doc_version: ArbVersion,
    callback: &mut dyn LoadCallback,
) -> Result<Option<Vec<PointsEntry>>> {
    if doc_version >= VERSION_LIFETIME_TABLES {
        return Ok(None);
    }
    let mut entries = Vec::new();
    for title in node.children_named(title_tag) {
        if !read_legacy_bool(title, ATTRIB_LEGACY_LIFETIME, callback) {
            continue;
        }
        entries.push(PointsEntry {
            faults: read_legacy_number(title, ATTRIB_FAULTS)?,
            points: read_legacy_number(title, ATTRIB_POINTS)?,
        });
    }
    Ok(Some(entries))
}

/// Placement multipliers to add to a method loaded from an older document.
pub fn default_speed_multipliers(speed_points: bool, doc_version: ArbVersion) -> &'static [(u16, f64)] {
    if speed_points && doc_version < VERSION_SPEED_MULTIPLIERS {
        &DEFAULT_SPEED_MULTIPLIERS
    } else {
        &[]
    }
}

/// Speed points flag, read from `MachPts` in older documents.
pub fn speed_points(node: &Element, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> bool {
    if doc_version < VERSION_LIFETIME_TABLES && !node.has_attrib(ATTRIB_SPEED_PTS) {
        return read_legacy_bool(node, ATTRIB_LEGACY_MACH_PTS, callback);
    }
    read_legacy_bool(node, ATTRIB_SPEED_PTS, callback)
}

/// Has-table state of a by-time run as stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableState {
    pub has_table: bool,
    /// Legacy data that can only be settled against the event configuration.
    pub needs_conversion: bool,
}

/// Read the has-table flag of a by-time run node.
///
/// Before 8.6 the document stored an inverted "adjust YPS" flag. A stored
/// false means the run had a table; anything else is left for the
/// configuration merge to decide.
pub fn run_table_state(node: &Element, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> TableState {
    if doc_version < VERSION_HAS_TABLE {
        return match node.get_attrib_bool(ATTRIB_LEGACY_TABLE_IN_YPS) {
            AttribLookup::Found(false) => TableState {
                has_table: true,
                needs_conversion: false,
            },
            _ => TableState {
                has_table: false,
                needs_conversion: true,
            },
        };
    }
    TableState {
        has_table: read_legacy_bool(node, ATTRIB_HAS_TABLE, callback),
        needs_conversion: false,
    }
}

/// Undo the old migration that marked runs as having a table even though
/// the event never uses one.
// TODO: confirm whether the repair belongs to documents before 12.6 rather than from 12.6 on
pub fn repair_table_flag(
    has_table: bool,
    doc_version: ArbVersion,
    event_has_table: bool,
    config_version: u16,
) -> bool {
    if has_table
        && doc_version >= VERSION_TABLE_REPAIR
        && !event_has_table
        && config_version >= CONFIG_VERSION_TABLE_REPAIR
    {
        return false;
    }
    has_table
}

fn read_legacy_number(node: &Element, name: &str) -> Result<f64> {
    match node.get_attrib::<f64>(name) {
        AttribLookup::Found(v) => Ok(v),
        AttribLookup::NotFound => Ok(0.0),
        AttribLookup::Invalid(raw) => bail!(
            "Invalid value '{}' for attribute '{}' on <{}>",
            raw,
            name,
            node.name()
        ),
    }
}

fn read_legacy_bool(node: &Element, name: &str, callback: &mut dyn LoadCallback) -> bool {
    match node.get_attrib_bool(name) {
        AttribLookup::Found(v) => v,
        AttribLookup::NotFound => false,
        AttribLookup::Invalid(raw) => {
            callback.log_message(&invalid_value_message(node.name(), name, &raw));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::CollectingCallback;

    #[test]
    fn test_legacy_title_points() {
        let mut node = Element::new("Scoring");
        node.set_attrib("Clean", 10);
        node.set_attrib("FaultsAllowed", 5);
        node.set_attrib("WithFaults", 5);

        let entries = legacy_title_points(&node, ArbVersion::new(4, 0)).unwrap().unwrap();
        assert_eq!(
            entries,
            vec![
                PointsEntry { faults: 0.0, points: 10.0 },
                PointsEntry { faults: 5.0, points: 5.0 },
            ]
        );

        assert!(legacy_title_points(&node, ArbVersion::new(5, 0)).unwrap().is_none());
    }

    #[test]
    fn test_legacy_title_points_partial() {
        let mut node = Element::new("Scoring");
        node.set_attrib("FaultsAllowed", 5);
        let err = legacy_title_points(&node, ArbVersion::new(3, 0)).unwrap_err();
        assert!(err.to_string().contains("'Clean'"));

        node.set_attrib("Clean", 0);
        let entries = legacy_title_points(&node, ArbVersion::new(3, 0)).unwrap().unwrap();
        assert!(entries.is_empty());

        node.set_attrib("Clean", "ten");
        assert!(legacy_title_points(&node, ArbVersion::new(3, 0)).is_err());
    }

    #[test]
    fn test_legacy_lifetime_points() {
        let mut cb = CollectingCallback::new();
        let mut node = Element::new("Scoring");
        let tp = node.add_child("TitlePoints");
        tp.set_attrib("Points", 10);
        tp.set_attrib("Faults", 0);
        tp.set_attrib("LifeTime", "y");
        let tp = node.add_child("TitlePoints");
        tp.set_attrib("Points", 5);
        tp.set_attrib("Faults", 5);

        let entries = legacy_lifetime_points(&node, "TitlePoints", ArbVersion::new(9, 0), &mut cb)
            .unwrap()
            .unwrap();
        assert_eq!(entries, vec![PointsEntry { faults: 0.0, points: 10.0 }]);
        assert!(legacy_lifetime_points(&node, "TitlePoints", ArbVersion::new(10, 0), &mut cb)
            .unwrap()
            .is_none());
        assert!(cb.messages().is_empty());
    }

    #[test]
    fn test_default_speed_multipliers() {
        assert_eq!(
            default_speed_multipliers(true, ArbVersion::new(12, 2)),
            &[(1, 2.0), (2, 1.5)]
        );
        assert!(default_speed_multipliers(true, ArbVersion::new(12, 3)).is_empty());
        assert!(default_speed_multipliers(false, ArbVersion::new(11, 0)).is_empty());
    }

    #[test]
    fn test_speed_points_rename() {
        let mut cb = CollectingCallback::new();
        let mut node = Element::new("Scoring");
        node.set_attrib("MachPts", "y");
        assert!(speed_points(&node, ArbVersion::new(9, 2), &mut cb));
        assert!(!speed_points(&node, ArbVersion::new(10, 0), &mut cb));

        node.set_attrib("SpeedPts", "n");
        assert!(!speed_points(&node, ArbVersion::new(9, 2), &mut cb));
    }

    #[test]
    fn test_run_table_state_legacy() {
        let mut cb = CollectingCallback::new();
        let old = ArbVersion::new(8, 5);

        let mut node = Element::new("ByTime");
        node.set_attrib("TableInYPS", "n");
        assert_eq!(
            run_table_state(&node, old, &mut cb),
            TableState { has_table: true, needs_conversion: false }
        );

        node.set_attrib("TableInYPS", "y");
        assert_eq!(
            run_table_state(&node, old, &mut cb),
            TableState { has_table: false, needs_conversion: true }
        );

        let bare = Element::new("ByTime");
        assert!(run_table_state(&bare, old, &mut cb).needs_conversion);
    }

    #[test]
    fn test_run_table_state_current() {
        let mut cb = CollectingCallback::new();
        let mut node = Element::new("ByTime");
        node.set_attrib("HasTable", "y");
        assert_eq!(
            run_table_state(&node, ArbVersion::new(8, 6), &mut cb),
            TableState { has_table: true, needs_conversion: false }
        );

        node.set_attrib("HasTable", "sometimes");
        let state = run_table_state(&node, ArbVersion::CURRENT, &mut cb);
        assert!(!state.has_table);
        assert_eq!(cb.messages().len(), 1);
    }

    #[test]
    fn test_repair_table_flag() {
        let v = ArbVersion::new(12, 6);
        assert!(!repair_table_flag(true, v, false, 3));
        assert!(repair_table_flag(true, v, true, 3));
        assert!(repair_table_flag(true, v, false, 2));
        assert!(repair_table_flag(true, ArbVersion::new(12, 5), false, 3));
        assert!(!repair_table_flag(false, v, true, 3));
    }
}
