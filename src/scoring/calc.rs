use super::points_table::PointsEntry;
use super::nearly_equal;

/// How title points are computed for a scoring method.
///
/// `Normal` uses the configured fault table. The fixed kinds ignore the table
/// and compute points from the run itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointsCalc {
    #[default]
    Normal,
    T2B,
    Uki,
}

/// Inputs the calculators may need from a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointsContext {
    pub faults: f64,
    pub time: f64,
    pub sct: f64,
    pub place: Option<u16>,
    pub in_class: Option<u16>,
}

impl PointsCalc {
    /// Parse the `Type` attribute of a `TitlePoints` element.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "normal" => Some(PointsCalc::Normal),
            "t2b" => Some(PointsCalc::T2B),
            "uki" => Some(PointsCalc::Uki),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PointsCalc::Normal => "Normal",
            PointsCalc::T2B => "T2B",
            PointsCalc::Uki => "UKI",
        }
    }

    /// Only the normal calculator has user-editable entries.
    pub fn is_configurable(&self) -> bool {
        matches!(self, PointsCalc::Normal)
    }

    pub fn points(&self, entries: &[PointsEntry], ctx: &PointsContext) -> f64 {
        match self {
            PointsCalc::Normal => step_lookup(entries, ctx.faults),
            PointsCalc::T2B => t2b_points(ctx.time, ctx.sct),
            PointsCalc::Uki => uki_points(ctx.place, ctx.in_class),
        }
    }
}

/// First entry (ascending) whose threshold is at or above `faults`.
pub fn step_lookup(entries: &[PointsEntry], faults: f64) -> f64 {
    entries
        .iter()
        .find(|e| e.faults >= faults || nearly_equal(e.faults, faults))
        .map(|e| e.points)
        .unwrap_or(0.0)
}

/// Time-to-beat points. `sct` holds the class's time to beat.
///
/// At or under the time earns 10, each started 5% over costs a point, with a
/// floor of 1.
pub fn t2b_points(time: f64, sct: f64) -> f64 {
    if time <= 0.0 || sct <= 0.0 {
        return 0.0;
    }
    if time <= sct {
        return 10.0;
    }
    let percent_over = (time - sct) / sct * 100.0;
    let steps = ((percent_over - 1e-9) / 5.0).ceil();
    (10.0 - steps).max(1.0)
}

/// Placement points, capped by class size in small classes.
pub fn uki_points(place: Option<u16>, in_class: Option<u16>) -> f64 {
    let base: u16 = match place {
        Some(1) => 5,
        Some(2) => 4,
        Some(3) => 3,
        Some(4) => 2,
        _ => 1,
    };
    let pts = match in_class {
        Some(n) if n > 0 && n < 5 => base.min(n),
        _ => base,
    };
    f64::from(pts)
}
