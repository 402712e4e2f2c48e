pub mod calc;
pub mod event;
pub mod method;
pub mod placement;
pub mod points_table;
pub mod registry;
pub mod validation;

pub use calc::{PointsCalc, PointsContext};
pub use event::{EventConfig, EventList, VenueConfig};
pub use method::{ScoringMethod, ScoringStyle};
pub use placement::{PlacementEntry, PlacementTable};
pub use points_table::{PointsEntry, PointsTable};
pub use registry::ScoringMethodRegistry;
pub use validation::{find_overlaps, validate_registry, validate_venue};

/// Division matching any division.
pub const WILDCARD_DIVISION: &str = "*";
/// Level matching any level.
pub const WILDCARD_LEVEL: &str = "*";

const EPSILON: f64 = 1e-9;

/// Float comparison used for fault thresholds.
pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}
