use tracing::warn;

use super::event::VenueConfig;
use super::method::ScoringMethod;
use super::registry::ScoringMethodRegistry;
use super::nearly_equal;

/// Validate the scoring methods of one event.
/// Returns all validation errors at once (not just the first).
pub fn validate_registry(prefix: &str, registry: &ScoringMethodRegistry) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (i, method) in registry.iter().enumerate() {
        let path = format!("{}.Scoring[{}]", prefix, i);

        if method.division.trim().is_empty() {
            errors.push(format!("{}.Division: must not be empty", path));
        }
        if method.level.trim().is_empty() {
            errors.push(format!("{}.Level: must not be empty", path));
        }

        if let (Some(from), Some(to)) = (method.valid_from, method.valid_to) {
            if from > to {
                errors.push(format!(
                    "{}.ValidTo: {} is before ValidFrom {}",
                    path, to, from
                ));
            }
        }

        if !method.style().uses_points()
            && (method.opening_points() != 0 || method.closing_points() != 0)
        {
            errors.push(format!(
                "{}: opening/closing points set on {} scoring",
                path,
                method.style().as_str()
            ));
        }

        check_points_table(&mut errors, &format!("{}.TitlePoints", path), method.title_points().entries());
        check_points_table(&mut errors, &format!("{}.LifeTime", path), method.lifetime_points().entries());

        let places = method.placements().entries();
        for (j, pair) in places.windows(2).enumerate() {
            if pair[0].place >= pair[1].place {
                errors.push(format!(
                    "{}.PlaceInfo[{}]: place {} out of order or duplicated",
                    path,
                    j + 1,
                    pair[1].place
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate every event of a venue configuration.
pub fn validate_venue(venue: &VenueConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    for event in venue.events.iter() {
        let prefix = format!("Event[{}]", event.name);
        if let Err(mut event_errors) = validate_registry(&prefix, &event.scorings) {
            errors.append(&mut event_errors);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Report methods for the same division/level whose validity windows
/// overlap. Overlaps are legal, so these are warnings only.
pub fn find_overlaps(prefix: &str, registry: &ScoringMethodRegistry) -> Vec<String> {
    let methods: Vec<&ScoringMethod> = registry.iter().collect();
    let mut warnings = Vec::new();

    for (i, a) in methods.iter().enumerate() {
        for (j, b) in methods.iter().enumerate().skip(i + 1) {
            if a.division == b.division && a.level == b.level && windows_overlap(a, b) {
                let msg = format!(
                    "{}: Scoring[{}] and Scoring[{}] overlap for {}/{}",
                    prefix, i, j, a.division, a.level
                );
                warn!("{}", msg);
                warnings.push(msg);
            }
        }
    }
    warnings
}

fn windows_overlap(a: &ScoringMethod, b: &ScoringMethod) -> bool {
    let starts_before_end = |from: Option<chrono::NaiveDate>, to: Option<chrono::NaiveDate>| match (from, to) {
        (Some(from), Some(to)) => from <= to,
        _ => true,
    };
    starts_before_end(a.valid_from, b.valid_to) && starts_before_end(b.valid_from, a.valid_to)
}

fn check_points_table(errors: &mut Vec<String>, path: &str, entries: &[super::PointsEntry]) {
    for (i, pair) in entries.windows(2).enumerate() {
        if nearly_equal(pair[0].faults, pair[1].faults) {
            errors.push(format!(
                "{}[{}]: duplicate threshold {} faults",
                path,
                i + 1,
                pair[1].faults
            ));
        } else if pair[0].faults > pair[1].faults {
            errors.push(format!("{}[{}]: entries out of order", path, i + 1));
        }
    }
}
