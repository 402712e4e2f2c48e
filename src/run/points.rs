use super::scoring::{RunScoring, RunScoringType};
use crate::scoring::{PointsContext, ScoringMethod, ScoringStyle};

/// Result of a run as recorded by the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    pub qualified: bool,
    pub place: Option<u16>,
    pub in_class: Option<u16>,
}

/// Fault value used to look up title and lifetime tables.
///
/// Timed runs use their total, except time-plus-faults runs which use how
/// far the total plus time went past standard time. Point-scored runs only
/// carry time faults.
pub fn fault_key(run: &RunScoring, method: &ScoringMethod) -> f64 {
    match run.scoring_type() {
        RunScoringType::ByTime if method.style() == ScoringStyle::TimePlusFaults => {
            let mut score = run.total_faults(method) + run.time;
            if run.sct > 0.0 {
                score = (score - run.sct).max(0.0);
            }
            score
        }
        RunScoringType::ByTime => run.total_faults(method),
        RunScoringType::ByOpenClose | RunScoringType::ByPoints => run.time_faults(method),
        RunScoringType::Unknown => f64::from(run.course_faults),
    }
}

/// Lookup context, or `None` when the run cannot earn table points.
fn context(run: &RunScoring, method: &ScoringMethod, outcome: &RunOutcome) -> Option<PointsContext> {
    if !outcome.qualified {
        return None;
    }
    let faults = fault_key(run, method);
    if method.style() == ScoringStyle::TimePlusFaults && method.clean_q_required && faults > 0.0 {
        return None;
    }
    Some(PointsContext {
        faults,
        time: run.time,
        sct: run.sct,
        place: outcome.place,
        in_class: outcome.in_class,
    })
}

/// Title points earned by a qualifying run, including bonus points when the
/// method awards them.
pub fn title_points(run: &RunScoring, method: &ScoringMethod, outcome: &RunOutcome) -> f64 {
    let Some(ctx) = context(run, method, outcome) else {
        return 0.0;
    };
    let mut pts = method.title_points().points(&ctx);
    if method.bonus_title_points {
        pts += run.bonus_title_points;
    }
    pts
}

pub fn lifetime_points(run: &RunScoring, method: &ScoringMethod, outcome: &RunOutcome) -> f64 {
    context(run, method, outcome)
        .map(|ctx| method.lifetime_points().points(&ctx))
        .unwrap_or(0.0)
}

/// Whole speed points for a qualifying timed run.
///
/// Whole seconds under standard time, scaled by the placement table entry
/// for the run's place and truncated again.
pub fn speed_points(run: &RunScoring, method: &ScoringMethod, outcome: &RunOutcome) -> f64 {
    if !method.speed_points || !outcome.qualified || run.scoring_type() != RunScoringType::ByTime {
        return 0.0;
    }
    let pts = (run.sct - run.time).trunc();
    if pts <= 0.0 {
        return 0.0;
    }
    let multiplier = outcome
        .place
        .and_then(|place| method.placements().lookup(place))
        .unwrap_or(1.0);
    (pts * multiplier).trunc()
}
