//! Scoring and title-point computation for dog agility run records.
//!
//! A venue's [`scoring::ScoringMethod`]s are looked up by division, level and
//! date through a [`scoring::ScoringMethodRegistry`]; a run's measurements
//! ([`run::RunScoring`]) are then scored against the chosen method. Records
//! are read from and written to the generic [`element::Element`] tree.

pub mod callback;
pub mod config;
pub mod element;
pub mod migration;
pub mod output;
pub mod run;
pub mod scoring;
pub mod version;

#[cfg(test)]
mod tests {
    use crate::callback::CollectingCallback;
    use crate::element::Element;
    use crate::run::RunScoring;
    use crate::scoring::{EventConfig, ScoringMethod};
    use crate::version::ArbVersion;

    #[test]
    fn test_load_method_then_run() {
        let mut scoring = Element::new("Scoring");
        scoring.set_attrib("Division", "*");
        scoring.set_attrib("Level", "*");
        scoring.set_attrib("Type", "FaultsThenTime");
        scoring.set_attrib("DropFractions", "1");
        let tp = scoring.add_child("TitlePoints");
        tp.set_attrib("Points", 10);
        tp.set_attrib("Faults", 0);

        let mut run = Element::new("ByTime");
        run.set_attrib("Faults", "0");
        run.set_attrib("Time", "28.5");
        run.set_attrib("SCT", "30");

        let mut cb = CollectingCallback::new();
        let method = ScoringMethod::load(&scoring, ArbVersion::CURRENT, &mut cb).unwrap();
        let event = EventConfig::new("Jumpers");
        let run = RunScoring::load(3, &event, &method, &run, ArbVersion::CURRENT, &mut cb).unwrap();

        assert_eq!(run.time_faults(&method), 0.0);
        assert_eq!(method.title_points().lookup(0.0), 10.0);
        assert!(cb.messages().is_empty());
    }
}
