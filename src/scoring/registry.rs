use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::method::{ScoringMethod, TREE_SCORING};
use super::{WILDCARD_DIVISION, WILDCARD_LEVEL};
use crate::callback::LoadCallback;
use crate::element::Element;
use crate::version::ArbVersion;

/// Ordered scoring methods of one event.
///
/// Insertion order decides ties between otherwise equal matches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoringMethodRegistry {
    methods: Vec<ScoringMethod>,
}

impl ScoringMethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoringMethod> {
        self.methods.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ScoringMethod> {
        self.methods.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ScoringMethod> {
        self.methods.get_mut(index)
    }

    pub fn push(&mut self, method: ScoringMethod) {
        self.methods.push(method);
    }

    /// Append a wildcard/wildcard `FaultsThenTime` method and return it.
    pub fn add_scoring(&mut self) -> &mut ScoringMethod {
        let idx = self.methods.len();
        self.methods.push(ScoringMethod::new());
        &mut self.methods[idx]
    }

    pub fn delete_scoring(&mut self, index: usize) -> Option<ScoringMethod> {
        if index < self.methods.len() {
            Some(self.methods.remove(index))
        } else {
            None
        }
    }

    /// All methods applying to `division`/`level` on `date`.
    ///
    /// Exact matches are all collected. Failing that, the first match of
    /// exact division + wildcard level, then wildcard division + exact level,
    /// then wildcard + wildcard, is used. Methods whose window excludes
    /// `date` never match.
    pub fn find_all_events(
        &self,
        division: &str,
        level: &str,
        date: Option<NaiveDate>,
        require_title_points: bool,
    ) -> Vec<&ScoringMethod> {
        let valid = |m: &&ScoringMethod| m.is_valid_on(date);

        let mut found: Vec<&ScoringMethod> = self
            .methods
            .iter()
            .filter(valid)
            .filter(|m| m.division == division && m.level == level)
            .collect();

        if found.is_empty() {
            let fallbacks = [
                (division, WILDCARD_LEVEL),
                (WILDCARD_DIVISION, level),
                (WILDCARD_DIVISION, WILDCARD_LEVEL),
            ];
            for (div, lvl) in fallbacks {
                if let Some(m) = self
                    .methods
                    .iter()
                    .filter(valid)
                    .find(|m| m.division == div && m.level == lvl)
                {
                    debug!(
                        "Scoring for {}/{} falls back to {}/{}",
                        division, level, m.division, m.level
                    );
                    found.push(m);
                    break;
                }
            }
        }

        if require_title_points {
            found.retain(|m| !m.title_points().is_empty());
        }
        found
    }

    /// The single method applying to `division`/`level` on `date`.
    ///
    /// Overlapping validity windows are a configuration error; the first
    /// surviving method is returned and a warning logged.
    pub fn find_event(&self, division: &str, level: &str, date: Option<NaiveDate>) -> Option<&ScoringMethod> {
        let items = self.find_all_events(division, level, date, false);
        match items.len() {
            0 => None,
            1 => items.into_iter().next(),
            _ => {
                let survivors: Vec<&ScoringMethod> =
                    items.into_iter().filter(|m| m.is_valid_on(date)).collect();
                if survivors.len() > 1 {
                    // TODO: confirm with venue maintainers whether overlapping windows should be rejected at load instead
                    warn!(
                        "{} scoring methods for {}/{} overlap on {}; using the first",
                        survivors.len(),
                        division,
                        level,
                        date.map(|d| d.to_string()).unwrap_or_else(|| "an unknown date".to_string())
                    );
                }
                survivors.into_iter().next()
            }
        }
    }

    /// True if some method applies.
    pub fn verify_event(&self, division: &str, level: &str, date: Option<NaiveDate>) -> bool {
        !self.find_all_events(division, level, date, false).is_empty()
    }

    /// Load every `Scoring` child of `parent`.
    pub fn load(&mut self, parent: &Element, doc_version: ArbVersion, callback: &mut dyn LoadCallback) -> Result<()> {
        for node in parent.children_named(TREE_SCORING) {
            self.methods.push(ScoringMethod::load(node, doc_version, callback)?);
        }
        Ok(())
    }

    pub fn save(&self, parent: &mut Element) {
        for method in &self.methods {
            method.save(parent);
        }
    }
}
