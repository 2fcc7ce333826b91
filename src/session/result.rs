use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::drill::{DrillOutcome, VocabularyDrill};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillSummary {
    pub finished_at: DateTime<Utc>,
    pub total_words: usize,
    pub reviewed: usize,
    pub known: usize,
    pub unknown: usize,
    #[serde(default)]
    pub unknown_words: Vec<String>,
    #[serde(default)]
    pub ended_early: bool,
}

impl DrillSummary {
    pub fn from_drill(drill: &VocabularyDrill, finished_at: DateTime<Utc>) -> Self {
        Self {
            finished_at,
            total_words: drill.len(),
            reviewed: drill.reviewed(),
            known: drill.count(DrillOutcome::Known),
            unknown: drill.count(DrillOutcome::Unknown),
            unknown_words: drill.unknown_words(),
            ended_early: drill.ended_early(),
        }
    }

    /// Reviewed cards that were advanced past without a swipe.
    pub fn unrated(&self) -> usize {
        self.reviewed.saturating_sub(self.known + self.unknown)
    }

    pub fn known_percent(&self) -> f64 {
        let rated = self.known + self.unknown;
        if rated == 0 {
            return 0.0;
        }
        self.known as f64 / rated as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::definition::DefinitionCache;
    use crate::lookup::fit::DisplayBudget;
    use crate::session::drill::DrillEvent;
    use crate::session::swipe::SwipeDirection;

    #[test]
    fn test_summary_counts_outcomes() {
        let words: Vec<String> = ["a1", "b1", "c1", "d1"].iter().map(|w| w.to_string()).collect();
        let mut cache = DefinitionCache::new();
        for w in &words {
            cache.insert(w, None);
        }
        let (mut drill, _) = VocabularyDrill::start(&words, DisplayBudget::default(), &mut cache);
        drill.apply(DrillEvent::Swipe(SwipeDirection::Right), &mut cache);
        drill.apply(DrillEvent::Swipe(SwipeDirection::Left), &mut cache);
        drill.apply(DrillEvent::Flip, &mut cache);
        drill.apply(DrillEvent::EndSession, &mut cache);

        let summary = DrillSummary::from_drill(&drill, Utc::now());
        assert_eq!(summary.total_words, 4);
        assert_eq!(summary.reviewed, 3);
        assert_eq!(summary.known, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.unrated(), 1);
        assert_eq!(summary.unknown_words, vec!["b1".to_string()]);
        assert!(summary.ended_early);
        assert!((summary.known_percent() - 50.0).abs() < f64::EPSILON);
    }
}
