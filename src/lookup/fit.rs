use crate::lookup::definition::WordDefinition;

/// Text area available on the flash card, in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayBudget {
    pub chars_per_line: usize,
    pub max_lines: usize,
}

impl Default for DisplayBudget {
    fn default() -> Self {
        // 768px card at ~8px per character, 8 lines tall.
        Self {
            chars_per_line: 96,
            max_lines: 8,
        }
    }
}

impl DisplayBudget {
    pub fn new(chars_per_line: usize, max_lines: usize) -> Self {
        Self {
            chars_per_line: chars_per_line.max(1),
            max_lines,
        }
    }

    /// Estimated line count of `text` once whitespace runs are collapsed.
    pub fn estimated_lines(&self, text: &str) -> usize {
        let len = collapse_whitespace(text).chars().count();
        len.div_ceil(self.chars_per_line.max(1))
    }

    pub fn fits(&self, text: &str) -> bool {
        self.estimated_lines(text) <= self.max_lines
    }

    /// Every meaning's primary sense must fit.
    pub fn fits_definition(&self, definition: &WordDefinition) -> bool {
        definition.primary_senses().all(|text| self.fits(text))
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::definition::{DefinitionSource, Meaning};

    #[test]
    fn test_short_text_fits() {
        let budget = DisplayBudget::default();
        assert!(budget.fits("Present everywhere"));
        assert_eq!(budget.estimated_lines(""), 0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let budget = DisplayBudget::new(10, 2);
        assert!(budget.fits(&"x".repeat(20)));
        assert!(!budget.fits(&"x".repeat(21)));
    }

    #[test]
    fn test_whitespace_runs_collapse_before_counting() {
        let budget = DisplayBudget::new(10, 1);
        assert!(budget.fits("abc \n\n\n   def"));
    }

    #[test]
    fn test_definition_fits_only_if_every_primary_fits() {
        let budget = DisplayBudget::new(10, 1);
        let def = WordDefinition {
            word: "w".to_string(),
            phonetic: String::new(),
            meanings: vec![
                Meaning::new("noun", "short"),
                Meaning::new("verb", "this one is far too long"),
            ],
            source: DefinitionSource::Dictionary,
        };
        assert!(!budget.fits_definition(&def));
    }
}
