use log::debug;

use crate::lookup::ResolveMode;
use crate::lookup::definition::{DefinitionCache, DefinitionSource, WordDefinition};
use crate::lookup::fit::DisplayBudget;
use crate::session::swipe::SwipeDirection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillEvent {
    Flip,
    Advance,
    Retreat,
    EndSession,
    /// Records an outcome for the current card, then advances.
    Swipe(SwipeDirection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillOutcome {
    Known,
    Unknown,
}

impl From<SwipeDirection> for DrillOutcome {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Right => DrillOutcome::Known,
            SwipeDirection::Left => DrillOutcome::Unknown,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrillCursor {
    pub index: usize,
    pub revealed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrillPhase {
    /// Started with no marked words.
    Empty,
    Active(DrillCursor),
    Complete,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CardDefinition {
    Loading,
    Missing,
    Ready(WordDefinition),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupRequest {
    pub word: String,
    pub mode: ResolveMode,
}

impl LookupRequest {
    fn new(word: &str, mode: ResolveMode) -> Self {
        Self {
            word: word.to_string(),
            mode,
        }
    }
}

/// Flash-card review of the marked words, one card per word in marking order.
pub struct VocabularyDrill {
    words: Vec<String>,
    phase: DrillPhase,
    outcomes: Vec<Option<DrillOutcome>>,
    furthest: usize,
    card: CardDefinition,
    awaiting: Option<ResolveMode>,
    budget: DisplayBudget,
    ended_early: bool,
}

impl VocabularyDrill {
    /// Start at the first card. Returns the lookup the first card needs, if any.
    pub fn start(
        words: &[String],
        budget: DisplayBudget,
        cache: &mut DefinitionCache,
    ) -> (Self, Option<LookupRequest>) {
        let phase = if words.is_empty() {
            DrillPhase::Empty
        } else {
            DrillPhase::Active(DrillCursor::default())
        };
        let mut drill = Self {
            words: words.to_vec(),
            phase,
            outcomes: vec![None; words.len()],
            furthest: 0,
            card: CardDefinition::Loading,
            awaiting: None,
            budget,
            ended_early: false,
        };
        let request = drill.enter(cache);
        (drill, request)
    }

    pub fn apply(&mut self, event: DrillEvent, cache: &mut DefinitionCache) -> Option<LookupRequest> {
        let DrillPhase::Active(mut cursor) = self.phase else {
            return None;
        };

        match event {
            DrillEvent::Flip => {
                cursor.revealed = !cursor.revealed;
                self.phase = DrillPhase::Active(cursor);
                None
            }
            DrillEvent::Advance => self.advance(cursor, cache),
            DrillEvent::Retreat => {
                if cursor.index == 0 {
                    return None;
                }
                self.phase = DrillPhase::Active(DrillCursor {
                    index: cursor.index - 1,
                    revealed: false,
                });
                self.enter(cache)
            }
            DrillEvent::EndSession => {
                self.ended_early = cursor.index + 1 < self.words.len();
                self.phase = DrillPhase::Complete;
                None
            }
            DrillEvent::Swipe(direction) => {
                self.outcomes[cursor.index] = Some(direction.into());
                self.advance(cursor, cache)
            }
        }
    }

    fn advance(&mut self, cursor: DrillCursor, cache: &mut DefinitionCache) -> Option<LookupRequest> {
        if cursor.index + 1 >= self.words.len() {
            self.phase = DrillPhase::Complete;
            self.awaiting = None;
            return None;
        }
        self.phase = DrillPhase::Active(DrillCursor {
            index: cursor.index + 1,
            revealed: false,
        });
        self.enter(cache)
    }

    /// Sync the card with the cache on entering an index.
    fn enter(&mut self, cache: &mut DefinitionCache) -> Option<LookupRequest> {
        let word = self.current_word()?.to_string();
        if let DrillPhase::Active(cursor) = self.phase {
            self.furthest = self.furthest.max(cursor.index);
        }
        self.awaiting = None;

        match cache.get(&word) {
            Some(Some(definition)) => {
                let definition = definition.clone();
                let request = self.concise_followup(&word, &definition, cache);
                self.card = CardDefinition::Ready(definition);
                request
            }
            Some(None) => {
                self.card = CardDefinition::Missing;
                None
            }
            None => {
                self.card = CardDefinition::Loading;
                self.awaiting = Some(ResolveMode::Full);
                Some(LookupRequest::new(&word, ResolveMode::Full))
            }
        }
    }

    /// A dictionary text too long for the card gets one concise pass.
    fn concise_followup(
        &mut self,
        word: &str,
        definition: &WordDefinition,
        cache: &mut DefinitionCache,
    ) -> Option<LookupRequest> {
        if definition.source != DefinitionSource::Dictionary
            || self.budget.fits_definition(definition)
            || cache.concise_checked(word)
        {
            return None;
        }
        debug!("{word:?} does not fit the card, asking for a concise definition");
        cache.mark_concise_checked(word);
        self.awaiting = Some(ResolveMode::Concise);
        Some(LookupRequest::new(word, ResolveMode::Concise))
    }

    /// Called after a resolution for `word` has been merged into the cache.
    /// Results for a card that is no longer current leave the display alone.
    pub fn on_resolved(
        &mut self,
        word: &str,
        mode: ResolveMode,
        cache: &mut DefinitionCache,
    ) -> Option<LookupRequest> {
        if self.current_word() != Some(word) {
            return None;
        }
        let awaited = self.awaiting == Some(mode);
        if awaited {
            self.awaiting = None;
        }

        match cache.get(word) {
            Some(Some(definition)) => {
                let definition = definition.clone();
                let request = if awaited && mode == ResolveMode::Full {
                    self.concise_followup(word, &definition, cache)
                } else {
                    None
                };
                self.card = CardDefinition::Ready(definition);
                request
            }
            Some(None) => {
                self.card = CardDefinition::Missing;
                None
            }
            None => None,
        }
    }

    pub fn phase(&self) -> DrillPhase {
        self.phase
    }

    pub fn cursor(&self) -> Option<DrillCursor> {
        match self.phase {
            DrillPhase::Active(cursor) => Some(cursor),
            _ => None,
        }
    }

    pub fn current_word(&self) -> Option<&str> {
        self.cursor()
            .and_then(|c| self.words.get(c.index))
            .map(String::as_str)
    }

    pub fn card(&self) -> &CardDefinition {
        &self.card
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.phase == DrillPhase::Complete
    }

    pub fn ended_early(&self) -> bool {
        self.ended_early
    }

    pub fn outcome(&self, index: usize) -> Option<DrillOutcome> {
        self.outcomes.get(index).copied().flatten()
    }

    /// Cards the user has seen.
    pub fn reviewed(&self) -> usize {
        if self.words.is_empty() {
            0
        } else {
            self.furthest + 1
        }
    }

    pub fn count(&self, outcome: DrillOutcome) -> usize {
        self.outcomes.iter().filter(|o| **o == Some(outcome)).count()
    }

    pub fn unknown_words(&self) -> Vec<String> {
        self.words
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, o)| **o == Some(DrillOutcome::Unknown))
            .map(|(w, _)| w.clone())
            .collect()
    }

    /// Fraction of the deck reached; a finished deck reads as full.
    pub fn progress(&self) -> f64 {
        match self.phase {
            DrillPhase::Empty => 0.0,
            DrillPhase::Complete => 1.0,
            DrillPhase::Active(cursor) => (cursor.index + 1) as f64 / self.words.len() as f64,
        }
    }
}
