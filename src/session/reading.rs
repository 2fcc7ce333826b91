use crate::lookup::definition::{DefinitionCache, WordDefinition};
use crate::session::marked::{MarkedWordSet, Toggle, normalize_token};

/// Senses shown per part of speech in the hover tooltip.
pub const TOOLTIP_SENSES_PER_POS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub paragraph: usize,
}

impl Token {
    pub fn normalized(&self) -> Option<String> {
        normalize_token(&self.text)
    }
}

/// Split a passage on whitespace. Blank lines separate paragraphs.
pub fn tokenize(passage: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut paragraph = 0;
    let mut paragraph_has_words = false;
    for line in passage.lines() {
        if line.trim().is_empty() {
            if paragraph_has_words {
                paragraph += 1;
                paragraph_has_words = false;
            }
            continue;
        }
        for word in line.split_whitespace() {
            tokens.push(Token {
                text: word.to_string(),
                paragraph,
            });
            paragraph_has_words = true;
        }
    }
    tokens
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub token: usize,
    pub line: usize,
    pub col: u16,
    pub width: u16,
}

/// Word-wrapped positions of every token for a given width. Rendering and
/// mouse hit-testing share it so they always agree.
#[derive(Clone, Debug, Default)]
pub struct PassageLayout {
    placements: Vec<Placement>,
    line_count: usize,
}

impl PassageLayout {
    pub fn new(tokens: &[Token], width: u16) -> Self {
        let width = width.max(1);
        let mut placements = Vec::with_capacity(tokens.len());
        let mut line = 0;
        let mut col: u16 = 0;
        let mut paragraph = tokens.first().map(|t| t.paragraph).unwrap_or(0);

        for (idx, token) in tokens.iter().enumerate() {
            let token_width = (token.text.chars().count() as u16).min(width);
            if token.paragraph != paragraph {
                // Blank line between paragraphs
                line += 2;
                col = 0;
                paragraph = token.paragraph;
            } else if col > 0 && col + 1 + token_width > width {
                line += 1;
                col = 0;
            } else if col > 0 {
                col += 1;
            }
            placements.push(Placement {
                token: idx,
                line,
                col,
                width: token_width,
            });
            col += token_width;
        }

        let line_count = if placements.is_empty() { 0 } else { line + 1 };
        Self {
            placements,
            line_count,
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, token: usize) -> Option<&Placement> {
        self.placements.get(token)
    }

    pub fn hit_test(&self, line: usize, col: u16) -> Option<usize> {
        self.placements
            .iter()
            .find(|p| p.line == line && col >= p.col && col < p.col + p.width)
            .map(|p| p.token)
    }

    /// The token on `line` whose start is closest to `col`.
    pub fn nearest_on_line(&self, line: usize, col: u16) -> Option<usize> {
        self.placements
            .iter()
            .filter(|p| p.line == line)
            .min_by_key(|p| p.col.abs_diff(col))
            .map(|p| p.token)
    }

    /// The closest non-empty line in direction `delta` from `from`.
    pub fn neighbour_line(&self, from: usize, delta: isize) -> Option<usize> {
        let mut line = from as isize + delta;
        while line >= 0 && (line as usize) < self.line_count {
            if self.placements.iter().any(|p| p.line == line as usize) {
                return Some(line as usize);
            }
            line += delta;
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PassageState {
    Loading,
    Ready { text: String, tokens: Vec<Token> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pane {
    Passage,
    WordBank,
}

/// What the tooltip for the focused word should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tooltip<'a> {
    Loading,
    Missing,
    Definition(&'a WordDefinition),
}

/// Up to two senses per part of speech.
pub fn tooltip_senses(definition: &WordDefinition) -> Vec<(&str, Vec<&str>)> {
    definition
        .meanings
        .iter()
        .map(|m| {
            (
                m.part_of_speech.as_str(),
                m.definitions
                    .iter()
                    .take(TOOLTIP_SENSES_PER_POS)
                    .map(String::as_str)
                    .collect(),
            )
        })
        .collect()
}

/// The reading screen: a passage, the user's marks on it and keyboard focus.
pub struct ReadingSession {
    passage: PassageState,
    marked: MarkedWordSet,
    focus: Option<usize>,
    pane: Pane,
    bank_selected: usize,
    pub banner: Option<String>,
}

impl ReadingSession {
    pub fn loading() -> Self {
        Self {
            passage: PassageState::Loading,
            marked: MarkedWordSet::new(),
            focus: None,
            pane: Pane::Passage,
            bank_selected: 0,
            banner: None,
        }
    }

    /// Resume with a saved passage and marks.
    pub fn restore(passage: &str, marked: MarkedWordSet) -> Self {
        let mut session = Self::loading();
        session.passage = PassageState::Ready {
            text: passage.to_string(),
            tokens: tokenize(passage),
        };
        session.marked = marked;
        session
    }

    /// Show a freshly loaded passage. Marks from a previous passage are dropped.
    pub fn set_passage(&mut self, text: &str) {
        self.passage = PassageState::Ready {
            text: text.to_string(),
            tokens: tokenize(text),
        };
        self.marked.clear();
        self.focus = None;
        self.bank_selected = 0;
    }

    pub fn begin_loading(&mut self) {
        self.passage = PassageState::Loading;
        self.focus = None;
    }

    pub fn is_loading(&self) -> bool {
        self.passage == PassageState::Loading
    }

    pub fn passage_text(&self) -> Option<&str> {
        match &self.passage {
            PassageState::Ready { text, .. } => Some(text),
            PassageState::Loading => None,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        match &self.passage {
            PassageState::Ready { tokens, .. } => tokens,
            PassageState::Loading => &[],
        }
    }

    pub fn marked(&self) -> &MarkedWordSet {
        &self.marked
    }

    pub fn is_marked(&self, token: usize) -> bool {
        self.tokens()
            .get(token)
            .is_some_and(|t| self.marked.contains(&t.text))
    }

    pub fn pane(&self) -> Pane {
        self.pane
    }

    pub fn switch_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Passage => Pane::WordBank,
            Pane::WordBank => Pane::Passage,
        };
        self.clamp_bank_selection();
    }

    /// Toggle a passage token. Returns the word to resolve when a newly
    /// marked word has no cached definition.
    pub fn toggle_token(&mut self, token: usize, cache: &DefinitionCache) -> Option<String> {
        let text = self.tokens().get(token)?.text.clone();
        self.toggle_word(&text, cache)
    }

    pub fn toggle_focused(&mut self, cache: &DefinitionCache) -> Option<String> {
        let focus = self.focus?;
        self.toggle_token(focus, cache)
    }

    fn toggle_word(&mut self, text: &str, cache: &DefinitionCache) -> Option<String> {
        let request = match self.marked.toggle(text) {
            Toggle::Added(word) if !cache.contains(&word) => Some(word),
            _ => None,
        };
        self.clamp_bank_selection();
        request
    }

    pub fn clear_all(&mut self) {
        self.marked.clear();
        self.bank_selected = 0;
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Move focus (the keyboard's hover). Returns the word to resolve when
    /// the newly focused token is a marked word without a cached definition.
    pub fn set_focus(&mut self, token: usize, cache: &DefinitionCache) -> Option<String> {
        if token >= self.tokens().len() {
            return None;
        }
        self.focus = Some(token);
        let word = self.focused_word()?;
        (!cache.contains(&word)).then_some(word)
    }

    pub fn focus_next(&mut self, cache: &DefinitionCache) -> Option<String> {
        let next = match self.focus {
            Some(f) => (f + 1).min(self.tokens().len().saturating_sub(1)),
            None => 0,
        };
        self.set_focus(next, cache)
    }

    pub fn focus_prev(&mut self, cache: &DefinitionCache) -> Option<String> {
        let prev = self.focus.map(|f| f.saturating_sub(1)).unwrap_or(0);
        self.set_focus(prev, cache)
    }

    /// Move focus one visual line up (`delta < 0`) or down.
    pub fn focus_line(
        &mut self,
        delta: isize,
        layout: &PassageLayout,
        cache: &DefinitionCache,
    ) -> Option<String> {
        let Some(current) = self.focus.and_then(|f| layout.placement(f)).copied() else {
            return self.set_focus(0, cache);
        };
        let line = layout.neighbour_line(current.line, delta)?;
        let target = layout.nearest_on_line(line, current.col)?;
        self.set_focus(target, cache)
    }

    /// The focused token's normalized word if it is marked.
    pub fn focused_word(&self) -> Option<String> {
        let token = self.tokens().get(self.focus?)?;
        let word = token.normalized()?;
        self.marked.contains(&word).then_some(word)
    }

    pub fn tooltip<'a>(&self, cache: &'a DefinitionCache) -> Option<Tooltip<'a>> {
        let word = self.focused_word()?;
        Some(match cache.get(&word) {
            Some(Some(definition)) => Tooltip::Definition(definition),
            Some(None) => Tooltip::Missing,
            None => Tooltip::Loading,
        })
    }

    pub fn bank_selected(&self) -> usize {
        self.bank_selected
    }

    pub fn bank_next(&mut self) {
        if self.bank_selected + 1 < self.marked.len() {
            self.bank_selected += 1;
        }
    }

    pub fn bank_prev(&mut self) {
        self.bank_selected = self.bank_selected.saturating_sub(1);
    }

    pub fn select_bank(&mut self, index: usize) {
        if index < self.marked.len() {
            self.bank_selected = index;
        }
    }

    /// Unmark the selected word-bank entry; same effect as toggling it in the passage.
    pub fn remove_selected_bank(&mut self, cache: &DefinitionCache) {
        if let Some(word) = self.marked.get(self.bank_selected).map(str::to_string) {
            self.toggle_word(&word, cache);
        }
    }

    fn clamp_bank_selection(&mut self) {
        self.bank_selected = self.bank_selected.min(self.marked.len().saturating_sub(1));
    }
}
