use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Instant;

use chrono::Utc;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::event::AppEvent;
use crate::generator::PassageSource;
use crate::generator::cache::PassageCache;
use crate::generator::passage::{self, LlmPassageGenerator, PassageReady};
use crate::lookup::completion::ChatCompletionClient;
use crate::lookup::definition::DefinitionCache;
use crate::lookup::dictionary_api::{FreeDictionaryClient, NoDictionary};
use crate::lookup::resolver::DefinitionResolver;
use crate::lookup::worker::{DefinitionReady, LookupWorker};
use crate::lookup::{Completion, DictionaryLookup, ResolveMode};
use crate::session::drill::{DrillEvent, LookupRequest, VocabularyDrill};
use crate::session::marked::MarkedWordSet;
use crate::session::reading::ReadingSession;
use crate::session::result::DrillSummary;
use crate::session::swipe::{SwipeDirection, SwipeTracker};
use crate::store::json_store::JsonStore;
use crate::store::schema::{DrillHistoryData, SessionSnapshot};
use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

const PASSAGE_CACHE_CAPACITY: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Reading,
    Drill,
    DrillComplete,
}

/// The two remote collaborators, already wired to their transports.
pub struct Collaborators {
    pub resolver: Arc<DefinitionResolver>,
    pub passages: Option<Arc<dyn PassageSource>>,
}

impl Collaborators {
    pub fn from_config(config: &Config, offline: bool) -> Self {
        if offline {
            info!("offline: built-in words and passages only");
            return Self {
                resolver: Arc::new(DefinitionResolver::new(Box::new(NoDictionary), None)),
                passages: None,
            };
        }

        let timeout = config.request_timeout();
        let dictionary: Box<dyn DictionaryLookup> =
            Box::new(FreeDictionaryClient::new(&config.dictionary_base_url, timeout));
        let llm = |model: &str| {
            ChatCompletionClient::from_env(
                &config.llm_base_url,
                &config.llm_api_key_env,
                model,
                timeout,
            )
        };

        let definitions = llm(&config.definition_model).map(|c| Box::new(c) as Box<dyn Completion>);
        if definitions.is_none() {
            warn!("{} is not set; AI definitions disabled", config.llm_api_key_env);
        }
        let passages = llm(&config.passage_model).map(|c| {
            info!("passages via {}", c.model());
            Arc::new(LlmPassageGenerator::new(Box::new(c))) as Arc<dyn PassageSource>
        });

        Self {
            resolver: Arc::new(
                DefinitionResolver::new(dictionary, definitions)
                    .with_display_budget(config.display_budget()),
            ),
            passages,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub reading: ReadingSession,
    pub cache: DefinitionCache,
    pub drill: Option<VocabularyDrill>,
    pub swipe: SwipeTracker,
    pub last_summary: Option<DrillSummary>,
    pub drill_history: DrillHistoryData,
    pub store: Option<JsonStore>,
    pub status: Option<String>,
    pub terminal_size: (u16, u16),
    pub should_quit: bool,
    ai_definitions: bool,
    worker: LookupWorker,
    passages: Option<Arc<dyn PassageSource>>,
    passage_cache: PassageCache,
    tx: Sender<AppEvent>,
    rng: SmallRng,
}

impl App {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        collaborators: Collaborators,
        store: Option<JsonStore>,
        tx: Sender<AppEvent>,
    ) -> Self {
        let menu = Menu::new(theme);
        let drill_history = store
            .as_ref()
            .map(JsonStore::load_drill_history)
            .unwrap_or_default();
        let swipe = SwipeTracker::new(config.swipe_threshold_cols, config.swipe_exit_ms);
        let passage_cache = PassageCache::new(config.passage_cache_ttl_hours, PASSAGE_CACHE_CAPACITY);

        Self {
            screen: AppScreen::Reading,
            menu,
            theme,
            config,
            reading: ReadingSession::loading(),
            cache: DefinitionCache::new(),
            drill: None,
            swipe,
            last_summary: None,
            drill_history,
            store,
            status: None,
            terminal_size: (80, 24),
            should_quit: false,
            ai_definitions: collaborators.resolver.has_completion(),
            worker: LookupWorker::new(collaborators.resolver, tx.clone()),
            passages: collaborators.passages,
            passage_cache,
            tx,
            rng: SmallRng::from_entropy(),
        }
    }

    /// Resume the saved session unless `fresh`, otherwise load a new passage.
    pub fn start(&mut self, fresh: bool) {
        let snapshot = if fresh || !self.config.restore_session {
            if fresh
                && let Some(store) = self.store.as_ref()
                && let Err(err) = store.clear_session()
            {
                warn!("clearing saved session failed: {err:#}");
            }
            None
        } else {
            self.store.as_ref().and_then(JsonStore::load_session)
        };

        match snapshot {
            Some(snapshot) => {
                info!(
                    "restoring session saved {} ({} marked, {} cached)",
                    snapshot.saved_at,
                    snapshot.marked_words.len(),
                    snapshot.definition_cache.len()
                );
                self.reading = ReadingSession::restore(
                    &snapshot.passage,
                    MarkedWordSet::from_words(&snapshot.marked_words),
                );
                self.cache = snapshot.definition_cache;
            }
            None => self.request_passage(),
        }
        self.screen = AppScreen::Reading;
    }

    pub fn has_passage_source(&self) -> bool {
        self.passages.is_some()
    }

    pub fn has_ai_definitions(&self) -> bool {
        self.ai_definitions
    }

    pub fn request_passage(&mut self) {
        match &self.passages {
            Some(source) => {
                self.reading.begin_loading();
                passage::spawn_generation(Arc::clone(source), self.tx.clone());
            }
            None => {
                let fallback = passage::pick_fallback(&mut self.rng, self.reading.passage_text());
                self.reading.set_passage(fallback);
                self.reading.banner = Some(
                    "Passage generation is not configured; showing a built-in passage".to_string(),
                );
            }
        }
    }

    /// Show the passage generated before the current one, if still cached.
    pub fn previous_passage(&mut self) {
        self.passage_cache.evict_expired(Utc::now());
        let current = self.reading.passage_text().unwrap_or_default().to_string();
        match self.passage_cache.before(&current) {
            Some(previous) => {
                let text = previous.text.clone();
                self.reading.set_passage(&text);
            }
            None => self.status = Some("No earlier passage this session".to_string()),
        }
    }

    pub fn handle_background(&mut self, event: AppEvent) {
        match event {
            AppEvent::Definition(ready) => self.on_definition(ready),
            AppEvent::Passage(ready) => self.on_passage(ready),
            AppEvent::Tick => self.on_tick(Instant::now()),
            _ => {}
        }
    }

    fn on_passage(&mut self, ready: PassageReady) {
        if !self.reading.is_loading() {
            return;
        }
        match ready.result {
            Ok(text) => {
                self.passage_cache.insert(&text, Utc::now());
                self.reading.set_passage(&text);
                self.reading.banner = None;
            }
            Err(err) => {
                let fallback = passage::pick_fallback(&mut self.rng, None);
                self.reading.set_passage(fallback);
                self.reading.banner =
                    Some(format!("Could not generate a passage ({err}); showing a built-in one"));
            }
        }
    }

    fn on_definition(&mut self, ready: DefinitionReady) {
        self.worker.finish(&ready);
        let DefinitionReady {
            word,
            mode,
            definition,
        } = ready;
        self.cache.merge(&word, mode, definition);

        let followup = match self.drill.as_mut() {
            Some(drill) if self.screen == AppScreen::Drill => {
                drill.on_resolved(&word, mode, &mut self.cache)
            }
            _ => None,
        };
        self.submit(followup);
    }

    fn submit(&mut self, request: Option<LookupRequest>) {
        if let Some(request) = request {
            self.worker.submit(&request.word, request.mode);
        }
    }

    fn submit_full(&mut self, word: Option<String>) {
        if let Some(word) = word {
            self.worker.submit(&word, ResolveMode::Full);
        }
    }

    pub fn is_pending(&self, word: &str) -> bool {
        self.worker.is_pending_any(word)
    }

    pub fn in_flight(&self) -> usize {
        self.worker.in_flight_count()
    }

    // Reading

    pub fn toggle_focused(&mut self) {
        let request = self.reading.toggle_focused(&self.cache);
        self.submit_full(request);
    }

    pub fn toggle_token(&mut self, token: usize) {
        let request = self.reading.toggle_token(token, &self.cache);
        self.submit_full(request);
    }

    pub fn focus_token(&mut self, token: usize) {
        let request = self.reading.set_focus(token, &self.cache);
        self.submit_full(request);
    }

    pub fn focus_next(&mut self) {
        let request = self.reading.focus_next(&self.cache);
        self.submit_full(request);
    }

    pub fn focus_prev(&mut self) {
        let request = self.reading.focus_prev(&self.cache);
        self.submit_full(request);
    }

    pub fn focus_line(&mut self, delta: isize, width: u16) {
        let layout = crate::session::reading::PassageLayout::new(self.reading.tokens(), width);
        let request = self.reading.focus_line(delta, &layout, &self.cache);
        self.submit_full(request);
    }

    pub fn remove_selected_bank_word(&mut self) {
        self.reading.remove_selected_bank(&self.cache);
    }

    pub fn clear_marks(&mut self) {
        self.reading.clear_all();
    }

    pub fn new_passage(&mut self) {
        self.save_session();
        self.request_passage();
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let passage = self.reading.passage_text()?;
        Some(SessionSnapshot::new(
            passage,
            self.reading.marked().as_slice().to_vec(),
            self.cache.clone(),
            Utc::now(),
        ))
    }

    /// Best effort; failures are logged and reported in the status line.
    pub fn save_session(&mut self) {
        let (Some(store), Some(snapshot)) = (self.store.as_ref(), self.snapshot()) else {
            return;
        };
        match store.save_session(&snapshot) {
            Ok(()) => self.status = Some("Session saved".to_string()),
            Err(err) => {
                warn!("saving session failed: {err:#}");
                self.status = Some(format!("Could not save session: {err}"));
            }
        }
    }

    // Drill

    pub fn start_drill(&mut self) {
        self.save_session();
        let words = self.reading.marked().as_slice().to_vec();
        let (drill, request) =
            VocabularyDrill::start(&words, self.config.display_budget(), &mut self.cache);
        info!("drill started with {} words", drill.len());
        self.drill = Some(drill);
        self.swipe.cancel();
        self.screen = AppScreen::Drill;
        self.submit(request);
    }

    /// Apply a drill event unless a swipe animation is playing.
    pub fn drill_event(&mut self, event: DrillEvent) {
        if self.swipe.is_animating() {
            return;
        }
        self.apply_drill_event(event);
    }

    fn apply_drill_event(&mut self, event: DrillEvent) {
        let Some(drill) = self.drill.as_mut() else {
            return;
        };
        let request = drill.apply(event, &mut self.cache);
        let complete = drill.is_complete();
        self.submit(request);
        if complete {
            self.finish_drill();
        }
    }

    /// Keyboard swipe: same exit animation as a pointer swipe.
    pub fn swipe_card(&mut self, direction: SwipeDirection, now: Instant) {
        if self.swipe.is_animating() || self.drill.as_ref().is_none_or(|d| d.cursor().is_none()) {
            return;
        }
        self.swipe.commit(direction, now);
    }

    pub fn begin_drag(&mut self, col: u16) {
        if self.drill.as_ref().is_some_and(|d| d.cursor().is_some()) {
            self.swipe.begin(col);
        }
    }

    pub fn drag_to(&mut self, col: u16) {
        self.swipe.drag(col);
    }

    /// A release without movement is a tap and flips the card. A committed
    /// swipe is applied by `on_tick` once its exit animation ends.
    pub fn release_drag(&mut self, now: Instant) {
        if !self.swipe.is_dragging() {
            return;
        }
        let tapped = self.swipe.display_offset(now, 0) == 0;
        if self.swipe.release(now).is_none() && tapped {
            self.drill_event(DrillEvent::Flip);
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if let Some(direction) = self.swipe.tick(now) {
            self.apply_drill_event(DrillEvent::Swipe(direction));
        }
    }

    fn finish_drill(&mut self) {
        let Some(drill) = self.drill.as_ref() else {
            return;
        };
        let summary = DrillSummary::from_drill(drill, Utc::now());
        info!(
            "drill finished: {}/{} reviewed, {} known, {} unknown",
            summary.reviewed, summary.total_words, summary.known, summary.unknown
        );
        match self.store.as_ref().map(|store| store.record_drill(summary.clone())) {
            Some(Ok(history)) => self.drill_history = history,
            Some(Err(err)) => {
                warn!("recording drill failed: {err:#}");
                self.drill_history.push(summary.clone());
            }
            None => self.drill_history.push(summary.clone()),
        }
        self.last_summary = Some(summary);
        self.swipe.cancel();
        self.screen = AppScreen::DrillComplete;
    }

    /// The summary recorded before the latest one.
    pub fn previous_summary(&self) -> Option<&DrillSummary> {
        let drills = &self.drill_history.drills;
        (drills.len() >= 2).then(|| &drills[drills.len() - 2])
    }

    pub fn back_to_reading(&mut self) {
        self.drill = None;
        self.swipe.cancel();
        self.screen = AppScreen::Reading;
    }

    pub fn go_to_menu(&mut self) {
        self.save_session();
        self.drill = None;
        self.swipe.cancel();
        self.screen = AppScreen::Menu;
    }

    pub fn quit(&mut self) {
        self.save_session();
        self.should_quit = true;
    }
}
