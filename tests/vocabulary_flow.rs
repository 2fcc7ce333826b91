use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use tempfile::TempDir;

use lexdr::app::{App, AppScreen, Collaborators};
use lexdr::config::Config;
use lexdr::event::AppEvent;
use lexdr::generator::PassageSource;
use lexdr::generator::passage::FALLBACK_PASSAGES;
use lexdr::lookup::fit::DisplayBudget;
use lexdr::lookup::definition::DefinitionSource;
use lexdr::lookup::dictionary_api::{DictionaryEntry, EntryDefinition, EntryMeaning};
use lexdr::lookup::resolver::DefinitionResolver;
use lexdr::lookup::{Completion, CompletionRequest, DictionaryLookup, LookupError};
use lexdr::session::drill::{CardDefinition, DrillEvent, DrillOutcome, DrillPhase};
use lexdr::session::marked::MarkedWordSet;
use lexdr::session::reading::ReadingSession;
use lexdr::session::swipe::SwipeDirection;
use lexdr::session::result::DrillSummary;
use lexdr::store::json_store::JsonStore;
use lexdr::store::schema::HISTORY_LIMIT;
use lexdr::ui::theme::Theme;

const LONG_SENSE: &str = "Existing or being everywhere at the same time; constantly encountered";

struct FakeDictionary {
    calls: Arc<Mutex<Vec<String>>>,
    long_senses: bool,
}

impl DictionaryLookup for FakeDictionary {
    fn lookup(&self, word: &str) -> Result<DictionaryEntry, LookupError> {
        self.calls.lock().unwrap().push(word.to_string());
        let definition = if self.long_senses {
            LONG_SENSE.to_string()
        } else {
            format!("Short sense of {word}")
        };
        match word {
            "ubiquitous" | "alpha" | "beta" | "gamma" => Ok(DictionaryEntry {
                word: word.to_string(),
                phonetic: Some("/test/".to_string()),
                phonetics: Vec::new(),
                meanings: vec![EntryMeaning {
                    part_of_speech: "adjective".to_string(),
                    definitions: vec![EntryDefinition { definition }],
                }],
            }),
            _ => Err(LookupError::NotFound(word.to_string())),
        }
    }
}

struct FakeCompletion {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl Completion for FakeCompletion {
    fn complete(&self, _request: &CompletionRequest) -> Result<String, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| LookupError::Unavailable("timed out".to_string()))
    }
}

struct FailingPassages;

impl PassageSource for FailingPassages {
    fn generate(&self) -> Result<String, LookupError> {
        Err(LookupError::Unavailable("timed out".to_string()))
    }
}

struct Harness {
    app: App,
    rx: Receiver<AppEvent>,
    dictionary_calls: Arc<Mutex<Vec<String>>>,
    completion_calls: Arc<AtomicUsize>,
    _dir: TempDir,
}

fn theme() -> &'static Theme {
    Box::leak(Box::new(Theme::default()))
}

#[derive(Default)]
struct Setup {
    config: Config,
    completion_reply: Option<&'static str>,
    passages: Option<Arc<dyn PassageSource>>,
    long_senses: bool,
    without_store: bool,
}

fn harness(
    completion_reply: Option<&'static str>,
    passages: Option<Arc<dyn PassageSource>>,
) -> Harness {
    harness_with(Setup {
        completion_reply,
        passages,
        ..Setup::default()
    })
}

fn harness_with(setup: Setup) -> Harness {
    let dir = TempDir::new().unwrap();
    let store = (!setup.without_store)
        .then(|| JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap());
    let dictionary_calls = Arc::new(Mutex::new(Vec::new()));
    let completion_calls = Arc::new(AtomicUsize::new(0));

    let completion = setup.completion_reply.map(|reply| {
        Box::new(FakeCompletion {
            reply: Some(reply.to_string()),
            calls: Arc::clone(&completion_calls),
        }) as Box<dyn Completion>
    });
    let resolver = DefinitionResolver::new(
        Box::new(FakeDictionary {
            calls: Arc::clone(&dictionary_calls),
            long_senses: setup.long_senses,
        }),
        completion,
    )
    .with_display_budget(setup.config.display_budget());

    let (tx, rx) = mpsc::channel();
    let collaborators = Collaborators {
        resolver: Arc::new(resolver),
        passages: setup.passages,
    };
    let app = App::new(setup.config, theme(), collaborators, store, tx);

    Harness {
        app,
        rx,
        dictionary_calls,
        completion_calls,
        _dir: dir,
    }
}

impl Harness {
    fn read(&mut self, passage: &str) {
        self.app.reading = ReadingSession::restore(passage, MarkedWordSet::new());
        self.app.screen = AppScreen::Reading;
    }

    /// Deliver background results until no lookup is in flight.
    fn settle(&mut self) {
        while self.app.in_flight() > 0 {
            let event = self
                .rx
                .recv_timeout(Duration::from_secs(5))
                .expect("lookup result");
            self.app.handle_background(event);
        }
    }

    fn next_passage_event(&mut self) {
        loop {
            let event = self
                .rx
                .recv_timeout(Duration::from_secs(5))
                .expect("passage result");
            if matches!(event, AppEvent::Passage(_)) {
                self.app.handle_background(event);
                return;
            }
        }
    }
}

#[test]
fn function_words_skip_the_network_and_others_use_the_dictionary() {
    let mut h = harness(None, None);
    h.read("the ubiquitous glow of screens");

    h.app.toggle_token(0);
    h.app.toggle_token(1);
    h.settle();

    let the = h.app.cache.get("the").flatten().unwrap();
    assert_eq!(the.source, DefinitionSource::BuiltIn);
    let ubiquitous = h.app.cache.get("ubiquitous").flatten().unwrap();
    assert_eq!(ubiquitous.source, DefinitionSource::Dictionary);

    assert_eq!(*h.dictionary_calls.lock().unwrap(), vec!["ubiquitous".to_string()]);
    assert_eq!(h.app.reading.marked().as_slice(), ["the", "ubiquitous"]);
}

#[test]
fn dictionary_miss_falls_back_to_completion() {
    let mut h = harness(Some("Noun A made-up word used in tests"), None);
    h.read("Say xyzzy123 twice.");

    h.app.toggle_token(1);
    h.settle();

    let definition = h.app.cache.get("xyzzy123").flatten().unwrap();
    assert_eq!(definition.source, DefinitionSource::Ai);
    assert_eq!(h.completion_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn dictionary_miss_without_completion_caches_a_miss() {
    let mut h = harness(None, None);
    h.read("Say xyzzy123 twice.");

    h.app.toggle_token(1);
    h.settle();

    assert_eq!(h.app.cache.get("xyzzy123"), Some(None));
}

#[test]
fn three_advances_complete_the_drill_and_retreat_hides_the_back() {
    let mut h = harness(None, None);
    h.read("alpha beta gamma");
    for token in 0..3 {
        h.app.toggle_token(token);
    }
    h.settle();

    h.app.start_drill();
    h.settle();
    assert_eq!(h.app.screen, AppScreen::Drill);

    h.app.drill_event(DrillEvent::Advance);
    h.app.drill_event(DrillEvent::Flip);
    h.app.drill_event(DrillEvent::Retreat);
    let cursor = h.app.drill.as_ref().unwrap().cursor().unwrap();
    assert_eq!((cursor.index, cursor.revealed), (0, false));

    for _ in 0..3 {
        h.app.drill_event(DrillEvent::Advance);
        h.settle();
    }
    assert_eq!(h.app.screen, AppScreen::DrillComplete);
    let summary = h.app.last_summary.as_ref().unwrap();
    assert_eq!(summary.total_words, 3);
    assert!(!summary.ended_early);

    let history = h.app.store.as_ref().unwrap().load_drill_history();
    assert_eq!(history.drills.len(), 1);
}

#[test]
fn failed_generation_shows_a_fallback_passage_and_a_banner() {
    let passages: Arc<dyn PassageSource> = Arc::new(FailingPassages);
    let mut h = harness(None, Some(passages));
    h.app.start(true);
    assert!(h.app.reading.is_loading());

    h.next_passage_event();

    let text = h.app.reading.passage_text().unwrap();
    assert!(FALLBACK_PASSAGES.iter().any(|p| *p == text));
    assert!(h.app.reading.banner.is_some());
}

#[test]
fn unconfigured_generation_uses_a_fallback_immediately() {
    let mut h = harness(None, None);
    h.app.start(true);

    assert!(!h.app.reading.is_loading());
    let text = h.app.reading.passage_text().unwrap();
    assert!(FALLBACK_PASSAGES.iter().any(|p| *p == text));
    assert!(h.app.reading.banner.is_some());
}

#[test]
fn session_round_trips_through_the_store() {
    let mut h = harness(None, None);
    h.read("the ubiquitous glow");
    h.app.toggle_token(1);
    h.settle();
    h.app.save_session();

    let saved = h.app.store.as_ref().unwrap().load_session().unwrap();
    assert_eq!(saved.passage, "the ubiquitous glow");
    assert_eq!(saved.marked_words, vec!["ubiquitous".to_string()]);

    h.app.reading = ReadingSession::loading();
    h.app.cache = Default::default();
    h.app.start(false);
    assert_eq!(h.app.reading.passage_text(), Some("the ubiquitous glow"));
    assert!(h.app.cache.get("ubiquitous").flatten().is_some());
    assert_eq!(h.dictionary_calls.lock().unwrap().len(), 1);
}

#[test]
fn keyboard_swipe_records_outcome_after_the_exit_animation() {
    let mut h = harness(None, None);
    h.read("alpha beta");
    h.app.toggle_token(0);
    h.app.toggle_token(1);
    h.settle();
    h.app.start_drill();
    h.settle();

    let start = Instant::now();
    h.app.swipe_card(SwipeDirection::Left, start);
    assert!(h.app.swipe.is_animating());

    // Input is ignored while the card leaves the screen
    h.app.drill_event(DrillEvent::Advance);
    assert_eq!(h.app.drill.as_ref().unwrap().cursor().unwrap().index, 0);

    while h.app.swipe.is_animating() {
        std::thread::sleep(Duration::from_millis(20));
        h.app.handle_background(AppEvent::Tick);
    }
    let drill = h.app.drill.as_ref().unwrap();
    assert_eq!(drill.outcome(0), Some(DrillOutcome::Unknown));
    assert_eq!(drill.cursor().unwrap().index, 1);
}

#[test]
fn empty_drill_is_a_dead_end_back_to_reading() {
    let mut h = harness(None, None);
    h.read("nothing marked here");
    h.app.start_drill();

    assert_eq!(h.app.drill.as_ref().unwrap().phase(), DrillPhase::Empty);
    h.app.drill_event(DrillEvent::Advance);
    assert_eq!(h.app.screen, AppScreen::Drill);

    h.app.back_to_reading();
    assert_eq!(h.app.screen, AppScreen::Reading);
    assert_eq!(h.app.reading.passage_text(), Some("nothing marked here"));
}

#[test]
fn toggling_twice_restores_the_marked_set_and_keeps_the_cache() {
    let mut h = harness(None, None);
    h.read("the ubiquitous glow");
    h.app.toggle_token(1);
    h.settle();
    h.app.toggle_token(1);

    assert!(h.app.reading.marked().is_empty());
    assert!(h.app.cache.contains("ubiquitous"));

    // Re-marking a cached word needs no lookup
    h.app.toggle_token(1);
    assert_eq!(h.app.in_flight(), 0);
    assert_eq!(h.dictionary_calls.lock().unwrap().len(), 1);
}

#[test]
fn small_card_asks_the_llm_for_a_concise_definition() {
    let mut config = Config::default();
    config.display_chars_per_line = 20;
    config.display_max_lines = 2;
    let mut h = harness_with(Setup {
        config,
        completion_reply: Some("Adjective (yoo-BIK-wih-tus) Found everywhere"),
        long_senses: true,
        ..Setup::default()
    });
    h.read("the ubiquitous glow");
    h.app.toggle_token(1);
    h.settle();
    // Marking uses the full dictionary text
    assert_eq!(h.completion_calls.load(Ordering::SeqCst), 0);

    h.app.start_drill();
    h.settle();

    assert_eq!(h.completion_calls.load(Ordering::SeqCst), 1);
    let CardDefinition::Ready(definition) = h.app.drill.as_ref().unwrap().card() else {
        panic!("card has no definition");
    };
    assert_eq!(definition.source, DefinitionSource::Ai);
    assert_eq!(definition.meanings[0].definitions[0], "Found everywhere");
    assert!(DisplayBudget::new(20, 2).fits_definition(definition));
}

#[test]
fn history_without_a_store_keeps_the_newest_summaries() {
    let mut h = harness_with(Setup {
        without_store: true,
        ..Setup::default()
    });
    let filler = DrillSummary {
        finished_at: Utc::now(),
        total_words: 9,
        reviewed: 9,
        known: 9,
        unknown: 0,
        unknown_words: Vec::new(),
        ended_early: false,
    };
    for _ in 0..HISTORY_LIMIT {
        h.app.drill_history.push(filler.clone());
    }

    h.read("alpha");
    h.app.toggle_token(0);
    h.settle();
    h.app.start_drill();
    h.settle();
    h.app.drill_event(DrillEvent::Advance);

    assert_eq!(h.app.screen, AppScreen::DrillComplete);
    let drills = &h.app.drill_history.drills;
    assert_eq!(drills.len(), HISTORY_LIMIT);
    assert_eq!(drills.last().unwrap().total_words, 1);
    assert_eq!(h.app.previous_summary().unwrap().total_words, 9);
}
