use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use log::debug;

use crate::event::AppEvent;
use crate::lookup::ResolveMode;
use crate::lookup::definition::WordDefinition;
use crate::lookup::resolver::DefinitionResolver;

/// A finished resolution, delivered back to the UI thread.
#[derive(Clone, Debug)]
pub struct DefinitionReady {
    pub word: String,
    pub mode: ResolveMode,
    pub definition: Option<WordDefinition>,
}

/// Runs resolutions off the UI thread and deduplicates in-flight requests
/// per `(word, mode)`.
pub struct LookupWorker {
    resolver: Arc<DefinitionResolver>,
    tx: Sender<AppEvent>,
    in_flight: HashSet<(String, ResolveMode)>,
}

impl LookupWorker {
    pub fn new(resolver: Arc<DefinitionResolver>, tx: Sender<AppEvent>) -> Self {
        Self {
            resolver,
            tx,
            in_flight: HashSet::new(),
        }
    }

    pub fn is_pending(&self, word: &str, mode: ResolveMode) -> bool {
        self.in_flight.contains(&(word.to_string(), mode))
    }

    pub fn is_pending_any(&self, word: &str) -> bool {
        self.is_pending(word, ResolveMode::Full) || self.is_pending(word, ResolveMode::Concise)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Starts a resolution unless one for the same word and mode is running.
    /// Returns whether a new request was started.
    pub fn submit(&mut self, word: &str, mode: ResolveMode) -> bool {
        if !self.in_flight.insert((word.to_string(), mode)) {
            debug!("{word:?} ({mode:?}) already in flight");
            return false;
        }

        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();
        let word = word.to_string();
        thread::spawn(move || {
            let definition = resolver.resolve(&word, mode);
            // The receiver is gone once the app quits; late results are dropped.
            let _ = tx.send(AppEvent::Definition(DefinitionReady {
                word,
                mode,
                definition,
            }));
        });
        true
    }

    pub fn finish(&mut self, ready: &DefinitionReady) {
        self.in_flight.remove(&(ready.word.clone(), ready.mode));
    }
}
