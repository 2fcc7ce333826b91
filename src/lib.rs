// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests can drive `lexdr::app::App` with fake collaborators.
// Some helpers are only reached through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod app;
pub mod config;
pub mod event;
pub mod generator;
pub mod logging;
pub mod lookup;
pub mod session;
pub mod store;
pub mod ui;
