// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests can reach `wordfall::session::*` / `wordfall::store::*`.
// Screen code is only exercised through the binary, so dead_code is allowed.
#![allow(dead_code)]

pub mod catalog;
pub mod config;
pub mod engine;
pub mod session;
pub mod store;

// Private: required transitively (config -> ui::theme, app wiring)
mod app;
mod event;
mod logging;
mod ui;
