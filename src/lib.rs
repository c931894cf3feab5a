/// dockmon - terminal monitoring hub for Docker containers
///
/// The core lives under [`core`]: a daemon client adapter, a pure stat
/// normalizer, a bounded parallel collector, a rolling history store, and
/// the refresh orchestrator that ties a cycle together. The TUI and CLI in
/// [`app`], [`screens`] and [`cli`] only consume what the core publishes.

pub mod app;
pub mod cli;
pub mod core;
pub mod screens;
pub mod utils;
