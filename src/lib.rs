//! TIMETRAVEL - building construction timeline for 3D scene renderers
//!
//! Re-exports all modules for use by the binary target.

// Core engine (year domain, filters, controller, animation)
pub mod core;

// App modules
pub mod cli;
pub mod config;
pub mod paths;
pub mod runner;
pub mod scene;
pub mod server;
pub mod shell;

// Re-export commonly used types from core
pub use crate::core::controller::{TimelineController, TimelineSettings};
pub use crate::core::error::TimelineError;
pub use crate::core::filter::{FilterExpr, YearField};
pub use crate::core::sinks::{FilterSink, LayerRole, YearSink};
pub use runner::TimelineRunner;
pub use scene::SceneDefinition;
