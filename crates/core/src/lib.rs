//! Core functionality for the ZeroBus zero-trust message gate.
//!
//! This crate provides the fundamental types, configuration, and logging
//! utilities shared across the ZeroBus ecosystem.

pub mod config;
pub mod error;
pub mod event;
pub mod logging;

pub use config::GateConfig;
pub use error::{CoreError, Result};
pub use event::{EventCategory, EventSeverity, GateEvent, GateEventBuilder};
