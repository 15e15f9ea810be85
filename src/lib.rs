/// Notifier - relays a notification to the destinations of a named channel
///
/// This library loads a channel-to-destinations mapping, fans a title/body
/// notification out to every destination through a `Notifier`, and reports
/// the aggregate result to an observability sink.
pub mod app;
pub mod channels;
pub mod cli;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod observability;
pub mod services;

// Re-export core types for convenience
pub use crate::core::*;
pub use channels::{Channels, ConfigError};
pub use dispatcher::{Dispatch, Dispatcher, NotifierError, RegistryDispatcher};
