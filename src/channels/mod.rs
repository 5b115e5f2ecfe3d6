//! Channel abstraction for message I/O.

pub mod channel;
pub mod cli;
pub mod line;
pub mod line_types;
pub mod line_webhook;

pub use channel::*;
pub use cli::CliChannel;
pub use line::LineMessenger;
pub use line_webhook::{WebhookState, webhook_routes};
