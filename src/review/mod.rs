//! Manuscript review conversation: step machine, sessions and delivery.

pub mod catalog;
pub mod chunk;
pub mod machine;
pub mod manager;
pub mod prompts;
pub mod replies;
pub mod session;
pub mod state;

pub use catalog::{Aspect, Genre, Level};
pub use chunk::{chunks, delivery_chunks};
pub use machine::{Action, advance};
pub use manager::ReviewManager;
pub use session::{SessionStore, spawn_eviction_task};
pub use state::{ConversationState, ReviewStep};
