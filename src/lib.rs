//! Review Bot: conversational manuscript critiques over LINE.

pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod review;
