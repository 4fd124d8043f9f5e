// src/store/mod.rs

mod messages;

pub use messages::{ChatMessage, MessageRole, MessageStore};
