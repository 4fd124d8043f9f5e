// src/chat/mod.rs

pub mod message;
pub mod orchestrator;
