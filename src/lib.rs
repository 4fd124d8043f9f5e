// src/lib.rs

pub mod chat;
pub mod config;
pub mod core;
pub mod prompt;
pub mod provider;
pub mod rag;
pub mod server;
pub mod store;
pub mod tools;
