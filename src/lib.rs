// src/lib.rs
//! Job search chat assistant: backend API, JSearch/Gemini clients and the
//! client-side view models that drive the chat UI.

pub mod chat;
pub mod cli;
pub mod client;
pub mod core;
pub mod jsearch;
pub mod llm;
pub mod logging;
pub mod session;
pub mod types;
pub mod utils;
pub mod web;

pub use web::{build_rocket, start_web_server};

/// Log through `tracing` with the level given as first argument.
///
/// `app_log!(info, "Created chat {}", chat_id)`
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

/// Open an info-level span, optionally with structured fields.
#[macro_export]
macro_rules! app_span {
    ($name:expr) => {
        ::tracing::info_span!($name)
    };
    ($name:expr, $($fields:tt)+) => {
        ::tracing::info_span!($name, $($fields)+)
    };
}
