#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod draft;
pub mod export;
pub mod formats;
pub mod gemini;
pub mod html;
pub mod i18n;
pub mod logging;
pub mod prompts;
pub mod roles;
pub mod session;
pub mod settings;
pub mod store;
pub mod styles;
