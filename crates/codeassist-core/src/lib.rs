//! Core codeassist library (config, logging, providers, conversation engine).

pub mod config;
pub mod core;
pub mod logging;
pub mod prompts;
pub mod providers;
