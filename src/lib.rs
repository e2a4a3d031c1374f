pub mod actions;
pub mod app;
pub mod character;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod dialog_log;
pub mod prompt;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod stats;
pub mod storage;
