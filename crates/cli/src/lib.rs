//! Terminal host and reference backend for the AWSConnector credential editor.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod terminal;
