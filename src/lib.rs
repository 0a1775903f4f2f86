// src/lib.rs

#[macro_use]
pub mod macros;

pub mod canon;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod log;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod scrape;
pub mod specs;
pub mod store;
