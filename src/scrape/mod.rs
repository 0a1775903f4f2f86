// src/scrape/mod.rs
mod extract;
mod pass;

pub use extract::{ExtractError, Extracted, Extractor, Page};
pub use pass::{Collector, PassReport, ResumeCursor, SkippedPage};
