// src/specs/mod.rs
//! # Scraping "specs" module
//!
//! Page-specific extraction for the reference sites. Each spec focuses on a
//! single page layout and encodes *where the ground truth lives in the HTML*
//! and *how to extract it robustly*.
//!
//! ## What lives here
//! - **Pure HTML parsing** of one fetched document into `(player_id, Observation)`
//!   tuples (`scrape::Extractor` impls), or into page enumerations for discovery
//!   pages (`/teams/`, `/schools/`).
//! - **Selector choice & precedence** (e.g. `data-stat` cells first, then a
//!   `YYYY-YYYY` span in the row text).
//! - **Tolerant extraction** using `core::html` helpers (case-insensitive tag
//!   blocks, tag stripping, entity/whitespace normalization).
//!
//! ## What does **not** live here
//! - **Networking, pacing, retries** – `core::net::Fetcher`.
//! - **Merging and persistence** – `store::EntityDb` via `scrape::Collector`.
//! - **Page-implied facts** (the team of a roster page, the number of a numbers
//!   page) – those ride on `scrape::Page::implied`, not in the extractor.
//!
//! ## Conventions & invariants
//! - Player IDs always come from `core::ids::entity_id` on the row's player link.
//! - A missing roster table means "nobody here" (empty result); a missing
//!   player index is an extraction error, so the page is reported and skipped.
//! - Offline-testable against captured fixtures.
pub mod numbers;
pub mod players;
pub mod rosters;
pub mod teams;
pub mod uniform;
