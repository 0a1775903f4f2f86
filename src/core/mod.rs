// src/core/mod.rs

pub mod html;
pub mod ids;
pub mod net;
pub mod sanitize;
