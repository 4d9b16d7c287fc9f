// src/lib.rs

//! Kigu Directory: build tooling for the maker directory site
//!
//! - `pipeline::run_data` loads and converts the maker and hadatai records
//! - `pipeline::run_content` resolves social embeds and renders documents
//! - `listing` provides search and sort over the loaded collections

pub mod content;
pub mod error;
pub mod listing;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
