//! Pipeline entry points for the site build.
//!
//! - `run_data`: Load, convert and publish the directory collections
//! - `run_content`: Resolve embeds and render content documents
//! - `run_export`: Write the plain-text index and full export
//! - `run_build`: All of the above, in order

pub mod content;
pub mod data;
pub mod directory;
pub mod embeds;
pub mod export;
mod pipeline;
mod validate;

pub use content::{SourceDocument, load_documents, run_content};
pub use data::{DirectoryData, module_payload, run_data};
pub use directory::{LoadFailure, LoadReport, load_directory};
pub use embeds::{EnrichReport, enrich_document};
pub use export::run_export;
pub use pipeline::run_build;
pub use validate::run_validate;
