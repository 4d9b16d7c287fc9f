//! Content documents: markdown with front matter and social embeds.
//!
//! - `document`: parse markdown into an owned tree and locate embeds
//! - `render`: turn an (enriched) tree into an HTML fragment

mod document;
mod render;

pub use document::{Document, EMBED_TAG, Element, Embed, FrontMatter, Node, parse_embed};
pub use render::escape_html;
