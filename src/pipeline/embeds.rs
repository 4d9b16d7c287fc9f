// src/pipeline/embeds.rs

//! Markdown embed transform.
//!
//! Every embed in a document is resolved concurrently; the shared request
//! queue inside each resolver serializes the actual HTTP calls. A failed
//! resolution leaves its embed untouched.

use std::collections::BTreeMap;

use futures::future::join_all;

use crate::content::Document;
use crate::services::{EmbedAttribute, ResolverRegistry};

/// Outcome counts for one document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichReport {
    pub enriched: usize,
    pub failed: usize,
    /// Embeds no resolver claims
    pub unmatched: usize,
}

impl EnrichReport {
    pub fn merge(&mut self, other: EnrichReport) {
        self.enriched += other.enriched;
        self.failed += other.failed;
        self.unmatched += other.unmatched;
    }
}

/// Resolve and attach attributes for every embed in `document`.
///
/// Returns once every resolution has settled.
pub async fn enrich_document(document: &mut Document, registry: &ResolverRegistry) -> EnrichReport {
    let urls: Vec<String> = document.embeds().iter().map(|e| e.url.clone()).collect();
    let mut report = EnrichReport::default();

    let tasks = urls.iter().map(|url| async move {
        match registry.select(url) {
            Some(resolver) => Some(
                resolver
                    .resolve(url)
                    .await
                    .map_err(|e| (resolver.name(), e)),
            ),
            None => None,
        }
    });
    let outcomes = join_all(tasks).await;

    for ((embed, url), outcome) in document.embeds_mut().into_iter().zip(&urls).zip(outcomes) {
        match outcome {
            Some(Ok(attributes)) => {
                apply(&mut embed.attributes, attributes);
                report.enriched += 1;
            }
            Some(Err((resolver, e))) => {
                log::warn!("{} embed left unresolved for {}: {}", resolver, url, e);
                report.failed += 1;
            }
            None => {
                log::debug!("No resolver for embed {}", url);
                report.unmatched += 1;
            }
        }
    }

    report
}

fn apply(target: &mut BTreeMap<String, String>, attributes: Vec<EmbedAttribute>) {
    for attribute in attributes {
        target.insert(attribute.name, attribute.value);
    }
}
