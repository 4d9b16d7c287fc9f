// src/pipeline/content.rs

//! Content build: parse every markdown document, resolve its embeds and
//! render it to HTML.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::content::Document;
use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{RateLimitedQueue, ResolverRegistry};
use crate::storage::{ArtifactStorage, LocalStorage};
use crate::utils::http::create_client;

use super::embeds::{EnrichReport, enrich_document};

/// A parsed document and its path relative to the content root.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub rel_path: PathBuf,
    pub document: Document,
}

impl SourceDocument {
    /// Front matter slug, or the relative path without its extension.
    pub fn slug(&self) -> String {
        if let Some(slug) = &self.document.front_matter.slug {
            return slug.trim_matches('/').to_string();
        }
        self.rel_path
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Title from front matter or first heading, else the slug.
    pub fn title(&self) -> String {
        self.document.title().unwrap_or_else(|| self.slug())
    }

    /// Output key for the rendered page.
    pub fn html_key(&self) -> String {
        self.rel_path
            .with_extension("html")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Counts from a content build.
#[derive(Debug, Default)]
pub struct ContentReport {
    pub rendered: usize,
    pub skipped: usize,
    pub embeds: EnrichReport,
}

/// Parse every `*.md` file under `root`, sorted by relative path.
///
/// Unreadable or unparsable documents are logged and skipped. A missing
/// root yields no documents.
pub async fn load_documents(root: &Path) -> Result<(Vec<SourceDocument>, usize)> {
    if !root.exists() {
        log::info!("No content directory at {}, skipping", root.display());
        return Ok((Vec::new(), 0));
    }

    let mut paths = Vec::new();
    let mut skipped = 0;
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(AppError::parse(root, e)),
            Err(e) => {
                let path = e.path().unwrap_or(root).display().to_string();
                log::warn!("Skipping unreadable entry {}: {}", path, e);
                skipped += 1;
                continue;
            }
        };
        let is_markdown = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if entry.file_type().is_file() && is_markdown {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        match load_document(&path).await {
            Ok(document) => {
                let rel_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                documents.push(SourceDocument { rel_path, document });
            }
            Err(e) => {
                log::warn!("Skipping document {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }
    Ok((documents, skipped))
}

async fn load_document(path: &Path) -> Result<Document> {
    let source = tokio::fs::read_to_string(path).await?;
    Document::parse(&source).map_err(|e| AppError::parse(path, e))
}

/// Build the default resolvers around one shared queue.
pub fn default_registry(config: &Config) -> Result<ResolverRegistry> {
    let client = create_client(&config.http)?;
    let queue = RateLimitedQueue::from_config(&config.http);
    Ok(ResolverRegistry::with_defaults(&client, &queue, &config.embeds))
}

/// Transform and render every content document.
pub async fn run_content(config: &Config) -> Result<ContentReport> {
    let registry = default_registry(config)?;
    let output = LocalStorage::new(&config.paths.html_output_dir);
    render_documents(&config.paths.content_dir, &registry, &output).await
}

/// Render the documents under `root` into `output`.
pub async fn render_documents(
    root: &Path,
    registry: &ResolverRegistry,
    output: &dyn ArtifactStorage,
) -> Result<ContentReport> {
    let (documents, skipped) = load_documents(root).await?;
    let mut report = ContentReport {
        skipped,
        ..ContentReport::default()
    };

    for mut source in documents {
        let enriched = enrich_document(&mut source.document, registry).await;
        report.embeds.merge(enriched);

        let key = source.html_key();
        output
            .write_bytes(&key, source.document.render_html().as_bytes())
            .await?;
        log::debug!("Rendered {}", output.location(&key));
        report.rendered += 1;
    }

    log::info!(
        "Content: {} document(s) rendered, {} skipped; embeds {} enriched, {} failed, {} unmatched",
        report.rendered,
        report.skipped,
        report.embeds.enriched,
        report.embeds.failed,
        report.embeds.unmatched
    );
    Ok(report)
}
