// src/pipeline/export.rs

//! Plain-text export of the content documents: an `llms.txt` index and a
//! concatenated `llms-full.txt`.

use crate::error::Result;
use crate::models::{Config, SiteConfig};
use crate::storage::{ArtifactStorage, LocalStorage};

use super::content::{SourceDocument, load_documents};

pub const INDEX_FILE: &str = "llms.txt";
pub const FULL_FILE: &str = "llms-full.txt";

/// Build the index: site header, then one link line per document.
pub fn render_index(site: &SiteConfig, documents: &[SourceDocument]) -> String {
    let mut out = format!("# {}\n\n> {}\n\n", site.title, site.description);
    for source in documents {
        out.push_str(&format!("- [{}]({})", source.title(), page_url(site, source)));
        if let Some(description) = source.document.front_matter.description.as_deref() {
            out.push_str(&format!(": {}", description.trim()));
        }
        out.push('\n');
    }
    out
}

/// Concatenate every document body under a title header and source line.
pub fn render_full(site: &SiteConfig, documents: &[SourceDocument]) -> String {
    documents
        .iter()
        .map(|source| {
            format!(
                "# {}\n\nSource: {}\n\n{}\n",
                source.title(),
                page_url(site, source),
                source.document.body.trim_end()
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n\n")
}

fn page_url(site: &SiteConfig, source: &SourceDocument) -> String {
    format!("{}/{}", site.base_url.trim_end_matches('/'), source.slug())
}

/// Write both export files from the documents under `content_dir`.
pub async fn run_export(config: &Config) -> Result<usize> {
    let (documents, _) = load_documents(&config.paths.content_dir).await?;
    let output = LocalStorage::new(&config.paths.export_dir);
    write_export(&config.site, &documents, &output).await?;
    Ok(documents.len())
}

pub async fn write_export(
    site: &SiteConfig,
    documents: &[SourceDocument],
    output: &dyn ArtifactStorage,
) -> Result<()> {
    output
        .write_bytes(INDEX_FILE, render_index(site, documents).as_bytes())
        .await?;
    output
        .write_bytes(FULL_FILE, render_full(site, documents).as_bytes())
        .await?;

    log::info!(
        "Exported {} document(s) to {} and {}",
        documents.len(),
        output.location(INDEX_FILE),
        output.location(FULL_FILE)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Document;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn site() -> SiteConfig {
        SiteConfig {
            title: "Kigu Directory".into(),
            description: "Makers and hadatai".into(),
            base_url: "https://example.org/".into(),
        }
    }

    fn doc(rel: &str, source: &str) -> SourceDocument {
        SourceDocument {
            rel_path: PathBuf::from(rel),
            document: Document::parse(source).unwrap(),
        }
    }

    fn documents() -> Vec<SourceDocument> {
        vec![
            doc("care.md", "---\ntitle: Care\ndescription: Keeping masks clean\n---\nWipe gently.\n"),
            doc("faq.md", "# FAQ\n\nAsk away.\n"),
        ]
    }

    #[test]
    fn test_render_index() {
        let index = render_index(&site(), &documents());
        assert_eq!(
            index,
            "# Kigu Directory\n\n> Makers and hadatai\n\n\
             - [Care](https://example.org/care): Keeping masks clean\n\
             - [FAQ](https://example.org/faq)\n"
        );
    }

    #[test]
    fn test_render_full_strips_front_matter() {
        let full = render_full(&site(), &documents());
        assert!(full.starts_with("# Care\n\nSource: https://example.org/care\n\nWipe gently.\n"));
        assert!(full.contains("\n---\n\n# FAQ\n"));
        assert!(!full.contains("description:"));
    }

    #[tokio::test]
    async fn test_write_export() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        write_export(&site(), &documents(), &storage).await.unwrap();
        assert!(tmp.path().join(INDEX_FILE).exists());
        assert!(tmp.path().join(FULL_FILE).exists());
    }
}
