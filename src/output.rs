//! Markdown output writing.
//!
//! Pages are written as they arrive (streaming), one file per page. The
//! mirror layout reproduces the URL path under the output directory
//! (`/a/b` → `a/b.md`, a trailing slash or the root → `index.md`); the
//! flat layout joins path segments with `_` into a single directory.
//! `INDEX.md` and `aggregated.md` are produced after the crawl ends.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::config::OutputStructure;
use crate::page::FetchedPage;

/// Relative output path for a URL under the given layout.
///
/// Path segments are sanitized for the filesystem; the `.md` extension is
/// appended. Reading the mirror path back as a relative path yields the
/// URL's path modulo sanitization and extension.
#[must_use]
pub fn url_to_file_path(url: &Url, structure: OutputStructure) -> PathBuf {
    let path = url.path();

    match structure {
        OutputStructure::Mirror => {
            if path == "/" || path.is_empty() {
                return PathBuf::from("index.md");
            }

            let trimmed = path.trim_start_matches('/');
            let mut out = PathBuf::new();
            let segments: Vec<&str> = trimmed.split('/').collect();
            let ends_with_slash = path.ends_with('/');

            for (i, segment) in segments.iter().enumerate() {
                if segment.is_empty() {
                    continue;
                }
                let safe = sanitize_filename::sanitize(segment);
                let is_last = i == segments.len() - 1 || segments[i + 1..].iter().all(|s| s.is_empty());
                if is_last && !ends_with_slash {
                    out.push(format!("{safe}.md"));
                } else {
                    out.push(safe);
                }
            }

            if ends_with_slash || out.as_os_str().is_empty() {
                out.push("index.md");
            }
            out
        }
        OutputStructure::Flat => {
            let flattened = path.trim_matches('/').replace('/', "_");
            if flattened.is_empty() {
                PathBuf::from("index.md")
            } else {
                PathBuf::from(format!("{}.md", sanitize_filename::sanitize(&flattened)))
            }
        }
    }
}

/// Writes converted pages and post-crawl artifacts to the output tree.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    output_dir: PathBuf,
    structure: OutputStructure,
}

impl OutputWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, structure: OutputStructure) -> Self {
        Self {
            output_dir: output_dir.into(),
            structure,
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Absolute output path for a page URL.
    pub fn page_path(&self, url: &Url) -> PathBuf {
        self.output_dir.join(url_to_file_path(url, self.structure))
    }

    /// Write one page's Markdown, creating parent directories as needed.
    pub async fn write_page(&self, page: &FetchedPage) -> Result<PathBuf> {
        let url = Url::parse(page.url())
            .with_context(|| format!("unwritable page URL {}", page.url()))?;
        let path = self.page_path(&url);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        tokio::fs::write(&path, page.markdown.as_bytes())
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        debug!(
            target: "website_fetch::output",
            "saved {} to {}",
            page.url(),
            path.display()
        );
        Ok(path)
    }

    /// Write `INDEX.md` listing every stored page.
    pub async fn write_index(&self, pages: &[FetchedPage]) -> Result<PathBuf> {
        let mut content = String::from("# Index\n\n");
        for page in pages {
            let rel = Url::parse(page.url())
                .map(|url| url_to_file_path(&url, self.structure))
                .unwrap_or_else(|_| PathBuf::from("index.md"));
            let label = page.title.as_deref().unwrap_or_else(|| page.url());
            content.push_str(&format!(
                "- [{label}]({}) — <{}>\n",
                rel.display(),
                page.url()
            ));
        }

        let path = self.output_dir.join("INDEX.md");
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `aggregated.md` concatenating every stored page.
    pub async fn write_aggregate(&self, pages: &[FetchedPage]) -> Result<PathBuf> {
        let mut content = String::new();
        for page in pages {
            if !content.is_empty() {
                content.push_str("\n\n---\n\n");
            }
            if let Some(title) = &page.title {
                content.push_str(&format!("# {title}\n\n"));
            }
            content.push_str(&format!("<{}>\n\n", page.url()));
            content.push_str(&page.markdown);
        }

        let path = self.output_dir.join("aggregated.md");
        tokio::fs::create_dir_all(&self.output_dir).await?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}
