use crate::document::{DocumentSource, SourceKind, SourceOptions};
use crate::DocId;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};

/// A PDF file on disk, extracted page by page each time it is read.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub id: DocId,
    pub path: PathBuf,
    options: SourceOptions,
}

impl PdfDocument {
    pub fn new(id: DocId, path: impl Into<PathBuf>) -> Self {
        Self::with_options(id, path, SourceOptions::default())
    }

    pub fn with_options(id: DocId, path: impl Into<PathBuf>, options: SourceOptions) -> Self {
        Self { id, path: path.into(), options }
    }
}

impl DocumentSource for PdfDocument {
    fn id(&self) -> DocId {
        self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Pdf
    }

    fn load(&self) -> Result<String> {
        // Parsing runs on its own thread so a pathological file can neither
        // hang nor panic the build; past the deadline the worker is abandoned.
        let (tx, rx) = mpsc::sync_channel(1);
        let path = self.path.clone();
        let doc_id = self.id;
        std::thread::Builder::new()
            .name(format!("pdf-extract-{doc_id}"))
            .spawn(move || {
                let _ = tx.send(extract_pages(doc_id, &path));
            })
            .context("spawning pdf extraction thread")?;

        match rx.recv_timeout(self.options.pdf_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(anyhow!(
                "extracting {} took longer than {:?}",
                self.path.display(),
                self.options.pdf_timeout
            )),
            Err(RecvTimeoutError::Disconnected) => {
                Err(anyhow!("pdf parser panicked on {}", self.path.display()))
            }
        }
    }
}

fn extract_pages(doc_id: DocId, path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path)
        .with_context(|| format!("opening pdf {}", path.display()))?;
    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(content) => text.push_str(&content),
            Err(err) => {
                tracing::warn!(
                    doc_id,
                    path = %path.display(),
                    page = page_number,
                    error = %err,
                    "skipping unreadable pdf page"
                );
            }
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_empty_text() {
        let dir = tempdir().unwrap();
        let doc = PdfDocument::new(1, dir.path().join("document.pdf"));
        assert_eq!(doc.id(), 1);
        assert_eq!(doc.kind(), SourceKind::Pdf);
        assert!(doc.load().is_err());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn garbage_file_yields_empty_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"this is not a pdf at all").unwrap();
        let doc = PdfDocument::new(2, &path);
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn zero_deadline_yields_empty_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slow.pdf");
        fs::write(&path, b"%PDF-1.5\n%%EOF\n").unwrap();
        let options = SourceOptions { pdf_timeout: Duration::ZERO, ..SourceOptions::default() };
        let doc = PdfDocument::with_options(3, &path, options);
        assert!(doc.load().is_err());
        assert_eq!(doc.text(), "");
    }
}
