use crate::DocId;
use anyhow::Result;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Inline,
    Remote,
    Pdf,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Inline => "inline",
            SourceKind::Remote => "remote",
            SourceKind::Pdf => "pdf",
        };
        f.pad(name)
    }
}

/// Limits applied to sources that perform I/O when their text is read.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub fetch_timeout: Duration,
    pub pdf_timeout: Duration,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
            pdf_timeout: Duration::from_secs(30),
            user_agent: "fts-rs/0.1".to_string(),
            max_body_bytes: 4 * 1024 * 1024,
        }
    }
}

/// Anything that can hand the index an identifier and its full text.
///
/// Implementors only write [`DocumentSource::load`]. The index reads documents
/// through [`DocumentSource::text`], which turns any failure into an empty
/// string so that one unreachable source contributes nothing instead of
/// aborting a build.
pub trait DocumentSource: Send + Sync + fmt::Debug {
    fn id(&self) -> DocId;

    fn kind(&self) -> SourceKind;

    /// Produce the document text, reporting why it could not be read.
    fn load(&self) -> Result<String>;

    fn text(&self) -> String {
        match self.load() {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    doc_id = self.id(),
                    kind = %self.kind(),
                    error = %format!("{err:#}"),
                    "document source unavailable, indexing as empty"
                );
                String::new()
            }
        }
    }
}

/// Text held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDocument {
    pub id: DocId,
    pub text: String,
}

impl InlineDocument {
    pub fn new(id: DocId, text: impl Into<String>) -> Self {
        Self { id, text: text.into() }
    }
}

impl DocumentSource for InlineDocument {
    fn id(&self) -> DocId {
        self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Inline
    }

    fn load(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}
