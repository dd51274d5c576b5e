//! Corpus manifests: JSON (array or single object) or JSONL files listing the
//! documents to index.
//!
//! ```json
//! [
//!   {"id": 1, "kind": "text", "text": "This is a document about Go programming."},
//!   {"id": 3, "kind": "url", "url": "https://example.com/article"},
//!   {"id": 4, "kind": "pdf", "path": "document.pdf"}
//! ]
//! ```
//!
//! Relative PDF paths resolve against the manifest's directory.

use crate::document::{DocumentSource, InlineDocument, SourceOptions};
use crate::pdf::PdfDocument;
use crate::remote::RemoteDocument;
use crate::DocId;
use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DocumentEntry {
    Text { id: DocId, text: String },
    Url { id: DocId, url: String },
    Pdf { id: DocId, path: String },
}

impl DocumentEntry {
    pub fn id(&self) -> DocId {
        match self {
            DocumentEntry::Text { id, .. }
            | DocumentEntry::Url { id, .. }
            | DocumentEntry::Pdf { id, .. } => *id,
        }
    }

    /// Turn the entry into a source. `base_dir` anchors relative PDF paths.
    pub fn into_source(
        self,
        base_dir: Option<&Path>,
        options: &SourceOptions,
    ) -> Result<Arc<dyn DocumentSource>> {
        let source: Arc<dyn DocumentSource> = match self {
            DocumentEntry::Text { id, text } => Arc::new(InlineDocument::new(id, text)),
            DocumentEntry::Url { id, url } => {
                let url = Url::parse(&url)
                    .with_context(|| format!("document {id}: invalid url {url:?}"))?;
                Arc::new(RemoteDocument::with_options(id, url, options.clone()))
            }
            DocumentEntry::Pdf { id, path } => {
                let path = Path::new(&path);
                let path = match base_dir {
                    Some(dir) if path.is_relative() => dir.join(path),
                    _ => path.to_path_buf(),
                };
                Arc::new(PdfDocument::with_options(id, path, options.clone()))
            }
        };
        Ok(source)
    }
}

/// Parse manifest entries, choosing JSONL or JSON by extension.
pub fn read_entries(path: &Path) -> Result<Vec<DocumentEntry>> {
    let f = File::open(path).with_context(|| format!("opening manifest {}", path.display()))?;
    let reader = BufReader::new(f);
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut entries = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
            entries.push(entry);
        }
        return Ok(entries);
    }

    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", path.display()))?;
    let entries = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<Vec<DocumentEntry>, _>>()
            .with_context(|| format!("invalid entry in {}", path.display()))?,
        obj @ serde_json::Value::Object(_) => vec![serde_json::from_value(obj)
            .with_context(|| format!("invalid entry in {}", path.display()))?],
        _ => bail!("{}: expected a JSON array or object", path.display()),
    };
    Ok(entries)
}

/// Load every document a manifest lists, in file order.
pub fn load_sources(
    path: &Path,
    options: &SourceOptions,
) -> Result<Vec<Arc<dyn DocumentSource>>> {
    let base_dir = path.parent();
    let sources = read_entries(path)?
        .into_iter()
        .map(|entry| entry.into_source(base_dir, options))
        .collect::<Result<Vec<_>>>()?;
    tracing::info!(manifest = %path.display(), num_docs = sources.len(), "loaded corpus manifest");
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SourceKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        fs::write(
            &path,
            r#"[
                {"id": 1, "kind": "text", "text": "Go programming"},
                {"id": 3, "kind": "url", "url": "https://example.com/"},
                {"id": 4, "kind": "pdf", "path": "document.pdf"}
            ]"#,
        )
        .unwrap();
        let sources = load_sources(&path, &SourceOptions::default()).unwrap();
        let kinds: Vec<_> = sources.iter().map(|s| (s.id(), s.kind())).collect();
        assert_eq!(
            kinds,
            vec![(1, SourceKind::Inline), (3, SourceKind::Remote), (4, SourceKind::Pdf)]
        );
        assert_eq!(sources[0].text(), "Go programming");
    }

    #[test]
    fn reads_single_object_and_jsonl() {
        let dir = tempdir().unwrap();
        let single = dir.path().join("one.json");
        fs::write(&single, r#"{"id": 7, "kind": "text", "text": "alone"}"#).unwrap();
        assert_eq!(
            read_entries(&single).unwrap(),
            vec![DocumentEntry::Text { id: 7, text: "alone".into() }]
        );

        let lines = dir.path().join("many.jsonl");
        fs::write(
            &lines,
            concat!(
                r#"{"id": 1, "kind": "text", "text": "a"}"#,
                "\n\n",
                r#"{"id": 2, "kind": "text", "text": "b"}"#,
                "\n",
            ),
        )
        .unwrap();
        let ids: Vec<_> = read_entries(&lines).unwrap().iter().map(DocumentEntry::id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn relative_pdf_paths_resolve_against_base_dir() {
        let entry = DocumentEntry::Pdf { id: 4, path: "docs/document.pdf".into() };
        let base = Path::new("/srv/corpus");
        let source = entry.into_source(Some(base), &SourceOptions::default()).unwrap();
        assert!(format!("{source:?}").contains("/srv/corpus/docs/document.pdf"));
    }

    #[test]
    fn invalid_entries_are_errors() {
        let dir = tempdir().unwrap();
        let bad_url = dir.path().join("bad_url.json");
        fs::write(&bad_url, r#"[{"id": 1, "kind": "url", "url": "not a url"}]"#).unwrap();
        assert!(load_sources(&bad_url, &SourceOptions::default()).is_err());

        let bad_kind = dir.path().join("bad_kind.json");
        fs::write(&bad_kind, r#"[{"id": 1, "kind": "video", "path": "x.mp4"}]"#).unwrap();
        assert!(read_entries(&bad_kind).is_err());

        assert!(read_entries(&dir.path().join("missing.json")).is_err());

        let scalars = [("number.json", "42"), ("string.json", r#""x""#), ("null.json", "null")];
        for (name, body) in scalars {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            let err = read_entries(&path).unwrap_err();
            let message = format!("{err:#}");
            assert!(message.contains("expected a JSON array or object"), "{name}: {message}");
        }
    }
}
