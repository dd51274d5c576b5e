pub mod controller;
pub mod document;
pub mod index;
pub mod manifest;
pub mod pdf;
pub mod query;
pub mod remote;
pub mod stats;
pub mod tokenizer;

pub use controller::{IndexController, IndexSnapshot, IndexState, IndexStats, SearchHit};
pub use document::{DocumentSource, InlineDocument, SourceKind, SourceOptions};
pub use index::{InvertedIndex, TfIdfIndex, TokenizedDocument};
pub use pdf::PdfDocument;
pub use query::SearchOptions;
pub use remote::RemoteDocument;

/// Caller-assigned document identifier.
pub type DocId = u32;
