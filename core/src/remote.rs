use crate::document::{DocumentSource, SourceKind, SourceOptions};
use crate::DocId;
use anyhow::{anyhow, bail, Context, Result};
use reqwest::{blocking::Client, header, Url};
use scraper::{Html, Selector};

/// A web page whose body text is fetched every time it is read.
///
/// Fetching blocks the calling thread for at most `fetch_timeout`; call it off
/// any async runtime.
#[derive(Debug, Clone)]
pub struct RemoteDocument {
    pub id: DocId,
    pub url: Url,
    options: SourceOptions,
}

impl RemoteDocument {
    pub fn new(id: DocId, url: Url) -> Self {
        Self::with_options(id, url, SourceOptions::default())
    }

    pub fn with_options(id: DocId, url: Url, options: SourceOptions) -> Self {
        Self { id, url, options }
    }

    fn fetch(&self) -> Result<String> {
        let client = Client::builder()
            .user_agent(self.options.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(self.options.fetch_timeout)
            .build()?;
        let resp = client
            .get(self.url.clone())
            .send()
            .with_context(|| format!("fetching {}", self.url))?;
        if !resp.status().is_success() {
            bail!("{} answered {}", self.url, resp.status());
        }
        let limit = self.options.max_body_bytes;
        let declared_len = resp
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if let Some(len) = declared_len {
            if len > limit {
                bail!("{} body of {len} bytes exceeds limit of {limit}", self.url);
            }
        }
        let bytes = resp.bytes().with_context(|| format!("reading body of {}", self.url))?;
        if bytes.len() > limit {
            bail!("{} body of {} bytes exceeds limit of {limit}", self.url, bytes.len());
        }
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}

impl DocumentSource for RemoteDocument {
    fn id(&self) -> DocId {
        self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn load(&self) -> Result<String> {
        let started = std::time::Instant::now();
        let html = self.fetch()?;
        let text = html_to_text(&html)?;
        tracing::debug!(
            doc_id = self.id,
            url = %self.url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "fetched remote document"
        );
        Ok(text)
    }
}

/// Text content of the `<body>` element, or of the whole document when there is none.
pub fn html_to_text(html: &str) -> Result<String> {
    let body_sel = Selector::parse("body").map_err(|e| anyhow!("invalid selector: {e:?}"))?;
    let doc = Html::parse_document(html);
    let text = match doc.select(&body_sel).next() {
        Some(body) => body.text().collect::<String>(),
        None => doc.root_element().text().collect::<String>(),
    };
    Ok(text.trim().to_string())
}
