use std::sync::OnceLock;

use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::store::CustomAd;

// ---------------------------------------------------------------------------
// Remote document store — a public raw-file feed for read-only distribution
// plus a token-gated gist API for operator read/write.
// ---------------------------------------------------------------------------

/// Fallback target filename when the raw URL carries none.
pub const DEFAULT_DOC_FILENAME: &str = "ai-text-data.json";

const GIST_API_BASE: &str = "https://api.github.com/gists";
const UA: &str = "samproai";

/// Closed set of sync failure kinds. Unauthorized and NotFound stay distinct
/// so the settings panel can tell "fix the token" from "fix the URL".
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("document URL and access token are required")]
    MissingConfig,
    #[error("could not extract a document id or filename from the URL")]
    InvalidUrl,
    #[error("access token was rejected")]
    Unauthorized,
    #[error("document not found")]
    NotFound,
    #[error("request failed with status {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Shape of the shared public document. A superset is tolerated; only the
/// ad list is read, and a missing list means "no ads".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedDocument {
    pub custom_ads: Vec<CustomAd>,
}

/// Fetch the shared public document. The URL is cache-busted with a changing
/// query parameter and requested with caching disabled — the document may be
/// edited out-of-band at any time and the freshest copy must win.
pub async fn fetch_shared(http: &Client, url: &str) -> Result<SharedDocument, SyncError> {
    let base = url.split('?').next().unwrap_or(url);
    let cache_busted = format!("{base}?_={}", chrono::Utc::now().timestamp_millis());

    let resp = http
        .get(&cache_busted)
        .header(CACHE_CONTROL, "no-store")
        .header(USER_AGENT, UA)
        .send()
        .await
        .map_err(|e| SyncError::Network(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(status_error(status, body));
    }

    resp.json::<SharedDocument>()
        .await
        .map_err(|e| SyncError::Malformed(e.to_string()))
}

// ---------------------------------------------------------------------------
// Token-gated gist store
// ---------------------------------------------------------------------------

pub struct GistStore {
    http: Client,
    api_base: String,
}

impl Default for GistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GistStore {
    pub fn new() -> Self {
        Self::with_api_base(GIST_API_BASE.to_string())
    }

    pub fn with_api_base(api_base: String) -> Self {
        Self {
            http: Client::new(),
            api_base,
        }
    }

    /// GET the raw document through the authenticated endpoint.
    pub async fn load(&self, raw_url: &str, token: &str) -> Result<Value, SyncError> {
        if raw_url.trim().is_empty() || token.trim().is_empty() {
            return Err(SyncError::MissingConfig);
        }

        let resp = self
            .http
            .get(raw_url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github.v3.raw")
            .header(CACHE_CONTROL, "no-store")
            .header(USER_AGENT, UA)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| SyncError::Malformed(e.to_string()))
    }

    /// PATCH the named file entry, replacing its content with the
    /// pretty-printed document.
    pub async fn save(&self, raw_url: &str, token: &str, document: &Value) -> Result<(), SyncError> {
        if raw_url.trim().is_empty() || token.trim().is_empty() {
            return Err(SyncError::MissingConfig);
        }

        let id = gist_id(raw_url).ok_or(SyncError::InvalidUrl)?;
        let filename = gist_filename(raw_url);
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| SyncError::Malformed(e.to_string()))?;

        let body = serde_json::json!({
            "files": {
                filename: { "content": content },
            },
        });

        let resp = self
            .http
            .patch(format!("{}/{id}", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github.v3+json")
            .header(USER_AGENT, UA)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(status_error(status, detail));
        }

        Ok(())
    }
}

/// The gist id is the 32-hex-char path segment of the raw URL.
pub(crate) fn gist_id(url: &str) -> Option<String> {
    static ID_RE: OnceLock<Regex> = OnceLock::new();
    let re = ID_RE.get_or_init(|| Regex::new("([a-f0-9]{32})").expect("gist id regex"));
    let normalized = url.split('?').next().unwrap_or(url);
    re.captures(normalized)
        .map(|caps| caps[1].to_string())
}

/// Last path segment of the raw URL, or the default document name.
pub(crate) fn gist_filename(url: &str) -> String {
    let normalized = url.split('?').next().unwrap_or(url).trim_end_matches('/');
    normalized
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_DOC_FILENAME.to_string())
}

fn status_error(status: StatusCode, detail: String) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Unauthorized,
        StatusCode::NOT_FOUND => SyncError::NotFound,
        other => {
            // GitHub wraps its error text in {"message": "..."}.
            let detail = serde_json::from_str::<Value>(&detail)
                .ok()
                .and_then(|v| v["message"].as_str().map(String::from))
                .unwrap_or(detail);
            SyncError::Http {
                status: other.as_u16(),
                detail,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_URL: &str =
        "https://gist.githubusercontent.com/someone/2dddbc12618c36beaf6e03bbcf7331c8/raw/ce16b2c9/samproai-data.json";

    #[test]
    fn id_and_filename_come_out_of_the_raw_url() {
        assert_eq!(
            gist_id(RAW_URL).as_deref(),
            Some("2dddbc12618c36beaf6e03bbcf7331c8")
        );
        assert_eq!(gist_filename(RAW_URL), "samproai-data.json");
    }

    #[test]
    fn query_and_trailing_slash_do_not_confuse_extraction() {
        let url = format!("{RAW_URL}/?_=123456");
        assert_eq!(gist_filename(&url), "samproai-data.json");
        assert!(gist_id(&url).is_some());
    }

    #[test]
    fn urls_without_an_id_are_rejected() {
        assert_eq!(gist_id("https://example.com/not-a-gist.json"), None);
    }

    #[test]
    fn auth_and_not_found_map_to_distinct_kinds() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, String::new()),
            SyncError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, String::new()),
            SyncError::Unauthorized
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new()),
            SyncError::NotFound
        ));
    }

    #[test]
    fn other_statuses_surface_the_api_message() {
        let err = status_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Validation Failed"}"#.to_string(),
        );
        match err {
            SyncError::Http { status, detail } => {
                assert_eq!(status, 422);
                assert_eq!(detail, "Validation Failed");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn shared_document_tolerates_supersets_and_gaps() {
        let doc: SharedDocument =
            serde_json::from_str(r#"{"results":{},"customAds":[{"id":"1","name":"متجر"}]}"#)
                .expect("parse");
        assert_eq!(doc.custom_ads.len(), 1);
        assert_eq!(doc.custom_ads[0].name, "متجر");

        let empty: SharedDocument = serde_json::from_str("{}").expect("parse");
        assert!(empty.custom_ads.is_empty());
    }
}
