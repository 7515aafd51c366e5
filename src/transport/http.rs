//! reqwest-backed transport

use async_trait::async_trait;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::query::RequestPayload;
use crate::response::ExportHandle;

use super::errors::{TransportError, TransportResult};
use super::{Download, QueryTransport};

/// Talks to the execution and download endpoints over HTTP
///
/// No client-side timeout is set; a hung server leaves the request pending.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    fetch_url: Url,
    download_url: Url,
}

impl HttpTransport {
    pub fn new(fetch_url: &str, download_url: &str) -> TransportResult<Self> {
        Ok(Self {
            client: Client::new(),
            fetch_url: Url::parse(fetch_url)?,
            download_url: Url::parse(download_url)?,
        })
    }

    pub fn from_config(config: &ClientConfig) -> TransportResult<Self> {
        Self::new(&config.fetch_url(), &config.download_url())
    }

    pub fn fetch_url(&self) -> &Url {
        &self.fetch_url
    }

    /// Download location for `handle`, passed verbatim as `filePath`
    pub fn download_url_for(&self, handle: &ExportHandle) -> Url {
        let mut url = self.download_url.clone();
        url.query_pairs_mut().append_pair("filePath", handle.as_str());
        url
    }

    async fn check_status(response: Response) -> TransportResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    async fn execute(&self, payload: &RequestPayload) -> TransportResult<Value> {
        let response = self
            .client
            .post(self.fetch_url.clone())
            .json(payload)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| TransportError::MalformedBody(e.to_string()))
    }

    async fn download(&self, handle: &ExportHandle) -> TransportResult<Download> {
        let response = self.client.get(self.download_url_for(handle)).send().await?;
        let response = Self::check_status(response).await?;

        let headers = response.headers();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name)
            .unwrap_or_else(|| handle.file_name().to_string());
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?.to_vec();
        Ok(Download {
            file_name,
            bytes,
            content_type,
        })
    }
}

/// Extract `filename` from a Content-Disposition header value
fn disposition_file_name(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("filename") {
            return None;
        }
        let name = value.trim().trim_matches('"');
        // Never let a header choose a directory
        let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    })
}
