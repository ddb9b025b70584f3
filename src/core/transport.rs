use crate::error::{Blupd8Error, Result};
use std::io::Read;
use std::time::Duration;

/// A streaming response body.
pub struct Body {
    /// `None` when the server sent no content length.
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

/// Blocking HTTP access used by the updater. Each call returns only once the
/// request has completed or failed.
pub trait Transport {
    /// Fetches a listing page as text.
    fn fetch_text(&self, url: &str) -> Result<String>;

    /// Starts a download and hands back the body to stream from.
    fn open(&self, url: &str) -> Result<Body>;
}

/// `Transport` backed by the blocking reqwest client, which runs the async
/// transport on its own worker thread.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(30))
            // Large packages take a while; the body itself is not time limited.
            .timeout(None)
            .build()
            .map_err(|e| Blupd8Error::config_error(format!("HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn get(&self, url: &str) -> reqwest::Result<reqwest::blocking::Response> {
        self.client.get(url).send()?.error_for_status()
    }
}

impl Transport for HttpTransport {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .and_then(|response| response.text())
            .map_err(|e| Blupd8Error::unreachable(url, e))
    }

    fn open(&self, url: &str) -> Result<Body> {
        let response = self
            .get(url)
            .map_err(|e| Blupd8Error::download_failed(url, e))?;

        Ok(Body {
            content_length: response.content_length(),
            reader: Box::new(response),
        })
    }
}
