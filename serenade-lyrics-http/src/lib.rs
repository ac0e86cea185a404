use async_trait::async_trait;
use serenade_core::{CoreError, LyricsConfig, LyricsSource};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const LOG_TARGET: &str = "serenade::source::http";

/// Lyric sheets served over HTTP(S)
///
/// A single GET per fetch with no retries; a failed load simply leaves the
/// song without lyrics.
pub struct HttpLyricsSource {
    client: reqwest::Client,
}

impl HttpLyricsSource {
    /// Create a source with timeouts and user agent from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &LyricsConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    fn parse_url(location: &str) -> Option<Url> {
        Url::parse(location)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }
}

#[async_trait]
impl LyricsSource for HttpLyricsSource {
    fn name(&self) -> &'static str {
        "http"
    }

    fn supports(&self, location: &str) -> bool {
        Self::parse_url(location).is_some()
    }

    async fn fetch(&self, location: &str) -> Result<String, CoreError> {
        let url = Self::parse_url(location).ok_or_else(|| CoreError::UnsupportedLocation {
            location: location.to_string(),
        })?;

        info!(target: LOG_TARGET, "GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(target: LOG_TARGET, "Response status: {}", status);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CoreError::LyricsNotFound {
                location: location.to_string(),
            });
        }

        if !status.is_success() {
            warn!(target: LOG_TARGET, "Lyrics server returned status: {}", status);
            return Err(CoreError::LyricsFetchFailed {
                source_name: self.name().to_string(),
                location: location.to_string(),
                reason: format!("server returned status: {status}"),
            });
        }

        Ok(response.text().await?)
    }
}
