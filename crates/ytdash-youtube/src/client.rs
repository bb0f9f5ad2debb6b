//! HTTP client for the `YouTube` Data API v3.
//!
//! Wraps `reqwest` with API key management, error-envelope decoding and typed
//! response deserialization. Every method issues exactly one request and never
//! retries: the API enforces a daily quota, so retry policy is left to callers.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::YoutubeError;
use crate::types::{ChannelItem, ErrorEnvelope, ListResponse, PlaylistItem, VideoItem};

pub use ytdash_core::config::DEFAULT_YOUTUBE_BASE_URL as DEFAULT_BASE_URL;

/// The three provider endpoints the adapter depends on.
///
/// Implemented by [`YoutubeClient`]; tests substitute an in-memory fake.
pub trait YoutubeApi: Sync {
    /// `channels.list` for a single ID. `Ok(None)` means the provider matched
    /// nothing, which is distinct from a failed call.
    fn channel(
        &self,
        channel_id: &str,
    ) -> impl Future<Output = Result<Option<ChannelItem>, YoutubeError>> + Send;

    /// One page of `playlistItems.list`.
    fn playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> impl Future<Output = Result<ListResponse<PlaylistItem>, YoutubeError>> + Send;

    /// `videos.list` for up to 50 IDs.
    fn videos(
        &self,
        video_ids: &[String],
    ) -> impl Future<Output = Result<Vec<VideoItem>, YoutubeError>> + Send;
}

/// Client for the `YouTube` Data API.
///
/// Use [`YoutubeClient::new`] for production or
/// [`YoutubeClient::with_base_url`] to point at a mock server in tests.
pub struct YoutubeClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`YoutubeError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Resource names are joined onto the base, which only appends when
        // the base path ends in exactly one slash.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| YoutubeError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
        })
    }

    /// Builds `<base>/<resource>?<params>&key=<api_key>` with percent-encoded values.
    fn build_url(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, YoutubeError> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| YoutubeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request and decodes either the typed body or the API's
    /// error envelope.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, YoutubeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(decode_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

impl YoutubeApi for YoutubeClient {
    async fn channel(&self, channel_id: &str) -> Result<Option<ChannelItem>, YoutubeError> {
        let url = self.build_url(
            "channels",
            &[
                ("part", "snippet,contentDetails,statistics"),
                ("id", channel_id),
            ],
        )?;
        let envelope: ListResponse<ChannelItem> = self
            .get_json(url, &format!("channels.list(id={channel_id})"))
            .await?;
        Ok(envelope.items.into_iter().next())
    }

    async fn playlist_items(
        &self,
        playlist_id: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ListResponse<PlaylistItem>, YoutubeError> {
        let page_size = page_size.to_string();
        let mut params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let url = self.build_url("playlistItems", &params)?;
        self.get_json(url, &format!("playlistItems.list(playlistId={playlist_id})"))
            .await
    }

    async fn videos(&self, video_ids: &[String]) -> Result<Vec<VideoItem>, YoutubeError> {
        let ids = video_ids.join(",");
        let url = self.build_url(
            "videos",
            &[("part", "snippet,statistics,contentDetails"), ("id", &ids)],
        )?;
        let envelope: ListResponse<VideoItem> = self
            .get_json(url, &format!("videos.list({} ids)", video_ids.len()))
            .await?;
        Ok(envelope.items)
    }
}

/// Maps a non-2xx body to [`YoutubeError::QuotaExceeded`] or
/// [`YoutubeError::Api`], falling back to the raw body when it is not the
/// standard error envelope.
fn decode_error(status: u16, body: &str) -> YoutubeError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let quota = envelope
                .error
                .errors
                .iter()
                .any(|e| e.reason == "quotaExceeded" || e.reason == "dailyLimitExceeded");
            if quota {
                YoutubeError::QuotaExceeded(envelope.error.message)
            } else {
                YoutubeError::Api {
                    status,
                    message: envelope.error.message,
                }
            }
        }
        Err(_) => YoutubeError::Api {
            status,
            message: body.chars().take(200).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> YoutubeClient {
        YoutubeClient::with_base_url("test-key", 30, "ytdash-test/0.1", base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn default_base_url_matches_config_default() {
        let client = YoutubeClient::new("test-key", 30, "ytdash-test/0.1").unwrap();
        let url = client.build_url("videos", &[]).unwrap();
        assert!(
            url.as_str().starts_with(ytdash_core::config::DEFAULT_YOUTUBE_BASE_URL),
            "{url}"
        );
    }

    #[test]
    fn build_url_appends_resource_and_key() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client
            .build_url("channels", &[("part", "snippet"), ("id", "UC1")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/channels?part=snippet&id=UC1&key=test-key"
        );
    }

    #[test]
    fn build_url_tolerates_trailing_slashes() {
        let client = test_client("https://www.googleapis.com/youtube/v3//");
        let url = client.build_url("videos", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/youtube/v3/videos?key=test-key"
        );
    }

    #[test]
    fn build_url_encodes_commas() {
        let client = test_client("https://www.googleapis.com/youtube/v3");
        let url = client.build_url("videos", &[("id", "a,b")]).unwrap();
        assert!(url.as_str().contains("id=a%2Cb"), "{url}");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = YoutubeClient::with_base_url("k", 5, "ua", "not a url");
        assert!(matches!(result, Err(YoutubeError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn decode_error_detects_quota() {
        let body = r#"{"error":{"code":403,"message":"quota spent","errors":[{"reason":"quotaExceeded"}]}}"#;
        assert!(matches!(
            decode_error(403, body),
            YoutubeError::QuotaExceeded(ref m) if m == "quota spent"
        ));
    }

    #[test]
    fn decode_error_keeps_status_and_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","errors":[{"reason":"badRequest"}]}}"#;
        assert!(matches!(
            decode_error(400, body),
            YoutubeError::Api { status: 400, ref message } if message == "API key not valid"
        ));
    }

    #[test]
    fn decode_error_falls_back_to_raw_body() {
        assert!(matches!(
            decode_error(502, "Bad Gateway"),
            YoutubeError::Api { status: 502, ref message } if message == "Bad Gateway"
        ));
    }
}
