//! Caption and metadata lookup for YouTube videos.
//!
//! Title and channel come from the public oEmbed endpoint; caption text
//! comes from the timed-text endpoint, whose XML transcript is flattened
//! into a single space-separated string.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::fetch::{CaptionSource, Captions};

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.|m\.)?(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .expect("Failed to compile YouTube regex")
});

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Extract the 11-character video id from a watch or short link.
pub fn video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_owned()))
}

#[derive(Deserialize)]
struct OembedResponse {
    title: String,
    author_name: String,
}

pub struct YouTubeCaptions {
    client: reqwest::Client,
    base_url: String,
    lang: String,
}

impl YouTubeCaptions {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Point both endpoints at another host (used by tests).
    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            lang: "en".to_string(),
        }
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, url))
            .query(query)
            .send()
            .await
            .map_err(|e| network_err(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| network_err(url, e))
    }

    async fn lookup(&self, url: &str) -> Result<Captions, FetchError> {
        let id = video_id(url).ok_or_else(|| FetchError::Captions {
            url: url.to_string(),
            message: "no video id in URL".to_string(),
        })?;

        let oembed = self
            .get_text("/oembed", &[("url", url), ("format", "json")])
            .await?;
        let meta: OembedResponse =
            serde_json::from_str(&oembed).map_err(|e| FetchError::Captions {
                url: url.to_string(),
                message: format!("invalid oEmbed response: {}", e),
            })?;

        let transcript = self
            .get_text("/api/timedtext", &[("v", id.as_str()), ("lang", self.lang.as_str())])
            .await?;
        let text = parse_transcript(&transcript).map_err(|message| FetchError::Captions {
            url: url.to_string(),
            message,
        })?;
        if text.is_empty() {
            return Err(FetchError::Captions {
                url: url.to_string(),
                message: format!("no {} captions available", self.lang),
            });
        }

        Ok(Captions {
            text,
            video_title: meta.title,
            channel_title: meta.author_name,
        })
    }
}

#[async_trait]
impl CaptionSource for YouTubeCaptions {
    async fn captions(&self, url: &str, cancel: &CancellationToken) -> Result<Captions, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Network {
                url: url.to_string(),
                message: "cancelled".to_string(),
            }),
            result = self.lookup(url) => result,
        }
    }
}

fn network_err(url: &str, e: reqwest::Error) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        message: e.to_string(),
    }
}

/// Join the `<text>` elements of a timed-text transcript.
fn parse_transcript(xml: &str) -> Result<String, String> {
    let mut parts: Vec<String> = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Start(e)) => {
                in_text = e.local_name().as_ref() == b"text";
            }
            Ok(quick_xml::events::Event::End(_)) => in_text = false,
            Ok(quick_xml::events::Event::Text(te)) if in_text => {
                let text = te.unescape().map_err(|e| e.to_string())?;
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    Ok(parts.join(" "))
}
