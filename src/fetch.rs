//! Content fetching for local files and remote sources.
//!
//! [`Source::parse`] decides what an `add` argument refers to:
//!
//! | Argument | Source | Content | Title |
//! |----------|--------|---------|-------|
//! | filesystem path | [`Source::Local`] | file bytes as text | none |
//! | `youtube.com/watch…`, `youtu.be/…` | [`Source::Video`] | caption text | `"{video} - {channel}"` |
//! | any other `http(s)://` URL | [`Source::Web`] | page converted to text, trimmed | first `<title>` span |
//!
//! Page conversion and caption lookup are collaborators behind the
//! [`MarkupConverter`] and [`CaptionSource`] traits.

use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::models::Fetched;
use crate::youtube::YouTubeCaptions;

/// What an `add` argument points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Local(PathBuf),
    Video(String),
    Web(String),
}

impl Source {
    pub fn parse(arg: &str) -> Source {
        if is_url(arg) {
            if is_video_url(arg) {
                Source::Video(arg.to_string())
            } else {
                Source::Web(arg.to_string())
            }
        } else {
            Source::Local(PathBuf::from(arg))
        }
    }
}

pub fn is_url(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}

pub fn is_video_url(url: &str) -> bool {
    url.contains("youtube.com/watch") || url.contains("youtu.be/")
}

/// Caption text and metadata for one video.
#[derive(Debug, Clone)]
pub struct Captions {
    pub text: String,
    pub video_title: String,
    pub channel_title: String,
}

#[async_trait]
pub trait CaptionSource: Send + Sync {
    async fn captions(&self, url: &str, cancel: &CancellationToken) -> Result<Captions, FetchError>;
}

/// Converts a markup document into readable text.
pub trait MarkupConverter: Send + Sync {
    fn convert(&self, html: &str) -> Result<String, FetchError>;
}

/// Default converter: walks the parsed DOM, drops non-content elements,
/// and emits paragraph-separated text with markdown heading and list
/// markers.
pub struct HtmlToText;

const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe",
];
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "dt", "dd", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

impl MarkupConverter for HtmlToText {
    fn convert(&self, html: &str) -> Result<String, FetchError> {
        let document = Html::parse_document(html);
        let mut out = String::new();
        walk(document.root_element(), &mut out);
        Ok(out)
    }
}

fn walk(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_inline(out, text);
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child_el.value().name();
        if SKIPPED.contains(&name) {
            continue;
        }
        if name == "br" {
            trim_trailing_spaces(out);
            out.push('\n');
            continue;
        }

        let block = BLOCKS.contains(&name);
        if block {
            break_block(out);
        }
        if let Some(level) = heading_level(name) {
            out.push_str(&"#".repeat(level));
            out.push(' ');
        } else if name == "li" {
            out.push_str("- ");
        }
        walk(child_el, out);
        if block {
            break_block(out);
        }
    }
}

fn heading_level(name: &str) -> Option<usize> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn push_inline(out: &mut String, text: &str) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let at_line_start = out.is_empty() || out.ends_with('\n') || out.ends_with(' ');

    if words.is_empty() {
        if !at_line_start && !text.is_empty() {
            out.push(' ');
        }
        return;
    }

    if !at_line_start && text.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(&words.join(" "));
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn trim_trailing_spaces(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
}

fn break_block(out: &mut String) {
    trim_trailing_spaces(out);
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    if out.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
}

/// Text between the first literal `<title>` and the following `</title>`.
///
/// Case-sensitive and attribute-unaware: `<TITLE>` or `<title lang="en">`
/// are not recognized.
pub fn extract_title(body: &str) -> Option<String> {
    const OPEN: &str = "<title>";
    const CLOSE: &str = "</title>";

    let start = body.find(OPEN)? + OPEN.len();
    let end = start + body[start..].find(CLOSE)?;
    Some(body[start..end].trim().to_string())
}

/// Interpret classified bytes as text, one char per byte.
///
/// Bytes that pass [`is_indexable`](crate::classify::is_indexable) are
/// ASCII or single high bytes in 0xC0..=0xFF, so they are read as Latin-1:
/// every byte maps to the code point of the same value and nothing is
/// replaced.
///
/// ```rust
/// use lit::fetch::decode_text;
///
/// assert_eq!(decode_text(b"caf\xE9"), "café");
/// ```
pub fn decode_text(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Read a local file's raw bytes.
pub async fn read_file(path: &Path) -> Result<Vec<u8>, FetchError> {
    tokio::fs::read(path).await.map_err(|source| FetchError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Reads local files and fetches remote pages and videos.
pub struct Fetcher {
    client: reqwest::Client,
    converter: Box<dyn MarkupConverter>,
    captions: Box<dyn CaptionSource>,
}

impl Fetcher {
    /// Fetcher with the default HTML converter and YouTube caption source.
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;
        let captions = YouTubeCaptions::new(client.clone());
        Ok(Self::with_collaborators(
            client,
            Box::new(HtmlToText),
            Box::new(captions),
        ))
    }

    pub fn with_collaborators(
        client: reqwest::Client,
        converter: Box<dyn MarkupConverter>,
        captions: Box<dyn CaptionSource>,
    ) -> Self {
        Self {
            client,
            converter,
            captions,
        }
    }

    pub async fn fetch(
        &self,
        source: &Source,
        cancel: &CancellationToken,
    ) -> Result<Fetched, FetchError> {
        match source {
            Source::Local(path) => read_local(path).await,
            Source::Video(url) => {
                let captions = self.captions.captions(url, cancel).await?;
                Ok(Fetched {
                    content: captions.text,
                    title: Some(format!(
                        "{} - {}",
                        captions.video_title, captions.channel_title
                    )),
                })
            }
            Source::Web(url) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(FetchError::Network {
                        url: url.clone(),
                        message: "cancelled".to_string(),
                    }),
                    result = self.fetch_web(url) => result,
                }
            }
        }
    }

    async fn fetch_web(&self, url: &str) -> Result<Fetched, FetchError> {
        let network_err = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(network_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(network_err)?;
        let content = self.converter.convert(&body)?.trim().to_string();

        Ok(Fetched {
            content,
            title: extract_title(&body),
        })
    }
}

async fn read_local(path: &Path) -> Result<Fetched, FetchError> {
    let bytes = read_file(path).await?;
    Ok(Fetched {
        content: decode_text(&bytes),
        title: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::Html as HtmlResponse;
    use axum::routing::get;
    use axum::Router;
    use tempfile::TempDir;

    struct FixedCaptions;

    #[async_trait]
    impl CaptionSource for FixedCaptions {
        async fn captions(
            &self,
            _url: &str,
            _cancel: &CancellationToken,
        ) -> Result<Captions, FetchError> {
            Ok(Captions {
                text: "never gonna give you up".to_string(),
                video_title: "Never Gonna Give You Up".to_string(),
                channel_title: "Rick Astley".to_string(),
            })
        }
    }

    fn test_fetcher() -> Fetcher {
        Fetcher::with_collaborators(
            reqwest::Client::new(),
            Box::new(HtmlToText),
            Box::new(FixedCaptions),
        )
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("notes/a.txt"),
            Source::Local(PathBuf::from("notes/a.txt"))
        );
        assert_eq!(
            Source::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Source::Video("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            Source::parse("https://youtu.be/dQw4w9WgXcQ"),
            Source::Video("https://youtu.be/dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            Source::parse("http://example.com/page"),
            Source::Web("http://example.com/page".to_string())
        );
        // Scheme-less hosts are treated as paths.
        assert_eq!(
            Source::parse("example.com"),
            Source::Local(PathBuf::from("example.com"))
        );
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title> Hello </title></head></html>").as_deref(),
            Some("Hello")
        );
        assert_eq!(extract_title("<html><body>none</body></html>"), None);
        assert_eq!(extract_title("<TITLE>Upper</TITLE>"), None);
        assert_eq!(extract_title(r#"<title lang="en">Attr</title>"#), None);
        assert_eq!(
            extract_title("<title>First</title><title>Second</title>").as_deref(),
            Some("First")
        );
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><title>T</title><style>body{}</style></head>
            <body><h1>Heading</h1><p>Some <b>bold</b>   text.</p>
            <script>var x = 1;</script>
            <ul><li>one</li><li>two</li></ul></body></html>"#;
        let text = HtmlToText.convert(html).unwrap();
        let text = text.trim();
        assert_eq!(text, "# Heading\n\nSome bold text.\n\n- one\n\n- two");
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.txt");
        std::fs::write(&path, "hello").unwrap();

        let fetched = test_fetcher()
            .fetch(&Source::Local(path), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fetched.content, "hello");
        assert_eq!(fetched.title, None);
    }

    #[test]
    fn test_decode_text_keeps_high_bytes() {
        assert_eq!(decode_text(b"plain ascii\n"), "plain ascii\n");
        assert_eq!(decode_text(b"caf\xE9 cr\xE8me"), "café crème");
        assert_eq!(decode_text(b"\xC0\xFF"), "\u{C0}\u{FF}");
    }

    #[tokio::test]
    async fn test_fetch_local_latin1_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("menu.txt");
        std::fs::write(&path, b"caf\xE9").unwrap();

        let fetched = test_fetcher()
            .fetch(&Source::Local(path), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(fetched.content, "café");
    }

    #[tokio::test]
    async fn test_fetch_missing_local_file() {
        let err = test_fetcher()
            .fetch(
                &Source::Local(PathBuf::from("/definitely/not/here.txt")),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Read { .. }));
    }

    #[tokio::test]
    async fn test_fetch_video_title_format() {
        let fetched = test_fetcher()
            .fetch(
                &Source::Video("https://youtu.be/dQw4w9WgXcQ".to_string()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(fetched.content, "never gonna give you up");
        assert_eq!(
            fetched.title.as_deref(),
            Some("Never Gonna Give You Up - Rick Astley")
        );
    }

    #[tokio::test]
    async fn test_fetch_web_page() {
        let base = serve(Router::new().route(
            "/page",
            get(|| async {
                HtmlResponse("<html><head><title>My Page</title></head><body>\n\n<p>Body text</p>\n\n</body></html>")
            }),
        ))
        .await;

        let fetched = test_fetcher()
            .fetch(
                &Source::Web(format!("{}/page", base)),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(fetched.content, "Body text");
        assert_eq!(fetched.title.as_deref(), Some("My Page"));
    }

    #[tokio::test]
    async fn test_fetch_web_bad_status() {
        let base = serve(Router::new().route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "gone") }),
        ))
        .await;

        let err = test_fetcher()
            .fetch(
                &Source::Web(format!("{}/missing", base)),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::BadStatus { status: 404, .. }));
    }
}
