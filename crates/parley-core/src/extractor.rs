//! Conversation extraction from a messaging page.
//!
//! A page is a list of "message wrapper" elements, each holding a nested
//! "message body". Extraction yields one string per wrapper, in document
//! order, so the position of every message is preserved even when a wrapper
//! has no body.

use scraper::{Html, Selector};
use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{AssistantError, Result};

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AssistantError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

pub struct ConversationExtractor {
    wrapper: Selector,
    body: Selector,
}

impl ConversationExtractor {
    pub fn new(wrapper_selector: &str, body_selector: &str) -> Result<Self> {
        Ok(Self {
            wrapper: parse_selector(wrapper_selector)?,
            body: parse_selector(body_selector)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.wrapper_selector, &config.body_selector)
    }

    /// Extract the trimmed text of every message in document order.
    ///
    /// Wrappers without a body contribute an empty string. A page with no
    /// wrappers yields an empty vector.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        document
            .select(&self.wrapper)
            .map(|wrapper| {
                wrapper
                    .select(&self.body)
                    .next()
                    .map(|body| body.text().collect::<String>().trim().to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Where the conversation page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Url(String),
}

impl PageSource {
    /// `http://` and `https://` are fetched, anything else is a file path.
    pub fn parse(source: &str) -> Self {
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            PageSource::Url(source.to_string())
        } else {
            PageSource::File(PathBuf::from(source))
        }
    }
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSource::File(path) => write!(f, "{}", path.display()),
            PageSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Read the raw HTML of a page.
pub async fn load_page(source: &PageSource) -> Result<String> {
    let page_error = |message: String| AssistantError::Page {
        source_name: source.to_string(),
        message,
    };

    match source {
        PageSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| page_error(e.to_string())),
        PageSource::Url(url) => {
            let response = reqwest::get(url)
                .await
                .map_err(|e| page_error(e.to_string()))?;
            if !response.status().is_success() {
                return Err(page_error(format!("HTTP {}", response.status())));
            }
            response.text().await.map_err(|e| page_error(e.to_string()))
        }
    }
}

/// Load a page and extract its conversation in one step.
pub async fn extract_from(extractor: &ConversationExtractor, source: &PageSource) -> Result<Vec<String>> {
    let html = load_page(source).await?;
    let messages = extractor.extract(&html);
    tracing::debug!(source = %source, count = messages.len(), "conversation extracted");
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extractor() -> ConversationExtractor {
        ConversationExtractor::new(".message-wrapper", ".message-body").unwrap()
    }

    #[test]
    fn test_extract_trims_in_document_order() {
        let html = r#"
            <div class="thread">
              <div class="message-wrapper"><p class="message-body">Hello there</p></div>
              <div class="message-wrapper"><p class="message-body">  Thanks!  </p></div>
            </div>"#;
        assert_eq!(extractor().extract(html), vec!["Hello there", "Thanks!"]);
    }

    #[test]
    fn test_missing_body_keeps_position() {
        let html = r#"
            <div class="message-wrapper"><span class="message-body">one</span></div>
            <div class="message-wrapper"><span class="avatar">JD</span></div>
            <div class="message-wrapper"><span class="message-body">three</span></div>"#;
        assert_eq!(extractor().extract(html), vec!["one", "", "three"]);
    }

    #[test]
    fn test_duplicates_and_empty_bodies_retained() {
        let html = r#"
            <div class="message-wrapper"><div class="message-body">ok</div></div>
            <div class="message-wrapper"><div class="message-body">ok</div></div>
            <div class="message-wrapper"><div class="message-body">   </div></div>"#;
        assert_eq!(extractor().extract(html), vec!["ok", "ok", ""]);
    }

    #[test]
    fn test_nested_markup_collects_all_text() {
        let html = r#"<div class="message-wrapper"><div class="message-body">
            Can you <b>deliver</b> by <i>Friday</i>?</div></div>"#;
        assert_eq!(extractor().extract(html), vec!["Can you deliver by Friday?"]);
    }

    #[test]
    fn test_first_body_wins() {
        let html = r#"<div class="message-wrapper">
            <p class="message-body">first</p><p class="message-body">second</p></div>"#;
        assert_eq!(extractor().extract(html), vec!["first"]);
    }

    #[test]
    fn test_no_wrappers_is_empty() {
        assert!(extractor().extract("<html><body><p>nothing</p></body></html>").is_empty());
        assert!(extractor().extract("").is_empty());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let err = ConversationExtractor::new("div[", ".message-body").err().unwrap();
        assert!(matches!(err, AssistantError::Selector { .. }));
    }

    #[test]
    fn test_page_source_parse() {
        assert_eq!(
            PageSource::parse("https://example.com/inbox"),
            PageSource::Url("https://example.com/inbox".to_string())
        );
        assert_eq!(
            PageSource::parse("saved/inbox.html"),
            PageSource::File(PathBuf::from("saved/inbox.html"))
        );
    }

    #[tokio::test]
    async fn test_extract_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("inbox.html");
        std::fs::write(
            &file,
            r#"<div class="message-wrapper"><div class="message-body">Hi</div></div>"#,
        )
        .unwrap();

        let messages = extract_from(&extractor(), &PageSource::File(file)).await.unwrap();
        assert_eq!(messages, vec!["Hi"]);
    }

    #[tokio::test]
    async fn test_extract_from_missing_file_is_page_error() {
        let source = PageSource::File(PathBuf::from("/definitely/not/here.html"));
        let err = extract_from(&extractor(), &source).await.unwrap_err();
        assert!(matches!(err, AssistantError::Page { .. }));
    }

    #[tokio::test]
    async fn test_extract_from_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/inbox"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="message-wrapper"><div class="message-body"> Budget? </div></div>"#,
            ))
            .mount(&mock_server)
            .await;

        let source = PageSource::Url(format!("{}/inbox", mock_server.uri()));
        let messages = extract_from(&extractor(), &source).await.unwrap();
        assert_eq!(messages, vec!["Budget?"]);
    }
}
