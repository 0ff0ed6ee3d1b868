//! Practice text generation
//!
//! [`GeminiText`] asks the generative language API for a sentence about a
//! topic. [`PracticeWorker`] runs requests off the UI thread; requests are
//! fire-and-forget and the last reply to arrive wins.

use crate::config::Config;
use cryptogram_core::text_source::practice_prompt;
use cryptogram_core::{
    practice_text, CryptogramError, Result, StaticTextSource, TextSource, FALLBACK_TEXT,
};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Generative language API client
pub struct GeminiText {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl GeminiText {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CryptogramError::TextService(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        })
    }
}

impl TextSource for GeminiText {
    fn fetch(&self, topic: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(practice_prompt(topic)),
                }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .map_err(|e| CryptogramError::TextService(format!("network error: {}", e)))?;

        if !response.status().is_success() {
            return Err(CryptogramError::TextService(format!(
                "API error {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| CryptogramError::TextService(format!("parse error: {}", e)))?;

        body.text()
            .ok_or_else(|| CryptogramError::TextService("empty response".to_string()))
    }

    fn name(&self) -> &'static str {
        "Gemini"
    }
}

/// Pick the text source for the configuration. Without credentials every
/// request answers with the fallback sentence.
pub fn create_source(config: &Config) -> Arc<dyn TextSource> {
    match config.api_key.as_deref() {
        Some(key) => match GeminiText::new(config.text_url.clone(), key) {
            Ok(source) => Arc::new(source),
            Err(e) => {
                warn!(error = %e, "text service unavailable");
                Arc::new(StaticTextSource::default())
            }
        },
        None => Arc::new(StaticTextSource::default()),
    }
}

/// Sends exactly one reply from a worker thread. If the thread unwinds
/// before [`ReplyGuard::send`], the fallback is sent instead.
pub(crate) struct ReplyGuard<T: Send> {
    tx: Sender<T>,
    fallback: Option<T>,
}

impl<T: Send> ReplyGuard<T> {
    pub(crate) fn new(tx: Sender<T>, fallback: T) -> Self {
        Self {
            tx,
            fallback: Some(fallback),
        }
    }

    pub(crate) fn send(mut self, value: T) {
        self.fallback = None;
        let _ = self.tx.send(value);
    }
}

impl<T: Send> Drop for ReplyGuard<T> {
    fn drop(&mut self) {
        if let Some(fallback) = self.fallback.take() {
            warn!("worker ended without a reply");
            let _ = self.tx.send(fallback);
        }
    }
}

/// Runs practice text requests on background threads
pub struct PracticeWorker {
    source: Arc<dyn TextSource>,
    tx: Sender<String>,
    rx: Receiver<String>,
    in_flight: usize,
}

impl PracticeWorker {
    pub fn new(source: Arc<dyn TextSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Start a request. Blank topics are ignored.
    pub fn request(&mut self, topic: &str) -> bool {
        let topic = topic.trim().to_string();
        if topic.is_empty() {
            return false;
        }

        info!(source = self.source.name(), %topic, "requesting practice text");
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let reply = ReplyGuard::new(tx, FALLBACK_TEXT.to_string());
            reply.send(practice_text(source.as_ref(), &topic));
        });
        self.in_flight += 1;
        true
    }

    /// Collect finished requests; returns the latest text, if any arrived
    pub fn poll(&mut self) -> Option<String> {
        let mut latest = None;
        while let Ok(text) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            latest = Some(text);
        }
        if latest.is_some() {
            debug!(pending = self.in_flight, "practice text received");
        }
        latest
    }

    /// Whether any request is still running
    pub fn is_generating(&self) -> bool {
        self.in_flight > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct BrokenSource;

    impl TextSource for BrokenSource {
        fn fetch(&self, _topic: &str) -> Result<String> {
            panic!("source crashed")
        }

        fn name(&self) -> &'static str {
            "Broken"
        }
    }

    fn wait_for(worker: &mut PracticeWorker) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(text) = worker.poll() {
                return Some(text);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":" El gato "},{"text":"duerme."}]}}]}"#;
        let body: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.text().as_deref(), Some("El gato duerme."));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.text().is_none());
        let blocked: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(blocked.text().is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some("hola".into()),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hola");
    }

    #[test]
    fn test_worker_delivers_text() {
        let mut worker = PracticeWorker::new(Arc::new(StaticTextSource::new("La vaca come.")));
        assert!(!worker.is_generating());
        assert!(worker.request("vacas"));
        assert!(worker.is_generating());
        assert_eq!(wait_for(&mut worker).as_deref(), Some("La vaca come."));
        assert!(!worker.is_generating());
    }

    #[test]
    fn test_blank_topic_is_ignored() {
        let mut worker = PracticeWorker::new(Arc::new(StaticTextSource::default()));
        assert!(!worker.request("   "));
        assert!(!worker.is_generating());
    }

    #[test]
    fn test_unreachable_service_falls_back() {
        let source = GeminiText::new("http://127.0.0.1:9/generate", "key").unwrap();
        let mut worker = PracticeWorker::new(Arc::new(source));
        worker.request("mar");
        assert_eq!(wait_for(&mut worker).as_deref(), Some(FALLBACK_TEXT));
    }

    #[test]
    fn test_crashed_request_still_finishes() {
        let mut worker = PracticeWorker::new(Arc::new(BrokenSource));
        assert!(worker.request("mar"));
        assert_eq!(wait_for(&mut worker).as_deref(), Some(FALLBACK_TEXT));
        assert!(!worker.is_generating());
    }

    #[test]
    fn test_reply_guard_sends_once() {
        let (tx, rx) = mpsc::channel();
        ReplyGuard::new(tx.clone(), 0).send(1);
        drop(ReplyGuard::new(tx, 2));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_missing_key_uses_fallback_source() {
        let config = Config::for_dir(".", crate::config::Environment::Test);
        let source = create_source(&config);
        assert_eq!(source.name(), "Static");
        assert_eq!(practice_text(source.as_ref(), "x"), FALLBACK_TEXT);
    }
}
