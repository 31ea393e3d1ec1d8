//! Summarization provider abstraction and the fallback chain.
//!
//! Defines the [`SummaryProvider`] trait and concrete implementations:
//! - **[`OpenAiProvider`]** — calls the OpenAI chat completions API; reports
//!   a missing credential without attempting a request when no key was
//!   injected at startup.
//! - **[`OllamaProvider`]** — calls a local Ollama instance's `/api/chat`
//!   endpoint.
//! - **[`CustomEndpointProvider`]** — user-specified OpenAI-compatible HTTP
//!   endpoint; tolerant of several response layouts.
//! - **[`BasicExtractionProvider`]** — deterministic line selection; never
//!   fails and terminates every chain.
//!
//! # Fallback
//!
//! [`ProviderChain`] holds an explicit ordered list of providers. In auto
//! mode the order is OpenAI → Ollama → Basic; a failure from a non-final
//! provider logs a warning and advances to the next. A forced provider runs
//! alone, so its failure is fatal (unless it is Basic, which cannot fail).

use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{AggregatedContent, ProviderKind, SummaryResult};

/// Content lines at or below this length are ignored by basic extraction.
const MIN_LINE_LEN: usize = 10;
/// Bullets longer than this are truncated to 97 chars plus `...`.
const MAX_BULLET_LEN: usize = 100;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// A summarization backend. Implementations must not retry internally;
/// retries happen only as the chain's single fallback hop.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Produce up to `bullet_count` bullet lines from the aggregated content.
    async fn summarize(
        &self,
        content: &AggregatedContent,
        bullet_count: usize,
    ) -> Result<Vec<String>, ProviderError>;
}

fn build_prompt(content: &str, bullet_count: usize) -> String {
    format!(
        "Please summarize the following text content into exactly {count} bullet points.\n\
         Focus on the most important information, tasks, and key insights.\n\n\
         Content:\n{content}\n\n\
         Provide exactly {count} bullet points, formatted as:\n\
         • Point 1\n\
         • Point 2\n\
         etc.",
        count = bullet_count,
        content = content,
    )
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise summaries.";

/// Remove `<think>...</think>` blocks emitted by reasoning models.
fn strip_thinking(text: &str) -> String {
    let re = Regex::new(r"(?is)<think>.*?</think>").unwrap();
    re.replace_all(text, "").trim().to_string()
}

/// Split a model response into clean bullet lines, dropping markers.
fn parse_bullets(
    text: &str,
    bullet_count: usize,
    preserve_thinking: bool,
) -> Result<Vec<String>, ProviderError> {
    let cleaned = if preserve_thinking {
        text.trim().to_string()
    } else {
        strip_thinking(text)
    };

    let mut bullets: Vec<String> = cleaned
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(['•', '-', '*'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    if bullets.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "no bullet lines in model output".to_string(),
        ));
    }

    bullets.truncate(bullet_count);
    Ok(bullets)
}

fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::ServiceUnavailable(e.to_string()))
}

// ============ OpenAI Provider ============

pub struct OpenAiProvider {
    /// Injected at startup; `None` means the run was configured without a key.
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    preserve_thinking: bool,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.openai.api_key.clone(),
            model: config.openai.model.clone(),
            timeout_secs: config.summary.timeout_secs,
            preserve_thinking: config.summary.preserve_thinking,
        }
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn summarize(
        &self,
        content: &AggregatedContent,
        bullet_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        // Configuration detection, not an attempted request.
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderError::MissingCredential("OPENAI_API_KEY not configured".to_string())
        })?;

        let client = build_client(self.timeout_secs)?;
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(&content.combined(), bullet_count)},
            ],
            "max_tokens": 500,
            "temperature": 0.3,
        });

        let response = client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ServiceUnavailable(format!("OpenAI API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ServiceUnavailable(format!(
                "OpenAI API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let text = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing choices[0].message.content".to_string())
            })?;

        parse_bullets(text, bullet_count, self.preserve_thinking)
    }
}

// ============ Ollama Provider ============

pub struct OllamaProvider {
    url: String,
    model: String,
    timeout_secs: u64,
    preserve_thinking: bool,
}

impl OllamaProvider {
    pub fn new(config: &Config) -> Self {
        Self {
            url: config.ollama.url.clone(),
            model: config.ollama.model.clone(),
            timeout_secs: config.summary.timeout_secs,
            preserve_thinking: config.summary.preserve_thinking,
        }
    }
}

#[async_trait]
impl SummaryProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn summarize(
        &self,
        content: &AggregatedContent,
        bullet_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let client = build_client(self.timeout_secs)?;
        let body = serde_json::json!({
            "model": self.model,
            "stream": false,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(&content.combined(), bullet_count)},
            ],
        });

        let response = client
            .post(format!("{}/api/chat", self.url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ProviderError::ServiceUnavailable(format!(
                    "Ollama connection error (is Ollama running at {}?): {}",
                    self.url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ServiceUnavailable(format!(
                "Ollama API error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let text = json
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("missing message.content".to_string())
            })?;

        parse_bullets(text, bullet_count, self.preserve_thinking)
    }
}

// ============ Custom Endpoint Provider ============

pub struct CustomEndpointProvider {
    url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    preserve_thinking: bool,
}

impl CustomEndpointProvider {
    pub fn new(url: String, api_key: Option<String>, config: &Config) -> Self {
        Self {
            url,
            api_key,
            timeout_secs: config.summary.timeout_secs,
            preserve_thinking: config.summary.preserve_thinking,
        }
    }
}

#[async_trait]
impl SummaryProvider for CustomEndpointProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Custom
    }

    async fn summarize(
        &self,
        content: &AggregatedContent,
        bullet_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let client = build_client(self.timeout_secs)?;
        let body = serde_json::json!({
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(&content.combined(), bullet_count)},
            ],
            "max_tokens": 500,
            "temperature": 0.3,
        });

        let mut request = client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            ProviderError::ServiceUnavailable(format!("custom endpoint {}: {}", self.url, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ServiceUnavailable(format!(
                "custom endpoint error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        // Accept the common response layouts: OpenAI-compatible, then
        // top-level content/text fields.
        let text = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .or_else(|| json.get("content").and_then(|c| c.as_str()))
            .or_else(|| json.get("text").and_then(|c| c.as_str()))
            .ok_or_else(|| {
                ProviderError::InvalidResponse(
                    "no recognizable content field in response".to_string(),
                )
            })?;

        parse_bullets(text, bullet_count, self.preserve_thinking)
    }
}

// ============ Basic Extraction Provider ============

/// Non-AI fallback: selects content lines directly from the aggregate.
///
/// Deterministic and infallible. Lines longer than `MIN_LINE_LEN`
/// (provenance delimiters excluded) are sampled evenly across the content
/// order and truncated to `MAX_BULLET_LEN`.
pub struct BasicExtractionProvider;

impl BasicExtractionProvider {
    pub fn extract(content: &AggregatedContent, bullet_count: usize) -> Vec<String> {
        let combined = content.combined();
        let meaningful: Vec<&str> = combined
            .lines()
            .map(str::trim)
            .filter(|line| !is_delimiter(line) && line.len() > MIN_LINE_LEN)
            .collect();

        if meaningful.is_empty() {
            return vec!["No meaningful content found.".to_string()];
        }

        let selected: Vec<&str> = if meaningful.len() <= bullet_count {
            meaningful
        } else {
            let step = meaningful.len() as f64 / bullet_count as f64;
            (0..bullet_count)
                .map(|i| meaningful[(i as f64 * step) as usize])
                .collect()
        };

        selected.into_iter().map(truncate_bullet).collect()
    }
}

fn is_delimiter(line: &str) -> bool {
    line.starts_with("===") && line.ends_with("===")
}

fn truncate_bullet(line: &str) -> String {
    if line.chars().count() > MAX_BULLET_LEN {
        let head: String = line.chars().take(MAX_BULLET_LEN - 3).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

#[async_trait]
impl SummaryProvider for BasicExtractionProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Basic
    }

    async fn summarize(
        &self,
        content: &AggregatedContent,
        bullet_count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(Self::extract(content, bullet_count))
    }
}

// ============ Chain ============

/// An explicit ordered list of providers, tried front to back.
pub struct ProviderChain {
    providers: Vec<Box<dyn SummaryProvider>>,
}

impl ProviderChain {
    /// Auto mode: OpenAI → Ollama → Basic. The custom endpoint never joins
    /// the auto order; it must be forced.
    pub fn auto(config: &Config) -> Self {
        Self {
            providers: vec![
                Box::new(OpenAiProvider::new(config)),
                Box::new(OllamaProvider::new(config)),
                Box::new(BasicExtractionProvider),
            ],
        }
    }

    /// A single forced provider; no fallback.
    pub fn forced(kind: ProviderKind, config: &Config) -> anyhow::Result<Self> {
        let provider: Box<dyn SummaryProvider> = match kind {
            ProviderKind::OpenAi => Box::new(OpenAiProvider::new(config)),
            ProviderKind::Ollama => Box::new(OllamaProvider::new(config)),
            ProviderKind::Custom => {
                let custom = config.custom.as_ref().ok_or_else(|| {
                    anyhow::anyhow!("custom provider requires a [custom] section with a url")
                })?;
                Box::new(CustomEndpointProvider::new(
                    custom.url.clone(),
                    custom.api_key.clone(),
                    config,
                ))
            }
            ProviderKind::Basic => Box::new(BasicExtractionProvider),
        };
        Ok(Self {
            providers: vec![provider],
        })
    }

    /// Build a chain from an arbitrary ordered provider list.
    pub fn from_providers(providers: Vec<Box<dyn SummaryProvider>>) -> Self {
        Self { providers }
    }

    /// Walk the chain until a provider succeeds.
    ///
    /// Only a failure of the final provider is returned; with Basic as the
    /// terminal provider the chain as a whole cannot fail.
    pub async fn summarize(
        &self,
        content: &AggregatedContent,
        bullet_count: usize,
    ) -> Result<SummaryResult, ProviderError> {
        let last = self.providers.len() - 1;

        for (index, provider) in self.providers.iter().enumerate() {
            match provider.summarize(content, bullet_count).await {
                Ok(bullets) => {
                    let kind = provider.kind();
                    return Ok(SummaryResult {
                        bullets,
                        provider: kind,
                        degraded: index > 0 || kind == ProviderKind::Basic,
                    });
                }
                Err(e) if index < last => {
                    eprintln!(
                        "Warning: {} summarization failed ({}); trying {}",
                        provider.kind(),
                        e,
                        self.providers[index + 1].kind()
                    );
                }
                Err(e) => return Err(e),
            }
        }

        unreachable!("provider chain is never empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Section;
    use chrono::NaiveDate;

    fn aggregate(texts: &[&str]) -> AggregatedContent {
        AggregatedContent {
            sections: texts
                .iter()
                .enumerate()
                .map(|(i, text)| Section {
                    file_name: format!("file{}.md", i),
                    date: NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
                    text: text.to_string(),
                })
                .collect(),
            skipped: 0,
        }
    }

    struct FailingProvider {
        kind: ProviderKind,
        error: fn() -> ProviderError,
    }

    #[async_trait]
    impl SummaryProvider for FailingProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }
        async fn summarize(
            &self,
            _content: &AggregatedContent,
            _bullet_count: usize,
        ) -> Result<Vec<String>, ProviderError> {
            Err((self.error)())
        }
    }

    struct FixedProvider {
        kind: ProviderKind,
        bullets: Vec<String>,
    }

    #[async_trait]
    impl SummaryProvider for FixedProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }
        async fn summarize(
            &self,
            _content: &AggregatedContent,
            bullet_count: usize,
        ) -> Result<Vec<String>, ProviderError> {
            let mut bullets = self.bullets.clone();
            bullets.truncate(bullet_count);
            Ok(bullets)
        }
    }

    #[test]
    fn basic_takes_all_lines_when_few() {
        let agg = aggregate(&["first meaningful line\nsecond meaningful line"]);
        let bullets = BasicExtractionProvider::extract(&agg, 5);
        assert_eq!(
            bullets,
            vec!["first meaningful line", "second meaningful line"]
        );
    }

    #[test]
    fn basic_ignores_short_lines_and_delimiters() {
        let agg = aggregate(&["ok\na line long enough to keep\nno"]);
        let bullets = BasicExtractionProvider::extract(&agg, 5);
        assert_eq!(bullets, vec!["a line long enough to keep"]);
    }

    #[test]
    fn basic_distributes_evenly() {
        let lines: Vec<String> = (0..10).map(|i| format!("meaningful line number {}", i)).collect();
        let agg = aggregate(&[lines.join("\n").as_str()]);
        let bullets = BasicExtractionProvider::extract(&agg, 2);
        // 10 lines, 2 bullets: indices 0 and 5.
        assert_eq!(
            bullets,
            vec!["meaningful line number 0", "meaningful line number 5"]
        );
    }

    #[test]
    fn basic_truncates_long_lines() {
        let long = "x".repeat(150);
        let agg = aggregate(&[long.as_str()]);
        let bullets = BasicExtractionProvider::extract(&agg, 1);
        assert_eq!(bullets[0].chars().count(), 100);
        assert!(bullets[0].ends_with("..."));
    }

    #[test]
    fn basic_handles_empty_content() {
        let agg = AggregatedContent::default();
        let bullets = BasicExtractionProvider::extract(&agg, 5);
        assert_eq!(bullets, vec!["No meaningful content found."]);
    }

    #[test]
    fn basic_pulls_from_every_file_in_scenario() {
        // Two short daily logs, basic provider forced.
        let agg = AggregatedContent {
            sections: vec![
                Section {
                    file_name: "daily_log_2025-07-21.md".to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
                    text: "task A done today".to_string(),
                },
                Section {
                    file_name: "notes_21-07-2025.txt".to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 7, 21).unwrap(),
                    text: "met client about renewal".to_string(),
                },
            ],
            skipped: 0,
        };
        let bullets = BasicExtractionProvider::extract(&agg, 5);
        assert_eq!(bullets, vec!["task A done today", "met client about renewal"]);
    }

    #[test]
    fn parse_bullets_strips_markers_and_thinking() {
        let text = "<think>chain of thought here</think>\n• Point one\n- Point two\n* Point three";
        let bullets = parse_bullets(text, 5, false).unwrap();
        assert_eq!(bullets, vec!["Point one", "Point two", "Point three"]);
    }

    #[test]
    fn parse_bullets_preserves_thinking_when_asked() {
        let text = "<think>kept</think>\n• Point one";
        let bullets = parse_bullets(text, 5, true).unwrap();
        assert!(bullets.iter().any(|b| b.contains("kept")));
    }

    #[test]
    fn parse_bullets_rejects_empty_output() {
        let err = parse_bullets("<think>only thinking</think>", 5, false).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn parse_bullets_caps_at_requested_count() {
        let text = "• a1\n• a2\n• a3\n• a4";
        let bullets = parse_bullets(text, 2, false).unwrap();
        assert_eq!(bullets.len(), 2);
    }

    #[tokio::test]
    async fn chain_falls_through_to_basic() {
        let chain = ProviderChain::from_providers(vec![
            Box::new(FailingProvider {
                kind: ProviderKind::OpenAi,
                error: || ProviderError::MissingCredential("no key".to_string()),
            }),
            Box::new(FailingProvider {
                kind: ProviderKind::Ollama,
                error: || ProviderError::ServiceUnavailable("refused".to_string()),
            }),
            Box::new(BasicExtractionProvider),
        ]);

        let agg = aggregate(&["a perfectly meaningful line"]);
        let result = chain.summarize(&agg, 3).await.unwrap();
        assert_eq!(result.provider, ProviderKind::Basic);
        assert!(result.degraded);
        assert_eq!(result.bullets, vec!["a perfectly meaningful line"]);
    }

    #[tokio::test]
    async fn first_provider_success_is_not_degraded() {
        let chain = ProviderChain::from_providers(vec![
            Box::new(FixedProvider {
                kind: ProviderKind::OpenAi,
                bullets: vec!["model bullet".to_string()],
            }),
            Box::new(BasicExtractionProvider),
        ]);

        let result = chain.summarize(&aggregate(&["irrelevant"]), 3).await.unwrap();
        assert_eq!(result.provider, ProviderKind::OpenAi);
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn second_provider_success_is_degraded() {
        let chain = ProviderChain::from_providers(vec![
            Box::new(FailingProvider {
                kind: ProviderKind::OpenAi,
                error: || ProviderError::MissingCredential("no key".to_string()),
            }),
            Box::new(FixedProvider {
                kind: ProviderKind::Ollama,
                bullets: vec!["local bullet".to_string()],
            }),
        ]);

        let result = chain.summarize(&aggregate(&["irrelevant"]), 3).await.unwrap();
        assert_eq!(result.provider, ProviderKind::Ollama);
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn forced_provider_failure_propagates() {
        let chain = ProviderChain::from_providers(vec![Box::new(FailingProvider {
            kind: ProviderKind::Ollama,
            error: || ProviderError::ServiceUnavailable("refused".to_string()),
        })]);

        let err = chain
            .summarize(&aggregate(&["irrelevant"]), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn forced_basic_is_degraded_and_never_fails() {
        let chain = ProviderChain::from_providers(vec![Box::new(BasicExtractionProvider)]);
        let result = chain
            .summarize(&aggregate(&["a perfectly meaningful line"]), 3)
            .await
            .unwrap();
        assert_eq!(result.provider, ProviderKind::Basic);
        assert!(result.degraded);
    }
}
