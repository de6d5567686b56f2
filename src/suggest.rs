//! AI-assisted task suggestions with a deterministic fallback.
//!
//! Advisory feature — it never fails outward. Without a provider key the
//! engine answers locally with no network dependency; with one it makes a
//! single bounded Gemini call and degrades to a fallback on any error.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde_json::{Value, json};

/// Prompt-size caps, applied after trimming.
const MAX_TITLE_CHARS: usize = 300;
const MAX_DESC_CHARS: usize = 1200;
/// At most this many suggestions survive parsing.
const MAX_SUGGESTIONS: usize = 5;

const GEMINI_MODEL: &str = "gemini-2.5-flash";
const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const PROVIDER_TIMEOUT_SECS: u64 = 15;

const SYSTEM_INSTRUCTION: &str = "You are a helpful task assistant. Given a task title and \
     description, return 3 concise, actionable suggestions (one per line) to improve, clarify, \
     or expand the task. Keep each suggestion short (max 100 characters). Return ONLY the \
     bulleted suggestions, nothing else.";

/// Leading bullet or numbering markup: `-`, `*`, digits, `.`, `)`, spaces.
static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*\d.)\s]+").expect("bullet prefix regex"));

#[derive(Clone)]
pub struct SuggestionEngine {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl SuggestionEngine {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    pub fn provider_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Produce 1–5 short advisory strings for a task. All failure modes
    /// degrade to a fallback sequence; nothing propagates to the caller.
    pub async fn suggest(&self, title: &str, description: &str) -> Vec<String> {
        let title = truncate_chars(title.trim(), MAX_TITLE_CHARS);
        let description = truncate_chars(description.trim(), MAX_DESC_CHARS);

        let Some(key) = self.api_key.as_deref() else {
            return offline_fallback(&title);
        };

        match self.generate(key, &title, &description).await {
            Ok(lines) if !lines.is_empty() => lines,
            Ok(_) => {
                tracing::warn!("suggestion provider returned no usable lines — using fallback");
                degraded_fallback(&title)
            }
            Err(err) => {
                tracing::warn!("suggestion provider call failed: {err:#} — using fallback");
                degraded_fallback(&title)
            }
        }
    }

    /// One request, no retry. Latency is bounded by the request timeout.
    async fn generate(&self, key: &str, title: &str, description: &str) -> anyhow::Result<Vec<String>> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": format!("Title: {title}\nDescription: {description}") }]
            }],
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "generationConfig": { "temperature": 0.6, "maxOutputTokens": 200 }
        });

        let resp = self
            .http
            .post(GEMINI_URL)
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            anyhow::bail!("{GEMINI_MODEL} returned {}", resp.status());
        }

        let payload: Value = resp.json().await?;
        let raw = payload
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c0| c0.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p0| p0.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or("");

        Ok(parse_suggestions(raw))
    }
}

/// Normalize raw provider output into a bounded list: split on line breaks,
/// strip leading bullet/number markup, drop empties, keep at most 5.
pub(crate) fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| BULLET_PREFIX.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// UTF-8 safe truncation by character count.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Used when no provider credential is configured. Deterministic, derived
/// from the (possibly truncated) title, never touches the network.
fn offline_fallback(title: &str) -> Vec<String> {
    vec![
        format!("Consider breaking \"{title}\" into smaller subtasks."),
        format!("Add a deadline for \"{title}\" to improve tracking."),
        format!("Clarify prerequisites or dependencies for \"{title}\"."),
        "Set GEMINI_API_KEY to enable live AI suggestions.".to_string(),
    ]
}

/// Used when the provider call fails or yields nothing usable. Worded
/// differently from the offline fallback so the two paths are
/// distinguishable.
fn degraded_fallback(title: &str) -> Vec<String> {
    vec![
        "Live suggestions are temporarily unavailable.".to_string(),
        format!("Review the scope and dependencies of \"{title}\"."),
        "Specify acceptance criteria so the task has a clear finish line.".to_string(),
    ]
}
