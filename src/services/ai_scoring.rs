use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::config::Settings;

const SCORING_SYSTEM_PROMPT: &str = r#"You are an exam grader. Compare the student's answer against the reference answer and award a score from 0 to 100, where 100 means the answer fully covers the reference and 0 means it is entirely wrong or empty. Point out concrete gaps against the reference in your comment.

Respond with strict JSON only:
{
  "score": <integer 0-100>,
  "comment": "<short feedback for the student>"
}
"#;

/// Delegate verdict for one open-ended answer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredAnswer {
    pub(crate) score: f64,
    pub(crate) feedback: String,
}

/// Boundary to the external scoring collaborator. The grading pipeline only
/// sees this trait, so failures and timeouts stay testable offline.
#[async_trait]
pub(crate) trait AnswerScorer: Send + Sync {
    async fn score(&self, reference: &str, candidate: &str) -> Result<ScoredAnswer>;
}

/// OpenAI-compatible chat-completions scorer.
#[derive(Debug, Clone)]
pub(crate) struct LlmScorer {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl LlmScorer {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.scoring().request_timeout_seconds);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.scoring().api_key.clone(),
            base_url: settings.scoring().base_url.trim_end_matches('/').to_string(),
            model: settings.scoring().model.clone(),
            max_tokens: settings.scoring().max_tokens,
            temperature: settings.scoring().temperature,
        })
    }

    fn parse_verdict(content: &str) -> Result<ScoredAnswer> {
        // Some backends wrap the JSON in a markdown fence despite the
        // response_format hint.
        let stripped = content.replace("```json", "").replace("```", "");
        let parsed: Value =
            serde_json::from_str(stripped.trim()).context("Failed to parse scorer JSON")?;

        let score = parsed
            .get("score")
            .and_then(Value::as_f64)
            .context("Scorer response missing numeric score")?;
        let feedback = parsed
            .get("comment")
            .and_then(Value::as_str)
            .unwrap_or("no comment provided")
            .to_string();

        Ok(ScoredAnswer { score, feedback })
    }
}

#[async_trait]
impl AnswerScorer for LlmScorer {
    async fn score(&self, reference: &str, candidate: &str) -> Result<ScoredAnswer> {
        let user_prompt = format!(
            "Reference answer:\n{reference}\n\nStudent answer:\n{candidate}\n\nGrade the student answer against the reference. Respond with the JSON format given in the system prompt."
        );

        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SCORING_SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt}
            ],
            "max_completion_tokens": self.max_tokens,
            "temperature": self.temperature,
            "response_format": {"type": "json_object"}
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call scoring API")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            anyhow::bail!("scoring API error ({status}): {body}");
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .context("Missing scoring response content")?;

        Self::parse_verdict(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_verdict_plain_json() {
        let verdict =
            LlmScorer::parse_verdict(r#"{"score": 80, "comment": "missing edge case"}"#).unwrap();
        assert_eq!(verdict.score, 80.0);
        assert_eq!(verdict.feedback, "missing edge case");
    }

    #[test]
    fn parse_verdict_strips_markdown_fence() {
        let raw = "```json\n{\"score\": 55, \"comment\": \"partial\"}\n```";
        let verdict = LlmScorer::parse_verdict(raw).unwrap();
        assert_eq!(verdict.score, 55.0);
        assert_eq!(verdict.feedback, "partial");
    }

    #[test]
    fn parse_verdict_defaults_missing_comment() {
        let verdict = LlmScorer::parse_verdict(r#"{"score": 100}"#).unwrap();
        assert_eq!(verdict.feedback, "no comment provided");
    }

    #[test]
    fn parse_verdict_rejects_non_numeric_score() {
        assert!(LlmScorer::parse_verdict(r#"{"score": "high"}"#).is_err());
        assert!(LlmScorer::parse_verdict("not json at all").is_err());
    }
}
