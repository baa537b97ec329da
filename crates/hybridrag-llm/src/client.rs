use serde_json::Value;
use std::time::Duration;

use hybridrag_core::config::LlmConfig;
use hybridrag_core::error::{Error, Result};
use hybridrag_core::traits::{AnswerGenerator, FollowUpOracle};
use hybridrag_core::types::{Document, FollowUp, Turn};

use crate::prompt::{answer_messages, follow_up_messages};

pub struct ChatClient {
    http: reqwest::blocking::Client,
    url: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client: {e}")))?;
        let url = format!("{}{}", config.api_base.trim_end_matches('/'), config.path);
        let api_key = config.resolved_api_key();
        if api_key.is_none() {
            tracing::warn!("no API key configured; requests are sent unauthenticated");
        }
        Ok(Self { http, url, model: config.model.clone(), temperature: config.temperature, api_key })
    }

    /// Sends one chat completion request and returns the first choice's content.
    pub fn complete(&self, messages: &[Value]) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": messages,
        });
        let mut request = self.http.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let res = request.send().map_err(generation)?;
        let json: Value = res.error_for_status().map_err(generation)?.json().map_err(generation)?;
        parse_chat_content(&json)
    }
}

impl AnswerGenerator for ChatClient {
    fn generate(&self, question: &str, context: &[Document], history: Option<&[Turn]>) -> Result<String> {
        let answer = self.complete(&answer_messages(question, context, history))?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(Error::GenerationFailure("model returned an empty answer".to_string()));
        }
        tracing::debug!(context = context.len(), chars = answer.len(), "answer generated");
        Ok(answer.to_string())
    }
}

impl FollowUpOracle for ChatClient {
    fn decide(&self, question: &str, answer: &str) -> Result<FollowUp> {
        let reply = self.complete(&follow_up_messages(question, answer))?;
        let decision = parse_follow_up(&reply);
        tracing::debug!(?decision, "follow-up decided");
        Ok(decision)
    }
}

fn generation(e: reqwest::Error) -> Error {
    Error::GenerationFailure(e.to_string())
}

/// `choices[0].message.content` of a chat completion response.
pub fn parse_chat_content(json: &Value) -> Result<String> {
    json.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::GenerationFailure("chat response is missing message content".to_string()))
}

/// An empty reply or `NONE` (any case, quotes and punctuation ignored) ends the loop.
pub fn parse_follow_up(reply: &str) -> FollowUp {
    let reply = reply.trim();
    let bare = reply.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation());
    if bare.is_empty() || bare.eq_ignore_ascii_case("none") {
        FollowUp::Done
    } else {
        FollowUp::Ask(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_choice_content() {
        let json = serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Cats are mammals." } }
            ]
        });
        assert_eq!(parse_chat_content(&json).unwrap(), "Cats are mammals.");
    }

    #[test]
    fn missing_content_is_generation_failure() {
        for json in [
            serde_json::json!({ "choices": [] }),
            serde_json::json!({ "choices": [{ "message": { "content": null } }] }),
            serde_json::json!({ "error": { "message": "rate limited" } }),
        ] {
            assert!(matches!(parse_chat_content(&json), Err(Error::GenerationFailure(_))), "{json}");
        }
    }

    #[test]
    fn none_sentinel_variants_end_the_loop() {
        for reply in ["NONE", "none", " \"None.\" ", "", "  \n"] {
            assert_eq!(parse_follow_up(reply), FollowUp::Done, "{reply:?}");
        }
    }

    #[test]
    fn anything_else_is_a_follow_up() {
        assert_eq!(
            parse_follow_up(" What is the refund window? \n"),
            FollowUp::Ask("What is the refund window?".to_string())
        );
        assert_eq!(parse_follow_up("None of the documents mention fees?"), FollowUp::Ask("None of the documents mention fees?".to_string()));
    }
}
