//! Minimal OpenAI client for content generation.
//!
//! We only call chat.completions with `response_format = json_object` and hand the
//! raw message text to the normalizer; nothing here interprets the envelope.
//! Calls are instrumented and log model name, latency and response size.
//!
//! NOTE: We never log the API key and payload previews stay short.

use std::time::{Duration, Instant};

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Category, StudyKind};
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion returning the message text untouched.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json_text(&self, system: &str, user: &str, temperature: f32) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "studygen-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .ok_or_else(|| "OpenAI response had no message content".to_string())
  }

  /// Ask the model for a generation envelope for `kind` and return its raw text.
  #[instrument(level = "info", skip(self, prompts, categories, kind, prompt), fields(%kind, prompt_len = prompt.len()))]
  pub async fn generate_envelope(
    &self,
    prompts: &Prompts,
    categories: &[Category],
    kind: StudyKind,
    prompt: &str,
  ) -> Result<String, String> {
    let catalogue = serde_json::to_string(categories).map_err(|e| e.to_string())?;
    let system = fill_template(prompts.system_for(kind), &[("categories", &catalogue)]);
    let user = fill_template(&prompts.user_template, &[("prompt", prompt)]);

    let start = Instant::now();
    let result = self.chat_json_text(&system, &user, 0.7).await;
    let elapsed = start.elapsed();

    match &result {
      Ok(text) => info!(
        target: "generation",
        ?elapsed,
        bytes = text.len(),
        preview = %trunc_for_log(text, 80),
        "Model response received"
      ),
      Err(e) => error!(target: "generation", ?elapsed, error = %e, "Model call failed during generation"),
    }
    result
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_error_message() {
    let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn request_omits_absent_response_format() {
    let req = ChatCompletionRequest {
      model: "m".into(),
      messages: vec![],
      temperature: 0.0,
      response_format: None,
    };
    let v = serde_json::to_value(&req).expect("json");
    assert!(v.get("response_format").is_none());
  }
}
