//! Loading agent configuration (prompts + category catalogue) from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Category, StudyKind};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Categories the generator may tag content with. Their ids are sent back
  /// by the model and validated before use.
  #[serde(default)]
  pub categories: Vec<Category>,
}

/// Prompts used by the OpenAI client. `{categories}` in a system prompt is
/// replaced by the catalogue as JSON; `{prompt}` in the user template by the
/// user's request.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub flashcards_system: String,
  pub fill_in_blanks_system: String,
  pub user_template: String,
}

impl Prompts {
  pub fn system_for(&self, kind: StudyKind) -> &str {
    match kind {
      StudyKind::Flashcards => &self.flashcards_system,
      StudyKind::FillInBlanks => &self.fill_in_blanks_system,
    }
  }
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      flashcards_system: r#"You create study flashcards. Respond ONLY with one raw JSON object: no markdown, no code fences, no commentary.
Object fields:
- "result": a JSON-encoded string holding an array of cards, each {"id": "flashcard-001", "term": string, "definition": string}
- "title": 2-6 words, catchy but descriptive
- "description": 1-2 sentences
- "categories": up to 3 entries {"id", "name"} picked ONLY from this list: {categories}
Terms are 1-3 words. Definitions are accurate and at most 3 sentences. One concept per card.
If the request is not about study material, or asks for violent, hateful or explicit content, respond with {"result": "[]", "title": "", "description": "", "categories": []}."#.into(),
      fill_in_blanks_system: r#"You create fill-in-the-blank exercises. Respond ONLY with one raw JSON object: no markdown, no code fences, no commentary.
Object fields:
- "result": a JSON-encoded string holding an array of exercises, each {"id": "fillblank-001", "prompt": sentence with ___ marking each blank, "answers": [one string per blank], "explanation": short reason}
- "title": 2-6 words, catchy but descriptive
- "description": 1-2 sentences
- "categories": up to 3 entries {"id", "name"} picked ONLY from this list: {categories}
If the request is not about study material, or asks for violent, hateful or explicit content, respond with {"result": "[]", "title": "", "description": "", "categories": []}."#.into(),
      user_template: "{prompt}".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "studygen_backend", %path, categories = cfg.categories.len(), "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "studygen_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "studygen_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_prompts_keep_defaults() {
    let cfg = parse_agent_config(
      r#"
[prompts]
user_template = "Topic: {prompt}"

[[categories]]
id = "3f2b8c1e-4a5d-4e6f-9a7b-1c2d3e4f5a6b"
name = "Biology"
"#,
    )
    .expect("config");
    assert_eq!(cfg.prompts.user_template, "Topic: {prompt}");
    assert_eq!(cfg.prompts.flashcards_system, Prompts::default().flashcards_system);
    assert_eq!(cfg.categories.len(), 1);
    assert_eq!(cfg.categories[0].name, "Biology");
  }

  #[test]
  fn empty_config_is_default() {
    let cfg = parse_agent_config("").expect("config");
    assert!(cfg.categories.is_empty());
    assert!(cfg.prompts.system_for(StudyKind::FillInBlanks).contains("{categories}"));
  }

  #[test]
  fn malformed_config_is_an_error() {
    assert!(parse_agent_config("[[categories]]\nid = 3").is_err());
  }
}
