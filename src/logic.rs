//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Generating study content (prompt -> upstream model -> normalizer)
//!   - Normalizing an envelope the caller already holds
//!   - Building deck drafts for the deck-creation API
//!
//! Every operation is all-or-nothing: on failure nothing partial is returned.

use serde_json::Value;
use tracing::{info, instrument};

use crate::deck::{self, DeckDraftIn, FillInBlankDeckPayload, FlashcardDeckPayload};
use crate::domain::{FillInBlank, Flashcard, GeneratedItem, Generation};
use crate::error::ApiError;
use crate::normalize::{normalize, normalize_text};
use crate::state::AppState;

#[instrument(level = "info", skip(state, prompt), fields(prompt_len = prompt.len()))]
pub async fn generate<T: GeneratedItem>(state: &AppState, prompt: &str) -> Result<Generation<T>, ApiError> {
  let kind = T::KIND;
  let prompt = prompt.trim();
  if prompt.is_empty() {
    return Err(ApiError::EmptyPrompt);
  }
  let oa = state.openai.as_ref().ok_or(ApiError::Unavailable)?;

  let raw = oa
    .generate_envelope(&state.prompts, &state.categories, kind, prompt)
    .await
    .map_err(ApiError::Upstream)?;

  let generation = normalize_text::<T>(&raw).map_err(|e| ApiError::normalize(kind, e))?;
  info!(target: "generation", %kind, items = generation.items.len(), title = %generation.title, "Generation served");
  Ok(generation)
}

/// Normalize an envelope received elsewhere (object or JSON text).
pub fn normalize_envelope<T: GeneratedItem>(raw: &Value) -> Result<Generation<T>, ApiError> {
  normalize::<T>(raw).map_err(|e| ApiError::normalize(T::KIND, e))
}

pub fn flashcard_deck_draft(draft: DeckDraftIn<Flashcard>) -> Result<FlashcardDeckPayload, ApiError> {
  let payload = deck::flashcard_deck(draft)?;
  info!(target: "studygen_backend", cards = payload.flashcards.len(), "Flashcard deck draft built");
  Ok(payload)
}

pub fn fill_in_blank_deck_draft(draft: DeckDraftIn<FillInBlank>) -> Result<FillInBlankDeckPayload, ApiError> {
  let payload = deck::fill_in_blank_deck(draft)?;
  info!(target: "studygen_backend", exercises = payload.fill_in_blanks.len(), "Fill-in-the-blanks deck draft built");
  Ok(payload)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::error::NormalizeError;
  use serde_json::json;

  fn offline_state() -> AppState {
    AppState::with_parts(None, Prompts::default(), vec![])
  }

  #[tokio::test]
  async fn blank_prompt_is_rejected_before_upstream() {
    let err = generate::<Flashcard>(&offline_state(), "   ").await.unwrap_err();
    assert!(matches!(err, ApiError::EmptyPrompt));
  }

  #[tokio::test]
  async fn generation_without_client_is_unavailable() {
    let err = generate::<FillInBlank>(&offline_state(), "photosynthesis").await.unwrap_err();
    assert!(matches!(err, ApiError::Unavailable));
  }

  #[test]
  fn normalize_envelope_tags_errors_with_kind() {
    let err = normalize_envelope::<FillInBlank>(&json!({"result": []})).unwrap_err();
    match err {
      ApiError::Normalize { kind, source: NormalizeError::GenerationRefused } => {
        assert_eq!(kind, FillInBlank::KIND)
      }
      other => panic!("unexpected: {other:?}"),
    }
  }
}
