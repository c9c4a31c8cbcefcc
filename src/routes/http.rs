//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; failures are rendered by `ApiError`.

use std::sync::Arc;
use axum::{extract::State, Json, response::IntoResponse};
use serde_json::Value;
use tracing::{info, instrument};

use crate::deck::{DeckDraftIn, FillInBlankDeckPayload, FlashcardDeckPayload};
use crate::domain::{FillInBlank, Flashcard, Generation};
use crate::error::ApiError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, generation: state.generation_enabled() })
}

#[instrument(level = "info", skip(state, body), fields(prompt_len = body.prompt.len()))]
pub async fn http_generate_flashcards(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PromptIn>,
) -> Result<Json<Generation<Flashcard>>, ApiError> {
  let g = generate::<Flashcard>(&state, &body.prompt).await?;
  info!(target: "generation", items = g.items.len(), "HTTP flashcards generated");
  Ok(Json(g))
}

#[instrument(level = "info", skip(state, body), fields(prompt_len = body.prompt.len()))]
pub async fn http_generate_fill_in_blanks(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PromptIn>,
) -> Result<Json<Generation<FillInBlank>>, ApiError> {
  let g = generate::<FillInBlank>(&state, &body.prompt).await?;
  info!(target: "generation", items = g.items.len(), "HTTP fill-in-the-blanks generated");
  Ok(Json(g))
}

#[instrument(level = "info", skip(body))]
pub async fn http_normalize_flashcards(Json(body): Json<Value>) -> Result<Json<Generation<Flashcard>>, ApiError> {
  normalize_envelope::<Flashcard>(&body).map(Json)
}

#[instrument(level = "info", skip(body))]
pub async fn http_normalize_fill_in_blanks(Json(body): Json<Value>) -> Result<Json<Generation<FillInBlank>>, ApiError> {
  normalize_envelope::<FillInBlank>(&body).map(Json)
}

#[instrument(level = "info", skip(body), fields(items = body.items.len()))]
pub async fn http_draft_flashcard_deck(
  Json(body): Json<DeckDraftIn<Flashcard>>,
) -> Result<Json<FlashcardDeckPayload>, ApiError> {
  flashcard_deck_draft(body).map(Json)
}

#[instrument(level = "info", skip(body), fields(items = body.items.len()))]
pub async fn http_draft_fill_in_blank_deck(
  Json(body): Json<DeckDraftIn<FillInBlank>>,
) -> Result<Json<FillInBlankDeckPayload>, ApiError> {
  fill_in_blank_deck_draft(body).map(Json)
}
