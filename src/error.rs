//! Error types for decoding, normalization, deck drafts and the HTTP surface.

use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::domain::StudyKind;
use crate::protocol::ErrorOut;
use crate::util::trunc_for_log;

/// JSON text that stayed undecodable after the repair pass.
#[derive(Debug, Error)]
#[error("JSON decode failed after repair: {source}")]
pub struct DecodeError {
  pub raw: String,
  #[source]
  pub source: serde_json::Error,
}

/// Failures of the generation normalizer.
#[derive(Debug, Error)]
pub enum NormalizeError {
  /// A decode step failed, or a field had an unexpected type.
  #[error("Malformed generation envelope: {reason}")]
  MalformedEnvelope { reason: String, raw: String },

  /// Everything decoded, but the generator produced zero items.
  #[error("Generator returned no items")]
  GenerationRefused,
}

impl NormalizeError {
  pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
    NormalizeError::MalformedEnvelope { reason: reason.into(), raw: raw.into() }
  }
}

impl From<DecodeError> for NormalizeError {
  fn from(e: DecodeError) -> Self {
    NormalizeError::MalformedEnvelope { reason: e.source.to_string(), raw: e.raw }
  }
}

/// Deck draft validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
  #[error("Please enter a title for the {}", .0.deck_noun())]
  MissingTitle(StudyKind),

  #[error("Please add at least one {}", .0.item_requirement())]
  NoValidItems(StudyKind),
}

/// Everything an HTTP handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Prompt must not be empty")]
  EmptyPrompt,

  #[error("AI generation is not configured on this server")]
  Unavailable,

  #[error("Upstream generation failed: {0}")]
  Upstream(String),

  #[error("{source}")]
  Normalize {
    kind: StudyKind,
    #[source]
    source: NormalizeError,
  },

  #[error(transparent)]
  Deck(#[from] DeckError),
}

impl ApiError {
  pub fn normalize(kind: StudyKind, source: NormalizeError) -> Self {
    ApiError::Normalize { kind, source }
  }

  fn status(&self) -> StatusCode {
    match self {
      ApiError::EmptyPrompt | ApiError::Deck(_) => StatusCode::BAD_REQUEST,
      ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
      ApiError::Normalize { source: NormalizeError::GenerationRefused, .. } => StatusCode::UNPROCESSABLE_ENTITY,
      ApiError::Normalize { .. } => StatusCode::BAD_GATEWAY,
    }
  }

  fn code(&self) -> &'static str {
    match self {
      ApiError::EmptyPrompt => "empty_prompt",
      ApiError::Unavailable => "generation_unavailable",
      ApiError::Upstream(_) => "upstream_failed",
      ApiError::Normalize { source: NormalizeError::GenerationRefused, .. } => "generation_refused",
      ApiError::Normalize { .. } => "malformed_envelope",
      ApiError::Deck(_) => "invalid_deck",
    }
  }

  /// Text shown to the end user.
  pub fn user_message(&self) -> String {
    match self {
      ApiError::Normalize { kind, source: NormalizeError::GenerationRefused } => format!(
        "Unable to generate {} for this request. Please try a different topic.",
        kind.items_noun()
      ),
      ApiError::Normalize { .. } => "Invalid response format from AI".to_string(),
      other => other.to_string(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> axum::response::Response {
    let status = self.status();
    match &self {
      ApiError::Normalize { source: NormalizeError::MalformedEnvelope { reason, raw }, kind } => {
        tracing::error!(target: "generation", %kind, %reason, raw = %trunc_for_log(raw, 200), "Rejecting malformed envelope");
      }
      ApiError::Upstream(e) => tracing::error!(target: "generation", error = %e, "Upstream failure"),
      other => tracing::warn!(target: "studygen_backend", error = %other, status = %status, "Request failed"),
    }
    let body = ErrorOut { error: self.code().to_string(), message: self.user_message() };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn refusal_and_malformed_are_distinct_statuses() {
    let refused = ApiError::normalize(StudyKind::Flashcards, NormalizeError::GenerationRefused);
    let malformed = ApiError::normalize(StudyKind::Flashcards, NormalizeError::malformed("bad", "x"));
    assert_eq!(refused.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(malformed.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(refused.code(), "generation_refused");
    assert_eq!(malformed.code(), "malformed_envelope");
  }

  #[test]
  fn refusal_message_names_the_kind() {
    let e = ApiError::normalize(StudyKind::FillInBlanks, NormalizeError::GenerationRefused);
    assert_eq!(
      e.user_message(),
      "Unable to generate fill-in-the-blanks exercises for this request. Please try a different topic."
    );
  }

  #[test]
  fn deck_errors_read_like_form_validation() {
    assert_eq!(
      DeckError::MissingTitle(StudyKind::Flashcards).to_string(),
      "Please enter a title for the flashcard deck"
    );
    assert_eq!(
      DeckError::NoValidItems(StudyKind::FillInBlanks).to_string(),
      "Please add at least one fill-in-the-blanks exercise with prompt and at least one answer"
    );
  }
}
