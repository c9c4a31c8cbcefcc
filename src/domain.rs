//! Domain models: study kinds, the two item variants, categories and the
//! normalized generation result.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Which kind of study material a request is about.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StudyKind {
  Flashcards,
  FillInBlanks,
}

impl StudyKind {
  /// Plural noun used in user-facing messages.
  pub fn items_noun(self) -> &'static str {
    match self {
      StudyKind::Flashcards => "flashcards",
      StudyKind::FillInBlanks => "fill-in-the-blanks exercises",
    }
  }

  pub fn deck_noun(self) -> &'static str {
    match self {
      StudyKind::Flashcards => "flashcard deck",
      StudyKind::FillInBlanks => "fill-in-the-blanks set",
    }
  }

  pub fn item_requirement(self) -> &'static str {
    match self {
      StudyKind::Flashcards => "flashcard with term and definition",
      StudyKind::FillInBlanks => "fill-in-the-blanks exercise with prompt and at least one answer",
    }
  }
}

impl fmt::Display for StudyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StudyKind::Flashcards => f.write_str("flashcards"),
      StudyKind::FillInBlanks => f.write_str("fill_in_blanks"),
    }
  }
}

/// Category entry as offered to (and echoed back by) the generator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
  pub id: String,
  pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flashcard {
  #[serde(default)] pub id: String,
  #[serde(default)] pub term: String,
  #[serde(default)] pub definition: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FillInBlank {
  #[serde(default)] pub id: String,
  #[serde(default)] pub prompt: String,
  #[serde(default)] pub answers: Vec<String>,
  #[serde(default)] pub explanation: String,
}

/// An item type the normalizer can build from one loosely-shaped JSON element.
pub trait GeneratedItem: Sized {
  const KIND: StudyKind;

  /// Never fails: missing fields fall back to empty values.
  fn from_raw(raw: &Value) -> Self;
}

impl GeneratedItem for Flashcard {
  const KIND: StudyKind = StudyKind::Flashcards;

  fn from_raw(raw: &Value) -> Self {
    Flashcard {
      id: text_field(raw, "id").unwrap_or_else(new_item_id),
      term: text_field(raw, "term").unwrap_or_default(),
      definition: text_field(raw, "definition").unwrap_or_default(),
    }
  }
}

impl GeneratedItem for FillInBlank {
  const KIND: StudyKind = StudyKind::FillInBlanks;

  fn from_raw(raw: &Value) -> Self {
    let answers = match raw.get("answers") {
      // One entry per blank: keep length and order, blanks stay "".
      Some(Value::Array(list)) => list.iter().map(|a| as_text(a).unwrap_or_default()).collect(),
      single => vec![single
        .and_then(as_text)
        .or_else(|| text_field(raw, "answer"))
        .unwrap_or_default()],
    };

    FillInBlank {
      id: text_field(raw, "id").unwrap_or_else(new_item_id),
      prompt: text_field(raw, "prompt")
        .or_else(|| text_field(raw, "sentence"))
        .unwrap_or_default(),
      answers,
      explanation: text_field(raw, "explanation")
        .or_else(|| text_field(raw, "hint"))
        .unwrap_or_default(),
    }
  }
}

/// Normalized output of one generation request.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Generation<T> {
  pub items: Vec<T>,
  pub title: String,
  pub description: String,
  pub category_ids: Vec<String>,
  /// Surviving category names joined with ", " (display only).
  pub category_label: String,
}

pub fn new_item_id() -> String {
  Uuid::new_v4().to_string()
}

/// Present = non-empty string or a number (rendered as text).
fn as_text(v: &Value) -> Option<String> {
  match v {
    Value::String(s) if !s.is_empty() => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn text_field(raw: &Value, key: &str) -> Option<String> {
  raw.get(key).and_then(as_text)
}
