//! Deck drafts: the payloads the deck-creation API expects, built from
//! (possibly user-edited) generation output.
//!
//! Incomplete items are dropped rather than rejected; the draft only fails when
//! the title is blank or nothing usable remains.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{FillInBlank, Flashcard, StudyKind};
use crate::error::DeckError;
use crate::normalize::is_valid_category_id;

/// Draft submitted by the editor form.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckDraftIn<T> {
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub category_ids: Vec<String>,
  pub items: Vec<T>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FlashcardOut {
  pub term: String,
  pub definition: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardDeckPayload {
  pub title: String,
  pub description: String,
  pub category_ids: Vec<String>,
  pub flashcards: Vec<FlashcardOut>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FillInBlankDeckPayload {
  pub title: String,
  pub description: String,
  pub publish_status: String,
  pub fill_in_blanks: Vec<FillInBlank>,
  pub category_ids: Vec<String>,
}

pub fn flashcard_deck(draft: DeckDraftIn<Flashcard>) -> Result<FlashcardDeckPayload, DeckError> {
  let title = required_title(&draft.title, StudyKind::Flashcards)?;
  let flashcards: Vec<FlashcardOut> = draft
    .items
    .into_iter()
    .filter(|c| !c.term.trim().is_empty() && !c.definition.trim().is_empty())
    .map(|c| FlashcardOut { term: c.term, definition: c.definition })
    .collect();
  if flashcards.is_empty() {
    return Err(DeckError::NoValidItems(StudyKind::Flashcards));
  }

  Ok(FlashcardDeckPayload {
    title,
    description: draft.description.trim().to_string(),
    category_ids: trusted_category_ids(draft.category_ids),
    flashcards,
  })
}

pub fn fill_in_blank_deck(draft: DeckDraftIn<FillInBlank>) -> Result<FillInBlankDeckPayload, DeckError> {
  let title = required_title(&draft.title, StudyKind::FillInBlanks)?;
  let fill_in_blanks: Vec<FillInBlank> = draft
    .items
    .into_iter()
    .filter(|e| !e.prompt.trim().is_empty() && e.answers.iter().any(|a| !a.trim().is_empty()))
    .enumerate()
    .map(|(i, e)| FillInBlank {
      id: format!("fillblank-{:03}", i + 1),
      prompt: e.prompt,
      answers: e.answers.into_iter().filter(|a| !a.trim().is_empty()).collect(),
      explanation: e.explanation,
    })
    .collect();
  if fill_in_blanks.is_empty() {
    return Err(DeckError::NoValidItems(StudyKind::FillInBlanks));
  }

  Ok(FillInBlankDeckPayload {
    title,
    description: draft.description.trim().to_string(),
    publish_status: "draft".to_string(),
    fill_in_blanks,
    category_ids: trusted_category_ids(draft.category_ids),
  })
}

fn required_title(title: &str, kind: StudyKind) -> Result<String, DeckError> {
  let t = title.trim();
  if t.is_empty() {
    return Err(DeckError::MissingTitle(kind));
  }
  Ok(t.to_string())
}

fn trusted_category_ids(ids: Vec<String>) -> Vec<String> {
  ids
    .into_iter()
    .filter(|id| {
      let ok = is_valid_category_id(id);
      if !ok {
        debug!(target: "studygen_backend", %id, "Dropping invalid category id from deck draft");
      }
      ok
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn card(term: &str, definition: &str) -> Flashcard {
    Flashcard { id: "tmp".into(), term: term.into(), definition: definition.into() }
  }

  fn blank(prompt: &str, answers: &[&str]) -> FillInBlank {
    FillInBlank {
      id: "tmp".into(),
      prompt: prompt.into(),
      answers: answers.iter().map(|a| a.to_string()).collect(),
      explanation: String::new(),
    }
  }

  #[test]
  fn flashcard_deck_drops_incomplete_cards() {
    let draft = DeckDraftIn {
      title: "  Biology ".into(),
      description: " Cells ".into(),
      category_ids: vec!["3f2b8c1e-4a5d-4e6f-9a7b-1c2d3e4f5a6b".into(), "nope".into()],
      items: vec![card("Mitosis", "Cell division."), card("  ", "orphan"), card("Term", "")],
    };
    let deck = flashcard_deck(draft).expect("deck");
    assert_eq!(deck.title, "Biology");
    assert_eq!(deck.description, "Cells");
    assert_eq!(deck.category_ids.len(), 1);
    assert_eq!(deck.flashcards, vec![FlashcardOut { term: "Mitosis".into(), definition: "Cell division.".into() }]);
  }

  #[test]
  fn flashcard_deck_requires_title_and_cards() {
    let no_title = DeckDraftIn { title: "   ".into(), description: String::new(), category_ids: vec![], items: vec![card("a", "b")] };
    assert_eq!(flashcard_deck(no_title).unwrap_err(), DeckError::MissingTitle(StudyKind::Flashcards));

    let no_cards = DeckDraftIn { title: "T".into(), description: String::new(), category_ids: vec![], items: vec![card("", "")] };
    assert_eq!(flashcard_deck(no_cards).unwrap_err(), DeckError::NoValidItems(StudyKind::Flashcards));
  }

  #[test]
  fn fill_in_blank_deck_renumbers_and_strips_blank_answers() {
    let draft = DeckDraftIn {
      title: "Geo".into(),
      description: String::new(),
      category_ids: vec![],
      items: vec![
        blank("Capital of France is ___", &["Paris", " "]),
        blank("No answers ___", &["", "  "]),
        blank("Capital of Spain is ___", &["Madrid"]),
      ],
    };
    let deck = fill_in_blank_deck(draft).expect("deck");
    assert_eq!(deck.publish_status, "draft");
    let ids: Vec<_> = deck.fill_in_blanks.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["fillblank-001", "fillblank-002"]);
    assert_eq!(deck.fill_in_blanks[0].answers, vec!["Paris".to_string()]);
  }

  #[test]
  fn fill_in_blank_payload_uses_snake_case_keys() {
    let draft = DeckDraftIn { title: "T".into(), description: String::new(), category_ids: vec![], items: vec![blank("p ___", &["a"])] };
    let v = serde_json::to_value(fill_in_blank_deck(draft).expect("deck")).expect("json");
    assert!(v.get("fill_in_blanks").is_some());
    assert!(v.get("category_ids").is_some());
  }
}
