//! Normalizer for generation envelopes.
//!
//! The generator is asked for `{ result, title, description, categories }`, but in
//! practice `result` arrives in one of these shapes:
//!   - an item array (flat),
//!   - a string encoding an item array,
//!   - a string encoding a whole inner envelope whose own `result` is an array or
//!     yet another encoded string.
//!
//! Each layer is decoded into [`Layer`] and resolved explicitly; any other shape is
//! a malformed envelope. An empty item list is the generator's refusal signal.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::{Category, GeneratedItem, Generation};
use crate::error::NormalizeError;
use crate::repair::decode_with_repair;

lazy_static! {
  static ref CATEGORY_ID: Regex =
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
      .expect("category id regex");
}

/// Title, description and raw categories read from one envelope layer.
#[derive(Debug, Default, PartialEq)]
struct Meta {
  title: String,
  description: String,
  categories: Vec<Value>,
}

/// One decoded envelope layer.
#[derive(Debug, PartialEq)]
enum Layer {
  /// `result` already holds the items.
  Flat { items: Vec<Value>, meta: Meta },
  /// `result` is a string that must be decoded again.
  Encoded { payload: String, meta: Meta },
}

/// Normalize a raw envelope: either an already-decoded object or its JSON text.
pub fn normalize<T: GeneratedItem>(raw: &Value) -> Result<Generation<T>, NormalizeError> {
  let kind = T::KIND;
  let top = match raw {
    Value::Object(_) => raw.clone(),
    Value::String(text) => decode_with_repair(text)?,
    other => {
      return Err(NormalizeError::malformed(
        format!("unexpected response type: {}", type_name(other)),
        other.to_string(),
      ))
    }
  };

  let (items, meta) = resolve(top)?;
  if items.is_empty() {
    warn!(target: "generation", %kind, "Generator returned an empty result; treating as refusal");
    return Err(NormalizeError::GenerationRefused);
  }

  let categories = valid_categories(&meta.categories);
  let generation = Generation {
    items: items.iter().map(T::from_raw).collect(),
    title: meta.title,
    description: meta.description,
    category_ids: categories.iter().map(|c| c.id.clone()).collect(),
    category_label: categories
      .iter()
      .map(|c| c.name.as_str())
      .filter(|n| !n.is_empty())
      .collect::<Vec<_>>()
      .join(", "),
  };

  info!(
    target: "generation",
    %kind,
    items = generation.items.len(),
    categories = generation.category_ids.len(),
    dropped_categories = meta.categories.len() - categories.len(),
    "Envelope normalized"
  );
  Ok(generation)
}

/// Same as [`normalize`], starting from response text.
pub fn normalize_text<T: GeneratedItem>(raw: &str) -> Result<Generation<T>, NormalizeError> {
  normalize(&Value::String(raw.to_string()))
}

/// True for canonical UUID text with version nibble 1-5 and variant nibble 8/9/a/b.
pub fn is_valid_category_id(id: &str) -> bool {
  CATEGORY_ID.is_match(id)
}

/// Resolve the outer envelope down to its item list and the meta that applies to it.
fn resolve(top: Value) -> Result<(Vec<Value>, Meta), NormalizeError> {
  match decode_layer(top)? {
    Layer::Flat { items, meta } => Ok((items, meta)),
    Layer::Encoded { payload, meta: outer } => match decode_with_repair(&payload)? {
      // Encoded item array: meta stays with the outer layer.
      Value::Array(items) => Ok((items, outer)),
      inner @ Value::Object(_) => {
        debug!(target: "generation", "Found inner envelope; its meta overrides the outer layer");
        match decode_layer(inner)? {
          Layer::Flat { items, meta } => Ok((items, meta)),
          Layer::Encoded { payload, meta } => match decode_with_repair(&payload)? {
            Value::Array(items) => Ok((items, meta)),
            other => Err(NormalizeError::malformed(
              format!("inner result decoded to {}, expected an array", type_name(&other)),
              payload,
            )),
          },
        }
      }
      other => Err(NormalizeError::malformed(
        format!("result decoded to {}, expected an array or object", type_name(&other)),
        payload,
      )),
    },
  }
}

fn decode_layer(value: Value) -> Result<Layer, NormalizeError> {
  let mut map = match value {
    Value::Object(map) => map,
    other => {
      return Err(NormalizeError::malformed(
        format!("envelope is {}, expected an object", type_name(&other)),
        other.to_string(),
      ))
    }
  };

  let meta = Meta {
    title: take_string(map.get("title")),
    description: take_string(map.get("description")),
    categories: match map.remove("categories") {
      Some(Value::Array(list)) => list,
      _ => Vec::new(),
    },
  };

  match map.remove("result") {
    Some(Value::Array(items)) => Ok(Layer::Flat { items, meta }),
    Some(Value::String(payload)) => Ok(Layer::Encoded { payload, meta }),
    Some(other) => Err(NormalizeError::malformed(
      format!("result field is {}", type_name(&other)),
      other.to_string(),
    )),
    None => Err(NormalizeError::malformed("result field is missing", Value::Object(map).to_string())),
  }
}

fn valid_categories(raw: &[Value]) -> Vec<Category> {
  raw
    .iter()
    .filter_map(|v| {
      let id = v.get("id")?.as_str()?;
      if !is_valid_category_id(id) {
        debug!(target: "generation", %id, "Dropping category with invalid id");
        return None;
      }
      Some(Category {
        id: id.to_string(),
        name: v.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
      })
    })
    .collect()
}

fn take_string(v: Option<&Value>) -> String {
  v.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn type_name(v: &Value) -> &'static str {
  match v {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}
