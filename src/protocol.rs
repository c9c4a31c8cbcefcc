//! Public protocol structs for the HTTP endpoints (serde ready).
//! Generation results and deck payloads live next to their builders
//! (`domain::Generation`, `deck::*`); this module holds the remaining DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PromptIn {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthOut {
    pub ok: bool,
    pub generation: bool,
}
