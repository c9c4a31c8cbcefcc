//! Application state: prompts, category catalogue and the optional OpenAI client.
//!
//! Everything here is read-only after startup, so the state is shared as a
//! plain `Arc<AppState>` without locks.

use tracing::{info, instrument, warn};

use crate::config::{load_agent_config_from_env, Prompts};
use crate::domain::Category;
use crate::normalize::is_valid_category_id;
use crate::openai::OpenAI;

#[derive(Clone)]
pub struct AppState {
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub categories: Vec<Category>,
}

impl AppState {
    /// Build state from env: load config, filter the catalogue, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();

        // Build optional OpenAI client (if API key present).
        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "studygen_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "studygen_backend", "OpenAI disabled (no OPENAI_API_KEY). Generation endpoints will answer 503.");
        }

        Self::with_parts(openai, cfg.prompts, cfg.categories)
    }

    /// Assemble state from explicit parts. Catalogue entries with ids the
    /// normalizer would reject are dropped here so the model never sees them.
    pub fn with_parts(openai: Option<OpenAI>, prompts: Prompts, categories: Vec<Category>) -> Self {
        let total = categories.len();
        let categories: Vec<Category> = categories
            .into_iter()
            .filter(|c| is_valid_category_id(&c.id))
            .collect();
        if categories.len() != total {
            warn!(target: "studygen_backend", dropped = total - categories.len(), "Ignoring catalogue categories with invalid ids");
        }
        info!(target: "studygen_backend", categories = categories.len(), "Category catalogue ready");

        Self { openai, prompts, categories }
    }

    pub fn generation_enabled(&self) -> bool {
        self.openai.is_some()
    }
}
