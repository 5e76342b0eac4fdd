use miette::Result;
use thiserror::Error;
use tracing::{debug, warn};

pub use crate::openai::{Client as OpenAiClient, Config};

use crate::openai::CompletionRequest;

mod openai;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Upper bound for a meta description, counted in characters.
pub const META_DESCRIPTION_LIMIT: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("Missing title or description")]
    MissingInput,
}

/// Produces a meta description for a page: validates the inputs, asks the
/// model when a client is configured, and otherwise (or on any model
/// failure) falls back to truncating the description.
pub async fn generate_meta(
    title: &str,
    description: &str,
    client: Option<&OpenAiClient>,
) -> Result<String, GenerateError> {
    if title.is_empty() || description.is_empty() {
        return Err(GenerateError::MissingInput);
    }

    if let Some(client) = client {
        // Generation is best-effort: every failure routes to the fallback.
        match model_meta(client, title, description).await {
            Ok(Some(meta)) => return Ok(meta),
            Ok(None) => debug!("model returned no usable text, using fallback truncation"),
            Err(err) => warn!("meta generation failed, using fallback truncation: {}", err),
        }
    }

    Ok(truncate_description(description))
}

async fn model_meta(
    client: &OpenAiClient,
    title: &str,
    description: &str,
) -> Result<Option<String>> {
    let request = CompletionRequest::gpt_4o(&meta_prompt(title, description));
    let response = client.completion(request).await?;

    // A model answer is hard-cut at the limit, no ellipsis; an empty answer
    // counts as no answer.
    let meta = response
        .first_text()
        .map(|text| take_chars(text.trim(), META_DESCRIPTION_LIMIT))
        .filter(|meta| !meta.is_empty());

    Ok(meta)
}

fn meta_prompt(title: &str, description: &str) -> String {
    format!(
        "Generate an SEO meta description under 160 characters for a page titled \"{title}\" with this context: {description}"
    )
}

/// Deterministic fallback: descriptions within the limit pass through
/// untouched, longer ones are cut to 157 characters plus `...`.
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() <= META_DESCRIPTION_LIMIT {
        description.to_string()
    } else {
        let mut meta = take_chars(description, META_DESCRIPTION_LIMIT - 3);
        meta.push_str("...");
        meta
    }
}

fn take_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
