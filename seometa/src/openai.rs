use std::time::Duration;

use miette::{Context, IntoDiagnostic, Result};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::APP_USER_AGENT;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const COMPLETION_MODEL: &str = "gpt-4o";
const COMPLETION_MAX_TOKENS: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Config {
    api_key: String,
    base_url: String,
}

impl Config {
    /// Returns `None` when `OPENAI_API_KEY` is unset or empty; callers then
    /// run in fallback-only mode.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())?;
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Some(Self { api_key, base_url })
    }

    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    pub fn client(&self) -> Result<Client> {
        let mut headers = reqwest::header::HeaderMap::new();

        let value = format!("Bearer {}", self.api_key);
        let mut value = HeaderValue::from_str(&value)
            .into_diagnostic()
            .wrap_err("Could not create authorization header")?;
        value.set_sensitive(true);

        headers.insert(AUTHORIZATION, value);

        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .into_diagnostic()
            .wrap_err("Could not build reqwest client")?;

        Ok(Client {
            http,
            base_url: self.base_url.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Message {
    pub content: String,
    role: String,
}

#[derive(Serialize, Debug, Clone)]
pub(crate) struct CompletionRequest {
    messages: Vec<Message>,
    model: String,
    max_tokens: u32,
}

impl CompletionRequest {
    pub(crate) fn gpt_4o(prompt: &str) -> Self {
        Self {
            model: COMPLETION_MODEL.to_string(),
            messages: vec![Message {
                content: prompt.to_string(),
                role: "user".to_string(),
            }],
            max_tokens: COMPLETION_MAX_TOKENS,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct CompletionChoice {
    pub message: Message,
}

// Only the fields the pipeline reads; providers send plenty more and all of
// it is ignored.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

impl CompletionResponse {
    pub(crate) fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}

impl Client {
    pub(crate) async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .into_diagnostic()?
            .error_for_status()
            .into_diagnostic()?;

        let response_body = response.json().await.into_diagnostic()?;

        Ok(response_body)
    }
}
