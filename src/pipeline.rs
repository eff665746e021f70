use std::error::Error;
use std::fmt;
use std::future::Future;

use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Provider, DEFAULT_MODEL,
};
use crate::extractor::{self, ExtractError};
use crate::normalizer::{normalize, NormalizeContext, RecipeRecord};
use crate::prompt::{build_recipe_messages, with_repair_directive, RecipeRequest};

/// The external text-generation collaborator. The OpenRouter provider is the
/// production implementation; tests inject scripted ones.
pub trait ChatCompleter {
    fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> impl Future<Output = Result<ChatCompletionResponse, ApiConnectionError>> + Send;
}

impl ChatCompleter for Provider {
    fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> impl Future<Output = Result<ChatCompletionResponse, ApiConnectionError>> + Send {
        self.call_chat_completion(request)
    }
}

/// Generation parameters, passed explicitly rather than read from ambient
/// globals so the pipeline stays re-entrant and testable.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1600,
        }
    }
}

#[derive(Debug)]
pub enum GenerationError {
    /// The model returned no text at all (empty content, no tool call).
    EmptyResponse,
    /// No balanced, parseable JSON object in the response text.
    NoJsonFound,
    /// Extracted text failed to parse. Extraction guarantees parseability,
    /// so this guards the seam rather than an expected path.
    InvalidJson(serde_json::Error),
    /// The collaborator call itself failed (network, non-2xx, missing key).
    Transport(ApiConnectionError),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::EmptyResponse => {
                write!(f, "The model returned an empty response")
            }
            GenerationError::NoJsonFound => {
                write!(f, "No recipe data could be found in the model response")
            }
            GenerationError::InvalidJson(err) => {
                write!(f, "The model response was not valid JSON: {}", err)
            }
            GenerationError::Transport(err) => {
                write!(f, "The recipe service could not be reached: {}", err)
            }
        }
    }
}

impl Error for GenerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GenerationError::InvalidJson(err) => Some(err),
            GenerationError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiConnectionError> for GenerationError {
    fn from(err: ApiConnectionError) -> Self {
        GenerationError::Transport(err)
    }
}

impl From<ExtractError> for GenerationError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::NoJsonFound => GenerationError::NoJsonFound,
        }
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::InvalidJson(err)
    }
}

/// Runs the full generation pipeline: collaborator call, extraction, parse,
/// normalization. On any failure, issues exactly ONE repair attempt with a
/// strict re-emission directive appended to the system message, then gives
/// up. Unbounded retries against a paid, latency-sensitive service are
/// deliberately avoided.
///
/// On double failure the PRIMARY error is surfaced; it usually carries more
/// diagnostic signal than the repair attempt's.
pub async fn generate_recipe<C: ChatCompleter>(
    client: &C,
    request: &RecipeRequest,
    config: &GenerationConfig,
    diagnostics: impl Fn(String),
) -> Result<RecipeRecord, GenerationError> {
    let context = NormalizeContext {
        cuisine: request.cuisine.clone(),
    };
    let messages = build_recipe_messages(request);

    let primary_error =
        match run_attempt(client, &messages, config, &context, &diagnostics).await {
            Ok(record) => return Ok(record),
            Err(err) => err,
        };

    diagnostics(format!(
        "Primary attempt failed ({}). Requesting a strict re-emission.",
        primary_error
    ));

    let repair_messages = with_repair_directive(&messages);
    match run_attempt(client, &repair_messages, config, &context, &diagnostics).await {
        Ok(record) => Ok(record),
        Err(repair_error) => {
            diagnostics(format!("Repair attempt also failed ({}).", repair_error));
            Err(primary_error)
        }
    }
}

async fn run_attempt<C: ChatCompleter>(
    client: &C,
    messages: &[ChatMessage],
    config: &GenerationConfig,
    context: &NormalizeContext,
    diagnostics: &impl Fn(String),
) -> Result<RecipeRecord, GenerationError> {
    let chat_request = ChatCompletionRequest {
        model: config.model.clone(),
        messages: messages.to_vec(),
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
    };

    let response = client.complete(chat_request).await?;

    let raw = response.raw_model_text().unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let extracted = match extractor::extract(&raw) {
        Ok(text) => text,
        Err(err) => {
            // Keep the untouched raw text available for debugging; the
            // record itself is all-or-nothing.
            diagnostics(format!(
                "Could not locate a JSON object in the model response. Raw text:\n{}",
                raw
            ));
            return Err(err.into());
        }
    };

    let value: serde_json::Value = serde_json::from_str(&extracted)?;
    Ok(normalize(&value, context))
}
