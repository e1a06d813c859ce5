use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ModelConfig;
use crate::error::{Result, SousChefError};

/// Persona and response guidelines sent ahead of every assembled context.
const SYSTEM_PREAMBLE: &str = "You are an experienced food-delivery business analyst advising a \
cloud-kitchen operator. Ground every statement in the figures provided. Answer with concise \
data-driven insights, then 2-5 ranked recommendations as a numbered list (most impactful first, \
concrete action steps on the lines below each), and a short risk note if relevant.";

/// Candidate endpoint paths, tried strictly in order, once each. Covers the
/// API shapes of common local and hosted inference servers.
const CANDIDATE_PATHS: &[&str] = &[
    "/api/generate",
    "/api/chat",
    "/api/completions",
    "/v1/chat/completions",
];

/// Submits an assembled context to the first reachable inference endpoint.
/// This is the only network-dependent component: every transport failure is
/// absorbed here and either recovered (next candidate) or converted into
/// `AllEndpointsFailed`.
pub struct ModelGateway {
    client: reqwest::Client,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl ModelGateway {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SousChefError::Http)?;

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        })
    }

    /// Try each candidate endpoint in order and return the first successful
    /// textual response. No candidate is retried.
    pub async fn query(&self, context: &str, operator: &str, base_url: &str) -> Result<String> {
        let base = base_url.trim_end_matches('/');
        let user_prompt = format!("Operator: {operator}\n\n{context}");

        for path in CANDIDATE_PATHS {
            let url = format!("{base}{path}");
            let body = self.request_body(path, &user_prompt);
            tracing::debug!(%url, "Trying model endpoint");

            let response = match self.client.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(error) => {
                    tracing::warn!(%url, %error, "Model endpoint unreachable, trying next candidate");
                    continue;
                }
            };

            if !response.status().is_success() {
                tracing::warn!(
                    %url,
                    status = %response.status(),
                    "Model endpoint returned an error status, trying next candidate"
                );
                continue;
            }

            let payload: Value = match response.json().await {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(%url, %error, "Model endpoint returned unparseable JSON, trying next candidate");
                    continue;
                }
            };

            match extract_text(&payload) {
                Some(text) if !text.trim().is_empty() => {
                    tracing::debug!(%url, response_len = text.len(), "Model endpoint answered");
                    return Ok(text);
                }
                _ => {
                    tracing::warn!(%url, "No recognized text field in response, trying next candidate");
                    continue;
                }
            }
        }

        Err(SousChefError::AllEndpointsFailed {
            base_url: base_url.to_string(),
        })
    }

    fn request_body(&self, path: &str, user_prompt: &str) -> Value {
        match path {
            "/api/chat" | "/v1/chat/completions" => json!({
                "model": self.model,
                "stream": false,
                "messages": [
                    { "role": "system", "content": SYSTEM_PREAMBLE },
                    { "role": "user", "content": user_prompt },
                ],
                "temperature": self.temperature,
                "top_p": self.top_p,
                "max_tokens": self.max_tokens,
            }),
            "/api/generate" => json!({
                "model": self.model,
                "stream": false,
                "prompt": format!("{SYSTEM_PREAMBLE}\n\n{user_prompt}"),
                "temperature": self.temperature,
                "options": {
                    "temperature": self.temperature,
                    "top_p": self.top_p,
                    "num_predict": self.max_tokens,
                },
            }),
            _ => json!({
                "model": self.model,
                "stream": false,
                "prompt": format!("{SYSTEM_PREAMBLE}\n\n{user_prompt}"),
                "temperature": self.temperature,
                "top_p": self.top_p,
                "max_tokens": self.max_tokens,
            }),
        }
    }
}

#[derive(Deserialize)]
struct GenerateShape {
    response: String,
}

#[derive(Deserialize)]
struct ChatShape {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionsShape {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Deserialize)]
struct OpenAiChatShape {
    choices: Vec<OpenAiChatChoice>,
}

#[derive(Deserialize)]
struct OpenAiChatChoice {
    message: ChatMessage,
}

/// Known response shapes, decoded in a fixed order; the first structural
/// match wins.
fn extract_text(payload: &Value) -> Option<String> {
    if let Ok(shape) = serde_json::from_value::<GenerateShape>(payload.clone()) {
        return Some(shape.response);
    }
    if let Ok(shape) = serde_json::from_value::<ChatShape>(payload.clone()) {
        return Some(shape.message.content);
    }
    if let Ok(shape) = serde_json::from_value::<CompletionsShape>(payload.clone()) {
        return shape.choices.into_iter().next().map(|choice| choice.text);
    }
    if let Ok(shape) = serde_json::from_value::<OpenAiChatShape>(payload.clone()) {
        return shape
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content);
    }
    None
}
