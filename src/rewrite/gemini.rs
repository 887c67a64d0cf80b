use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{RewriteMode, RewriteRequest, ScriptRewriter};
use crate::config::RewriteConfig;
use crate::error::{DubError, Result};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Script rewriter backed by the Gemini generateContent API
pub struct GeminiRewriter {
    client: Client,
    config: RewriteConfig,
}

impl GeminiRewriter {
    pub fn new(config: RewriteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ScriptRewriter for GeminiRewriter {
    async fn rewrite(&self, request: &RewriteRequest) -> Result<String> {
        let api_key = self.config.resolve_api_key().ok_or_else(|| {
            DubError::Rewrite(format!(
                "No API key configured (set rewrite.api_key or ${})",
                self.config.api_key_env
            ))
        })?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(build_rewrite_prompt(request)),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        };

        let url = self.endpoint_url();
        info!(
            "Requesting {} rewrite from {} ({:.0}s -> {:.0}s)",
            request.mode, self.config.model, request.current_seconds, request.target_seconds
        );
        debug!("Sending rewrite request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DubError::Rewrite(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Rewrite service returned {}", status);
            return Err(DubError::Rewrite(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| DubError::Rewrite(format!("Failed to read response: {}", e)))?;

        debug!("Raw rewrite response: {}", response_text);
        extract_text(&response_text)
    }
}

/// Build the editing prompt for a rewrite request
pub fn build_rewrite_prompt(request: &RewriteRequest) -> String {
    let target = request.target_seconds.round();
    let current = request.current_seconds.round();
    let task = match request.mode {
        RewriteMode::Shorten => "shorten",
        RewriteMode::Extend => "expand",
    };

    format!(
        "You are a professional video script editor.\n\
         \n\
         The user has a video of {target} seconds.\n\
         The current script takes about {current} seconds to read aloud.\n\
         \n\
         Your task is to {task} the script so that it fits the video.\n\
         Target duration: about {target} seconds.\n\
         \n\
         Rules:\n\
         1. Keep the original tone and key information.\n\
         2. Output only the rewritten script, without any explanation.\n\
         3. Write in the same language as the original script.\n\
         \n\
         Original script:\n\
         \"\"\"\n\
         {script}\n\
         \"\"\"\n",
        target = target,
        current = current,
        task = task,
        script = request.script,
    )
}

/// Pull the generated text out of a generateContent response body
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| DubError::Rewrite(format!("Failed to parse response: {}", e)))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(DubError::Rewrite(
            "No text returned; the response was empty or blocked".to_string(),
        ));
    }

    Ok(text.to_string())
}
