use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::formats::{EmailBrief, EmailSection, GenerationResponse};
use crate::i18n::Language;
use crate::prompts;
use crate::session::EmailModel;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub fn generate_content_endpoint(base_url: &str, model: &str) -> anyhow::Result<url::Url> {
    let base_url = base_url.trim_end_matches('/');
    let endpoint = format!("{base_url}/models/{model}:generateContent");
    url::Url::parse(&endpoint).with_context(|| format!("parse Gemini endpoint: {endpoint}"))
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

/// `EmailModel` backed by the Gemini `generateContent` REST API.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: reqwest::Client,
    endpoint: url::Url,
    api_key: String,
    model: String,
}

impl GeminiModel {
    pub fn new(config: GeminiConfig) -> anyhow::Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key is empty");
        }
        let endpoint = generate_content_endpoint(&config.base_url, &config.model)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key,
            model: config.model,
        })
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: serde_json::Value,
        temperature: f32,
    ) -> anyhow::Result<T> {
        let text = generate_content_text(
            &self.client,
            &self.endpoint,
            &self.api_key,
            prompt,
            schema,
            temperature,
        )
        .await?;
        serde_json::from_str(text.trim()).context("parse Gemini JSON output")
    }
}

#[async_trait]
impl EmailModel for GeminiModel {
    async fn generate(
        &self,
        brief: &EmailBrief,
        lang: Language,
    ) -> anyhow::Result<GenerationResponse> {
        tracing::info!(model = %self.model, lang = lang.code(), "gemini generate email");
        let prompt = prompts::generation_prompt(brief, lang);
        self.generate_json(
            &prompt,
            prompts::generation_schema(),
            prompts::GENERATION_TEMPERATURE,
        )
        .await
    }

    async fn improve(
        &self,
        section: &EmailSection,
        notes: &str,
        lang: Language,
    ) -> anyhow::Result<EmailSection> {
        tracing::info!(
            model = %self.model,
            lang = lang.code(),
            section = %section.name,
            "gemini improve section"
        );
        let prompt = prompts::improvement_prompt(section, notes, lang);
        self.generate_json(
            &prompt,
            prompts::section_schema(),
            prompts::IMPROVEMENT_TEMPERATURE,
        )
        .await
    }
}

pub async fn generate_content_text(
    client: &reqwest::Client,
    endpoint: &url::Url,
    api_key: &str,
    prompt: &str,
    schema: serde_json::Value,
    temperature: f32,
) -> anyhow::Result<String> {
    let body = serde_json::json!({
        "contents": [
            { "role": "user", "parts": [ { "text": prompt } ] }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
            "temperature": temperature,
        },
    });

    let response = client
        .post(endpoint.clone())
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await
        .with_context(|| format!("POST {endpoint}"))?;

    let status = response.status();
    let raw = response.text().await.context("read Gemini response body")?;
    if !status.is_success() {
        let message = parse_error_message(&raw).unwrap_or_else(|| raw.clone());
        anyhow::bail!("Gemini API error ({status}): {message}");
    }

    let value: serde_json::Value = serde_json::from_str(&raw).context("parse Gemini response")?;
    extract_candidate_text(&value).context("extract candidate text")
}

fn parse_error_message(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let message = value.get("error")?.get("message")?.as_str()?.to_owned();
    Some(message)
}

fn extract_candidate_text(value: &serde_json::Value) -> anyhow::Result<String> {
    let candidate = value
        .get("candidates")
        .and_then(|v| v.as_array())
        .and_then(|candidates| candidates.first())
        .ok_or_else(|| {
            let reason = value
                .pointer("/promptFeedback/blockReason")
                .and_then(|v| v.as_str())
                .unwrap_or("none");
            anyhow::anyhow!("missing `candidates` in response (block reason: {reason})")
        })?;

    let parts = candidate
        .pointer("/content/parts")
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow::anyhow!("missing `content.parts` in first candidate"))?;

    let mut text = String::new();
    for part in parts {
        let Some(part_text) = part.get("text").and_then(|v| v.as_str()) else {
            continue;
        };
        text.push_str(part_text);
    }

    if text.trim().is_empty() {
        anyhow::bail!("Gemini output text is empty");
    }
    Ok(text)
}
