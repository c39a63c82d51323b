//! Title/description inference client.
//!
//! A thin request/response wrapper around an OpenRouter-style multimodal
//! chat-completions API. The core logic (two-stage title extraction, the
//! analysis latch, the strictly sequential batch walk) is written against the
//! [`VisionModel`] trait so tests run without a network.
//!
//! Every request is single-shot with no retry. Failures never propagate past
//! the triggering action: a failed title extraction writes a visible error
//! marker into the clip's title instead.

use crate::catalog::{ClipCatalog, ClipId};
use crate::config::Settings;
use crate::error::{Error, Result};
use base64::Engine;
use std::time::Duration;

/// Prompt asking for the article headline verbatim, or the sentinel.
pub const TITLE_PROMPT: &str = "この新聞記事の切り抜き画像から、メインの「見出し（タイトル）」だけを抜き出して文字にしてください。前置きや説明は不要です。タイトル文字列のみを返してください。文字が読み取れない場合は「NO_TEXT」とだけ返してください。";

/// Fallback prompt: infer a plausible headline from the image content.
pub const TITLE_FALLBACK_PROMPT: &str = "この新聞記事の画像を見て、内容を推測し、適切な記事タイトルを1行で生成してください。タイトルのみを返してください。";

/// Default multi-image explanation prompt (user-editable in settings).
pub const DEFAULT_EXPLAIN_PROMPT: &str = "以下の新聞記事の切り抜き画像それぞれについて、内容を1つずつ簡潔に説明してください。";

/// Sentinel the model returns when no legible text is present.
pub const NO_TEXT_SENTINEL: &str = "NO_TEXT";

/// Fixed delay between requests in a bulk analysis walk.
pub const ANALYZE_ALL_DELAY: Duration = Duration::from_millis(500);

/// Max characters of an error message surfaced in a clip title.
const TITLE_ERROR_MAX: usize = 20;

/// Fallback title when even the second-stage prompt fails.
const TITLE_UNAVAILABLE: &str = "タイトル取得失敗";

/// A multimodal model that accepts a prompt plus JPEG images and returns
/// free text.
pub trait VisionModel {
    /// One single-shot completion; no retry.
    ///
    /// Fails with [`Error::InferenceFailure`] on network/API errors or a
    /// malformed response.
    fn complete(&self, prompt: &str, jpeg_images: &[&[u8]]) -> Result<String>;
}

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart>,
}

#[derive(serde::Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(serde::Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(serde::Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(serde::Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Blocking OpenRouter chat-completions client.
pub struct OpenRouterClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

/// Default chat-completions endpoint.
pub const OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";

impl OpenRouterClient {
    /// Create a client for the given key and model identifier.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: OPENROUTER_ENDPOINT.to_string(),
        }
    }

    /// Create a client from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_key.clone(), settings.model.clone())
    }

    /// Override the endpoint (test servers, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl VisionModel for OpenRouterClient {
    fn complete(&self, prompt: &str, jpeg_images: &[&[u8]]) -> Result<String> {
        let mut content = vec![ContentPart::Text {
            text: prompt.to_string(),
        }];
        for jpeg in jpeg_images {
            let b64 = base64::engine::general_purpose::STANDARD.encode(jpeg);
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/jpeg;base64,{}", b64),
                },
            });
        }
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        };

        log::debug!(
            "Inference request - model={}, images={}",
            self.model,
            jpeg_images.len()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| Error::InferenceFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorBody>()
                .ok()
                .and_then(|b| b.error)
                .map(|e| e.message)
                .unwrap_or_else(|| format!("API error: {}", status));
            return Err(Error::InferenceFailure(detail));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::InferenceFailure(format!("malformed response: {}", e)))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| Error::InferenceFailure("response carried no content".to_string()))?;
        Ok(text)
    }
}

/// Whether a first-stage title response needs the fallback prompt.
fn needs_fallback(text: &str) -> bool {
    text.is_empty() || text == NO_TEXT_SENTINEL || text.chars().count() < 2
}

/// Visible error marker for a failed extraction, truncated for display.
fn error_title(e: &Error) -> String {
    let message: String = e.to_string().chars().take(TITLE_ERROR_MAX).collect();
    format!("エラー: {}...", message)
}

/// Extract (or infer) a title for one clip and store it on the clip.
///
/// Returns `false` without firing a request when the clip is unknown or an
/// analysis for it is already in flight. On any failure the clip's title is
/// set to a visible error marker; the error never propagates.
pub fn analyze_title(model: &dyn VisionModel, catalog: &mut ClipCatalog, id: ClipId) -> bool {
    let Some(clip) = catalog.get(id) else {
        return false;
    };
    let jpeg = clip.image.data.clone();
    if !catalog.begin_analysis(id) {
        return false;
    }

    let title = match model.complete(TITLE_PROMPT, &[&jpeg]) {
        Ok(text) if needs_fallback(&text) => {
            log::debug!("Title extraction for clip {} fell back to inference", id.0);
            match model.complete(TITLE_FALLBACK_PROMPT, &[&jpeg]) {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => TITLE_UNAVAILABLE.to_string(),
                Err(e) => {
                    log::warn!("Fallback title inference failed for clip {}: {}", id.0, e);
                    TITLE_UNAVAILABLE.to_string()
                }
            }
        }
        Ok(text) => text,
        Err(e) => {
            log::warn!("Title extraction failed for clip {}: {}", id.0, e);
            error_title(&e)
        }
    };
    catalog.end_analysis(id, Some(title));
    true
}

/// Analyze every clip in display order, strictly sequentially.
///
/// A fixed inter-request delay respects the API's implicit rate limits; one
/// clip's failure does not stop the batch. Returns how many requests were
/// fired.
pub fn analyze_all(
    model: &dyn VisionModel,
    catalog: &mut ClipCatalog,
    delay: Duration,
) -> usize {
    let ids = catalog.ids();
    let total = ids.len();
    let mut fired = 0;
    for (i, id) in ids.into_iter().enumerate() {
        if analyze_title(model, catalog, id) {
            fired += 1;
        }
        if i + 1 < total && !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
    log::info!("Bulk analysis fired {} of {} requests", fired, total);
    fired
}

/// One multi-image request explaining every clip in the catalog.
///
/// Unlike per-clip analysis this surfaces its error to the caller, which
/// displays it in the explanation panel.
pub fn explain_all(
    model: &dyn VisionModel,
    catalog: &ClipCatalog,
    prompt: &str,
) -> Result<String> {
    if catalog.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    let images: Vec<&[u8]> = catalog.iter().map(|c| c.image.data.as_slice()).collect();
    model.complete(prompt, &images)
}
