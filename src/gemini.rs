use std::future::Future;

use log::{debug, info, warn};
use serde_json::{Value, json};

use crate::{Clip, ClipError};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Number of clips asked for in every request
pub const CLIP_COUNT: usize = 4;

/// Anything that can turn a video URL into clip candidates.
pub trait ClipService {
    fn request_clips(&self, url: &str) -> impl Future<Output = Result<Vec<Clip>, ClipError>> + Send;
}

/// Client for the Gemini `generateContent` endpoint with a structured JSON response
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the client at another host (proxies, test servers)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

impl ClipService for GeminiClient {
    async fn request_clips(&self, url: &str) -> Result<Vec<Clip>, ClipError> {
        debug!("Requesting clips via Gemini model {} for {url}", self.model);

        let body = request_body(url);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClipError::Service(format!("Gemini API returned {status}: {body}")));
        }

        let json: Value = resp.json().await?;
        let text = extract_candidate_text(&json)?;
        let clips = parse_clips(&text)?;

        info!("Received {} clips from {}", clips.len(), self.model);
        if clips.len() != CLIP_COUNT {
            warn!("Expected {CLIP_COUNT} clips, model returned {}", clips.len());
        }
        for (i, clip) in clips.iter().enumerate() {
            for note in clip.advisories() {
                warn!("Clip {} ({}): {note}", i + 1, clip.title);
            }
        }

        Ok(clips)
    }
}

/// Instruction text sent to the model
pub fn build_prompt(url: &str) -> String {
    format!(
        "You are ViralClip AI, an assistant that finds engaging short-form moments in long-form YouTube videos.

YouTube video URL: {url}

Analyze the likely content of this video and propose {CLIP_COUNT} distinct, high-impact clips suitable for \
YouTube Shorts, TikTok, or Instagram Reels. Every clip must be between 30 and 60 seconds long.

For each clip provide a title, a start and end time in MM:SS, a one-sentence summary of why it is engaging, \
a virality score from 1.0 to 10.0, and timed captions.
Caption start and end times are in SECONDS relative to the start of the clip, precise enough for \
word-by-word style captions.

Return a JSON array of exactly {CLIP_COUNT} clip objects."
    )
}

/// Schema Gemini uses to constrain its JSON output
pub fn response_schema() -> Value {
    let caption = json!({
        "type": "OBJECT",
        "properties": {
            "startTime": {
                "type": "NUMBER",
                "description": "Start of the caption line in SECONDS (e.g. 5.2)."
            },
            "endTime": {
                "type": "NUMBER",
                "description": "End of the caption line in SECONDS (e.g. 8.7)."
            },
            "text": {
                "type": "STRING",
                "description": "Caption text."
            }
        },
        "required": ["startTime", "endTime", "text"]
    });

    let clip = json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "A catchy, scroll-stopping title (max 70 characters)."
            },
            "startTime": {
                "type": "STRING",
                "description": "Clip start time in 'MM:SS' format."
            },
            "endTime": {
                "type": "STRING",
                "description": "Clip end time in 'MM:SS' format."
            },
            "summary": {
                "type": "STRING",
                "description": "One sentence on why this clip is engaging."
            },
            "viralityScore": {
                "type": "NUMBER",
                "description": "Score from 1.0 to 10.0 for the clip's potential to go viral."
            },
            "captions": {
                "type": "ARRAY",
                "description": "Caption lines timed for dynamic display.",
                "items": caption
            }
        },
        "required": ["title", "startTime", "endTime", "summary", "viralityScore", "captions"]
    });

    json!({
        "type": "ARRAY",
        "items": clip
    })
}

fn request_body(url: &str) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": build_prompt(url) }]
            }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

fn extract_candidate_text(json: &Value) -> Result<String, ClipError> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text")?.as_str())
            .collect();
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    if let Some(reason) = json
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(|r| r.as_str())
    {
        return Err(ClipError::Service(format!("prompt blocked by Gemini: {reason}")));
    }

    Err(ClipError::service("no candidate text in Gemini response"))
}

/// Parse the model's JSON text into clips.
///
/// Malformed JSON is a service failure. Valid JSON that is not an array, or
/// whose elements do not have the clip shape, is a format failure.
pub fn parse_clips(text: &str) -> Result<Vec<Clip>, ClipError> {
    let body = strip_code_fence(text.trim());

    let value: Value = serde_json::from_str(body)
        .map_err(|e| ClipError::Service(format!("response is not valid JSON: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ClipError::Format(format!(
                "expected an array of clips, got {}",
                json_kind(&other)
            )));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<Clip>(item).map_err(|e| ClipError::Format(format!("clip {}: {e}", i + 1)))
        })
        .collect()
}

fn strip_code_fence(text: &str) -> &str {
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn clip_json(title: &str, score: f64) -> Value {
        json!({
            "title": title,
            "startTime": "01:00",
            "endTime": "01:40",
            "summary": "Something surprising happens.",
            "viralityScore": score,
            "captions": [
                { "startTime": 0.0, "endTime": 2.0, "text": "Look at this" },
                { "startTime": 2.0, "endTime": 4.5, "text": "no way" }
            ]
        })
    }

    fn four_clips() -> Value {
        json!([
            clip_json("One", 9.1),
            clip_json("Two", 7.5),
            clip_json("Three", 6.2),
            clip_json("Four", 4.0)
        ])
    }

    fn gemini_envelope(text: &str) -> Value {
        json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": text }] } }
            ]
        })
    }

    #[test]
    fn test_prompt_embeds_url_and_constraints() {
        let prompt = build_prompt("https://youtu.be/dQw4w9WgXcQ");
        assert!(prompt.contains("https://youtu.be/dQw4w9WgXcQ"));
        assert!(prompt.contains("4 distinct"));
        assert!(prompt.contains("between 30 and 60 seconds"));
    }

    #[test]
    fn test_schema_requires_clip_fields() {
        let schema = response_schema();
        assert_eq!(schema["type"], "ARRAY");
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert!(required.contains(&json!("viralityScore")));
        assert_eq!(schema["items"]["properties"]["viralityScore"]["type"], "NUMBER");
        assert_eq!(schema["items"]["properties"]["captions"]["items"]["required"], json!(["startTime", "endTime", "text"]));
    }

    #[test]
    fn test_request_body_asks_for_json() {
        let body = request_body("https://example.com/v");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(body["contents"][0]["parts"][0]["text"].as_str().unwrap().contains("https://example.com/v"));
    }

    #[test]
    fn test_parse_four_clips() {
        let clips = parse_clips(&four_clips().to_string()).unwrap();
        assert_eq!(clips.len(), 4);
        assert_eq!(clips[0].title, "One");
        assert_eq!(clips[3].virality_score, 4.0);
        assert_eq!(clips[1].captions[1].text, "no way");
    }

    #[test]
    fn test_parse_strips_code_fence() {
        let text = format!("```json\n{}\n```", four_clips());
        assert_eq!(parse_clips(&text).unwrap().len(), 4);
    }

    #[test]
    fn test_parse_non_array_is_format_error() {
        let err = parse_clips(r#"{"clips": []}"#).unwrap_err();
        assert!(matches!(err, ClipError::Format(ref m) if m.contains("an object")));
    }

    #[test]
    fn test_parse_ill_typed_element_is_format_error() {
        let text = json!([clip_json("Fine", 8.0), { "title": "Broken", "viralityScore": "high" }]).to_string();
        let err = parse_clips(&text).unwrap_err();
        assert!(matches!(err, ClipError::Format(ref m) if m.starts_with("clip 2")));
    }

    #[test]
    fn test_parse_invalid_json_is_service_error() {
        assert!(matches!(parse_clips("not json at all"), Err(ClipError::Service(_))));
    }

    #[test]
    fn test_extract_candidate_text_joins_parts() {
        let json = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "[1," }, { "text": "2]" }] } }
            ]
        });
        assert_eq!(extract_candidate_text(&json).unwrap(), "[1,2]");
    }

    #[test]
    fn test_extract_candidate_text_blocked() {
        let json = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let err = extract_candidate_text(&json).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_candidate_text_empty() {
        assert!(extract_candidate_text(&json!({ "candidates": [] })).is_err());
    }

    #[tokio::test]
    async fn test_request_clips_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_envelope(&four_clips().to_string())))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(reqwest::Client::new(), "test-key", DEFAULT_MODEL).with_api_base(server.uri());
        let clips = client.request_clips("https://youtu.be/dQw4w9WgXcQ").await.unwrap();
        assert_eq!(clips.len(), 4);
        assert_eq!(clips[2].title, "Three");
    }

    #[tokio::test]
    async fn test_request_clips_http_error_is_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(reqwest::Client::new(), "k", DEFAULT_MODEL).with_api_base(server.uri());
        let err = client.request_clips("https://youtu.be/x").await.unwrap_err();
        assert!(matches!(err, ClipError::Service(ref m) if m.contains("503") && m.contains("overloaded")));
    }

    #[tokio::test]
    async fn test_request_clips_non_array_is_format_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_envelope(r#""just a string""#)))
            .mount(&server)
            .await;

        let client = GeminiClient::new(reqwest::Client::new(), "k", DEFAULT_MODEL).with_api_base(server.uri());
        let err = client.request_clips("https://youtu.be/x").await.unwrap_err();
        assert!(matches!(err, ClipError::Format(_)));
    }
}
