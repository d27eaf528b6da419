//! Gemini `generateContent` client for analysis and speech

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::prompt::{analysis_prompt, speech_prompt};
use super::{Analyzer, StoryAnalysis, Synthesizer};
use crate::catalog::{FolkStory, Language};
use crate::config::GeminiConfig;
use crate::{Error, Result};

/// Talks to the Generative Language REST API
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    analysis_model: String,
    tts_model: String,
    voice: String,
}

impl GeminiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY required for narration".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            analysis_model: config.analysis_model.clone(),
            tts_model: config.tts_model.clone(),
            voice: config.voice.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// POST a request and decode the response, mapping failures with `wrap`
    async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest<'_>,
        wrap: fn(String) -> Error,
    ) -> Result<GenerateResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| wrap(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(wrap(format!("Gemini error {status}: {body}")));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| wrap(format!("invalid Gemini response: {e}")))
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, story: &FolkStory) -> Result<StoryAnalysis> {
        let prompt = analysis_prompt(story);
        let request = GenerateRequest {
            contents: vec![Content::text(&prompt)],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(analysis_schema()),
                ..GenerationConfig::default()
            },
        };

        tracing::debug!(story = %story.id, model = %self.analysis_model, "requesting story analysis");

        let response = self
            .generate(&self.analysis_model, &request, Error::Analysis)
            .await?;

        let text = response
            .first_text()
            .ok_or_else(|| Error::Analysis("response contained no text".to_string()))?;

        let analysis: StoryAnalysis = serde_json::from_str(text.trim())
            .map_err(|e| Error::Analysis(format!("malformed analysis JSON: {e}")))?;

        tracing::info!(
            story = %story.id,
            emotion = %analysis.emotion,
            intensity = analysis.intensity,
            words = analysis.full_narration.split_whitespace().count(),
            "story analysed"
        );

        Ok(analysis)
    }
}

#[async_trait]
impl Synthesizer for GeminiClient {
    async fn synthesize(&self, text: &str, language: Language) -> Result<String> {
        let prompt = speech_prompt(text, language);
        let request = GenerateRequest {
            contents: vec![Content::text(&prompt)],
            generation_config: GenerationConfig {
                response_modalities: Some(vec!["AUDIO"]),
                speech_config: Some(json!({
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.voice }
                    }
                })),
                ..GenerationConfig::default()
            },
        };

        tracing::debug!(%language, model = %self.tts_model, voice = %self.voice, "requesting speech");

        let response = self
            .generate(&self.tts_model, &request, Error::Synthesis)
            .await?;

        Ok(response.first_audio().unwrap_or_default().to_string())
    }
}

/// Response schema for the six analysis fields
fn analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullNarration": { "type": "STRING" },
            "emotion": { "type": "STRING" },
            "intensity": { "type": "NUMBER" },
            "culturalNuances": { "type": "ARRAY", "items": { "type": "STRING" } },
            "historicalContext": { "type": "STRING" },
            "significance": { "type": "STRING" }
        },
        "required": [
            "fullNarration",
            "emotion",
            "intensity",
            "culturalNuances",
            "historicalContext",
            "significance"
        ]
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

impl<'a> Content<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            parts: vec![TextPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: Option<String>,
}

impl GenerateResponse {
    fn first_parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    fn first_text(&self) -> Option<&str> {
        self.first_parts().iter().find_map(|p| p.text.as_deref())
    }

    /// First part of the first candidate carrying inline audio
    fn first_audio(&self) -> Option<&str> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find_map(|d| d.data.as_deref().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_request_body() {
        let request = GenerateRequest {
            contents: vec![Content::text("hello")],
            generation_config: GenerationConfig {
                response_mime_type: Some("application/json"),
                response_schema: Some(analysis_schema()),
                ..GenerationConfig::default()
            },
        };
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"]
                .as_array()
                .unwrap()
                .len(),
            6
        );
        assert!(body["generationConfig"].get("responseModalities").is_none());
    }

    #[test]
    fn test_first_audio_skips_text_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "here you go" },
                        { "inlineData": { "mimeType": "audio/L16;rate=24000", "data": "AAEC" } }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.first_audio(), Some("AAEC"));
        assert_eq!(response.first_text(), Some("here you go"));
    }

    #[test]
    fn test_no_candidates() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.first_audio().is_none());
        assert!(response.first_text().is_none());
    }

    #[test]
    fn test_missing_api_key() {
        let config = GeminiConfig {
            api_key: None,
            ..GeminiConfig::default()
        };
        assert!(matches!(GeminiClient::new(&config), Err(Error::Config(_))));
    }
}
