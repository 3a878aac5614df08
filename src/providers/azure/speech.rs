use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::audio::{encode_wav, CapturedAudio};
use crate::config::SpeechConfig;
use crate::providers::{ProviderError, Synthesizer, TranscriptResult, Transcriber};

/// Unscripted assessment: no reference text, 100-point grading, phoneme granularity
const ASSESSMENT_PARAMS: &str = r#"{"ReferenceText":"","GradingSystem":"HundredMark","Granularity":"Phoneme","EnableMiscue":true}"#;

const OUTPUT_FORMAT: &str = "riff-16khz-16bit-mono-pcm";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RecognitionResponse {
    recognition_status: String,
    display_text: Option<String>,
    #[serde(default, rename = "NBest")]
    n_best: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Candidate {
    display: Option<String>,
    accuracy_score: Option<f64>,
    fluency_score: Option<f64>,
    pron_score: Option<f64>,
    pronunciation_assessment: Option<Assessment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Assessment {
    accuracy_score: Option<f64>,
    fluency_score: Option<f64>,
    pron_score: Option<f64>,
}

/// Azure Speech REST: short-audio recognition and neural voice synthesis
pub struct SpeechClient {
    http: reqwest::Client,
    key: String,
    region: String,
    language: String,
    voice: String,
}

impl SpeechClient {
    pub fn new(config: &SpeechConfig) -> Result<Self, ProviderError> {
        if config.key.trim().is_empty() {
            return Err(ProviderError::NotConfigured("speech.key"));
        }
        if config.region.trim().is_empty() {
            return Err(ProviderError::NotConfigured("speech.region"));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            key: config.key.clone(),
            region: config.region.clone(),
            language: config.language.clone(),
            voice: config.voice.clone(),
        })
    }

    fn recognition_url(&self) -> String {
        format!(
            "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
            self.region
        )
    }

    fn synthesis_url(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        )
    }
}

fn assessment_header() -> String {
    base64::engine::general_purpose::STANDARD.encode(ASSESSMENT_PARAMS)
}

fn parse_recognition(response: RecognitionResponse) -> Result<TranscriptResult, ProviderError> {
    match response.recognition_status.as_str() {
        "Success" => {}
        "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => return Err(ProviderError::NoMatch),
        other => return Err(ProviderError::Canceled(other.to_string())),
    }

    let best = response.n_best.into_iter().next();
    let text = response
        .display_text
        .or_else(|| best.as_ref().and_then(|c| c.display.clone()))
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::NoMatch);
    }

    let (accuracy, fluency, pronunciation) = match best {
        Some(Candidate {
            pronunciation_assessment: Some(a),
            ..
        }) => (a.accuracy_score, a.fluency_score, a.pron_score),
        Some(c) => (c.accuracy_score, c.fluency_score, c.pron_score),
        None => (None, None, None),
    };

    Ok(TranscriptResult {
        text,
        accuracy,
        fluency,
        pronunciation,
    })
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn ssml(language: &str, voice: &str, text: &str) -> String {
    format!(
        "<speak version='1.0' xml:lang='{lang}'><voice xml:lang='{lang}' name='{voice}'>{text}</voice></speak>",
        lang = language,
        voice = voice,
        text = escape_xml(text)
    )
}

#[async_trait]
impl Transcriber for SpeechClient {
    async fn transcribe_and_assess(
        &self,
        audio: &CapturedAudio,
    ) -> Result<TranscriptResult, ProviderError> {
        let wav = encode_wav(&audio.samples, audio.sample_rate)?;
        debug!(
            "Uploading {:.1}s of audio for recognition",
            audio.duration_seconds()
        );

        let response = self
            .http
            .post(self.recognition_url())
            .query(&[("language", self.language.as_str()), ("format", "detailed")])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header(
                "Content-Type",
                format!("audio/wav; codecs=audio/pcm; samplerate={}", audio.sample_rate),
            )
            .header("Pronunciation-Assessment", assessment_header())
            .header("Accept", "application/json")
            .body(wav)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: RecognitionResponse = response.json().await?;
        let result = parse_recognition(body)?;
        info!(
            "Recognized \"{}\" (pronunciation={:?})",
            result.text, result.pronunciation
        );
        Ok(result)
    }
}

#[async_trait]
impl Synthesizer for SpeechClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .http
            .post(self.synthesis_url())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", "talkwithme")
            .body(ssml(&self.language, &self.voice, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Synthesis rejected with {}", status);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        debug!("Synthesized {} bytes of audio", audio.len());
        Ok(audio.to_vec())
    }
}
