// Scripted providers and capture fixtures shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use talkwithme::{
    CapturedAudio, Message, ProviderError, Providers, ReplyGenerator, SessionConfig, Summarizer,
    Synthesizer, Topic, TranscriptResult, Transcriber,
};

/// Recognizer that replays a queue of results; `Err` strings become cancellations
#[derive(Default)]
pub struct ScriptedTranscriber {
    script: Mutex<VecDeque<Result<TranscriptResult, String>>>,
    pub calls: AtomicUsize,
    pub last_audio: Mutex<Option<CapturedAudio>>,
}

impl ScriptedTranscriber {
    pub fn new(script: Vec<Result<TranscriptResult, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn push(&self, result: Result<TranscriptResult, String>) {
        self.script.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe_and_assess(
        &self,
        audio: &CapturedAudio,
    ) -> Result<TranscriptResult, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_audio.lock().unwrap() = Some(audio.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(reason)) => Err(ProviderError::Canceled(reason)),
            None => Err(ProviderError::NoMatch),
        }
    }
}

/// Reply generator that records every history it is shown
pub struct ScriptedReplier {
    reply: Result<String, String>,
    pub histories: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedReplier {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            histories: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            reply: Err(reason.to_string()),
            histories: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.histories.lock().unwrap().len()
    }
}

#[async_trait]
impl ReplyGenerator for ScriptedReplier {
    async fn generate_reply(&self, history: &[Message]) -> Result<String, ProviderError> {
        self.histories.lock().unwrap().push(history.to_vec());
        self.reply.clone().map_err(|body| ProviderError::Status { status: 500, body })
    }
}

/// Summarizer that counts invocations
pub struct CountingSummarizer {
    report: Result<String, String>,
    pub calls: AtomicUsize,
    pub dialogues: Mutex<Vec<Vec<Message>>>,
}

impl CountingSummarizer {
    pub fn returning(report: &str) -> Self {
        Self {
            report: Ok(report.to_string()),
            calls: AtomicUsize::new(0),
            dialogues: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            report: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
            dialogues: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for CountingSummarizer {
    async fn summarize(&self, dialogue: &[Message]) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.dialogues.lock().unwrap().push(dialogue.to_vec());
        self.report.clone().map_err(|body| ProviderError::Status { status: 503, body })
    }
}

/// Synthesizer that either returns fixed bytes or fails
pub struct ScriptedSynthesizer {
    audio: Option<Vec<u8>>,
    pub calls: AtomicUsize,
}

impl ScriptedSynthesizer {
    pub fn speaking(audio: &[u8]) -> Self {
        Self {
            audio: Some(audio.to_vec()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn silent() -> Self {
        Self {
            audio: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.audio.clone().ok_or(ProviderError::EmptyResponse)
    }
}

/// Handles to every scripted provider, so tests can inspect them after wiring
pub struct Harness {
    pub transcriber: Arc<ScriptedTranscriber>,
    pub replier: Arc<ScriptedReplier>,
    pub summarizer: Arc<CountingSummarizer>,
    pub synthesizer: Arc<ScriptedSynthesizer>,
}

impl Harness {
    pub fn new(
        transcriber: ScriptedTranscriber,
        replier: ScriptedReplier,
        summarizer: CountingSummarizer,
        synthesizer: ScriptedSynthesizer,
    ) -> Self {
        Self {
            transcriber: Arc::new(transcriber),
            replier: Arc::new(replier),
            summarizer: Arc::new(summarizer),
            synthesizer: Arc::new(synthesizer),
        }
    }

    /// Everything succeeds; the recognizer has nothing queued yet
    pub fn happy() -> Self {
        Self::new(
            ScriptedTranscriber::default(),
            ScriptedReplier::replying("Oh, what did you study?"),
            CountingSummarizer::returning("1. **Overall Feedback**: Nice work."),
            ScriptedSynthesizer::speaking(b"RIFF-reply"),
        )
    }

    pub fn providers(&self) -> Providers {
        Providers {
            transcriber: self.transcriber.clone(),
            replier: self.replier.clone(),
            summarizer: self.summarizer.clone(),
            synthesizer: self.synthesizer.clone(),
        }
    }
}

pub fn heard(text: &str, accuracy: f64, fluency: f64, pronunciation: f64) -> TranscriptResult {
    TranscriptResult::new(text, accuracy, fluency, pronunciation)
}

pub fn session_config(scratch_dir: &Path, topic: Topic) -> SessionConfig {
    SessionConfig {
        topic,
        scratch_dir: scratch_dir.to_path_buf(),
        sample_rate: 16000,
    }
}

/// A short 16-bit WAV capture of a sine tone
pub fn wav_capture(sample_rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let frames = (sample_rate as f32 * seconds) as usize;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = ((t * 440.0 * std::f32::consts::TAU).sin() * 8000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn speech() -> Vec<u8> {
    wav_capture(16000, 1, 0.5)
}

pub fn files_in(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
