use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Speech (capture / recognition / synthesis)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// When false the `/ws` event channel still connects but every speech
    /// request answers with an error status.
    #[serde(default = "d_true")]
    pub enabled: bool,
    /// Seconds to wait for the first phrase before timing out.
    #[serde(default = "d_10")]
    pub listen_timeout_secs: u64,
    /// Maximum length of one captured phrase, in seconds.
    #[serde(default = "d_5")]
    pub phrase_time_limit_secs: u64,
    /// Recognition attempts, tried in order until one yields text.
    #[serde(default = "d_languages")]
    pub recognition_languages: Vec<String>,
    /// Speech units that may wait behind the running one per connection.
    #[serde(default = "d_4")]
    pub max_pending_jobs: usize,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub recognizer: RecognizerConfig,
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_timeout_secs: 10,
            phrase_time_limit_secs: 5,
            recognition_languages: d_languages(),
            max_pending_jobs: 4,
            capture: CaptureConfig::default(),
            recognizer: RecognizerConfig::default(),
            synthesizer: SynthesizerConfig::default(),
        }
    }
}

/// External recorder used for microphone capture.
///
/// The command must write one WAV phrase to stdout and exit. The literal
/// `{phrase_time_limit}` in any argument is replaced with the configured
/// phrase limit in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default = "d_rec")]
    pub program: String,
    #[serde(default = "d_capture_args")]
    pub args: Vec<String>,
    /// Arguments for the ambient-noise calibration run. `None` skips it.
    #[serde(default = "d_calibrate_args")]
    pub calibrate_args: Option<Vec<String>>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            program: d_rec(),
            args: d_capture_args(),
            calibrate_args: d_calibrate_args(),
        }
    }
}

/// Hosted speech-recognition endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerConfig {
    #[serde(default = "d_asr_endpoint")]
    pub endpoint: String,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_30000")]
    pub timeout_ms: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            endpoint: d_asr_endpoint(),
            api_key_env: d_api_key_env(),
            timeout_ms: 30_000,
        }
    }
}

/// External text-to-speech program; blocks until playback finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    #[serde(default = "d_espeak")]
    pub program: String,
    /// Arguments placed before the text.
    #[serde(default = "d_synth_args")]
    pub args: Vec<String>,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            program: d_espeak(),
            args: d_synth_args(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_true() -> bool {
    true
}
fn d_10() -> u64 {
    10
}
fn d_5() -> u64 {
    5
}
fn d_4() -> usize {
    4
}
fn d_30000() -> u64 {
    30_000
}
fn d_languages() -> Vec<String> {
    vec!["ar-SA".into(), "en-US".into()]
}
fn d_rec() -> String {
    "rec".into()
}
fn d_capture_args() -> Vec<String> {
    [
        "-q", "-c", "1", "-r", "16000", "-b", "16", "-t", "wav", "-", "silence", "1", "0.1",
        "1%", "1", "1.0", "1%", "trim", "0", "{phrase_time_limit}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn d_calibrate_args() -> Option<Vec<String>> {
    Some(
        ["-q", "-n", "trim", "0", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    )
}
fn d_asr_endpoint() -> String {
    "https://api-inference.huggingface.co/models/openai/whisper-large-v3".into()
}
fn d_api_key_env() -> String {
    "HUGGINGFACE_API_KEY".into()
}
fn d_espeak() -> String {
    "espeak-ng".into()
}
fn d_synth_args() -> Vec<String> {
    vec!["-s".into(), "150".into(), "-a".into(), "180".into()]
}
