//! Event-channel frames.
//!
//! Every frame on the wire is `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use vc_domain::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Status messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub(crate) mod messages {
    pub const CONNECTED: &str = "متصل بالخادم";
    pub const LISTENING: &str = "جاري الاستماع...";
    pub const PROCESSING: &str = "جاري معالجة الصوت...";
    pub const NOT_RECOGNIZED: &str = "لم يتم التعرف على الكلام";
    pub const TIMEOUT: &str = "انتهت مهلة الاستماع";
    pub const EMPTY_TEXT: &str = "النص فارغ";
    pub const SPEAKING: &str = "جاري النطق...";
    pub const SPOKEN: &str = "تم النطق بنجاح";
    pub const BUSY: &str = "طلبات صوتية كثيرة قيد الانتظار";
    pub const DISABLED: &str = "الخدمات الصوتية معطلة";

    pub fn recognized(text: &str) -> String {
        format!("تم التعرف على: {text}")
    }

    pub fn capture_error(e: &impl std::fmt::Display) -> String {
        format!("خطأ: {e}")
    }

    pub fn speak_error(e: &impl std::fmt::Display) -> String {
        format!("خطأ في النطق: {e}")
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Server → client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListeningStatus {
    Listening,
    Processing,
    Success,
    Error,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechStatus {
    Speaking,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Status {
        message: String,
    },
    ListeningStatus {
        status: ListeningStatus,
        message: String,
    },
    SpeechRecognized {
        text: String,
    },
    SpeechStatus {
        status: SpeechStatus,
        message: String,
    },
}

impl ServerEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn listening(status: ListeningStatus, message: impl Into<String>) -> Self {
        Self::ListeningStatus {
            status,
            message: message.into(),
        }
    }

    pub fn speech(status: SpeechStatus, message: impl Into<String>) -> Self {
        Self::SpeechStatus {
            status,
            message: message.into(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client → server
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    StartListening,
    /// A missing `text` field parses as empty text.
    SpeakText { text: String },
}

#[derive(Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Deserialize, Default)]
struct SpeakTextData {
    #[serde(default)]
    text: String,
}

impl ClientEvent {
    /// Parse one inbound text frame. `data` may be omitted for events that
    /// carry no payload.
    pub fn parse(frame: &str) -> Result<Self> {
        let raw: RawFrame = serde_json::from_str(frame)?;
        match raw.event.as_str() {
            "start_listening" => Ok(Self::StartListening),
            "speak_text" => {
                let data: SpeakTextData = if raw.data.is_null() {
                    SpeakTextData::default()
                } else {
                    serde_json::from_value(raw.data)?
                };
                Ok(Self::SpeakText { text: data.text })
            }
            other => Err(Error::Other(format!("unknown event \"{other}\""))),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// State
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where one connection's speech state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechState {
    Idle,
    Listening,
    Processing,
    Speaking,
    Error,
    TimedOut,
}

impl fmt::Display for SpeechState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Processing => "processing",
            Self::Speaking => "speaking",
            Self::Error => "error",
            Self::TimedOut => "timed_out",
        };
        f.write_str(s)
    }
}
