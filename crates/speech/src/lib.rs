//! Realtime speech sessions: microphone capture, recognition and speech
//! synthesis run as background units that report progress as events.

pub mod command;
pub mod devices;
pub mod events;
pub mod recognizer;
pub mod session;

pub use command::{CommandCapture, CommandSynthesizer};
pub use devices::{
    AudioDevices, AudioInput, AudioSample, CaptureLimits, CaptureOutcome, SpeechRecognizer,
    SpeechSynthesizer,
};
pub use events::{ClientEvent, ListeningStatus, ServerEvent, SpeechState, SpeechStatus};
pub use recognizer::HttpRecognizer;
pub use session::{SpeechServices, SpeechSession, SpeechSettings};
