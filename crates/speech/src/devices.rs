//! Collaborator traits for audio hardware and speech services, plus the
//! process-wide device locks.

use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use vc_domain::error::Result;

/// One captured phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSample {
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`, e.g. `"audio/wav"`.
    pub mime_type: String,
}

impl AudioSample {
    pub fn wav(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "audio/wav".into(),
        }
    }
}

/// Bounds on one capture: how long to wait for speech to start and how long
/// a phrase may run once it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    pub listen_timeout: Duration,
    pub phrase_time_limit: Duration,
}

impl CaptureLimits {
    /// Hard ceiling on a whole capture: speech starting at the last moment
    /// of the listen window and running the full phrase limit.
    pub fn deadline(&self) -> Duration {
        self.listen_timeout + self.phrase_time_limit
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Phrase(AudioSample),
    /// Nothing was said before `listen_timeout`.
    NoSpeech,
}

/// The microphone.
#[async_trait::async_trait]
pub trait AudioInput: Send + Sync {
    /// Sample ambient noise so the following capture can tell speech from
    /// silence.
    async fn calibrate(&self) -> Result<()>;

    async fn capture(&self, limits: CaptureLimits) -> Result<CaptureOutcome>;
}

/// Audio → text for one language.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// `Ok(None)` means the audio did not match anything in `language`.
    async fn recognize(&self, sample: &AudioSample, language: &str) -> Result<Option<String>>;
}

/// Text → audible speech. Returns once playback has finished.
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Exclusive access to the audio input and output devices.
///
/// One instance is shared by every connection in the process so two clients
/// never record or play at the same time.
#[derive(Default)]
pub struct AudioDevices {
    input: Mutex<()>,
    output: Mutex<()>,
}

impl AudioDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock_input(&self) -> MutexGuard<'_, ()> {
        self.input.lock().await
    }

    pub async fn lock_output(&self) -> MutexGuard<'_, ()> {
        self.output.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn input_and_output_lock_independently() {
        let devices = AudioDevices::new();
        let _mic = devices.lock_input().await;
        // Output is still free while the microphone is held.
        let _speaker = devices.lock_output().await;
        assert!(devices.input.try_lock().is_err());
    }

    #[test]
    fn deadline_is_wait_plus_phrase() {
        let limits = CaptureLimits {
            listen_timeout: Duration::from_secs(10),
            phrase_time_limit: Duration::from_secs(5),
        };
        assert_eq!(limits.deadline(), Duration::from_secs(15));
    }
}
