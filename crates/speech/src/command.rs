//! Audio devices driven by external programs (sox `rec`, `espeak-ng`, ...).

use crate::devices::{AudioInput, AudioSample, CaptureLimits, CaptureOutcome, SpeechSynthesizer};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::time::timeout;
use vc_domain::config::{CaptureConfig, SynthesizerConfig};
use vc_domain::error::{Error, Result};

/// A WAV header alone is 44 bytes; anything that short holds no speech.
const MIN_WAV_BYTES: usize = 45;

const CALIBRATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Recorder diagnostics kept for error messages.
const STDERR_KEEP: usize = 4096;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Capture
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Records one phrase by running a recorder that writes WAV to stdout.
pub struct CommandCapture {
    program: String,
    args: Vec<String>,
    calibrate_args: Option<Vec<String>>,
}

impl CommandCapture {
    pub fn from_config(cfg: &CaptureConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            calibrate_args: cfg.calibrate_args.clone(),
        }
    }

    fn capture_args(&self, limits: &CaptureLimits) -> Vec<String> {
        let secs = limits.phrase_time_limit.as_secs().to_string();
        self.args
            .iter()
            .map(|a| a.replace("{phrase_time_limit}", &secs))
            .collect()
    }
}

#[async_trait::async_trait]
impl AudioInput for CommandCapture {
    async fn calibrate(&self) -> Result<()> {
        let Some(args) = &self.calibrate_args else {
            return Ok(());
        };
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(CALIBRATE_TIMEOUT, cmd.output())
            .await
            .map_err(|_| Error::Capture("calibration timed out".into()))?
            .map_err(|e| Error::Capture(format!("{}: {e}", self.program)))?;
        if !output.status.success() {
            return Err(Error::Capture(format!(
                "calibration failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }

    async fn capture(&self, limits: CaptureLimits) -> Result<CaptureOutcome> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.capture_args(&limits))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::Capture(format!("{}: {e}", self.program)))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Capture("recorder stdout unavailable".into()))?;
        // Drained concurrently so a chatty recorder never stalls on a full pipe.
        let stderr = child.stderr.take().map(|pipe| tokio::spawn(drain(pipe)));

        // Speech has started once the recorder writes past the WAV header.
        let mut audio = Vec::new();
        let started = timeout(
            limits.listen_timeout,
            fill(&mut stdout, &mut audio, MIN_WAV_BYTES),
        )
        .await;
        let Ok(started) = started else {
            // No speech within the listen window; the child is killed on drop.
            return Ok(CaptureOutcome::NoSpeech);
        };
        let eof = started.map_err(|e| Error::Capture(e.to_string()))?;

        if !eof {
            let phrase = timeout(
                limits.phrase_time_limit,
                fill(&mut stdout, &mut audio, usize::MAX),
            )
            .await;
            match phrase {
                Ok(read) => {
                    read.map_err(|e| Error::Capture(e.to_string()))?;
                }
                Err(_) => {
                    tracing::debug!(bytes = audio.len(), "phrase cut at time limit");
                    return Ok(CaptureOutcome::Phrase(AudioSample::wav(audio)));
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Capture(e.to_string()))?;
        if !status.success() {
            let stderr = match stderr {
                Some(task) => task.await.unwrap_or_default(),
                None => String::new(),
            };
            return Err(Error::Capture(format!(
                "{} exited with {status}: {stderr}",
                self.program
            )));
        }

        if audio.len() < MIN_WAV_BYTES {
            return Ok(CaptureOutcome::NoSpeech);
        }
        Ok(CaptureOutcome::Phrase(AudioSample::wav(audio)))
    }
}

/// Appends from `pipe` until `audio` holds `want` bytes. Returns `true` at end
/// of stream. Each read lands in `audio` before the next await, so a timeout
/// keeps everything read so far.
async fn fill(pipe: &mut ChildStdout, audio: &mut Vec<u8>, want: usize) -> std::io::Result<bool> {
    let mut buf = [0u8; 4096];
    while audio.len() < want {
        let n = pipe.read(&mut buf).await?;
        if n == 0 {
            return Ok(true);
        }
        audio.extend_from_slice(&buf[..n]);
    }
    Ok(false)
}

/// Reads a recorder's stderr to the end, keeping the head for error messages.
async fn drain(mut pipe: ChildStderr) -> String {
    let mut kept = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) if kept.len() < STDERR_KEEP => kept.extend_from_slice(&buf[..n]),
            Ok(_) => {}
        }
    }
    String::from_utf8_lossy(&kept).trim().to_string()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Synthesis
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Speaks text by running a TTS program with the text as its last argument.
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn from_config(cfg: &SynthesizerConfig) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
        }
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn speak(&self, text: &str) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Synthesis(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(Error::Synthesis(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}
