//! Per-connection speech state machine.
//!
//! Each connection gets one worker task that runs its speech units (listen,
//! speak) strictly in arrival order. Requests never wait on a unit: they are
//! queued and progress comes back only as [`ServerEvent`]s.

use crate::command::{CommandCapture, CommandSynthesizer};
use crate::devices::{
    AudioDevices, AudioInput, AudioSample, CaptureLimits, CaptureOutcome, SpeechRecognizer,
    SpeechSynthesizer,
};
use crate::events::{messages, ClientEvent, ListeningStatus, ServerEvent, SpeechState, SpeechStatus};
use crate::recognizer::HttpRecognizer;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use vc_domain::config::SpeechConfig;
use vc_domain::error::Result;
use vc_domain::trace::TraceEvent;

/// Slack on top of the capture deadline before the unit gives up on a
/// device that never returns.
const CAPTURE_GRACE: Duration = Duration::from_secs(1);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Shared services
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub listen_timeout: Duration,
    pub phrase_time_limit: Duration,
    /// Recognition attempts, in order.
    pub languages: Vec<String>,
    /// Queue depth behind the running unit.
    pub max_pending_jobs: usize,
}

impl SpeechSettings {
    pub fn from_config(cfg: &SpeechConfig) -> Self {
        Self {
            enabled: cfg.enabled,
            listen_timeout: Duration::from_secs(cfg.listen_timeout_secs),
            phrase_time_limit: Duration::from_secs(cfg.phrase_time_limit_secs),
            languages: cfg.recognition_languages.clone(),
            max_pending_jobs: cfg.max_pending_jobs.max(1),
        }
    }

    pub fn limits(&self) -> CaptureLimits {
        CaptureLimits {
            listen_timeout: self.listen_timeout,
            phrase_time_limit: self.phrase_time_limit,
        }
    }
}

/// Devices and speech services shared by every connection in the process.
pub struct SpeechServices {
    pub input: Arc<dyn AudioInput>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub devices: Arc<AudioDevices>,
    pub settings: SpeechSettings,
}

impl SpeechServices {
    /// Wire up the command-line recorder, HTTP recognizer and command-line
    /// synthesizer from `[speech]`.
    pub fn from_config(cfg: &SpeechConfig) -> Result<Self> {
        Ok(Self {
            input: Arc::new(CommandCapture::from_config(&cfg.capture)),
            recognizer: Arc::new(HttpRecognizer::from_config(&cfg.recognizer)?),
            synthesizer: Arc::new(CommandSynthesizer::from_config(&cfg.synthesizer)),
            devices: Arc::new(AudioDevices::new()),
            settings: SpeechSettings::from_config(cfg),
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event sink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Delivers events to the connection while it is alive and silently drops
/// them afterwards.
struct EventSink {
    tx: mpsc::Sender<ServerEvent>,
    closed: CancellationToken,
    suppressed: AtomicUsize,
}

impl EventSink {
    async fn emit(&self, event: ServerEvent) {
        if self.closed.is_cancelled() || self.tx.send(event).await.is_err() {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session handle
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

enum Job {
    Listen,
    Speak(String),
    Flush(oneshot::Sender<()>),
}

/// One client's speech session.
///
/// Dropping the handle stops the worker once its current unit finishes.
pub struct SpeechSession {
    connection_id: String,
    enabled: bool,
    jobs: mpsc::Sender<Job>,
    sink: Arc<EventSink>,
    state: Arc<Mutex<SpeechState>>,
}

impl SpeechSession {
    /// Start the worker for a new connection. Must be called inside a tokio
    /// runtime.
    pub fn new(
        connection_id: impl Into<String>,
        services: Arc<SpeechServices>,
        events: mpsc::Sender<ServerEvent>,
    ) -> Self {
        let connection_id = connection_id.into();
        let enabled = services.settings.enabled;
        let (jobs, rx) = mpsc::channel(services.settings.max_pending_jobs);
        let sink = Arc::new(EventSink {
            tx: events,
            closed: CancellationToken::new(),
            suppressed: AtomicUsize::new(0),
        });
        let state = Arc::new(Mutex::new(SpeechState::Idle));

        let worker = Worker {
            connection_id: connection_id.clone(),
            services,
            sink: sink.clone(),
            state: state.clone(),
        };
        tokio::spawn(worker.run(rx));

        Self {
            connection_id,
            enabled,
            jobs,
            sink,
            state,
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn state(&self) -> SpeechState {
        *self.state.lock()
    }

    /// Tell the client the connection is up.
    pub async fn announce(&self) {
        self.sink.emit(ServerEvent::status(messages::CONNECTED)).await;
    }

    pub async fn handle(&self, event: ClientEvent) {
        match event {
            ClientEvent::StartListening => self.start_listening().await,
            ClientEvent::SpeakText { text } => self.speak_text(text).await,
        }
    }

    /// Queue a listen unit.
    pub async fn start_listening(&self) {
        if !self.enabled {
            self.sink
                .emit(ServerEvent::listening(ListeningStatus::Error, messages::DISABLED))
                .await;
            return;
        }
        if self.enqueue(Job::Listen) {
            return;
        }
        self.sink
            .emit(ServerEvent::listening(ListeningStatus::Error, messages::BUSY))
            .await;
    }

    /// Queue a speak unit. Blank text is answered immediately with an error
    /// status and changes nothing.
    pub async fn speak_text(&self, text: String) {
        if text.trim().is_empty() {
            self.sink
                .emit(ServerEvent::speech(SpeechStatus::Error, messages::EMPTY_TEXT))
                .await;
            return;
        }
        if !self.enabled {
            self.sink
                .emit(ServerEvent::speech(SpeechStatus::Error, messages::DISABLED))
                .await;
            return;
        }
        if self.enqueue(Job::Speak(text)) {
            return;
        }
        self.sink
            .emit(ServerEvent::speech(SpeechStatus::Error, messages::BUSY))
            .await;
    }

    /// Wait until every unit queued before this call has finished.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.jobs.send(Job::Flush(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Mark the connection gone. The running unit completes with its events
    /// suppressed; queued units are dropped.
    pub fn close(&self) {
        self.sink.closed.cancel();
    }

    /// Returns false when the queue is full.
    fn enqueue(&self, job: Job) -> bool {
        match self.jobs.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    connection_id = %self.connection_id,
                    "speech queue full, rejecting request"
                );
                false
            }
            // Worker gone: the connection is closing, nothing to report.
            Err(mpsc::error::TrySendError::Closed(_)) => true,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Worker
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

enum Recognition {
    Text(String),
    NoMatch { errored: bool },
}

struct Worker {
    connection_id: String,
    services: Arc<SpeechServices>,
    sink: Arc<EventSink>,
    state: Arc<Mutex<SpeechState>>,
}

impl Worker {
    async fn run(self, mut jobs: mpsc::Receiver<Job>) {
        while let Some(job) = jobs.recv().await {
            match job {
                Job::Flush(done) => {
                    let _ = done.send(());
                }
                _ if self.sink.is_closed() => {
                    tracing::debug!(
                        connection_id = %self.connection_id,
                        "dropping queued speech unit after disconnect"
                    );
                }
                Job::Listen => self.unit("listen", self.listen()).await,
                Job::Speak(text) => self.unit("speak", self.speak(&text)).await,
            }
        }

        TraceEvent::ConnectionClosed {
            connection_id: self.connection_id.clone(),
            suppressed_events: self.sink.suppressed.load(Ordering::Relaxed),
        }
        .emit();
    }

    /// Run one unit and return the machine to Idle.
    async fn unit(&self, name: &str, work: impl std::future::Future<Output = &'static str>) {
        let start = Instant::now();
        let outcome = work.await;
        self.transition(SpeechState::Idle);

        TraceEvent::SpeechUnitFinished {
            connection_id: self.connection_id.clone(),
            unit: name.to_string(),
            outcome: outcome.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        }
        .emit();
    }

    fn transition(&self, next: SpeechState) {
        let prev = std::mem::replace(&mut *self.state.lock(), next);
        tracing::debug!(
            connection_id = %self.connection_id,
            from = %prev,
            to = %next,
            "speech state"
        );
    }

    async fn listening(&self, status: ListeningStatus, message: impl Into<String>) {
        self.sink.emit(ServerEvent::listening(status, message)).await;
    }

    // ── listen ────────────────────────────────────────────────────────

    async fn listen(&self) -> &'static str {
        let services = &self.services;
        let limits = services.settings.limits();

        let mic = services.devices.lock_input().await;
        if let Err(e) = services.input.calibrate().await {
            return self.listen_failed(&e).await;
        }

        self.transition(SpeechState::Listening);
        self.listening(ListeningStatus::Listening, messages::LISTENING)
            .await;

        let captured =
            tokio::time::timeout(limits.deadline() + CAPTURE_GRACE, services.input.capture(limits))
                .await;
        drop(mic);

        let sample = match captured {
            Ok(Ok(CaptureOutcome::Phrase(sample))) => sample,
            Ok(Ok(CaptureOutcome::NoSpeech)) | Err(_) => {
                self.transition(SpeechState::TimedOut);
                self.listening(ListeningStatus::Timeout, messages::TIMEOUT)
                    .await;
                return "timeout";
            }
            Ok(Err(e)) => return self.listen_failed(&e).await,
        };

        self.transition(SpeechState::Processing);
        self.listening(ListeningStatus::Processing, messages::PROCESSING)
            .await;

        match self.recognize(&sample).await {
            Recognition::Text(text) => {
                self.sink
                    .emit(ServerEvent::SpeechRecognized { text: text.clone() })
                    .await;
                self.listening(ListeningStatus::Success, messages::recognized(&text))
                    .await;
                "success"
            }
            Recognition::NoMatch { errored } => {
                if errored {
                    self.transition(SpeechState::Error);
                }
                self.listening(ListeningStatus::Error, messages::NOT_RECOGNIZED)
                    .await;
                "no_match"
            }
        }
    }

    async fn listen_failed(&self, e: &vc_domain::error::Error) -> &'static str {
        tracing::warn!(connection_id = %self.connection_id, error = %e, "audio capture failed");
        self.transition(SpeechState::Error);
        self.listening(ListeningStatus::Error, messages::capture_error(e))
            .await;
        "error"
    }

    /// Try each configured language in order; the first non-empty text wins.
    /// A failing attempt counts as no match for that language.
    async fn recognize(&self, sample: &AudioSample) -> Recognition {
        let mut errored = false;
        for language in &self.services.settings.languages {
            match self.services.recognizer.recognize(sample, language).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    tracing::debug!(
                        connection_id = %self.connection_id,
                        language = %language,
                        "speech recognized"
                    );
                    return Recognition::Text(text.trim().to_string());
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        connection_id = %self.connection_id,
                        language = %language,
                        error = %e,
                        "recognition attempt failed"
                    );
                    errored = true;
                }
            }
        }
        Recognition::NoMatch { errored }
    }

    // ── speak ─────────────────────────────────────────────────────────

    async fn speak(&self, text: &str) -> &'static str {
        let _speaker = self.services.devices.lock_output().await;

        self.transition(SpeechState::Speaking);
        self.sink
            .emit(ServerEvent::speech(SpeechStatus::Speaking, messages::SPEAKING))
            .await;

        match self.services.synthesizer.speak(text).await {
            Ok(()) => {
                self.sink
                    .emit(ServerEvent::speech(SpeechStatus::Completed, messages::SPOKEN))
                    .await;
                "completed"
            }
            Err(e) => {
                tracing::warn!(connection_id = %self.connection_id, error = %e, "speech synthesis failed");
                self.transition(SpeechState::Error);
                self.sink
                    .emit(ServerEvent::speech(SpeechStatus::Error, messages::speak_error(&e)))
                    .await;
                "error"
            }
        }
    }
}
