//! Speech session state machine driven by fake devices.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use vc_domain::error::{Error, Result};
use vc_speech::{
    AudioDevices, AudioInput, AudioSample, CaptureLimits, CaptureOutcome, ClientEvent,
    ListeningStatus, ServerEvent, SpeechRecognizer, SpeechServices, SpeechSession, SpeechSettings,
    SpeechState, SpeechStatus, SpeechSynthesizer,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Fakes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

enum Mic {
    /// Waits out the listen window and reports no speech.
    Silent,
    /// Never returns.
    Hung,
    /// Hears one phrase immediately.
    Phrase,
    /// Calibration fails.
    Broken,
}

#[async_trait::async_trait]
impl AudioInput for Mic {
    async fn calibrate(&self) -> Result<()> {
        match self {
            Mic::Broken => Err(Error::Capture("no input device".into())),
            _ => Ok(()),
        }
    }

    async fn capture(&self, limits: CaptureLimits) -> Result<CaptureOutcome> {
        match self {
            Mic::Silent => {
                tokio::time::sleep(limits.listen_timeout).await;
                Ok(CaptureOutcome::NoSpeech)
            }
            Mic::Hung => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(CaptureOutcome::NoSpeech)
            }
            Mic::Phrase => Ok(CaptureOutcome::Phrase(AudioSample::wav(vec![0; 64]))),
            Mic::Broken => Err(Error::Capture("unreachable".into())),
        }
    }
}

#[derive(Default)]
struct ScriptedRecognizer {
    /// language → result; missing languages yield no match.
    script: HashMap<String, std::result::Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRecognizer {
    fn with(mut self, language: &str, result: std::result::Result<&str, &str>) -> Self {
        self.script.insert(
            language.into(),
            result.map(String::from).map_err(String::from),
        );
        self
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn recognize(&self, _sample: &AudioSample, language: &str) -> Result<Option<String>> {
        self.calls.lock().push(language.to_string());
        match self.script.get(language) {
            Some(Ok(text)) => Ok(Some(text.clone())),
            Some(Err(e)) => Err(Error::Recognition(e.clone())),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
struct Speaker {
    delay: Duration,
    fail: bool,
    spoken: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for Speaker {
    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken.lock().push(text.to_string());
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(Error::Synthesis("audio device busy".into()));
        }
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Harness
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn settings(max_pending_jobs: usize) -> SpeechSettings {
    SpeechSettings {
        enabled: true,
        listen_timeout: Duration::from_secs(10),
        phrase_time_limit: Duration::from_secs(5),
        languages: vec!["ar-SA".into(), "en-US".into()],
        max_pending_jobs,
    }
}

struct Harness {
    session: SpeechSession,
    events: mpsc::Receiver<ServerEvent>,
    recognizer: Arc<ScriptedRecognizer>,
    speaker: Arc<Speaker>,
}

impl Harness {
    fn new(mic: Mic, recognizer: ScriptedRecognizer, speaker: Speaker, settings: SpeechSettings) -> Self {
        let recognizer = Arc::new(recognizer);
        let speaker = Arc::new(speaker);
        let services = Arc::new(SpeechServices {
            input: Arc::new(mic),
            recognizer: recognizer.clone(),
            synthesizer: speaker.clone(),
            devices: Arc::new(AudioDevices::new()),
            settings,
        });
        let (tx, events) = mpsc::channel(64);
        Self {
            session: SpeechSession::new("conn-1", services, tx),
            events,
            recognizer,
            speaker,
        }
    }

    fn simple(mic: Mic) -> Self {
        Self::new(mic, ScriptedRecognizer::default(), Speaker::default(), settings(4))
    }

    /// Wait for queued units, then take every event emitted so far.
    async fn settle(&mut self) -> Vec<ServerEvent> {
        self.session.flush().await;
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }
}

fn listening_statuses(events: &[ServerEvent]) -> Vec<ListeningStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            ServerEvent::ListeningStatus { status, .. } => Some(*status),
            _ => None,
        })
        .collect()
}

fn speech_statuses(events: &[ServerEvent]) -> Vec<SpeechStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            ServerEvent::SpeechStatus { status, .. } => Some(*status),
            _ => None,
        })
        .collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Listening
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test(start_paused = true)]
async fn silence_times_out_once_then_accepts_another_request() {
    let mut h = Harness::simple(Mic::Silent);

    h.session.start_listening().await;
    let events = h.settle().await;
    assert_eq!(
        listening_statuses(&events),
        vec![ListeningStatus::Listening, ListeningStatus::Timeout]
    );
    assert_eq!(h.session.state(), SpeechState::Idle);

    h.session.start_listening().await;
    let events = h.settle().await;
    assert_eq!(
        listening_statuses(&events),
        vec![ListeningStatus::Listening, ListeningStatus::Timeout]
    );
    assert!(h.recognizer.calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn hung_capture_is_cut_off_at_the_deadline() {
    let mut h = Harness::simple(Mic::Hung);
    let started = tokio::time::Instant::now();

    h.session.start_listening().await;
    let events = h.settle().await;

    assert_eq!(
        listening_statuses(&events),
        vec![ListeningStatus::Listening, ListeningStatus::Timeout]
    );
    assert!(started.elapsed() < Duration::from_secs(20));
    assert_eq!(h.session.state(), SpeechState::Idle);
}

#[tokio::test(start_paused = true)]
async fn recognition_falls_back_from_arabic_to_english() {
    let recognizer = ScriptedRecognizer::default().with("en-US", Ok("turn on the lights"));
    let mut h = Harness::new(Mic::Phrase, recognizer, Speaker::default(), settings(4));

    h.session.handle(ClientEvent::StartListening).await;
    let events = h.settle().await;

    assert_eq!(events.len(), 4);
    assert_eq!(
        listening_statuses(&events),
        vec![
            ListeningStatus::Listening,
            ListeningStatus::Processing,
            ListeningStatus::Success,
        ]
    );
    assert_eq!(
        events[2],
        ServerEvent::SpeechRecognized {
            text: "turn on the lights".into()
        }
    );
    assert_eq!(*h.recognizer.calls.lock(), vec!["ar-SA", "en-US"]);
}

#[tokio::test(start_paused = true)]
async fn arabic_match_skips_english() {
    let recognizer = ScriptedRecognizer::default()
        .with("ar-SA", Ok("مرحبا"))
        .with("en-US", Ok("hello"));
    let mut h = Harness::new(Mic::Phrase, recognizer, Speaker::default(), settings(4));

    h.session.start_listening().await;
    let events = h.settle().await;

    assert!(events.contains(&ServerEvent::SpeechRecognized { text: "مرحبا".into() }));
    assert_eq!(*h.recognizer.calls.lock(), vec!["ar-SA"]);
}

#[tokio::test(start_paused = true)]
async fn failed_attempts_end_in_a_single_error() {
    let recognizer = ScriptedRecognizer::default()
        .with("ar-SA", Err("service unavailable"))
        .with("en-US", Err("service unavailable"));
    let mut h = Harness::new(Mic::Phrase, recognizer, Speaker::default(), settings(4));

    h.session.start_listening().await;
    let events = h.settle().await;

    assert_eq!(
        listening_statuses(&events),
        vec![
            ListeningStatus::Listening,
            ListeningStatus::Processing,
            ListeningStatus::Error,
        ]
    );
    assert_eq!(h.session.state(), SpeechState::Idle);
}

#[tokio::test(start_paused = true)]
async fn calibration_failure_reports_error_and_returns_to_idle() {
    let mut h = Harness::simple(Mic::Broken);

    h.session.start_listening().await;
    let events = h.settle().await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        ServerEvent::ListeningStatus { status, message } => {
            assert_eq!(*status, ListeningStatus::Error);
            assert!(message.contains("no input device"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(h.session.state(), SpeechState::Idle);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Speaking
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test(start_paused = true)]
async fn empty_text_yields_one_error_and_no_transition() {
    let mut h = Harness::simple(Mic::Silent);

    h.session.speak_text(String::new()).await;
    let events = h.settle().await;
    assert_eq!(speech_statuses(&events), vec![SpeechStatus::Error]);
    assert_eq!(events.len(), 1);

    h.session.speak_text("   ".into()).await;
    let events = h.settle().await;
    assert_eq!(speech_statuses(&events), vec![SpeechStatus::Error]);

    assert!(h.speaker.spoken.lock().is_empty());
    assert_eq!(h.session.state(), SpeechState::Idle);
}

#[tokio::test(start_paused = true)]
async fn speaking_reports_speaking_then_completed() {
    let mut h = Harness::simple(Mic::Silent);

    h.session
        .handle(ClientEvent::SpeakText {
            text: "أهلا".into(),
        })
        .await;
    let events = h.settle().await;

    assert_eq!(
        speech_statuses(&events),
        vec![SpeechStatus::Speaking, SpeechStatus::Completed]
    );
    assert_eq!(*h.speaker.spoken.lock(), vec!["أهلا"]);
}

#[tokio::test(start_paused = true)]
async fn synthesis_failure_reports_error() {
    let speaker = Speaker {
        fail: true,
        ..Speaker::default()
    };
    let mut h = Harness::new(Mic::Silent, ScriptedRecognizer::default(), speaker, settings(4));

    h.session.speak_text("hello".into()).await;
    let events = h.settle().await;

    assert_eq!(
        speech_statuses(&events),
        vec![SpeechStatus::Speaking, SpeechStatus::Error]
    );
    assert_eq!(h.session.state(), SpeechState::Idle);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scheduling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test(start_paused = true)]
async fn units_run_in_arrival_order() {
    let speaker = Speaker {
        delay: Duration::from_secs(2),
        ..Speaker::default()
    };
    let mut h = Harness::new(Mic::Silent, ScriptedRecognizer::default(), speaker, settings(4));

    h.session.speak_text("first".into()).await;
    h.session.start_listening().await;
    h.session.speak_text("second".into()).await;
    let events = h.settle().await;

    let kinds: Vec<String> = events
        .iter()
        .map(|e| match e {
            ServerEvent::ListeningStatus { status, .. } => format!("listen:{status:?}"),
            ServerEvent::SpeechStatus { status, .. } => format!("speak:{status:?}"),
            other => format!("{other:?}"),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "speak:Speaking",
            "speak:Completed",
            "listen:Listening",
            "listen:Timeout",
            "speak:Speaking",
            "speak:Completed",
        ]
    );
    assert_eq!(*h.speaker.spoken.lock(), vec!["first", "second"]);
}

#[tokio::test(start_paused = true)]
async fn requests_beyond_the_queue_bound_are_rejected() {
    let speaker = Speaker {
        delay: Duration::from_secs(5),
        ..Speaker::default()
    };
    let mut h = Harness::new(Mic::Silent, ScriptedRecognizer::default(), speaker, settings(1));

    h.session.speak_text("a".into()).await;
    h.session.speak_text("b".into()).await;
    let events = h.settle().await;

    assert_eq!(
        speech_statuses(&events),
        vec![SpeechStatus::Error, SpeechStatus::Speaking, SpeechStatus::Completed]
    );
    assert_eq!(*h.speaker.spoken.lock(), vec!["a"]);
}

/// Counts how many speak calls overlap.
#[derive(Default)]
struct SharedSpeaker {
    active: AtomicUsize,
    peak: AtomicUsize,
    spoken: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl SpeechSynthesizer for SharedSpeaker {
    async fn speak(&self, text: &str) -> Result<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(2)).await;
        self.spoken.lock().push(text.to_string());
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn connections_take_turns_on_the_output_device() {
    let speaker = Arc::new(SharedSpeaker::default());
    let services = Arc::new(SpeechServices {
        input: Arc::new(Mic::Silent),
        recognizer: Arc::new(ScriptedRecognizer::default()),
        synthesizer: speaker.clone(),
        devices: Arc::new(AudioDevices::new()),
        settings: settings(4),
    });
    let (tx_a, mut rx_a) = mpsc::channel(64);
    let (tx_b, mut rx_b) = mpsc::channel(64);
    let a = SpeechSession::new("conn-a", services.clone(), tx_a);
    let b = SpeechSession::new("conn-b", services, tx_b);

    let started = tokio::time::Instant::now();
    a.speak_text("from a".into()).await;
    b.speak_text("from b".into()).await;
    tokio::join!(a.flush(), b.flush());

    assert_eq!(speaker.peak.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() >= Duration::from_secs(4));
    let mut spoken = speaker.spoken.lock().clone();
    spoken.sort();
    assert_eq!(spoken, vec!["from a", "from b"]);

    for rx in [&mut rx_a, &mut rx_b] {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        assert_eq!(
            speech_statuses(&events),
            vec![SpeechStatus::Speaking, SpeechStatus::Completed]
        );
    }
}

#[tokio::test(start_paused = true)]
async fn queue_bound_counts_only_waiting_units() {
    let speaker = Speaker {
        delay: Duration::from_secs(5),
        ..Speaker::default()
    };
    let mut h = Harness::new(Mic::Silent, ScriptedRecognizer::default(), speaker, settings(1));

    h.session.speak_text("running".into()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.session.state(), SpeechState::Speaking);

    h.session.speak_text("waiting".into()).await;
    h.session.speak_text("rejected".into()).await;
    let events = h.settle().await;

    assert_eq!(
        speech_statuses(&events),
        vec![
            SpeechStatus::Speaking,
            SpeechStatus::Error,
            SpeechStatus::Completed,
            SpeechStatus::Speaking,
            SpeechStatus::Completed,
        ]
    );
    assert_eq!(*h.speaker.spoken.lock(), vec!["running", "waiting"]);
}

#[tokio::test(start_paused = true)]
async fn events_after_disconnect_are_suppressed() {
    let speaker = Speaker {
        delay: Duration::from_secs(5),
        ..Speaker::default()
    };
    let mut h = Harness::new(Mic::Silent, ScriptedRecognizer::default(), speaker, settings(4));

    h.session.speak_text("in flight".into()).await;
    h.session.speak_text("queued".into()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.session.state(), SpeechState::Speaking);

    h.session.close();
    let events = h.settle().await;

    assert_eq!(speech_statuses(&events), vec![SpeechStatus::Speaking]);
    assert_eq!(*h.speaker.spoken.lock(), vec!["in flight"]);
    assert_eq!(h.session.state(), SpeechState::Idle);
}

#[tokio::test(start_paused = true)]
async fn announce_and_disabled_services() {
    let mut s = settings(4);
    s.enabled = false;
    let mut h = Harness::new(Mic::Phrase, ScriptedRecognizer::default(), Speaker::default(), s);

    h.session.announce().await;
    h.session.start_listening().await;
    h.session.speak_text("hi".into()).await;
    let events = h.settle().await;

    assert!(matches!(events[0], ServerEvent::Status { .. }));
    assert_eq!(listening_statuses(&events), vec![ListeningStatus::Error]);
    assert_eq!(speech_statuses(&events), vec![SpeechStatus::Error]);
    assert!(h.speaker.spoken.lock().is_empty());
}
