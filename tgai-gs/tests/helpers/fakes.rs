//! In-memory collaborators for the speech controller
//!
//! - FakeSynthesizer: scripted payloads, call counting, optional gate
//! - FakeDevice: records submitted buffers, completions fired by the test
//! - CountingOpener: counts output context opens

use async_trait::async_trait;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tgai_gs::audio::{AudioBuffer, Completion, DeviceOpener, OutputDevice};
use tgai_gs::speech::SpeechSynthesizer;
use tgai_gs::{Error, Result};
use tokio::sync::{oneshot, Notify};

/// Base64 of little-endian PCM16 samples
pub fn pcm_payload(samples: &[i16]) -> String {
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// What the fake synthesizer answers with
#[derive(Debug, Clone)]
pub enum Script {
    Payload(String),
    NoAudio,
    Fail(String),
}

pub struct FakeSynthesizer {
    calls: AtomicUsize,
    scripted: Mutex<VecDeque<Script>>,
    fallback: Script,
    gate: Option<Arc<Notify>>,
}

impl FakeSynthesizer {
    /// Always answers with `samples`
    pub fn returning(samples: &[i16]) -> Self {
        Self::with_fallback(Script::Payload(pcm_payload(samples)))
    }

    pub fn with_fallback(fallback: Script) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            scripted: Mutex::new(VecDeque::new()),
            fallback,
            gate: None,
        }
    }

    /// Answers are held until the gate is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queue a one-off answer ahead of the fallback
    pub fn push(&self, script: Script) {
        self.scripted.lock().unwrap().push_back(script);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _text: &str) -> Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let script = self
            .scripted
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match script {
            Script::Payload(p) => Ok(Some(p)),
            Script::NoAudio => Ok(None),
            Script::Fail(msg) => Err(Error::Network(msg)),
        }
    }
}

#[derive(Default)]
pub struct FakeDevice {
    buffers: Mutex<Vec<AudioBuffer>>,
    pending: Mutex<Vec<Option<oneshot::Sender<Result<()>>>>>,
    fail_submit: AtomicBool,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next_submit(&self) {
        self.fail_submit.store(true, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }

    pub fn buffer(&self, index: usize) -> AudioBuffer {
        self.buffers.lock().unwrap()[index].clone()
    }

    /// Fire the completion of submission `index`
    pub fn finish(&self, index: usize, result: Result<()>) {
        let tx = self.pending.lock().unwrap()[index]
            .take()
            .expect("completion already fired");
        let _ = tx.send(result);
    }

    /// Drop the completion sender of submission `index` without firing it
    pub fn abandon(&self, index: usize) {
        self.pending.lock().unwrap()[index].take();
    }
}

#[async_trait]
impl OutputDevice for FakeDevice {
    async fn submit(&self, buffer: AudioBuffer) -> Result<Completion> {
        if self.fail_submit.swap(false, Ordering::SeqCst) {
            return Err(Error::PlaybackDevice("device unplugged".to_string()));
        }
        let (tx, completion) = Completion::channel();
        self.buffers.lock().unwrap().push(buffer);
        self.pending.lock().unwrap().push(Some(tx));
        Ok(completion)
    }
}

pub struct CountingOpener {
    device: Arc<FakeDevice>,
    opens: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
    open_delay: Option<Duration>,
}

impl CountingOpener {
    pub fn new(device: Arc<FakeDevice>) -> (Self, Arc<AtomicUsize>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let opener = Self {
            device,
            opens: Arc::clone(&opens),
            failures_left: AtomicUsize::new(0),
            open_delay: None,
        };
        (opener, opens)
    }

    /// Each open blocks the calling thread for `delay`, like slow device enumeration
    pub fn blocking_for(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// First `n` opens fail
    pub fn failing(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }
}

impl DeviceOpener for CountingOpener {
    fn open(&self) -> Result<Arc<dyn OutputDevice>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.open_delay {
            std::thread::sleep(delay);
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::PlaybackDevice("no output device".to_string()));
        }
        let device: Arc<dyn OutputDevice> = self.device.clone();
        Ok(device)
    }
}
