//! Speech playback controller
//!
//! Owns the lazily opened output context and the single "currently speaking"
//! message id.
//!
//! State machine: Idle → Playing → Idle. Playing ends on natural completion,
//! or immediately on any synthesis, decode, or device failure.
//!
//! The active id is cooperative UI state, not a playback lock: a play for a
//! different message is submitted alongside whatever is already sounding and
//! simply becomes the active one. Only a repeat request for the message that
//! is already active is ignored. The check and the set happen under one lock
//! so two concurrent requests for the same id cannot both pass.

use crate::audio::{decode, Completion, DeviceOpener, OutputDevice};
use crate::error::{Error, Result};
use crate::speech::{PlaybackState, SpeechSynthesizer};
use crate::state::SharedState;
use std::sync::{Arc, Mutex};
use tgai_common::events::GuideEvent;
use tgai_common::time;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// PCM layout of synthesized payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: decode::DEFAULT_SAMPLE_RATE,
            channels: decode::DEFAULT_CHANNELS,
        }
    }
}

/// Result of a `play` call that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Audio was submitted to the output device
    Started { frames: usize, duration_ms: u64 },
    /// The same message is already active; nothing was done
    AlreadyPlaying,
}

/// Speech playback controller
pub struct SpeechController {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    opener: Arc<dyn DeviceOpener>,
    output: OnceCell<Arc<dyn OutputDevice>>,
    active: Arc<Mutex<Option<String>>>,
    state: Arc<SharedState>,
    format: PcmFormat,
}

impl SpeechController {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        opener: Box<dyn DeviceOpener>,
        state: Arc<SharedState>,
        format: PcmFormat,
    ) -> Self {
        Self {
            synthesizer,
            opener: Arc::from(opener),
            output: OnceCell::new(),
            active: Arc::new(Mutex::new(None)),
            state,
            format,
        }
    }

    /// Message currently considered "speaking", if any
    pub fn active_id(&self) -> Option<String> {
        lock(&self.active).clone()
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_active(self.active_id())
    }

    /// True once the output context has been opened
    pub fn output_opened(&self) -> bool {
        self.output.initialized()
    }

    /// Synthesize `text` and play it as `message_id`.
    ///
    /// Every failure clears the active id (if still ours), broadcasts
    /// `SpeechFailed`, and is returned as `Err`.
    pub async fn play(&self, text: &str, message_id: &str) -> Result<PlayOutcome> {
        if !self.try_activate(message_id) {
            debug!(message_id, "Already speaking this message, ignoring");
            return Ok(PlayOutcome::AlreadyPlaying);
        }

        match self.start(text).await {
            Ok((completion, frames, duration_ms)) => {
                info!(message_id, frames, duration_ms, "Speech playback started");
                self.state.broadcast_event(GuideEvent::SpeechStarted {
                    message_id: message_id.to_string(),
                    frames,
                    duration_ms,
                    timestamp: time::now(),
                });
                self.watch_completion(message_id.to_string(), completion);
                Ok(PlayOutcome::Started { frames, duration_ms })
            }
            Err(e) => {
                warn!(message_id, "Speech playback failed: {}", e);
                release(&self.active, message_id);
                self.state.broadcast_event(GuideEvent::SpeechFailed {
                    message_id: message_id.to_string(),
                    error: e.to_string(),
                    timestamp: time::now(),
                });
                Err(e)
            }
        }
    }

    /// Set the active id unless it already equals `message_id`
    fn try_activate(&self, message_id: &str) -> bool {
        let mut active = lock(&self.active);
        if active.as_deref() == Some(message_id) {
            return false;
        }
        *active = Some(message_id.to_string());
        true
    }

    async fn start(&self, text: &str) -> Result<(Completion, usize, u64)> {
        let output = self
            .output
            .get_or_try_init(|| async {
                info!("Opening audio output context");
                // Device enumeration blocks
                let opener = Arc::clone(&self.opener);
                tokio::task::spawn_blocking(move || opener.open())
                    .await
                    .map_err(|e| Error::PlaybackDevice(format!("Device open task failed: {}", e)))?
            })
            .await?;

        let payload = self
            .synthesizer
            .synthesize(text)
            .await
            .map_err(|e| match e {
                Error::Synthesis(_) => e,
                other => Error::Synthesis(other.to_string()),
            })?
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Error::Synthesis("Synthesis returned no audio".to_string()))?;

        let buffer = decode::decode_audio(&payload, self.format.sample_rate, self.format.channels)?;
        if buffer.is_empty() {
            return Err(Error::Decode("Audio payload contains no complete frames".to_string()));
        }

        let frames = buffer.frame_count();
        let duration_ms = buffer.duration_ms();
        let completion = output.submit(buffer).await?;

        Ok((completion, frames, duration_ms))
    }

    fn watch_completion(&self, message_id: String, completion: Completion) {
        let active = Arc::clone(&self.active);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let result = completion.wait().await;
            release(&active, &message_id);

            match result {
                Ok(()) => {
                    debug!(message_id = %message_id, "Speech playback finished");
                    state.broadcast_event(GuideEvent::SpeechFinished {
                        message_id,
                        timestamp: time::now(),
                    });
                }
                Err(e) => {
                    warn!(message_id = %message_id, "Speech playback ended with error: {}", e);
                    state.broadcast_event(GuideEvent::SpeechFailed {
                        message_id,
                        error: e.to_string(),
                        timestamp: time::now(),
                    });
                }
            }
        });
    }
}

/// Clear the active id if it still names `message_id`
fn release(active: &Mutex<Option<String>>, message_id: &str) {
    let mut active = lock(active);
    if active.as_deref() == Some(message_id) {
        *active = None;
    }
}

/// Poisoning only means another holder panicked; the Option is still valid
fn lock(active: &Mutex<Option<String>>) -> std::sync::MutexGuard<'_, Option<String>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
