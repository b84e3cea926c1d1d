//! Session controller.
//!
//! Owns the single active session: breath scheduler, noise playback, sleep
//! countdown, spoken cues and the exclusive meditation mode. All timers
//! share one [`Timeline`]; the owner drives it with `advance()` and gets
//! back the events produced along the way. There is no internal thread.
//!
//! Explicit stop, countdown expiry and `Drop` all go through `teardown()`,
//! which cancels every timer and releases every audio handle.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{ControllerSettings, SessionOptions, SessionState};
use crate::audio::{AudioSink, AudioSource, CueSet, Language, PlayOptions, PlaybackId};
use crate::breath::{phase_scale, BreathCycleScheduler, BreathEvent, BreathPhase, BreathTimer};
use crate::error::{AudioError, SessionError};
use crate::events::{Event, StopReason};
use crate::meditation::{self, MeditationPlayer};
use crate::noise::{clamp_volume, NoiseRequest, NoiseSynthesizer};
use crate::rhythm::Rhythm;
use crate::timer::{Countdown, CountdownTick, CountdownTimer, TimerId, Timeline};

/// Payloads on the controller's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTimer {
    Breath(BreathTimer),
    Countdown,
}

impl From<BreathTimer> for SessionTimer {
    fn from(t: BreathTimer) -> Self {
        SessionTimer::Breath(t)
    }
}

impl From<CountdownTimer> for SessionTimer {
    fn from(_: CountdownTimer) -> Self {
        SessionTimer::Countdown
    }
}

#[derive(Debug)]
struct ActiveNoise {
    request: NoiseRequest,
    handle: PlaybackId,
}

pub struct SessionController<S: AudioSink> {
    sink: S,
    settings: ControllerSettings,
    synth: NoiseSynthesizer,
    timeline: Timeline<SessionTimer>,
    scheduler: BreathCycleScheduler,
    countdown: Countdown,
    meditation: MeditationPlayer,
    cues: Option<CueSet>,
    noise: Option<ActiveNoise>,
    options: SessionOptions,
    session_id: Option<Uuid>,
    running: bool,
    outbox: Vec<Event>,
}

impl<S: AudioSink> SessionController<S> {
    pub fn new(sink: S, settings: ControllerSettings) -> Self {
        Self {
            sink,
            synth: NoiseSynthesizer::new(settings.noise_seed),
            settings,
            timeline: Timeline::new(),
            scheduler: BreathCycleScheduler::default(),
            countdown: Countdown::new(),
            meditation: MeditationPlayer::new(),
            cues: None,
            noise: None,
            options: SessionOptions::default(),
            session_id: None,
            running: false,
            outbox: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    /// Timeline time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    /// When the next timer fires, if any is pending.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timeline.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timeline.pending()
    }

    pub fn meditation_track(&self) -> Option<&'static str> {
        self.meditation.active_track()
    }

    pub fn is_noise_playing(&self) -> bool {
        self.noise.is_some()
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            running: self.running,
            phase: self.scheduler.phase(),
            phase_elapsed_secs: self.scheduler.phase_elapsed_secs(),
            phase_total_secs: self.scheduler.phase_total_secs(),
            phase_remaining_secs: self.scheduler.remaining_secs(),
            timer_remaining_secs: self.countdown.remaining_secs(),
            meditation: self.meditation.active_track().map(str::to_string),
        }
    }

    /// Full state snapshot event, including the breathing circle scale.
    pub fn snapshot(&self) -> Event {
        let state = self.state();
        let scale = phase_scale(
            &self.scheduler.rhythm(),
            state.phase,
            state.phase_remaining_secs,
            state.phase_total_secs,
        );
        Event::StateSnapshot {
            state,
            scale,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a session. Any meditation is stopped first.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if a session is active, `InvalidRhythm` if a phase
    /// lasts zero seconds. Neither has side effects. Audio failures are not
    /// errors; they show up as `AudioWarning` events.
    pub fn start(&mut self, options: SessionOptions) -> Result<Vec<Event>, SessionError> {
        if self.running {
            return Err(SessionError::AlreadyRunning);
        }
        options.rhythm.validate()?;

        self.stop_meditation_audio();

        let session_id = Uuid::new_v4();
        self.running = true;
        self.session_id = Some(session_id);
        self.options = SessionOptions {
            noise: options
                .noise
                .map(|n| NoiseRequest::new(n.kind, n.volume)),
            timer_minutes: options.timer_minutes.filter(|&m| m > 0),
            ..options
        };
        tracing::info!(
            %session_id,
            rhythm = ?self.options.rhythm,
            guide = self.options.guide_enabled,
            timer_minutes = ?self.options.timer_minutes,
            "session started"
        );
        self.outbox.push(Event::SessionStarted {
            session_id,
            rhythm: self.options.rhythm,
            guide_enabled: self.options.guide_enabled,
            noise: self.options.noise,
            timer_minutes: self.options.timer_minutes,
            at: Utc::now(),
        });

        if let Some(request) = self.options.noise {
            self.start_noise(request);
        }
        self.scheduler
            .update_rhythm(self.options.rhythm, &mut self.timeline)?;
        if self.options.guide_enabled {
            self.start_guide()?;
        }
        if let Some(minutes) = self.options.timer_minutes {
            self.countdown.arm(minutes, &mut self.timeline);
        }
        Ok(self.drain())
    }

    /// Stop the session. Safe to call at any time.
    pub fn stop(&mut self) -> Vec<Event> {
        self.teardown(StopReason::Manual);
        self.drain()
    }

    /// Advance the timeline by `ms`, firing due timers in order.
    pub fn advance(&mut self, ms: u64) -> Vec<Event> {
        let until = self.timeline.now_ms().saturating_add(ms);
        self.advance_to(until)
    }

    /// Advance the timeline to `until_ms`, firing due timers in order.
    pub fn advance_to(&mut self, until_ms: u64) -> Vec<Event> {
        while let Some((id, timer)) = self.timeline.pop_due(until_ms) {
            self.dispatch(id, timer);
        }
        self.timeline.settle(until_ms);
        self.drain()
    }

    /// Change the rhythm. A running cycle restarts at `Inhale`.
    pub fn update_rhythm(&mut self, rhythm: Rhythm) -> Result<Vec<Event>, SessionError> {
        if let Some(ev) = self.scheduler.update_rhythm(rhythm, &mut self.timeline)? {
            self.on_breath(ev);
        }
        self.options.rhythm = rhythm;
        Ok(self.drain())
    }

    /// Change the noise gain, live if noise is playing.
    pub fn set_volume(&mut self, volume: f32) -> Vec<Event> {
        let volume = clamp_volume(volume);
        if let Some(request) = self.options.noise.as_mut() {
            request.volume = volume;
        }
        let failed = self.noise.as_mut().and_then(|active| {
            active.request.volume = volume;
            self.sink
                .set_volume(active.handle, volume)
                .err()
                .map(|e| (active.request.kind.as_str().to_string(), e))
        });
        if let Some((source, err)) = failed {
            self.audio_failure(source, err);
        }
        self.outbox.push(Event::VolumeChanged { volume });
        self.drain()
    }

    /// Replace the noise selection; a running session switches immediately.
    pub fn set_noise(&mut self, request: Option<NoiseRequest>) -> Vec<Event> {
        let request = request.map(|n| NoiseRequest::new(n.kind, n.volume));
        self.options.noise = request;
        if self.running {
            self.stop_noise();
            if let Some(request) = request {
                self.start_noise(request);
            }
        }
        self.drain()
    }

    /// Turn breath guidance on or off while running.
    pub fn set_guide_enabled(&mut self, enabled: bool) -> Result<Vec<Event>, SessionError> {
        self.options.guide_enabled = enabled;
        if self.running {
            if enabled && !self.scheduler.is_running() {
                self.start_guide()?;
            } else if !enabled {
                self.scheduler.stop(&mut self.timeline);
                self.cues = None;
            }
        }
        Ok(self.drain())
    }

    /// Switch cue language. A guided session reloads cues and restarts the cycle.
    pub fn set_language(&mut self, language: Language) -> Result<Vec<Event>, SessionError> {
        self.options.language = language;
        if self.running && self.options.guide_enabled {
            self.start_guide()?;
        }
        Ok(self.drain())
    }

    /// Re-arm or disarm the sleep countdown. `Some(0)` disarms.
    pub fn set_timer(&mut self, minutes: Option<u32>) -> Vec<Event> {
        let minutes = minutes.filter(|&m| m > 0);
        self.options.timer_minutes = minutes;
        if self.running {
            match minutes {
                Some(m) => self.countdown.arm(m, &mut self.timeline),
                None => {
                    self.countdown.cancel(&mut self.timeline);
                }
            }
        }
        self.drain()
    }

    /// Play a meditation track, stopping the breathing session first.
    pub fn start_meditation(&mut self, track_id: &str) -> Result<Vec<Event>, SessionError> {
        let track = meditation::track(track_id)
            .ok_or_else(|| SessionError::UnknownMeditationTrack(track_id.to_string()))?;

        self.teardown(StopReason::Meditation);
        self.stop_meditation_audio();

        let root = self.settings.asset_root.clone();
        let failures = self.meditation.start(track, &root, &mut self.sink);
        for (source, err) in failures {
            self.audio_failure(source, err);
        }
        tracing::info!(track = track.id, "meditation started");
        self.outbox.push(Event::MeditationStarted {
            track_id: track.id.to_string(),
            at: Utc::now(),
        });
        Ok(self.drain())
    }

    pub fn stop_meditation(&mut self) -> Vec<Event> {
        self.stop_meditation_audio();
        self.drain()
    }

    /// Stop `track_id` if it is playing, otherwise switch to it.
    pub fn toggle_meditation(&mut self, track_id: &str) -> Result<Vec<Event>, SessionError> {
        if self.meditation.active_track() == Some(track_id) {
            return Ok(self.stop_meditation());
        }
        self.start_meditation(track_id)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispatch(&mut self, id: TimerId, timer: SessionTimer) {
        match timer {
            SessionTimer::Breath(t) => {
                if let Some(ev) = self.scheduler.on_timer(id, t, &mut self.timeline) {
                    self.on_breath(ev);
                }
            }
            SessionTimer::Countdown => match self.countdown.on_tick(id, &mut self.timeline) {
                Some(CountdownTick::Running { remaining_secs }) => {
                    tracing::debug!(remaining_secs, "countdown tick");
                    self.outbox.push(Event::CountdownTick {
                        remaining_secs,
                        at_ms: self.timeline.now_ms(),
                    });
                }
                Some(CountdownTick::Expired) => {
                    self.outbox.push(Event::CountdownTick {
                        remaining_secs: 0,
                        at_ms: self.timeline.now_ms(),
                    });
                    self.teardown(StopReason::TimerExpired);
                }
                None => {}
            },
        }
    }

    fn on_breath(&mut self, ev: BreathEvent) {
        match ev {
            BreathEvent::PhaseStarted {
                phase,
                duration_secs,
                cycle,
                at_ms,
            } => {
                self.play_cue(phase);
                self.outbox.push(Event::PhaseStarted {
                    phase,
                    duration_secs,
                    cycle,
                    at_ms,
                });
            }
            BreathEvent::PhaseTick {
                phase,
                remaining_secs,
                at_ms,
            } => self.outbox.push(Event::PhaseTick {
                phase,
                remaining_secs,
                at_ms,
            }),
        }
    }

    /// (Re)load cues for the current language and restart the cycle.
    fn start_guide(&mut self) -> Result<(), SessionError> {
        self.cues = Some(CueSet::new(self.options.language, &self.settings.asset_root));
        let ev = self.scheduler.start(self.options.rhythm, &mut self.timeline)?;
        self.on_breath(ev);
        Ok(())
    }

    fn play_cue(&mut self, phase: BreathPhase) {
        let Some(source) = self.cues.as_ref().and_then(|c| c.for_phase(phase)).cloned() else {
            return;
        };
        if let Err(e) = self.sink.play(&source, PlayOptions::once(self.settings.cue_volume)) {
            self.audio_failure(source.describe(), e);
        }
    }

    fn start_noise(&mut self, request: NoiseRequest) {
        let source = match request.kind.track_path() {
            Some(rel) => AudioSource::File(self.settings.asset_root.join(rel)),
            None => {
                let rendered = self.synth.render(
                    request.kind,
                    self.settings.sample_rate,
                    self.settings.noise_buffer_secs,
                );
                match rendered {
                    Some(Ok(buffer)) => AudioSource::Buffer(Arc::new(buffer)),
                    Some(Err(e)) => {
                        self.audio_warning(request.kind.as_str().to_string(), e.to_string());
                        return;
                    }
                    None => return,
                }
            }
        };

        match self.sink.play(&source, PlayOptions::looped(request.volume)) {
            Ok(handle) => {
                self.noise = Some(ActiveNoise { request, handle });
                self.outbox.push(Event::NoiseStarted {
                    kind: request.kind,
                    volume: request.volume,
                });
            }
            Err(e) => self.audio_failure(source.describe(), e),
        }
    }

    fn stop_noise(&mut self) {
        let Some(active) = self.noise.take() else {
            return;
        };
        if let Err(e) = self.sink.stop(active.handle) {
            self.audio_failure(active.request.kind.as_str().to_string(), e);
        }
        self.outbox.push(Event::NoiseStopped {
            kind: active.request.kind,
        });
    }

    fn stop_meditation_audio(&mut self) {
        let Some(track_id) = self.meditation.active_track() else {
            return;
        };
        for (source, err) in self.meditation.stop(&mut self.sink) {
            self.audio_failure(source, err);
        }
        tracing::info!(track = track_id, "meditation stopped");
        self.outbox.push(Event::MeditationStopped {
            track_id: track_id.to_string(),
            at: Utc::now(),
        });
    }

    /// The one stop routine. Cancels scheduler and countdown timers, stops
    /// noise and drops cues. Emits `SessionStopped` only if a session was
    /// running, so repeated calls are no-ops.
    fn teardown(&mut self, reason: StopReason) -> bool {
        self.scheduler.stop(&mut self.timeline);
        self.countdown.cancel(&mut self.timeline);
        self.stop_noise();
        self.cues = None;

        if !self.running {
            return false;
        }
        self.running = false;
        let session_id = self.session_id.take();
        tracing::info!(?session_id, ?reason, "session stopped");
        self.outbox.push(Event::SessionStopped {
            session_id,
            reason,
            at: Utc::now(),
        });
        true
    }

    /// A sink failure never aborts the session; it is reported as
    /// [`SessionError::AudioUnavailable`] inside an `AudioWarning`.
    fn audio_failure(&mut self, source: String, err: AudioError) {
        let err = SessionError::from(err);
        self.audio_warning(source, err.to_string());
    }

    fn audio_warning(&mut self, source: String, message: String) {
        tracing::warn!(%source, %message, "audio unavailable, continuing without it");
        self.outbox.push(Event::AudioWarning {
            source,
            message,
            at_ms: self.timeline.now_ms(),
        });
    }

    fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }
}

impl<S: AudioSink> Drop for SessionController<S> {
    fn drop(&mut self) {
        self.teardown(StopReason::Teardown);
        self.stop_meditation_audio();
    }
}
