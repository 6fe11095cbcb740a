//! Audio note scheduler
//!
//! Gameplay events become notes on a background thread. Every call here
//! returns immediately: a busy melody, a full slot pool or a missing
//! device are reported as a [`Dispatch`] and never block the game loop.

pub mod output;
pub mod scales;
pub mod slots;
mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::AudioSettings;
pub use output::{LogOutput, NoteEvent, NoteOutput, OutputFactory, RecordingOutput};
use scales::{GAME_OVER_NOTES, POWER_UP_NOTE, melody_duration, melody_velocity, scale, scale_tier};
pub use slots::NoteSlots;
use slots::FlightGuard;
use worker::{Command, NoteJob, NoteKind, Worker};

/// What happened to a note request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handed to the scheduler
    Queued,
    /// A melody note is still sounding
    Busy,
    /// Every note slot is taken
    Dropped,
    /// No output, muted, or shut down
    Disabled,
}

/// Handle to a running scheduler thread
struct WorkerHandle {
    commands: Sender<Command>,
    done: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Start the scheduler and wait for its output to open
    fn spawn(factory: &OutputFactory, open_timeout: Duration) -> Option<Self> {
        let (commands_tx, commands_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let factory = Arc::clone(factory);

        let spawned = thread::Builder::new()
            .name("note-scheduler".into())
            .spawn(move || {
                let Some(output) = factory() else {
                    let _ = ready_tx.send(false);
                    return;
                };
                let _ = ready_tx.send(true);
                Worker::new(output).run(commands_rx, done_tx);
            });
        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => {
                log::warn!("Failed to start note scheduler - audio disabled: {}", err);
                return None;
            }
        };

        match ready_rx.recv_timeout(open_timeout) {
            Ok(true) => Some(Self {
                commands: commands_tx,
                done: done_rx,
                thread: Some(thread),
            }),
            Ok(false) | Err(RecvTimeoutError::Disconnected) => {
                log::warn!("No audio output available - audio disabled");
                None
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Audio output took too long to open - audio disabled");
                None
            }
        }
    }

    /// Ask the thread to finish up and wait at most `grace` for it.
    /// Past the deadline the thread is told to stop now and left behind.
    fn drain(mut self, cancel_queued: bool, grace: Duration) -> bool {
        let _ = self.commands.send(Command::Drain { cancel_queued });
        match self.done.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                let _ = self.commands.send(Command::Abort);
                log::warn!("Note scheduler did not stop within {:?}; detaching it", grace);
                false
            }
        }
    }
}

/// Owns the output channel, the note-slot pool and the melody cursor
pub struct AudioEngine {
    settings: AudioSettings,
    factory: Option<OutputFactory>,
    worker: Option<WorkerHandle>,
    slots: Arc<NoteSlots>,
    melody_in_flight: Arc<AtomicBool>,
    cursor: usize,
    last_tier: Option<usize>,
    next_job: u64,
}

impl AudioEngine {
    /// Start the scheduler with outputs from `factory`. A factory that
    /// yields no output leaves the engine disabled.
    pub fn new(settings: AudioSettings, factory: OutputFactory) -> Self {
        let mut engine = Self::build(settings, Some(factory));
        engine.start_worker();
        engine
    }

    /// An engine that never plays anything
    pub fn silent(settings: AudioSettings) -> Self {
        Self::build(settings, None)
    }

    fn build(settings: AudioSettings, factory: Option<OutputFactory>) -> Self {
        let slots = NoteSlots::new(settings.max_active_notes.max(1));
        Self {
            settings,
            factory,
            worker: None,
            slots,
            melody_in_flight: Arc::new(AtomicBool::new(false)),
            cursor: 0,
            last_tier: None,
            next_job: 0,
        }
    }

    fn start_worker(&mut self) {
        if !self.settings.enabled {
            log::info!("Audio disabled in settings");
            return;
        }
        let Some(factory) = &self.factory else {
            return;
        };
        self.worker = WorkerHandle::spawn(factory, self.settings.reset_grace());
        if self.worker.is_some() {
            log::info!("Audio engine started ({} note slots)", self.slots.max());
        }
    }

    /// A scheduler is running
    pub fn is_enabled(&self) -> bool {
        self.worker.is_some()
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        if muted {
            self.send(Command::Silence { cancel_melody: true });
        }
    }

    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, volume: f32) {
        self.settings.master_volume = volume.clamp(0.0, 1.0);
    }

    /// Note executions currently holding a slot
    pub fn notes_in_flight(&self) -> usize {
        self.slots.in_flight()
    }

    /// Next melody position in the current scale
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Play the next melody note of the scale for `score`
    pub fn request_note(&mut self, score: u32) -> Dispatch {
        if !self.can_play() {
            return Dispatch::Disabled;
        }
        if self.melody_in_flight.load(Ordering::Acquire) {
            log::trace!("Melody note still sounding; request skipped");
            return Dispatch::Busy;
        }

        let tier = scale_tier(score);
        if self.last_tier != Some(tier) {
            self.send(Command::Silence { cancel_melody: true });
            self.last_tier = Some(tier);
            self.cursor = 0;
        }

        let notes = scale(tier);
        let cursor = self.cursor;
        self.cursor = (cursor + 1) % notes.len();

        let Some(slot) = self.slots.try_acquire() else {
            log::trace!("Melody note dropped: all {} slots busy", self.slots.max());
            return Dispatch::Dropped;
        };
        let job = NoteJob {
            id: self.next_job_id(),
            kind: NoteKind::Melody,
            note: notes[cursor],
            velocity: self.settings.scale_velocity(melody_velocity(cursor, &self.settings)),
            duration: melody_duration(cursor, &self.settings),
            slots: Arc::clone(&self.slots),
            slot: Some(slot),
            flight: Some(FlightGuard::raise(&self.melody_in_flight)),
        };
        self.schedule(Duration::ZERO, job)
    }

    /// Stop whatever is sounding and play the power-up note
    pub fn play_power_up_sound(&mut self) -> Dispatch {
        if !self.can_play() {
            return Dispatch::Disabled;
        }
        self.send(Command::Silence { cancel_melody: false });

        let Some(slot) = self.slots.try_acquire() else {
            log::trace!("Power-up note dropped: all {} slots busy", self.slots.max());
            return Dispatch::Dropped;
        };
        let job = NoteJob {
            id: self.next_job_id(),
            kind: NoteKind::Effect,
            note: POWER_UP_NOTE,
            velocity: self.settings.scale_velocity(self.settings.velocity_loud),
            duration: Duration::from_millis(self.settings.power_up_note_ms),
            slots: Arc::clone(&self.slots),
            slot: Some(slot),
            flight: None,
        };
        self.schedule(Duration::ZERO, job)
    }

    /// Stop everything and play the game-over notes one after another.
    /// Each note claims its slot when it comes due.
    pub fn play_game_over_sequence(&mut self) -> Dispatch {
        if !self.can_play() {
            return Dispatch::Disabled;
        }
        self.send(Command::Silence { cancel_melody: true });

        let spacing = Duration::from_millis(self.settings.sequence_spacing_ms);
        let mut dispatch = Dispatch::Queued;
        for (i, &note) in GAME_OVER_NOTES.iter().enumerate() {
            let job = NoteJob {
                id: self.next_job_id(),
                kind: NoteKind::Effect,
                note,
                velocity: self.settings.scale_velocity(self.settings.velocity_loud),
                duration: Duration::from_millis(self.settings.sequence_note_ms),
                slots: Arc::clone(&self.slots),
                slot: None,
                flight: None,
            };
            dispatch = self.schedule(spacing * i as u32, job);
        }
        dispatch
    }

    /// Cancel queued notes, let the sounding one finish within the grace
    /// period, then start over with a fresh channel, an empty slot pool and
    /// the cursor at zero.
    pub fn reset(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.drain(true, self.settings.reset_grace());
        }

        // A detached worker keeps the old pool; new notes use a fresh one
        self.slots = NoteSlots::new(self.settings.max_active_notes.max(1));
        self.melody_in_flight = Arc::new(AtomicBool::new(false));
        self.cursor = 0;
        self.last_tier = None;

        self.start_worker();
        log::info!("Audio engine reset");
    }

    /// Play out queued effect notes (such as the game-over sequence) within
    /// the shutdown grace period, then stop. Later calls are no-ops.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.drain(false, self.settings.shutdown_grace()) {
                log::info!("Audio engine stopped");
            }
        }
    }

    fn can_play(&self) -> bool {
        self.worker.is_some() && self.settings.audible()
    }

    fn next_job_id(&mut self) -> u64 {
        self.next_job += 1;
        self.next_job
    }

    fn schedule(&mut self, delay: Duration, job: NoteJob) -> Dispatch {
        if self.send(Command::Schedule { delay, job }) {
            Dispatch::Queued
        } else {
            Dispatch::Disabled
        }
    }

    /// Returns false (and disables the engine) if the scheduler is gone
    fn send(&mut self, command: Command) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };
        if worker.commands.send(command).is_err() {
            log::warn!("Note scheduler disconnected - audio disabled");
            self.worker = None;
            return false;
        }
        true
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
