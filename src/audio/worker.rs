//! Note scheduler thread
//!
//! Owns the output channel. Commands arrive over an mpsc channel; delayed
//! work waits in a min-heap keyed by due time. Notes share one channel, so
//! a note that comes due while another is sounding starts when the channel
//! frees up.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use super::output::NoteOutput;
use super::slots::{FlightGuard, NoteSlots, SlotGuard};

/// Which path requested a note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NoteKind {
    /// Bounce melody (cancelled on tier change)
    Melody,
    /// Power-up and game-over notes
    Effect,
}

/// One note waiting to start or sounding
#[derive(Debug)]
pub(crate) struct NoteJob {
    pub id: u64,
    pub kind: NoteKind,
    pub note: u8,
    pub velocity: u8,
    pub duration: Duration,
    /// Pool to claim from at start time when no slot was taken up front
    pub slots: Arc<NoteSlots>,
    pub slot: Option<SlotGuard>,
    pub flight: Option<FlightGuard>,
}

#[derive(Debug)]
pub(crate) enum Command {
    /// Start `job` after `delay`
    Schedule { delay: Duration, job: NoteJob },
    /// Stop everything sounding; optionally drop queued melody notes
    Silence { cancel_melody: bool },
    /// Let the sounding note finish, then exit. Queued melody notes are
    /// dropped; other queued notes play out unless `cancel_queued`.
    /// Later `Schedule` commands are ignored.
    Drain { cancel_queued: bool },
    /// Cancel queued work, silence and exit now
    Abort,
}

#[derive(Debug)]
enum Action {
    Start(NoteJob),
    End(NoteJob),
}

#[derive(Debug)]
struct Pending {
    due: Instant,
    seq: u64,
    action: Action,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    // Reversed: BinaryHeap pops the earliest due first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub(crate) struct Worker {
    output: Box<dyn NoteOutput>,
    queue: BinaryHeap<Pending>,
    seq: u64,
    channel_free_at: Instant,
    /// Job currently holding the channel
    sounding: Option<u64>,
}

impl Worker {
    pub fn new(output: Box<dyn NoteOutput>) -> Self {
        Self {
            output,
            queue: BinaryHeap::new(),
            seq: 0,
            channel_free_at: Instant::now(),
            sounding: None,
        }
    }

    /// Process commands until drained, aborted, or every sender is gone
    pub fn run(mut self, commands: Receiver<Command>, done: Sender<()>) {
        let mut draining = false;
        loop {
            self.fire_due(Instant::now());
            if draining && self.queue.is_empty() {
                break;
            }

            let command = match self.queue.peek() {
                Some(next) => {
                    let wait = next.due.saturating_duration_since(Instant::now());
                    match commands.recv_timeout(wait) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match commands.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            match command {
                Command::Schedule { job, .. } if draining => {
                    log::trace!("Note {} ignored: scheduler is draining", job.note);
                }
                Command::Schedule { delay, job } => {
                    let due = Instant::now() + delay;
                    self.push(due, Action::Start(job));
                }
                Command::Silence { cancel_melody } => self.silence(cancel_melody),
                Command::Drain { cancel_queued } => {
                    draining = true;
                    if cancel_queued {
                        self.queue
                            .retain(|pending| matches!(pending.action, Action::End(_)));
                    } else {
                        self.cancel_melody();
                    }
                    log::debug!("Note scheduler draining ({} pending)", self.queue.len());
                }
                Command::Abort => break,
            }
        }

        // Dropping queued jobs releases their slots
        let cancelled = self.queue.len();
        self.queue.clear();
        self.output.all_notes_off();
        log::debug!("Note scheduler stopped ({} pending cancelled)", cancelled);
        let _ = done.send(());
    }

    fn push(&mut self, due: Instant, action: Action) {
        self.seq += 1;
        self.queue.push(Pending {
            due,
            seq: self.seq,
            action,
        });
    }

    fn fire_due(&mut self, now: Instant) {
        while self.queue.peek().is_some_and(|next| next.due <= now) {
            let Some(pending) = self.queue.pop() else {
                break;
            };
            match pending.action {
                Action::Start(job) => self.start(job, now),
                Action::End(job) => self.end(job),
            }
        }
    }

    fn start(&mut self, mut job: NoteJob, now: Instant) {
        if job.slot.is_none() {
            match job.slots.try_acquire() {
                Some(slot) => job.slot = Some(slot),
                None => {
                    log::trace!("Note {} dropped: all {} slots busy", job.note, job.slots.max());
                    return;
                }
            }
        }

        // Wait for the channel
        if self.channel_free_at > now {
            let free_at = self.channel_free_at;
            self.push(free_at, Action::Start(job));
            return;
        }

        self.output.all_notes_off();
        self.output.note_on(job.note, job.velocity);
        log::trace!("Note {} on (vel {}, {:?})", job.note, job.velocity, job.duration);

        let end = now + job.duration;
        self.channel_free_at = end;
        self.sounding = Some(job.id);
        self.push(end, Action::End(job));
    }

    fn end(&mut self, job: NoteJob) {
        // A silenced note may have been replaced already
        if self.sounding == Some(job.id) {
            self.output.note_off(job.note);
            self.sounding = None;
        }
        // Dropping the job releases its slot and flight flag
    }

    fn silence(&mut self, cancel_melody: bool) {
        self.output.all_notes_off();
        self.sounding = None;
        self.channel_free_at = Instant::now();

        if cancel_melody {
            self.cancel_melody();
        }
    }

    /// Drop melody notes that have not started; sounding notes keep their end
    fn cancel_melody(&mut self) {
        self.queue.retain(|pending| {
            !matches!(&pending.action, Action::Start(job) if job.kind == NoteKind::Melody)
        });
    }
}
