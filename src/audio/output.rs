//! Note sinks
//!
//! The scheduler talks to a single output channel through [`NoteOutput`].
//! Outputs are built on the scheduler thread by an [`OutputFactory`], so
//! they don't need to be `Send`.

use std::sync::{Arc, Mutex, PoisonError};

/// A single MIDI-like output channel
pub trait NoteOutput {
    fn note_on(&mut self, note: u8, velocity: u8);
    fn note_off(&mut self, note: u8);
    fn all_notes_off(&mut self);
}

/// Opens an output on the scheduler thread; `None` means no device
pub type OutputFactory = Arc<dyn Fn() -> Option<Box<dyn NoteOutput>> + Send + Sync>;

/// Logs notes instead of playing them
#[derive(Debug, Default)]
pub struct LogOutput;

impl NoteOutput for LogOutput {
    fn note_on(&mut self, note: u8, velocity: u8) {
        log::trace!("note on {} vel {}", note, velocity);
    }

    fn note_off(&mut self, note: u8) {
        log::trace!("note off {}", note);
    }

    fn all_notes_off(&mut self) {
        log::trace!("all notes off");
    }
}

/// Something an output was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    On { note: u8, velocity: u8 },
    Off { note: u8 },
    AllOff,
}

/// Records every call; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct RecordingOutput {
    events: Arc<Mutex<Vec<NoteEvent>>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far
    pub fn events(&self) -> Vec<NoteEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notes started so far, in order
    pub fn notes_played(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NoteEvent::On { note, .. } => Some(note),
                _ => None,
            })
            .collect()
    }

    /// A factory handing out clones of this recorder
    pub fn factory(&self) -> OutputFactory {
        let recorder = self.clone();
        Arc::new(move || Some(Box::new(recorder.clone()) as Box<dyn NoteOutput>))
    }

    fn push(&self, event: NoteEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl NoteOutput for RecordingOutput {
    fn note_on(&mut self, note: u8, velocity: u8) {
        self.push(NoteEvent::On { note, velocity });
    }

    fn note_off(&mut self, note: u8) {
        self.push(NoteEvent::Off { note });
    }

    fn all_notes_off(&mut self) {
        self.push(NoteEvent::AllOff);
    }
}

/// Output that logs every note
pub fn log_factory() -> OutputFactory {
    Arc::new(|| Some(Box::new(LogOutput) as Box<dyn NoteOutput>))
}

/// A factory whose device never opens
pub fn unavailable_factory() -> OutputFactory {
    Arc::new(|| -> Option<Box<dyn NoteOutput>> { None })
}

/// Best output for this build: sine voices through rodio
#[cfg(feature = "rodio-output")]
pub fn default_factory() -> OutputFactory {
    Arc::new(|| match rodio_output::RodioOutput::new() {
        Ok(output) => Some(Box::new(output) as Box<dyn NoteOutput>),
        Err(err) => {
            log::warn!("Failed to open audio device - audio disabled: {}", err);
            None
        }
    })
}

/// Best output for this build: logging only
#[cfg(not(feature = "rodio-output"))]
pub fn default_factory() -> OutputFactory {
    log_factory()
}

#[cfg(feature = "rodio-output")]
pub use rodio_output::RodioOutput;

#[cfg(feature = "rodio-output")]
mod rodio_output {
    use std::collections::HashMap;

    use rodio::source::SineWave;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::NoteOutput;
    use crate::audio::scales::midi_to_hz;

    /// Peak amplitude of a full-velocity voice
    const VOICE_GAIN: f32 = 0.2;

    /// Sine voices on the default device, one sink per sounding note
    pub struct RodioOutput {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        voices: HashMap<u8, Sink>,
    }

    impl RodioOutput {
        pub fn new() -> Result<Self, rodio::StreamError> {
            let (stream, handle) = OutputStream::try_default()?;
            Ok(Self {
                _stream: stream,
                handle,
                voices: HashMap::new(),
            })
        }
    }

    impl NoteOutput for RodioOutput {
        fn note_on(&mut self, note: u8, velocity: u8) {
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.set_volume(VOICE_GAIN * velocity as f32 / 127.0);
                    sink.append(SineWave::new(midi_to_hz(note)));
                    // Replacing a sink stops the old voice
                    self.voices.insert(note, sink);
                }
                Err(err) => log::warn!("Failed to start voice {}: {}", note, err),
            }
        }

        fn note_off(&mut self, note: u8) {
            if let Some(sink) = self.voices.remove(&note) {
                sink.stop();
            }
        }

        fn all_notes_off(&mut self) {
            for (_, sink) in self.voices.drain() {
                sink.stop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_clones_share_log() {
        let recorder = RecordingOutput::new();
        let mut output = (recorder.factory())().expect("recorder always opens");
        output.note_on(64, 127);
        output.note_off(64);
        output.all_notes_off();
        assert_eq!(
            recorder.events(),
            vec![
                NoteEvent::On { note: 64, velocity: 127 },
                NoteEvent::Off { note: 64 },
                NoteEvent::AllOff,
            ]
        );
        assert_eq!(recorder.notes_played(), vec![64]);
    }

    #[test]
    fn test_unavailable_factory() {
        assert!((unavailable_factory())().is_none());
    }
}
