//! Shared test fixtures.

use audio::{SoundCue, SoundCues};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CueCall {
    Play(SoundCue),
    Stop(SoundCue),
    Pause(SoundCue),
    Seek(SoundCue, f64),
    Volume(SoundCue, f64),
}

/// Audio sink that records every call and fakes playback positions.
#[derive(Debug, Default)]
pub struct RecordingCues {
    pub calls: Vec<CueCall>,
    pub positions: HashMap<SoundCue, f64>,
}

impl RecordingCues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, call: CueCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn played(&self, cue: SoundCue) -> usize {
        self.count(CueCall::Play(cue))
    }

    pub fn stopped(&self, cue: SoundCue) -> bool {
        self.calls.contains(&CueCall::Stop(cue))
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SoundCues for RecordingCues {
    fn play(&mut self, cue: SoundCue) {
        self.calls.push(CueCall::Play(cue));
    }

    fn stop(&mut self, cue: SoundCue) {
        self.calls.push(CueCall::Stop(cue));
    }

    fn pause(&mut self, cue: SoundCue) {
        self.calls.push(CueCall::Pause(cue));
    }

    fn seek(&mut self, cue: SoundCue, position: f64) {
        self.calls.push(CueCall::Seek(cue, position));
    }

    fn current_time(&self, cue: SoundCue) -> f64 {
        self.positions.get(&cue).copied().unwrap_or(0.0)
    }

    fn set_volume(&mut self, cue: SoundCue, volume: f64) {
        self.calls.push(CueCall::Volume(cue, volume));
    }
}
