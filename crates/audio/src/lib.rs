//! Audio cues for the helicopter scene, played through Kira.
//!
//! The simulation talks to audio only through [`SoundCues`]. Every call is
//! fire-and-forget: a cue that was never loaded, or a backend error, is
//! ignored so the real-time loop never stalls on sound.

use anyhow::Result;
use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::{
        static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
        PlaybackState,
    },
    tween::Tween,
};
use std::collections::HashMap;
use std::path::Path;

/// Every sound the scene can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Looping rotor wash while the motor runs.
    RotorBlades,
    /// One-shot engine spool-up on take-off.
    EngineStart,
    ReturningToBase,
    /// Bucket door opening over a fire.
    WaterRelease,
    WaterImpact,
    /// Bucket filling at the lake; paused and resumed with the bucket.
    WaterFilling,
    WaterFull,
    FireExtinguished,
}

impl SoundCue {
    pub const ALL: [SoundCue; 8] = [
        SoundCue::RotorBlades,
        SoundCue::EngineStart,
        SoundCue::ReturningToBase,
        SoundCue::WaterRelease,
        SoundCue::WaterImpact,
        SoundCue::WaterFilling,
        SoundCue::WaterFull,
        SoundCue::FireExtinguished,
    ];

    /// File name inside the sound directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SoundCue::RotorBlades => "heli_blade.mp3",
            SoundCue::EngineStart => "helicopter_helicopter.mp3",
            SoundCue::ReturningToBase => "returning_base.mp3",
            SoundCue::WaterRelease => "drop-the-bomb-man.mp3",
            SoundCue::WaterImpact => "water-impact.mp3",
            SoundCue::WaterFilling => "water-filling.mp3",
            SoundCue::WaterFull => "water-full.mp3",
            SoundCue::FireExtinguished => "fire-extinguished.mp3",
        }
    }

    pub fn looping(self) -> bool {
        matches!(self, SoundCue::RotorBlades)
    }

    /// Initial volume (amplitude, 0.0 to 1.0).
    pub fn default_volume(self) -> f64 {
        match self {
            SoundCue::RotorBlades => 0.05,
            SoundCue::EngineStart => 0.4,
            SoundCue::ReturningToBase | SoundCue::WaterImpact => 0.2,
            _ => 0.1,
        }
    }
}

/// Audio collaborator used by the simulation.
pub trait SoundCues {
    /// Start a cue. No-op if it is already playing.
    fn play(&mut self, cue: SoundCue);
    fn stop(&mut self, cue: SoundCue);
    fn pause(&mut self, cue: SoundCue);
    /// Jump to `position` seconds into a playing cue.
    fn seek(&mut self, cue: SoundCue, position: f64);
    /// Playback position in seconds, 0 when not playing.
    fn current_time(&self, cue: SoundCue) -> f64;
    fn set_volume(&mut self, cue: SoundCue, volume: f64);
    /// Silence everything and ignore later `play` calls until unmuted.
    fn set_muted(&mut self, _muted: bool) {}
}

/// Sink that drops every call. Used when no audio device is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl SoundCues for Silent {
    fn play(&mut self, _cue: SoundCue) {}
    fn stop(&mut self, _cue: SoundCue) {}
    fn pause(&mut self, _cue: SoundCue) {}
    fn seek(&mut self, _cue: SoundCue, _position: f64) {}
    fn current_time(&self, _cue: SoundCue) -> f64 {
        0.0
    }
    fn set_volume(&mut self, _cue: SoundCue, _volume: f64) {}
}

fn cue_settings(cue: SoundCue, volume: f64) -> StaticSoundSettings {
    let settings = StaticSoundSettings::new().volume(volume);
    if cue.looping() {
        settings.loop_region(..)
    } else {
        settings
    }
}

struct CueSlot {
    data: StaticSoundData,
    volume: f64,
    handle: Option<StaticSoundHandle>,
}

impl CueSlot {
    fn is_playing(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|h| h.state() == PlaybackState::Playing)
    }
}

/// What `play` does with the instance a cue already owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    /// Already audible.
    Keep,
    /// Paused instance: pick it up where it stopped.
    Resume,
    /// Stop whatever is left and start a fresh instance.
    Restart,
}

/// Kira only frees an instance once it reaches `Stopped`, so a paused
/// instance must be resumed or stopped, never just dropped.
fn replay_for(state: Option<PlaybackState>) -> Replay {
    match state {
        Some(PlaybackState::Playing) => Replay::Keep,
        Some(PlaybackState::Pausing | PlaybackState::Paused) => Replay::Resume,
        Some(PlaybackState::Stopping | PlaybackState::Stopped) | None => Replay::Restart,
    }
}

/// Kira-backed audio system.
pub struct AudioSystem {
    manager: AudioManager,
    cues: HashMap<SoundCue, CueSlot>,
    muted: bool,
}

impl AudioSystem {
    /// Create a new audio system.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;
        Ok(Self {
            manager,
            cues: HashMap::new(),
            muted: false,
        })
    }

    /// Load one cue from a file.
    pub fn load_cue(&mut self, cue: SoundCue, path: &Path) -> Result<()> {
        let settings = cue_settings(cue, cue.default_volume());
        let data = StaticSoundData::from_file(path)?.with_settings(settings);
        self.cues.insert(
            cue,
            CueSlot {
                data,
                volume: cue.default_volume(),
                handle: None,
            },
        );
        Ok(())
    }

    /// Load every cue from `dir`. Missing files are logged and skipped; the
    /// matching cues then stay silent.
    pub fn load_directory(&mut self, dir: &Path) -> usize {
        let mut loaded = 0;
        for cue in SoundCue::ALL {
            let path = dir.join(cue.file_name());
            match self.load_cue(cue, &path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Sound {:?} unavailable ({}): {}", cue, path.display(), e),
            }
        }
        loaded
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Stop all sounds.
    pub fn stop_all(&mut self) {
        for slot in self.cues.values_mut() {
            if let Some(mut handle) = slot.handle.take() {
                let _ = handle.stop(Tween::default());
            }
        }
    }

    /// Set master volume (0.0 to 1.0).
    pub fn set_master_volume(&mut self, volume: f64) {
        let _ = self.manager.main_track().set_volume(volume, Tween::default());
    }
}

impl SoundCues for AudioSystem {
    fn play(&mut self, cue: SoundCue) {
        if self.muted {
            return;
        }
        let Some(slot) = self.cues.get_mut(&cue) else {
            return;
        };
        match replay_for(slot.handle.as_ref().map(|h| h.state())) {
            Replay::Keep => return,
            Replay::Resume => {
                if let Some(handle) = slot.handle.as_mut() {
                    let _ = handle.resume(Tween::default());
                }
                return;
            }
            Replay::Restart => {
                if let Some(mut old) = slot.handle.take() {
                    let _ = old.stop(Tween::default());
                }
            }
        }
        let data = slot.data.clone().with_settings(cue_settings(cue, slot.volume));
        match self.manager.play(data) {
            Ok(handle) => slot.handle = Some(handle),
            Err(e) => log::debug!("Failed to play {:?}: {}", cue, e),
        }
    }

    fn stop(&mut self, cue: SoundCue) {
        if let Some(mut handle) = self.cues.get_mut(&cue).and_then(|s| s.handle.take()) {
            let _ = handle.stop(Tween::default());
        }
    }

    fn pause(&mut self, cue: SoundCue) {
        if let Some(handle) = self.cues.get_mut(&cue).and_then(|s| s.handle.as_mut()) {
            let _ = handle.pause(Tween::default());
        }
    }

    fn seek(&mut self, cue: SoundCue, position: f64) {
        if let Some(handle) = self.cues.get_mut(&cue).and_then(|s| s.handle.as_mut()) {
            let _ = handle.seek_to(position.max(0.0));
        }
    }

    fn current_time(&self, cue: SoundCue) -> f64 {
        self.cues
            .get(&cue)
            .filter(|s| s.is_playing())
            .and_then(|s| s.handle.as_ref())
            .map_or(0.0, |h| h.position())
    }

    fn set_volume(&mut self, cue: SoundCue, volume: f64) {
        let Some(slot) = self.cues.get_mut(&cue) else {
            return;
        };
        slot.volume = volume.clamp(0.0, 1.0);
        if let Some(handle) = slot.handle.as_mut() {
            let _ = handle.set_volume(slot.volume, Tween::default());
        }
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_all();
        }
    }
}

// Re-export for convenience
pub use kira;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rotor_loops() {
        let looping: Vec<_> = SoundCue::ALL.iter().filter(|c| c.looping()).collect();
        assert_eq!(looping, vec![&SoundCue::RotorBlades]);
    }

    #[test]
    fn cue_files_are_distinct() {
        let mut names: Vec<_> = SoundCue::ALL.iter().map(|c| c.file_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), SoundCue::ALL.len());
    }

    #[test]
    fn paused_cue_resumes_instead_of_restarting() {
        assert_eq!(replay_for(Some(PlaybackState::Paused)), Replay::Resume);
        assert_eq!(replay_for(Some(PlaybackState::Pausing)), Replay::Resume);
    }

    #[test]
    fn finished_or_missing_cue_restarts() {
        assert_eq!(replay_for(None), Replay::Restart);
        assert_eq!(replay_for(Some(PlaybackState::Stopped)), Replay::Restart);
        assert_eq!(replay_for(Some(PlaybackState::Stopping)), Replay::Restart);
        assert_eq!(replay_for(Some(PlaybackState::Playing)), Replay::Keep);
    }

    #[test]
    fn silent_sink_reports_zero_position() {
        let mut sink = Silent;
        sink.play(SoundCue::WaterFilling);
        sink.seek(SoundCue::WaterFilling, 3.0);
        assert_eq!(sink.current_time(SoundCue::WaterFilling), 0.0);
    }
}
