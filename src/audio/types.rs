use std::sync::Arc;

/// Decoded audio held entirely in memory, ready for the output callback.
#[derive(Clone, Debug)]
pub struct AudioData {
    /// Interleaved samples normalized to [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
    /// Duration in seconds.
    pub duration: f64,
}

impl AudioData {
    /// Total number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }
}

/// Commands sent from the UI thread to the audio thread.
#[derive(Debug, Clone)]
pub enum AudioCommand {
    Load(Arc<AudioData>),
    Play,
    Stop,
    Seek(f64),
    Shutdown,
}

/// Events sent from the audio thread to the UI thread.
#[derive(Debug, Clone)]
pub enum AudioEvent {
    PositionChanged(f64),
    PlaybackFinished,
}

/// Current playback status. Stopping always rewinds, so there is no
/// paused-in-place state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
}
