use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use tracing::error;

use super::types::{AudioCommand, AudioData, AudioEvent};

/// How often (in output frames) to send position updates.
const POSITION_UPDATE_INTERVAL: usize = 2048;

struct EngineState {
    audio: Option<Arc<AudioData>>,
    position: usize, // current frame position
    playing: bool,
    frames_since_update: usize,
}

impl EngineState {
    fn new() -> Self {
        Self {
            audio: None,
            position: 0,
            playing: false,
            frames_since_update: 0,
        }
    }

    fn handle_command(&mut self, cmd: AudioCommand, event_tx: &Sender<AudioEvent>) {
        match cmd {
            AudioCommand::Load(data) => {
                self.audio = Some(data);
                self.position = 0;
                self.playing = false;
            }
            AudioCommand::Play => {
                if self.audio.is_some() {
                    self.playing = true;
                }
            }
            AudioCommand::Stop => {
                self.playing = false;
                self.position = 0;
                let _ = event_tx.send(AudioEvent::PositionChanged(0.0));
            }
            AudioCommand::Seek(time) => {
                if let Some(audio) = &self.audio {
                    let frame = (time.max(0.0) * audio.sample_rate as f64) as usize;
                    self.position = frame.min(audio.num_frames());
                    let pos_secs = self.position as f64 / audio.sample_rate as f64;
                    let _ = event_tx.send(AudioEvent::PositionChanged(pos_secs));
                }
            }
            AudioCommand::Shutdown => {
                self.release();
            }
        }
    }

    /// Drop the loaded buffer and halt output.
    fn release(&mut self) {
        self.audio = None;
        self.playing = false;
        self.position = 0;
    }

    /// Fill the output buffer from the loaded samples.
    fn fill_buffer(&mut self, output: &mut [f32], channels: u16, event_tx: &Sender<AudioEvent>) {
        if !self.playing {
            output.fill(0.0);
            return;
        }

        let audio = match &self.audio {
            Some(a) => a.clone(),
            None => {
                output.fill(0.0);
                return;
            }
        };

        let src_channels = audio.channels as usize;
        let out_channels = channels as usize;
        let total_frames = audio.num_frames();
        let out_frames = output.len() / out_channels;
        let mut out_pos = 0;

        while out_pos < out_frames {
            if self.position >= total_frames {
                // End of the buffer: rewind and notify, matching the
                // stop-always-resets transport.
                self.playing = false;
                self.position = 0;
                self.frames_since_update = 0;
                let _ = event_tx.send(AudioEvent::PlaybackFinished);
                output[out_pos * out_channels..].fill(0.0);
                return;
            }

            let frames = (out_frames - out_pos).min(total_frames - self.position);
            for f in 0..frames {
                let src = (self.position + f) * src_channels;
                for c in 0..out_channels {
                    output[(out_pos + f) * out_channels + c] = audio.samples[src + c % src_channels];
                }
            }
            out_pos += frames;
            self.position += frames;
            self.frames_since_update += frames;

            if self.frames_since_update >= POSITION_UPDATE_INTERVAL {
                self.frames_since_update = 0;
                let pos_secs = self.position as f64 / audio.sample_rate as f64;
                let _ = event_tx.send(AudioEvent::PositionChanged(pos_secs));
            }
        }
    }
}

/// Handle to a running engine. When the last clone is dropped the stop
/// channel disconnects and the keepalive thread releases the output stream.
#[derive(Debug, Clone)]
pub struct Engine {
    cmd_tx: Sender<AudioCommand>,
    event_rx: Receiver<AudioEvent>,
    _stop_tx: Sender<()>,
}

impl Engine {
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn try_event(&self) -> Option<AudioEvent> {
        self.event_rx.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn stub() -> (Engine, Receiver<AudioCommand>, Sender<AudioEvent>) {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let (stop_tx, _) = crossbeam_channel::unbounded();
        (
            Engine {
                cmd_tx,
                event_rx,
                _stop_tx: stop_tx,
            },
            cmd_rx,
            event_tx,
        )
    }
}

/// Spawn the audio engine and return a handle to it.
pub fn spawn_engine() -> Result<Engine, String> {
    let (cmd_tx, cmd_rx) = crossbeam_channel::bounded::<AudioCommand>(64);
    let (event_tx, event_rx) = crossbeam_channel::bounded::<AudioEvent>(256);
    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or("No audio output device found")?;

    let config = device
        .default_output_config()
        .map_err(|e| format!("Failed to get output config: {e}"))?;

    let channels = config.channels();
    let sample_format = config.sample_format();

    let mut state = EngineState::new();

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    loop {
                        match cmd_rx.try_recv() {
                            Ok(cmd) => state.handle_command(cmd, &event_tx),
                            Err(TryRecvError::Empty) => break,
                            Err(TryRecvError::Disconnected) => {
                                state.release();
                                break;
                            }
                        }
                    }
                    state.fill_buffer(data, channels, &event_tx);
                },
                |err| {
                    error!(error = %err, "audio stream error");
                },
                None,
            )
            .map_err(|e| format!("Failed to build output stream: {e}"))?,
        _ => return Err(format!("Unsupported sample format: {sample_format:?}")),
    };

    stream
        .play()
        .map_err(|e| format!("Failed to start stream: {e}"))?;

    // The stream lives on this thread until every engine handle is gone.
    std::thread::Builder::new()
        .name("audio-keepalive".into())
        .spawn(move || {
            let _stream = stream;
            let _ = stop_rx.recv();
        })
        .map_err(|e| format!("Failed to spawn keepalive thread: {e}"))?;

    Ok(Engine {
        cmd_tx,
        event_rx,
        _stop_tx: stop_tx,
    })
}
