use std::sync::Arc;

use iced::keyboard;
use iced::widget::center;
use iced::{Element, Subscription, Task, Theme};
use tracing::{debug, error, info};

use crate::audio::decoder;
use crate::audio::engine::{self, Engine};
use crate::audio::types::{AudioCommand, AudioData, AudioEvent, PlaybackStatus};
use crate::config::PlayerConfig;
use crate::media::{self, MediaFetcher};
use crate::ui::controls::{self, ControlMessage};

pub struct App {
    config: PlayerConfig,
    engine: Option<Engine>,

    // Playback state mirrored for display
    status: PlaybackStatus,
    position: f64,
    duration: f64, // NaN until the fetched resource has been decoded

    audio: Option<Arc<AudioData>>,
    /// Fetched alongside the audio; kept for the session but not rendered.
    #[allow(dead_code)]
    lyrics: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    EngineReady(Result<Engine, String>),
    AudioLoaded(Result<Arc<AudioData>, String>),
    LyricsLoaded(Result<String, String>),
    Control(ControlMessage),
    Tick,
    KeyEvent(keyboard::Event),
}

fn boot(config: PlayerConfig) -> (App, Task<Message>) {
    let fetcher = MediaFetcher::new();

    let engine_task = Task::perform(
        async {
            tokio::task::spawn_blocking(engine::spawn_engine)
                .await
                .unwrap()
        },
        Message::EngineReady,
    );

    // Both fetches go out together; neither orders before the other.
    let audio_task = {
        let fetcher = fetcher.clone();
        let url = config.audio_url.clone();
        Task::perform(
            async move {
                let bytes = fetcher.fetch_audio(&url).await.map_err(|e| e.to_string())?;
                let hint = media::extension_hint(&url).map(str::to_owned);
                tokio::task::spawn_blocking(move || {
                    decoder::decode_bytes(bytes, hint.as_deref()).map(Arc::new)
                })
                .await
                .unwrap()
            },
            Message::AudioLoaded,
        )
    };

    let lyrics_task = {
        let url = config.lyrics_url.clone();
        Task::perform(
            async move { fetcher.fetch_lyrics(&url).await.map_err(|e| e.to_string()) },
            Message::LyricsLoaded,
        )
    };

    let app = App {
        config,
        engine: None,
        status: PlaybackStatus::Stopped,
        position: 0.0,
        duration: f64::NAN,
        audio: None,
        lyrics: None,
    };

    (app, Task::batch([engine_task, audio_task, lyrics_task]))
}

fn title(app: &App) -> String {
    match app.status {
        PlaybackStatus::Playing => "beatplay (playing)".to_string(),
        PlaybackStatus::Stopped => "beatplay".to_string(),
    }
}

fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::EngineReady(result) => {
            match result {
                Ok(eng) => {
                    // The audio fetch may have resolved first.
                    if let Some(audio) = &app.audio {
                        eng.send(AudioCommand::Load(audio.clone()));
                    }
                    app.engine = Some(eng);
                }
                Err(e) => {
                    error!(error = %e, "audio engine unavailable");
                }
            }
            Task::none()
        }
        Message::AudioLoaded(result) => {
            match result {
                Ok(data) => {
                    info!(duration_secs = data.duration, "remote audio ready");
                    app.duration = data.duration;
                    app.position = 0.0;
                    app.status = PlaybackStatus::Stopped;
                    if let Some(eng) = &app.engine {
                        eng.send(AudioCommand::Load(data.clone()));
                    }
                    app.audio = Some(data);
                }
                Err(e) => {
                    // Playback simply stays unavailable; the toggle is inert.
                    error!(error = %e, "failed to load remote audio");
                }
            }
            Task::none()
        }
        Message::LyricsLoaded(result) => {
            match result {
                Ok(text) => {
                    debug!(len = text.len(), "lyrics document held");
                    app.lyrics = Some(text);
                }
                Err(e) => {
                    error!(error = %e, "failed to load lyrics");
                }
            }
            Task::none()
        }
        Message::Control(ControlMessage::Toggle) => {
            match app.status {
                PlaybackStatus::Playing => {
                    if let Some(eng) = &app.engine {
                        eng.send(AudioCommand::Stop);
                    }
                    app.status = PlaybackStatus::Stopped;
                    app.position = 0.0;
                }
                PlaybackStatus::Stopped => match (&app.engine, &app.audio) {
                    (Some(eng), Some(_)) => {
                        eng.send(AudioCommand::Play);
                        app.status = PlaybackStatus::Playing;
                    }
                    _ => {
                        debug!("toggle pressed before playback is ready");
                    }
                },
            }
            Task::none()
        }
        Message::Control(ControlMessage::Seek(time)) => {
            let bound = if app.duration.is_finite() {
                app.duration.max(0.0)
            } else {
                0.0
            };
            let target = time.clamp(0.0, bound);
            if let Some(eng) = &app.engine {
                eng.send(AudioCommand::Seek(target));
            }
            // Displayed position follows the input immediately.
            app.position = target;
            Task::none()
        }
        Message::Tick => {
            if let Some(eng) = &app.engine {
                while let Some(event) = eng.try_event() {
                    match event {
                        AudioEvent::PositionChanged(pos) => {
                            app.position = pos;
                        }
                        AudioEvent::PlaybackFinished => {
                            app.status = PlaybackStatus::Stopped;
                            app.position = 0.0;
                        }
                    }
                }
            }
            Task::none()
        }
        Message::KeyEvent(key_event) => match key_event {
            keyboard::Event::KeyPressed {
                key, modifiers: _, ..
            } => match key.as_ref() {
                keyboard::Key::Named(keyboard::key::Named::Space) => {
                    update(app, Message::Control(ControlMessage::Toggle))
                }
                keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => {
                    let target = app.position - 5.0;
                    update(app, Message::Control(ControlMessage::Seek(target)))
                }
                keyboard::Key::Named(keyboard::key::Named::ArrowRight) => {
                    let target = app.position + 5.0;
                    update(app, Message::Control(ControlMessage::Seek(target)))
                }
                _ => Task::none(),
            },
            _ => Task::none(),
        },
    }
}

fn view(app: &App) -> Element<'_, Message> {
    let player = controls::view_player(app.status, app.position, app.duration, &app.config.style)
        .map(Message::Control);

    center(player).into()
}

fn subscription(_app: &App) -> Subscription<Message> {
    let tick = iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick);

    let keys = keyboard::listen().map(Message::KeyEvent);

    Subscription::batch([tick, keys])
}

fn theme(_app: &App) -> Theme {
    Theme::Dark
}

pub fn run(config: PlayerConfig) -> iced::Result {
    let window_size = (config.style.window_width, config.style.window_height);

    iced::application(move || boot(config.clone()), update, view)
        .title(title)
        .subscription(subscription)
        .theme(theme)
        .window_size(window_size)
        .run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, Sender};

    fn test_app() -> App {
        App {
            config: PlayerConfig::default(),
            engine: None,
            status: PlaybackStatus::Stopped,
            position: 0.0,
            duration: f64::NAN,
            audio: None,
            lyrics: None,
        }
    }

    fn test_app_with_engine() -> (App, Receiver<AudioCommand>, Sender<AudioEvent>) {
        let (engine, cmd_rx, event_tx) = Engine::stub();
        let mut app = test_app();
        app.engine = Some(engine);
        (app, cmd_rx, event_tx)
    }

    fn test_audio(duration: f64) -> Arc<AudioData> {
        let sample_rate = 1000u32;
        let frames = (duration * sample_rate as f64) as usize;
        Arc::new(AudioData {
            samples: vec![0.0; frames * 2],
            sample_rate,
            channels: 2,
            duration,
        })
    }

    #[test]
    fn toggle_is_inert_until_audio_is_ready() {
        let (mut app, cmd_rx, _event_tx) = test_app_with_engine();

        let _ = update(&mut app, Message::Control(ControlMessage::Toggle));

        assert_eq!(app.status, PlaybackStatus::Stopped);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn failed_audio_fetch_leaves_toggle_inert() {
        let (mut app, cmd_rx, _event_tx) = test_app_with_engine();

        let _ = update(
            &mut app,
            Message::AudioLoaded(Err("request failed: timeout".to_string())),
        );
        let _ = update(&mut app, Message::Control(ControlMessage::Toggle));

        assert_eq!(app.status, PlaybackStatus::Stopped);
        assert!(app.duration.is_nan());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn loaded_audio_sets_duration_and_binds_engine() {
        let (mut app, cmd_rx, _event_tx) = test_app_with_engine();

        let _ = update(&mut app, Message::AudioLoaded(Ok(test_audio(3.0))));

        assert_eq!(app.duration, 3.0);
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            AudioCommand::Load(_)
        ));
    }

    #[test]
    fn audio_arriving_before_engine_is_bound_on_engine_ready() {
        let mut app = test_app();
        let _ = update(&mut app, Message::AudioLoaded(Ok(test_audio(3.0))));

        let (engine, cmd_rx, _event_tx) = Engine::stub();
        let _ = update(&mut app, Message::EngineReady(Ok(engine)));

        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            AudioCommand::Load(_)
        ));
    }

    #[test]
    fn toggle_starts_then_stops_and_rewinds() {
        let (mut app, cmd_rx, _event_tx) = test_app_with_engine();
        let _ = update(&mut app, Message::AudioLoaded(Ok(test_audio(3.0))));
        let _ = cmd_rx.try_recv(); // Load

        let _ = update(&mut app, Message::Control(ControlMessage::Toggle));
        assert_eq!(app.status, PlaybackStatus::Playing);
        assert!(matches!(cmd_rx.try_recv().unwrap(), AudioCommand::Play));

        app.position = 1.5;
        let _ = update(&mut app, Message::Control(ControlMessage::Toggle));
        assert_eq!(app.status, PlaybackStatus::Stopped);
        assert_eq!(app.position, 0.0);
        assert!(matches!(cmd_rx.try_recv().unwrap(), AudioCommand::Stop));
    }

    #[test]
    fn seek_updates_displayed_position_in_either_state() {
        let (mut app, cmd_rx, _event_tx) = test_app_with_engine();
        let _ = update(&mut app, Message::AudioLoaded(Ok(test_audio(100.0))));
        let _ = cmd_rx.try_recv(); // Load

        let _ = update(&mut app, Message::Control(ControlMessage::Seek(42.0)));
        assert_eq!(app.position, 42.0);
        assert!(matches!(
            cmd_rx.try_recv().unwrap(),
            AudioCommand::Seek(t) if t == 42.0
        ));

        app.status = PlaybackStatus::Playing;
        let _ = update(&mut app, Message::Control(ControlMessage::Seek(10.0)));
        assert_eq!(app.position, 10.0);
        assert_eq!(app.status, PlaybackStatus::Playing);
    }

    #[test]
    fn seek_clamps_to_known_duration() {
        let (mut app, _cmd_rx, _event_tx) = test_app_with_engine();
        let _ = update(&mut app, Message::AudioLoaded(Ok(test_audio(100.0))));

        let _ = update(&mut app, Message::Control(ControlMessage::Seek(500.0)));
        assert_eq!(app.position, 100.0);

        let _ = update(&mut app, Message::Control(ControlMessage::Seek(-5.0)));
        assert_eq!(app.position, 0.0);
    }

    #[test]
    fn seek_before_duration_known_pins_to_zero() {
        let (mut app, _cmd_rx, _event_tx) = test_app_with_engine();

        let _ = update(&mut app, Message::Control(ControlMessage::Seek(30.0)));
        assert_eq!(app.position, 0.0);
    }

    #[test]
    fn tick_applies_engine_events() {
        let (mut app, _cmd_rx, event_tx) = test_app_with_engine();
        let _ = update(&mut app, Message::AudioLoaded(Ok(test_audio(3.0))));
        app.status = PlaybackStatus::Playing;

        event_tx.send(AudioEvent::PositionChanged(1.25)).unwrap();
        let _ = update(&mut app, Message::Tick);
        assert_eq!(app.position, 1.25);

        event_tx.send(AudioEvent::PlaybackFinished).unwrap();
        let _ = update(&mut app, Message::Tick);
        assert_eq!(app.status, PlaybackStatus::Stopped);
        assert_eq!(app.position, 0.0);
    }

    #[test]
    fn lyrics_document_is_held() {
        let mut app = test_app();

        let _ = update(
            &mut app,
            Message::LyricsLoaded(Ok("<lyrics/>".to_string())),
        );
        assert_eq!(app.lyrics.as_deref(), Some("<lyrics/>"));

        let mut other = test_app();
        let _ = update(&mut other, Message::LyricsLoaded(Err("offline".to_string())));
        assert!(other.lyrics.is_none());
    }
}
