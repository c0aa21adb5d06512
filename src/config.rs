use iced::Color;

const DEFAULT_AUDIO_URL: &str = "https://storage.googleapis.com/ikara-storage/tmp/beat.mp3";
const DEFAULT_LYRICS_URL: &str = "https://storage.googleapis.com/ikara-storage/ikara/lyrics.xml";

/// Player configuration: where the media comes from and how the widget looks.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub audio_url: String,
    pub lyrics_url: String,
    pub style: PlayerStyle,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            audio_url: DEFAULT_AUDIO_URL.to_string(),
            lyrics_url: DEFAULT_LYRICS_URL.to_string(),
            style: PlayerStyle::default(),
        }
    }
}

impl PlayerConfig {
    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = url.into();
        self
    }

    pub fn with_lyrics_url(mut self, url: impl Into<String>) -> Self {
        self.lyrics_url = url.into();
        self
    }

    pub fn with_style(mut self, style: PlayerStyle) -> Self {
        self.style = style;
        self
    }
}

/// Declarative widget styling, instead of scattering literals through the
/// view code.
#[derive(Debug, Clone)]
pub struct PlayerStyle {
    pub window_width: f32,
    pub window_height: f32,
    /// Dimensions of the player panel itself.
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub accent: Color,
    /// Toggle opacity when the pointer is elsewhere.
    pub idle_opacity: f32,
    /// Toggle opacity under the pointer.
    pub hover_opacity: f32,
}

impl Default for PlayerStyle {
    fn default() -> Self {
        Self {
            window_width: 480.0,
            window_height: 400.0,
            width: 300.0,
            height: 300.0,
            background: Color::from_rgb(0.12, 0.12, 0.15),
            accent: Color::from_rgb(0.3, 0.7, 1.0),
            idle_opacity: 0.5,
            hover_opacity: 1.0,
        }
    }
}
