use iced::widget::{button, column, container, slider, text};
use iced::{Alignment, Background, Border, Color, Element, Length, Theme};

use crate::audio::types::PlaybackStatus;
use crate::config::PlayerStyle;

#[derive(Debug, Clone)]
pub enum ControlMessage {
    Toggle,
    Seek(f64),
}

/// Format seconds as M:SS, or a placeholder while the value is unknown.
fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--:--".to_string();
    }
    let total_secs = seconds as u64;
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{mins}:{secs:02}")
}

/// Upper bound of the seek bar. Zero (an empty range) until the duration of
/// the loaded resource is known.
fn seek_bound(duration: f64) -> f64 {
    if duration.is_finite() {
        duration.max(0.0)
    } else {
        0.0
    }
}

/// Build the player panel: toggle, seek bar, time readout.
pub fn view_player<'a>(
    status: PlaybackStatus,
    position: f64,
    duration: f64,
    style: &PlayerStyle,
) -> Element<'a, ControlMessage> {
    let glyph = match status {
        PlaybackStatus::Playing => "⏸",
        PlaybackStatus::Stopped => "▶",
    };

    let accent = style.accent;
    let idle_opacity = style.idle_opacity;
    let hover_opacity = style.hover_opacity;

    let toggle = button(text(glyph).size(22).center())
        .width(Length::Fixed(56.0))
        .height(Length::Fixed(40.0))
        .style(move |_theme: &Theme, st: button::Status| {
            let opacity = match st {
                button::Status::Hovered | button::Status::Pressed => hover_opacity,
                _ => idle_opacity,
            };
            button::Style {
                background: Some(Background::Color(Color {
                    a: 0.2 * opacity,
                    ..accent
                })),
                text_color: Color {
                    a: opacity,
                    ..accent
                },
                border: Border {
                    color: Color {
                        a: opacity,
                        ..accent
                    },
                    width: 1.0,
                    radius: 6.0.into(),
                },
                ..button::Style::default()
            }
        })
        .on_press(ControlMessage::Toggle);

    let bound = seek_bound(duration);
    let seek = slider(0.0..=bound, position.clamp(0.0, bound), ControlMessage::Seek)
        .step(0.1)
        .width(Length::Fill);

    let time_display = text(format!(
        "{} / {}",
        format_time(position),
        format_time(duration)
    ))
    .size(14)
    .color(Color::from_rgba(1.0, 1.0, 1.0, 0.8));

    let background = style.background;
    let panel = column![toggle, seek, time_display]
        .spacing(16)
        .align_x(Alignment::Center);

    container(panel)
        .width(Length::Fixed(style.width))
        .height(Length::Fixed(style.height))
        .padding(20)
        .align_x(Alignment::Center)
        .align_y(Alignment::Center)
        .style(move |_theme: &Theme| container::Style {
            background: Some(Background::Color(background)),
            border: Border {
                color: Color::from_rgba(1.0, 1.0, 1.0, 0.2),
                width: 1.0,
                radius: 8.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_time_placeholder_for_non_finite() {
        assert_eq!(format_time(f64::NAN), "--:--");
        assert_eq!(format_time(f64::INFINITY), "--:--");
    }

    #[test]
    fn format_time_pads_seconds() {
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(5.0), "0:05");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn seek_bound_is_zero_until_duration_known() {
        assert_eq!(seek_bound(f64::NAN), 0.0);
        assert_eq!(seek_bound(212.4), 212.4);
    }
}
