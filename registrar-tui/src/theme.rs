//! Console theme and color helpers.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;
use registrar_grid::GridStatus;

#[derive(Debug, Clone)]
pub struct ConsoleTheme {
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl ConsoleTheme {
    /// The one fixed palette.
    pub fn standard() -> Self {
        Self {
            bg_highlight: Color::Rgb(42, 42, 42),
            primary: Color::Rgb(0, 255, 255),
            primary_dim: Color::Rgb(0, 136, 136),
            secondary: Color::Rgb(255, 0, 255),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            text_muted: Color::Rgb(68, 68, 68),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }
}

pub fn grid_status_color(status: &GridStatus, theme: &ConsoleTheme) -> Color {
    match status {
        GridStatus::Loading => theme.primary_dim,
        GridStatus::Ready => theme.success,
        GridStatus::Errored(failure) if failure.is_retriable() => theme.warning,
        GridStatus::Errored(_) => theme.error,
    }
}

pub fn notification_color(level: NotificationLevel, theme: &ConsoleTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Page controls are dimmed when they would do nothing.
pub fn control_color(enabled: bool, theme: &ConsoleTheme) -> Color {
    if enabled {
        theme.primary
    } else {
        theme.text_muted
    }
}
