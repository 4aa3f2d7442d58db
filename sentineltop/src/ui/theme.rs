//! Shared UI theme constants.

use ratatui::style::Color;

use crate::dashboard::ServerStatus;
use crate::gauge::Severity;

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);

pub const HISTORY_CPU: Color = Color::Rgb(243, 156, 18);
pub const PREDICTION_CPU: Color = Color::Rgb(230, 126, 34);
pub const HISTORY_MEM: Color = Color::Rgb(52, 152, 219);
pub const PREDICTION_MEM: Color = Color::Rgb(41, 128, 185);

pub fn severity_color(s: Severity) -> Color {
    match s {
        Severity::Nominal => Color::Rgb(46, 204, 113),
        Severity::Warning => Color::Rgb(243, 156, 18),
        Severity::Alert => Color::Rgb(231, 76, 60),
    }
}

pub fn status_color(s: ServerStatus) -> Color {
    match s {
        ServerStatus::Online => Color::Green,
        ServerStatus::Pending => Color::DarkGray,
        ServerStatus::Offline | ServerStatus::ConnectionError => Color::Red,
    }
}
