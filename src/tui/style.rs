use ratatui::style::Color;

use crate::render::spark::HourlyBar;

pub const HEADER_FG: Color = Color::Black;
pub const HEADER_BG: Color = Color::Magenta;
pub const MUTED: Color = Color::DarkGray;
pub const GOOD: Color = Color::Green;
pub const WARNING: Color = Color::Yellow;
pub const OFF_PEAK: Color = Color::Cyan;
pub const PEAK: Color = Color::Yellow;
pub const USAGE: Color = Color::Blue;

pub const fn rate_color(is_off_peak: bool) -> Color {
    if is_off_peak { OFF_PEAK } else { PEAK }
}

pub const fn hour_color(bar: &HourlyBar) -> Color {
    if bar.is_empty {
        MUTED
    } else {
        rate_color(bar.is_off_peak)
    }
}
