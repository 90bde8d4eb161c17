//! Unicode sparklines and bars.

use crate::quantity::energy::KilowattHours;

pub const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

const FILLED: char = '█';
const EMPTY: char = '░';

/// Render the values as a sparkline of exactly `width` blocks.
///
/// Longer series are down-sampled by stride, shorter ones are zero-padded.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() {
        return "─".repeat(width);
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let values: Vec<f64> = if values.len() > width {
        let step = values.len() as f64 / width as f64;
        (0..width).map(|i| values[(i as f64 * step) as usize]).collect()
    } else {
        values.iter().copied().chain(std::iter::repeat(0.0)).take(width).collect()
    };
    if values.iter().all(|value| *value == 0.0) {
        return BLOCKS[0].to_string().repeat(width);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = if max > min { max - min } else { 1.0 };
    values
        .into_iter()
        .map(|value| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let index = ((value - min) / range * 7.0) as usize;
            BLOCKS[index.min(7)]
        })
        .collect()
}

/// Number of filled cells of a `width`-cell bar.
pub fn bar_cells(value: f64, max: f64, width: usize) -> usize {
    if max == 0.0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = (value / max * width as f64).max(0.0) as usize;
    filled.min(width)
}

/// Render a horizontal bar: filled cells followed by shaded ones.
pub fn bar(value: f64, max: f64, width: usize) -> String {
    let filled = bar_cells(value, max, width);
    let mut bar = FILLED.to_string().repeat(filled);
    bar.extend(std::iter::repeat_n(EMPTY, width - filled));
    bar
}

/// Hours billed at the off-peak rate on the dashboard.
pub const fn is_off_peak_hour(hour: usize) -> bool {
    hour <= 5 || hour == 23
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HourlyBar {
    pub block: char,

    /// No consumption was recorded in this hour.
    pub is_empty: bool,

    pub is_off_peak: bool,
}

/// One block per hour, scaled to the busiest hour; non-empty hours get at least height 1.
pub fn hourly_bars(hourly: &[KilowattHours; 24]) -> [HourlyBar; 24] {
    let max = hourly.iter().copied().max().unwrap_or_default();
    std::array::from_fn(|hour| {
        let energy = hourly[hour];
        let is_off_peak = is_off_peak_hour(hour);
        if energy > KilowattHours::ZERO && max > KilowattHours::ZERO {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let height = ((energy / max) * 7.0) as usize;
            HourlyBar { block: BLOCKS[height.clamp(1, 7)], is_empty: false, is_off_peak }
        } else {
            HourlyBar { block: BLOCKS[0], is_empty: true, is_off_peak }
        }
    })
}
