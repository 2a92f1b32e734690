//! Scoring module - line-clear points, leveling and gravity speed
//!
//! - Points per settle come from a fixed table indexed by the number of rows
//!   cleared, multiplied by the current level (which starts at 1).
//! - Level goes up by one after a settle once `lines / 10 >= level`.
//! - Gravity is 1000ms until the first level-up, then `1000 / (level + 1.1)`.

use crate::types::{BASE_GRAVITY_MS, LINES_PER_LEVEL, LINE_SCORES, START_LEVEL};

/// Calculate line clear score
/// lines: number of rows cleared by one settle
/// level: current level (1-based)
///
/// Counts outside the table (0, or more than 4) score nothing.
pub fn calculate_line_score(lines: usize, level: u32) -> u32 {
    lines
        .checked_sub(1)
        .and_then(|i| LINE_SCORES.get(i))
        .map(|base| base.saturating_mul(level))
        .unwrap_or(0)
}

/// Level after a settle brought the cumulative line count to `total_lines`.
///
/// Advances at most one level per settle.
pub fn next_level(total_lines: u32, level: u32) -> u32 {
    if total_lines >= LINES_PER_LEVEL.saturating_mul(level) {
        level + 1
    } else {
        level
    }
}

/// Gravity interval in milliseconds for a level
pub fn gravity_interval_ms(level: u32) -> f64 {
    if level <= START_LEVEL {
        return BASE_GRAVITY_MS;
    }
    BASE_GRAVITY_MS / (level as f64 + 1.0 + 0.1)
}
