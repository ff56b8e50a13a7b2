//! Contracted hours to teaching-period budget.

/// Periods per contracted hour outside the fixed contract table
pub const PERIODS_PER_HOUR: f64 = 0.8;

/// Upper bound accepted for hours, loads and capacities
pub const MAX_QUANTITY: i32 = 10_000;

/// Maximum teaching periods for a weekly allotment of `rt_hours`.
///
/// The standard 20/30/40-hour contracts map to 16/24/32 periods; any other
/// positive allotment is `round(rt_hours * 0.8)` with halves rounding up.
pub fn max_periods(rt_hours: i32) -> i32 {
    match rt_hours {
        h if h <= 0 => 0,
        20 => 16,
        30 => 24,
        40 => 32,
        h => (f64::from(h) * PERIODS_PER_HOUR).round() as i32,
    }
}

/// Sum of period loads, pinned at `i32::MAX` instead of overflowing
pub fn sum_periods(loads: impl IntoIterator<Item = i32>) -> i32 {
    loads.into_iter().fold(0, i32::saturating_add)
}

/// Unused budget, floored at zero
pub fn remaining_periods(max: i32, assigned: i32) -> i32 {
    max.saturating_sub(assigned).max(0)
}
