//! Rebate formulas shared by the write-through calculator and the live
//! display resolver, so the two paths cannot drift apart numerically.

use crate::rewards::domain::NOT_APPLICABLE;

/// Round half-up to the given number of decimal places.
pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Cash rebate percentage for an earning rate and a cash value-per-point,
/// rounded to two decimals. `None` when either side pays nothing.
pub(crate) fn cash_rebate_percent(rate: f64, cash_vpp: f64) -> Option<f64> {
    if rate <= 0.0 || cash_vpp <= 0.0 {
        return None;
    }
    Some(round_to(rate * cash_vpp * 100.0, 2))
}

/// HKD cost to earn one reward unit (a mile or a program point), rounded to
/// one decimal. `None` when the per-dollar yield is zero, so the inversion
/// never divides by zero.
pub(crate) fn cost_per_unit(rate: f64, vpp: f64) -> Option<f64> {
    let units_per_dollar = rate * vpp;
    if units_per_dollar > 0.0 {
        Some(round_to(1.0 / units_per_dollar, 1))
    } else {
        None
    }
}

pub(crate) fn cash_display(percent: f64) -> String {
    format!("{percent}% 現金回贈")
}

pub(crate) fn miles_display(cost: f64) -> String {
    format!("HK${cost}/里")
}

pub(crate) fn points_display(cost: f64) -> String {
    format!("HK${cost}/分")
}

pub(crate) fn not_applicable() -> String {
    NOT_APPLICABLE.to_string()
}
