//! Heart-rate zone helpers.
//!
//! Age-estimated max HR via the 220-minus-age rule floored at 80 bpm, and
//! conversion of a rule's fractional zone into a rounded bpm range.

/// Disclaimer attached to every zone recommendation.
pub const ZONE_NOTE: &str = "Kisiye gore degisir; cihaz olcumune baglidir.";

/// Estimated max heart rate for an age, `None` when age is unknown.
pub fn estimate_max_hr(age: Option<f64>) -> Option<f64> {
    let age = age.filter(|a| a.is_finite())?;
    Some((220.0 - age).max(80.0))
}

/// Convert a `[low, high]` fraction-of-max zone into a rounded bpm range.
pub fn zone_range(zone_pct: [f64; 2], age: Option<f64>) -> Option<[u32; 2]> {
    let max_hr = estimate_max_hr(age)?;
    let [lo, hi] = zone_pct;
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    Some([(lo * max_hr).round() as u32, (hi * max_hr).round() as u32])
}
