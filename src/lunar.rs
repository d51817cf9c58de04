//! Phase angle of the real Moon for a calendar instant.
//!
//! Low precision: mean synodic month counted from a reference new moon, no
//! perturbation terms. Good to about a day, which is plenty for picking a
//! sensible starting angle.

use chrono::{DateTime, TimeZone, Utc};

/// Mean synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Reference new moon: 2000-01-06 18:14 UTC.
fn reference_new_moon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0)
        .single()
        .unwrap_or_default()
}

/// Age of the Moon in days since the last mean new moon.
pub fn moon_age_days(at: DateTime<Utc>) -> f64 {
    let elapsed = (at - reference_new_moon()).num_seconds() as f64 / 86_400.0;
    elapsed.rem_euclid(SYNODIC_MONTH_DAYS)
}

/// Phase angle in degrees, `[0, 360)`, at `at`.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use moon_phase_lib::lunar::phase_angle_at;
///
/// let angle = phase_angle_at(Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0).unwrap());
/// assert!(angle < 0.01);
/// ```
pub fn phase_angle_at(at: DateTime<Utc>) -> f64 {
    crate::normalize_angle(moon_age_days(at) / SYNODIC_MONTH_DAYS * 360.0)
}

/// Phase angle right now.
pub fn phase_angle_now() -> f64 {
    phase_angle_at(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::{classify, PhaseBucket};
    use chrono::Duration;

    #[test]
    fn test_half_month_after_reference_is_full() {
        let t = reference_new_moon() + Duration::hours((SYNODIC_MONTH_DAYS * 12.0) as i64);
        assert_eq!(classify(phase_angle_at(t)), PhaseBucket::Full);
    }

    #[test]
    fn test_known_full_moon() {
        // Full moon of 2024-01-25 17:54 UTC
        let t = Utc.with_ymd_and_hms(2024, 1, 25, 17, 54, 0).unwrap();
        let angle = phase_angle_at(t);
        assert!((angle - 180.0).abs() < 15.0, "angle {angle}");
    }

    #[test]
    fn test_known_new_moon() {
        // New moon of 2024-04-08 18:21 UTC (total solar eclipse)
        let t = Utc.with_ymd_and_hms(2024, 4, 8, 18, 21, 0).unwrap();
        assert_eq!(classify(phase_angle_at(t)), PhaseBucket::New);
    }

    #[test]
    fn test_before_reference_is_normalized() {
        let t = Utc.with_ymd_and_hms(1990, 6, 1, 0, 0, 0).unwrap();
        let angle = phase_angle_at(t);
        assert!((0.0..360.0).contains(&angle));
        assert!(moon_age_days(t) >= 0.0);
    }
}
