//! # Phase Classification
//!
//! Maps a continuous phase angle onto the eight named phase buckets. The bands
//! are fixed thresholds over the normalized angle, with the quarter and full
//! bands inclusive on both ends:
//!
//! | normalized angle     | bucket          |
//! |----------------------|-----------------|
//! | `n > 350 or n < 10`  | New             |
//! | `10 ≤ n < 80`        | Waxing Crescent |
//! | `80 ≤ n ≤ 100`       | First Quarter   |
//! | `100 < n < 170`      | Waxing Gibbous  |
//! | `170 ≤ n ≤ 190`      | Full            |
//! | `190 < n < 260`      | Waning Gibbous  |
//! | `260 ≤ n ≤ 280`      | Last Quarter    |
//! | `280 < n ≤ 350`      | Waning Crescent |
//!
//! The crescent and gibbous buckets are approximate: they cover a range of
//! named moons, which is why their Japanese names carry a "など" suffix.

use crate::normalize_angle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eight named phase buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseBucket {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl PhaseBucket {
    /// All buckets in orbital order, starting at New Moon.
    pub const ALL: [PhaseBucket; 8] = [
        PhaseBucket::New,
        PhaseBucket::WaxingCrescent,
        PhaseBucket::FirstQuarter,
        PhaseBucket::WaxingGibbous,
        PhaseBucket::Full,
        PhaseBucket::WaningGibbous,
        PhaseBucket::LastQuarter,
        PhaseBucket::WaningCrescent,
    ];

    /// English display label.
    pub fn label(self) -> &'static str {
        match self {
            PhaseBucket::New => "New Moon",
            PhaseBucket::WaxingCrescent => "Waxing Crescent",
            PhaseBucket::FirstQuarter => "First Quarter",
            PhaseBucket::WaxingGibbous => "Waxing Gibbous",
            PhaseBucket::Full => "Full Moon",
            PhaseBucket::WaningGibbous => "Waning Gibbous",
            PhaseBucket::LastQuarter => "Last Quarter",
            PhaseBucket::WaningCrescent => "Waning Crescent",
        }
    }

    /// Japanese display name with its reading in full-width parentheses.
    pub fn japanese_name(self) -> &'static str {
        match self {
            PhaseBucket::New => "新月（しんげつ）",
            PhaseBucket::WaxingCrescent => "三日月（みかづき）など",
            PhaseBucket::FirstQuarter => "上弦の月（じょうげんのつき）",
            PhaseBucket::WaxingGibbous => "十三夜（じゅうさんや）など",
            PhaseBucket::Full => "満月（まんげつ）",
            PhaseBucket::WaningGibbous => "更待月（ふけまちづき）など",
            PhaseBucket::LastQuarter => "下弦の月（かげんのつき）",
            PhaseBucket::WaningCrescent => "有明の月（ありあけのつき）など",
        }
    }

    /// Japanese name without the reading, used as the explanation topic.
    pub fn short_name(self) -> &'static str {
        let name = self.japanese_name();
        name.split('（').next().unwrap_or(name)
    }

    /// True for buckets that only approximate a range of named moons.
    pub fn is_approximate(self) -> bool {
        matches!(
            self,
            PhaseBucket::WaxingCrescent
                | PhaseBucket::WaxingGibbous
                | PhaseBucket::WaningGibbous
                | PhaseBucket::WaningCrescent
        )
    }
}

impl fmt::Display for PhaseBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify an angle in degrees into its phase bucket.
///
/// The angle does not need to be normalized. This is a total function.
///
/// # Example
/// ```
/// use moon_phase_lib::phase::{classify, PhaseBucket};
///
/// assert_eq!(classify(45.0), PhaseBucket::WaxingCrescent);
/// assert_eq!(classify(260.0), PhaseBucket::LastQuarter);
/// assert_eq!(classify(-355.0), PhaseBucket::New);
/// ```
pub fn classify(angle: f64) -> PhaseBucket {
    let n = normalize_angle(angle);
    if n > 350.0 || n < 10.0 {
        PhaseBucket::New
    } else if n < 80.0 {
        PhaseBucket::WaxingCrescent
    } else if n <= 100.0 {
        PhaseBucket::FirstQuarter
    } else if n < 170.0 {
        PhaseBucket::WaxingGibbous
    } else if n <= 190.0 {
        PhaseBucket::Full
    } else if n < 260.0 {
        PhaseBucket::WaningGibbous
    } else if n <= 280.0 {
        PhaseBucket::LastQuarter
    } else {
        PhaseBucket::WaningCrescent
    }
}

/// Illuminated fraction of the disk seen from Earth, `(1 - cos n) / 2`.
pub fn illumination(angle: f64) -> f64 {
    let n = normalize_angle(angle).to_radians();
    ((1.0 - n.cos()) / 2.0).clamp(0.0, 1.0)
}

/// True while the lit fraction is growing (`0 < n < 180`).
pub fn is_waxing(angle: f64) -> bool {
    let n = normalize_angle(angle);
    n > 0.0 && n < 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_resolve_to_documented_side() {
        assert_eq!(classify(10.0), PhaseBucket::WaxingCrescent);
        assert_eq!(classify(80.0), PhaseBucket::FirstQuarter);
        assert_eq!(classify(100.0), PhaseBucket::FirstQuarter);
        assert_eq!(classify(170.0), PhaseBucket::Full);
        assert_eq!(classify(190.0), PhaseBucket::Full);
        assert_eq!(classify(260.0), PhaseBucket::LastQuarter);
        assert_eq!(classify(280.0), PhaseBucket::LastQuarter);
        assert_eq!(classify(350.0), PhaseBucket::WaningCrescent);
    }

    #[test]
    fn test_just_past_boundaries() {
        assert_eq!(classify(9.999), PhaseBucket::New);
        assert_eq!(classify(79.999), PhaseBucket::WaxingCrescent);
        assert_eq!(classify(100.001), PhaseBucket::WaxingGibbous);
        assert_eq!(classify(169.999), PhaseBucket::WaxingGibbous);
        assert_eq!(classify(190.001), PhaseBucket::WaningGibbous);
        assert_eq!(classify(259.999), PhaseBucket::WaningGibbous);
        assert_eq!(classify(280.001), PhaseBucket::WaningCrescent);
        assert_eq!(classify(350.001), PhaseBucket::New);
    }

    #[test]
    fn test_unnormalized_input() {
        assert_eq!(classify(360.0), PhaseBucket::New);
        assert_eq!(classify(-90.0), PhaseBucket::LastQuarter);
        assert_eq!(classify(540.0), PhaseBucket::Full);
        assert_eq!(classify(f64::INFINITY), PhaseBucket::New);
    }

    #[test]
    fn test_short_name_strips_reading() {
        assert_eq!(PhaseBucket::Full.short_name(), "満月");
        assert_eq!(PhaseBucket::WaxingCrescent.short_name(), "三日月");
        assert_eq!(PhaseBucket::LastQuarter.short_name(), "下弦の月");
    }

    #[test]
    fn test_illumination_endpoints() {
        assert!(illumination(0.0).abs() < 1e-12);
        assert!((illumination(90.0) - 0.5).abs() < 1e-12);
        assert!((illumination(180.0) - 1.0).abs() < 1e-12);
        assert!((illumination(270.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_waxing() {
        assert!(is_waxing(45.0));
        assert!(!is_waxing(0.0));
        assert!(!is_waxing(180.0));
        assert!(!is_waxing(200.0));
    }
}
