//! # Moon Phase Explorer Core Library
//!
//! This library provides the geometric phase model behind the moon phase
//! explorer: a single continuous Sun–Earth–Moon angle is turned into a named
//! phase bucket and into the exact outline of the lit part of the Moon, both
//! as seen from Earth and from above the orbit.
//!
//! ## Design Philosophy
//!
//! ### Pure Core
//! - **Free functions**: [`phase::classify`] and [`terminator::lit_outline`] take
//!   a plain `f64` angle and return plain, serializable values
//! - **Total**: every input angle is defined through [`normalize_angle`], so
//!   nothing in the core returns a `Result`
//! - **No retained state**: the only mutable value, the current angle, lives in
//!   [`interaction::PhaseController`] and is passed down explicitly
//!
//! ### Angle Convention
//! - **0°**: New Moon, the Moon sits between Earth and the Sun (Sun to the right)
//! - **90°**: First Quarter, right half lit
//! - **180°**: Full Moon
//! - **270°**: Last Quarter, left half lit
//!
//! ### Data Flow
//! 1. **Pointer**: drag position → [`interaction::angle_from_pointer`] → angle
//! 2. **Core**: angle → [`phase::PhaseBucket`] + [`terminator::LitOutline`]
//! 3. **Render**: outline → SVG / ASCII / `embedded-graphics` target
//! 4. **Tutor**: bucket change → debounced explanation via [`scheduler`]
//!
//! ## Core Types
//! - [`Point`]: a 2D coordinate in screen space (y grows downward)
//! - [`MoonData`]: snapshot of everything derived from one angle

use serde::{Deserialize, Serialize};

// Module declarations
pub mod chat;
pub mod config;
pub mod fallback;
pub mod interaction;
pub mod lunar;
pub mod phase;
pub mod quiz;
pub mod renderer;
pub mod scheduler;
pub mod terminator;
pub mod tutor;

#[cfg(test)]
mod tests;

use phase::PhaseBucket;

/// A point in SVG screen coordinates.
///
/// The x axis grows to the right and the y axis grows *downward*, matching the
/// SVG user space every renderer in this crate draws into.
///
/// # Example
/// ```
/// use moon_phase_lib::Point;
///
/// let center = Point::new(100.0, 100.0);
/// assert_eq!(center.x, 100.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset of `self` relative to `origin`.
    pub fn relative_to(self, origin: Point) -> (f64, f64) {
        (self.x - origin.x, self.y - origin.y)
    }
}

/// Reduce any angle in degrees to the canonical range `[0, 360)`.
///
/// Multiples of 360 map to exactly `0.0`. Values that would round up to `360.0`
/// (tiny negatives) are folded back to `0.0`. Non-finite input maps to `0.0`
/// so that every caller downstream stays total.
///
/// # Example
/// ```
/// use moon_phase_lib::normalize_angle;
///
/// assert_eq!(normalize_angle(-90.0), 270.0);
/// assert_eq!(normalize_angle(720.0), 0.0);
/// assert_eq!(normalize_angle(f64::NAN), 0.0);
/// ```
pub fn normalize_angle(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let n = degrees.rem_euclid(360.0);
    if n >= 360.0 {
        0.0
    } else {
        n
    }
}

/// Everything the views display for one angle.
///
/// Built by [`MoonData::from_angle`]; serializes cleanly for the `--json`
/// output of the command line tool.
///
/// # Example
/// ```
/// use moon_phase_lib::MoonData;
/// use moon_phase_lib::phase::PhaseBucket;
///
/// let data = MoonData::from_angle(180.0);
/// assert_eq!(data.phase, PhaseBucket::Full);
/// assert!((data.illumination - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoonData {
    /// Normalized angle in degrees, `[0, 360)`
    pub angle: f64,
    pub phase: PhaseBucket,
    /// English bucket label
    pub label: String,
    /// Japanese display name including reading
    pub japanese_name: String,
    /// Illuminated fraction of the disk (0–1)
    pub illumination: f64,
}

impl MoonData {
    pub fn from_angle(angle: f64) -> Self {
        let angle = normalize_angle(angle);
        let phase = phase::classify(angle);
        Self {
            angle,
            phase,
            label: phase.label().to_string(),
            japanese_name: phase.japanese_name().to_string(),
            illumination: phase::illumination(angle),
        }
    }
}
