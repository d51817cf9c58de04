//! # Terminator Geometry
//!
//! Builds the outline of the illuminated part of the Moon's disk for the two
//! views of the explorer.
//!
//! ## Earth View
//!
//! Seen from Earth the lit region is bounded by half of the limb (the disk's
//! outer edge) on the sunlit side and by the terminator, the projection of the
//! day/night boundary. The terminator projects to a half-ellipse with vertical
//! radius `r` and horizontal half-width
//!
//! ```text
//! tx = r * cos(angle)
//! ```
//!
//! - **Waxing (`0 < n < 180`)**: the right (east) limb is lit. The terminator
//!   cuts into the right half-disk below 90° (crescent) and bulges into the
//!   dark left half from 90° on (gibbous)
//! - **Waning (`180 < n < 360`)**: the left (west) limb is lit. The terminator
//!   bulges into the dark right half up to 270° (gibbous) and cuts into the left
//!   half-disk after it (crescent)
//!
//! The outline at `θ` is the mirror image of the outline at `360 - θ`, and
//! waning outlines are built that way from their waxing counterparts.
//!
//! ## Tolerance Table
//!
//! Exact angles are matched through [`POLE_EPSILON_DEG`], applied symmetrically:
//!
//! | normalized angle `n`          | outline                           |
//! |-------------------------------|-----------------------------------|
//! | `n < ε` or `n > 360 - ε`      | [`LitOutline::Empty`]             |
//! | `abs(n - 180) < ε`            | [`LitOutline::Full`]              |
//! | `abs(n - 90) < ε`, `abs(n - 270) < ε` | half disk, straight terminator |
//! | otherwise                     | elliptical terminator             |
//!
//! ## Orbit View
//!
//! From above the orbit the Sun always lights the same absolute hemisphere,
//! the one facing angle 0, so [`sunlit_hemisphere`] does not take an angle.

use crate::{normalize_angle, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tolerance in degrees for the special-cased angles (0/360, 90, 180, 270).
pub const POLE_EPSILON_DEG: f64 = 1e-6;

/// Which side of the disk carries the lit half of the limb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limb {
    /// Right side on screen
    East,
    /// Left side on screen
    West,
}

impl Limb {
    pub fn opposite(self) -> Self {
        match self {
            Limb::East => Limb::West,
            Limb::West => Limb::East,
        }
    }
}

/// Shape of the terminator relative to the lit half-disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bulge {
    /// Cuts into the lit half-disk, leaving a crescent
    Concave,
    /// Bulges into the dark half, leaving a gibbous shape
    Convex,
    /// Degenerate ellipse at the quarters
    Straight,
}

/// One drawing command in SVG screen coordinates.
///
/// Arcs always use an x-axis rotation of zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo {
        to: Point,
    },
    ArcTo {
        rx: f64,
        ry: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    LineTo {
        to: Point,
    },
    Close,
}

impl PathCommand {
    /// SVG path-data fragment for this command.
    pub fn to_svg(&self) -> String {
        match *self {
            PathCommand::MoveTo { to } => format!("M {},{}", fmt_num(to.x), fmt_num(to.y)),
            PathCommand::ArcTo {
                rx,
                ry,
                large_arc,
                sweep,
                to,
            } => format!(
                "A {},{} 0 {},{} {},{}",
                fmt_num(rx),
                fmt_num(ry),
                large_arc as u8,
                sweep as u8,
                fmt_num(to.x),
                fmt_num(to.y)
            ),
            PathCommand::LineTo { to } => format!("L {},{}", fmt_num(to.x), fmt_num(to.y)),
            PathCommand::Close => "Z".to_string(),
        }
    }

    /// Reflect across the vertical line `x = axis_x`.
    ///
    /// Mirroring reverses the orientation of every arc, so the sweep flag flips.
    pub fn mirrored(&self, axis_x: f64) -> PathCommand {
        let flip = |p: Point| Point::new(2.0 * axis_x - p.x, p.y);
        match *self {
            PathCommand::MoveTo { to } => PathCommand::MoveTo { to: flip(to) },
            PathCommand::ArcTo {
                rx,
                ry,
                large_arc,
                sweep,
                to,
            } => PathCommand::ArcTo {
                rx,
                ry,
                large_arc,
                sweep: !sweep,
                to: flip(to),
            },
            PathCommand::LineTo { to } => PathCommand::LineTo { to: flip(to) },
            PathCommand::Close => PathCommand::Close,
        }
    }
}

/// The illuminated region of a disk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LitOutline {
    /// New Moon: nothing is lit
    Empty,
    /// Full Moon: the whole disk is lit
    Full { center: Point, radius: f64 },
    /// Half of the limb closed by the terminator.
    ///
    /// `terminator_x` is the signed horizontal offset of the terminator at the
    /// disk's equator, positive to the right of `center`.
    Partial {
        center: Point,
        radius: f64,
        limb: Limb,
        terminator_x: f64,
    },
}

impl LitOutline {
    /// Drawing commands for the closed outline, empty for [`LitOutline::Empty`].
    pub fn commands(&self) -> Vec<PathCommand> {
        match *self {
            LitOutline::Empty => Vec::new(),
            LitOutline::Full { center, radius } => {
                let left = Point::new(center.x - radius, center.y);
                let right = Point::new(center.x + radius, center.y);
                vec![
                    PathCommand::MoveTo { to: left },
                    PathCommand::ArcTo {
                        rx: radius,
                        ry: radius,
                        large_arc: true,
                        sweep: true,
                        to: right,
                    },
                    PathCommand::ArcTo {
                        rx: radius,
                        ry: radius,
                        large_arc: true,
                        sweep: true,
                        to: left,
                    },
                    PathCommand::Close,
                ]
            }
            LitOutline::Partial {
                center,
                radius,
                limb,
                terminator_x,
            } => {
                let top = Point::new(center.x, center.y - radius);
                let bottom = Point::new(center.x, center.y + radius);

                // Top to bottom along the lit limb; sweep=1 passes the right side
                let limb_arc = PathCommand::ArcTo {
                    rx: radius,
                    ry: radius,
                    large_arc: false,
                    sweep: limb == Limb::East,
                    to: bottom,
                };

                // Bottom back to top; sweep=0 passes the right side on the way up
                let terminator = if terminator_x == 0.0 {
                    PathCommand::LineTo { to: top }
                } else {
                    PathCommand::ArcTo {
                        rx: terminator_x.abs(),
                        ry: radius,
                        large_arc: false,
                        sweep: terminator_x < 0.0,
                        to: top,
                    }
                };

                vec![
                    PathCommand::MoveTo { to: top },
                    limb_arc,
                    terminator,
                    PathCommand::Close,
                ]
            }
        }
    }

    /// SVG `d` attribute. Empty string at New Moon.
    ///
    /// # Example
    /// ```
    /// use moon_phase_lib::{terminator::lit_outline, Point};
    ///
    /// let d = lit_outline(90.0, 80.0, Point::new(100.0, 100.0)).to_svg_path();
    /// assert_eq!(d, "M 100,20 A 80,80 0 0,1 100,180 L 100,20 Z");
    /// ```
    pub fn to_svg_path(&self) -> String {
        self.commands()
            .iter()
            .map(PathCommand::to_svg)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LitOutline::Empty)
    }

    /// Shape of the terminator, `None` when there is no terminator.
    pub fn bulge(&self) -> Option<Bulge> {
        match *self {
            LitOutline::Partial {
                limb, terminator_x, ..
            } => Some(if terminator_x == 0.0 {
                Bulge::Straight
            } else if (terminator_x > 0.0) == (limb == Limb::East) {
                Bulge::Concave
            } else {
                Bulge::Convex
            }),
            _ => None,
        }
    }

    /// Exact area of the lit region.
    ///
    /// A half-disk plus or minus a half-ellipse with radii `(|tx|, r)`, which
    /// works out to `π r² (1 - cos n) / 2`.
    pub fn area(&self) -> f64 {
        match *self {
            LitOutline::Empty => 0.0,
            LitOutline::Full { radius, .. } => PI * radius * radius,
            LitOutline::Partial {
                radius,
                terminator_x,
                ..
            } => {
                let half_disk = PI * radius * radius / 2.0;
                let half_ellipse = PI * terminator_x.abs() * radius / 2.0;
                match self.bulge() {
                    Some(Bulge::Concave) => half_disk - half_ellipse,
                    Some(Bulge::Convex) => half_disk + half_ellipse,
                    _ => half_disk,
                }
            }
        }
    }

    /// True if `p` lies inside the lit region (boundary included).
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            LitOutline::Empty => false,
            LitOutline::Full { center, radius } => {
                let (dx, dy) = p.relative_to(center);
                dx * dx + dy * dy <= radius * radius
            }
            LitOutline::Partial {
                center,
                radius,
                limb,
                terminator_x,
            } => {
                let (dx, dy) = p.relative_to(center);
                if dx * dx + dy * dy > radius * radius || radius == 0.0 {
                    return false;
                }
                // Terminator x at this height on the ellipse (|tx|, r)
                let t = dy / radius;
                let boundary = terminator_x * (1.0 - t * t).max(0.0).sqrt();
                match limb {
                    Limb::East => dx >= boundary,
                    Limb::West => dx <= boundary,
                }
            }
        }
    }

    /// Reflection across the vertical axis through the disk's center.
    pub fn mirrored(&self) -> LitOutline {
        match *self {
            LitOutline::Partial {
                center,
                radius,
                limb,
                terminator_x,
            } => LitOutline::Partial {
                center,
                radius,
                limb: limb.opposite(),
                terminator_x: flip_sign(terminator_x),
            },
            other => other,
        }
    }
}

/// Outline of the lit region of a disk seen from Earth at `angle` degrees.
///
/// # Example
/// ```
/// use moon_phase_lib::{terminator::{lit_outline, Bulge}, Point};
///
/// let c = Point::new(0.0, 0.0);
/// assert!(lit_outline(0.0, 10.0, c).is_empty());
/// assert_eq!(lit_outline(45.0, 10.0, c).bulge(), Some(Bulge::Concave));
/// assert_eq!(lit_outline(135.0, 10.0, c).bulge(), Some(Bulge::Convex));
/// ```
pub fn lit_outline(angle: f64, radius: f64, center: Point) -> LitOutline {
    let n = normalize_angle(angle);
    let radius = radius.abs();

    if n < POLE_EPSILON_DEG || n > 360.0 - POLE_EPSILON_DEG {
        return LitOutline::Empty;
    }
    if (n - 180.0).abs() < POLE_EPSILON_DEG {
        return LitOutline::Full { center, radius };
    }

    if n > 180.0 {
        // Waning is the waxing outline at 360 - n, reflected
        return lit_outline(360.0 - n, radius, center).mirrored();
    }

    let tx = if (n - 90.0).abs() < POLE_EPSILON_DEG {
        0.0
    } else {
        radius * n.to_radians().cos()
    };

    LitOutline::Partial {
        center,
        radius,
        limb: Limb::East,
        terminator_x: tx,
    }
}

/// Position of the Moon on its orbit in the top-down view.
///
/// Angle 0 lies to the right of `center`, towards the Sun. Positive angles run
/// downward on screen, matching [`crate::interaction::angle_from_pointer`].
pub fn orbit_position(center: Point, orbit_radius: f64, angle: f64) -> Point {
    let theta = normalize_angle(angle).to_radians();
    Point::new(
        center.x + orbit_radius * theta.cos(),
        center.y + orbit_radius * theta.sin(),
    )
}

/// The fixed lit half of the Moon in the orbit view: the hemisphere facing the
/// Sun at angle 0, whatever the Moon's orbital position.
pub fn sunlit_hemisphere(center: Point, radius: f64) -> LitOutline {
    LitOutline::Partial {
        center,
        radius: radius.abs(),
        limb: Limb::East,
        terminator_x: 0.0,
    }
}

fn flip_sign(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        -v
    }
}

/// Compact number formatting for path data: at most three decimals, no
/// trailing zeros, no negative zero.
fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_string();
    }
    let s = format!("{:.3}", rounded);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
