//! # Angle Interaction
//!
//! The drag handler is the only writer of the current angle. The angle itself
//! is owned by a single [`PhaseController`], which hands plain values to the
//! classifier and the geometry functions on every update.

use crate::{normalize_angle, phase, phase::PhaseBucket, MoonData, Point};

/// Angle in degrees, `[0, 360)`, of a pointer position around `center`.
///
/// Uses screen coordinates, so positive angles run clockwise on screen,
/// consistent with [`crate::terminator::orbit_position`].
///
/// # Example
/// ```
/// use moon_phase_lib::{interaction::angle_from_pointer, Point};
///
/// let center = Point::new(150.0, 150.0);
/// assert_eq!(angle_from_pointer(Point::new(250.0, 150.0), center), 0.0);
/// assert_eq!(angle_from_pointer(Point::new(150.0, 50.0), center), 270.0);
/// ```
pub fn angle_from_pointer(pointer: Point, center: Point) -> f64 {
    let (dx, dy) = pointer.relative_to(center);
    let mut degrees = dy.atan2(dx).to_degrees();
    if degrees < 0.0 {
        degrees += 360.0;
    }
    normalize_angle(degrees)
}

/// Result of one angle change.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseUpdate {
    pub data: MoonData,
    /// True when the phase bucket differs from the one before this update
    pub bucket_changed: bool,
}

/// Owner of the current angle and the drag state of the orbit view.
#[derive(Clone, Debug)]
pub struct PhaseController {
    angle: f64,
    orbit_center: Point,
    dragging: bool,
}

impl PhaseController {
    pub fn new(initial_angle: f64, orbit_center: Point) -> Self {
        Self {
            angle: normalize_angle(initial_angle),
            orbit_center,
            dragging: false,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn phase(&self) -> PhaseBucket {
        phase::classify(self.angle)
    }

    pub fn data(&self) -> MoonData {
        MoonData::from_angle(self.angle)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Set the angle directly, e.g. from a date or a command line argument.
    pub fn set_angle(&mut self, angle: f64) -> PhaseUpdate {
        let before = self.phase();
        self.angle = normalize_angle(angle);
        let data = self.data();
        log::debug!("angle set to {:.1}° ({})", data.angle, data.phase);
        PhaseUpdate {
            bucket_changed: data.phase != before,
            data,
        }
    }

    /// Feed a pointer position. Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, pointer: Point) -> Option<PhaseUpdate> {
        if !self.dragging {
            return None;
        }
        Some(self.set_angle(angle_from_pointer(pointer, self.orbit_center)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(150.0, 150.0);

    #[test]
    fn test_angle_from_pointer_quadrants() {
        assert_eq!(angle_from_pointer(Point::new(250.0, 150.0), CENTER), 0.0);
        assert!((angle_from_pointer(Point::new(150.0, 250.0), CENTER) - 90.0).abs() < 1e-9);
        assert!((angle_from_pointer(Point::new(50.0, 150.0), CENTER) - 180.0).abs() < 1e-9);
        assert!((angle_from_pointer(Point::new(150.0, 50.0), CENTER) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_at_center_is_zero() {
        assert_eq!(angle_from_pointer(CENTER, CENTER), 0.0);
    }

    #[test]
    fn test_drag_requires_begin() {
        let mut controller = PhaseController::new(45.0, CENTER);
        assert!(controller.drag_to(Point::new(50.0, 150.0)).is_none());
        assert_eq!(controller.angle(), 45.0);

        controller.begin_drag();
        let update = controller.drag_to(Point::new(50.0, 150.0)).unwrap();
        assert_eq!(update.data.phase, PhaseBucket::Full);
        assert!(update.bucket_changed);

        controller.end_drag();
        assert!(controller.drag_to(Point::new(250.0, 150.0)).is_none());
        assert_eq!(controller.phase(), PhaseBucket::Full);
    }

    #[test]
    fn test_bucket_changed_only_on_transition() {
        let mut controller = PhaseController::new(45.0, CENTER);
        assert!(!controller.set_angle(50.0).bucket_changed);
        assert!(controller.set_angle(90.0).bucket_changed);
        assert!(!controller.set_angle(-265.0).bucket_changed);
        assert_eq!(controller.angle(), 95.0);
    }
}
