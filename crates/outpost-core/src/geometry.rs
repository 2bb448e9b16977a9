//! Rectangles and the overlap primitive used by collision resolution.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::Actor;

/// Axis-aligned rectangle given by its min and max corners.
///
/// Used for actor bodies, the playfield and recycling regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Aabb {
    /// Creates a rectangle from its corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// A rectangle anchored at the origin with the given size.
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::new(width, height))
    }

    /// A rectangle centered on `center`.
    #[must_use]
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Returns `true` if either dimension is non-positive or non-finite.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let size = self.size();
        !(size.x.is_finite() && size.y.is_finite() && size.x > 0.0 && size.y > 0.0)
    }

    /// Grows the rectangle by `margin` on every side.
    #[must_use]
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    /// Inclusive containment: points on the edge are inside.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Returns `true` if `other` lies entirely inside this rectangle, edges
    /// included.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Strict overlap: rectangles that only touch do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Nearest point inside the rectangle.
    #[must_use]
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Uniformly random point inside the rectangle.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            self.min.x + rng.gen::<f32>() * (self.max.x - self.min.x),
            self.min.y + rng.gen::<f32>() * (self.max.y - self.min.y),
        )
    }
}

/// Spatial overlap test between two actors.
///
/// This is the seam where a host engine's own overlap primitive plugs in.
/// The collision resolver only asks whether two bodies overlap.
pub trait OverlapTest: Send + Sync {
    /// Returns `true` if the two actors' bodies overlap.
    fn overlaps(&self, a: &Actor, b: &Actor) -> bool;
}

/// Overlap of the actors' axis-aligned bounding boxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AabbOverlap;

impl OverlapTest for AabbOverlap {
    fn overlaps(&self, a: &Actor, b: &Actor) -> bool {
        a.bounds().intersects(&b.bounds())
    }
}

/// Overlap of circles centered on each body, with radius equal to the larger
/// half extent. The circle covers the body's shorter side and touches the
/// longer one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CircleOverlap;

impl OverlapTest for CircleOverlap {
    fn overlaps(&self, a: &Actor, b: &Actor) -> bool {
        let reach = a.half_extents.max_element() + b.half_extents.max_element();
        a.position().distance_squared(b.position()) < reach * reach
    }
}
