use crate::{Interval, Vec3};

/// Minimum thickness along any axis, so planar faces still get a volume.
const MIN_EXTENT: f32 = 1e-4;

/// Axis-aligned box, one [`Interval`] per axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Box spanned by two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let (lo, hi) = (a.min(b), a.max(b));
        Self {
            x: Interval::new(lo.x, hi.x),
            y: Interval::new(lo.y, hi.y),
            z: Interval::new(lo.z, hi.z),
        }
        .padded()
    }

    /// Tightest box around `points`; [`Aabb::EMPTY`] for no points.
    pub fn from_point_cloud(points: &[Vec3]) -> Self {
        let Some((first, rest)) = points.split_first() else {
            return Self::EMPTY;
        };
        let (lo, hi) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self::from_points(lo, hi)
    }

    pub fn surrounding(a: &Aabb, b: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&a.x, &b.x),
            y: Interval::surrounding(&a.y, &b.y),
            z: Interval::surrounding(&a.z, &b.z),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    fn padded(self) -> Self {
        let pad = |i: Interval| {
            if i.size() < MIN_EXTENT {
                i.expand(MIN_EXTENT)
            } else {
                i
            }
        };
        Self {
            x: pad(self.x),
            y: pad(self.y),
            z: pad(self.z),
        }
    }

    /// The same box moved by `offset`. Empty boxes stay empty.
    pub fn translate(&self, offset: Vec3) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb {
            x: self.x.shifted(offset.x),
            y: self.y.shifted(offset.y),
            z: self.z.shifted(offset.z),
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min() + self.max()) * 0.5
    }

    /// Diagonal length, 0 for an empty box.
    pub fn size(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.min().distance(self.max())
        }
    }

    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_in_any_order() {
        let aabb = Aabb::from_points(Vec3::new(-20.0, 40.0, 20.0), Vec3::new(0.0, 20.0, 0.0));

        assert_eq!(aabb.min(), Vec3::new(-20.0, 20.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(0.0, 40.0, 20.0));
        assert_eq!(aabb.centroid(), Vec3::new(-10.0, 30.0, 10.0));
    }

    #[test]
    fn test_point_cloud() {
        let aabb = Aabb::from_point_cloud(&[Vec3::new(1.0, -2.0, 0.5), Vec3::new(-1.0, 3.0, 0.0), Vec3::ZERO]);

        assert_eq!(aabb.min(), Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 3.0, 0.5));
        assert!(Aabb::from_point_cloud(&[]).is_empty());
    }

    #[test]
    fn test_planar_and_point_boxes_have_volume() {
        let face = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 3.0, 0.0));
        assert!(face.z.size() >= MIN_EXTENT);
        assert!(face.contains(Vec3::new(1.0, 1.0, 0.0)));

        let point = Aabb::from_points(Vec3::ONE, Vec3::ONE);
        assert!(point.contains(Vec3::ONE));
        assert!(!point.is_empty());
    }

    #[test]
    fn test_surrounding() {
        let a = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::from_points(Vec3::splat(-2.0), Vec3::splat(0.5));
        let both = Aabb::surrounding(&a, &b);

        assert_eq!(both.min(), Vec3::splat(-2.0));
        assert_eq!(both.max(), Vec3::ONE);
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &a), a);
    }

    #[test]
    fn test_size() {
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::new(2.0, 2.0, 1.0));
        assert!((aabb.size() - 3.0).abs() < 1e-5);
        assert_eq!(Aabb::EMPTY.size(), 0.0);
    }

    #[test]
    fn test_translate() {
        let moved = Aabb::from_points(Vec3::ZERO, Vec3::ONE).translate(Vec3::new(0.0, 0.0, -4.0));

        assert_eq!(moved.min(), Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(moved.max(), Vec3::new(1.0, 1.0, -3.0));
        assert!(Aabb::EMPTY.translate(Vec3::ONE).is_empty());
    }
}
