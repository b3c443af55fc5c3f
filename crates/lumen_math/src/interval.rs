/// Closed range `[min, max]` on the real line.
///
/// Bounding-box slabs and source wavelength bands are both intervals.
/// `min > max` means the range holds nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Width of the range.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive membership test.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min && x <= self.max
    }

    /// Value at fraction `t` of the way from `min` to `max`.
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + self.size() * t
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Grow by `amount` in total, split evenly between both ends.
    pub fn expand(&self, amount: f32) -> Interval {
        let half = amount * 0.5;
        Interval::new(self.min - half, self.max + half)
    }

    /// Shift both ends by `offset`.
    pub fn shifted(&self, offset: f32) -> Interval {
        Interval::new(self.min + offset, self.max + offset)
    }

    /// Smallest range covering both `a` and `b`.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Contains nothing; neutral for [`Interval::surrounding`].
    pub const EMPTY: Interval = Interval::new(f32::INFINITY, f32::NEG_INFINITY);
}
