/// Width range of a renderable: the narrowest it can be drawn without
/// becoming unreadable, and the width it takes when unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    pub min: usize,
    pub max: usize,
}

impl Measurement {
    /// Keeps `min <= max`.
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min: min.min(max),
            max,
        }
    }

    pub fn fixed(width: usize) -> Self {
        Self::new(width, width)
    }

    pub fn span(&self) -> usize {
        self.max - self.min
    }

    /// Limit both bounds to `width`.
    pub fn clamp_max(self, width: usize) -> Self {
        Self::new(self.min.min(width), self.max.min(width))
    }

    /// Grow both bounds by `cells`, for padding and borders.
    pub fn grow(self, cells: usize) -> Self {
        Self::new(self.min + cells, self.max + cells)
    }

    /// Widest of both bounds.
    pub fn union(self, other: Measurement) -> Self {
        Self::new(self.min.max(other.min), self.max.max(other.max))
    }
}
