use glam::Vec2;

/// A rubber-band drag in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    origin: Vec2,
    current: Vec2,
}

impl Marquee {
    pub fn new(origin: Vec2) -> Self {
        Self {
            origin,
            current: origin,
        }
    }

    pub fn update(&mut self, point: Vec2) {
        self.current = point;
    }

    pub fn rect(&self) -> ScreenRect {
        ScreenRect {
            min: self.origin.min(self.current),
            max: self.origin.max(self.current),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ScreenRect {
    /// Edges count as inside.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}
