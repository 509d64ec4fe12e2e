#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColorLinPremul {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Alias for the premultiplied linear color type, for a friendlier name in APIs.
pub type Color = ColorLinPremul;

// Constructors for ColorLinPremul are defined in color.rs to keep scene.rs focused

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn origin(&self) -> [f32; 2] {
        [self.x, self.y]
    }

    pub fn size(&self) -> [f32; 2] {
        [self.w, self.h]
    }

    /// Same size, origin moved by `-offset` and snapped down to whole pixels.
    pub fn relative_to(&self, offset: [f32; 2]) -> Self {
        Self {
            x: (self.x - offset[0]).floor(),
            y: (self.y - offset[1]).floor(),
            w: self.w,
            h: self.h,
        }
    }

    /// Grow on every side by `amount`.
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            w: self.w + amount * 2.0,
            h: self.h + amount * 2.0,
        }
    }
}
