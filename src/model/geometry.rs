//! Geometry and color primitives in PDF user space (points, origin bottom-left).

use lopdf::Object;

use crate::error::{Error, Result};

/// Extract a number from an integer or real PDF object.
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// An axis-aligned rectangle given by its lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl Rect {
    /// Create a rectangle from two corners.
    pub fn new(llx: f32, lly: f32, urx: f32, ury: f32) -> Self {
        Self { llx, lly, urx, ury }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Width of the rectangle (always non-negative).
    pub fn width(&self) -> f32 {
        (self.urx - self.llx).abs()
    }

    /// Height of the rectangle (always non-negative).
    pub fn height(&self) -> f32 {
        (self.ury - self.lly).abs()
    }

    /// Same rectangle with corners ordered so that `ll <= ur`.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.llx.min(self.urx),
            self.lly.min(self.ury),
            self.llx.max(self.urx),
            self.lly.max(self.ury),
        )
    }

    /// Parse a PDF rectangle array such as `/MediaBox [0 0 595 842]`.
    pub fn from_object(obj: &Object) -> Result<Self> {
        let array = obj
            .as_array()
            .map_err(|_| Error::Corrupted("rectangle is not an array".to_string()))?;
        if array.len() != 4 {
            return Err(Error::Corrupted(format!(
                "rectangle has {} entries, expected 4",
                array.len()
            )));
        }
        let mut coords = [0.0f32; 4];
        for (slot, value) in coords.iter_mut().zip(array) {
            *slot = number(value)
                .ok_or_else(|| Error::Corrupted("rectangle entry is not a number".to_string()))?;
        }
        Ok(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }

    /// Convert into a PDF rectangle array.
    pub fn to_object(&self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

/// A page size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4 portrait (210 x 297 mm).
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };

    /// US Letter portrait (8.5 x 11 in).
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    /// Create a page size from width and height in points.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The page box for this size, anchored at the origin.
    pub fn media_box(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// An affine transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32, // X translation
    pub f: f32, // Y translation
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self × other`, i.e. apply `self` first, then `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Parse six numeric operands or array entries.
    pub fn from_objects(values: &[Object]) -> Option<Self> {
        if values.len() < 6 {
            return None;
        }
        let mut m = [0.0f32; 6];
        for (slot, value) in m.iter_mut().zip(values) {
            *slot = number(value)?;
        }
        Some(Self::new(m[0], m[1], m[2], m[3], m[4], m[5]))
    }
}

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const YELLOW: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 0.0,
    };

    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Parse a `#RRGGBB` hex string.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| f32::from(v) / 255.0)
                .map_err(|_| invalid())
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Operands for the `rg`/`RG` operators.
    pub fn operands(&self) -> Vec<Object> {
        vec![
            Object::Real(self.r),
            Object::Real(self.g),
            Object::Real(self.b),
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::YELLOW
    }
}
