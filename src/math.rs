//! Numeric and color helpers shared by the entity model and the renderer.

use std::fmt;

use cgmath::prelude::*;
use cgmath::Vector2;
use rand::Rng;

use crate::error::{Error, Result};

pub type Vec2 = Vector2<f32>;

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).magnitude()
}

pub fn length(v: Vec2) -> f32 {
    distance(v, Vec2::zero())
}

/// Draws a value uniformly from `[start, end)`.
///
/// A degenerate range `[a, a]` yields `a`. Non-finite bounds are a range
/// error. The draw is made in `f64` so spans wider than `f32::MAX` work.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, range: [f32; 2]) -> Result<f32> {
    let [start, end] = range;
    if start > end || !start.is_finite() || !end.is_finite() {
        return Err(Error::Range { start, end });
    }
    if start == end {
        return Ok(start);
    }
    let t: f64 = rng.gen_range(0.0..1.0);
    let value = (start as f64 + t * (end as f64 - start as f64)) as f32;
    // rounding back to f32 can land on `end`
    Ok(if value < end { value } else { start })
}

/// Returns -1.0 or 1.0 with equal probability. A zero sample is redrawn.
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    loop {
        let sample: f32 = rng.gen_range(-1.0..1.0);
        if sample != 0.0 {
            return sample.signum();
        }
    }
}

/// Solves `|y|` in `x^2 + y^2 = magnitude^2` for a known `x`.
///
/// Returns `None` when `|known|` exceeds `magnitude`. A discriminant that is
/// negative only through rounding is clamped to zero.
pub fn solve_other_component(known: f32, magnitude: f32) -> Option<f32> {
    if known.abs() > magnitude.abs() {
        return None;
    }
    Some((magnitude * magnitude - known * known).max(0.0).sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Each channel is drawn independently from `[0, 255)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            r: rng.gen_range(0..255),
            g: rng.gen_range(0..255),
            b: rng.gen_range(0..255),
        }
    }

    pub fn with_opacity(self, opacity: f32) -> Rgba {
        Rgba { rgb: self, opacity }
    }
}

/// A color paired with the opacity it is drawn at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub opacity: f32,
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({},{},{},{})",
            self.rgb.r, self.rgb.g, self.rgb.b, self.opacity
        )
    }
}

/// Formats a color in the `rgba(r,g,b,a)` notation. Callers keep `opacity`
/// within `[0, 1]`.
pub fn to_rgba(color: Rgb, opacity: f32) -> String {
    color.with_opacity(opacity).to_string()
}

pub fn colors_equal(a: Rgb, b: Rgb) -> bool {
    a.r == b.r && a.g == b.g && a.b == b.b
}
