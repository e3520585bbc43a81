use cgmath::prelude::*;
use rand::Rng;

use crate::config::{ColorSpec, ParticlesConfig, Sample, WellConfig};
use crate::error::{Error, Result};
use crate::math::{self, Rgb, Vec2};

/// How far a well reaches when pulling on particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureRadius {
    Unbounded,
    Within(f32),
}

impl CaptureRadius {
    pub fn captures(&self, distance: f32) -> bool {
        match *self {
            CaptureRadius::Unbounded => true,
            CaptureRadius::Within(radius) => distance < radius,
        }
    }
}

impl From<Option<f32>> for CaptureRadius {
    fn from(radius: Option<f32>) -> Self {
        match radius {
            Some(radius) if radius > 0.0 => CaptureRadius::Within(radius),
            _ => CaptureRadius::Unbounded,
        }
    }
}

/// The extra state that turns a particle into a gravity well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractionProfile {
    capture_radius: CaptureRadius,
    pub connection_radius: f32,
    /// Positive pulls, negative pushes.
    pub attraction: f32,
}

impl AttractionProfile {
    pub fn new(capture_radius: CaptureRadius, connection_radius: f32, attraction: f32) -> Self {
        Self {
            capture_radius,
            connection_radius,
            attraction,
        }
    }

    pub fn capture_radius(&self) -> CaptureRadius {
        self.capture_radius
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    size: f32,
    pub opacity: f32,
    pub color: Rgb,
    attraction: Option<AttractionProfile>,
}

impl Particle {
    /// Builds a plain particle with an already resolved size and color.
    pub fn new(position: Vec2, size: f32, color: Rgb) -> Result<Self> {
        if size < 0.0 {
            return Err(Error::Size(size));
        }
        Ok(Self {
            position,
            velocity: Vec2::zero(),
            acceleration: Vec2::zero(),
            size,
            opacity: 1.0,
            color,
            attraction: None,
        })
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_attraction(mut self, profile: AttractionProfile) -> Self {
        self.attraction = Some(profile);
        self
    }

    /// Builds a free particle from the `particles` section.
    pub fn from_config<R: Rng + ?Sized>(
        rng: &mut R,
        position: Vec2,
        config: &ParticlesConfig,
    ) -> Result<Self> {
        let size = resolve_size(rng, config.size.as_ref())?;
        let color = resolve_color(rng, config.color.as_ref(), "particles")?;
        let opacity = config.opacity.filter(|o| *o != 0.0).unwrap_or(1.0);
        Ok(Self::new(position, size, color)?.with_opacity(opacity))
    }

    /// Builds a gravity well from a `cursor` or `gravityPoints` section.
    pub fn well_from_config<R: Rng + ?Sized>(
        rng: &mut R,
        position: Vec2,
        config: &WellConfig,
        subject: &'static str,
    ) -> Result<Self> {
        let size = resolve_size(rng, config.size.as_ref())?;
        let color = resolve_color(rng, config.color.as_ref(), subject)?;
        let profile = AttractionProfile::new(
            CaptureRadius::from(config.capture_radius),
            config.lines_radius.unwrap_or(0.0),
            config.gravity.unwrap_or(0.0),
        );
        Ok(Self::new(position, size, color)?.with_attraction(profile))
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn attraction(&self) -> Option<&AttractionProfile> {
        self.attraction.as_ref()
    }

    pub fn is_well(&self) -> bool {
        self.attraction.is_some()
    }

    pub fn speed(&self) -> f32 {
        math::length(self.velocity)
    }

    /// Gives the particle a random heading at exactly `start_speed`.
    pub fn set_velocity<R: Rng + ?Sized>(&mut self, rng: &mut R, start_speed: f32) -> Result<()> {
        let vx = math::uniform(rng, [-1.0, 1.0])? * start_speed;
        let vy = math::solve_other_component(vx, start_speed).unwrap_or(0.0);
        self.velocity = Vec2::new(vx, math::random_sign(rng) * vy);
        Ok(())
    }
}

fn resolve_size<R: Rng + ?Sized>(rng: &mut R, size: Option<&Sample>) -> Result<f32> {
    match size {
        None => Ok(1.0),
        Some(Sample::Fixed(value)) if *value < 0.0 => Err(Error::Size(*value)),
        Some(sample) => sample.sample(rng),
    }
}

fn resolve_color<R: Rng + ?Sized>(
    rng: &mut R,
    color: Option<&ColorSpec>,
    subject: &'static str,
) -> Result<Rgb> {
    match color {
        None => Ok(Rgb::WHITE),
        Some(spec) => spec.resolve(rng, subject),
    }
}
