//! Session configuration, loaded from YAML.
//!
//! Every field is optional. An empty document yields a black, borderless
//! canvas with no particles.
//!
//! ```yaml
//! seed: 42
//! canvas:
//!   color: { r: 10, g: 10, b: 20 }
//!   gravity: { x: 0.0, y: 0.02 }
//!   spaceDensity: 0.01
//!   trailing: 0.6
//!   borders: { top: true, bottom: true, left: true, right: true }
//! particles:
//!   count: 120
//!   size: [1.0, 3.0]
//!   speed: { start: [0.5, 1.5], min: 0.3, max: 2.0 }
//!   color: random
//!   opacity: 0.2
//!   linesRadius: 90
//!   elasticity: 0.9
//! cursor:
//!   captureRadius: 200
//!   linesRadius: 150
//!   gravity: 0.05
//!   color: { r: 255, g: 255, b: 255 }
//!   size: 4
//! gravityPoints:
//!   linesRadius: 120
//!   gravity: 0.02
//!   color: { r: 255, g: 80, b: 80 }
//!   size: 6
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::math::{self, Rgb, Vec2};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub seed: Option<u64>,
    pub canvas: CanvasConfig,
    pub particles: ParticlesConfig,
    pub cursor: WellConfig,
    pub gravity_points: WellConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    /// Zero or absent means "fill the host window".
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub color: ColorSpec,
    pub gravity: Option<GravitySpec>,
    pub space_density: Option<f32>,
    pub trailing: Option<f32>,
    pub borders: Borders,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            color: ColorSpec::Rgb {
                r: Some(0),
                g: Some(0),
                b: Some(0),
            },
            gravity: None,
            space_density: None,
            trailing: None,
            borders: Borders::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Borders {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticlesConfig {
    pub count: usize,
    pub size: Option<Sample>,
    pub speed: SpeedConfig,
    pub color: Option<ColorSpec>,
    pub opacity: Option<f32>,
    pub lines_radius: Option<f32>,
    pub elasticity: Option<f32>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SpeedConfig {
    pub start: Option<Sample>,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

/// Shared by the pointer well (`cursor`) and click-placed wells (`gravityPoints`).
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct WellConfig {
    /// Absent or non-positive means unbounded.
    pub capture_radius: Option<f32>,
    pub lines_radius: Option<f32>,
    pub gravity: Option<f32>,
    pub color: Option<ColorSpec>,
    pub size: Option<Sample>,
}

/// Ambient gravity, as `{ x, y }` or `[x, y]`. A missing component is zero.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum GravitySpec {
    Pair([f32; 2]),
    Components {
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
}

impl GravitySpec {
    pub fn vector(&self) -> Vec2 {
        match *self {
            GravitySpec::Pair([x, y]) | GravitySpec::Components { x, y } => Vec2::new(x, y),
        }
    }
}

/// A scalar, or a `[start, end]` range sampled once per use.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Sample {
    Fixed(f32),
    Range([f32; 2]),
}

impl Sample {
    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Result<f32> {
        match *self {
            Sample::Fixed(value) => Ok(value),
            Sample::Range(range) => math::uniform(rng, range),
        }
    }

    /// Checks the range order without drawing.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Sample::Range([start, end]) if start > end => Err(Error::Range { start, end }),
            _ => Ok(()),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    Random,
}

/// `random`, or an explicit `{ r, g, b }` map.
///
/// Channels are optional at parse time so that an incomplete map is reported
/// as [`Error::Color`] when the color is resolved.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(untagged)]
pub enum ColorSpec {
    Keyword(Keyword),
    Rgb {
        r: Option<u8>,
        g: Option<u8>,
        b: Option<u8>,
    },
}

impl ColorSpec {
    pub const RANDOM: ColorSpec = ColorSpec::Keyword(Keyword::Random);

    pub fn rgb(color: Rgb) -> Self {
        ColorSpec::Rgb {
            r: Some(color.r),
            g: Some(color.g),
            b: Some(color.b),
        }
    }

    /// Returns the fixed color, or `None` for `random`.
    pub fn fixed(&self, subject: &'static str) -> Result<Option<Rgb>> {
        match *self {
            ColorSpec::Keyword(Keyword::Random) => Ok(None),
            ColorSpec::Rgb {
                r: Some(r),
                g: Some(g),
                b: Some(b),
            } => Ok(Some(Rgb::new(r, g, b))),
            ColorSpec::Rgb { .. } => Err(Error::Color { subject }),
        }
    }

    pub fn resolve<R: rand::Rng + ?Sized>(&self, rng: &mut R, subject: &'static str) -> Result<Rgb> {
        Ok(match self.fixed(subject)? {
            Some(color) => color,
            None => Rgb::random(rng),
        })
    }
}

impl CanvasConfig {
    /// The background cannot be `random`; it is treated as missing channels.
    pub fn background(&self) -> Result<Rgb> {
        self.color
            .fixed("canvas")?
            .ok_or(Error::Color { subject: "canvas" })
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
            .map_or_else(|| Vec2::new(0.0, 0.0), |gravity| gravity.vector())
    }

    /// Opacity of the per-frame background repaint.
    pub fn repaint_opacity(&self) -> f32 {
        1.0 - self.trailing.unwrap_or(0.0)
    }

    pub fn damping(&self) -> f32 {
        self.space_density.map_or(0.995, |density| 1.0 - density)
    }

    pub fn boost(&self) -> f32 {
        self.space_density.map_or(1.005, |density| 1.0 + density)
    }

    /// The configured surface size; zero counts as unset.
    pub fn fixed_size(&self) -> (Option<u32>, Option<u32>) {
        (
            self.width.filter(|w| *w > 0),
            self.height.filter(|h| *h > 0),
        )
    }
}

impl Config {
    pub fn from_yaml_str(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("unable to open config file {}", path.display()))?;
        let reader = std::io::BufReader::new(file);
        serde_yaml::from_reader(reader)
            .with_context(|| format!("unable to parse config file {}", path.display()))
    }

    /// Checks every section so that setup fails before the first frame.
    pub fn validate(&self) -> Result<()> {
        self.canvas.background()?;

        let particles = &self.particles;
        if let Some(size) = &particles.size {
            validate_size(size)?;
        }
        if let Some(start) = &particles.speed.start {
            start.validate()?;
        }
        if let Some(color) = &particles.color {
            color.fixed("particles")?;
        }

        for (well, subject) in [(&self.cursor, "cursor"), (&self.gravity_points, "gravityPoints")] {
            if let Some(size) = &well.size {
                validate_size(size)?;
            }
            if let Some(color) = &well.color {
                color.fixed(subject)?;
            }
        }
        Ok(())
    }
}

/// A size must not be able to come out negative, ranges included.
fn validate_size(size: &Sample) -> Result<()> {
    size.validate()?;
    match *size {
        Sample::Fixed(value) | Sample::Range([value, _]) if value < 0.0 => Err(Error::Size(value)),
        _ => Ok(()),
    }
}
