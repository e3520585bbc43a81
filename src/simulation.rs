//! The per-frame update: integrate, clamp, bounce, fade, connect and
//! recompute acceleration for every particle.

use cgmath::prelude::*;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::{Borders, Config};
use crate::connector::connect;
use crate::entity::Particle;
use crate::error::Result;
use crate::input::Pointer;
use crate::math::{self, Rgb, Vec2};
use crate::surface::{StrokeStyle, Surface};

/// Frame-invariant values resolved once from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Physics {
    pub background: Rgb,
    pub repaint_opacity: f32,
    pub gravity: Vec2,
    pub damping: f32,
    pub boost: f32,
    pub min_speed: Option<f32>,
    pub max_speed: Option<f32>,
    pub borders: Borders,
    pub elasticity: f32,
    /// Opacity a particle fades to right under the pointer.
    pub min_opacity: Option<f32>,
    /// Radius for particle to particle lines; `None` disables them.
    pub lines_radius: Option<f32>,
}

impl Physics {
    pub fn from_config(config: &Config) -> Result<Self> {
        let canvas = &config.canvas;
        let particles = &config.particles;
        Ok(Self {
            background: canvas.background()?,
            repaint_opacity: canvas.repaint_opacity(),
            gravity: canvas.gravity(),
            damping: canvas.damping(),
            boost: canvas.boost(),
            min_speed: particles.speed.min,
            max_speed: particles.speed.max,
            borders: canvas.borders,
            elasticity: particles.elasticity.unwrap_or(1.0),
            min_opacity: particles.opacity.filter(|o| *o != 1.0),
            lines_radius: particles.lines_radius.filter(|r| *r > 0.0),
        })
    }
}

/// What a single step put on the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub wells: usize,
    pub lines: usize,
    /// Particles whose state had to be reset after turning non-finite.
    pub repaired: usize,
}

pub struct SimulationState {
    pub physics: Physics,
    pub particles: Vec<Particle>,
    pub wells: Vec<Particle>,
    pub pointer: Pointer,
    config: Config,
    rng: StdRng,
}

impl SimulationState {
    /// Builds the pointer well and spawns `particles.count` particles over a
    /// `width` x `height` surface.
    pub fn new(config: Config, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let physics = Physics::from_config(&config)?;
        let pointer = Pointer::new(Particle::well_from_config(
            &mut rng,
            Vec2::zero(),
            &config.cursor,
            "cursor",
        )?);

        let mut state = Self {
            physics,
            particles: Vec::with_capacity(config.particles.count),
            wells: Vec::new(),
            pointer,
            config,
            rng,
        };
        state.spawn_particles(width, height)?;
        Ok(state)
    }

    /// Builds a state from prepared entities, bypassing spawning.
    pub fn from_parts(config: Config, particles: Vec<Particle>, pointer: Pointer) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            physics: Physics::from_config(&config)?,
            particles,
            wells: Vec::new(),
            pointer,
            config,
            rng,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn spawn_particles(&mut self, width: f32, height: f32) -> Result<()> {
        let config = &self.config.particles;
        for _ in 0..config.count {
            let position = Vec2::new(
                random_coordinate(&mut self.rng, width)?,
                random_coordinate(&mut self.rng, height)?,
            );
            let mut particle = Particle::from_config(&mut self.rng, position, config)?;
            if let Some(start) = &config.speed.start {
                let start_speed = start.sample(&mut self.rng)?;
                if start_speed != 0.0 {
                    particle.set_velocity(&mut self.rng, start_speed)?;
                }
            }
            self.particles.push(particle);
        }
        Ok(())
    }

    /// Adds a well from the `gravityPoints` section at `at`.
    pub fn place_well(&mut self, at: Vec2) -> Result<()> {
        let well = Particle::well_from_config(
            &mut self.rng,
            at,
            &self.config.gravity_points,
            "gravityPoints",
        )?;
        debug!("placed gravity well #{} at ({}, {})", self.wells.len(), at.x, at.y);
        self.wells.push(well);
        Ok(())
    }

    /// Advances the simulation by one frame and paints it on `surface`.
    pub fn step<S: Surface + ?Sized>(&mut self, surface: &mut S) -> FrameStats {
        let mut stats = FrameStats::default();
        let width = surface.width();
        let height = surface.height();

        surface.fill_rect(
            Vec2::zero(),
            Vec2::new(width, height),
            self.physics.background.with_opacity(self.physics.repaint_opacity),
        );

        let physics = &self.physics;
        let pointer = self.pointer.active_well();
        for particle in self.particles.iter_mut() {
            let previous = particle.position;
            if !integrate(particle, physics) {
                stats.repaired += 1;
            }
            bounce(particle, physics, width, height);
            if let Some(pointer) = pointer {
                fade(particle, physics, pointer);
            }

            let color = particle.color.with_opacity(particle.opacity);
            if previous != particle.position {
                surface.stroke_line(
                    previous,
                    particle.position,
                    particle.size() * 2.0,
                    StrokeStyle::Flat(color),
                );
            }
            surface.fill_circle(particle.position, particle.size(), color);
            stats.particles += 1;
        }

        stats.lines = self.connect_all(surface);
        self.update_accelerations();

        if let Some(pointer) = self.pointer.active_well() {
            draw_well(surface, pointer);
            stats.wells += 1;
        }
        for well in &self.wells {
            draw_well(surface, well);
            stats.wells += 1;
        }

        if stats.repaired > 0 {
            warn!("reset {} particle(s) with non-finite state", stats.repaired);
        }
        stats
    }

    fn connect_all<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        let mut lines = 0;
        let pointer = self.pointer.active_well();
        for (i, particle) in self.particles.iter().enumerate() {
            if let Some(pointer) = pointer {
                lines += connect(surface, pointer, particle, connection_radius(pointer)) as usize;
            }
            if let Some(radius) = self.physics.lines_radius {
                for sibling in &self.particles[i + 1..] {
                    lines += connect(surface, particle, sibling, radius) as usize;
                }
            }
            for well in &self.wells {
                lines += connect(surface, particle, well, connection_radius(well)) as usize;
            }
        }
        lines
    }

    /// Acceleration is rebuilt every frame from the ambient gravity and the
    /// attraction of every target in range.
    pub fn update_accelerations(&mut self) {
        let targets: Vec<&Particle> = self
            .pointer
            .active_well()
            .into_iter()
            .chain(self.wells.iter())
            .collect();
        let gravity = self.physics.gravity;

        self.particles.par_iter_mut().for_each(|particle| {
            particle.acceleration = acceleration(particle.position, gravity, &targets);
        });
    }
}

/// The acceleration felt at `position`.
///
/// Each target contributes `attraction * (target - position) / distance`.
/// Targets sitting exactly on `position` are skipped.
pub fn acceleration(position: Vec2, gravity: Vec2, targets: &[&Particle]) -> Vec2 {
    let mut total = gravity;
    for target in targets {
        let Some(profile) = target.attraction() else {
            continue;
        };
        let distance = math::distance(position, target.position);
        if distance == 0.0 || !distance.is_finite() {
            continue;
        }
        if profile.capture_radius().captures(distance) {
            total += (target.position - position) * (profile.attraction / distance);
        }
    }
    total
}

/// Applies acceleration, moves the particle and clamps its speed.
///
/// Returns `false` if the particle had to be reset because its state was no
/// longer finite.
fn integrate(particle: &mut Particle, physics: &Physics) -> bool {
    let previous = particle.position;
    particle.velocity += particle.acceleration;
    particle.position += particle.velocity;

    if let Some(max) = physics.max_speed {
        if particle.speed() > max {
            particle.velocity *= physics.damping;
        }
    }
    if let Some(min) = physics.min_speed {
        if particle.speed() < min {
            particle.velocity *= physics.boost;
        }
    }

    let finite = is_finite(particle.position) && is_finite(particle.velocity);
    if !finite {
        particle.position = if is_finite(previous) { previous } else { Vec2::zero() };
        particle.velocity = Vec2::zero();
        particle.acceleration = Vec2::zero();
    }
    finite
}

fn bounce(particle: &mut Particle, physics: &Physics, width: f32, height: f32) {
    let radius = particle.size();
    let borders = physics.borders;
    let reflect = -physics.elasticity;

    if borders.top && particle.position.y < radius {
        particle.position.y = radius;
        particle.velocity.y *= reflect;
    }
    if borders.bottom && particle.position.y > height - radius {
        particle.position.y = height - radius;
        particle.velocity.y *= reflect;
    }
    if borders.left && particle.position.x < radius {
        particle.position.x = radius;
        particle.velocity.x *= reflect;
    }
    if borders.right && particle.position.x > width - radius {
        particle.position.x = width - radius;
        particle.velocity.x *= reflect;
    }
}

fn fade(particle: &mut Particle, physics: &Physics, pointer: &Particle) {
    let Some(min) = physics.min_opacity else {
        particle.opacity = 1.0;
        return;
    };
    let radius = connection_radius(pointer);
    let distance = math::distance(particle.position, pointer.position);
    particle.opacity = if radius <= 0.0 || distance >= radius {
        1.0
    } else {
        min + (1.0 - min) * distance / radius
    };
}

fn draw_well<S: Surface + ?Sized>(surface: &mut S, well: &Particle) {
    surface.fill_circle(
        well.position,
        well.size(),
        well.color.with_opacity(well.opacity),
    );
}

fn connection_radius(well: &Particle) -> f32 {
    well.attraction().map_or(0.0, |a| a.connection_radius)
}

fn random_coordinate<R: Rng + ?Sized>(rng: &mut R, extent: f32) -> Result<f32> {
    Ok(math::uniform(rng, [0.0, extent.max(0.0)])?.floor())
}

fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
