pub mod config;
pub mod connector;
pub mod entity;
pub mod error;
pub mod input;
pub mod logging;
pub mod math;
pub mod session;
pub mod simulation;
pub mod surface;

pub use config::{Borders, ColorSpec, Config, GravitySpec, Sample, WellConfig};
pub use connector::connect;
pub use entity::{AttractionProfile, CaptureRadius, Particle};
pub use error::{Error, Result};
pub use input::{InputEvent, Pointer};
pub use math::{Rgb, Rgba, Vec2};
pub use session::Session;
pub use simulation::{FrameStats, Physics, SimulationState};
pub use surface::{DrawCommand, DrawList, StrokeStyle, Surface};
