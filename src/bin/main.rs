use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use log::{debug, error, info, warn};
use particle_field::math::{Rgb, Rgba, Vec2};
use particle_field::{Config, DrawList, InputEvent, Session, StrokeStyle, Surface};
use plotters::coord::Shift;
use plotters::prelude::*;

const GRADIENT_SEGMENTS: usize = 8;

#[derive(Parser, Debug)]
#[command(about = "Interactive particle field")]
struct Args {
    /// YAML configuration; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without a window against a recording surface.
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };
    if args.width.is_some() {
        config.canvas.width = args.width;
    }
    if args.height.is_some() {
        config.canvas.height = args.height;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

// Software canvas =====================================================================

/// An RGB pixel buffer that persists between frames so translucent repaints
/// leave trails.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32, background: Rgb) -> Self {
        let pixels = std::iter::repeat([background.r, background.g, background.b])
            .take((width * height) as usize)
            .flatten()
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    fn image(&self) -> egui::ColorImage {
        egui::ColorImage {
            size: [self.width as usize, self.height as usize],
            pixels: self
                .pixels
                .chunks_exact(3)
                .map(|p| egui::Color32::from_rgb(p[0], p[1], p[2]))
                .collect(),
        }
    }
}

/// Draws onto a [`Canvas`] for the duration of one frame.
struct RasterSurface<'a> {
    width: f32,
    height: f32,
    area: DrawingArea<BitMapBackend<'a>, Shift>,
}

impl<'a> RasterSurface<'a> {
    fn new(canvas: &'a mut Canvas) -> Self {
        let (width, height) = (canvas.width, canvas.height);
        Self {
            width: width as f32,
            height: height as f32,
            area: BitMapBackend::with_buffer(&mut canvas.pixels, (width, height))
                .into_drawing_area(),
        }
    }
}

fn report<E: std::fmt::Debug>(result: std::result::Result<(), E>) {
    if let Err(err) = result {
        debug!("raster draw failed: {err:?}");
    }
}

fn style(color: Rgba, filled: bool, width: f32) -> ShapeStyle {
    ShapeStyle {
        color: RGBAColor(
            color.rgb.r,
            color.rgb.g,
            color.rgb.b,
            color.opacity.clamp(0.0, 1.0) as f64,
        ),
        filled,
        stroke_width: width.round().max(1.0) as u32,
    }
}

fn pixel(v: Vec2) -> (i32, i32) {
    (v.x.round() as i32, v.y.round() as i32)
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

impl Surface for RasterSurface<'_> {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        report(self.area.draw(&Rectangle::new(
            [pixel(min), pixel(max)],
            style(color, true, 1.0),
        )));
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, stroke: StrokeStyle) {
        match stroke {
            StrokeStyle::Flat(color) => {
                report(self.area.draw(&PathElement::new(
                    vec![pixel(from), pixel(to)],
                    style(color, false, width),
                )));
            }
            // plotters has no gradient strokes; approximate with short flat runs.
            StrokeStyle::Gradient([start, end]) => {
                for i in 0..GRADIENT_SEGMENTS {
                    let t0 = i as f32 / GRADIENT_SEGMENTS as f32;
                    let t1 = (i + 1) as f32 / GRADIENT_SEGMENTS as f32;
                    let mid = (t0 + t1) * 0.5;
                    let color = Rgba {
                        rgb: Rgb::new(
                            lerp_channel(start.rgb.r, end.rgb.r, mid),
                            lerp_channel(start.rgb.g, end.rgb.g, mid),
                            lerp_channel(start.rgb.b, end.rgb.b, mid),
                        ),
                        opacity: start.opacity + (end.opacity - start.opacity) * mid,
                    };
                    report(self.area.draw(&PathElement::new(
                        vec![pixel(from + (to - from) * t0), pixel(from + (to - from) * t1)],
                        style(color, false, width),
                    )));
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        report(self.area.draw(&Circle::new(
            pixel(center),
            radius.round().max(1.0) as i32,
            style(color, true, 1.0),
        )));
    }
}

// Window =============================================================================

struct ParticleField {
    config: Config,
    session: Option<Session>,
    canvas: Option<Canvas>,
    texture: Option<egui::TextureHandle>,
    last_frame_time: std::time::Instant,
}

impl ParticleField {
    fn new(_cc: &eframe::CreationContext, config: Config) -> Self {
        Self {
            config,
            session: None,
            canvas: None,
            texture: None,
            last_frame_time: std::time::Instant::now(),
        }
    }

    /// The surface size for this frame: configured, or the space available.
    fn surface_size(&self, available: egui::Vec2) -> (u32, u32) {
        let (width, height) = self.config.canvas.fixed_size();
        (
            width.unwrap_or(available.x.max(1.0) as u32),
            height.unwrap_or(available.y.max(1.0) as u32),
        )
    }

    fn collect_input(&self, ctx: &egui::Context, rect: egui::Rect) -> Vec<InputEvent> {
        let local = |pos: egui::Pos2| Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::PointerMoved(pos) if rect.contains(*pos) => {
                        Some(InputEvent::PointerMove(local(*pos)))
                    }
                    egui::Event::PointerMoved(_) | egui::Event::PointerGone => {
                        Some(InputEvent::PointerLeave)
                    }
                    egui::Event::Touch { phase, pos, .. } => Some(match phase {
                        egui::TouchPhase::Start => InputEvent::TouchStart(local(*pos)),
                        egui::TouchPhase::Move => InputEvent::TouchMove(local(*pos)),
                        egui::TouchPhase::End | egui::TouchPhase::Cancel => InputEvent::TouchEnd,
                    }),
                    _ => None,
                })
                .collect()
        })
    }
}

impl eframe::App for ParticleField {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let now = std::time::Instant::now();
        let frame_time = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let (width, height) = self.surface_size(ui.available_size());
                let (rect, response) = ui.allocate_exact_size(
                    egui::vec2(width as f32, height as f32),
                    egui::Sense::click(),
                );

                if self.session.is_none() {
                    match Session::new(self.config.clone(), width as f32, height as f32) {
                        Ok(session) => self.session = Some(session),
                        Err(err) => {
                            error!("unable to start the session: {err}");
                            frame.close();
                            return;
                        }
                    }
                }

                let background = self
                    .session
                    .as_ref()
                    .map_or(Rgb::BLACK, |s| s.state().physics.background);
                let resized = self
                    .canvas
                    .as_ref()
                    .map_or(true, |c| c.width != width || c.height != height);
                if resized {
                    debug!("surface resized to {width}x{height}");
                    self.canvas = Some(Canvas::new(width, height, background));
                }

                let events = self.collect_input(ctx, rect);
                let (Some(session), Some(canvas)) = (self.session.as_mut(), self.canvas.as_mut())
                else {
                    return;
                };
                for event in events {
                    session.post(event);
                }
                if response.clicked() {
                    if let Some(pos) = response.interact_pointer_pos() {
                        session.post(InputEvent::Click(Vec2::new(
                            pos.x - rect.min.x,
                            pos.y - rect.min.y,
                        )));
                    }
                }

                let (reschedule, stats) = {
                    let mut surface = RasterSurface::new(canvas);
                    session.frame(&mut surface)
                };
                if let Some(stats) = stats {
                    log::trace!(
                        "frame {:?}: {} particles, {} lines, {} wells",
                        frame_time,
                        stats.particles,
                        stats.lines,
                        stats.wells
                    );
                }

                let image = canvas.image();
                let texture = self.texture.get_or_insert_with(|| {
                    ctx.load_texture("particle-field", image.clone(), egui::TextureOptions::NEAREST)
                });
                texture.set(image, egui::TextureOptions::NEAREST);
                ui.painter().image(
                    texture.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                if reschedule {
                    ctx.request_repaint();
                }
            });
    }
}

// Entry points =======================================================================

fn run_headless(config: Config, frames: u64) -> Result<()> {
    let (width, height) = config.canvas.fixed_size();
    let (width, height) = (width.unwrap_or(800) as f32, height.unwrap_or(600) as f32);
    let mut session = Session::new(config, width, height)?;
    let mut surface = DrawList::new(width, height);

    let mut lines = 0;
    while session.frames() < frames {
        surface.clear();
        let (reschedule, stats) = session.frame(&mut surface);
        if let Some(stats) = stats {
            lines += stats.lines;
            if stats.repaired > 0 {
                warn!("frame {}: repaired {} particle(s)", session.frames(), stats.repaired);
            }
        }
        if !reschedule {
            break;
        }
    }
    session.stop();

    info!(
        "headless run finished: {} frame(s), {} line(s) drawn, {} draw command(s) in the last frame",
        session.frames(),
        lines,
        surface.commands.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let _logger = particle_field::logging::setup()?;

    let args = Args::parse();
    let config = load_config(&args)?;

    if args.headless {
        return run_headless(config, args.frames);
    }

    let (width, height) = config.canvas.fixed_size();
    let options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        initial_window_size: Some(egui::vec2(
            width.unwrap_or(1024) as f32,
            height.unwrap_or(768) as f32,
        )),
        ..Default::default()
    };

    eframe::run_native(
        "Particle Field",
        options,
        Box::new(move |cc| Box::new(ParticleField::new(cc, config))),
    )
    .map_err(|err| anyhow::anyhow!("unable to run the window: {err:?}"))
}
