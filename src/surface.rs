//! The drawing surface the simulation paints on.

use crate::math::{Rgba, Vec2};

/// How a line is colored along its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeStyle {
    Flat(Rgba),
    /// Linear interpolation from the first stop at `from` to the second at `to`.
    Gradient([Rgba; 2]),
}

pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, style: StrokeStyle);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        min: Vec2,
        max: Vec2,
        color: Rgba,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        width: f32,
        style: StrokeStyle,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
}

/// A surface that records what it is asked to draw.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn rects(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
    }
}

impl Surface for DrawList {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::FillRect { min, max, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, style: StrokeStyle) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            width,
            style,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }
}
