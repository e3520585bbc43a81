use crate::entity::Particle;
use crate::math::{self, colors_equal};
use crate::surface::{StrokeStyle, Surface};

pub const LINE_WIDTH: f32 = 1.0;

/// Joins two entities with a line that fades out towards `max_length`.
///
/// Returns whether a line was drawn.
pub fn connect<S: Surface + ?Sized>(
    surface: &mut S,
    start: &Particle,
    end: &Particle,
    max_length: f32,
) -> bool {
    if max_length <= 0.0 {
        return false;
    }
    let distance = math::distance(start.position, end.position);
    if distance > max_length {
        return false;
    }

    let opacity = 1.0 - distance / max_length;
    let style = if colors_equal(start.color, end.color) {
        StrokeStyle::Flat(start.color.with_opacity(opacity))
    } else {
        StrokeStyle::Gradient([
            start.color.with_opacity(opacity),
            end.color.with_opacity(opacity),
        ])
    };
    surface.stroke_line(start.position, end.position, LINE_WIDTH, style);
    true
}
