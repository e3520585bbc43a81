use crate::entity::Particle;
use crate::math::Vec2;

/// Pointer and touch input in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerEnter(Vec2),
    PointerMove(Vec2),
    PointerLeave,
    TouchStart(Vec2),
    TouchMove(Vec2),
    TouchEnd,
    /// A click or tap; places a new gravity well.
    Click(Vec2),
}

/// The well that follows the pointer.
#[derive(Debug, Clone)]
pub struct Pointer {
    pub well: Particle,
    active: bool,
}

impl Pointer {
    pub fn new(well: Particle) -> Self {
        Self {
            well,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The pointer well, if it currently takes part in the simulation.
    pub fn active_well(&self) -> Option<&Particle> {
        self.active.then_some(&self.well)
    }

    /// Applies a pointer or touch event. Clicks are ignored here.
    pub fn apply(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerEnter(at)
            | InputEvent::PointerMove(at)
            | InputEvent::TouchStart(at)
            | InputEvent::TouchMove(at) => {
                self.well.position = at;
                self.active = true;
            }
            InputEvent::PointerLeave | InputEvent::TouchEnd => self.active = false,
            InputEvent::Click(_) => {}
        }
    }
}
