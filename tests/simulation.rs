use cgmath::prelude::*;
use particle_field::entity::{AttractionProfile, CaptureRadius};
use particle_field::{
    Config, DrawCommand, DrawList, Error, InputEvent, Particle, Pointer, Rgb, Session,
    SimulationState, StrokeStyle, Vec2,
};

/// Parse a YAML config for tests
pub fn config(yaml: &str) -> Config {
    Config::from_yaml_str(yaml).expect("test config should parse")
}

/// An inactive pointer well with the given connection radius
pub fn pointer(lines_radius: f32) -> Pointer {
    Pointer::new(
        Particle::new(Vec2::zero(), 3.0, Rgb::WHITE)
            .unwrap()
            .with_attraction(AttractionProfile::new(
                CaptureRadius::Unbounded,
                lines_radius,
                0.0,
            )),
    )
}

pub fn particle(x: f32, y: f32, color: Rgb) -> Particle {
    Particle::new(Vec2::new(x, y), 2.0, color).unwrap()
}

/// A state holding exactly `particles`, built from `yaml`
pub fn state(yaml: &str, particles: Vec<Particle>) -> SimulationState {
    SimulationState::from_parts(config(yaml), particles, pointer(0.0)).unwrap()
}

// ==================================================================================
// Physics
// ==================================================================================

#[test]
fn left_border_reflects_at_particle_radius() {
    let mut p = particle(3.0, 50.0, Rgb::WHITE);
    p.velocity = Vec2::new(-2.0, 0.0);
    let mut state = state("canvas:\n  borders: { left: true }\n", vec![p]);
    let mut surface = DrawList::new(100.0, 100.0);

    state.step(&mut surface);

    let p = &state.particles[0];
    assert_eq!(p.position.x, 2.0);
    assert_eq!(p.velocity.x, 2.0);
}

#[test]
fn left_border_reflection_scales_by_elasticity() {
    let mut p = particle(3.0, 50.0, Rgb::WHITE);
    p.velocity = Vec2::new(-2.0, 0.0);
    let mut state = state(
        "canvas:\n  borders: { left: true }\nparticles:\n  elasticity: 0.5\n",
        vec![p],
    );
    state.step(&mut DrawList::new(100.0, 100.0));
    assert_eq!(state.particles[0].velocity.x, 1.0);
}

#[test]
fn max_speed_damps_once_per_step() {
    let mut p = particle(500.0, 500.0, Rgb::WHITE);
    p.velocity = Vec2::new(6.0, 0.0);
    let mut state = state("particles:\n  speed: { max: 5 }\n", vec![p]);

    state.step(&mut DrawList::new(1000.0, 1000.0));

    let speed = state.particles[0].speed();
    assert!(speed < 6.0);
    assert!(speed >= 5.0 * 0.995);
    assert!((speed - 6.0 * 0.995).abs() < 1e-5);
}

#[test]
fn space_density_replaces_default_damping() {
    let mut p = particle(500.0, 500.0, Rgb::WHITE);
    p.velocity = Vec2::new(0.0, 8.0);
    let mut state = state(
        "canvas:\n  spaceDensity: 0.5\nparticles:\n  speed: { max: 5 }\n",
        vec![p],
    );
    state.step(&mut DrawList::new(1000.0, 1000.0));
    assert!((state.particles[0].velocity.y - 4.0).abs() < 1e-6);
}

#[test]
fn acceleration_outside_capture_is_ambient_gravity() {
    let mut state = state(
        "canvas:\n  gravity: [0.0, 0.25]\ngravityPoints:\n  captureRadius: 10\n  gravity: 3\n",
        vec![particle(10.0, 10.0, Rgb::WHITE)],
    );
    state.place_well(Vec2::new(400.0, 400.0)).unwrap();
    let mut surface = DrawList::new(1000.0, 1000.0);

    for _ in 0..5 {
        state.step(&mut surface);
        assert_eq!(state.particles[0].acceleration, Vec2::new(0.0, 0.25));
    }
}

#[test]
fn acceleration_does_not_accumulate() {
    let mut state = state(
        "gravityPoints:\n  gravity: 2\n",
        vec![particle(0.0, 0.0, Rgb::WHITE)],
    );
    state.place_well(Vec2::new(100.0, 0.0)).unwrap();
    state.update_accelerations();
    state.update_accelerations();
    let a = state.particles[0].acceleration;
    assert!((a.x - 2.0).abs() < 1e-5 && a.y == 0.0);
}

#[test]
fn active_pointer_attracts() {
    let mut pointer = pointer(0.0);
    pointer.well = pointer
        .well
        .clone()
        .with_attraction(AttractionProfile::new(CaptureRadius::Within(50.0), 0.0, -1.0));
    let mut state =
        SimulationState::from_parts(Config::default(), vec![particle(0.0, 0.0, Rgb::WHITE)], pointer)
            .unwrap();

    state.update_accelerations();
    assert_eq!(state.particles[0].acceleration, Vec2::zero());

    state.pointer.apply(&InputEvent::PointerMove(Vec2::new(0.0, 10.0)));
    state.update_accelerations();
    let a = state.particles[0].acceleration;
    assert!(a.x == 0.0 && (a.y + 1.0).abs() < 1e-5);
}

// ==================================================================================
// Connections
// ==================================================================================

fn only_line(surface: &DrawList) -> &DrawCommand {
    let lines: Vec<_> = surface.lines().collect();
    assert_eq!(lines.len(), 1, "expected exactly one line, got {lines:?}");
    lines[0]
}

#[test]
fn equal_colors_connect_flat_at_half_opacity() {
    let color = Rgb::new(10, 200, 30);
    let mut state = state(
        "particles:\n  linesRadius: 100\n",
        vec![particle(100.0, 100.0, color), particle(150.0, 100.0, color)],
    );
    let mut surface = DrawList::new(400.0, 400.0);
    state.step(&mut surface);

    match only_line(&surface) {
        DrawCommand::StrokeLine {
            style: StrokeStyle::Flat(rgba),
            ..
        } => {
            assert_eq!(rgba.rgb, color);
            assert_eq!(rgba.opacity, 0.5);
        }
        other => panic!("expected a flat stroke, got {other:?}"),
    }
}

#[test]
fn differing_colors_connect_with_gradient() {
    let red = Rgb::new(255, 0, 0);
    let blue = Rgb::new(0, 0, 255);
    let mut state = state(
        "particles:\n  linesRadius: 100\n",
        vec![particle(100.0, 100.0, red), particle(150.0, 100.0, blue)],
    );
    let mut surface = DrawList::new(400.0, 400.0);
    state.step(&mut surface);

    match only_line(&surface) {
        DrawCommand::StrokeLine {
            style: StrokeStyle::Gradient([a, b]),
            ..
        } => {
            assert_eq!((a.rgb, a.opacity), (red, 0.5));
            assert_eq!((b.rgb, b.opacity), (blue, 0.5));
        }
        other => panic!("expected a gradient stroke, got {other:?}"),
    }
}

#[test]
fn each_pair_is_connected_once() {
    let particles = (0..4)
        .map(|i| particle(100.0 + i as f32, 100.0, Rgb::WHITE))
        .collect();
    let mut state = state("particles:\n  linesRadius: 50\n", particles);
    let mut surface = DrawList::new(400.0, 400.0);
    let stats = state.step(&mut surface);

    assert_eq!(stats.lines, 6);
    assert_eq!(surface.lines().count(), 6);
}

#[test]
fn lines_are_skipped_without_radius() {
    let mut state = state(
        "{}",
        vec![particle(100.0, 100.0, Rgb::WHITE), particle(101.0, 100.0, Rgb::WHITE)],
    );
    let mut surface = DrawList::new(400.0, 400.0);
    assert_eq!(state.step(&mut surface).lines, 0);
}

#[test]
fn wells_connect_with_their_own_radius() {
    let mut state = state(
        "gravityPoints:\n  linesRadius: 20\n  color: { r: 1, g: 2, b: 3 }\n",
        vec![particle(100.0, 100.0, Rgb::WHITE), particle(300.0, 300.0, Rgb::WHITE)],
    );
    state.place_well(Vec2::new(110.0, 100.0)).unwrap();
    let mut surface = DrawList::new(400.0, 400.0);
    let stats = state.step(&mut surface);

    assert_eq!(stats.lines, 1);
    assert_eq!(stats.wells, 1);
}

#[test]
fn active_pointer_connects_from_its_position() {
    let mut state = SimulationState::from_parts(
        Config::default(),
        vec![particle(100.0, 100.0, Rgb::WHITE)],
        pointer(100.0),
    )
    .unwrap();
    let mut surface = DrawList::new(400.0, 400.0);

    assert_eq!(state.step(&mut surface).lines, 0);

    state.pointer.apply(&InputEvent::PointerMove(Vec2::new(100.0, 150.0)));
    surface.clear();
    state.step(&mut surface);
    match only_line(&surface) {
        DrawCommand::StrokeLine {
            from,
            to,
            style: StrokeStyle::Flat(rgba),
            ..
        } => {
            assert_eq!(*from, Vec2::new(100.0, 150.0));
            assert_eq!(*to, Vec2::new(100.0, 100.0));
            assert_eq!(rgba.opacity, 0.5);
        }
        other => panic!("expected a flat stroke from the pointer, got {other:?}"),
    }

    state.pointer.apply(&InputEvent::PointerLeave);
    surface.clear();
    assert_eq!(state.step(&mut surface).lines, 0);
    assert_eq!(surface.lines().count(), 0);
}

#[test]
fn moving_particle_leaves_a_motion_stroke() {
    let mut p = particle(100.0, 100.0, Rgb::WHITE);
    p.velocity = Vec2::new(3.0, 4.0);
    let mut state = state("{}", vec![p]);
    let mut surface = DrawList::new(400.0, 400.0);

    let stats = state.step(&mut surface);

    assert_eq!(stats.lines, 0);
    match only_line(&surface) {
        DrawCommand::StrokeLine {
            from,
            to,
            width,
            style: StrokeStyle::Flat(rgba),
        } => {
            assert_eq!(*from, Vec2::new(100.0, 100.0));
            assert_eq!(*to, Vec2::new(103.0, 104.0));
            assert_eq!(*width, 4.0);
            assert_eq!(rgba.rgb, Rgb::WHITE);
        }
        other => panic!("expected a motion stroke, got {other:?}"),
    }
}

// ==================================================================================
// Session
// ==================================================================================

#[test]
fn empty_session_keeps_scheduling() {
    let mut session = Session::new(Config::default(), 320.0, 240.0).unwrap();
    let mut surface = DrawList::new(320.0, 240.0);

    for _ in 0..120 {
        surface.clear();
        let (reschedule, stats) = session.frame(&mut surface);
        assert!(reschedule);
        assert_eq!(stats.unwrap().particles, 0);
        assert_eq!(surface.circles().count(), 0);
        assert_eq!(surface.lines().count(), 0);
        assert_eq!(surface.rects().count(), 1);
    }
    assert_eq!(session.frames(), 120);
}

#[test]
fn background_repaint_uses_trailing() {
    let mut session = Session::new(
        config("canvas:\n  trailing: 0.75\n  color: { r: 5, g: 6, b: 7 }\n"),
        100.0,
        50.0,
    )
    .unwrap();
    let mut surface = DrawList::new(100.0, 50.0);
    session.frame(&mut surface);

    assert_eq!(
        surface.commands[0],
        DrawCommand::FillRect {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(100.0, 50.0),
            color: Rgb::new(5, 6, 7).with_opacity(0.25),
        }
    );
}

#[test]
fn stopped_session_does_not_step() {
    let mut session = Session::new(Config::default(), 10.0, 10.0).unwrap();
    let mut surface = DrawList::new(10.0, 10.0);
    session.stop();
    assert!(!session.is_running());
    assert_eq!(session.frame(&mut surface), (false, None));
    assert!(surface.commands.is_empty());
}

#[test]
fn clicks_place_wells_and_pointer_is_drawn_while_active() {
    let mut session = Session::new(
        config("cursor:\n  linesRadius: 100\ngravityPoints:\n  size: 5\n"),
        200.0,
        200.0,
    )
    .unwrap();
    let mut surface = DrawList::new(200.0, 200.0);

    session.post(InputEvent::Click(Vec2::new(50.0, 60.0)));
    session.post(InputEvent::Click(Vec2::new(70.0, 80.0)));
    session.post(InputEvent::PointerMove(Vec2::new(10.0, 10.0)));
    let (_, stats) = session.frame(&mut surface);

    assert_eq!(session.state().wells.len(), 2);
    assert_eq!(session.state().wells[0].position, Vec2::new(50.0, 60.0));
    assert_eq!(session.state().wells[0].size(), 5.0);
    assert_eq!(stats.unwrap().wells, 3);

    surface.clear();
    session.post(InputEvent::PointerLeave);
    let (_, stats) = session.frame(&mut surface);
    assert_eq!(stats.unwrap().wells, 2);
    assert!(!session.state().pointer.is_active());
}

#[test]
fn invalid_configuration_aborts_setup() {
    let err = Session::new(config("particles:\n  size: -1\n"), 10.0, 10.0).err();
    assert_eq!(err, Some(Error::Size(-1.0)));

    let err = Session::new(config("particles:\n  color: { r: 1, g: 2 }\n"), 10.0, 10.0).err();
    assert_eq!(
        err,
        Some(Error::Color {
            subject: "particles"
        })
    );

    let err = Session::new(
        config("particles:\n  speed: { start: [3, 1] }\n"),
        10.0,
        10.0,
    )
    .err();
    assert_eq!(err, Some(Error::Range { start: 3.0, end: 1.0 }));
}

#[test]
fn size_ranges_below_zero_abort_setup() {
    let err = Session::new(
        config("seed: 3\nparticles:\n  count: 20\n  size: [-1, 1]\n"),
        100.0,
        100.0,
    )
    .err();
    assert_eq!(err, Some(Error::Size(-1.0)));

    let err = Session::new(config("gravityPoints:\n  size: [-5, -1]\n"), 100.0, 100.0).err();
    assert_eq!(err, Some(Error::Size(-5.0)));
}

#[test]
fn spawning_places_particles_on_the_surface_at_start_speed() {
    let session = Session::new(
        config("seed: 9\nparticles:\n  count: 50\n  speed: { start: 1.5 }\n"),
        640.0,
        480.0,
    )
    .unwrap();

    let particles = &session.state().particles;
    assert_eq!(particles.len(), 50);
    for p in particles {
        assert!((0.0..640.0).contains(&p.position.x));
        assert!((0.0..480.0).contains(&p.position.y));
        assert_eq!(p.position.x.fract(), 0.0);
        assert!((p.speed() - 1.5).abs() < 1e-5);
    }
}

#[test]
fn seeded_sessions_are_reproducible() {
    let yaml = "seed: 1234\nparticles:\n  count: 10\n  color: random\n  size: [1, 4]\n";
    let a = Session::new(config(yaml), 300.0, 300.0).unwrap();
    let b = Session::new(config(yaml), 300.0, 300.0).unwrap();
    assert_eq!(a.state().particles, b.state().particles);
}

#[test]
fn bundled_config_is_valid() {
    let config = Config::from_yaml_file(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/configs/constellation.yaml"
    ))
    .unwrap();
    let session = Session::new(config, 800.0, 600.0).unwrap();
    assert_eq!(session.state().particles.len(), 140);
}
