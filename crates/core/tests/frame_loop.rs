//! End-to-end runs through the public API: scene, frame loop and a
//! recording surface.

use flow_particles_core::command::Command;
use flow_particles_core::{
    FrameLoop, RenderSurface, Rgba, SceneSpec, SimConfig, SimulationState, TrailBuffer,
};
use glam::DVec2;
use serde_json::json;

/// Records draw calls instead of rasterizing.
#[derive(Default)]
struct Recorder {
    width: usize,
    height: usize,
    clears: usize,
    circles: Vec<DVec2>,
    lines: usize,
    blits: usize,
}

impl Recorder {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl RenderSurface for Recorder {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn clear(&mut self) {
        self.clears += 1;
        self.circles.clear();
        self.lines = 0;
        self.blits = 0;
    }

    fn fill_circle(&mut self, center: DVec2, _radius: f64, _color: Rgba) {
        self.circles.push(center);
    }

    fn line(&mut self, _from: DVec2, _to: DVec2, _color: Rgba) {
        self.lines += 1;
    }

    fn blit(&mut self, _trail: &TrailBuffer) {
        self.blits += 1;
    }
}

fn drift_config() -> SimConfig {
    SimConfig {
        initial_particle_count: 100,
        spawn_enabled: false,
        friction: 0.0,
        flow_strength: 0.0,
        directional_force: DVec2::new(-200.0, 0.0),
        cull_margin: 1000.0,
        show_arrows: false,
        ..SimConfig::default()
    }
}

#[test]
fn lattice_drifts_left_under_directional_force() {
    let state = SimulationState::new(1000, 1000, drift_config(), 1).unwrap();
    let start: Vec<DVec2> = state.particles().iter().map(|p| p.position).collect();
    let mut frames = FrameLoop::new(state);
    let mut surface = Recorder::new(1000, 1000);

    let report = frames.frame_with_dt(1.0, &mut surface);

    assert_eq!(report.step.particles, 100);
    assert_eq!(report.step.culled, 0);
    let end: Vec<DVec2> = frames.state().particles().iter().map(|p| p.position).collect();
    for (a, b) in start.iter().zip(&end) {
        assert_eq!(*b, *a + DVec2::new(-200.0, 0.0), "particle at {a} moved to {b}");
    }
    assert_eq!(surface.circles, end, "one dot per particle at its new position");
}

#[test]
fn commands_take_effect_at_the_next_frame() {
    let state = SimulationState::new(200, 200, drift_config(), 1).unwrap();
    let mut frames = FrameLoop::new(state);
    let mut surface = Recorder::new(200, 200);

    frames.submit(Command::ShowDots(false));
    frames.submit(Command::Friction(f64::NAN));
    assert!(frames.state().config().show_dots, "queued command applied early");
    assert_eq!(frames.pending(), 2);

    let report = frames.frame_with_dt(0.0, &mut surface);
    assert_eq!((report.applied, report.rejected), (1, 1));
    assert_eq!(frames.pending(), 0);
    assert!(surface.circles.is_empty());
    assert_eq!(frames.state().config().friction, 0.0);
}

#[test]
fn disabling_trails_clears_the_buffer_and_stops_blitting() {
    let config = SimConfig {
        trail_enabled: true,
        ..drift_config()
    };
    let mut frames = FrameLoop::new(SimulationState::new(300, 300, config, 5).unwrap());
    let mut surface = Recorder::new(300, 300);

    frames.frame_with_dt(0.01, &mut surface);
    assert_eq!(surface.blits, 1);
    assert!(!frames.state().trail().is_clear());

    frames.submit(Command::TrailEnabled(false));
    frames.frame_with_dt(0.01, &mut surface);
    assert_eq!(surface.blits, 0);
    assert!(frames.state().trail().is_clear());
}

#[test]
fn host_clock_drives_step_size() {
    let mut frames = FrameLoop::new(SimulationState::new(1000, 1000, drift_config(), 1).unwrap());
    let mut surface = Recorder::new(1000, 1000);

    assert_eq!(frames.frame(10.0, &mut surface).dt, 0.0);
    assert_eq!(frames.frame(10.5, &mut surface).dt, 0.5);
    // clock going backwards yields a zero step
    assert_eq!(frames.frame(9.0, &mut surface).dt, 0.0);
    assert_eq!(frames.state().frame_count(), 3);
    assert_eq!(surface.clears, 3);
}

#[test]
fn scene_replay_is_deterministic() {
    let scene: SceneSpec = serde_json::from_value(json!({
        "width": 320,
        "height": 240,
        "seed": 99,
        "frames": 40,
        "params": {
            "initial_particle_count": 64,
            "collisions_enabled": true,
            "trail_enabled": true
        },
        "commands": [
            {"frame": 10, "command": "wrap_particles", "value": true},
            {"frame": 20, "command": "add_particle", "value": {"x": 160.0, "y": 120.0}}
        ]
    }))
    .unwrap();

    let run = || {
        let mut frames = FrameLoop::new(scene.build_state().unwrap());
        let mut surface = Recorder::new(scene.width, scene.height);
        for frame in 0..scene.frames {
            for command in scene.commands_for(frame) {
                frames.submit(command.clone());
            }
            frames.frame_with_dt(scene.dt, &mut surface);
        }
        frames
            .into_state()
            .particles()
            .iter()
            .map(|p| (p.position, p.velocity))
            .collect::<Vec<_>>()
    };

    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}

#[test]
fn wrapped_particles_stay_on_surface() {
    let config = SimConfig {
        wrap_particles: true,
        ..drift_config()
    };
    let mut frames = FrameLoop::new(SimulationState::new(400, 300, config, 3).unwrap());
    let mut surface = Recorder::new(400, 300);
    for _ in 0..30 {
        frames.frame_with_dt(0.1, &mut surface);
    }
    let state = frames.state();
    assert_eq!(state.particles().len(), 100);
    for p in state.particles() {
        assert!(
            (0.0..400.0).contains(&p.position.x) && (0.0..300.0).contains(&p.position.y),
            "particle escaped to {}",
            p.position
        );
    }
}
