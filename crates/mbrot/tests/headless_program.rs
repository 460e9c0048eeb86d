//! Frame loop driven by scripted input and a step clock.

use std::time::Duration;

use mbrot::{BenchReport, Program};
use mbrot_backend::{HeadlessBackend, ScriptedEvents, StepClock};
use mbrot_core::event::{Event, KeyCode, KeyEvent, Modifiers};
use mbrot_core::{EngineConfig, Viewport, ViewportController};
use mbrot_render::{FrameRenderer, RunMode, Strategy};

const STEP: Duration = Duration::from_micros(250);

fn program(
    events: ScriptedEvents,
    mode: RunMode,
    strategy: Strategy,
) -> Program<HeadlessBackend<StepClock>> {
    let config = EngineConfig::default().validate().unwrap();
    let renderer = FrameRenderer::new(&config, strategy).unwrap();
    let backend = HeadlessBackend::with_clock(StepClock::new(STEP)).with_events(events);
    Program::new(backend, renderer, ViewportController::new(&config), mode)
}

fn release(c: char) -> Event {
    Event::Key(KeyEvent::release(KeyCode::Char(c)))
}

fn press(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c)))
}

#[test]
fn headless_renders_exactly_the_frame_budget() {
    let mut program = program(
        ScriptedEvents::default(),
        RunMode::Headless { frames: 5 },
        Strategy::PortableVector,
    );
    let summary = program.run().unwrap();

    assert_eq!(summary.frames, 5);
    assert!(!summary.quit);
    // Two clock reads per frame, one step apart.
    assert_eq!(summary.render_time, STEP * 5);
    assert_eq!(summary.last_frame.pixels, 80_000);
    assert_eq!(program.backend().presented(), 0);
}

#[test]
fn bench_report_from_step_clock_is_deterministic() {
    let mut program = program(
        ScriptedEvents::default(),
        RunMode::Headless { frames: 4 },
        Strategy::Scalar,
    );
    let report = BenchReport::from_summary(&program.run().unwrap());
    assert_eq!(report.strategy, "scalar");
    assert_eq!(report.frames, 4);
    assert_eq!(report.total_micros, 1_000);
    assert_eq!(report.micros_per_frame, 250.0);
    assert_eq!(
        report.to_string(),
        "strategy: scalar, runs: 4, time: 1000us, time per run: 250.0us"
    );
}

#[test]
fn release_events_move_the_viewport_before_the_first_frame() {
    let events = ScriptedEvents::new([release('d'), release('d'), release('w')], (80, 24));
    let mut program = program(events, RunMode::Headless { frames: 1 }, Strategy::Scalar);
    let summary = program.run().unwrap();

    assert_eq!(summary.commands, 3);
    assert_eq!(summary.viewport, Viewport::new(0.2, -0.1, 1.0));
}

#[test]
fn presses_alone_do_nothing() {
    let events = ScriptedEvents::new([press('d'), press('w'), press('s')], (80, 24));
    let mut program = program(events, RunMode::Headless { frames: 2 }, Strategy::Scalar);
    let summary = program.run().unwrap();

    assert_eq!(summary.commands, 0);
    assert_eq!(summary.viewport, Viewport::default());
}

#[test]
fn zoom_keys_rescale() {
    let events = ScriptedEvents::new(
        [
            Event::Key(KeyEvent::release(KeyCode::Up)),
            Event::Key(KeyEvent::release(KeyCode::Up)),
            Event::Key(KeyEvent::release(KeyCode::Down)),
        ],
        (80, 24),
    );
    let mut program = program(events, RunMode::Headless { frames: 1 }, Strategy::Scalar);
    let summary = program.run().unwrap();

    let scale = summary.viewport.scale;
    let expected = 1.0f32 * 1.1 * 1.1 * 0.9;
    assert!((scale - expected).abs() < 1e-6, "scale {scale}");
}

#[test]
fn close_stops_before_rendering() {
    let events = ScriptedEvents::new([Event::Close], (80, 24));
    let mut program = program(events, RunMode::Interactive, Strategy::PortableVector);
    let summary = program.run().unwrap();

    assert!(summary.quit);
    assert_eq!(summary.frames, 0);
    assert_eq!(program.backend().presented(), 0);
}

#[test]
fn interactive_presents_each_frame_until_quit() {
    let mut events = ScriptedEvents::new([release('a')], (80, 24));
    events.pause();
    events.push(release('s'));
    events.pause();
    events.push(press('q'));
    let mut program = program(events, RunMode::Interactive, Strategy::HardwareVector);
    let summary = program.run().unwrap();

    assert!(summary.quit);
    assert_eq!(summary.frames, 2);
    assert_eq!(program.backend().presented(), 2);
    assert_eq!(summary.commands, 2);
    assert_eq!(summary.viewport, Viewport::new(-0.1, 0.1, 1.0));
    assert_eq!(summary.requested, Strategy::HardwareVector);
    assert_eq!(summary.strategy, Strategy::HardwareVector.resolve());
}

#[test]
fn events_after_quit_are_dropped() {
    let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL));
    let events = ScriptedEvents::new([release('d'), ctrl_c, release('d')], (80, 24));
    let mut program = program(events, RunMode::Interactive, Strategy::Scalar);
    let summary = program.run().unwrap();

    assert!(summary.quit);
    assert_eq!(summary.commands, 1);
    assert_eq!(summary.viewport, Viewport::new(0.1, 0.0, 1.0));
}

#[test]
fn last_buffer_matches_a_direct_render() {
    let events = ScriptedEvents::new([release('d')], (80, 24));
    let mut program = program(events, RunMode::Headless { frames: 1 }, Strategy::PortableVector);
    let summary = program.run().unwrap();

    let config = EngineConfig::default();
    let mut renderer = FrameRenderer::new(&config, Strategy::Scalar).unwrap();
    let mut expected = vec![0u8; config.buffer_len()];
    let _ = renderer.render(&summary.viewport, &mut expected);
    assert!(
        program.buffer().as_bytes() == expected.as_slice(),
        "loop buffer differs from a direct scalar render"
    );
}
