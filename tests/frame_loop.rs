//! End-to-end runs of the frame loop over in-memory and file sources,
//! composing into a recording surface.

use pulsewave::audio::{BufferSource, WavFileSource};
use pulsewave::frame_loop::{FrameLoop, InputEvent, PlaybackState, TickOutcome};
use pulsewave::params::{
    AnalysisMode, KeyBindings, ParticleConfig, RenderConfig, SpectrumConfig,
};
use pulsewave::particles::ParticleSystem;
use pulsewave::surface::{DrawCommand, DrawList};
use pulsewave::visualizer::{Rgb, ShapeMode};

const SAMPLE_RATE: u32 = 44100;
const BLOCK: usize = 1024;

fn build(source: BufferSource, spectrum: &SpectrumConfig, particles: ParticleConfig) -> FrameLoop {
    FrameLoop::new(
        Box::new(source),
        spectrum,
        ParticleSystem::seeded(particles, 7),
        &RenderConfig::default(),
        KeyBindings::default(),
    )
}

/// Tone centered on bin 10
fn tone(seconds: f32) -> BufferSource {
    let freq = 10.0 * SAMPLE_RATE as f32 / BLOCK as f32;
    BufferSource::sine(freq, 20_000, seconds, BLOCK, SAMPLE_RATE)
}

fn run_to_end(frame_loop: &mut FrameLoop, surface: &mut DrawList) -> u64 {
    let mut advanced = 0;
    loop {
        surface.reset();
        match frame_loop.tick(surface).unwrap() {
            TickOutcome::EndOfStream => return advanced,
            _ => advanced += 1,
        }
    }
}

#[test]
fn test_tone_drives_shapes_and_particles() {
    let mut fl = build(tone(1.0), &SpectrumConfig::default(), ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);

    let outcome = fl.tick(&mut surface).unwrap();
    let TickOutcome::Advanced { spawned } = outcome else {
        panic!("unexpected {:?}", outcome);
    };
    assert!(spawned > 0);

    // Peak bin reaches full height, normalized to 1
    let smoothed = fl.smoothed();
    assert_eq!(smoothed.len(), 512);
    assert!((smoothed[10] - 1.0).abs() < 1e-6);
    assert!(smoothed.iter().all(|v| (0.0..=1.0).contains(v)));

    // Clear, 60 bar pairs, then one circle per live particle
    let commands = surface.commands();
    assert!(matches!(commands[0], DrawCommand::Clear { .. }));
    let rects = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Rect { .. }))
        .count();
    let circles = commands
        .iter()
        .filter(|c| matches!(c, DrawCommand::Circle { .. }))
        .count();
    assert_eq!(rects, 120);
    assert_eq!(circles, fl.particles().len());
}

#[test]
fn test_source_runs_to_clean_end() {
    // 43 whole blocks plus a short tail
    let mut fl = build(tone(1.0), &SpectrumConfig::default(), ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);

    assert_eq!(run_to_end(&mut fl, &mut surface), 43);
    assert!(fl.is_finished());
}

#[test]
fn test_zero_block_spawns_nothing() {
    let source = BufferSource::new(vec![0; BLOCK], 1, BLOCK, SAMPLE_RATE);
    let mut fl = build(source, &SpectrumConfig::default(), ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);

    assert_eq!(
        fl.tick(&mut surface).unwrap(),
        TickOutcome::Advanced { spawned: 0 }
    );
    assert!(fl.smoothed().iter().all(|&v| v == 0.0));
    assert!(fl.particles().is_empty());
}

#[test]
fn test_pause_then_tick_does_not_advance() {
    let mut fl = build(tone(1.0), &SpectrumConfig::default(), ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);
    fl.tick(&mut surface).unwrap();

    let smoothed = fl.smoothed().to_vec();
    let live = fl.particles().len();

    fl.handle_input(InputEvent::Key("KeyP".to_string()));
    assert_eq!(fl.state(), PlaybackState::Paused);
    for _ in 0..5 {
        surface.reset();
        assert_eq!(fl.tick(&mut surface).unwrap(), TickOutcome::Paused);
    }
    assert_eq!(fl.smoothed(), smoothed.as_slice());
    assert_eq!(fl.particles().len(), live);

    // Still 42 blocks to go: none were consumed while paused
    fl.handle_input(InputEvent::Key("KeyP".to_string()));
    assert_eq!(run_to_end(&mut fl, &mut surface), 42);
}

#[test]
fn test_resize_relays_out_slots() {
    let mut fl = build(tone(0.5), &SpectrumConfig::default(), ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);

    fl.handle_input(InputEvent::Resize(1024, 768));
    surface.resize(1024, 768);
    fl.tick(&mut surface).unwrap();

    let slot_width = 1024.0 / 60.0;
    let origins: Vec<f32> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect { origin, .. } => Some(origin.x),
            _ => None,
        })
        .collect();
    assert_eq!(origins.len(), 120);
    for (i, x) in origins.chunks(2).enumerate() {
        assert!((x[0] - i as f32 * slot_width).abs() < 1e-3);
        assert_eq!(x[0], x[1]);
    }
}

#[test]
fn test_key_bindings_change_visuals() {
    let mut fl = build(tone(0.5), &SpectrumConfig::default(), ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);

    fl.handle_input(InputEvent::Key("Digit2".to_string()));
    fl.handle_input(InputEvent::Key("KeyR".to_string()));
    fl.handle_input(InputEvent::Key("KeyT".to_string()));
    assert_eq!(fl.visualizer().shape_mode(), ShapeMode::Circles);
    assert_eq!(fl.visualizer().color(), Rgb::new(255, 0, 0));

    fl.tick(&mut surface).unwrap();
    let commands = surface.commands();

    // Trail fades instead of clearing
    assert!(matches!(commands[0], DrawCommand::Overlay { .. }));
    assert!(commands[1..121]
        .iter()
        .all(|c| matches!(c, DrawCommand::Circle { color, .. } if *color == Rgb::new(255, 0, 0))));
}

#[test]
fn test_amplitude_mode_single_component() {
    let spectrum = SpectrumConfig {
        mode: AnalysisMode::Amplitude,
        ..Default::default()
    };
    let mut fl = build(tone(0.5), &spectrum, ParticleConfig::default());
    let mut surface = DrawList::new(800, 600);

    fl.tick(&mut surface).unwrap();
    assert_eq!(fl.smoothed(), &[1.0]);

    // Every slot shows the one component at full height
    let heights: Vec<f32> = surface
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect { size, .. } => Some(size.y),
            _ => None,
        })
        .collect();
    assert_eq!(heights.len(), 120);
    assert!(heights.iter().all(|&h| (h - 300.0).abs() < 1e-3));
}

#[test]
fn test_particle_cap_bounds_live_set() {
    let particles = ParticleConfig {
        max_particles: 5,
        ..Default::default()
    };
    let mut fl = build(tone(1.0), &SpectrumConfig::default(), particles);
    let mut surface = DrawList::new(800, 600);

    for _ in 0..20 {
        fl.tick(&mut surface).unwrap();
        assert!(fl.particles().len() <= 5);
    }
    assert!(!fl.particles().is_empty());
}

#[test]
fn test_wav_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    // Left carries the tone, right is silent: decimation keeps the left channel
    for i in 0..3 * BLOCK + 100 {
        let t = i as f32 / SAMPLE_RATE as f32;
        let left = ((2.0 * std::f32::consts::PI * 2000.0 * t).sin() * 15_000.0) as i16;
        writer.write_sample(left).unwrap();
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();

    let source = WavFileSource::open(&path, BLOCK).unwrap();
    let mut fl = FrameLoop::new(
        Box::new(source),
        &SpectrumConfig::default(),
        ParticleSystem::seeded(ParticleConfig::default(), 3),
        &RenderConfig::default(),
        KeyBindings::default(),
    );
    let mut surface = DrawList::new(800, 600);

    surface.reset();
    fl.tick(&mut surface).unwrap();
    assert!(fl.smoothed().iter().any(|&v| v > 0.0));
    assert_eq!(run_to_end(&mut fl, &mut surface), 2);
}
