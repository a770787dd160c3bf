//! Pulsewave - audio-reactive spectrum visualizer
//!
//! Sound comes in as blocks, leaves as mirrored shapes and a spray of
//! particles that pulse with its loudness.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use pulsewave::audio::CpalPlayback;
use pulsewave::cli::Args;
use pulsewave::frame_loop::{Control, FrameLoop, InputEvent, TickOutcome, Ticker};
use pulsewave::params::{RecordingConfig, RenderConfig};
use pulsewave::particles::ParticleSystem;
use pulsewave::rendering::RenderSystem;
use pulsewave::surface::DrawList;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    frame: DrawList,

    // Pipeline
    frame_loop: FrameLoop,
    ticker: Ticker,

    // Configuration
    render_config: RenderConfig,
    recording_config: Option<RecordingConfig>,

    frame_count: usize,

    /// Fatal error raised inside the event loop, reported after it exits
    error: Option<anyhow::Error>,
}

impl App {
    fn new(
        frame_loop: FrameLoop,
        render_config: RenderConfig,
        recording_config: Option<RecordingConfig>,
    ) -> Self {
        Self {
            window: None,
            render_system: None,
            frame: DrawList::new(render_config.window_width, render_config.window_height),
            frame_loop,
            ticker: Ticker::new(render_config.tick_interval(), Instant::now()),
            render_config,
            recording_config,
            frame_count: 0,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.error = Some(err);
        event_loop.exit();
    }

    /// Forward an input event, exiting on quit
    fn input(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        if self.frame_loop.handle_input(event) == Control::Quit {
            event_loop.exit();
        }
    }

    /// Run one tick and present the composed frame
    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        self.frame.reset();
        match self.frame_loop.tick(&mut self.frame) {
            Ok(TickOutcome::EndOfStream) => {
                event_loop.exit();
                return;
            }
            Ok(outcome) => debug!("Tick {}: {:?}", self.frame_loop.ticks(), outcome),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Audio source failed"));
                return;
            }
        }

        if let Some(render_system) = self.render_system.as_mut() {
            if let Err(e) = render_system.present(&self.frame, self.frame_count) {
                error!("Render error: {}", e);
            }
        }
        self.frame_count += 1;

        if let Some(ref config) = self.recording_config {
            if self.frame_count >= config.total_frames() {
                info!(
                    "Recording complete: {} frames in {}",
                    self.frame_count,
                    config.frames_dir()
                );
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            if self.ticker.is_due(Instant::now()) {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.ticker.deadline()));
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        // Create window
        let window_attributes = Window::default_attributes()
            .with_title("Pulsewave")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        // Initialize rendering system
        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.recording_config.clone(),
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to initialize GPU"));
                return;
            }
        };

        // Physical size may differ from the requested logical size
        let (width, height) = render_system.size();
        self.frame.resize(width, height);
        self.input(event_loop, InputEvent::Resize(width, height));

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.input(event_loop, InputEvent::Quit),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat: false,
                        ..
                    },
                ..
            } => self.input(event_loop, InputEvent::Key(format!("{:?}", code))),
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Some(render_system) = self.render_system.as_mut() {
                        render_system.resize(size.width, size.height);
                    }
                    self.frame.resize(size.width, size.height);
                    self.input(event_loop, InputEvent::Resize(size.width, size.height));
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if self.ticker.is_due(now) {
                    self.ticker.advance(now);
                    self.tick(event_loop);
                }
            }
            _ => {}
        }
    }
}

/// Drive the loop without a window, composing into a draw list
fn run_headless(mut frame_loop: FrameLoop, render_config: &RenderConfig, frames: Option<u64>) -> Result<()> {
    let mut surface = DrawList::new(render_config.window_width, render_config.window_height);
    let mut ticker = Ticker::new(render_config.tick_interval(), Instant::now());
    let mut spawned_total = 0;

    while frames.map_or(true, |n| frame_loop.ticks() < n) {
        ticker.wait();
        ticker.advance(Instant::now());

        surface.reset();
        match frame_loop.tick(&mut surface).context("Audio source failed")? {
            TickOutcome::EndOfStream => break,
            TickOutcome::Advanced { spawned } => spawned_total += spawned,
            TickOutcome::Paused => {}
        }
        debug!(
            "Tick {}: {} draw commands, {} particles",
            frame_loop.ticks(),
            surface.commands().len(),
            frame_loop.particles().len()
        );
    }

    info!(
        "Headless run finished: {} ticks, {} particles spawned, {} alive",
        frame_loop.ticks(),
        spawned_total,
        frame_loop.particles().len()
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Everything that can fail at startup fails here, before a window exists
    let mut spectrum_config = args.spectrum_config()?;
    let particle_config = args.particle_config()?;
    let render_config = args.render_config()?;
    let bindings = args.key_bindings()?;

    let source = args
        .open_source(&spectrum_config)
        .context("Failed to open audio source")?;
    spectrum_config.sample_rate_hz = source.sample_rate();
    info!(
        "Analysis: {:?}, {} samples/block, {:.1}Hz per bin",
        spectrum_config.mode,
        spectrum_config.block_size,
        spectrum_config.bin_width_hz()
    );

    println!("Pulsewave - audio-reactive spectrum visualizer");
    println!("Controls:");
    for line in bindings.describe() {
        println!("  {}", line);
    }
    println!();

    let mut frame_loop = FrameLoop::new(
        source,
        &spectrum_config,
        ParticleSystem::new(particle_config),
        &render_config,
        bindings,
    );

    if args.headless {
        if args.record.is_some() {
            warn!("--record needs a window, ignored in headless mode");
        }
        return run_headless(frame_loop, &render_config, args.frames);
    }

    if let Some(path) = args.file.as_deref().filter(|_| !args.no_playback) {
        match CpalPlayback::from_wav(path) {
            Ok(playback) => frame_loop = frame_loop.with_playback(Box::new(playback)),
            Err(e) => warn!("Playback unavailable, continuing silently: {}", e),
        }
    }

    let recording_config = args
        .create_recording_config()
        .context("Failed to create recording directories")?;
    if let Some(ref config) = recording_config {
        info!(
            "Recording {} frames to {}",
            config.total_frames(),
            config.frames_dir()
        );
    }

    let mut app = App::new(frame_loop, render_config, recording_config);
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
