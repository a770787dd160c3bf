//! Fixed-tick driver and the Playing/Paused state machine.
//!
//! Each tick is one synchronous pass: pull a block, extract, smooth, spawn and
//! update particles, then compose the frame onto a [`RenderSurface`]. While
//! paused nothing is pulled or advanced and a paused indicator is drawn over
//! the frozen scene.

use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::audio::{AudioSource, PlaybackController};
use crate::error::AudioError;
use crate::params::{Action, KeyBindings, RenderConfig, SpectrumConfig};
use crate::particles::ParticleSystem;
use crate::spectrum::{mean_intensity, SpectrumExtractor, SpectrumSmoother};
use crate::surface::RenderSurface;
use crate::visualizer::VisualizerState;

/// Whether ticks advance the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Discrete input polled once per tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    Resize(u32, u32),
    /// Key name as used by [`KeyBindings`]
    Key(String),
}

/// What the host should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Result of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Pipeline advanced and a frame was composed
    Advanced { spawned: usize },
    /// Frozen frame with paused indicator
    Paused,
    /// Source is exhausted; the loop should stop
    EndOfStream,
}

/// Owns the whole signal-to-visual pipeline
pub struct FrameLoop {
    source: Box<dyn AudioSource>,
    extractor: SpectrumExtractor,
    smoother: SpectrumSmoother,
    particles: ParticleSystem,
    visualizer: VisualizerState,
    bindings: KeyBindings,
    playback: Option<Box<dyn PlaybackController>>,
    state: PlaybackState,
    ended: bool,
    ticks: u64,
}

impl FrameLoop {
    pub fn new(
        source: Box<dyn AudioSource>,
        spectrum: &SpectrumConfig,
        particles: ParticleSystem,
        render: &RenderConfig,
        bindings: KeyBindings,
    ) -> Self {
        let mut smoother = SpectrumSmoother::new(spectrum.smoothing_factor);
        smoother.reset(spectrum.bin_count());

        Self {
            source,
            extractor: SpectrumExtractor::new(spectrum),
            smoother,
            particles,
            visualizer: VisualizerState::new(render),
            bindings,
            playback: None,
            state: PlaybackState::Playing,
            ended: false,
            ticks: 0,
        }
    }

    /// Drive an audible playback controller in lockstep with pause/resume
    pub fn with_playback(mut self, playback: Box<dyn PlaybackController>) -> Self {
        self.playback = Some(playback);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.ended
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn smoothed(&self) -> &[f32] {
        self.smoother.smoothed()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn visualizer(&self) -> &VisualizerState {
        &self.visualizer
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Apply one input event. Only the pause action changes the playback state.
    pub fn handle_input(&mut self, event: InputEvent) -> Control {
        match event {
            InputEvent::Quit => Control::Quit,
            InputEvent::Resize(width, height) => {
                self.visualizer.update_dimensions(width, height);
                Control::Continue
            }
            InputEvent::Key(key) => match self.bindings.lookup(&key).cloned() {
                Some(action) => self.apply(&action),
                None => {
                    debug!("Unbound key {}", key);
                    Control::Continue
                }
            },
        }
    }

    /// Perform a bound action
    pub fn apply(&mut self, action: &Action) -> Control {
        match action {
            Action::Quit => return Control::Quit,
            Action::TogglePause => self.toggle_pause(),
            Action::ToggleTrail => {
                self.visualizer.toggle_trail();
            }
            Action::NextColor => {
                let next = self.visualizer.color().next_in_palette();
                self.visualizer.set_color(next);
            }
            Action::NextShape => {
                let next = self.visualizer.shape_mode().next();
                self.visualizer.set_shape_mode(next);
            }
            // Rejected names are logged by the setters and leave state untouched
            Action::Color(name) => {
                let _ = self.visualizer.set_color_named(name);
            }
            Action::Shape(name) => {
                let _ = self.visualizer.set_shape_mode_named(name);
            }
        }
        Control::Continue
    }

    /// Flip Playing <-> Paused, pausing or resuming audible playback with it
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            PlaybackState::Playing => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Playing,
        };
        info!("{:?}", self.state);

        if let Some(playback) = self.playback.as_mut() {
            let result = match self.state {
                PlaybackState::Paused => playback.pause(),
                PlaybackState::Playing => playback.resume(),
            };
            if let Err(e) = result {
                warn!("Playback control failed: {}", e);
            }
        }
    }

    /// Run one tick and compose the frame onto `surface`.
    ///
    /// Blocks while the source waits for audio. Source errors are returned
    /// as-is; end of stream is reported through [`TickOutcome::EndOfStream`].
    pub fn tick<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> Result<TickOutcome, AudioError> {
        if self.ended {
            return Ok(TickOutcome::EndOfStream);
        }
        self.ticks += 1;

        if self.state == PlaybackState::Paused {
            self.compose(surface);
            self.visualizer.render_paused_indicator(surface);
            return Ok(TickOutcome::Paused);
        }

        let block = self.source.next_block()?;
        let Some(raw) = self.extractor.extract(block.as_ref()) else {
            info!("End of stream after {} ticks", self.ticks - 1);
            self.ended = true;
            return Ok(TickOutcome::EndOfStream);
        };

        let intensity = mean_intensity(raw);
        self.smoother.update(raw);

        let (width, height) = self.visualizer.dimensions();
        let spawned = self
            .particles
            .spawn(intensity, width, height, self.visualizer.color());
        self.particles.update();

        self.compose(surface);
        Ok(TickOutcome::Advanced { spawned })
    }

    /// Background, shapes, then particles
    fn compose<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        self.visualizer.begin_frame(surface);
        self.visualizer.render(surface, self.smoother.smoothed());
        self.particles.render(surface);
    }
}

/// Fixed-rate deadline tracker. Overruns are not made up.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick is due immediately
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Schedule the next tick after one ran at `now`
    pub fn advance(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }

    /// Sleep until the deadline (headless driving)
    pub fn wait(&self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::BufferSource;
    use crate::params::ParticleConfig;
    use crate::surface::{DrawCommand, DrawList};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn frame_loop(source: BufferSource) -> FrameLoop {
        FrameLoop::new(
            Box::new(source),
            &SpectrumConfig::default(),
            ParticleSystem::seeded(ParticleConfig::default(), 11),
            &RenderConfig::default(),
            KeyBindings::default(),
        )
    }

    fn loud_source(seconds: f32) -> BufferSource {
        BufferSource::sine(440.0, 20_000, seconds, 1024, 44100)
    }

    #[test]
    fn test_silence_spawns_nothing() {
        let mut fl = frame_loop(BufferSource::new(vec![0; 1024], 1, 1024, 44100));
        let mut surface = DrawList::new(800, 600);

        assert_eq!(
            fl.tick(&mut surface).unwrap(),
            TickOutcome::Advanced { spawned: 0 }
        );
        assert_eq!(fl.smoothed().len(), 512);
        assert!(fl.smoothed().iter().all(|&v| v == 0.0));
        assert!(fl.particles().is_empty());
    }

    #[test]
    fn test_end_of_stream_terminates_cleanly() {
        let mut fl = frame_loop(BufferSource::new(vec![0; 1500], 1, 1024, 44100));
        let mut surface = DrawList::new(800, 600);

        assert!(matches!(
            fl.tick(&mut surface).unwrap(),
            TickOutcome::Advanced { .. }
        ));
        assert_eq!(fl.tick(&mut surface).unwrap(), TickOutcome::EndOfStream);
        assert!(fl.is_finished());
        assert_eq!(fl.tick(&mut surface).unwrap(), TickOutcome::EndOfStream);
    }

    #[test]
    fn test_pause_freezes_pipeline() {
        let source = loud_source(1.0);
        let mut fl = frame_loop(source);
        let mut surface = DrawList::new(800, 600);

        fl.tick(&mut surface).unwrap();
        fl.tick(&mut surface).unwrap();
        let smoothed = fl.smoothed().to_vec();
        let particles = fl.particles().particles().to_vec();
        assert!(!particles.is_empty());

        fl.handle_input(InputEvent::Key("Space".to_string()));
        assert_eq!(fl.state(), PlaybackState::Paused);

        assert_eq!(fl.tick(&mut surface).unwrap(), TickOutcome::Paused);
        assert_eq!(fl.smoothed(), smoothed.as_slice());
        assert_eq!(fl.particles().particles(), particles.as_slice());

        // Paused indicator drawn last
        assert!(matches!(
            surface.commands().last(),
            Some(DrawCommand::Rect { alpha: 230, .. })
        ));

        fl.handle_input(InputEvent::Key("Space".to_string()));
        assert_eq!(fl.state(), PlaybackState::Playing);
        assert!(matches!(
            fl.tick(&mut surface).unwrap(),
            TickOutcome::Advanced { .. }
        ));
    }

    #[test]
    fn test_other_inputs_keep_state() {
        let mut fl = frame_loop(loud_source(0.1));
        fl.toggle_pause();

        for key in ["KeyR", "Digit2", "KeyT", "KeyS", "KeyC", "KeyZ"] {
            assert_eq!(fl.handle_input(InputEvent::Key(key.to_string())), Control::Continue);
        }
        fl.handle_input(InputEvent::Resize(1024, 768));

        assert_eq!(fl.state(), PlaybackState::Paused);
        assert_eq!(fl.visualizer().dimensions(), (1024, 768));
        assert!(fl.visualizer().trail());
    }

    #[test]
    fn test_quit_inputs() {
        let mut fl = frame_loop(loud_source(0.1));
        assert_eq!(fl.handle_input(InputEvent::Quit), Control::Quit);
        assert_eq!(
            fl.handle_input(InputEvent::Key("Escape".to_string())),
            Control::Quit
        );
    }

    #[test]
    fn test_invalid_bound_shape_keeps_mode() {
        let mut bindings = KeyBindings::default();
        bindings.bind("KeyX", Action::Shape("pentagons".to_string()));
        let mut fl = FrameLoop::new(
            Box::new(loud_source(0.1)),
            &SpectrumConfig::default(),
            ParticleSystem::seeded(ParticleConfig::default(), 1),
            &RenderConfig::default(),
            bindings,
        );

        fl.handle_input(InputEvent::Key("Digit3".to_string()));
        fl.handle_input(InputEvent::Key("KeyX".to_string()));
        assert_eq!(
            fl.visualizer().shape_mode(),
            crate::visualizer::ShapeMode::Diamonds
        );
    }

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<&'static str>>>,
    }

    impl PlaybackController for Recorder {
        fn pause(&mut self) -> Result<(), AudioError> {
            self.calls.borrow_mut().push("pause");
            Ok(())
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            self.calls.borrow_mut().push("resume");
            Ok(())
        }
    }

    #[test]
    fn test_playback_follows_pause_state() {
        let recorder = Recorder::default();
        let calls = Rc::clone(&recorder.calls);
        let mut fl = frame_loop(loud_source(0.1)).with_playback(Box::new(recorder));

        fl.toggle_pause();
        fl.toggle_pause();
        fl.apply(&Action::TogglePause);
        assert_eq!(*calls.borrow(), vec!["pause", "resume", "pause"]);
    }

    #[test]
    fn test_ticker_does_not_catch_up() {
        let start = Instant::now();
        let interval = Duration::from_millis(33);
        let mut ticker = Ticker::new(interval, start);
        assert!(ticker.is_due(start));

        ticker.advance(start);
        assert_eq!(ticker.deadline(), start + interval);
        assert!(!ticker.is_due(start + Duration::from_millis(10)));

        // Tick ran 100ms late: next one is a full interval later, not immediate
        let late = start + Duration::from_millis(133);
        ticker.advance(late);
        assert_eq!(ticker.deadline(), late + interval);
    }
}
