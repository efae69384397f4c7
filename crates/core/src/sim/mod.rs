//! The control loop glue: one physics-tick hook and one after-render hook,
//! invoked by whoever owns the run loop.
//!
//! Everything runs on the caller's thread. Panel writes made through
//! [`Simulation::config_mut`] between two callbacks are seen by the very next
//! one; there is no other writer, so nothing is locked.

use glam::Vec2;

use crate::{
    color::HuePolicy,
    config::{ConfigStore, LiveConfig},
    drive::{Actuation, DriveController},
    mechanism::Mechanism,
    physics::World,
    render::{DrawSurface, RenderOptions, SceneRenderer, TrailOverlay, Viewport, LOGICAL_VIEW},
    trail::{Capture, TrailBuffer, TrailRecorder},
};

/// Knobs fixed for the lifetime of a [`Simulation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationOptions {
    pub render: RenderOptions,
    pub hue_policy: HuePolicy,
}

/// What happened during one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub ticks: u32,
    pub skipped_ticks: u32,
    pub capture: Capture,
    pub evicted: usize,
    pub trail_len: usize,
}

#[derive(Debug)]
pub struct Simulation {
    store: ConfigStore,
    world: World,
    mechanism: Mechanism,
    drive: DriveController,
    recorder: TrailRecorder,
    overlay: TrailOverlay,
    scene: SceneRenderer,
    viewport: Viewport,
}

impl Simulation {
    pub fn new(store: ConfigStore) -> Self {
        Self::with_options(store, SimulationOptions::default())
    }

    /// Builds the world with no ambient gravity, the mechanism inside it, and a
    /// viewport fitted once to the logical view.
    pub fn with_options(store: ConfigStore, options: SimulationOptions) -> Self {
        let mut world = World::new();
        world.set_gravity(Vec2::ZERO);
        let mechanism = Mechanism::build(&mut world, store.config());
        let viewport = Viewport::look_at(
            LOGICAL_VIEW,
            Viewport::display_for_width(store.config().width),
        );
        tracing::info!(
            display_width = viewport.display().x,
            display_height = viewport.display().y,
            "simulation ready"
        );

        Self {
            store,
            world,
            mechanism,
            drive: DriveController::new(),
            recorder: TrailRecorder::new(),
            overlay: TrailOverlay::new(options.hue_policy),
            scene: SceneRenderer::new(options.render),
            viewport,
        }
    }

    pub fn config(&self) -> &LiveConfig {
        self.store.config()
    }

    /// Write access for the parameter panel.
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }

    pub fn drive(&self) -> &DriveController {
        &self.drive
    }

    pub fn trail(&self) -> &TrailBuffer {
        self.recorder.buffer()
    }

    /// Kinematic actuation for the tick that is about to be solved.
    pub fn on_before_physics_step(&mut self) -> Actuation {
        self.drive
            .on_before_physics_step(&self.mechanism, &mut self.world, self.store.config())
    }

    /// Integrates and relaxes the world for the current tick.
    pub fn solve(&mut self) {
        self.world.step();
    }

    /// One physics tick: actuation first, then the solve.
    pub fn physics_tick(&mut self) -> Actuation {
        let actuation = self.on_before_physics_step();
        self.solve();
        actuation
    }

    /// Overlay pass for a frame whose bodies are already on `surface`:
    /// capture the marker, paint the trail, then evict at the paced rate.
    pub fn on_after_render_frame<S: DrawSurface + ?Sized>(
        &mut self,
        surface: &mut S,
    ) -> (Capture, usize) {
        let marker = self.mechanism.marker_state(&self.world);
        let capture = self.recorder.capture(&marker);
        self.overlay.paint(
            surface,
            &self.viewport,
            self.recorder.buffer(),
            self.store.config(),
        );
        let evicted = self.recorder.evict(self.store.config().trail_capacity());
        (capture, evicted)
    }

    /// Primary body pass followed by the overlay pass.
    pub fn render_frame<S: DrawSurface + ?Sized>(&mut self, surface: &mut S) -> (Capture, usize) {
        self.scene.render(&self.world, &self.viewport, surface);
        self.on_after_render_frame(surface)
    }

    /// Runs `ticks` physics ticks and then renders one frame.
    pub fn advance_frame<S>(&mut self, ticks: u32, surface: &mut S) -> FrameReport
    where
        S: DrawSurface + ?Sized,
    {
        let mut skipped_ticks = 0;
        for _ in 0..ticks {
            if self.physics_tick() == Actuation::Skipped {
                skipped_ticks += 1;
            }
        }
        let (capture, evicted) = self.render_frame(surface);

        FrameReport {
            ticks,
            skipped_ticks,
            capture,
            evicted,
            trail_len: self.trail().len(),
        }
    }
}
