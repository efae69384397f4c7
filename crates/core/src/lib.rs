//! Core library for the Pintograph simulation.
//!
//! Two wheels turned at a fixed angle per tick crank a pair of pivoted arms,
//! and the point where the arms end traces a curve. The crate owns the
//! linkage model, the per-tick drive law, live configuration, and the fading
//! speed-coloured trail of the marker. The physics world and draw surface it
//! runs against live in [`physics`] and [`render`]; the run loop belongs to
//! the caller, which invokes [`Simulation::physics_tick`] and
//! [`Simulation::render_frame`] at their own cadences.

pub mod color;
pub mod config;
pub mod drive;
pub mod error;
pub mod mechanism;
pub mod physics;
pub mod render;
pub mod sim;
pub mod timeline;
pub mod trail;

pub use color::{ColorDescriptor, HuePolicy, Rgba};
pub use config::{ConfigStore, LiveConfig, Param, ParamSpec, ParameterPanel, SliderBinding};
pub use drive::{Actuation, DriveController};
pub use error::{PintographError, Result};
pub use mechanism::{BodyState, Mechanism, Part};
pub use physics::World;
pub use render::{CommandRecorder, DrawCommand, DrawSurface, RenderOptions, Viewport};
pub use sim::{FrameReport, Simulation, SimulationOptions};
pub use timeline::{Cadence, ScheduledTweak, TweakScheduler};
pub use trail::{Capture, TrailBuffer, TrailRecorder, TrailSample};
