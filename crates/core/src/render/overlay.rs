use crate::{color::HuePolicy, config::LiveConfig, trail::TrailBuffer};

use super::{DrawSurface, Viewport};

/// Opacity of the whole trail pass.
pub const OVERLAY_ALPHA: f32 = 0.7;

/// Paints the trail on top of the frame the scene renderer just drew.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailOverlay {
    hue_policy: HuePolicy,
}

impl TrailOverlay {
    pub fn new(hue_policy: HuePolicy) -> Self {
        Self { hue_policy }
    }

    /// One disc of radius `trail_width` per sample, newest first, at a single
    /// global opacity that is restored afterwards.
    pub fn paint<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        viewport: &Viewport,
        trail: &TrailBuffer,
        config: &LiveConfig,
    ) {
        let mut scope = viewport.begin(surface);
        scope.set_global_alpha(OVERLAY_ALPHA);
        for sample in trail.iter() {
            let color = sample.color().to_rgba(self.hue_policy);
            scope.fill_circle(sample.position, config.trail_width, color);
        }
        scope.set_global_alpha(1.0);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::{
        render::{CommandRecorder, DrawCommand, LOGICAL_VIEW},
        trail::TrailSample,
    };

    #[test]
    fn paints_newest_first_under_one_alpha() {
        let mut trail = TrailBuffer::new();
        trail.push_newest(TrailSample {
            position: Vec2::new(1.0, 1.0),
            speed: 0.0,
        });
        trail.push_newest(TrailSample {
            position: Vec2::new(2.0, 2.0),
            speed: 12.0,
        });
        let mut config = LiveConfig::default();
        config.trail_width = 7.0;
        let viewport = Viewport::look_at(LOGICAL_VIEW, Vec2::new(1200.0, 800.0));
        let mut surface = CommandRecorder::new();

        TrailOverlay::default().paint(&mut surface, &viewport, &trail, &config);

        let commands = surface.commands();
        assert_eq!(commands.len(), 6);
        assert!(matches!(commands[0], DrawCommand::PushTransform(_)));
        assert_eq!(commands[1], DrawCommand::SetGlobalAlpha(OVERLAY_ALPHA));
        match (&commands[2], &commands[3]) {
            (
                DrawCommand::FillCircle {
                    center: newest,
                    radius,
                    ..
                },
                DrawCommand::FillCircle { center: oldest, .. },
            ) => {
                assert_eq!(*newest, Vec2::new(2.0, 2.0));
                assert_eq!(*oldest, Vec2::new(1.0, 1.0));
                assert_eq!(*radius, 7.0);
            }
            other => panic!("expected two discs, got {other:?}"),
        }
        assert_eq!(commands[4], DrawCommand::SetGlobalAlpha(1.0));
        assert_eq!(commands[5], DrawCommand::PopTransform);
    }

    #[test]
    fn disc_colour_follows_speed() {
        let mut trail = TrailBuffer::new();
        trail.push_newest(TrailSample {
            position: Vec2::ZERO,
            speed: 0.0,
        });
        let viewport = Viewport::look_at(LOGICAL_VIEW, Vec2::new(1200.0, 800.0));
        let config = LiveConfig::default();
        let mut wrapped = CommandRecorder::new();
        let mut clamped = CommandRecorder::new();

        TrailOverlay::new(HuePolicy::Wrap).paint(&mut wrapped, &viewport, &trail, &config);
        TrailOverlay::new(HuePolicy::Clamp).paint(&mut clamped, &viewport, &trail, &config);

        assert_ne!(wrapped.commands()[2], clamped.commands()[2]);
    }
}
