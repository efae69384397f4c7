//! Drawing surface abstraction and the world-to-screen viewport.
//!
//! [`DrawSurface`] is the 2D context the host hands out each frame. The crate
//! ships [`CommandRecorder`], which records every call as a [`DrawCommand`]
//! so that frames can be inspected without a window.

mod overlay;
mod scene;

use std::ops::{Deref, DerefMut};

use glam::{Affine2, Vec2};

use crate::color::Rgba;

pub use overlay::{TrailOverlay, OVERLAY_ALPHA};
pub use scene::{RenderOptions, SceneRenderer};

/// World rectangle the view is fitted to by default.
pub const LOGICAL_VIEW: Rect = Rect {
    min: Vec2::ZERO,
    max: Vec2::new(1200.0, 800.0),
};

pub trait DrawSurface {
    fn clear(&mut self, color: Rgba);
    fn push_transform(&mut self, transform: Affine2);
    fn pop_transform(&mut self);
    /// Opacity multiplier applied to everything drawn until changed again.
    fn set_global_alpha(&mut self, alpha: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32);
    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgba),
    PushTransform(Affine2),
    PopTransform,
    SetGlobalAlpha(f32),
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
    },
    StrokeCircle {
        center: Vec2,
        radius: f32,
        color: Rgba,
        width: f32,
    },
    FillPolygon {
        points: Vec<Vec2>,
        color: Rgba,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        color: Rgba,
        width: f32,
    },
}

/// Surface that keeps every call in order.
#[derive(Debug, Default, Clone)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
    transform_depth: usize,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hands back the recorded frame and starts a new one.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn transform_depth(&self) -> usize {
        self.transform_depth
    }
}

impl DrawSurface for CommandRecorder {
    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn push_transform(&mut self, transform: Affine2) {
        self.transform_depth += 1;
        self.commands.push(DrawCommand::PushTransform(transform));
    }

    fn pop_transform(&mut self) {
        self.transform_depth = self.transform_depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopTransform);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::SetGlobalAlpha(alpha));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
            width,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        self.commands.push(DrawCommand::FillPolygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Rgba, width: f32) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width,
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Uniform world-to-screen mapping fitted once to a fixed world rectangle,
/// whatever the mechanism or trail actually cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    display: Vec2,
    transform: Affine2,
}

impl Viewport {
    /// Fits `bounds` inside a `display`-sized target, centred, keeping the
    /// aspect ratio.
    pub fn look_at(bounds: Rect, display: Vec2) -> Self {
        let size = bounds.size();
        let scale = (display.x / size.x).min(display.y / size.y);
        let translation = (display - size * scale) * 0.5 - bounds.min * scale;
        Self {
            display,
            transform: Affine2::from_scale_angle_translation(Vec2::splat(scale), 0.0, translation),
        }
    }

    /// Display size for a target `width` pixels wide with the logical view's
    /// aspect ratio.
    pub fn display_for_width(width: f32) -> Vec2 {
        let size = LOGICAL_VIEW.size();
        Vec2::new(width, width * size.y / size.x)
    }

    pub fn display(&self) -> Vec2 {
        self.display
    }

    pub fn world_to_screen(&self, point: Vec2) -> Vec2 {
        self.transform.transform_point2(point)
    }

    /// Starts drawing in world coordinates. The transform is popped again when
    /// the returned scope is dropped.
    pub fn begin<'s, S: DrawSurface + ?Sized>(&self, surface: &'s mut S) -> ViewScope<'s, S> {
        surface.push_transform(self.transform);
        ViewScope { surface }
    }
}

/// Borrow of a surface with the view transform applied.
pub struct ViewScope<'s, S: DrawSurface + ?Sized> {
    surface: &'s mut S,
}

impl<S: DrawSurface + ?Sized> Deref for ViewScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> DerefMut for ViewScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DrawSurface + ?Sized> Drop for ViewScope<'_, S> {
    fn drop(&mut self) {
        self.surface.pop_transform();
    }
}

impl<S: DrawSurface + ?Sized> std::fmt::Debug for ViewScope<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewScope").finish()
    }
}
