use glam::Vec2;

use crate::{
    color::Rgba,
    physics::{BodySnapshot, Shape, World},
};

use super::{DrawSurface, Viewport};

const OUTLINE_WIDTH: f32 = 1.0;
const INDICATOR_WIDTH: f32 = 1.0;
const INDICATOR_COLOR: Rgba = Rgba::rgb(255, 255, 255);
const PALETTE: [Rgba; 5] = [
    Rgba::rgb(243, 156, 18),
    Rgba::rgb(46, 204, 113),
    Rgba::rgb(52, 152, 219),
    Rgba::rgb(155, 89, 182),
    Rgba::rgb(236, 240, 241),
];

/// Options the body renderer is bound with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Outline bodies instead of filling them.
    pub wireframes: bool,
    pub background: Rgba,
    /// Draw a line from each body's centre along its local x axis.
    pub show_angle_indicator: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            wireframes: false,
            background: Rgba::rgb(255, 0, 0),
            show_angle_indicator: true,
        }
    }
}

/// Paints every body of a world. This is the primary pass that the trail
/// overlay is drawn on top of.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    options: RenderOptions,
}

impl SceneRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn render<S>(&self, world: &World, viewport: &Viewport, surface: &mut S)
    where
        S: DrawSurface + ?Sized,
    {
        surface.clear(self.options.background);
        let mut scope = viewport.begin(surface);
        for (index, (shape, body)) in world.bodies().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            self.draw_body(&mut *scope, shape, &body, color);
        }
    }

    fn draw_body<S>(&self, surface: &mut S, shape: Shape, body: &BodySnapshot, color: Rgba)
    where
        S: DrawSurface + ?Sized,
    {
        let reach = match shape {
            Shape::Circle { radius } => {
                if self.options.wireframes {
                    surface.stroke_circle(body.position, radius, color, OUTLINE_WIDTH);
                } else {
                    surface.fill_circle(body.position, radius, color);
                }
                radius
            }
            Shape::Rectangle { width, height } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                let corners = [
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ]
                .map(|corner| body.local_to_world(corner));
                if self.options.wireframes {
                    for (i, from) in corners.iter().enumerate() {
                        let to = corners[(i + 1) % corners.len()];
                        surface.stroke_line(*from, to, color, OUTLINE_WIDTH);
                    }
                } else {
                    surface.fill_polygon(&corners, color);
                }
                hw
            }
        };

        if self.options.show_angle_indicator {
            let tip = body.local_to_world(Vec2::new(reach, 0.0));
            surface.stroke_line(body.position, tip, INDICATOR_COLOR, INDICATOR_WIDTH);
        }
    }
}
