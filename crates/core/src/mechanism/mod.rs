use glam::Vec2;

use crate::{
    config::LiveConfig,
    physics::{BodyDesc, BodyHandle, ConstraintHandle, InteractionGroups, Shape, World},
};

/// The five bodies of the linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    WheelL,
    WheelR,
    ArmL,
    ArmR,
    Marker,
}

impl Part {
    pub const ALL: [Part; 5] = [Part::WheelL, Part::WheelR, Part::ArmL, Part::ArmR, Part::Marker];
}

/// Snapshot of one body, read after a tick or a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub speed: f32,
}

impl BodyState {
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.angle.is_finite() && self.speed.is_finite()
    }
}

/// Handles into the world for the two driven wheels, the two arms, the marker
/// and the six joints linking them. The topology is fixed once built.
#[derive(Debug, Clone)]
pub struct Mechanism {
    wheel_l: BodyHandle,
    wheel_r: BodyHandle,
    arm_l: BodyHandle,
    arm_r: BodyHandle,
    marker: BodyHandle,
    wheel_l_pin: ConstraintHandle,
    wheel_r_pin: ConstraintHandle,
    arm_wheel_l: ConstraintHandle,
    arm_wheel_r: ConstraintHandle,
    arm_marker: ConstraintHandle,
    arm_arm: ConstraintHandle,
    groups: InteractionGroups,
    center_x: f32,
}

impl Mechanism {
    /// Adds the linkage to `world`. Wheels are kinematic, arms and marker are
    /// left to the solver. Geometry is not validated: arms too short to meet
    /// are seeded flat and the joints pull them together on the first ticks.
    pub fn build(world: &mut World, config: &LiveConfig) -> Self {
        let groups = world.next_group(true);
        let half_separation = config.wheels_separation / 2.0;
        let reach_l = config.arm_l_length / 2.0 - config.arms_padding;
        let reach_r = config.arm_r_length / 2.0 - config.arms_padding;
        let link_l = reach_l * config.arms_joint;

        let wheel_l_at = Vec2::new(config.wheels_x - half_separation, config.wheels_y);
        let wheel_r_at = Vec2::new(config.wheels_x + half_separation, config.wheels_y);
        let crank_l = Vec2::new(config.crank_l_offset, 0.0);
        let crank_r = Vec2::new(config.crank_r_offset, 0.0);
        let pivot_l = wheel_l_at + crank_l;
        let pivot_r = wheel_r_at + crank_r;

        // Both arms point from the shared link towards their crank pivot.
        let link = meeting_point(pivot_l, reach_l + link_l, pivot_r, 2.0 * reach_r);
        let (dir_l, dir_r) = match link {
            Some(link) => ((pivot_l - link).normalize(), (pivot_r - link).normalize()),
            None => (Vec2::X, Vec2::X),
        };
        let arm_l_at = pivot_l - dir_l * reach_l;
        let arm_r_at = pivot_r - dir_r * reach_r;
        let marker_at = pivot_l - dir_l * (2.0 * reach_l);

        let wheel_l = world.add_body(
            BodyDesc::kinematic(
                Shape::Circle {
                    radius: config.wheel_l_radius,
                },
                wheel_l_at,
            )
            .with_groups(groups),
        );
        let wheel_r = world.add_body(
            BodyDesc::kinematic(
                Shape::Circle {
                    radius: config.wheel_r_radius,
                },
                wheel_r_at,
            )
            .with_groups(groups),
        );
        let arm_r = world.add_body(
            BodyDesc::dynamic(
                Shape::Rectangle {
                    width: config.arm_r_length,
                    height: config.arms_width,
                },
                arm_r_at,
            )
            .with_angle(angle_of(dir_r))
            .with_groups(groups),
        );
        let arm_l = world.add_body(
            BodyDesc::dynamic(
                Shape::Rectangle {
                    width: config.arm_l_length,
                    height: config.arms_width,
                },
                arm_l_at,
            )
            .with_angle(angle_of(dir_l))
            .with_groups(groups),
        );
        let marker = world.add_body(
            BodyDesc::dynamic(
                Shape::Circle {
                    radius: config.arms_width,
                },
                marker_at,
            )
            .with_groups(groups),
        );

        let wheel_l_pin = world.pin_to_ground(wheel_l, wheel_l_at);
        let wheel_r_pin = world.pin_to_ground(wheel_r, wheel_r_at);
        let arm_wheel_l = world.add_pivot(arm_l, Vec2::new(reach_l, 0.0), wheel_l, crank_l);
        let arm_wheel_r = world.add_pivot(arm_r, Vec2::new(reach_r, 0.0), wheel_r, crank_r);
        let arm_marker = world.add_pivot(arm_l, Vec2::new(-reach_l, 0.0), marker, Vec2::ZERO);
        let link_on_l = Vec2::new(-link_l, 0.0);
        let arm_arm = world.add_pivot(arm_r, Vec2::new(-reach_r, 0.0), arm_l, link_on_l);

        tracing::info!(
            separation = config.wheels_separation,
            arm_l = config.arm_l_length,
            arm_r = config.arm_r_length,
            "mechanism built"
        );

        Self {
            wheel_l,
            wheel_r,
            arm_l,
            arm_r,
            marker,
            wheel_l_pin,
            wheel_r_pin,
            arm_wheel_l,
            arm_wheel_r,
            arm_marker,
            arm_arm,
            groups,
            center_x: config.wheels_x,
        }
    }

    pub fn handle(&self, part: Part) -> BodyHandle {
        match part {
            Part::WheelL => self.wheel_l,
            Part::WheelR => self.wheel_r,
            Part::ArmL => self.arm_l,
            Part::ArmR => self.arm_r,
            Part::Marker => self.marker,
        }
    }

    /// Joints in build order: the two wheel pins, the two crank pivots, the
    /// marker pivot and the arm-to-arm link.
    pub fn constraints(&self) -> [ConstraintHandle; 6] {
        [
            self.wheel_l_pin,
            self.wheel_r_pin,
            self.arm_wheel_l,
            self.arm_wheel_r,
            self.arm_marker,
            self.arm_arm,
        ]
    }

    pub fn wheel_l_pin(&self) -> ConstraintHandle {
        self.wheel_l_pin
    }

    pub fn arm_wheel_l(&self) -> ConstraintHandle {
        self.arm_wheel_l
    }

    pub fn collision_groups(&self) -> InteractionGroups {
        self.groups
    }

    /// Horizontal centre the two wheels are spread around.
    pub fn center_x(&self) -> f32 {
        self.center_x
    }

    pub fn state(&self, world: &World, part: Part) -> BodyState {
        let body = world.body(self.handle(part));
        BodyState {
            position: body.position,
            angle: body.angle,
            velocity: body.velocity,
            speed: body.speed(),
        }
    }

    pub fn marker_state(&self, world: &World) -> BodyState {
        self.state(world, Part::Marker)
    }

    /// Horizontal distance from the mechanism centre to the left wheel.
    pub fn wheel_l_offset(&self, world: &World) -> f32 {
        self.center_x - world.body(self.wheel_l).position.x
    }

    /// Moves the left wheel kinematically. The wheel pin still points at the
    /// old spot until [`Mechanism::sync_wheel_l_pin`] runs.
    pub fn place_wheel_l(&self, world: &mut World, position: Vec2) {
        world.place(self.wheel_l, position);
    }

    /// Re-anchors the left wheel's pin onto the wheel's current position.
    pub fn sync_wheel_l_pin(&self, world: &mut World) {
        let position = world.body(self.wheel_l).position;
        world.set_ground_anchor(self.wheel_l_pin, position);
    }
}

/// Point `reach_a` away from `a` and `reach_b` away from `b`, taking the
/// solution above the line through them (smaller y). `None` when the two
/// circles do not meet.
fn meeting_point(a: Vec2, reach_a: f32, b: Vec2, reach_b: f32) -> Option<Vec2> {
    let base = b - a;
    let distance = base.length();
    if distance <= f32::EPSILON
        || distance > reach_a + reach_b
        || distance < (reach_a - reach_b).abs()
    {
        return None;
    }

    let along = (reach_a * reach_a - reach_b * reach_b + distance * distance) / (2.0 * distance);
    let height = (reach_a * reach_a - along * along).max(0.0).sqrt();
    let dir = base / distance;
    let foot = a + dir * along;
    let (p, q) = (foot + dir.perp() * height, foot - dir.perp() * height);
    Some(if p.y <= q.y { p } else { q })
}

fn angle_of(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}
