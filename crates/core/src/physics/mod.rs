//! Thin adapter over the `rapier2d` pipeline.
//!
//! Lengths are logical pixels and one [`World::step`] advances one physics
//! tick. Velocities are reported as displacement per tick so they read on the
//! same scale as the wheel speeds.

use std::fmt;

use glam::Vec2;
use rapier2d::prelude::*;

pub use rapier2d::prelude::{
    ImpulseJointHandle as ConstraintHandle, InteractionGroups, RigidBodyHandle as BodyHandle,
};

/// Simulated seconds per tick.
pub const TICK_SECONDS: Real = 1.0 / 60.0;
const DENSITY: Real = 0.001;
/// Roughly a 1% velocity loss per tick at 60 Hz.
const AIR_DAMPING: Real = 0.6;
const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 9.81);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Moved only by explicit position targets.
    Kinematic,
    /// Moved by the solver.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rectangle { width: f32, height: f32 },
}

impl Shape {
    fn collider(self) -> ColliderBuilder {
        match self {
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
            Shape::Rectangle { width, height } => {
                ColliderBuilder::cuboid(width / 2.0, height / 2.0)
            }
        }
    }
}

/// Everything needed to insert one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub motion: Motion,
    pub shape: Shape,
    pub position: Vec2,
    pub angle: f32,
    pub groups: InteractionGroups,
}

impl BodyDesc {
    pub fn kinematic(shape: Shape, position: Vec2) -> Self {
        Self::new(Motion::Kinematic, shape, position)
    }

    pub fn dynamic(shape: Shape, position: Vec2) -> Self {
        Self::new(Motion::Dynamic, shape, position)
    }

    fn new(motion: Motion, shape: Shape, position: Vec2) -> Self {
        Self {
            motion,
            shape,
            position,
            angle: 0.0,
            groups: InteractionGroups::all(),
        }
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_groups(mut self, groups: InteractionGroups) -> Self {
        self.groups = groups;
        self
    }
}

/// Pose and motion of one body, read between steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub angle: f32,
    /// Displacement per tick.
    pub velocity: Vec2,
    /// Radians per tick.
    pub angular_velocity: f32,
}

impl BodySnapshot {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Maps a point in the body's local frame into world space.
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.position + Vec2::from_angle(self.angle).rotate(local)
    }
}

pub struct World {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    query_pipeline: QueryPipeline,
    ground: BodyHandle,
    shapes: Vec<(BodyHandle, Shape)>,
    groups_allocated: u32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("gravity", &self.gravity())
            .field("bodies", &self.shapes.len())
            .field("joints", &self.impulse_joints.len())
            .finish_non_exhaustive()
    }
}

impl World {
    /// Creates an empty world with a fixed ground body at the origin that
    /// world-space pins attach to.
    pub fn new() -> Self {
        let mut bodies = RigidBodySet::new();
        let ground = bodies.insert(RigidBodyBuilder::fixed().build());
        Self {
            gravity: to_vector(DEFAULT_GRAVITY),
            params: IntegrationParameters {
                dt: TICK_SECONDS,
                ..IntegrationParameters::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            ground,
            shapes: Vec::new(),
            groups_allocated: 0,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        to_vec2(&self.gravity)
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_vector(gravity);
    }

    /// Allocates a fresh collision group bit. Members of an exclusive group
    /// never collide with each other but still collide with everything else.
    pub fn next_group(&mut self, exclusive: bool) -> InteractionGroups {
        let bit = Group::from_bits_truncate(1 << (self.groups_allocated % 32));
        self.groups_allocated += 1;
        if exclusive {
            InteractionGroups::new(bit, !bit)
        } else {
            InteractionGroups::new(bit, Group::ALL)
        }
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let builder = match desc.motion {
            Motion::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            Motion::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(AIR_DAMPING)
                .angular_damping(AIR_DAMPING)
                .can_sleep(false),
        };
        let body = builder
            .translation(to_vector(desc.position))
            .rotation(desc.angle)
            .build();
        let handle = self.bodies.insert(body);

        let collider = desc
            .shape
            .collider()
            .density(DENSITY)
            .collision_groups(desc.groups)
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.shapes.push((handle, desc.shape));
        handle
    }

    /// Hinges a point fixed on `a` to a point fixed on `b`. Anchors are in
    /// each body's local frame.
    pub fn add_pivot(
        &mut self,
        a: BodyHandle,
        anchor_a: Vec2,
        b: BodyHandle,
        anchor_b: Vec2,
    ) -> ConstraintHandle {
        let joint = RevoluteJointBuilder::new()
            .local_anchor1(to_point(anchor_a))
            .local_anchor2(to_point(anchor_b));
        self.impulse_joints.insert(a, b, joint, true)
    }

    /// Hinges `body`'s centre to a world-space point on the ground body.
    pub fn pin_to_ground(&mut self, body: BodyHandle, at: Vec2) -> ConstraintHandle {
        self.add_pivot(body, Vec2::ZERO, self.ground, at)
    }

    /// Moves the ground end of a pin made by [`World::pin_to_ground`].
    pub fn set_ground_anchor(&mut self, pin: ConstraintHandle, at: Vec2) {
        if let Some(joint) = self.impulse_joints.get_mut(pin) {
            joint.data.set_local_anchor2(to_point(at));
        }
    }

    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    pub fn body(&self, handle: BodyHandle) -> BodySnapshot {
        let body = &self.bodies[handle];
        BodySnapshot {
            position: to_vec2(body.translation()),
            angle: body.rotation().angle(),
            velocity: to_vec2(body.linvel()) * TICK_SECONDS,
            angular_velocity: body.angvel() * TICK_SECONDS,
        }
    }

    /// Every inserted body with its shape, in insertion order. The ground is
    /// not included.
    pub fn bodies(&self) -> impl Iterator<Item = (Shape, BodySnapshot)> + '_ {
        self.shapes
            .iter()
            .map(|&(handle, shape)| (shape, self.body(handle)))
    }

    pub fn collision_groups(&self, handle: BodyHandle) -> Option<InteractionGroups> {
        let collider = self.bodies.get(handle)?.colliders().first()?;
        self.colliders.get(*collider).map(|c| c.collision_groups())
    }

    /// Teleports a kinematic body. Its orientation target is left alone.
    pub fn place(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(to_vector(position), true);
        }
    }

    /// Turns a kinematic body by `delta` radians over the next step.
    pub fn turn(&mut self, handle: BodyHandle, delta: f32) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let angle = body.next_position().rotation.angle() + delta;
            body.set_next_kinematic_rotation(Rotation::new(angle));
        }
    }

    /// The two bodies a joint connects, in insertion order.
    pub fn joint_bodies(&self, handle: ConstraintHandle) -> Option<(BodyHandle, BodyHandle)> {
        self.impulse_joints
            .get(handle)
            .map(|joint| (joint.body1, joint.body2))
    }

    /// Joint anchors in their bodies' local frames.
    pub fn joint_local_anchors(&self, handle: ConstraintHandle) -> Option<(Vec2, Vec2)> {
        let joint = self.impulse_joints.get(handle)?;
        Some((
            point_to_vec2(&joint.data.local_anchor1()),
            point_to_vec2(&joint.data.local_anchor2()),
        ))
    }

    /// Joint anchors in world space.
    pub fn joint_anchors(&self, handle: ConstraintHandle) -> Option<(Vec2, Vec2)> {
        let joint = self.impulse_joints.get(handle)?;
        let a = self.bodies.get(joint.body1)?.position() * joint.data.local_anchor1();
        let b = self.bodies.get(joint.body2)?.position() * joint.data.local_anchor2();
        Some((point_to_vec2(&a), point_to_vec2(&b)))
    }

    /// Gap between a joint's two anchors. Zero when the hinge is closed.
    pub fn constraint_error(&self, handle: ConstraintHandle) -> Option<f32> {
        self.joint_anchors(handle).map(|(a, b)| a.distance(b))
    }

    /// Advances the world by one tick.
    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}

fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_point(v: Vec2) -> Point<Real> {
    point![v.x, v.y]
}

fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn point_to_vec2(p: &Point<Real>) -> Vec2 {
    Vec2::new(p.x, p.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_world() -> World {
        let mut world = World::new();
        world.set_gravity(Vec2::ZERO);
        world
    }

    #[test]
    fn exclusive_groups_never_collide() {
        let mut world = World::new();
        let exclusive = world.next_group(true);
        let shared = world.next_group(false);

        assert!(!exclusive.test(exclusive));
        assert!(shared.test(shared));
        assert!(exclusive.test(shared));
        assert!(exclusive.test(InteractionGroups::all()));
    }

    #[test]
    fn bodies_keep_their_groups() {
        let mut world = World::new();
        let group = world.next_group(true);
        let ball = world.add_body(
            BodyDesc::dynamic(Shape::Circle { radius: 5.0 }, Vec2::ZERO).with_groups(group),
        );

        assert_eq!(world.collision_groups(ball), Some(group));
        assert_eq!(world.collision_groups(world.ground()), None);
    }

    #[test]
    fn dynamic_body_rests_without_gravity() {
        let mut world = still_world();
        let at = Vec2::new(10.0, 20.0);
        let ball = world.add_body(BodyDesc::dynamic(Shape::Circle { radius: 5.0 }, at));

        for _ in 0..10 {
            world.step();
        }
        let state = world.body(ball);
        assert!((state.position - Vec2::new(10.0, 20.0)).length() < 1e-4);
        assert!(state.speed() < 1e-4);
    }

    #[test]
    fn place_moves_a_kinematic_body_at_once() {
        let mut world = still_world();
        let wheel = world.add_body(BodyDesc::kinematic(Shape::Circle { radius: 50.0 }, Vec2::ZERO));

        world.place(wheel, Vec2::new(30.0, 0.0));
        assert_eq!(world.body(wheel).position, Vec2::new(30.0, 0.0));

        world.step();
        assert!((world.body(wheel).position - Vec2::new(30.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn turn_lands_on_the_next_step() {
        let mut world = still_world();
        let wheel = world.add_body(BodyDesc::kinematic(Shape::Circle { radius: 50.0 }, Vec2::ZERO));

        world.turn(wheel, 0.25);
        assert_eq!(world.body(wheel).angle, 0.0);

        world.step();
        assert!((world.body(wheel).angle - 0.25).abs() < 1e-5);
    }

    #[test]
    fn crank_drags_a_pivoted_rod() {
        let mut world = still_world();
        let group = world.next_group(true);
        let wheel = world.add_body(
            BodyDesc::kinematic(Shape::Circle { radius: 60.0 }, Vec2::ZERO).with_groups(group),
        );
        let rod = world.add_body(
            BodyDesc::dynamic(
                Shape::Rectangle {
                    width: 100.0,
                    height: 10.0,
                },
                Vec2::new(100.0, 0.0),
            )
            .with_groups(group),
        );
        let pivot = world.add_pivot(rod, Vec2::new(-50.0, 0.0), wheel, Vec2::new(50.0, 0.0));
        assert!(world.constraint_error(pivot).unwrap() < 1e-4);

        for _ in 0..30 {
            world.turn(wheel, 0.02);
            world.step();
        }

        let (on_rod, on_wheel) = world.joint_anchors(pivot).unwrap();
        assert!(on_rod.distance(on_wheel) < 1.0);
        assert!(on_wheel.y > 10.0);
        assert!(world.body(rod).position.is_finite());
    }

    #[test]
    fn ground_pin_follows_its_anchor() {
        let mut world = still_world();
        let at = Vec2::new(100.0, 100.0);
        let wheel = world.add_body(BodyDesc::kinematic(Shape::Circle { radius: 50.0 }, at));
        let pin = world.pin_to_ground(wheel, Vec2::new(100.0, 100.0));
        assert_eq!(world.joint_bodies(pin), Some((wheel, world.ground())));
        assert!(world.constraint_error(pin).unwrap() < 1e-4);

        world.place(wheel, Vec2::new(140.0, 100.0));
        world.set_ground_anchor(pin, Vec2::new(140.0, 100.0));

        assert_eq!(
            world.joint_local_anchors(pin),
            Some((Vec2::ZERO, Vec2::new(140.0, 100.0)))
        );
        assert!(world.constraint_error(pin).unwrap() < 1e-4);
    }

    #[test]
    fn snapshot_maps_local_points_through_rotation() {
        let mut world = still_world();
        let arm = world.add_body(
            BodyDesc::dynamic(
                Shape::Rectangle {
                    width: 200.0,
                    height: 20.0,
                },
                Vec2::new(100.0, 100.0),
            )
            .with_angle(std::f32::consts::FRAC_PI_2),
        );

        let tip = world.body(arm).local_to_world(Vec2::new(100.0, 0.0));
        assert!((tip - Vec2::new(100.0, 200.0)).length() < 1e-3);
        assert_eq!(world.bodies().count(), 1);
    }
}
