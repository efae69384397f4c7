use glam::Vec2;

use crate::{
    config::LiveConfig,
    mechanism::{Mechanism, Part},
    physics::World,
};

/// What a call to [`DriveController::on_before_physics_step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actuation {
    Applied,
    /// Config or body state was not finite; the wheels were left alone.
    Skipped,
}

/// Kinematic actuator for the two wheels. Runs once per physics tick, strictly
/// before the world steps.
#[derive(Debug, Default, Clone)]
pub struct DriveController {
    ticks: u64,
    skipped: u64,
}

impl DriveController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks on which the wheels were actually driven.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn on_before_physics_step(
        &mut self,
        mechanism: &Mechanism,
        world: &mut World,
        config: &LiveConfig,
    ) -> Actuation {
        let wheel_l = mechanism.state(world, Part::WheelL);
        let wheel_r = mechanism.state(world, Part::WheelR);
        let inputs_finite = config.wheels_separation.is_finite()
            && config.speed_l.is_finite()
            && config.speed_r.is_finite();
        if !inputs_finite || !wheel_l.is_finite() || !wheel_r.is_finite() {
            self.skipped += 1;
            tracing::debug!(tick = self.ticks, "non-finite drive input, skipping actuation");
            return Actuation::Skipped;
        }

        // Overwrites whatever the previous solve left in x.
        let target = Vec2::new(
            mechanism.center_x() - config.wheels_separation / 2.0,
            wheel_l.position.y,
        );
        mechanism.place_wheel_l(world, target);
        mechanism.sync_wheel_l_pin(world);

        // The crank pivot stays attached to the left wheel: topology never
        // changes after the build, so there is nothing to re-link here.
        debug_assert_eq!(
            world.joint_bodies(mechanism.arm_wheel_l()).map(|(_, wheel)| wheel),
            Some(mechanism.handle(Part::WheelL))
        );

        // Kinematic targets, reached during the coming solve.
        world.turn(mechanism.handle(Part::WheelL), config.speed_l);
        world.turn(mechanism.handle(Part::WheelR), config.speed_r);

        self.ticks += 1;
        Actuation::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (World, Mechanism, LiveConfig) {
        let config = LiveConfig::default();
        let mut world = World::new();
        world.set_gravity(Vec2::ZERO);
        let mechanism = Mechanism::build(&mut world, &config);
        (world, mechanism, config)
    }

    #[test]
    fn holds_wheel_at_half_separation_every_tick() {
        let (mut world, mechanism, mut config) = setup();
        let mut drive = DriveController::new();

        for tick in 0..40 {
            if tick == 20 {
                config.wheels_separation = 380.0;
            }
            assert_eq!(
                drive.on_before_physics_step(&mechanism, &mut world, &config),
                Actuation::Applied
            );
            let offset = mechanism.wheel_l_offset(&world);
            assert!((offset - config.wheels_separation / 2.0).abs() < 1e-3);
            world.step();
        }
        assert_eq!(drive.ticks(), 40);
    }

    #[test]
    fn pin_anchor_follows_the_wheel() {
        let (mut world, mechanism, config) = setup();
        let mut drive = DriveController::new();

        for _ in 0..5 {
            drive.on_before_physics_step(&mechanism, &mut world, &config);
            let wheel = mechanism.state(&world, Part::WheelL).position;
            assert_eq!(
                world.joint_local_anchors(mechanism.wheel_l_pin()),
                Some((Vec2::ZERO, wheel))
            );
            world.step();
        }
    }

    #[test]
    fn advances_each_wheel_by_its_own_speed() {
        let (mut world, mechanism, mut config) = setup();
        config.speed_l = 0.2;
        config.speed_r = 0.05;
        let mut drive = DriveController::new();

        let before_l = mechanism.state(&world, Part::WheelL).angle;
        let before_r = mechanism.state(&world, Part::WheelR).angle;
        drive.on_before_physics_step(&mechanism, &mut world, &config);
        world.step();

        let after_l = mechanism.state(&world, Part::WheelL).angle;
        let after_r = mechanism.state(&world, Part::WheelR).angle;
        assert!((after_l - before_l - 0.2).abs() < 1e-5);
        assert!((after_r - before_r - 0.05).abs() < 1e-5);
    }

    #[test]
    fn skips_non_finite_configuration() {
        let (mut world, mechanism, mut config) = setup();
        config.wheels_separation = f32::NAN;
        let mut drive = DriveController::new();
        let before = mechanism.state(&world, Part::WheelL);

        assert_eq!(
            drive.on_before_physics_step(&mechanism, &mut world, &config),
            Actuation::Skipped
        );
        assert_eq!(mechanism.state(&world, Part::WheelL), before);
        assert_eq!(drive.skipped(), 1);
        assert_eq!(drive.ticks(), 0);
    }
}
