//! Property tests for the trail recorder's bounds and eviction pacing.

use glam::Vec2;
use pintograph_core::{mechanism::BodyState, Capture, TrailRecorder};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Frame {
    Capture { x: f32, speed: f32 },
    CaptureNonFinite,
    Resize(usize),
}

fn frame_strategy() -> impl Strategy<Value = Frame> {
    prop_oneof![
        6 => (-1_000.0f32..1_000.0, 0.0f32..40.0)
            .prop_map(|(x, speed)| Frame::Capture { x, speed }),
        1 => Just(Frame::CaptureNonFinite),
        2 => (0usize..120).prop_map(Frame::Resize),
    ]
}

fn marker(x: f32, speed: f32) -> BodyState {
    BodyState {
        position: Vec2::new(x, -x),
        angle: 0.0,
        velocity: Vec2::new(speed, 0.0),
        speed,
    }
}

proptest! {
    #[test]
    fn length_follows_the_pacing_law(
        initial_capacity in 0usize..120,
        frames in prop::collection::vec(frame_strategy(), 1..300),
    ) {
        let mut recorder = TrailRecorder::new();
        let mut capacity = initial_capacity;

        for frame in frames {
            let before = recorder.buffer().len();
            let captured = match frame {
                Frame::Capture { x, speed } => {
                    let outcome = recorder.capture(&marker(x, speed));
                    prop_assert_eq!(outcome, Capture::Recorded);
                    let newest = recorder.buffer().newest().unwrap();
                    prop_assert_eq!(newest.position, Vec2::new(x, -x));
                    prop_assert_eq!(newest.speed, speed);
                    1
                }
                Frame::CaptureNonFinite => {
                    let outcome = recorder.capture(&marker(f32::NAN, 1.0));
                    prop_assert_eq!(outcome, Capture::Skipped);
                    0
                }
                Frame::Resize(next) => {
                    capacity = next;
                    0
                }
            };
            recorder.evict(capacity);

            let after = recorder.buffer().len();
            let grown = before + captured;
            let expected = if grown <= capacity {
                grown
            } else {
                capacity.max(before.saturating_sub(1))
            };
            prop_assert_eq!(after, expected);
            prop_assert!(after <= before + 1);
        }
    }

    #[test]
    fn steady_capacity_is_never_exceeded(
        capacity in 0usize..64,
        frames in 1usize..200,
    ) {
        let mut recorder = TrailRecorder::new();
        for i in 0..frames {
            recorder.capture(&marker(i as f32, 1.0));
            recorder.evict(capacity);
            prop_assert!(recorder.buffer().len() <= capacity);
        }
        prop_assert_eq!(recorder.buffer().len(), capacity.min(frames));
    }
}
