//! Bounded, newest-first history of marker samples.
//!
//! Eviction is paced: when the capacity drops below the current length the
//! buffer sheds one extra sample per frame instead of being truncated, so a
//! shortened trail visibly shrinks from its tail over several frames.

use std::collections::VecDeque;

use glam::Vec2;

use crate::{color::ColorDescriptor, mechanism::BodyState, render::Rect};

/// Backlog samples removed per frame on top of the one that balances the capture.
const BACKLOG_EVICTIONS_PER_FRAME: usize = 1;

/// One marker reading, taken once per rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSample {
    pub position: Vec2,
    pub speed: f32,
}

impl TrailSample {
    pub fn color(&self) -> ColorDescriptor {
        ColorDescriptor::from_speed(self.speed)
    }
}

/// Samples ordered newest first: index 0 is the latest capture, the last
/// index is the next one to be evicted.
#[derive(Debug, Clone, Default)]
pub struct TrailBuffer {
    samples: VecDeque<TrailSample>,
}

impl TrailBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&TrailSample> {
        self.samples.front()
    }

    pub fn oldest(&self) -> Option<&TrailSample> {
        self.samples.back()
    }

    pub fn get(&self, index: usize) -> Option<&TrailSample> {
        self.samples.get(index)
    }

    /// Newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &TrailSample> + '_ {
        self.samples.iter()
    }

    /// Smallest rectangle holding every sample position.
    pub fn extent(&self) -> Option<Rect> {
        let first = self.samples.front()?.position;
        let (min, max) = self
            .iter()
            .fold((first, first), |(min, max), sample| {
                (min.min(sample.position), max.max(sample.position))
            });
        Some(Rect { min, max })
    }

    pub fn push_newest(&mut self, sample: TrailSample) {
        self.samples.push_front(sample);
    }

    /// Drops at most `budget` samples from the tail while the buffer is longer
    /// than `capacity`. Returns how many were dropped.
    pub fn evict_towards(&mut self, capacity: usize, budget: usize) -> usize {
        let excess = self.samples.len().saturating_sub(capacity);
        let count = excess.min(budget);
        for _ in 0..count {
            self.samples.pop_back();
        }
        count
    }
}

/// Outcome of one frame's capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    Recorded,
    /// The marker state was not finite; nothing was stored.
    Skipped,
}

/// Per-frame capture and paced eviction of marker samples.
#[derive(Debug, Clone, Default)]
pub struct TrailRecorder {
    buffer: TrailBuffer,
    captured_this_frame: bool,
}

impl TrailRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }

    /// Prepends the marker's position and speed.
    pub fn capture(&mut self, marker: &BodyState) -> Capture {
        if !marker.is_finite() {
            self.captured_this_frame = false;
            tracing::debug!("non-finite marker state, skipping capture");
            return Capture::Skipped;
        }

        self.buffer.push_newest(TrailSample {
            position: marker.position,
            speed: marker.speed,
        });
        self.captured_this_frame = true;
        Capture::Recorded
    }

    /// Runs once per frame after [`TrailRecorder::capture`]. Removes the
    /// sample the capture pushed past `capacity`, plus one sample of any
    /// backlog left over from a capacity reduction.
    pub fn evict(&mut self, capacity: usize) -> usize {
        let budget = usize::from(self.captured_this_frame) + BACKLOG_EVICTIONS_PER_FRAME;
        self.captured_this_frame = false;

        let evicted = self.buffer.evict_towards(capacity, budget);
        if evicted > 0 {
            tracing::trace!(evicted, len = self.buffer.len(), capacity, "trail evicted");
        }
        evicted
    }
}
