//! A minimal discrete-event clock for driving a [crate::Sampler].

use crate::sampler::SamplerHost;
use crate::SegmentId;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A recording transition the sampler asks the simulator to deliver later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingEvent {
    Start(SegmentId),
    Stop(SegmentId),
}

/// A queue of events ordered by time.
/// Events at equal times are delivered in the order they were pushed.
#[derive(Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    /// The next sequence number.
    seq: usize,
}

struct Scheduled {
    time: f64,
    seq: usize,
    event: RecordingEvent,
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed, so the heap pops the earliest event first
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl EventQueue {
    pub fn new() -> Self {
        Default::default()
    }

    /// Schedules an event.
    pub fn push(&mut self, time: f64, event: RecordingEvent) {
        self.heap.push(Scheduled {
            time,
            seq: self.seq,
            event,
        });
        self.seq += 1;
    }

    /// Removes and returns the earliest event.
    pub fn pop(&mut self) -> Option<(f64, RecordingEvent)> {
        self.heap.pop().map(|s| (s.time, s.event))
    }

    /// The time of the earliest event.
    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|s| s.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// A simulation clock with an event queue, usable as a [SamplerHost].
#[derive(Default)]
pub struct EventClock {
    /// The current time in s.
    time: f64,
    /// The pending events.
    queue: EventQueue,
}

impl EventClock {
    /// Creates a clock at time zero.
    pub fn new() -> Self {
        Default::default()
    }

    /// The current time in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advances the clock. Time never moves backwards.
    pub fn advance_to(&mut self, time: f64) {
        self.time = f64::max(self.time, time);
    }

    /// Pops the next event due no later than `until`, advancing the clock to its time.
    pub fn next_event(&mut self, until: f64) -> Option<RecordingEvent> {
        if self.queue.peek_time()? > until {
            return None;
        }
        let (time, event) = self.queue.pop()?;
        self.advance_to(time);
        Some(event)
    }

    /// The pending events.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }
}

impl SamplerHost for EventClock {
    fn now(&self) -> f64 {
        self.time
    }

    fn schedule(&mut self, time: f64, event: RecordingEvent) {
        self.queue.push(time, event);
    }
}
