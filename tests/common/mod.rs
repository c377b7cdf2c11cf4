//! A simulator stand-in shared by the integration tests.

#![allow(dead_code)]

use traffic_kpi::{
    EventClock, GtuSnapshot, MonitoredSegment, RecordingEvent, Sampler, SamplerHost, SegmentId,
};

/// A host that records hook calls and knows which GTUs are where.
#[derive(Default)]
pub struct TestHost {
    pub clock: EventClock,
    pub gtus: Vec<GtuSnapshot>,
    pub calls: Vec<(f64, &'static str, SegmentId)>,
}

impl SamplerHost for TestHost {
    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn schedule(&mut self, time: f64, event: RecordingEvent) {
        self.clock.schedule(time, event);
    }

    fn gtus_on_segment(&self, segment: SegmentId) -> Vec<GtuSnapshot> {
        self.gtus
            .iter()
            .filter(|gtu| gtu.segment == segment)
            .cloned()
            .collect()
    }

    fn init_recording(&mut self, segment: &MonitoredSegment) {
        self.calls.push((self.clock.now(), "init", segment.id()));
    }

    fn finalize_recording(&mut self, segment: &MonitoredSegment) {
        self.calls.push((self.clock.now(), "finalize", segment.id()));
    }
}

/// Delivers every event due up to `until`, then advances the clock to `until`.
pub fn run_until(sampler: &mut Sampler<TestHost>, until: f64) {
    while let Some(event) = sampler.host_mut().clock.next_event(until) {
        sampler.handle_event(event).unwrap();
    }
    sampler.host_mut().clock.advance_to(until);
}

/// A GTU of the given type.
pub fn gtu(id: &str, gtu_type: &str, segment: SegmentId, position: f64) -> GtuSnapshot {
    GtuSnapshot {
        id: id.into(),
        gtu_type: gtu_type.into(),
        origin: Some("A".into()),
        destination: Some("B".into()),
        route: None,
        reference_speed: None,
        speed: 0.0,
        acceleration: 0.0,
        segment,
        position,
    }
}

/// Drives a GTU at constant `speed` from `x0`, sampling once a second over `[t0, t1]`.
pub fn drive(
    sampler: &mut Sampler<TestHost>,
    template: &GtuSnapshot,
    x0: f64,
    speed: f64,
    t0: f64,
    t1: f64,
) {
    let mut t = t0;
    while t <= t1 {
        sampler.host_mut().clock.advance_to(t);
        let gtu = GtuSnapshot {
            position: x0 + speed * (t - t0),
            speed,
            ..template.clone()
        };
        sampler.gtu_moved(&gtu);
        t += 1.0;
    }
}
