//! Tests of the recording life cycle driven by a discrete-event clock.

mod common;

use common::{gtu, run_until, TestHost};
use traffic_kpi::{Column, SamplerAttributes, Sampler, SegmentAttributes, SpeedColumn};

fn lane(sampler: &mut Sampler<TestHost>, name: &str) -> traffic_kpi::SegmentId {
    sampler.add_segment(&SegmentAttributes {
        name: name.into(),
        length: 1000.0,
    })
}

/// Test that scheduled start and stop events reach the hooks once, at their times.
#[test]
fn scheduled_recording_hooks() {
    let mut sampler = Sampler::new(
        TestHost::default(),
        &SamplerAttributes::default(),
        Vec::<Column>::new(),
        vec![],
    );
    let lane_a = lane(&mut sampler, "A");

    sampler.schedule_start_recording(0.0, lane_a);
    sampler.schedule_stop_recording(5.0, lane_a);
    run_until(&mut sampler, 10.0);

    assert_eq!(
        sampler.host().calls,
        vec![(0.0, "init", lane_a), (5.0, "finalize", lane_a)]
    );
    assert!(!sampler.is_recording(lane_a));
}

/// Test that equal-time events are handled in the order they were scheduled.
#[test]
fn equal_time_events_are_fifo() {
    let mut sampler = Sampler::new(
        TestHost::default(),
        &SamplerAttributes::default(),
        Vec::<Column>::new(),
        vec![],
    );
    let lane_a = lane(&mut sampler, "A");
    let lane_b = lane(&mut sampler, "B");

    sampler.schedule_start_recording(2.0, lane_b);
    sampler.schedule_start_recording(2.0, lane_a);
    sampler.schedule_stop_recording(3.0, lane_a);
    sampler.schedule_stop_recording(3.0, lane_b);
    run_until(&mut sampler, 3.0);

    assert_eq!(
        sampler.host().calls,
        vec![
            (2.0, "init", lane_b),
            (2.0, "init", lane_a),
            (3.0, "finalize", lane_a),
            (3.0, "finalize", lane_b),
        ]
    );
}

/// Test that GTUs already on a segment are picked up, and that a repeated start
/// neither duplicates trajectories nor re-runs the init hook.
#[test]
fn repeated_start_is_idempotent() {
    let mut sampler = Sampler::new(
        TestHost::default(),
        &SamplerAttributes::default(),
        [Column::from(SpeedColumn::speed())],
        vec![],
    );
    let lane_a = lane(&mut sampler, "A");
    sampler.host_mut().gtus = vec![gtu("1", "Car", lane_a, 10.0), gtu("2", "Car", lane_a, 50.0)];

    sampler.start_recording(lane_a).unwrap();
    sampler.host_mut().clock.advance_to(1.0);
    sampler.start_recording(lane_a).unwrap();

    let group = sampler.trajectory_group(lane_a).unwrap();
    assert_eq!(group.len(), 2);
    assert_eq!(group.open_trajectory("1").map(|t| t.len()), Some(1));
    assert_eq!(sampler.host().calls.len(), 1);
}

/// Test that trajectories still open at the end of the simulation are closed.
#[test]
fn finish_flushes_open_trajectories() {
    let mut sampler = Sampler::new(
        TestHost::default(),
        &SamplerAttributes::default(),
        [Column::from(SpeedColumn::speed())],
        vec![],
    );
    let lane_a = lane(&mut sampler, "A");
    let lane_b = lane(&mut sampler, "B");
    sampler.schedule_start_recording(0.0, lane_a);
    sampler.schedule_start_recording(0.0, lane_b);
    run_until(&mut sampler, 0.0);

    common::drive(&mut sampler, &gtu("1", "Car", lane_a, 0.0), 0.0, 10.0, 0.0, 4.0);
    common::drive(&mut sampler, &gtu("2", "Car", lane_b, 0.0), 0.0, 10.0, 0.0, 4.0);
    sampler.finish().unwrap();

    for segment in [lane_a, lane_b] {
        let group = sampler.trajectory_group(segment).unwrap();
        assert_eq!(group.open().count(), 0);
        let trajectory = group.closed().next().unwrap();
        assert_eq!(trajectory.len(), 5);
        assert!(trajectory.output("v").is_some());
    }
    assert_eq!(
        sampler
            .host()
            .calls
            .iter()
            .filter(|(_, hook, _)| *hook == "finalize")
            .count(),
        2
    );
}

/// Test that a segment can be recorded again after it was stopped, and that
/// only the first start runs the init hook.
#[test]
fn restart_after_stop() {
    let mut sampler = Sampler::new(
        TestHost::default(),
        &SamplerAttributes::default(),
        [Column::from(SpeedColumn::speed())],
        vec![],
    );
    let lane_a = lane(&mut sampler, "A");
    sampler.schedule_start_recording(0.0, lane_a);
    sampler.schedule_stop_recording(2.0, lane_a);
    sampler.schedule_start_recording(5.0, lane_a);
    sampler.schedule_stop_recording(8.0, lane_a);

    let car = gtu("1", "Car", lane_a, 0.0);
    run_until(&mut sampler, 0.0);
    common::drive(&mut sampler, &car, 0.0, 10.0, 0.0, 1.0);
    run_until(&mut sampler, 5.0);
    common::drive(&mut sampler, &car, 50.0, 10.0, 5.0, 7.0);
    run_until(&mut sampler, 8.0);

    let group = sampler.trajectory_group(lane_a).unwrap();
    assert_eq!(group.start_time(), 0.0);
    let lengths = group.closed().map(|t| t.len()).collect::<Vec<_>>();
    assert_eq!(lengths, [2, 3]);
    let hooks = sampler.host().calls.iter().map(|c| c.1).collect::<Vec<_>>();
    assert_eq!(hooks, ["init", "finalize", "finalize"]);
}
