use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;
use std::rc::Rc;
use traffic_kpi::indicator::{
    MeanDensity, MeanIntensity, MeanSpeed, MeanTravelTime, TotalDelay, TotalDelayReference,
    TotalNumberOfStops, TotalTravelDistance, TotalTravelTime,
};
use traffic_kpi::meta::GtuTypeData;
use traffic_kpi::{
    Column, EventClock, GtuSnapshot, Indicator, KpiError, MetaDataKind, Query, RecordingEvent,
    Sampler, SamplerAttributes, SamplerHost, SegmentAttributes, SegmentId, SpeedColumn,
};
use traffic_kpi::{Interval, ReferenceSpeedColumn, Result};

/// A single lane with a speed restriction on its second half.
struct Lane {
    clock: EventClock,
    vehicles: Vec<GtuSnapshot>,
}

impl SamplerHost for Lane {
    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn schedule(&mut self, time: f64, event: RecordingEvent) {
        self.clock.schedule(time, event);
    }

    fn gtus_on_segment(&self, segment: SegmentId) -> Vec<GtuSnapshot> {
        self.vehicles
            .iter()
            .filter(|veh| veh.segment == segment)
            .cloned()
            .collect()
    }
}

const LENGTH: f64 = 2000.0;
const RESTRICTED_SPEED: f64 = 20.0;
const DT: f64 = 0.5;
const WARMUP: f64 = 60.0;
const END: f64 = 600.0;

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let distr = rand_distr::Normal::new(25.0_f64, 3.0).expect("Invalid standard deviation");

    let lane = Lane {
        clock: EventClock::new(),
        vehicles: vec![],
    };
    let mut sampler = Sampler::new(
        lane,
        &SamplerAttributes {
            sampling_interval: Some(1.0),
        },
        [
            Column::from(SpeedColumn::speed()),
            Column::from(ReferenceSpeedColumn),
        ],
        [MetaDataKind::GtuType],
    );
    let segment = sampler.add_segment(&SegmentAttributes {
        name: "main".into(),
        length: LENGTH,
    });
    sampler.schedule_start_recording(WARMUP, segment);
    sampler.schedule_stop_recording(END, segment);

    println!("Simulating...");
    let mut next_id = 0;
    let mut t = 0.0;
    while t <= END + 60.0 {
        while let Some(event) = sampler.host_mut().clock.next_event(t) {
            sampler.handle_event(event)?;
        }
        sampler.host_mut().clock.advance_to(t);

        if next_id as f64 * 4.0 <= t {
            let reference_speed = distr.sample(&mut rng).clamp(18.0, 33.0);
            let gtu_type = if rng.gen_bool(0.15) { "Truck" } else { "Car" };
            sampler.host_mut().vehicles.push(GtuSnapshot {
                id: next_id.to_string(),
                gtu_type: gtu_type.into(),
                origin: None,
                destination: None,
                route: None,
                reference_speed: Some(reference_speed),
                speed: reference_speed,
                acceleration: 0.0,
                segment,
                position: 0.0,
            });
            next_id += 1;
        }

        let mut vehicles = std::mem::take(&mut sampler.host_mut().vehicles);
        vehicles.retain_mut(|veh| {
            veh.speed = if veh.position < 0.5 * LENGTH {
                veh.reference_speed.unwrap_or(RESTRICTED_SPEED)
            } else {
                f64::min(veh.speed, RESTRICTED_SPEED)
            };
            veh.position += veh.speed * DT;
            if veh.position > LENGTH {
                if let Err(err) = sampler.gtu_left(segment, &veh.id) {
                    log::error!("Could not close trajectory of vehicle {}: {}", veh.id, err);
                }
                return false;
            }
            sampler.gtu_moved(veh);
            true
        });
        sampler.host_mut().vehicles = vehicles;

        t += DT;
    }
    sampler.finish()?;

    let distance = Rc::new(TotalTravelDistance::new());
    let time = Rc::new(TotalTravelTime::new());
    let speed = Rc::new(MeanSpeed::new(distance.clone(), time.clone()));
    let travel_time = MeanTravelTime::new(speed.clone());
    let delay = TotalDelay::new(25.0);
    let delay_reference = TotalDelayReference::new();
    let density = MeanDensity::new(time.clone());
    let intensity = MeanIntensity::new(distance.clone());
    let stops = TotalNumberOfStops::new(SpeedColumn::speed());

    let queries = [
        Query::builder("all", "All vehicles").segment(segment).build(),
        Query::builder("trucks", "Trucks only")
            .segment(segment)
            .constrain(GtuTypeData, ["Truck"])
            .build(),
    ];
    for query in &queries {
        let selection = query.select(&sampler, Interval::new(WARMUP, END));
        println!("{} ({} vehicles):", query.description(), selection.gtus().len());
        report(&*distance, &sampler, query)?;
        report(&*time, &sampler, query)?;
        report(&*speed, &sampler, query)?;
        report(&travel_time, &sampler, query)?;
        report(&delay, &sampler, query)?;
        report(&delay_reference, &sampler, query)?;
        report(&density, &sampler, query)?;
        report(&intensity, &sampler, query)?;
        report(&stops, &sampler, query)?;
    }

    Ok(())
}

/// Prints an indicator's value over the recorded period.
fn report<I: Indicator, H: SamplerHost>(
    indicator: &I,
    sampler: &Sampler<H>,
    query: &Query,
) -> Result<()> {
    match indicator.compute(sampler, query, WARMUP, END) {
        Ok(value) => println!("{:>5} {:.3}", indicator.id(), value),
        Err(KpiError::UnsupportedOperation(msg)) => println!("{:>5} n/a ({})", indicator.id(), msg),
        Err(err) => return Err(err),
    }
    Ok(())
}
