//! End-to-end runs of the room/visitors model.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::config::SimulatorBuilder;
use crate::entities::{Room, Visitors};
use crate::event::Arguments;
use crate::milestone::Milestone;
use crate::simulator::Simulator;
use crate::time::Moment;
use crate::trace::Outcome;

fn new_year() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn room_sim(capacity: u32, visitors: u32) -> Simulator {
    let mut sim = SimulatorBuilder::new()
        .start(new_year())
        .entity("Room", Room::new(capacity))
        .entity("Visitors", Visitors::new(visitors, "Room"))
        .record_trace()
        .build()
        .unwrap();
    assert!(sim.prepare());
    sim
}

// ── Scenario ──────────────────────────────────────────────────────────

#[test]
fn test_room_admits_everyone_exactly_once() {
    let mut sim = room_sim(2, 5);
    let milestones: Vec<Milestone> = sim.run().collect();

    let moments: Vec<u64> = milestones.iter().map(|m| m.moment.seconds()).collect();
    assert_eq!(moments, vec![1, 6, 11, 16]);

    let processed: Vec<u64> = milestones.iter().map(|m| m.processed).collect();
    assert_eq!(processed, vec![7, 8, 6, 2]);
    // Three visitors find the room full at t=1.
    let ignored: Vec<u64> = milestones.iter().map(|m| m.ignored).collect();
    assert_eq!(ignored, vec![3, 0, 0, 0]);

    let room = sim.entity::<Room>("Room").unwrap();
    assert_eq!(room.admitted, 5);
    assert_eq!(room.peak, 2);
    assert_eq!(room.occupancy(), 0);

    let visitors = sim.entity::<Visitors>("Visitors").unwrap();
    assert_eq!(visitors.entries, 5);
    assert_eq!(visitors.peak_present, 2);
    assert!(visitors.present.is_empty());
    assert!(visitors.waiting.is_empty());
}

#[test]
fn test_entries_are_processed_once_per_visitor() {
    let mut sim = room_sim(2, 5);
    let report = sim.run_to_end();
    assert_eq!(report.ignored, 3);

    let admissions = sim
        .trace()
        .iter()
        .filter(|e| e.name == "enter" && e.outcome == Outcome::Processed)
        .count();
    let refusals = sim
        .trace()
        .iter()
        .filter(|e| e.name == "enter" && e.outcome == Outcome::Rejected)
        .count();
    assert_eq!(admissions, 5);
    assert_eq!(refusals, 3);

    let entered: Vec<&str> = sim
        .trace()
        .iter()
        .filter(|e| e.name == "entered" && e.outcome == Outcome::Processed)
        .map(|e| e.target.as_str())
        .collect();
    assert_eq!(entered.len(), 5);
    assert!(entered.iter().all(|t| *t == "Visitors"));
}

#[test]
fn test_waiting_visitor_is_readmitted_in_same_instant() {
    let mut sim = room_sim(2, 3);
    sim.run_to_end();

    // visitor_3 waits at t=1 and gets in the moment someone leaves.
    let readmission: Vec<(u64, &str)> = sim
        .trace()
        .iter()
        .filter(|e| e.moment == Moment::new(6))
        .map(|e| (e.moment.seconds(), e.name.as_str()))
        .collect();
    assert_eq!(
        readmission,
        vec![(6, "leave"), (6, "leave"), (6, "left"), (6, "left"), (6, "enter"), (6, "entered")]
    );
}

#[test]
fn test_room_replies_to_issuer() {
    let mut sim = room_sim(1, 2);
    sim.run_to_end();

    let waits: Vec<_> = sim.trace().iter().filter(|e| e.name == "wait").collect();
    assert_eq!(waits.len(), 1);
    assert_eq!(waits[0].issuer.as_deref(), Some("Room"));
    assert_eq!(waits[0].target, "Visitors");
}

#[test]
fn test_large_room_never_queues() {
    let mut sim = room_sim(10, 4);
    let report = sim.run_to_end();

    assert_eq!(report.final_moment(), Some(Moment::new(6)));
    assert!(sim.trace().iter().all(|e| e.name != "wait"));
    assert_eq!(sim.entity::<Room>("Room").unwrap().peak, 4);
}

#[test]
fn test_custom_stay() {
    let mut sim = SimulatorBuilder::new()
        .entity("Room", Room::new(1).with_stay(2))
        .entity("Visitors", Visitors::new(3, "Room"))
        .build()
        .unwrap();
    assert!(sim.prepare());

    let moments: Vec<u64> = sim.run().map(|m| m.moment.seconds()).collect();
    assert_eq!(moments, vec![1, 3, 5, 7]);
}

// ── Bounded runs ─────────────────────────────────────────────────────

#[test]
fn test_bounded_run_reports_every_second() {
    let mut sim = SimulatorBuilder::new()
        .start(new_year())
        .until(new_year() + TimeDelta::seconds(8), 1)
        .entity("Room", Room::new(2))
        .entity("Visitors", Visitors::new(5, "Room"))
        .build()
        .unwrap();
    assert!(sim.prepare());

    let milestones: Vec<Milestone> = sim.run().collect();
    assert_eq!(milestones.len(), 8);
    assert_eq!(milestones[0].processed, 7);
    assert_eq!(milestones[0].ignored, 3);
    assert_eq!(milestones[5].moment, Moment::new(6));
    assert_eq!(milestones[5].processed, 8);
    assert_eq!(milestones[5].timestamp, new_year() + TimeDelta::seconds(6));
    assert!(milestones
        .iter()
        .filter(|m| ![1, 6].contains(&m.moment.seconds()))
        .all(|m| m.dispatched() == 0));

    // The third wave is still in the room when the horizon is reached.
    assert_eq!(sim.entity::<Room>("Room").unwrap().occupancy(), 2);
}

#[test]
fn test_scaled_timestamps() {
    let mut sim = SimulatorBuilder::new()
        .start(new_year())
        .until(new_year() + TimeDelta::minutes(3), 60)
        .entity("Room", Room::new(2))
        .build()
        .unwrap();
    assert!(sim.prepare());

    let stamps: Vec<String> = sim.run().map(|m| m.timestamp.to_string()).collect();
    assert_eq!(
        stamps,
        vec!["2020-01-01 00:01:00", "2020-01-01 00:02:00", "2020-01-01 00:03:00"]
    );
}

// ── Robustness ───────────────────────────────────────────────────────

#[test]
fn test_room_rejects_unknown_events() {
    let mut sim = room_sim(2, 0);
    sim.schedule(None, "dance", "Room", Arguments::single("visitor", "v"), 1);
    sim.schedule(None, "leave", "Room", Arguments::single("visitor", "ghost"), 1);
    sim.schedule(None, "enter", "Room", Arguments::empty(), 1);

    let report = sim.run_to_end();
    assert_eq!(report.processed, 0);
    assert_eq!(report.ignored, 3);
}

#[test]
fn test_repeated_entry_is_not_handled() {
    let mut sim = room_sim(3, 0);
    sim.schedule(None, "enter", "Room", Arguments::single("visitor", "v"), 1);
    sim.schedule(None, "enter", "Room", Arguments::single("visitor", "v"), 1);

    let report = sim.run_to_end();
    assert_eq!(report.milestones[0].processed, 1);
    assert_eq!(report.milestones[0].ignored, 1);
    assert_eq!(sim.entity::<Room>("Room").unwrap().admitted, 1);
}

#[test]
fn test_anonymous_entry_still_leaves() {
    let mut sim = room_sim(1, 0);
    sim.schedule(None, "enter", "Room", Arguments::single("visitor", "solo"), 2);

    let report = sim.run_to_end();
    assert_eq!(report.final_moment(), Some(Moment::new(7)));
    let room = sim.entity::<Room>("Room").unwrap();
    assert_eq!(room.admitted, 1);
    assert_eq!(room.occupancy(), 0);
}

#[test]
fn test_cancel_stops_the_model() {
    let mut sim = room_sim(2, 5);
    let mut seen = Vec::new();
    {
        let mut run = sim.run();
        while let Some(m) = run.next() {
            seen.push(m.moment.seconds());
            if m.moment == Moment::new(6) {
                run.cancel();
            }
        }
        assert!(run.was_cancelled());
    }
    assert_eq!(seen, vec![1, 6]);
    assert_eq!(sim.entity::<Room>("Room").unwrap().admitted, 4);
}

#[test]
fn test_deterministic_replay() {
    fn run_trace() -> Vec<(u64, String, String)> {
        let mut sim = room_sim(2, 7);
        sim.run_to_end();
        sim.trace()
            .iter()
            .map(|e| (e.moment.seconds(), e.name.clone(), e.target.clone()))
            .collect()
    }

    assert_eq!(run_trace(), run_trace(), "simulation is not deterministic");
}
