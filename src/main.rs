use std::error::Error;

use chrono::{NaiveDateTime, TimeDelta};
use clap::Parser;
use tempo::entities::{Room, Visitors};
use tempo::{RunReport, SimulatorBuilder};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Room/visitors demo for the tempo simulation kernel.
#[derive(Parser, Debug)]
#[command(name = "tempo")]
#[command(about = "Discrete-event simulation of visitors queueing for a room", long_about = None)]
struct Args {
    /// How many visitors fit in the room at once
    #[arg(long, default_value_t = 2)]
    capacity: u32,

    /// How many visitors arrive at t=1
    #[arg(long, default_value_t = 5)]
    visitors: u32,

    /// Stop after this many simulated seconds instead of running dry
    #[arg(long)]
    seconds: Option<i64>,

    /// Calendar timestamp of moment zero
    #[arg(long, default_value = "2020-01-01T00:00:00")]
    start: NaiveDateTime,

    /// Include the dispatch trace in the JSON report
    #[arg(long)]
    trace: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("═══════════════════════════════════════════════════════");
    println!("  Tempo: Discrete-Event Simulation Kernel");
    println!(
        "  {} visitors, room capacity {}",
        args.visitors, args.capacity
    );
    println!("═══════════════════════════════════════════════════════");
    println!();

    let mut builder = SimulatorBuilder::new()
        .start(args.start)
        .entity("Room", Room::new(args.capacity))
        .entity("Visitors", Visitors::new(args.visitors, "Room"));
    if let Some(seconds) = args.seconds {
        let end = TimeDelta::try_seconds(seconds)
            .and_then(|d| args.start.checked_add_signed(d))
            .ok_or("--seconds is out of range")?;
        builder = builder.until(end, 1);
    }
    if args.trace {
        builder = builder.record_trace();
    }

    let mut sim = builder.build()?;
    sim.try_prepare()?;

    let mut milestones = Vec::new();
    let cancelled = {
        let mut run = sim.run();
        for milestone in run.by_ref() {
            println!("  {}", milestone);
            milestones.push(milestone);
        }
        run.was_cancelled()
    };
    let report = RunReport::new(milestones, cancelled);

    if let Some(room) = sim.entity::<Room>("Room") {
        println!();
        println!("  Admitted: {}  Peak occupancy: {}", room.admitted, room.peak);
    }
    println!();

    let json = if args.trace {
        report.to_json_with_trace(sim.trace())?
    } else {
        report.to_json()?
    };
    println!("{}", json);
    Ok(())
}
