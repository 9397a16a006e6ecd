use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use conic_planner::common::time::Calendar;
use conic_planner::config::{load_mission_script, load_system};
use conic_planner::export::{ledger, summary, writer_for_path};
use conic_planner::mission::{EntryAction, Mission, run_script};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Run a patched-conic mission script and print its ledger"
)]
struct Cli {
    /// Mission script (TOML, or YAML for any other extension)
    script: PathBuf,

    /// Body catalog: a YAML list, one TOML file or a directory of TOML files
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,

    /// Calendar used to print burn times when the script has none
    #[arg(long, value_enum, default_value_t = CalendarKind::Kerbin)]
    calendar: CalendarKind,

    /// Write the ledger as CSV (`-` for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON mission summary (`-` for stdout)
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum CalendarKind {
    Earth,
    Kerbin,
}

impl From<CalendarKind> for Calendar {
    fn from(kind: CalendarKind) -> Self {
        match kind {
            CalendarKind::Earth => Calendar::EARTH,
            CalendarKind::Kerbin => Calendar::KERBIN,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let system = load_system(&cli.bodies)
        .with_context(|| format!("loading body catalog {}", cli.bodies.display()))?;
    let script = load_mission_script(&cli.script)
        .with_context(|| format!("loading mission script {}", cli.script.display()))?;
    let calendar = match &script.calendar {
        Some(cal) => cal.calendar()?,
        None => cli.calendar.into(),
    };

    let mission = run_script(&script, &system)?;
    print_ledger(&mission, &calendar);

    if let Some(path) = &cli.csv {
        let writer = writer_for_path(path)?;
        ledger::write_csv(writer, &mission)
            .with_context(|| format!("writing CSV ledger to {}", path.display()))?;
        info!(path = %path.display(), "wrote CSV ledger");
    }
    if let Some(path) = &cli.json {
        let writer = writer_for_path(path)?;
        summary::write_json(writer, &mission)
            .with_context(|| format!("writing JSON summary to {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON summary");
    }

    Ok(())
}

fn print_ledger(mission: &Mission, calendar: &Calendar) {
    println!("=== Mission: {} ===", mission.description());
    println!("Vessel: {}", mission.entries()[0].initial_vessel);
    for (index, entry) in mission.entries().iter().enumerate() {
        let what = match &entry.action {
            EntryAction::Orbital { maneuver, .. } => {
                format!("{} at {}", maneuver.kind, maneuver.point)
            }
            EntryAction::PayloadDrop { mass_kg } => format!("drop {mass_kg:.1} kg"),
        };
        println!(
            "{index:>3}. {:<32} {:<32} Δv {:>9.1} m/s  burn {:>16}  propellant {:>9.1} kg",
            entry.description,
            what,
            entry.delta_v_m_s,
            format_burn(entry.duration_s, calendar),
            entry.next_vessel.propellant_mass_kg,
        );
        if let Some(impulse) = entry.maneuver().and_then(|m| m.impulse_angle_rad()) {
            println!("       impulse angle {:.2}°", impulse.to_degrees());
        }
    }

    let orbit = mission.orbit();
    println!("Final orbit: {orbit}");
    println!(
        "Total: Δv {:.1} m/s, burn {}, propellant {:.1} kg, final mass {:.1} t",
        mission.total_delta_v_m_s(),
        format_burn(mission.total_burn_time_s(), calendar),
        mission.total_propellant_kg(),
        mission.vessel().mass_kg() / 1_000.0,
    );
    println!(
        "Remaining Δv: {:.1} m/s",
        mission.vessel().available_delta_v_m_s()
    );
    if !mission.is_feasible() {
        println!("WARNING: the vessel runs out of propellant before the mission ends");
    }
}

fn format_burn(seconds: Option<f64>, calendar: &Calendar) -> String {
    match seconds {
        Some(s) => calendar.split(s).to_string(),
        None => "never completes".to_string(),
    }
}
