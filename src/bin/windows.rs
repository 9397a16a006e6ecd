use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use conic_planner::common::angle::rad_to_deg;
use conic_planner::common::time::Calendar;
use conic_planner::config::{load_calendar, load_system};
use conic_planner::impulsive::hohmann;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Print the next Hohmann transfer window from one body to each of its siblings.
#[derive(Parser, Debug)]
#[command(author, version, about = "Transfer window finder (coplanar Hohmann phasing)")]
struct Cli {
    /// Origin body name (case-insensitive)
    #[arg(long)]
    from: String,

    /// Body catalog: a YAML list, one TOML file or a directory of TOML files
    #[arg(long, default_value = "configs/bodies")]
    bodies: PathBuf,

    /// Calendar year, starting at 1
    #[arg(long, default_value_t = 1)]
    year: u32,

    /// Day of the year, starting at 1
    #[arg(long, default_value_t = 1)]
    day: u32,

    /// Built-in calendar
    #[arg(long, value_enum, default_value_t = CalendarKind::Kerbin)]
    calendar: CalendarKind,

    /// Calendar file overriding `--calendar`
    #[arg(long)]
    calendar_file: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum CalendarKind {
    Earth,
    Kerbin,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let calendar = match &cli.calendar_file {
        Some(path) => load_calendar(path)
            .with_context(|| format!("loading calendar {}", path.display()))?
            .calendar()?,
        None => match cli.calendar {
            CalendarKind::Earth => Calendar::EARTH,
            CalendarKind::Kerbin => Calendar::KERBIN,
        },
    };
    let now = calendar
        .date_to_seconds(cli.year, cli.day, 0.0)
        .ok_or_else(|| anyhow!("year {} day {} is not a valid date", cli.year, cli.day))?;

    let system = load_system(&cli.bodies)
        .with_context(|| format!("loading body catalog {}", cli.bodies.display()))?;
    let origin = system.get(&cli.from)?;
    let Some(origin_orbit) = origin.orbit.as_ref() else {
        return Err(anyhow!("{} does not orbit anything", origin.name));
    };
    let siblings = system.siblings(&origin.name)?;
    if siblings.is_empty() {
        println!("{} has no siblings", origin.name);
        return Ok(());
    }

    println!(
        "=== Transfer windows from {} (Year {}, Day {}) ===",
        origin.name, cli.year, cli.day
    );
    for target in siblings {
        let Some(target_orbit) = target.orbit.as_ref() else {
            continue;
        };
        let estimate = hohmann(
            origin_orbit.parent(),
            origin_orbit.semi_major_axis_m(),
            target_orbit.semi_major_axis_m(),
        )?;
        let phase = origin_orbit
            .phase_angle(target_orbit)
            .map(|p| format!("{:>7.2}°", rad_to_deg(p)))
            .unwrap_or_else(|| "      -".to_string());
        let window = match origin_orbit.next_transfer_window_s(target_orbit, now) {
            Some(wait) => format!(
                "in {} -> {}",
                calendar.split(wait),
                format_date(&calendar, now + wait)
            ),
            None => "no window".to_string(),
        };
        println!(
            "{:<10} phase {phase}  Δv {:>8.1} m/s  flight {}  {window}",
            target.name,
            estimate.dv_total_m_s,
            calendar.split(estimate.tof_seconds),
        );
    }
    Ok(())
}

fn format_date(calendar: &Calendar, seconds: f64) -> String {
    let elapsed = calendar.split(seconds);
    let total = elapsed.seconds_of_day.floor() as u64;
    format!(
        "Year {}, Day {} {:02}:{:02}:{:02}",
        elapsed.years + 1,
        elapsed.days + 1,
        total / 3_600,
        (total / 60) % 60,
        total % 60
    )
}
