//! Run a [`MissionScript`] against a planetary system.

use std::sync::Arc;

use conic_config::{MissionScript, StepAction, StepConfig};
use conic_core::angle::deg_to_rad;
use conic_core::units::km_to_m;
use conic_impulsive::{Maneuver, ManeuverError};
use conic_orbits::{ManeuverPoint, Orbit, PlanetarySystem};
use tracing::info;

use crate::{Mission, MissionError};

/// Build the vessel and starting orbit, then apply every step in order.
pub fn run_script(script: &MissionScript, system: &PlanetarySystem) -> Result<Mission, MissionError> {
    let vessel = script.vessel.to_vessel()?;
    let orbit = script.start.orbit(system)?;
    info!(mission = %script.name, start = %orbit, "starting mission");

    let mut mission = Mission::new(&script.name, vessel, orbit);
    for (offset, step) in script.steps.iter().enumerate() {
        let index = offset + 1;
        let description = step
            .description
            .clone()
            .unwrap_or_else(|| describe(&step.action));
        apply_step(&mut mission, system, index, step, &description).map_err(|source| {
            MissionError::Step {
                index,
                description: description.clone(),
                source: Box::new(source),
            }
        })?;
        info!(
            step = index,
            %description,
            total_delta_v_m_s = mission.total_delta_v_m_s(),
            propellant_kg = mission.vessel().propellant_mass_kg,
            "mission step"
        );
    }
    Ok(mission)
}

fn apply_step(
    mission: &mut Mission,
    system: &PlanetarySystem,
    index: usize,
    step: &StepConfig,
    description: &str,
) -> Result<(), MissionError> {
    let orbit = mission.orbit().clone();
    let maneuver = match &step.action {
        StepAction::ChangeApoapsis { altitude_km } => {
            let target = orbit.parent().radius_from_altitude(km_to_m(*altitude_km));
            Maneuver::change_apoapsis(&orbit, target)?
        }
        StepAction::ChangePeriapsis { altitude_km } => {
            let target = orbit.parent().radius_from_altitude(km_to_m(*altitude_km));
            Maneuver::change_periapsis(&orbit, target)?
        }
        StepAction::Circularize { at } => match at {
            ManeuverPoint::Periapsis => {
                Maneuver::change_apoapsis(&orbit, orbit.periapsis_radius_m())?
            }
            ManeuverPoint::Apoapsis => {
                let apoapsis = orbit.radius_at(ManeuverPoint::Apoapsis)?;
                Maneuver::change_periapsis(&orbit, apoapsis)?
            }
            ManeuverPoint::Unspecified => {
                return Err(invalid(index, "circularize needs `at = \"periapsis\"` or `\"apoapsis\"`"));
            }
        },
        StepAction::ChangeInclination {
            inclination_deg,
            point,
        } => Maneuver::change_inclination(&orbit, deg_to_rad(*inclination_deg), *point)?,
        StepAction::MatchInclination { body, point } => {
            let target = orbit_of(system, body)?;
            Maneuver::change_inclination(&orbit, target.inclination_rad(), *point)?
        }
        StepAction::Escape {
            to,
            to_point,
            target_altitude_km,
            point,
            source_point,
        } => {
            let target = match (to, target_altitude_km) {
                (Some(name), _) => orbit_of(system, name)?.radius_at(*to_point)?,
                (None, Some(altitude_km)) => {
                    let Some(grandparent) = orbit.parent().parent() else {
                        return Err(invalid(
                            index,
                            format!("{} does not orbit anything", orbit.parent().name),
                        ));
                    };
                    grandparent.radius_from_altitude(km_to_m(*altitude_km))
                }
                (None, None) => {
                    return Err(invalid(index, "escape needs `to` or `target_altitude_km`"));
                }
            };
            Maneuver::escape(&orbit, target, *point, *source_point)?
        }
        StepAction::Capture {
            body,
            periapsis_altitude_km,
            apoapsis_altitude_km,
            inclination_deg,
            from,
            from_point,
            target_point,
        } => {
            let body = system.get(body)?;
            let pe = km_to_m(*periapsis_altitude_km);
            let ap = km_to_m(apoapsis_altitude_km.unwrap_or(*periapsis_altitude_km));
            let parking = Orbit::elliptic_from_altitudes(Arc::clone(body), pe.min(ap), pe.max(ap))?
                .with_inclination(deg_to_rad(*inclination_deg));
            let arrival_m = orbit_of(system, &body.name)?.radius_at(*target_point)?;
            let source = source_radius(system, &orbit, from.as_deref(), *from_point, arrival_m, index)?;
            Maneuver::capture(source, &parking, *target_point)?
        }
        StepAction::GravityAssist {
            body,
            altitude_km,
            to,
            to_point,
            from,
            from_point,
            point,
        } => {
            let assist = system.get(body)?;
            let target = orbit_of(system, to)?.radius_at(*to_point)?;
            let flyby_m = orbit_of(system, &assist.name)?.radius_at(*point)?;
            let source = source_radius(system, &orbit, from.as_deref(), *from_point, flyby_m, index)?;
            Maneuver::gravity_assist(source, assist, km_to_m(*altitude_km), target, *point)?
        }
        StepAction::PayloadDrop { mass_kg } => {
            mission.add_payload_drop(*mass_kg, description)?;
            return Ok(());
        }
    };
    mission.add_maneuver(maneuver, description);
    Ok(())
}

fn orbit_of<'a>(system: &'a PlanetarySystem, name: &str) -> Result<&'a Orbit, MissionError> {
    let body = system.get(name)?;
    body.orbit
        .as_ref()
        .ok_or_else(|| ManeuverError::BodyWithoutOrbit(body.name.clone()).into())
}

/// Radius the arrival leg starts from: the orbit of `from` when named,
/// otherwise the apsis of the current transfer orbit farthest from `arrival_m`.
fn source_radius(
    system: &PlanetarySystem,
    current: &Orbit,
    from: Option<&str>,
    from_point: ManeuverPoint,
    arrival_m: f64,
    index: usize,
) -> Result<f64, MissionError> {
    if let Some(name) = from {
        return Ok(orbit_of(system, name)?.radius_at(from_point)?);
    }
    if !current.is_elliptic() {
        return Err(invalid(
            index,
            "arrival needs `from` when the vessel is not on an elliptic transfer orbit",
        ));
    }
    let pe = current.periapsis_radius_m();
    let ap = current.apoapsis_radius_m();
    Ok(if (pe - arrival_m).abs() > (ap - arrival_m).abs() {
        pe
    } else {
        ap
    })
}

fn invalid(index: usize, reason: impl Into<String>) -> MissionError {
    MissionError::InvalidStep {
        index,
        reason: reason.into(),
    }
}

fn describe(action: &StepAction) -> String {
    match action {
        StepAction::ChangeApoapsis { altitude_km } => {
            format!("Change apoapsis to {altitude_km} km")
        }
        StepAction::ChangePeriapsis { altitude_km } => {
            format!("Change periapsis to {altitude_km} km")
        }
        StepAction::Circularize { at } => format!("Circularize at {at}"),
        StepAction::ChangeInclination {
            inclination_deg, ..
        } => format!("Change inclination to {inclination_deg}°"),
        StepAction::MatchInclination { body, .. } => format!("Match inclination of {body}"),
        StepAction::Escape {
            to: Some(to), ..
        } => format!("Escape to {to}"),
        StepAction::Escape { .. } => "Escape".to_string(),
        StepAction::Capture { body, .. } => format!("Capture at {body}"),
        StepAction::GravityAssist { body, to, .. } => format!("{body} assist to {to}"),
        StepAction::PayloadDrop { mass_kg } => format!("Drop {mass_kg} kg"),
    }
}
