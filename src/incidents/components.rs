//! Incident kinds, machine components and the messages the storyteller emits.
use std::{fmt, str::FromStr};

use bevy::prelude::*;

/// Storyteller incidents this colony knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncidentKind {
    /// Random battery discharge ("Zzztt").
    ShortCircuit,
    /// Short circuit caused by rain on exposed conduits.
    ShortCircuitRain,
    SolarFlare,
    Eclipse,
    ColdSnap,
    HeatWave,
}

impl IncidentKind {
    pub const ALL: [IncidentKind; 6] = [
        IncidentKind::ShortCircuit,
        IncidentKind::ShortCircuitRain,
        IncidentKind::SolarFlare,
        IncidentKind::Eclipse,
        IncidentKind::ColdSnap,
        IncidentKind::HeatWave,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShortCircuit => "short_circuit",
            Self::ShortCircuitRain => "short_circuit_rain",
            Self::SolarFlare => "solar_flare",
            Self::Eclipse => "eclipse",
            Self::ColdSnap => "cold_snap",
            Self::HeatWave => "heat_wave",
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIncident(pub String);

impl fmt::Display for UnknownIncident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown incident '{}'", self.0)
    }
}

impl std::error::Error for UnknownIncident {}

impl FromStr for IncidentKind {
    type Err = UnknownIncident;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownIncident(value.to_string()))
    }
}

/// Materials a building can be constructed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Material {
    Wood,
    Steel,
    Plasteel,
    ComponentIndustrial,
    ComponentSpacer,
}

impl Material {
    pub fn is_component(self) -> bool {
        matches!(self, Self::ComponentIndustrial | Self::ComponentSpacer)
    }
}

/// A building placed in the colony.
#[derive(Component, Debug, Clone)]
pub struct Machine {
    pub label: String,
}

/// The machine draws from the power grid.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PowerTrader;

/// Materials and counts the machine was built from.
#[derive(Component, Debug, Clone, Default)]
pub struct BuildCost(pub Vec<(Material, u32)>);

impl BuildCost {
    pub fn uses_components(&self) -> bool {
        self.0
            .iter()
            .any(|(material, count)| *count > 0 && material.is_component())
    }
}

/// A machine that can break down and need repairs.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Breakdownable {
    broken_down: bool,
}

impl Breakdownable {
    pub fn broken() -> Self {
        Self { broken_down: true }
    }

    pub fn is_broken_down(&self) -> bool {
        self.broken_down
    }

    pub fn break_down(&mut self) {
        self.broken_down = true;
    }

    pub fn repair(&mut self) {
        self.broken_down = false;
    }
}

/// An incident the storyteller actually executed.
#[derive(Message, Debug, Clone)]
pub struct IncidentMessage {
    pub kind: IncidentKind,
}

/// A machine broke down.
#[derive(Message, Debug, Clone)]
pub struct BreakdownMessage {
    pub machine: Entity,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_names_parse_back() {
        for kind in IncidentKind::ALL {
            assert_eq!(kind.as_str().parse::<IncidentKind>(), Ok(kind));
        }
        assert_eq!(" Solar_Flare ".parse(), Ok(IncidentKind::SolarFlare));
        assert!("meteorite".parse::<IncidentKind>().is_err());
    }

    #[test]
    fn only_component_costs_count() {
        let steel = BuildCost(vec![(Material::Steel, 50)]);
        let spacer = BuildCost(vec![(Material::Steel, 50), (Material::ComponentSpacer, 1)]);
        let none = BuildCost(vec![(Material::ComponentIndustrial, 0)]);
        assert!(!steel.uses_components());
        assert!(spacer.uses_components());
        assert!(!none.uses_components());
    }
}
