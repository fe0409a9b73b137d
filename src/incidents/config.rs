use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use super::components::IncidentKind;

const CONFIG_PATH: &str = "config/incidents.toml";

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawIncidentConfig {
    blocked: Vec<String>,
    incident_interval_ticks: u64,
    incident_chance: f32,
    breakdown_interval_ticks: u64,
    breakdown_chance: f32,
    repair_on_spawn: bool,
}

impl Default for RawIncidentConfig {
    fn default() -> Self {
        Self {
            blocked: vec![
                IncidentKind::ShortCircuit.to_string(),
                IncidentKind::SolarFlare.to_string(),
            ],
            incident_interval_ticks: 3600,
            incident_chance: 0.5,
            breakdown_interval_ticks: 2500,
            breakdown_chance: 0.1,
            repair_on_spawn: true,
        }
    }
}

/// Storyteller pacing and the incidents it may never fire.
#[derive(Resource, Debug, Clone)]
pub struct IncidentConfig {
    pub blocked: Vec<IncidentKind>,
    pub incident_interval_ticks: u64,
    pub incident_chance: f32,
    pub breakdown_interval_ticks: u64,
    pub breakdown_chance: f32,
    pub repair_on_spawn: bool,
}

impl IncidentConfig {
    pub fn load_or_default() -> Self {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match Self::parse(&raw) {
                Ok(parsed) => parsed,
                Err(err) => {
                    warn!(
                        "Failed to parse {} ({}). Falling back to defaults.",
                        path.display(),
                        err
                    );
                    RawIncidentConfig::default().into()
                }
            },
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    path.display(),
                    err
                );
                RawIncidentConfig::default().into()
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<RawIncidentConfig>(raw).map(Into::into)
    }
}

impl Default for IncidentConfig {
    fn default() -> Self {
        RawIncidentConfig::default().into()
    }
}

impl From<RawIncidentConfig> for IncidentConfig {
    fn from(value: RawIncidentConfig) -> Self {
        let mut blocked = Vec::new();
        for name in &value.blocked {
            match name.parse::<IncidentKind>() {
                Ok(kind) if !blocked.contains(&kind) => blocked.push(kind),
                Ok(_) => {}
                Err(err) => warn!("Ignoring blocked incident: {}", err),
            }
        }

        Self {
            blocked,
            incident_interval_ticks: value.incident_interval_ticks.max(1),
            incident_chance: value.incident_chance.clamp(0.0, 1.0),
            breakdown_interval_ticks: value.breakdown_interval_ticks.max(1),
            breakdown_chance: value.breakdown_chance.clamp(0.0, 1.0),
            repair_on_spawn: value.repair_on_spawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_block_short_circuit_and_solar_flare() {
        let config = IncidentConfig::default();
        assert_eq!(
            config.blocked,
            vec![IncidentKind::ShortCircuit, IncidentKind::SolarFlare]
        );
        assert!(config.repair_on_spawn);
    }

    #[test]
    fn unknown_and_duplicate_names_are_dropped() {
        let config = IncidentConfig::parse(
            r#"
            blocked = ["eclipse", "meteorite", "Eclipse", "heat_wave"]
            breakdown_chance = 4.0
            incident_interval_ticks = 0
            "#,
        )
        .expect("valid toml");
        assert_eq!(
            config.blocked,
            vec![IncidentKind::Eclipse, IncidentKind::HeatWave]
        );
        assert_eq!(config.breakdown_chance, 1.0);
        assert_eq!(config.incident_interval_ticks, 1);
        assert_eq!(config.breakdown_interval_ticks, 2500);
    }

    #[test]
    fn empty_list_blocks_nothing() {
        let config = IncidentConfig::parse("blocked = []").expect("valid toml");
        assert!(config.blocked.is_empty());
    }

    #[test]
    fn missing_file_falls_back() {
        let config = IncidentConfig::load_from(Path::new("does/not/exist.toml"));
        assert_eq!(config.blocked.len(), 2);
    }
}
