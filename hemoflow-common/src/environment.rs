use serde::{Deserialize, Serialize};

/// Air-quality and pollutant constants for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    pub name: String,
    /// Air-quality index (0-400).
    pub aqi: f64,
    /// Human-readable air-quality category ("Good", "Hazardous", ...).
    #[serde(default)]
    pub status: String,
    /// Average ambient O2 figure for the location (informational).
    #[serde(default)]
    pub avg_o2: f64,
    /// Average ambient CO2 figure for the location (informational).
    #[serde(default)]
    pub avg_co2: f64,
    /// Particulate load (ug/m^3).
    #[serde(default)]
    pub dust: f64,
    /// Chemical pollutant load (ug/m^3).
    #[serde(default)]
    pub chemicals: f64,
}

impl EnvironmentProfile {
    /// Zero-valued profile used when an identifier is not in the table.
    pub fn unknown(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aqi: 0.0,
            status: String::new(),
            avg_o2: 0.0,
            avg_co2: 0.0,
            dust: 0.0,
            chemicals: 0.0,
        }
    }

    pub fn alert(&self) -> AirAlert {
        AirAlert::from_aqi(self.aqi)
    }
}

/// Coarse alert level derived from an AQI reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirAlert {
    Nominal,
    Critical,
    Severe,
}

impl AirAlert {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi > 200.0 {
            AirAlert::Severe
        } else if aqi > 150.0 {
            AirAlert::Critical
        } else {
            AirAlert::Nominal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AirAlert::Nominal => "NOMINAL",
            AirAlert::Critical => "CRITICAL",
            AirAlert::Severe => "SEVERE",
        }
    }
}

// name, aqi, status, avg_o2, avg_co2, dust, chemicals
const BUILTIN_PROFILES: [(&str, f64, &str, f64, f64, f64, f64); 10] = [
    ("Dhaka", 285.0, "Very Unhealthy", 245.0, 210.0, 180.0, 95.0),
    ("Delhi", 342.0, "Hazardous", 238.0, 205.0, 210.0, 115.0),
    ("Shanghai", 158.0, "Unhealthy", 252.0, 215.0, 85.0, 60.0),
    ("London", 42.0, "Good", 265.0, 225.0, 12.0, 18.0),
    ("New York", 35.0, "Good", 268.0, 228.0, 9.0, 14.0),
    ("Tokyo", 38.0, "Good", 270.0, 230.0, 11.0, 16.0),
    ("Mexico City", 165.0, "Unhealthy", 248.0, 212.0, 75.0, 65.0),
    ("Lagos", 182.0, "Unhealthy", 242.0, 208.0, 140.0, 55.0),
    ("Cairo", 195.0, "Unhealthy", 240.0, 206.0, 160.0, 58.0),
    ("Paris", 52.0, "Moderate", 262.0, 222.0, 18.0, 22.0),
];

/// Lookup table from environment identifier to its profile.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentTable {
    profiles: Vec<EnvironmentProfile>,
}

impl EnvironmentTable {
    /// The ten reference cities shipped with the engine.
    pub fn builtin() -> Self {
        let profiles = BUILTIN_PROFILES
            .iter()
            .map(|&(name, aqi, status, avg_o2, avg_co2, dust, chemicals)| EnvironmentProfile {
                name: name.to_string(),
                aqi,
                status: status.to_string(),
                avg_o2,
                avg_co2,
                dust,
                chemicals,
            })
            .collect();
        Self { profiles }
    }

    pub fn lookup(&self, name: &str) -> Option<&EnvironmentProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Like `lookup`, but an unknown identifier yields a zero-valued profile.
    pub fn resolve(&self, name: &str) -> EnvironmentProfile {
        match self.lookup(name) {
            Some(profile) => profile.clone(),
            None => {
                log::debug!("Environment '{}' not in table, using zero-valued profile.", name);
                EnvironmentProfile::unknown(name)
            }
        }
    }

    /// Adds a profile, replacing any existing entry with the same name.
    pub fn insert(&mut self, profile: EnvironmentProfile) {
        match self.profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.profiles.push(profile),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for EnvironmentTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_has_reference_cities() {
        let table = EnvironmentTable::builtin();
        assert_eq!(table.len(), 10);
        let london = table.lookup("London").unwrap();
        assert_eq!(london.aqi, 42.0);
        assert_eq!(london.dust, 12.0);
        assert_eq!(london.chemicals, 18.0);
        assert_eq!(table.lookup("Delhi").unwrap().status, "Hazardous");
    }

    #[test]
    fn unknown_environment_resolves_to_zeros() {
        let table = EnvironmentTable::builtin();
        let profile = table.resolve("Atlantis");
        assert_eq!(profile.name, "Atlantis");
        assert_eq!(profile.aqi, 0.0);
        assert_eq!(profile.dust, 0.0);
        assert_eq!(profile.chemicals, 0.0);
    }

    #[test]
    fn insert_replaces_by_name() {
        let mut table = EnvironmentTable::builtin();
        let mut custom = EnvironmentProfile::unknown("London");
        custom.dust = 99.0;
        table.insert(custom);
        assert_eq!(table.len(), 10);
        assert_eq!(table.lookup("London").unwrap().dust, 99.0);

        table.insert(EnvironmentProfile::unknown("Reykjavik"));
        assert_eq!(table.len(), 11);
    }

    #[test]
    fn alert_thresholds() {
        assert_eq!(AirAlert::from_aqi(150.0), AirAlert::Nominal);
        assert_eq!(AirAlert::from_aqi(151.0), AirAlert::Critical);
        assert_eq!(AirAlert::from_aqi(200.0), AirAlert::Critical);
        assert_eq!(AirAlert::from_aqi(342.0), AirAlert::Severe);
        assert_eq!(AirAlert::Severe.label(), "SEVERE");
    }
}
