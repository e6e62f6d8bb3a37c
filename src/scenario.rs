//! Scenario files: where exploration starts and how the world is sampled.

use std::fmt;
use std::fs;
use std::path::Path;

use alchemy_grid::{Coord, Extent};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub steps: usize,
    pub elements: Vec<String>,
    pub noise: NoiseConfig,
    pub seeds: Vec<SeedRegion>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub seed: i32,
    pub frequency: f32,
    /// Noise offset along the time axis per step; 0 keeps the world static.
    pub drift: f32,
    /// Noise below this yields no element at a cell.
    pub void_below: f32,
}

/// Initially explored cells: a single cell at `min`, or the box `min..=max`.
#[derive(Clone, Debug, Deserialize)]
pub struct SeedRegion {
    pub min: [i32; 3],
    #[serde(default)]
    pub max: Option<[i32; 3]>,
}

impl SeedRegion {
    pub fn extent(&self) -> Extent {
        let min = Coord::from(self.min);
        Extent::new(min, self.max.map_or(min, Coord::from))
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            steps: 8,
            elements: ["salt", "sulphur", "mercury", "aether"]
                .into_iter()
                .map(String::from)
                .collect(),
            noise: NoiseConfig::default(),
            seeds: vec![SeedRegion {
                min: [0, 0, 0],
                max: None,
            }],
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 1337,
            frequency: 0.08,
            drift: 0.5,
            void_below: -0.6,
        }
    }
}

#[derive(Debug)]
pub enum ScenarioError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioError::Io(e) => write!(f, "scenario read error: {}", e),
            ScenarioError::Parse(e) => write!(f, "scenario parse error: {}", e),
            ScenarioError::Invalid(msg) => write!(f, "invalid scenario: {}", msg),
        }
    }
}

impl std::error::Error for ScenarioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScenarioError::Io(e) => Some(e),
            ScenarioError::Parse(e) => Some(e),
            ScenarioError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e)
    }
}

impl From<toml::de::Error> for ScenarioError {
    fn from(e: toml::de::Error) -> Self {
        ScenarioError::Parse(e)
    }
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(s)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.elements.is_empty() {
            return Err(ScenarioError::Invalid("no elements listed".into()));
        }
        if self.elements.len() > usize::from(u16::MAX) {
            return Err(ScenarioError::Invalid(format!(
                "{} elements listed, at most {} supported",
                self.elements.len(),
                u16::MAX
            )));
        }
        if self.seeds.is_empty() {
            return Err(ScenarioError::Invalid("no seed regions".into()));
        }
        if !(self.noise.frequency.is_finite() && self.noise.frequency > 0.0) {
            return Err(ScenarioError::Invalid(format!(
                "noise frequency must be positive, got {}",
                self.noise.frequency
            )));
        }
        if let Some(big) = self.seeds.iter().find(|s| s.extent().volume() > 1 << 24) {
            return Err(ScenarioError::Invalid(format!(
                "seed region {} is too large",
                big.extent()
            )));
        }
        Ok(())
    }
}
