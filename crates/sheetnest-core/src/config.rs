use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{NestError, Result};

/// Nesting strategy portfolios.
/// Key notes:
///   - `fast` runs only the rectilinear grid packers
///   - `nfp` adds the NFP bottom-left-fill placer
///   - `nfp-ga` additionally runs the genetic search on top of the BLF
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Grid/rotation sweep plus the mixed-rotation lattice packer.
    Fast,
    /// Grid packers plus deterministic NFP bottom-left fill.
    Nfp,
    /// Everything above plus the genetic search over order and rotation.
    NfpGa,
}

impl FromStr for Strategy {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "nfp" => Ok(Self::Nfp),
            "nfp-ga" | "nfpga" | "ga" => Ok(Self::NfpGa),
            _ => Err(()),
        }
    }
}

/// Which ring of a multi-ring design acts as the collision shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MainPolygonRule {
    /// Principled default.
    LargestArea,
    /// Legacy selection, kept for regression parity.
    MostVertices,
}

impl FromStr for MainPolygonRule {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "largest_area" | "area" => Ok(Self::LargestArea),
            "most_vertices" | "vertices" => Ok(Self::MostVertices),
            _ => Err(()),
        }
    }
}

/// Genetic-search parameters. The RNG seed is injectable so runs are
/// reproducible end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaConfig {
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_generations")]
    pub generations: usize,
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Rotations (degrees) the search may assign to a gene.
    #[serde(default = "default_rotation_angles")]
    pub rotation_angles: Vec<f64>,
    /// None seeds from entropy; identical seeds give identical layouts.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            elite_count: default_elite_count(),
            tournament_size: default_tournament_size(),
            rotation_angles: default_rotation_angles(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestConfig {
    /// Minimum gap between placements and to the sheet edge, millimetres.
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Rotation step in degrees for the BLF sweep; must divide 360.
    #[serde(default = "default_rotation_step")]
    pub rotation_step: u32,
    /// Base BLF candidate-grid step; defaults to `margin` when unset.
    #[serde(default)]
    pub grid_step: Option<f64>,
    #[serde(default = "default_strategy")]
    pub algorithm: Strategy,
    #[serde(default = "default_main_polygon_rule")]
    pub main_polygon: MainPolygonRule,
    #[serde(default)]
    pub ga: GaConfig,
    /// Evaluate sheets in parallel (requires the `parallel` feature).
    #[serde(default)]
    pub parallel: bool,
}

impl Default for NestConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            rotation_step: default_rotation_step(),
            grid_step: None,
            algorithm: default_strategy(),
            main_polygon: default_main_polygon_rule(),
            ga: GaConfig::default(),
            parallel: false,
        }
    }
}

impl NestConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(NestError::InvalidConfig(format!(
                "margin must be >= 0 (got {})",
                self.margin
            )));
        }
        if self.rotation_step == 0 || 360 % self.rotation_step != 0 {
            return Err(NestError::InvalidConfig(format!(
                "rotation_step must divide 360 (got {})",
                self.rotation_step
            )));
        }
        if let Some(step) = self.grid_step {
            if !step.is_finite() || step <= 0.0 {
                return Err(NestError::InvalidConfig(format!(
                    "grid_step must be > 0 when set (got {step})"
                )));
            }
        }
        let ga = &self.ga;
        if ga.population_size < 2 {
            return Err(NestError::InvalidConfig(format!(
                "population_size must be >= 2 (got {})",
                ga.population_size
            )));
        }
        if ga.elite_count >= ga.population_size {
            return Err(NestError::InvalidConfig(format!(
                "elite_count ({}) must be smaller than population_size ({})",
                ga.elite_count, ga.population_size
            )));
        }
        if ga.tournament_size == 0 {
            return Err(NestError::InvalidConfig(
                "tournament_size must be >= 1".into(),
            ));
        }
        for (name, rate) in [
            ("mutation_rate", ga.mutation_rate),
            ("crossover_rate", ga.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(NestError::InvalidConfig(format!(
                    "{name} must be in [0, 1] (got {rate})"
                )));
            }
        }
        if ga.rotation_angles.is_empty() {
            return Err(NestError::InvalidConfig(
                "rotation_angles must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// The BLF rotation sweep set built from `rotation_step`.
    pub fn allowed_rotations(&self) -> Vec<f64> {
        (0..360)
            .step_by(self.rotation_step as usize)
            .map(|d| d as f64)
            .collect()
    }

    /// Create a fluent builder for `NestConfig`.
    pub fn builder() -> NestConfigBuilder {
        NestConfigBuilder::new()
    }
}

fn default_margin() -> f64 {
    3.0
}
fn default_rotation_step() -> u32 {
    90
}
fn default_strategy() -> Strategy {
    Strategy::Nfp
}
fn default_main_polygon_rule() -> MainPolygonRule {
    MainPolygonRule::LargestArea
}
fn default_population_size() -> usize {
    30
}
fn default_generations() -> usize {
    50
}
fn default_mutation_rate() -> f64 {
    0.10
}
fn default_crossover_rate() -> f64 {
    0.80
}
fn default_elite_count() -> usize {
    2
}
fn default_tournament_size() -> usize {
    3
}
fn default_rotation_angles() -> Vec<f64> {
    vec![0.0, 90.0, 180.0, 270.0]
}

/// Builder for `NestConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct NestConfigBuilder {
    cfg: NestConfig,
}

impl NestConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: NestConfig::default(),
        }
    }
    pub fn margin(mut self, v: f64) -> Self {
        self.cfg.margin = v;
        self
    }
    pub fn rotation_step(mut self, v: u32) -> Self {
        self.cfg.rotation_step = v;
        self
    }
    pub fn grid_step(mut self, v: Option<f64>) -> Self {
        self.cfg.grid_step = v;
        self
    }
    pub fn algorithm(mut self, v: Strategy) -> Self {
        self.cfg.algorithm = v;
        self
    }
    pub fn main_polygon(mut self, v: MainPolygonRule) -> Self {
        self.cfg.main_polygon = v;
        self
    }
    pub fn ga(mut self, v: GaConfig) -> Self {
        self.cfg.ga = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> NestConfig {
        self.cfg
    }
}
