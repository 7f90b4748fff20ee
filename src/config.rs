use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::ParseLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramConfig {
    #[serde(default = "ProgramConfig::default_path")]
    pub path: PathBuf,
    #[serde(default = "ProgramConfig::default_build_command")]
    pub build_command: Vec<String>,
}

impl ProgramConfig {
    fn default_path() -> PathBuf {
        PathBuf::from("./test")
    }
    fn default_build_command() -> Vec<String> {
        vec!["make".to_string(), "-B".to_string()]
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            build_command: Self::default_build_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub level: ParseLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhiSweepConfig {
    #[serde(default = "default_n_items")]
    pub n_items: u64,
    #[serde(default = "PhiSweepConfig::default_start")]
    pub start: f64,
    #[serde(default = "PhiSweepConfig::default_step")]
    pub step: f64,
    #[serde(default = "PhiSweepConfig::default_count")]
    pub count: usize,
    #[serde(default = "PhiSweepConfig::default_variants")]
    pub variants: Vec<String>,
    /// Worker threads for phi sweeps; 1 runs grid points one at a time.
    #[serde(default = "PhiSweepConfig::default_jobs")]
    pub jobs: usize,
}

impl PhiSweepConfig {
    fn default_start() -> f64 {
        0.001
    }
    fn default_step() -> f64 {
        0.001
    }
    fn default_count() -> usize {
        10
    }
    fn default_variants() -> Vec<String> {
        vec!["mg".to_string(), "cms".to_string(), "cs".to_string()]
    }
    fn default_jobs() -> usize {
        1
    }
}

impl Default for PhiSweepConfig {
    fn default() -> Self {
        Self {
            n_items: default_n_items(),
            start: Self::default_start(),
            step: Self::default_step(),
            count: Self::default_count(),
            variants: Self::default_variants(),
            jobs: Self::default_jobs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRun {
    pub sketch: String,
    pub budgets: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemorySweepConfig {
    #[serde(default = "default_n_items")]
    pub n_items: u64,
    #[serde(default = "MemorySweepConfig::default_phi")]
    pub phi: f64,
    /// Skip the measurement when the rebuild fails instead of timing a stale
    /// binary.
    #[serde(default = "MemorySweepConfig::default_skip_on_build_failure")]
    pub skip_on_build_failure: bool,
    #[serde(default = "MemorySweepConfig::default_runs")]
    pub runs: Vec<MemoryRun>,
}

impl MemorySweepConfig {
    fn default_phi() -> f64 {
        0.001
    }
    fn default_skip_on_build_failure() -> bool {
        true
    }
    fn default_runs() -> Vec<MemoryRun> {
        let buckets = vec![512, 1024, 2048, 4096, 8192];
        vec![
            MemoryRun {
                sketch: "cms".to_string(),
                budgets: buckets.clone(),
            },
            MemoryRun {
                sketch: "cs".to_string(),
                budgets: buckets,
            },
            MemoryRun {
                sketch: "mg".to_string(),
                budgets: vec![50, 100, 200, 400],
            },
        ]
    }
}

impl Default for MemorySweepConfig {
    fn default() -> Self {
        Self {
            n_items: default_n_items(),
            phi: Self::default_phi(),
            skip_on_build_failure: Self::default_skip_on_build_failure(),
            runs: Self::default_runs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "OutputConfig::default_dir")]
    pub dir: PathBuf,
    #[serde(default = "OutputConfig::default_width")]
    pub width: u32,
    #[serde(default = "OutputConfig::default_height")]
    pub height: u32,
}

impl OutputConfig {
    fn default_dir() -> PathBuf {
        PathBuf::from(".")
    }
    fn default_width() -> u32 {
        1000
    }
    fn default_height() -> u32 {
        600
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: Self::default_dir(),
            width: Self::default_width(),
            height: Self::default_height(),
        }
    }
}

fn default_n_items() -> u64 {
    100_000_000
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub program: ProgramConfig,
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub phi_sweep: PhiSweepConfig,
    #[serde(default)]
    pub memory_sweep: MemorySweepConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl HarnessConfig {
    /// Reads a TOML config. Unlike missing metrics or failed runs, a bad
    /// config file is fatal for the whole harness.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let phi = &self.phi_sweep;
        if !(phi.start > 0.0 && phi.start.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "phi_sweep.start must be positive, got {}",
                phi.start
            )));
        }
        if !(phi.step > 0.0 && phi.step.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "phi_sweep.step must be positive, got {}",
                phi.step
            )));
        }
        if phi.jobs == 0 {
            return Err(ConfigError::Invalid("phi_sweep.jobs must be at least 1".into()));
        }
        if !(self.memory_sweep.phi > 0.0 && self.memory_sweep.phi.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "memory_sweep.phi must be positive, got {}",
                self.memory_sweep.phi
            )));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(ConfigError::Invalid("output size must be non-zero".into()));
        }
        Ok(())
    }
}
