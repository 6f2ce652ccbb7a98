use super::engine::CycleCheck;
use crate::error::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH: &str = "solver_config.json";

static CONFIG: Lazy<SolverConfig> = Lazy::new(SolverConfig::load_or_default);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub version: String,
    pub search: SearchConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub timebound_secs: f64,
    pub initial_weight: f64,
    /// 再探索ごとに重みへ掛ける係数
    pub weight_decay: f64,
    pub weight_floor: f64,
    pub cycle_check: CycleCheck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub size_mb: usize,
    pub zobrist_seed: u64,
}

impl SolverConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: SolverConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| Self::default())
    }

    /// プロセス全体で共有する設定 (初回アクセス時に読み込む)
    pub fn get() -> &'static SolverConfig {
        &CONFIG
    }
}

impl SearchConfig {
    pub fn timebound(&self) -> Duration {
        Duration::from_secs_f64(self.timebound_secs.max(0.0))
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            version: "1.0".to_string(),
            search: SearchConfig {
                timebound_secs: 5.0,
                initial_weight: 10.0,
                weight_decay: 0.6,
                weight_floor: 1.0,
                cycle_check: CycleCheck::Full,
            },
            cache: CacheConfig {
                enabled: true,
                size_mb: 16,
                zobrist_seed: 0x5eed_50b0,
            },
        }
    }
}
