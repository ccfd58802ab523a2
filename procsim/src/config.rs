use std::{env, ops::RangeInclusive, time::Duration};

use log::debug;

use crate::error::SimError;

/// Número de frames da memória residente.
pub const FRAME_COUNT: usize = 20;

/// Quantas unidades de memória cabem numa página.
pub const PAGE_UNIT: u64 = 50_000;

/// Tempo simulado que anda a cada tick (100ms de relógio de parede).
pub const TICK: Duration = Duration::from_millis(100);

/// Fatia de tempo padrão do Round Robin.
pub const DEFAULT_QUANTUM: Duration = Duration::from_secs(2);

/// Todas as constantes ajustáveis da simulação.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tick: Duration,
    pub quantum: Duration,
    pub frame_count: usize,
    pub page_unit: u64,
    /// Limite exclusivo dos bursts sorteados.
    pub max_burst: Duration,
    /// Limite exclusivo das esperas de I/O sorteadas.
    pub max_wait: Duration,
    /// Limite exclusivo das prioridades sorteadas.
    pub max_priority: u32,
    pub memory_range: RangeInclusive<u64>,
    /// Semente da fonte pseudo-aleatória. `None` usa entropia do sistema.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tick: TICK,
            quantum: DEFAULT_QUANTUM,
            frame_count: FRAME_COUNT,
            page_unit: PAGE_UNIT,
            max_burst: Duration::from_secs(5),
            max_wait: Duration::from_secs(8),
            max_priority: 10,
            memory_range: 50_001..=500_000,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Os padrões, sobrescritos por `PROCSIM_SEED`, `PROCSIM_QUANTUM_MS` e
    /// `PROCSIM_FRAMES` quando presentes.
    pub fn from_env() -> Result<Self, SimError> {
        let mut config = SimConfig::default();

        if let Some(seed) = read_var("PROCSIM_SEED")? {
            config.seed = Some(seed);
        }

        if let Some(quantum_ms) = read_var("PROCSIM_QUANTUM_MS")? {
            config.quantum = Duration::from_millis(quantum_ms);
        }

        if let Some(frames) = read_var("PROCSIM_FRAMES")? {
            config.frame_count = frames as usize;
        }

        debug!("config: carregada do ambiente {:?}", config);

        config.validate()?;

        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_quantum(mut self, quantum: Duration) -> Self {
        self.quantum = quantum;
        self
    }

    pub fn with_frame_count(mut self, frame_count: usize) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick.is_zero() {
            return Err(SimError::InvalidConfig("o tick precisa ser positivo".into()));
        }

        if self.quantum < self.tick {
            return Err(SimError::InvalidConfig(format!(
                "quantum {:?} é menor que um tick {:?}",
                self.quantum, self.tick
            )));
        }

        if self.frame_count == 0 {
            return Err(SimError::InvalidConfig("o número de frames precisa ser positivo".into()));
        }

        if self.page_unit == 0 {
            return Err(SimError::InvalidConfig("a unidade de página precisa ser positiva".into()));
        }

        if self.max_burst < self.tick || self.max_wait < self.tick {
            return Err(SimError::InvalidConfig(
                "os intervalos de burst e de espera precisam cobrir pelo menos um tick".into(),
            ));
        }

        if self.max_priority == 0 || self.memory_range.is_empty() {
            return Err(SimError::InvalidConfig(
                "os intervalos de prioridade e de memória não podem ser vazios".into(),
            ));
        }

        Ok(())
    }

    /// Quantos ticks inteiros cabem em `limit`.
    pub(crate) fn ticks_in(&self, limit: Duration) -> u32 {
        (limit.as_nanos() / self.tick.as_nanos()) as u32
    }
}

fn read_var(name: &str) -> Result<Option<u64>, SimError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SimError::InvalidConfig(format!("{} não é um número: {:?}", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.frame_count, 20);
        assert_eq!(config.page_unit, 50_000);
        assert_eq!(config.tick, Duration::from_millis(100));
        assert_eq!(config.quantum, Duration::from_secs(2));
    }

    #[test]
    fn test_quantum_shorter_than_tick_is_rejected() {
        let config = SimConfig::default().with_quantum(Duration::from_millis(50));
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_frames_is_rejected() {
        let config = SimConfig::default().with_frame_count(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ticks_in() {
        let config = SimConfig::default();
        assert_eq!(config.ticks_in(Duration::from_secs(5)), 50);
        assert_eq!(config.ticks_in(Duration::from_secs(8)), 80);
        assert_eq!(config.ticks_in(Duration::from_millis(250)), 2);
    }
}
