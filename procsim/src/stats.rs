use serde::Serialize;

use crate::page_replacer::Policy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    pub hits: usize,
    pub faults: usize,
    /// Porcentagem de hits, com duas casas decimais.
    pub rate: f64,
}

impl SimulationStats {
    /// Sequência vazia dá taxa 0, nunca NaN.
    pub fn from_counts(hits: usize, faults: usize) -> Self {
        let total = hits + faults;

        let rate = if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
        };

        SimulationStats { hits, faults, rate }
    }

    pub fn total(&self) -> usize {
        self.hits + self.faults
    }
}

/// Resultado de uma rodada completa de `simulate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub policy: Policy,
    pub stats: SimulationStats,
    /// Um slot por frame: nome do dono ou vazio.
    pub frames: Vec<String>,
    /// Donos que ficaram só no disco, sem repetição.
    pub backing: Vec<String>,
}

impl SimulationReport {
    pub fn empty(policy: Policy, frame_count: usize) -> Self {
        SimulationReport {
            policy,
            stats: SimulationStats::default(),
            frames: vec![String::new(); frame_count],
            backing: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_rounded_to_two_places() {
        let stats = SimulationStats::from_counts(1, 2);
        assert_eq!(stats.rate, 33.33);
        assert_eq!(stats.total(), 3);

        assert_eq!(SimulationStats::from_counts(2, 1).rate, 66.67);
        assert_eq!(SimulationStats::from_counts(5, 0).rate, 100.0);
    }

    #[test]
    fn test_zero_references_give_zero_rate() {
        let stats = SimulationStats::from_counts(0, 0);
        assert_eq!(stats.rate, 0.0);
        assert!(!stats.rate.is_nan());
    }

    #[test]
    fn test_empty_report_has_blank_frames() {
        let report = SimulationReport::empty(Policy::Lru, 3);
        assert_eq!(report.frames, vec!["", "", ""]);
        assert_eq!(report.stats, SimulationStats::default());
    }
}
