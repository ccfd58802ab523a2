use std::{fmt, time::Duration};

use rand::Rng;
use serde::{Serialize, Serializer};

use crate::{config::SimConfig, error::SimError};

/// Identificador opaco, único enquanto o processo existir.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProcessId(pub u64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{:04}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessStatus {
    Waiting,
    Ready,
    Running,
}

/// Os atributos sorteados de novo toda vez que o processo volta para a fila
/// de prontos.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessAttributes {
    pub burst: Duration,
    pub priority: u32,
    pub memory: u64,
}

impl ProcessAttributes {
    /// Versão validada para quem tem os valores em segundos.
    pub fn from_secs(burst_secs: f64, priority: u32, memory: u64) -> Result<Self, SimError> {
        let burst = SimError::check_secs("burst", burst_secs)?;

        Ok(ProcessAttributes {
            burst,
            priority,
            memory,
        })
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> Self {
        ProcessAttributes {
            burst: random_burst(rng, config),
            priority: random_priority(rng, config),
            memory: rng.random_range(config.memory_range.clone()),
        }
    }
}

/// Burst em `[0, max_burst)`, múltiplo do tick.
pub fn random_burst<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> Duration {
    config.tick * rng.random_range(0..config.ticks_in(config.max_burst))
}

/// Espera de I/O em `[0, max_wait)`, múltiplo do tick.
pub fn random_wait<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> Duration {
    config.tick * rng.random_range(0..config.ticks_in(config.max_wait))
}

pub fn random_priority<R: Rng + ?Sized>(rng: &mut R, config: &SimConfig) -> u32 {
    rng.random_range(0..config.max_priority)
}

/// Uma unidade de trabalho simulada.
///
/// `name` é o dono do processo (o programa aberto no desktop) e também é a
/// chave usada pela paginação, então não pode repetir entre processos vivos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    pub status: ProcessStatus,
    #[serde(serialize_with = "as_secs")]
    pub burst: Duration,
    #[serde(serialize_with = "as_secs")]
    pub wait: Duration,
    #[serde(serialize_with = "as_secs")]
    pub arrival: Duration,
    /// Menor valor = maior prioridade.
    pub priority: u32,
    pub memory: u64,
}

impl Process {
    pub fn new(
        id: ProcessId,
        name: impl Into<String>,
        attributes: ProcessAttributes,
        arrival: Duration,
    ) -> Self {
        Process {
            id,
            name: name.into(),
            status: ProcessStatus::Ready,
            burst: attributes.burst,
            wait: Duration::ZERO,
            arrival,
            priority: attributes.priority,
            memory: attributes.memory,
        }
    }

    /// `ceil(memory / page_unit)`
    pub fn required_pages(&self, page_unit: u64) -> usize {
        self.memory.div_ceil(page_unit) as usize
    }

    pub fn is_running(&self) -> bool {
        self.status == ProcessStatus::Running
    }

    /// Executando e ainda com burst sobrando: é o que a paginação considera
    /// "ativo".
    pub fn is_active(&self) -> bool {
        self.is_running() && !self.burst.is_zero()
    }

    /// Volta para a fila de prontos com atributos novos.
    pub(crate) fn refresh(&mut self, attributes: ProcessAttributes, arrival: Duration) {
        self.status = ProcessStatus::Ready;
        self.wait = Duration::ZERO;
        self.burst = attributes.burst;
        self.priority = attributes.priority;
        self.arrival = arrival;
    }

    pub fn burst_secs(&self) -> f64 {
        self.burst.as_secs_f64()
    }

    pub fn wait_secs(&self) -> f64 {
        self.wait.as_secs_f64()
    }
}

fn as_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}
