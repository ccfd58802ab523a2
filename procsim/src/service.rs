//! O serviço que junta escalonador e paginação.
//!
//! Todo o estado mutável (filas, frames, disco, histórico, gerador
//! aleatório) mora em um único [`SimulationService`]. Quem está de fora só
//! manda eventos (`on_program_opened`, `on_program_closed`, troca de
//! disciplina ou de política, `tick`) e lê cópias com [`SimulationService::snapshot`].
//!
//! Ordem dentro de um tick: o escalonador termina a rodada dele, os eventos
//! vão para a paginação, e só então a paginação recalcula olhando as filas já
//! assentadas.

use std::time::Duration;

use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::{
    config::SimConfig,
    error::SimError,
    page_replacer::Policy,
    paging::PagingEngine,
    process::{Process, ProcessAttributes, ProcessId},
    scheduler::{Discipline, Scheduler, SchedulerEvent, SchedulerSnapshot},
    stats::{SimulationReport, SimulationStats},
};

/// Tudo que a camada de exibição precisa, de uma vez.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    pub scheduler: SchedulerSnapshot,
    pub frames: Vec<String>,
    pub backing: Vec<String>,
    pub stats: SimulationStats,
    pub selected_policy: Option<Policy>,
    pub report: SimulationReport,
}

pub struct SimulationService<R: Rng = StdRng> {
    config: SimConfig,
    scheduler: Scheduler,
    paging: PagingEngine,
    rng: R,
    next_id: u64,
}

impl SimulationService<StdRng> {
    /// Usa `config.seed` se houver; senão, entropia do sistema.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        SimulationService::with_rng(config, rng)
    }
}

impl<R: Rng> SimulationService<R> {
    pub fn with_rng(config: SimConfig, rng: R) -> Result<Self, SimError> {
        config.validate()?;

        Ok(SimulationService {
            scheduler: Scheduler::new(&config),
            paging: PagingEngine::new(&config),
            config,
            rng,
            next_id: 1,
        })
    }

    /// Um programa abriu: cria o processo com atributos sorteados e chegada
    /// no relógio atual.
    pub fn on_program_opened(&mut self, name: &str) -> Result<ProcessId, SimError> {
        let attributes = ProcessAttributes::random(&mut self.rng, &self.config);
        self.spawn(name, attributes)
    }

    /// Igual a [`Self::on_program_opened`], mas com atributos escolhidos por
    /// quem chama.
    pub fn spawn(&mut self, name: &str, attributes: ProcessAttributes) -> Result<ProcessId, SimError> {
        if name.trim().is_empty() {
            return Err(SimError::EmptyOwnerName);
        }

        if self.scheduler.contains_owner(name) {
            return Err(SimError::OwnerAlreadyLive(name.to_string()));
        }

        let id = ProcessId(self.next_id);
        self.next_id += 1;

        info!("service: {} aberto como {}", name, id);

        let process = Process::new(id, name, attributes, self.scheduler.clock());
        self.scheduler.enqueue(process);

        self.population_changed();

        Ok(id)
    }

    /// Um programa fechou. Fechar o que não está aberto não faz nada.
    pub fn on_program_closed(&mut self, name: &str) -> usize {
        let removed = self.scheduler.dequeue_by_owner(name);

        if removed == 0 {
            warn!("service: {} não tinha processo vivo", name);
            return 0;
        }

        info!("service: {} fechado", name);

        self.population_changed();

        removed
    }

    pub fn on_discipline_selected(&mut self, discipline: Discipline) {
        self.scheduler.set_discipline(discipline);
        self.paging.recompute(self.scheduler.live());
    }

    pub fn on_paging_policy_selected(&mut self, policy: Policy) -> &SimulationReport {
        self.paging.select_policy(policy)
    }

    /// Um tick de 100ms de relógio de parede.
    pub fn tick(&mut self) -> Vec<SchedulerEvent> {
        let events = self.scheduler.tick(&mut self.rng);

        for event in &events {
            self.paging.observe(event);
        }

        self.paging.recompute(self.scheduler.live());

        events
    }

    /// Roda `ticks` ticks seguidos, devolvendo todos os eventos.
    pub fn run_for(&mut self, ticks: usize) -> Vec<SchedulerEvent> {
        (0..ticks).flat_map(|_| self.tick()).collect()
    }

    fn population_changed(&mut self) {
        self.paging
            .regenerate_reference(self.scheduler.live(), &mut self.rng);
        self.paging.recompute(self.scheduler.live());
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn paging(&self) -> &PagingEngine {
        &self.paging
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> Duration {
        self.scheduler.clock()
    }

    pub fn snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            scheduler: self.scheduler.snapshot(),
            frames: self.paging.frames().snapshot(),
            backing: self.paging.backing().snapshot(),
            stats: self.paging.stats(),
            selected_policy: self.paging.policy(),
            report: self.paging.report().clone(),
        }
    }
}
