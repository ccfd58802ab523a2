//! Motor de escalonamento.
//!
//! Mantém a fila de prontos e a fila de espera e, a cada tick, faz uma
//! única rodada de despacho com a disciplina ativa:
//!
//! | disciplina  | quem executa                                          |
//! |-------------|-------------------------------------------------------|
//! | FCFS        | sempre o índice 0 da fila de prontos                  |
//! | SJF         | menor `burst`, reavaliado a cada tick                 |
//! | PRIORITY    | menor `priority`, reavaliado a cada tick              |
//! | ROUND_ROBIN | rodízio, no máximo `quantum` segundos por vez         |
//!
//! Em empate no SJF e no PRIORITY ganha quem aparece primeiro na fila.
//!
//! O tick não captura nada de fora: todo o estado mora aqui dentro e cada
//! chamada lê a fila atual. Quem dirige o relógio (o timer de 100ms do
//! desktop, um teste) só chama [`Scheduler::tick`].

use std::{fmt, str::FromStr, time::Duration};

use log::{debug, info, trace};
use rand::Rng;
use serde::Serialize;

use crate::{
    config::SimConfig,
    error::SimError,
    process::{random_burst, random_priority, random_wait, Process, ProcessAttributes, ProcessId, ProcessStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Discipline {
    #[default]
    Fcfs,
    Sjf,
    Priority,
    RoundRobin,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Discipline::Fcfs => "FCFS",
            Discipline::Sjf => "SJF",
            Discipline::Priority => "PRIORITY",
            Discipline::RoundRobin => "ROUND_ROBIN",
        };

        f.write_str(token)
    }
}

impl FromStr for Discipline {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FCFS" => Ok(Discipline::Fcfs),
            "SJF" => Ok(Discipline::Sjf),
            "PRIORITY" => Ok(Discipline::Priority),
            "ROUND_ROBIN" | "ROUNDROBIN" | "RR" => Ok(Discipline::RoundRobin),
            _ => Err(SimError::UnknownDiscipline(s.to_string())),
        }
    }
}

/// O que aconteceu num tick. `Dispatched` é o evento que a paginação
/// consome para manter o histórico de recência.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SchedulerEvent {
    /// O processo executou durante este tick e ainda tem burst sobrando.
    Dispatched { id: ProcessId, name: String },
    /// Round Robin: o quantum acabou e a vez passou para o próximo.
    Preempted { id: ProcessId, name: String },
    /// O burst acabou; o processo foi para a fila de espera.
    BurstCompleted { id: ProcessId, name: String, wait: Duration },
    /// A espera acabou; o processo voltou para a fila de prontos.
    Requeued { id: ProcessId, name: String },
    /// A fila de prontos esvaziou e o despacho parou.
    Halted,
    /// Chegou processo novo e o despacho voltou.
    Resumed,
}

/// Cópia somente leitura para exibição.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulerSnapshot {
    pub clock_secs: f64,
    pub discipline: Discipline,
    pub quantum_secs: f64,
    pub ready: Vec<Process>,
    pub wait: Vec<Process>,
}

pub struct Scheduler {
    config: SimConfig,
    discipline: Discipline,
    ready: Vec<Process>,
    wait: Vec<Process>,
    clock: Duration,
    /// Índice atual do Round Robin.
    selected: usize,
    quantum_left: Duration,
    halted: bool,
}

impl Scheduler {
    pub fn new(config: &SimConfig) -> Self {
        Scheduler {
            config: config.clone(),
            discipline: Discipline::default(),
            ready: Vec::new(),
            wait: Vec::new(),
            clock: Duration::ZERO,
            selected: 0,
            quantum_left: config.quantum,
            halted: true,
        }
    }

    /// Coloca um processo novo no fim da fila de prontos. Não verifica ids
    /// repetidos; isso é responsabilidade de quem chama.
    pub fn enqueue(&mut self, mut process: Process) {
        debug!(
            "scheduler: chegou {} ({}) burst={:.1}s prio={} mem={}",
            process.id,
            process.name,
            process.burst_secs(),
            process.priority,
            process.memory
        );

        process.status = ProcessStatus::Ready;
        self.ready.push(process);
    }

    /// Remove de ambas as filas tudo que pertence a `name`. Devolve quantos
    /// processos saíram; remover dono inexistente não faz nada.
    pub fn dequeue_by_owner(&mut self, name: &str) -> usize {
        let before = self.ready.len() + self.wait.len();
        let selected_id = self.ready.get(self.selected).map(|p| p.id);

        self.ready.retain(|p| p.name != name);
        self.wait.retain(|p| p.name != name);

        let removed = before - (self.ready.len() + self.wait.len());

        if removed > 0 {
            debug!("scheduler: {} processo(s) de {} removidos", removed, name);

            // Se quem estava na vez continua vivo, segue com ele; senão a vez
            // fica com quem ocupou o lugar dele.
            match selected_id.and_then(|id| self.ready.iter().position(|p| p.id == id)) {
                Some(idx) => self.selected = idx,
                None => {
                    if self.selected >= self.ready.len() {
                        self.selected = 0;
                    }
                    self.quantum_left = self.config.quantum;
                }
            }
        }

        removed
    }

    /// Troca a disciplina. O despacho recomeça do índice 0 com o estado atual
    /// das filas; bursts em andamento são preservados.
    pub fn set_discipline(&mut self, discipline: Discipline) {
        info!("scheduler: disciplina {} -> {}", self.discipline, discipline);

        self.discipline = discipline;
        self.selected = 0;
        self.quantum_left = self.config.quantum;

        for process in &mut self.ready {
            process.status = ProcessStatus::Ready;
        }
    }

    /// Avança o relógio simulado em um tick.
    ///
    /// Primeiro anda a fila de espera (quem terminou o I/O volta para os
    /// prontos), depois roda uma rodada de despacho. Com a fila de prontos
    /// vazia o despacho fica parado, mas o relógio e a espera continuam.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<SchedulerEvent> {
        self.clock += self.config.tick;

        trace!(
            "scheduler: tick t={:.1}s ready={} wait={}",
            self.clock.as_secs_f64(),
            self.ready.len(),
            self.wait.len()
        );

        let mut events = Vec::new();

        self.advance_wait_queue(rng, &mut events);

        if self.halt_if_idle(&mut events) {
            return events;
        }

        if self.halted {
            info!("scheduler: despacho retomado com {} processo(s)", self.ready.len());
            self.halted = false;
            events.push(SchedulerEvent::Resumed);
        }

        match self.discipline {
            Discipline::Fcfs => self.run(0, rng, &mut events),
            Discipline::Sjf => {
                let idx = self.shortest_job();
                self.run(idx, rng, &mut events)
            }
            Discipline::Priority => {
                let idx = self.highest_priority();
                self.run(idx, rng, &mut events)
            }
            Discipline::RoundRobin => self.run_round_robin(rng, &mut events),
        }

        self.halt_if_idle(&mut events);

        events
    }

    fn halt_if_idle(&mut self, events: &mut Vec<SchedulerEvent>) -> bool {
        if !self.ready.is_empty() {
            return false;
        }

        if !self.halted {
            info!("scheduler: fila de prontos vazia, despacho parado");
            self.halted = true;
            self.selected = 0;
            self.quantum_left = self.config.quantum;
            events.push(SchedulerEvent::Halted);
        }

        true
    }

    fn advance_wait_queue<R: Rng + ?Sized>(&mut self, rng: &mut R, events: &mut Vec<SchedulerEvent>) {
        let tick = self.config.tick;
        let mut idx = 0;

        while idx < self.wait.len() {
            if self.wait[idx].wait > tick {
                self.wait[idx].wait -= tick;
                idx += 1;
                continue;
            }

            let mut process = self.wait.remove(idx);

            let attributes = ProcessAttributes {
                burst: random_burst(rng, &self.config),
                priority: random_priority(rng, &self.config),
                memory: process.memory,
            };

            process.refresh(attributes, self.clock);

            debug!(
                "scheduler: {} ({}) voltou do I/O burst={:.1}s prio={}",
                process.id,
                process.name,
                process.burst_secs(),
                process.priority
            );

            events.push(SchedulerEvent::Requeued {
                id: process.id,
                name: process.name.clone(),
            });

            self.ready.push(process);
        }
    }

    /// Primeiro menor burst da fila.
    fn shortest_job(&self) -> usize {
        self.ready
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.burst)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    /// Primeiro menor valor de prioridade da fila.
    fn highest_priority(&self) -> usize {
        self.ready
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.priority)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    /// Executa `idx` por um tick, ou o tira da fila se o burst acabar.
    fn run<R: Rng + ?Sized>(&mut self, idx: usize, rng: &mut R, events: &mut Vec<SchedulerEvent>) {
        let idx = if idx < self.ready.len() { idx } else { 0 };

        if self.ready[idx].burst <= self.config.tick {
            self.complete(idx, rng, events);
            return;
        }

        self.mark_running(idx);
        self.consume(idx, events);
    }

    fn run_round_robin<R: Rng + ?Sized>(&mut self, rng: &mut R, events: &mut Vec<SchedulerEvent>) {
        if self.selected >= self.ready.len() {
            debug!("scheduler: índice {} não existe mais, voltando para 0", self.selected);
            self.selected = 0;
        }

        let idx = self.selected;
        let tick = self.config.tick;

        if self.ready[idx].burst <= tick {
            // A vez fica com quem ocupar o lugar liberado.
            self.complete(idx, rng, events);
            self.quantum_left = self.config.quantum;
            return;
        }

        if self.quantum_left <= tick {
            let process = &mut self.ready[idx];
            process.burst -= tick;

            events.push(SchedulerEvent::Preempted {
                id: process.id,
                name: process.name.clone(),
            });

            for process in &mut self.ready {
                process.status = ProcessStatus::Ready;
            }

            self.selected = (idx + 1) % self.ready.len();
            self.quantum_left = self.config.quantum;

            debug!("scheduler: quantum esgotado, vez do índice {}", self.selected);
            return;
        }

        self.mark_running(idx);
        self.consume(idx, events);
        self.quantum_left -= tick;
    }

    fn mark_running(&mut self, idx: usize) {
        for (i, process) in self.ready.iter_mut().enumerate() {
            process.status = if i == idx {
                ProcessStatus::Running
            } else {
                ProcessStatus::Ready
            };
        }
    }

    fn consume(&mut self, idx: usize, events: &mut Vec<SchedulerEvent>) {
        let process = &mut self.ready[idx];
        process.burst -= self.config.tick;

        events.push(SchedulerEvent::Dispatched {
            id: process.id,
            name: process.name.clone(),
        });
    }

    fn complete<R: Rng + ?Sized>(&mut self, idx: usize, rng: &mut R, events: &mut Vec<SchedulerEvent>) {
        let mut process = self.ready.remove(idx);

        process.burst = Duration::ZERO;
        process.status = ProcessStatus::Waiting;
        process.wait = random_wait(rng, &self.config);

        debug!(
            "scheduler: {} ({}) terminou o burst, I/O de {:.1}s",
            process.id,
            process.name,
            process.wait_secs()
        );

        events.push(SchedulerEvent::BurstCompleted {
            id: process.id,
            name: process.name.clone(),
            wait: process.wait,
        });

        self.wait.push(process);
    }

    pub fn ready(&self) -> &[Process] {
        &self.ready
    }

    pub fn wait(&self) -> &[Process] {
        &self.wait
    }

    /// Prontos seguidos dos que esperam.
    pub fn live(&self) -> impl Iterator<Item = &Process> {
        self.ready.iter().chain(self.wait.iter())
    }

    pub fn live_count(&self) -> usize {
        self.ready.len() + self.wait.len()
    }

    pub fn contains_owner(&self, name: &str) -> bool {
        self.live().any(|p| p.name == name)
    }

    pub fn running(&self) -> Option<&Process> {
        self.ready.iter().find(|p| p.is_running())
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn quantum_left(&self) -> Duration {
        self.quantum_left
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            clock_secs: self.clock.as_secs_f64(),
            discipline: self.discipline,
            quantum_secs: self.config.quantum.as_secs_f64(),
            ready: self.ready.clone(),
            wait: self.wait.clone(),
        }
    }
}
