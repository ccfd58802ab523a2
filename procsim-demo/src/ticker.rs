//! Ticker - faz o papel do timer de 100ms do desktop.
//!
//! Segue um roteiro de ações (abrir/fechar programas, trocar disciplina ou
//! política) indexado pelo número do tick. Cada volta do loop lê o estado
//! atual do serviço; não existe closure guardando fila velha.

use std::{thread, time::Duration};

use log::{debug, info};
use procsim::{Discipline, Policy, SchedulerEvent, SimulationService};

/// O que o "desktop" faz num determinado tick.
#[derive(Debug, Clone)]
pub enum Action {
    Open(&'static str),
    Close(&'static str),
    Discipline(Discipline),
    Policy(Policy),
}

pub struct Ticker {
    interval: Duration,
    script: Vec<(usize, Action)>,
}

impl Ticker {
    /// `interval` zero roda sem dormir.
    pub fn new(interval: Duration, mut script: Vec<(usize, Action)>) -> Self {
        script.sort_by_key(|(tick, _)| *tick);

        Ticker { interval, script }
    }

    pub fn run(&self, service: &mut SimulationService, ticks: usize) {
        let mut pending = self.script.iter().peekable();

        for tick in 0..ticks {
            while let Some((_, action)) = pending.next_if(|(at, _)| *at == tick) {
                apply(service, action);
            }

            let events = service.tick();

            for event in &events {
                log_event(event);
            }

            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
        }
    }
}

fn apply(service: &mut SimulationService, action: &Action) {
    match action {
        Action::Open(name) => match service.on_program_opened(name) {
            Ok(id) => info!("ticker: abriu {} ({})", name, id),
            Err(err) => info!("ticker: não abriu {}: {}", name, err),
        },
        Action::Close(name) => {
            service.on_program_closed(name);
        }
        Action::Discipline(discipline) => service.on_discipline_selected(*discipline),
        Action::Policy(policy) => {
            let report = service.on_paging_policy_selected(*policy);
            info!(
                "ticker: {} -> hits={} faults={} taxa={}%",
                report.policy, report.stats.hits, report.stats.faults, report.stats.rate
            );
        }
    }
}

fn log_event(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::Dispatched { id, name } => debug!("ticker: executando {} ({})", id, name),
        SchedulerEvent::Preempted { id, name } => info!("ticker: quantum de {} ({}) acabou", id, name),
        SchedulerEvent::BurstCompleted { id, name, wait } => {
            info!("ticker: {} ({}) foi para I/O por {:.1}s", id, name, wait.as_secs_f64())
        }
        SchedulerEvent::Requeued { id, name } => info!("ticker: {} ({}) voltou para a fila", id, name),
        SchedulerEvent::Halted => info!("ticker: fila de prontos vazia"),
        SchedulerEvent::Resumed => info!("ticker: despacho retomado"),
    }
}
