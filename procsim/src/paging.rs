//! Motor de paginação.
//!
//! Faz duas coisas com a mesma população de processos:
//!
//! 1. [`PagingEngine::recompute`] mantém a tabela de frames "ao vivo": cada
//!    processo ganha `ceil(memory / page_unit)` páginas, os frames livres são
//!    ocupados na ordem dos processos, e o processo que está executando pode
//!    tomar frames de quem executou há mais tempo (histórico de recência). O
//!    que não cabe fica no disco.
//!
//! 2. [`simulate`] reproduz uma sequência de referências embaralhada com
//!    FIFO, LRU ou OPT e conta hits e faults.
//!
//! Os dois são recalculados do zero a partir das filas do escalonador; nada
//! aqui tem ciclo de vida próprio.

use std::collections::{HashSet, VecDeque};

use log::{debug, info};
use rand::Rng;

pub use crate::page_replacer::Policy;
use crate::{
    backing_store::BackingStore,
    config::SimConfig,
    frame_table::FrameTable,
    history::RecencyHistory,
    mmu::{Access, Mmu},
    process::Process,
    reference,
    scheduler::SchedulerEvent,
    stats::{SimulationReport, SimulationStats},
};

/// Roda `policy` sobre `reference` com `frame_count` frames.
///
/// A tabela final sai na ordem de carga (o frame carregado há mais tempo
/// primeiro, vazios no fim) e o disco lista, na ordem em que aparecem na
/// sequência, os donos que não ficaram residentes.
pub fn simulate(policy: Policy, reference: &[String], frame_count: usize) -> SimulationReport {
    if frame_count == 0 {
        // Sem memória tudo é fault e tudo fica no disco.
        return SimulationReport {
            policy,
            stats: SimulationStats::from_counts(0, reference.len()),
            frames: Vec::new(),
            backing: spilled(reference, &[]),
        };
    }

    let mut mmu = Mmu::new(frame_count, policy.replacer(), BackingStore::new());
    let mut load_order: VecDeque<usize> = VecDeque::with_capacity(frame_count);

    let mut hits = 0;
    let mut faults = 0;

    for (idx, page) in reference.iter().enumerate() {
        match mmu.access(page, &reference[idx + 1..]) {
            Access::Hit(_) => hits += 1,
            Access::Fault { frame, .. } => {
                faults += 1;
                load_order.retain(|&loaded| loaded != frame);
                load_order.push_back(frame);
            }
        }
    }

    let stats = SimulationStats::from_counts(hits, faults);

    debug!(
        "paging: {} sobre {} referências: hits={} faults={} taxa={}%",
        policy,
        reference.len(),
        stats.hits,
        stats.faults,
        stats.rate
    );

    let mut frames: Vec<String> = load_order
        .iter()
        .filter_map(|&idx| mmu.frames().get(idx))
        .map(str::to_string)
        .collect();
    let backing = spilled(reference, &frames);
    frames.resize(frame_count, String::new());

    SimulationReport {
        policy,
        stats,
        frames,
        backing,
    }
}

/// Donos da sequência que não estão em `resident`, sem repetição, na ordem
/// da primeira aparição.
fn spilled(reference: &[String], resident: &[String]) -> Vec<String> {
    let mut backing: Vec<String> = Vec::new();

    for page in reference {
        if !resident.contains(page) && !backing.contains(page) {
            backing.push(page.clone());
        }
    }

    backing
}

pub struct PagingEngine {
    frame_count: usize,
    page_unit: u64,
    frames: FrameTable,
    backing: BackingStore,
    history: RecencyHistory,
    /// `None` até alguém escolher; a primeira simulação usa FIFO.
    policy: Option<Policy>,
    reference: Vec<String>,
    report: SimulationReport,
}

impl PagingEngine {
    pub fn new(config: &SimConfig) -> Self {
        PagingEngine {
            frame_count: config.frame_count,
            page_unit: config.page_unit,
            frames: FrameTable::new(config.frame_count),
            backing: BackingStore::new(),
            history: RecencyHistory::new(),
            policy: None,
            reference: Vec::new(),
            report: SimulationReport::empty(Policy::default(), config.frame_count),
        }
    }

    /// Consome um evento do escalonador. Só `Dispatched` interessa: quem
    /// executou vira o mais recente do histórico.
    pub fn observe(&mut self, event: &SchedulerEvent) {
        if let SchedulerEvent::Dispatched { name, .. } = event {
            self.history.touch(name);
        }
    }

    /// Recalcula a tabela de frames e o disco a partir dos processos vivos
    /// (prontos e esperando), reaproveitando o que já está residente.
    ///
    /// Chamar duas vezes seguidas sem mudar nada dá o mesmo resultado.
    pub fn recompute<'a, I>(&mut self, live: I)
    where
        I: IntoIterator<Item = &'a Process>,
    {
        let live: Vec<&Process> = live.into_iter().collect();
        let names: HashSet<&str> = live.iter().map(|p| p.name.as_str()).collect();

        self.history.purge(&names);

        let stale = self.frames.evict_where(|owner| names.contains(owner));
        if !stale.is_empty() {
            debug!("paging: {} frame(s) de processos encerrados liberados", stale.len());
        }
        self.backing.retain(|owner| names.contains(owner));

        for process in &live {
            let name = process.name.as_str();
            let required = process.required_pages(self.page_unit);
            let mut needed = required.saturating_sub(self.frames.resident_count(name));

            while needed > 0 {
                match self.frames.first_free() {
                    Some(idx) => {
                        self.frames.set(idx, name);
                        needed -= 1;
                    }
                    None => break,
                }
            }

            if process.is_active() && needed > 0 {
                needed = self.steal_frames(name, needed);
            }

            if process.is_running() {
                self.backing.remove_owner(name);
            } else {
                self.backing.set_count(name, needed);
            }
        }

        self.backing.drop_empty();
    }

    /// Toma frames dos donos menos recentemente executados até `thief` ter o
    /// que precisa ou o histórico acabar. Devolve quanto ainda falta.
    fn steal_frames(&mut self, thief: &str, mut needed: usize) -> usize {
        let victims: Vec<String> = self
            .history
            .oldest_first()
            .filter(|name| *name != thief)
            .map(str::to_string)
            .collect();

        for victim in victims {
            while needed > 0 {
                let Some(idx) = self.frames.find(&victim) else {
                    break;
                };

                debug!("paging: {} toma o frame {} de {}", thief, idx, victim);

                self.frames.set(idx, thief);
                self.backing.push(&victim);
                needed -= 1;
            }

            if needed == 0 {
                break;
            }
        }

        needed
    }

    /// Sorteia uma sequência de referências nova para `live` e simula de novo
    /// com a política escolhida.
    pub fn regenerate_reference<'a, I, R>(&mut self, live: I, rng: &mut R)
    where
        I: IntoIterator<Item = &'a Process>,
        R: Rng + ?Sized,
    {
        self.reference = reference::generate(live, self.page_unit, rng);
        self.resimulate();
    }

    pub fn select_policy(&mut self, policy: Policy) -> &SimulationReport {
        info!("paging: política {}", policy);

        self.policy = Some(policy);
        self.resimulate();

        &self.report
    }

    fn resimulate(&mut self) {
        if self.reference.is_empty() {
            let policy = self.policy.unwrap_or_default();
            self.report = SimulationReport::empty(policy, self.frame_count);
            return;
        }

        let policy = *self.policy.get_or_insert(Policy::Fifo);

        self.report = simulate(policy, &self.reference, self.frame_count);
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn backing(&self) -> &BackingStore {
        &self.backing
    }

    pub fn history(&self) -> &RecencyHistory {
        &self.history
    }

    pub fn policy(&self) -> Option<Policy> {
        self.policy
    }

    pub fn reference(&self) -> &[String] {
        &self.reference
    }

    pub fn report(&self) -> &SimulationReport {
        &self.report
    }

    pub fn stats(&self) -> SimulationStats {
        self.report.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{tests::process, ProcessId, ProcessStatus};
    use rand::{rngs::StdRng, SeedableRng};

    fn refs(pages: &[&str]) -> Vec<String> {
        pages.iter().map(|p| p.to_string()).collect()
    }

    fn engine(frame_count: usize) -> PagingEngine {
        PagingEngine::new(&SimConfig::default().with_frame_count(frame_count))
    }

    fn running(mut p: Process) -> Process {
        p.status = ProcessStatus::Running;
        p
    }

    #[test]
    fn test_fifo_evicts_in_load_order() {
        let report = simulate(Policy::Fifo, &refs(&["A", "B", "C", "A", "D"]), 2);

        assert_eq!(report.stats.faults, 5);
        assert_eq!(report.stats.hits, 0);
        assert_eq!(report.frames, vec!["A", "D"]);
        assert_eq!(report.backing, vec!["B", "C"]);
    }

    #[test]
    fn test_fifo_hit_does_not_refresh_age() {
        let report = simulate(Policy::Fifo, &refs(&["A", "B", "A", "C", "A"]), 2);

        assert_eq!(report.stats.faults, 4);
        assert_eq!(report.stats.hits, 1);
        assert_eq!(report.stats.rate, 20.0);
        assert_eq!(report.frames, vec!["C", "A"]);
    }

    #[test]
    fn test_lru_hit_refreshes_recency() {
        let report = simulate(Policy::Lru, &refs(&["A", "B", "A", "C", "A"]), 2);

        assert_eq!(report.stats.faults, 3);
        assert_eq!(report.stats.hits, 2);
        assert_eq!(report.stats.rate, 40.0);
        assert_eq!(report.frames, vec!["A", "C"]);
        assert_eq!(report.backing, vec!["B"]);
    }

    #[test]
    fn test_opt_evicts_furthest_future_use() {
        let report = simulate(Policy::Opt, &refs(&["A", "B", "C", "A", "B", "D", "A"]), 2);

        assert_eq!(report.stats.faults, 5);
        assert_eq!(report.stats.hits, 2);
        assert_eq!(report.frames, vec!["A", "D"]);
    }

    #[test]
    fn test_opt_tie_evicts_oldest_load() {
        let report = simulate(Policy::Opt, &refs(&["A", "B", "C", "D"]), 2);

        assert_eq!(report.stats.faults, 4);
        assert_eq!(report.frames, vec!["C", "D"]);
        assert_eq!(report.backing, vec!["A", "B"]);

        let sequence = refs(&[
            "P1", "P4", "P2", "P0", "P0", "P3", "P5", "P1", "P5", "P4", "P0", "P3", "P2", "P7",
        ]);
        let report = simulate(Policy::Opt, &sequence, 2);

        assert_eq!(report.stats.faults, 11);
        assert_eq!(report.stats.hits, 3);
        assert_eq!(report.frames, vec!["P2", "P7"]);
        assert_eq!(report.backing, vec!["P1", "P4", "P0", "P3", "P5"]);
    }

    #[test]
    fn test_frames_come_out_in_load_order_with_blanks_last() {
        let report = simulate(Policy::Fifo, &refs(&["B", "A", "B"]), 4);

        assert_eq!(report.frames, vec!["B", "A", "", ""]);
        assert!(report.backing.is_empty());
    }

    #[test]
    fn test_opt_never_worse_than_fifo_or_lru() {
        let mut rng = StdRng::seed_from_u64(21);
        let processes: Vec<Process> = (0..8)
            .map(|i| process(i, &format!("prog{}", i), 1.0, 0, 50_000 * (i + 1)))
            .collect();
        let sequence = reference::generate(&processes, 50_000, &mut rng);

        let opt = simulate(Policy::Opt, &sequence, 4).stats.faults;
        assert!(opt <= simulate(Policy::Fifo, &sequence, 4).stats.faults);
        assert!(opt <= simulate(Policy::Lru, &sequence, 4).stats.faults);
    }

    #[test]
    fn test_empty_reference_gives_zero_stats() {
        for policy in [Policy::Fifo, Policy::Lru, Policy::Opt] {
            let report = simulate(policy, &[], 20);
            assert_eq!(report.stats, SimulationStats::from_counts(0, 0));
            assert_eq!(report.stats.rate, 0.0);
            assert!(report.backing.is_empty());
        }
    }

    #[test]
    fn test_zero_frames_faults_everything() {
        let report = simulate(Policy::Lru, &refs(&["A", "A", "B"]), 0);
        assert_eq!(report.stats.faults, 3);
        assert_eq!(report.backing, vec!["A", "B"]);
    }

    #[test]
    fn test_recompute_fills_free_frames_in_order() {
        let mut engine = engine(8);
        let a = process(1, "A", 1.0, 0, 150_000);
        let b = process(2, "B", 1.0, 0, 100_000);

        engine.recompute([&a, &b]);

        assert_eq!(engine.frames().snapshot(), vec!["A", "A", "A", "B", "B", "", "", ""]);
        assert!(engine.backing().is_empty());
    }

    #[test]
    fn test_recompute_overflow_goes_to_disk() {
        let mut engine = engine(4);
        let a = process(1, "A", 1.0, 0, 150_000);
        let b = process(2, "B", 1.0, 0, 150_000);

        engine.recompute([&a, &b]);

        assert_eq!(engine.frames().snapshot(), vec!["A", "A", "A", "B"]);
        assert_eq!(engine.backing().count("B"), 2);
        assert_eq!(engine.backing().count("A"), 0);
    }

    #[test]
    fn test_running_process_takes_frames_from_least_recent() {
        let mut engine = engine(4);
        let a = process(1, "A", 1.0, 0, 150_000);
        let b = running(process(2, "B", 1.0, 0, 150_000));

        engine.observe(&SchedulerEvent::Dispatched { id: ProcessId(1), name: "A".into() });
        engine.observe(&SchedulerEvent::Dispatched { id: ProcessId(2), name: "B".into() });

        engine.recompute([&a, &b]);

        assert_eq!(engine.frames().snapshot(), vec!["B", "B", "A", "B"]);
        assert_eq!(engine.backing().count("A"), 2);
        assert_eq!(engine.backing().count("B"), 0);
        assert_eq!(engine.backing().snapshot(), vec!["A"]);
    }

    #[test]
    fn test_backing_shrinks_when_frames_free_up() {
        let mut engine = engine(4);
        let a = process(1, "A", 1.0, 0, 150_000);
        let b = process(2, "B", 1.0, 0, 150_000);

        engine.recompute([&a, &b]);
        assert_eq!(engine.backing().count("B"), 2);

        // A fechou: B ocupa os frames livres e o disco encolhe junto.
        engine.recompute([&b]);

        assert_eq!(engine.frames().resident_count("B"), 3);
        assert_eq!(engine.backing().count("B"), 0);
        assert!(engine.backing().is_empty());
    }

    #[test]
    fn test_running_process_without_history_waits() {
        let mut engine = engine(2);
        let a = process(1, "A", 1.0, 0, 100_000);
        let b = running(process(2, "B", 1.0, 0, 100_000));

        engine.recompute([&a, &b]);

        assert_eq!(engine.frames().snapshot(), vec!["A", "A"]);
        assert_eq!(engine.backing().count("B"), 0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut engine = engine(5);
        let a = process(1, "A", 1.0, 0, 150_000);
        let b = running(process(2, "B", 1.0, 0, 200_000));
        let c = process(3, "C", 1.0, 0, 100_000);

        engine.observe(&SchedulerEvent::Dispatched { id: ProcessId(3), name: "C".into() });
        engine.observe(&SchedulerEvent::Dispatched { id: ProcessId(1), name: "A".into() });
        engine.observe(&SchedulerEvent::Dispatched { id: ProcessId(2), name: "B".into() });

        engine.recompute([&a, &b, &c]);
        let frames = engine.frames().clone();
        let backing = engine.backing().clone();

        engine.recompute([&a, &b, &c]);

        assert_eq!(engine.frames(), &frames);
        assert_eq!(engine.backing(), &backing);
    }

    #[test]
    fn test_dead_process_leaves_frames_disk_and_history() {
        let mut engine = engine(3);
        let a = process(1, "A", 1.0, 0, 100_000);
        let b = process(2, "B", 1.0, 0, 100_000);

        engine.observe(&SchedulerEvent::Dispatched { id: ProcessId(1), name: "A".into() });
        engine.recompute([&a, &b]);
        assert_eq!(engine.backing().count("B"), 1);

        engine.recompute([&b]);

        assert_eq!(engine.frames().resident_count("A"), 0);
        assert_eq!(engine.frames().resident_count("B"), 2);
        assert!(engine.backing().is_empty());
        assert!(!engine.history().contains("A"));
    }

    #[test]
    fn test_first_simulation_defaults_to_fifo() {
        let mut engine = engine(20);
        let a = process(1, "A", 1.0, 0, 100_000);
        let mut rng = StdRng::seed_from_u64(2);

        assert_eq!(engine.policy(), None);

        engine.regenerate_reference([&a], &mut rng);

        assert_eq!(engine.policy(), Some(Policy::Fifo));
        assert_eq!(engine.reference().len(), 2);
        assert_eq!(engine.stats().faults, 1);
        assert_eq!(engine.stats().hits, 1);
        assert_eq!(engine.stats().rate, 50.0);

        let report = engine.select_policy(Policy::Opt);
        assert_eq!(report.policy, Policy::Opt);
        assert_eq!(report.stats.hits, 1);
    }

    #[test]
    fn test_policy_choice_survives_empty_reference() {
        let mut engine = engine(20);

        let report = engine.select_policy(Policy::Lru);

        assert_eq!(report.policy, Policy::Lru);
        assert_eq!(report.stats.total(), 0);
        assert_eq!(engine.policy(), Some(Policy::Lru));
    }
}
