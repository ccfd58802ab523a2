use std::{collections::VecDeque, fmt, str::FromStr};

use serde::Serialize;

use crate::{error::SimError, frame_table::FrameTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Policy {
    #[default]
    Fifo,
    Lru,
    Opt,
}

impl Policy {
    pub fn replacer(self) -> Box<dyn PageReplacer> {
        match self {
            Policy::Fifo => Box::new(FIFOPageReplacer::new()),
            Policy::Lru => Box::new(LRUPageReplacer::new()),
            Policy::Opt => Box::new(OPTPageReplacer::new()),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Policy::Fifo => "FIFO",
            Policy::Lru => "LRU",
            Policy::Opt => "OPT",
        };

        f.write_str(token)
    }
}

impl FromStr for Policy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Policy::Fifo),
            "LRU" => Ok(Policy::Lru),
            "OPT" | "OPTIMAL" => Ok(Policy::Opt),
            _ => Err(SimError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Eventos que o `Mmu` manda para o substituidor, sempre com o índice do
/// frame envolvido.
pub enum PageEvent {
    Touched(usize),
    Loaded(usize),
}

pub trait PageReplacer {
    fn page_event(&mut self, _event: PageEvent) {}

    /// Escolhe o frame que vai ser sobrescrito. Só é chamado com a tabela
    /// cheia; `upcoming` são as referências que ainda vão acontecer.
    fn pick_replacement_frame(&mut self, frames: &FrameTable, upcoming: &[String]) -> usize;
}

impl<R: PageReplacer + ?Sized> PageReplacer for Box<R> {
    fn page_event(&mut self, event: PageEvent) {
        (**self).page_event(event)
    }

    fn pick_replacement_frame(&mut self, frames: &FrameTable, upcoming: &[String]) -> usize {
        (**self).pick_replacement_frame(frames, upcoming)
    }
}

/// Despeja o frame carregado há mais tempo.
pub struct FIFOPageReplacer {
    fifo: VecDeque<usize>,
}

impl FIFOPageReplacer {
    pub fn new() -> Self {
        FIFOPageReplacer {
            fifo: VecDeque::new(),
        }
    }
}

impl Default for FIFOPageReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReplacer for FIFOPageReplacer {
    fn page_event(&mut self, event: PageEvent) {
        if let PageEvent::Loaded(idx) = event {
            self.fifo.push_back(idx)
        }
    }

    fn pick_replacement_frame(&mut self, _frames: &FrameTable, _upcoming: &[String]) -> usize {
        self.fifo.pop_front().unwrap_or(0)
    }
}

/// Despeja o frame cuja última referência ficou mais no passado.
pub struct LRUPageReplacer {
    /// Do menos para o mais recente.
    recency: VecDeque<usize>,
}

impl LRUPageReplacer {
    pub fn new() -> Self {
        LRUPageReplacer {
            recency: VecDeque::new(),
        }
    }

    fn promote(&mut self, idx: usize) {
        self.recency.retain(|&frame| frame != idx);
        self.recency.push_back(idx);
    }
}

impl Default for LRUPageReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReplacer for LRUPageReplacer {
    fn page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Touched(idx) | PageEvent::Loaded(idx) => self.promote(idx),
        }
    }

    fn pick_replacement_frame(&mut self, _frames: &FrameTable, _upcoming: &[String]) -> usize {
        self.recency.pop_front().unwrap_or(0)
    }
}

/// Belady: despeja o frame cujo dono vai ser usado de novo mais tarde (ou
/// nunca). Empate fica com o frame carregado há mais tempo.
pub struct OPTPageReplacer {
    /// Frames na ordem de carga, do mais antigo para o mais novo.
    loaded: VecDeque<usize>,
}

impl OPTPageReplacer {
    pub fn new() -> Self {
        OPTPageReplacer {
            loaded: VecDeque::new(),
        }
    }

    /// Ordem de desempate: primeiro os frames com carga registrada, depois o
    /// resto pelo índice.
    fn candidates(&self, capacity: usize) -> Vec<usize> {
        let unknown = (0..capacity).filter(|idx| !self.loaded.contains(idx));

        self.loaded.iter().copied().chain(unknown).collect()
    }
}

impl Default for OPTPageReplacer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageReplacer for OPTPageReplacer {
    fn page_event(&mut self, event: PageEvent) {
        if let PageEvent::Loaded(idx) = event {
            self.loaded.retain(|&frame| frame != idx);
            self.loaded.push_back(idx);
        }
    }

    fn pick_replacement_frame(&mut self, frames: &FrameTable, upcoming: &[String]) -> usize {
        let mut victim = None;
        let mut furthest = 0;

        for idx in self.candidates(frames.capacity()) {
            let next_use = frames
                .get(idx)
                .and_then(|owner| upcoming.iter().position(|page| page == owner))
                .unwrap_or(usize::MAX);

            if next_use == usize::MAX {
                victim = Some(idx);
                break;
            }

            if victim.is_none() || next_use > furthest {
                victim = Some(idx);
                furthest = next_use;
            }
        }

        let victim = victim.unwrap_or(0);
        self.loaded.retain(|&frame| frame != victim);

        victim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table(owners: &[&str]) -> FrameTable {
        let mut table = FrameTable::new(owners.len());
        for (idx, owner) in owners.iter().enumerate() {
            table.set(idx, owner);
        }
        table
    }

    fn refs(pages: &[&str]) -> Vec<String> {
        pages.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_policy_tokens() {
        assert_eq!("fifo".parse::<Policy>(), Ok(Policy::Fifo));
        assert_eq!("LRU".parse::<Policy>(), Ok(Policy::Lru));
        assert_eq!("OPT".parse::<Policy>(), Ok(Policy::Opt));
        assert!(matches!("MRU".parse::<Policy>(), Err(SimError::UnknownPolicy(_))));
        assert_eq!(Policy::Opt.to_string(), "OPT");
    }

    #[test]
    fn test_fifo_ignores_touches() {
        let table = full_table(&["A", "B"]);
        let mut replacer = FIFOPageReplacer::new();

        replacer.page_event(PageEvent::Loaded(0));
        replacer.page_event(PageEvent::Loaded(1));
        replacer.page_event(PageEvent::Touched(0));

        assert_eq!(replacer.pick_replacement_frame(&table, &[]), 0);
        assert_eq!(replacer.pick_replacement_frame(&table, &[]), 1);
    }

    #[test]
    fn test_lru_prefers_stale_frame() {
        let table = full_table(&["A", "B"]);
        let mut replacer = LRUPageReplacer::new();

        replacer.page_event(PageEvent::Loaded(0));
        replacer.page_event(PageEvent::Loaded(1));
        replacer.page_event(PageEvent::Touched(0));

        assert_eq!(replacer.pick_replacement_frame(&table, &[]), 1);
    }

    #[test]
    fn test_opt_picks_furthest_next_use() {
        let table = full_table(&["A", "B", "C"]);

        let upcoming = refs(&["B", "A", "C", "B"]);
        assert_eq!(OPTPageReplacer::new().pick_replacement_frame(&table, &upcoming), 2);

        let upcoming = refs(&["C", "A"]);
        assert_eq!(OPTPageReplacer::new().pick_replacement_frame(&table, &upcoming), 1);
    }

    #[test]
    fn test_opt_tie_without_loads_goes_to_lowest_frame() {
        let table = full_table(&["A", "B", "C"]);

        assert_eq!(OPTPageReplacer::new().pick_replacement_frame(&table, &refs(&["B"])), 0);
        assert_eq!(OPTPageReplacer::new().pick_replacement_frame(&table, &refs(&["A"])), 1);
    }

    #[test]
    fn test_opt_tie_goes_to_oldest_load() {
        let table = full_table(&["A", "B", "C"]);
        let mut replacer = OPTPageReplacer::new();

        replacer.page_event(PageEvent::Loaded(2));
        replacer.page_event(PageEvent::Loaded(0));
        replacer.page_event(PageEvent::Loaded(1));

        // A e C nunca mais aparecem; C foi carregado antes.
        assert_eq!(replacer.pick_replacement_frame(&table, &refs(&["B"])), 2);

        replacer.page_event(PageEvent::Loaded(2));
        assert_eq!(replacer.pick_replacement_frame(&table, &refs(&["B"])), 0);
    }
}
