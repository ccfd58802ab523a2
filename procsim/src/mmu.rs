use std::collections::VecDeque;

use log::{debug, trace};

use crate::{
    frame_table::FrameTable,
    page_loader::PageLoader,
    page_replacer::{PageEvent, PageReplacer},
};

/// Resultado de uma referência.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Hit(usize),
    Fault { frame: usize, evicted: Option<String> },
}

impl Access {
    pub fn is_hit(&self) -> bool {
        matches!(self, Access::Hit(_))
    }
}

/// A memória física simulada: frames livres, tabela de frames, política de
/// substituição e o disco.
///
/// Uma página é identificada pelo nome do processo dono, então duas
/// referências ao mesmo dono são a mesma página.
pub struct Mmu<REPLACER, LOADER>
where
    REPLACER: PageReplacer,
    LOADER: PageLoader,
{
    free_frames: VecDeque<usize>,
    frames: FrameTable,
    replacer: REPLACER,
    loader: LOADER,
}

impl<REPLACER, LOADER> Mmu<REPLACER, LOADER>
where
    REPLACER: PageReplacer,
    LOADER: PageLoader,
{
    pub fn new(frame_count: usize, replacer: REPLACER, loader: LOADER) -> Self {
        let free_frames = (0..frame_count).collect();

        Mmu {
            free_frames,
            frames: FrameTable::new(frame_count),
            replacer,
            loader,
        }
    }

    fn handle_page_fault(&mut self, owner: &str, upcoming: &[String]) -> (usize, Option<String>) {
        let (frame_idx, evicted) = match self.free_frames.pop_front() {
            Some(empty_idx) => (empty_idx, None),
            None => {
                let victim = self.replacer.pick_replacement_frame(&self.frames, upcoming);

                let evicted = self.frames.clear(victim);

                if let Some(evicted_owner) = &evicted {
                    debug!("mmu: despejando {} do frame {} para {}", evicted_owner, victim, owner);

                    self.loader.flush_page(evicted_owner, victim);
                }

                (victim, evicted)
            }
        };

        self.frames.set(frame_idx, owner);

        self.loader.load_page_into(owner, frame_idx);

        self.replacer.page_event(PageEvent::Loaded(frame_idx));

        (frame_idx, evicted)
    }

    /// Referencia a página de `owner`. `upcoming` são as referências que vêm
    /// depois desta (só o OPT olha).
    pub fn access(&mut self, owner: &str, upcoming: &[String]) -> Access {
        let access = match self.frames.find(owner) {
            Some(frame_idx) => {
                trace!("mmu: page hit {} frame={}", owner, frame_idx);
                Access::Hit(frame_idx)
            }
            None => {
                trace!("mmu: page fault {}! tratando...", owner);
                let (frame, evicted) = self.handle_page_fault(owner, upcoming);
                Access::Fault { frame, evicted }
            }
        };

        let frame_idx = match &access {
            Access::Hit(idx) => *idx,
            Access::Fault { frame, .. } => *frame,
        };

        self.replacer.page_event(PageEvent::Touched(frame_idx));

        access
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn loader(&self) -> &LOADER {
        &self.loader
    }

    pub fn into_parts(self) -> (FrameTable, LOADER) {
        (self.frames, self.loader)
    }
}
