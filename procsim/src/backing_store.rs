//! O "disco": páginas que não estão em nenhum frame.
//!
//! Guarda um nome de dono por página. Duplicatas são normais aqui (um
//! processo com três páginas fora da memória aparece três vezes); o
//! [`BackingStore::snapshot`] é que as colapsa para exibição.

use log::trace;

use crate::page_loader::PageLoader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackingStore {
    pages: Vec<String>,
}

impl BackingStore {
    pub fn new() -> Self {
        BackingStore::default()
    }

    pub fn push(&mut self, owner: &str) {
        self.pages.push(owner.to_string());
    }

    /// Quantas páginas de `owner` estão no disco.
    pub fn count(&self, owner: &str) -> usize {
        self.pages.iter().filter(|page| *page == owner).count()
    }

    /// Tira todas as páginas de `owner`. Devolve quantas saíram.
    pub fn remove_owner(&mut self, owner: &str) -> usize {
        let before = self.pages.len();
        self.pages.retain(|page| page != owner);
        before - self.pages.len()
    }

    pub fn retain<F: Fn(&str) -> bool>(&mut self, keep: F) {
        self.pages.retain(|page| keep(page));
    }

    /// Deixa exatamente `count` páginas de `owner` no disco.
    pub fn set_count(&mut self, owner: &str, count: usize) {
        let current = self.count(owner);

        if current < count {
            for _ in current..count {
                self.push(owner);
            }
        } else {
            let mut excess = current - count;

            // Remove as mais recentes primeiro.
            let mut idx = self.pages.len();
            while excess > 0 && idx > 0 {
                idx -= 1;
                if self.pages[idx] == owner {
                    self.pages.remove(idx);
                    excess -= 1;
                }
            }
        }
    }

    /// Remove os placeholders vazios.
    pub fn drop_empty(&mut self) {
        self.pages.retain(|page| !page.is_empty());
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Donos distintos na ordem em que apareceram.
    pub fn snapshot(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();

        for page in &self.pages {
            if !seen.contains(page) {
                seen.push(page.clone());
            }
        }

        seen
    }
}

impl PageLoader for BackingStore {
    fn load_page_into(&mut self, owner: &str, frame_index: usize) {
        trace!("backing_store: {} carregada no frame {}", owner, frame_index);

        if let Some(idx) = self.pages.iter().position(|page| page == owner) {
            self.pages.remove(idx);
        }
    }

    fn flush_page(&mut self, owner: &str, frame_index: usize) {
        trace!("backing_store: {} despejada do frame {}", owner, frame_index);

        self.push(owner);
    }
}
