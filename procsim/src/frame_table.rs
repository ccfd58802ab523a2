use serde::Serialize;

/// Memória residente: `frame_count` slots, cada um vazio ou com o nome do
/// processo dono da página.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameTable {
    table: Vec<Option<String>>,
}

impl FrameTable {
    pub fn new(frame_count: usize) -> Self {
        FrameTable {
            table: vec![None; frame_count],
        }
    }

    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    pub fn set(&mut self, frame_index: usize, owner: &str) {
        self.table[frame_index] = Some(owner.to_string());
    }

    pub fn get(&self, frame_index: usize) -> Option<&str> {
        self.table.get(frame_index).and_then(|slot| slot.as_deref())
    }

    pub fn clear(&mut self, frame_index: usize) -> Option<String> {
        self.table[frame_index].take()
    }

    /// Primeiro frame que guarda uma página de `owner`.
    pub fn find(&self, owner: &str) -> Option<usize> {
        self.table.iter().position(|slot| slot.as_deref() == Some(owner))
    }

    pub fn first_free(&self) -> Option<usize> {
        self.table.iter().position(Option::is_none)
    }

    pub fn free_count(&self) -> usize {
        self.table.iter().filter(|slot| slot.is_none()).count()
    }

    /// Quantas páginas de `owner` estão residentes.
    pub fn resident_count(&self, owner: &str) -> usize {
        self.table
            .iter()
            .filter(|slot| slot.as_deref() == Some(owner))
            .count()
    }

    /// Esvazia todo slot cujo dono não passe em `keep`. Devolve os donos
    /// despejados, um por frame.
    pub fn evict_where<F: Fn(&str) -> bool>(&mut self, keep: F) -> Vec<String> {
        let mut evicted = Vec::new();

        for slot in &mut self.table {
            if matches!(slot.as_deref(), Some(owner) if !keep(owner)) {
                evicted.extend(slot.take());
            }
        }

        evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.table.iter().map(|slot| slot.as_deref())
    }

    /// Cópia para exibição: nome do dono ou string vazia.
    pub fn snapshot(&self) -> Vec<String> {
        self.iter().map(|slot| slot.unwrap_or_default().to_string()).collect()
    }
}
