use std::collections::HashSet;

use serde::Serialize;

/// Ordem de execução mais recente, do mais antigo para o mais novo. Só a
/// realocação de frames do `recompute` usa isto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecencyHistory {
    names: Vec<String>,
}

impl RecencyHistory {
    pub fn new() -> Self {
        RecencyHistory::default()
    }

    /// Move `name` para o fim (mais recente).
    pub fn touch(&mut self, name: &str) {
        self.names.retain(|n| n != name);
        self.names.push(name.to_string());
    }

    /// Esquece quem não está mais vivo.
    pub fn purge(&mut self, live: &HashSet<&str>) {
        self.names.retain(|n| live.contains(n.as_str()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Do menos para o mais recentemente executado.
    pub fn oldest_first(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
