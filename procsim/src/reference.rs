use rand::{seq::SliceRandom, Rng};

use crate::process::Process;

/// Gera a sequência de referências: o nome de cada processo repetido
/// `required_pages` vezes, tudo embaralhado com Fisher-Yates.
pub fn generate<'a, I, R>(processes: I, page_unit: u64, rng: &mut R) -> Vec<String>
where
    I: IntoIterator<Item = &'a Process>,
    R: Rng + ?Sized,
{
    let mut sequence: Vec<String> = processes
        .into_iter()
        .flat_map(|p| std::iter::repeat(p.name.clone()).take(p.required_pages(page_unit)))
        .collect();

    sequence.shuffle(rng);

    sequence
}
