use std::time::Duration;

use thiserror::Error;

/// Erros de argumento inválido.
///
/// O núcleo não faz I/O, então tudo aqui é erro de quem chama: tokens
/// desconhecidos, durações negativas, nomes repetidos ou configuração sem
/// sentido. Entradas vazias e índices velhos não viram erro; o motor se
/// recupera sozinho.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("Disciplina de escalonamento desconhecida: {0}")]
    UnknownDiscipline(String),

    #[error("Política de paginação desconhecida: {0}")]
    UnknownPolicy(String),

    #[error("{field} inválido: {value} (precisa ser finito e não negativo)")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("O nome do programa não pode ser vazio")]
    EmptyOwnerName,

    #[error("O programa já tem um processo vivo: {0}")]
    OwnerAlreadyLive(String),

    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),
}

impl SimError {
    /// Converte segundos em `Duration`, rejeitando negativos, NaN e infinitos.
    pub fn check_secs(field: &'static str, value: f64) -> Result<Duration, SimError> {
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::InvalidDuration { field, value });
        }

        // Arredonda para microssegundos: 0.3 vira 300ms, não 299.999...ms.
        Ok(Duration::from_micros((value * 1e6).round() as u64))
    }
}
