//! procsim - núcleo de simulação de escalonamento de processos e memória virtual.
//!
//! Dois motores compartilham a mesma população de processos:
//!
//! - o [`scheduler`] avança os processos entre pronto/executando/esperando
//!   usando FCFS, SJF, Prioridade ou Round Robin, um tick fixo por vez;
//! - o motor de [`paging`] mapeia esses processos numa tabela de frames de
//!   tamanho fixo e reproduz uma sequência de referências embaralhada com
//!   FIFO, LRU ou OPT.
//!
//! O [`service::SimulationService`] é dono dos dois e é a única coisa com que
//! quem está de fora (o shell do desktop, uma CLI, os testes) precisa falar.

pub mod backing_store;
pub mod config;
pub mod error;
pub mod frame_table;
pub mod history;
pub mod mmu;
pub mod page_loader;
pub mod page_replacer;
pub mod paging;
pub mod process;
pub mod reference;
pub mod scheduler;
pub mod service;
pub mod stats;

pub use config::SimConfig;
pub use error::SimError;
pub use paging::{PagingEngine, Policy};
pub use process::{Process, ProcessId, ProcessStatus};
pub use scheduler::{Discipline, Scheduler, SchedulerEvent};
pub use service::{SimulationService, SystemSnapshot};
pub use stats::{SimulationReport, SimulationStats};
