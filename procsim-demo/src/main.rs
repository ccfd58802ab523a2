mod ticker;

use std::{env, process::ExitCode, time::Duration};

use log::error;
use procsim::{Discipline, Policy, SimConfig, SimulationService};

use ticker::{Action, Ticker};

fn script() -> Vec<(usize, Action)> {
    vec![
        (0, Action::Open("Note")),
        (0, Action::Open("Camera")),
        (5, Action::Open("File Manager")),
        (12, Action::Open("Spotify")),
        (20, Action::Discipline(Discipline::Sjf)),
        (30, Action::Policy(Policy::Lru)),
        (45, Action::Open("Chess")),
        (60, Action::Discipline(Discipline::Priority)),
        (75, Action::Close("Camera")),
        (90, Action::Discipline(Discipline::RoundRobin)),
        (100, Action::Policy(Policy::Opt)),
        (120, Action::Open("Voice Program")),
        (150, Action::Close("Note")),
    ]
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let fast = args.iter().any(|arg| arg == "--fast");
    let ticks = args
        .iter()
        .position(|arg| arg == "--ticks")
        .and_then(|idx| args.get(idx + 1))
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(200);

    let config = match SimConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("demo: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut service = match SimulationService::new(config) {
        Ok(service) => service,
        Err(err) => {
            error!("demo: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let interval = if fast { Duration::ZERO } else { service.config().tick };

    Ticker::new(interval, script()).run(&mut service, ticks);

    match serde_json::to_string_pretty(&service.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            error!("demo: {}", err);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
