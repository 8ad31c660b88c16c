use crate::config::RosterConfig;
use roster_core::IdentityKind;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the stderr subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_tracing(configured_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

pub fn load_config_or_exit(path: Option<&str>) -> RosterConfig {
    RosterConfig::load(path.map(Path::new)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

/// `--identity` if given, otherwise the configured scheme.
pub fn resolve_identity_or_exit(flag: Option<&str>, config: &RosterConfig) -> IdentityKind {
    match flag {
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            eprintln!("error: {e}");
            std::process::exit(2);
        }),
        None => config.registry.identity,
    }
}

/// Open `path`, or stdin when no path is given.
pub fn open_input_or_exit(path: Option<&str>) -> Box<dyn BufRead> {
    match path {
        Some(path) => {
            let file = fs::File::open(path).unwrap_or_else(|e| {
                eprintln!("error: failed to open {path}: {e}");
                std::process::exit(1);
            });
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    }
}
