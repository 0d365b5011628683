//! `roomba-cli` – console harness for the roomba behavior-tree simulator.
//!
//! 1. Loads `~/.roomba/config.toml`, writing defaults on first run.
//! 2. Builds the reference tree once.
//! 3. Runs interactive rounds: seed the blackboard from operator answers,
//!    tick until the root resolves, print the decision trace.
//! 4. Intercepts **Ctrl-C** so the session ends at the next prompt.

mod config;
mod session;

use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use roomba_runtime::ControlLoop;

fn main() {
    // Logs go to stderr; the round trace and prompts own stdout.
    roomba_runtime::init_tracing("warn");

    print_banner();

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping after the current round …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    let cfg = load_or_init_config();
    info!(?cfg, "configuration loaded");

    let control = ControlLoop::roomba(&cfg.tree_config(), cfg.control_loop_config());
    let mut rng = match cfg.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let stdin = io::stdin();
    let mut console = session::Console::new(stdin.lock(), io::stdout()).with_shutdown(shutdown.clone());
    let rounds = session::run(&mut console, &control, &mut rng, &shutdown);

    println!("{} ({} round(s) run)", "Goodbye.".green(), rounds);
}

fn load_or_init_config() -> config::Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!("  Config loaded from {}", config::config_path().display().to_string().bold());
            cfg
        }
        Ok(None) => {
            let mut cfg = config::Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            validated_or_default(cfg)
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            validated_or_default(cfg)
        }
    }
}

fn validated_or_default(cfg: config::Config) -> config::Config {
    match cfg.validate() {
        Ok(()) => cfg,
        Err(e) => {
            println!("{}: {} – using defaults", "Config error".red(), e);
            config::Config::default()
        }
    }
}

fn print_banner() {
    println!();
    println!("  {} {}", "Roomba".bold().cyan(), format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!("  Behavior-tree cleaning robot simulator");
    println!();
}
