//! Input Frequency CLI
//!
//! Background keyboard/mouse usage statistics monitor.

use clap::{Parser, Subcommand};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use input_frequency::{
    collector::{check_permission, Collector, FixedScreen},
    config::Config,
    core::{report, InputClassifier, SharedStats},
    persist, VERSION,
};

#[derive(Parser)]
#[command(name = "inputfreq")]
#[command(version = VERSION)]
#[command(about = "Background keyboard/mouse usage statistics monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring input events
    Start,

    /// Print the usage report from the saved statistics
    Report,

    /// Show current monitor status
    Status,

    /// Show configuration
    Config,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => cmd_start(),
        Commands::Report => cmd_report(),
        Commands::Status => cmd_status(),
        Commands::Config => cmd_config(),
    }
}

fn cmd_start() {
    println!("Input Frequency v{VERSION}");
    println!();

    if !check_permission() {
        eprintln!("Error: input monitoring permission not granted.");
        std::process::exit(1);
    }

    let config = Config::load().unwrap_or_default();
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: could not create directories: {e}");
    }

    let store_path = config.store_path();
    let stats: SharedStats = Arc::new(parking_lot::Mutex::new(persist::load_or_default(
        &store_path,
    )));
    {
        let runtime = stats.lock().runtime_minutes();
        if runtime > 0 {
            println!("Resuming statistics ({runtime} minutes recorded so far)");
        }
    }

    let mut collector = Collector::new();
    if let Err(e) = collector.start() {
        eprintln!("Error starting collector: {e}");
        std::process::exit(1);
    }

    println!("Saving every {}s to {:?}", config.save_interval.as_secs(), store_path);
    println!("Press Ctrl+C to stop");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    // Background flusher: the only thread that touches the disk. It clones
    // the store under the lock and writes outside it, so a slow disk never
    // stalls event delivery.
    let flusher = spawn_flusher(&config, stats.clone(), running.clone());

    let mut classifier = InputClassifier::new(Box::new(FixedScreen::new(
        config.screen.width,
        config.screen.height,
    )));

    // Main event loop: classify synchronously, count under the lock.
    let receiver = collector.receiver().clone();
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                let observations = classifier.process(&event);
                if !observations.is_empty() {
                    let mut store = stats.lock();
                    for observation in &observations {
                        store.apply(observation);
                    }
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                eprintln!("Collector disconnected unexpectedly");
                break;
            }
        }
    }

    println!();
    println!("Stopping...");
    collector.stop();
    running.store(false, Ordering::SeqCst);
    if flusher.join().is_err() {
        eprintln!("Warning: flusher thread panicked");
    }

    // Best-effort final flush; the periodic saves are the durability
    // guarantee.
    let snapshot = stats.lock().clone();
    if let Err(e) = persist::save(&store_path, &snapshot) {
        eprintln!("Warning: final save failed: {e}");
    }
    if let Err(e) = std::fs::write(
        config.report_path(),
        report::render_text(&snapshot.report()),
    ) {
        eprintln!("Warning: final report failed: {e}");
    }
    println!("Saved to {store_path:?}");
}

/// Spawn the periodic save/report thread. Every `save_interval` it accounts
/// elapsed runtime minutes and saves the store; every `report_every_saves`
/// saves it regenerates the report. I/O errors are logged and swallowed so
/// a transient disk issue never stops monitoring.
fn spawn_flusher(
    config: &Config,
    stats: SharedStats,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    let store_path = config.store_path();
    let report_path = config.report_path();
    let save_interval = config.save_interval;
    let report_every_saves = config.report_every_saves.max(1);

    thread::spawn(move || {
        let started = Instant::now();
        let mut minutes_counted: u64 = 0;
        let mut last_save = Instant::now();
        let mut saves: u32 = 0;

        while running.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(250));
            if last_save.elapsed() < save_interval {
                continue;
            }
            last_save = Instant::now();

            let snapshot = {
                let mut store = stats.lock();
                let total_minutes = started.elapsed().as_secs() / 60;
                store.count_minutes(total_minutes - minutes_counted);
                minutes_counted = total_minutes;
                store.clone()
            };

            if let Err(e) = persist::save(&store_path, &snapshot) {
                log::warn!("periodic save failed: {e}");
            }

            saves += 1;
            if saves % report_every_saves == 0 {
                let text = report::render_text(&snapshot.report());
                if let Err(e) = std::fs::write(&report_path, text) {
                    log::warn!("report generation failed: {e}");
                }
            }
        }

        // Account the tail of the session so the final save in the main
        // thread has up-to-date runtime.
        let total_minutes = started.elapsed().as_secs() / 60;
        stats.lock().count_minutes(total_minutes - minutes_counted);
    })
}

fn cmd_report() {
    let config = Config::load().unwrap_or_default();
    let store_path = config.store_path();
    if !store_path.exists() {
        println!("No statistics recorded yet at {store_path:?}");
        println!("Run 'inputfreq start' to begin monitoring.");
        return;
    }
    let store = persist::load_or_default(&store_path);
    print!("{}", report::render_text(&store.report()));
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Input Frequency Status");
    println!("======================");
    println!();

    let has_permission = check_permission();
    println!(
        "Input monitoring permission: {}",
        if has_permission { "granted" } else { "not granted" }
    );
    println!();

    println!("Configuration:");
    println!("  Store: {:?}", config.store_path());
    println!("  Report: {:?}", config.report_path());
    println!("  Save interval: {}s", config.save_interval.as_secs());
    println!(
        "  Report cadence: every {} saves",
        config.report_every_saves
    );
    println!();

    let store_path = config.store_path();
    if store_path.exists() {
        let store = persist::load_or_default(&store_path);
        let data = store.report();
        println!("Cumulative statistics:");
        println!("  Runtime: {} minutes", data.runtime_minutes);
        println!(
            "  Keyboard use: {:.0} seconds",
            data.keyboard_use_seconds
        );
        println!("  Mouse use: {:.0} seconds", data.mouse_use_seconds);
        println!("  Distinct keys: {}", data.keys.len());
        println!("  Distinct combos: {}", data.combos.len());
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
