//! Loop Shot - native demo runner
//!
//! Usage: `loop-shot [settings.json] [seed]`

use std::path::PathBuf;
use std::process::ExitCode;

use loop_shot::Settings;
use loop_shot::demo::{self, DemoConfig};

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Loop Shot (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(PathBuf::from);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed: {e}");
            return ExitCode::FAILURE;
        }
        None => DemoConfig::default().seed,
    };

    let settings = match Settings::load_or_default(settings_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = DemoConfig {
        seed,
        ..Default::default()
    };

    let summary = match demo::run(&settings, &config) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    println!("\nSession summary (seed {seed}, {} ticks)", summary.ticks);
    println!("  shots fired      {}", summary.shots);
    println!("  shots refused    {}", summary.refusals);
    println!("  hits / damage    {} / {}", summary.hits, summary.total_damage);
    println!("  bullets returned {}", summary.disposals);
    println!("  slots released   {}", summary.slots_released);
    println!("  upgrades         {}", summary.upgrades);
    println!("  still in flight  {}", summary.in_flight);
    let slots: String = summary
        .availability
        .iter()
        .map(|free| if *free { 'o' } else { '.' })
        .collect();
    println!("  slots            [{slots}]");
    for entry in &summary.hud {
        let state = if entry.available { "ready" } else { "out" };
        println!(
            "    {:<8} #{} {:<10} {state}",
            format!("{:?}", entry.emphasis),
            entry.index,
            entry.bullet
        );
    }

    ExitCode::SUCCESS
}
