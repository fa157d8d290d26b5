//! Interactive binaural session on the default output device
//!
//! Run with: cargo run --example session --features cpal_sink [config.yaml]
//!
//! Commands: `list`, `open <n | name>`, `slide <1-10>`, `mute`, `close`, `quit`

use std::io::BufRead;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use rtrb::RingBuffer;
use tracing::{info, warn};

use binaura::catalog::{self, CatalogEntry};
use binaura::{load_config, BinauralEngine, EngineConfig, MuteIcon, CATALOG};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "binaura=debug".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&PathBuf::from(path)),
        None => EngineConfig::default(),
    };
    let mut engine = BinauralEngine::with_default_output(config);

    // stdin blocks, so it gets its own thread and talks to us through a ring buffer
    let (mut commands, mut incoming) = RingBuffer::<String>::new(16);
    std::thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if commands.push(line).is_err() {
                    eprintln!("busy, command dropped");
                }
            }
        })?;

    print_catalog();

    loop {
        engine.pump();
        let underrun = engine
            .context()
            .backend()
            .and_then(|backend| backend.monitor())
            .map_or(false, |monitor| monitor.check_underrun());
        if underrun {
            warn!("output underrun");
        }

        while let Ok(line) = incoming.pop() {
            let mut words = line.split_whitespace();
            let command = words.next();
            let rest = words.collect::<Vec<_>>().join(" ");
            let arg = Some(rest.as_str()).filter(|rest| !rest.is_empty());
            match (command, arg) {
                (Some("list"), _) => print_catalog(),
                (Some("open"), Some(n)) => match lookup(n) {
                    Some(entry) => {
                        engine.open_entry(entry);
                        println!("{}: \"{}\"", entry.name, entry.phrase);
                        println!("{:?}", engine.session().frequencies());
                        if !engine.mute_enabled() {
                            println!("no audio output, sound disabled");
                        }
                    }
                    None => println!("no entry {}", n),
                },
                (Some("slide"), Some(v)) => match v.parse::<i32>() {
                    Ok(v) => {
                        let value = engine.slide(v);
                        let period = engine.slider().pulse_period();
                        info!(value, ?period, "beat offset");
                        println!("{:?}", engine.session().frequencies());
                    }
                    Err(_) => println!("not a number: {}", v),
                },
                (Some("mute"), _) => {
                    engine.toggle_mute();
                    match engine.mute_icon() {
                        MuteIcon::Muted => println!("[muted]"),
                        MuteIcon::Unmuted => println!("[sound on]"),
                    }
                }
                (Some("close"), _) => engine.close(),
                (Some("quit"), _) => return Ok(()),
                (None, _) => {}
                _ => println!("commands: list, open <n | name>, slide <v>, mute, close, quit"),
            }
        }

        sleep(Duration::from_micros(500));
    }
}

/// By index into the list, or by name
fn lookup(arg: &str) -> Option<&'static CatalogEntry> {
    match arg.parse::<usize>() {
        Ok(n) => CATALOG.get(n),
        Err(_) => catalog::find(arg),
    }
}

fn print_catalog() {
    for (n, entry) in CATALOG.iter().enumerate() {
        println!("{:>2}  {:<18} {:<18} {}", n, entry.name, entry.frequency, entry.geometry);
    }
}
