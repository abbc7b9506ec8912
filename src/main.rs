use std::env;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use rand::Rng;
use spinwheel::{Sector, Wheel, WheelCommand, WheelConfig, WheelEvent};

const DEFAULT_LABELS: &str =
    "Free Coffee:win,Try Again:lose,Gift Card:win,Nothing:lose,Jackpot:win,Spin Again:lose";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Parse --labels, --weights, --duration-ms, --turns, --title, --font
    let mut labels_arg = DEFAULT_LABELS.to_string();
    let mut weights_arg = String::new();
    let mut duration_ms: u64 = 6000;
    let mut turns: u32 = 4;
    let mut window_title = "Wheel of Fate".to_string();
    let mut font_path: Option<String> = None;

    let mut args = env::args().peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--labels" => {
                if let Some(v) = args.next() {
                    labels_arg = v;
                }
            }
            "--weights" => {
                if let Some(v) = args.next() {
                    weights_arg = v;
                }
            }
            "--duration-ms" => {
                if let Some(v) = args.next() {
                    if let Ok(v) = v.parse() {
                        duration_ms = v;
                    }
                }
            }
            "--turns" => {
                if let Some(v) = args.next() {
                    if let Ok(v) = v.parse() {
                        turns = v;
                    }
                }
            }
            "--title" => {
                if let Some(v) = args.next() {
                    window_title = v;
                }
            }
            "--font" => {
                font_path = args.next();
            }
            _ => {}
        }
    }

    // "label:category" entries; a bare label lands in the "plain" category
    let sectors: Vec<Sector> = labels_arg
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((label, category)) => Sector::new(label.trim(), category.trim()),
            None => Sector::new(entry.trim(), "plain"),
        })
        .collect();

    let mut weights: Vec<f64> = weights_arg
        .split(',')
        .filter_map(|w| w.trim().parse().ok())
        .collect();
    if weights.len() != sectors.len() {
        if !weights_arg.is_empty() {
            log::warn!(
                "--weights gave {} values for {} sectors; using uniform weights",
                weights.len(),
                sectors.len()
            );
        }
        weights = vec![1.0; sectors.len()];
    }

    let font_data = match &font_path {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };

    let builder = WheelConfig::builder()
        .title(window_title)
        .spin_duration(Duration::from_millis(duration_ms))
        .min_full_turns(turns);
    let config = match font_data {
        Some(bytes) => builder.font_data(bytes).build(),
        None => builder.build(),
    };

    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();

    // The weighted selection policy stays outside the core; the wheel only
    // ever reveals an index it is handed.
    {
        let command_tx = command_tx.clone();
        let weights = weights.clone();
        let sector_count = sectors.len();
        thread::spawn(move || {
            let mut rng = rand::rng();
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let line = line.trim().to_ascii_lowercase();
                let command = if line.is_empty() || line == "spin" {
                    Some(WheelCommand::Spin {
                        target_index: weighted_pick(&mut rng, &weights),
                    })
                } else if line == "cancel" {
                    Some(WheelCommand::Cancel)
                } else if let Ok(target_index) = line.parse::<usize>() {
                    Some(WheelCommand::Spin { target_index })
                } else {
                    log::warn!(
                        "unrecognized input {line:?}; want 'spin', 'cancel', or an index in 0..{sector_count}"
                    );
                    None
                };
                if let Some(command) = command {
                    if command_tx.send(command).is_err() {
                        break;
                    }
                }
            }
        });
    }

    thread::spawn(move || {
        for event in event_rx {
            match event {
                WheelEvent::Settled { index, label } => {
                    log::info!("wheel settled on sector {index}: {label}");
                }
            }
        }
    });

    // One opening spin so the window comes up alive
    {
        let mut rng = rand::rng();
        let target_index = weighted_pick(&mut rng, &weights);
        let _ = command_tx.send(WheelCommand::Spin { target_index });
    }

    log::info!("press enter or type 'spin' to spin; a sector index forces that outcome");

    let wheel = Wheel::new(config, sectors)?;
    wheel.show_with_channels(command_rx, event_tx)?;
    Ok(())
}

/// Weighted random pick over sector indices. This is the demo's stand-in for
/// whatever external policy decides outcomes in a real integration.
fn weighted_pick(rng: &mut impl Rng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 || weights.is_empty() {
        return 0;
    }
    let mut roll = rng.random_range(0.0..total);
    for (index, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        if roll < *weight {
            return index;
        }
        roll -= *weight;
    }
    weights.len() - 1
}
