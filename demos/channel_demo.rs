use spinwheel::{Easing, Sector, Wheel, WheelCommand, WheelConfig, WheelEvent};

use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

// Lunch roulette: a worker thread decides the outcome first (weighted pick),
// then asks the wheel to reveal it. The wheel never chooses.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let sectors = vec![
        Sector::new("Pho", "soup"),
        Sector::new("Burrito", "heavy"),
        Sector::new("Ramen", "soup"),
        Sector::new("Pizza", "heavy"),
        Sector::new("Salad", "light"),
        Sector::new("Sushi", "light"),
    ];
    let weights = [3.0, 1.0, 3.0, 1.0, 2.0, 2.0];

    let config = WheelConfig::builder()
        .title("Lunch Roulette".to_string())
        .spin_duration(Duration::from_millis(4500))
        .easing(Easing::CubicOut)
        .build();

    let (command_tx, command_rx) = mpsc::channel();
    let (event_tx, event_rx) = mpsc::channel();

    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let total: f64 = weights.iter().sum();
            let mut roll = rng.random_range(0.0..total);
            let mut target_index = weights.len() - 1;
            for (index, weight) in weights.iter().enumerate() {
                if roll < *weight {
                    target_index = index;
                    break;
                }
                roll -= *weight;
            }
            if command_tx
                .send(WheelCommand::Spin { target_index })
                .is_err()
            {
                break;
            }
            thread::sleep(Duration::from_secs(8));
        }
    });

    thread::spawn(move || {
        for event in event_rx {
            match event {
                WheelEvent::Settled { index, label } => {
                    println!("lunch is decided: {label} (sector {index})");
                }
            }
        }
    });

    let wheel = Wheel::new(config, sectors)?;
    wheel.show_with_channels(command_rx, event_tx)?;
    Ok(())
}
