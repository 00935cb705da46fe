//! Replay a scenario file into an occupancy map.
//!
//! Every stream in the scenario gets its own producer thread, modelling
//! independent sensors delivering scans concurrently. Scans are fed through a
//! bounded channel to a pool of integration workers that share one integrator
//! and one map. Once every stream is exhausted the map is pruned and a summary
//! is logged.
//!
//! Usage:
//!   cargo run --release --bin vastu_replay -- --scenario scenarios/corridor.yaml
//!   cargo run --release --bin vastu_replay -- -c configs/config.yaml -s run.yaml -w 4

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use crossbeam_channel::bounded;

use vastu_voxel::io::{MapStatistics, Scenario};
use vastu_voxel::{SensorInput, VoxelConfig};

/// Replay scan streams into a 3D occupancy map
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (defaults used if absent)
    #[arg(short, long, default_value = "configs/config.yaml")]
    config: PathBuf,

    /// Scenario file listing the scan streams
    #[arg(short, long)]
    scenario: PathBuf,

    /// Integration worker threads (0 = one per CPU)
    #[arg(short, long, default_value_t = 0)]
    workers: usize,
}

/// One scan in flight from a producer to the workers.
struct ScanMessage {
    stream: usize,
    index: usize,
    input: SensorInput,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("Replay failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = if args.config.exists() {
        VoxelConfig::load(&args.config)?
    } else {
        log::warn!(
            "Config {} not found, using defaults",
            args.config.display()
        );
        VoxelConfig::default()
    };

    let scenario = Scenario::load(&args.scenario)?;
    scenario.validate()?;
    log::info!(
        "Scenario '{}': {} streams, {} scans",
        scenario.name,
        scenario.streams.len(),
        scenario.num_scans()
    );

    let map = config.build_map()?;
    let integrator = config.build_integrator(map.clone())?;

    let workers = if args.workers == 0 {
        std::thread::available_parallelism().map_or(1, |n| n.get())
    } else {
        args.workers
    };
    log::info!("Integrating with {} workers", workers);

    let (tx, rx) = bounded::<ScanMessage>(workers * 2);
    let start = Instant::now();

    std::thread::scope(|s| {
        for (stream_id, stream) in scenario.streams.iter().enumerate() {
            let tx = tx.clone();
            s.spawn(move || {
                let inputs = match stream.sensor_inputs() {
                    Ok(inputs) => inputs,
                    Err(e) => {
                        log::error!("{}", e);
                        return;
                    }
                };
                for (index, input) in inputs.into_iter().enumerate() {
                    let message = ScanMessage {
                        stream: stream_id,
                        index,
                        input,
                    };
                    if tx.send(message).is_err() {
                        log::warn!("Stream '{}': workers gone, stopping", stream.name);
                        return;
                    }
                }
                log::debug!("Stream '{}' finished", stream.name);
            });
        }
        // Workers exit once every producer has dropped its sender.
        drop(tx);

        for _ in 0..workers {
            let rx = rx.clone();
            let integrator = &integrator;
            let scenario = &scenario;
            s.spawn(move || {
                for message in rx.iter() {
                    log::trace!(
                        "Integrating {} scan {} from '{}'",
                        message.input.modality(),
                        message.index,
                        scenario.streams[message.stream].name
                    );
                    integrator.integrate(&message.input);
                }
            });
        }
    });

    let elapsed = start.elapsed();
    log::info!(
        "Integrated {} scans in {:.2}s",
        scenario.num_scans(),
        elapsed.as_secs_f64()
    );

    map.prune();
    log::info!("Map: {}", MapStatistics::compute(map.as_ref()));
    Ok(())
}
