use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use average::Estimate;
use clap::Parser;

use uniproc_model::{ConsoleReporter, Reporter, Sim, Workload, WorkloadError};

/// Discrete-time simulation of one processor scheduling processes that
/// arrive over time, block on IO mid-run, and complete.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Process definition file: `pid arrival required [trigger:duration ...]` per line
    #[arg(default_value = "./procList.txt")]
    file: PathBuf,

    /// Milliseconds to sleep between ticks (eases reading the trace)
    #[arg(default_value_t = 50)]
    sleep_ms: u64,

    /// Ignore FILE and generate a random workload spanning this many arrival ticks
    #[arg(long, value_name = "TICKS")]
    synthetic: Option<u64>,

    /// Seed for --synthetic
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let workload = match load(&cli) {
        Ok(workload) => workload,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut sim = Sim::new(workload, ConsoleReporter);
    while !sim.finished() {
        sim.step();
        if cli.sleep_ms > 0 {
            thread::sleep(Duration::from_millis(cli.sleep_ms));
        }
    }

    summarize(&sim);
}

fn load(cli: &Cli) -> Result<Workload, WorkloadError> {
    match cli.synthetic {
        Some(ticks) => Ok(Workload::synthetic(ticks, 0.3, 0.5, cli.seed)),
        None => Workload::from_path(&cli.file),
    }
}

fn summarize<R: Reporter>(sim: &Sim<R>) {
    let procs = sim.procs();
    if procs.is_empty() {
        return;
    }

    let response = procs
        .iter()
        .map(|p| (p.first_run_time.unwrap() - p.arrival_time) as f64);
    let turnaround = procs
        .iter()
        .map(|p| (p.completion_time.unwrap() - p.arrival_time) as f64);

    println!();
    println!("Makespan: {} ticks", sim.core.now());
    println!("Average response time: {:.2} ticks", avg(response));
    println!("Average turnaround time: {:.2} ticks", avg(turnaround));
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}
