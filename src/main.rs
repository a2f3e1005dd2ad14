use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nthprime::{PrimeCache, index_from_signed};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "nthprime")]
#[command(about = "Find primes by index with a cached parallel segmented sieve", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Number of worker threads per sieve round (defaults to CPU count)"
    )]
    workers: Option<NonZeroUsize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print the prime at each 0-indexed position, sharing one cache")]
    Nth {
        #[arg(
            required = true,
            allow_negative_numbers = true,
            help = "Prime indices (0 is 2)"
        )]
        indices: Vec<i64>,
        #[arg(short, long, help = "Print the time taken by each query")]
        timing: bool,
    },
    #[command(about = "Print every prime up to a given limit")]
    Upto {
        #[arg(help = "The upper limit (inclusive)")]
        limit: u64,
    },
    #[command(about = "Count the primes up to a given limit")]
    Count {
        #[arg(help = "The upper limit (inclusive)")]
        limit: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let cli = Cli::parse();
    let mut cache = match cli.workers {
        Some(workers) => PrimeCache::with_workers(workers),
        None => PrimeCache::new(),
    };
    info!(workers = cache.workers().get(), "prime table ready");

    match cli.command {
        Commands::Nth { indices, timing } => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for index in indices {
                let start = Instant::now();
                let n = index_from_signed(index)?;
                let prime = cache
                    .nth_prime(n)
                    .with_context(|| format!("finding prime at index {n}"))?;
                let duration_us = start.elapsed().as_micros();

                if timing {
                    writeln!(
                        out,
                        "{}\t{}\t{}us ({:.2}ms)",
                        n,
                        prime,
                        duration_us,
                        duration_us as f64 / 1000.0
                    )?;
                } else {
                    writeln!(out, "{}\t{}", n, prime)?;
                }
            }
        }
        Commands::Upto { limit } => {
            let primes = cache
                .primes_up_to(limit)
                .with_context(|| format!("sieving up to {limit}"))?;

            let stdout = io::stdout();
            let mut writer = BufWriter::with_capacity(256 * 1024, stdout.lock());
            let mut itoa_buf = itoa::Buffer::new();
            for &prime in primes {
                writer.write_all(itoa_buf.format(prime).as_bytes())?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        Commands::Count { limit } => {
            let start = Instant::now();
            let count = cache
                .count_up_to(limit)
                .with_context(|| format!("sieving up to {limit}"))?;
            info!(limit, count, elapsed_us = start.elapsed().as_micros() as u64, "counted primes");
            println!("{}", count);
        }
    }

    Ok(())
}
