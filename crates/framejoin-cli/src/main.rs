//! framejoin CLI: run join instructions over frame files and convert fixtures.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use framejoin_codec::buf::{bounded_from_path, bounded_to_path};
use framejoin_codec::jsonl;
use framejoin_core::config::EngineConfig;
use framejoin_exec::{load_descriptor, Engine, RunReport};
use framejoin_operators::Operator;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "framejoin")]
#[command(about = "Streaming hash equi-join over length-prefixed row frames", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an instruction: build from one frame file, probe with another
    Run {
        /// Path to the instruction descriptor (JSON or YAML)
        #[arg(short, long)]
        descriptor: PathBuf,

        /// Frame file that populates the hash table
        #[arg(long)]
        build: PathBuf,

        /// Frame file streamed against the table
        #[arg(long)]
        probe: PathBuf,

        /// Where joined frames are written
        #[arg(short, long)]
        output: PathBuf,

        /// Largest accepted frame payload (overrides config)
        #[arg(long)]
        max_frame_bytes: Option<usize>,

        /// Also write the run report as JSON to this path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Exit non-zero if either phase stopped on an error
        #[arg(long)]
        strict: bool,
    },

    /// Check that a descriptor parses and names a known instruction
    Validate {
        #[arg(short, long)]
        descriptor: PathBuf,
    },

    /// Convert NDJSON rows (one JSON array per line) to a frame file
    Encode {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print a frame file as NDJSON rows
    Dump {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            descriptor,
            build,
            probe,
            output,
            max_frame_bytes,
            report,
            strict,
        } => {
            let opts = RunOptions {
                max_frame_bytes,
                report,
                strict,
            };
            match run_instruction(&descriptor, build, probe, &output, &opts) {
                Ok(degraded) if degraded && strict => {
                    eprintln!("Error: run finished with phase errors (--strict)");
                    std::process::exit(2);
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Validate { descriptor } => {
            match validate_descriptor(&descriptor) {
                Ok(name) => println!("✓ {} descriptor is valid", name),
                Err(e) => {
                    eprintln!("Validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Encode { input, output } => {
            if let Err(e) = encode_rows(&input, &output) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Dump { input } => {
            if let Err(e) = dump_rows(&input) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Log to stderr so stdout stays clean for reports and dumps. `RUST_LOG`
/// wins; otherwise only warnings (degraded runs) are shown.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

struct RunOptions {
    max_frame_bytes: Option<usize>,
    report: Option<PathBuf>,
    strict: bool,
}

fn engine_config(max_frame_bytes: Option<usize>) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(max) = max_frame_bytes {
        config.max_frame_bytes = max;
    }
    config
}

/// Returns whether the run was degraded.
fn run_instruction(
    descriptor_path: &Path,
    build: PathBuf,
    probe: PathBuf,
    output: &Path,
    opts: &RunOptions,
) -> Result<bool, Box<dyn std::error::Error>> {
    let desc = load_descriptor(descriptor_path)?;
    let engine = Engine::new(engine_config(opts.max_frame_bytes))?;
    tracing::debug!(strict = opts.strict, "running {}", desc.name());

    let report: RunReport = engine.run_files(&desc, &[build, probe], output)?;

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &opts.report {
        fs::write(path, &json)?;
    }
    println!("{}", json);

    Ok(report.stats.is_degraded())
}

fn validate_descriptor(descriptor_path: &Path) -> Result<&'static str, Box<dyn std::error::Error>> {
    let desc = load_descriptor(descriptor_path)?;
    let engine = Engine::new(EngineConfig::from_env())?;
    let inst = engine.instantiate(&desc)?;
    Ok(inst.name())
}

fn encode_rows(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env();
    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::with_capacity(
            config.read_buffer_bytes,
            fs::File::open(input)?,
        ))
    };
    let writer = bounded_to_path(output, config.write_buffer_bytes)?;
    let rows = jsonl::encode_lines(reader, writer)?;
    tracing::info!(rows, output = %output.display(), "encoded rows");
    Ok(())
}

fn dump_rows(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env();
    let reader = bounded_from_path(input, config.read_buffer_bytes)?;
    let stdout = io::stdout();
    jsonl::dump_frames(reader, config.max_frame_bytes, stdout.lock())?;
    Ok(())
}
