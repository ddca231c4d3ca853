use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use oxi_lib::{
    io::{csv as csv_io, read_samples, text as text_io},
    synth::SyntheticPpg,
    ProcessorConfig, RecordedSample, VitalsMonitor,
};
use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(
    name = "oxi",
    version,
    about = "OXI: heart rate and SpO2 from PPG sample streams"
)]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic PPG recording as CSV (timestamp,ir,red)
    Simulate {
        #[arg(long, default_value_t = 50)]
        fs: u32,
        #[arg(long, default_value_t = 72.0)]
        bpm: f64,
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,
        #[arg(long, default_value_t = 0.02)]
        ir_ratio: f64,
        #[arg(long, default_value_t = 0.02)]
        red_ratio: f64,
        /// Uniform noise amplitude in ADC units
        #[arg(long, default_value_t = 0.0)]
        noise: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replay a recording (text pairs or CSV) and print JSON readings
    Replay {
        #[arg(long, default_value_t = 50)]
        fs: u32,
        /// Recording to read; stdin (text pairs) when omitted
        #[arg(long)]
        input: Option<PathBuf>,
        /// TOML processor configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Emit a reading every this many seconds of signal
        #[arg(long, default_value_t = 1.0)]
        every_s: f64,
    },
    /// Print the default processor configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    match cli.command {
        Commands::Simulate {
            fs,
            bpm,
            seconds,
            ir_ratio,
            red_ratio,
            noise,
            seed,
            out,
        } => {
            let synth = SyntheticPpg {
                ir_ac_ratio: ir_ratio,
                red_ac_ratio: red_ratio,
                noise,
                seed,
                ..SyntheticPpg::new(fs, bpm)
            };
            cmd_simulate(&synth, seconds, out.as_deref())?
        }
        Commands::Replay {
            fs,
            input,
            config,
            every_s,
        } => cmd_replay(fs, input.as_deref(), config.as_deref(), every_s)?,
        Commands::Config => cmd_config()?,
    }
    Ok(())
}

fn read_recording(input: Option<&Path>) -> Result<Vec<RecordedSample>> {
    match input {
        Some(path) => read_samples(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            text_io::parse_sample_pairs(&buf)
        }
    }
}

fn cmd_simulate(synth: &SyntheticPpg, seconds: f64, out: Option<&Path>) -> Result<()> {
    let recording = synth.recording(seconds);
    info!(
        "simulated {} samples ({:.1} s) at {} Hz ({} bpm)",
        recording.len(),
        recording.duration(),
        recording.fs,
        synth.bpm
    );
    match out {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            csv_io::write_samples_csv(BufWriter::new(file), &recording.samples)
        }
        None => csv_io::write_samples_csv(io::stdout().lock(), &recording.samples),
    }
}

fn cmd_replay(
    fs: u32,
    input: Option<&Path>,
    config: Option<&Path>,
    every_s: f64,
) -> Result<()> {
    let cfg = match config {
        Some(path) => ProcessorConfig::load(path)?,
        None => ProcessorConfig::default(),
    };
    let samples = read_recording(input)?;
    let mut monitor = VitalsMonitor::with_config(fs, cfg)?;
    let period = ((every_s * fs as f64).round() as u64).max(1);
    info!(
        "replaying {} samples at {} Hz, reporting every {} samples",
        samples.len(),
        fs,
        period
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut printed_last = false;
    for sample in &samples {
        monitor.add_recorded(sample);
        printed_last = monitor.samples() % period == 0;
        if printed_last {
            writeln!(out, "{}", serde_json::to_string(&monitor.reading())?)?;
        }
    }
    if !printed_last {
        writeln!(out, "{}", serde_json::to_string(&monitor.reading())?)?;
    }
    if !monitor.reading().present {
        warn!("no finger detected at end of recording");
    }
    Ok(())
}

fn cmd_config() -> Result<()> {
    print!("{}", ProcessorConfig::default().to_toml_string()?);
    Ok(())
}
