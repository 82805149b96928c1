use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pulsemark_core::{
    Channel, ChannelScenario, Message, Outcome, Secret, Session, StreamEmbedder,
    VerificationResult, WatermarkConfig,
};

#[derive(Parser)]
#[command(name = "pulsemark", about = "Heart-rate watermarking tool", version)]
struct Cli {
    /// Log filter (e.g. warn, debug, pulsemark_core=trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// Shared secret passphrase
    #[arg(short, long, default_value = "pulsemark-default-secret")]
    secret: String,

    /// JSON configuration file; replaces the per-field flags below
    #[arg(long)]
    config: Option<PathBuf>,

    /// Samples per block (even)
    #[arg(long, default_value = "16")]
    block_len: usize,

    /// QIM quantization step
    #[arg(long, default_value = "2.0")]
    delta: f64,

    /// Maximum accepted bit error rate (percent)
    #[arg(long, default_value = "30.0")]
    threshold: f64,

    /// PSNR reference amplitude (bpm)
    #[arg(long, default_value = "200.0")]
    max_reference: f64,

    /// Robust rounding step for trend coefficients
    #[arg(long, default_value = "5.0")]
    quant_step: f64,

    /// PSNR reported for identical blocks (dB)
    #[arg(long, default_value = "100.0")]
    psnr_ceiling: f64,
}

impl ConfigArgs {
    fn load(&self) -> Result<(Secret, WatermarkConfig), Box<dyn std::error::Error>> {
        let secret = Secret::from_passphrase(&self.secret)?;
        let config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => WatermarkConfig {
                block_len: self.block_len,
                delta: self.delta,
                ber_threshold: self.threshold,
                max_reference: self.max_reference,
                quant_step: self.quant_step,
                psnr_ceiling: self.psnr_ceiling,
            },
        };
        config.validate()?;
        Ok((secret, config))
    }
}

#[derive(Subcommand)]
enum Command {
    /// Watermark a heart-rate series into secure block messages
    Embed {
        /// Input text file, one sample per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output file of JSON-lines messages
        #[arg(short, long)]
        output: PathBuf,

        /// Sequence number of the first block
        #[arg(long, default_value = "0")]
        first_sequence: u64,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Verify JSON-lines messages
    Verify {
        /// Input file of JSON-lines messages
        #[arg(short, long)]
        input: PathBuf,

        /// Print one JSON result per line instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Run a synthetic series through a simulated channel and verify it
    Simulate {
        /// Channel scenario
        #[arg(long, value_enum, default_value = "identity")]
        scenario: Scenario,

        /// Number of blocks to simulate
        #[arg(long, default_value = "20")]
        blocks: usize,

        /// RNG seed for the series and the channel
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Noise standard deviation (noise scenario)
        #[arg(long, default_value = "0.5")]
        noise_std: f64,

        /// Additive bias (offset scenario)
        #[arg(long, default_value = "30.0")]
        bias: f64,

        /// Secret used by the verifier in the wrong-secret scenario
        #[arg(long, default_value = "WRONG_KEY_123")]
        wrong_secret: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Scenario {
    Identity,
    Noise,
    Offset,
    WrongSecret,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Command::Embed {
            input,
            output,
            first_sequence,
            config,
        } => {
            let (secret, config) = config.load()?;
            let samples = read_samples(&input)?;
            info!(path = %input.display(), samples = samples.len(), "embedding");

            let mut embedder = StreamEmbedder::new(&secret, &config, first_sequence)?;
            let blocks = embedder.process(&samples)?;
            if embedder.pending() > 0 {
                warn!(
                    dropped = embedder.pending(),
                    block_len = config.block_len,
                    "trailing samples do not fill a block and were not embedded"
                );
            }

            let mut writer = BufWriter::new(fs::File::create(&output)?);
            for block in &blocks {
                writeln!(writer, "{}", Message::from(block.clone()).to_json()?)?;
            }
            writer.flush()?;

            eprintln!("{} blocks written to {}", blocks.len(), output.display());
        }
        Command::Verify {
            input,
            json,
            config,
        } => {
            let (secret, config) = config.load()?;
            let session = Session::new(secret, config);
            let reader = BufReader::new(fs::File::open(&input)?);

            let mut messages = Vec::new();
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match Message::from_json(&line) {
                    Ok(message) => messages.push(message),
                    Err(e) => warn!(line = line_no + 1, error = %e, "skipping malformed message"),
                }
            }

            let outcomes = session.handle_batch_parallel(&messages);
            let mut blocks = 0;
            let mut invalid = 0;
            for (message, outcome) in messages.iter().zip(outcomes) {
                match outcome {
                    Ok(Outcome::Live(value)) => {
                        if !json {
                            println!("live      {value:.1}");
                        }
                    }
                    Ok(Outcome::Verified(result)) => {
                        blocks += 1;
                        if !result.is_valid() {
                            invalid += 1;
                        }
                        if json {
                            println!("{}", serde_json::to_string(&result)?);
                        } else {
                            print_result(&result);
                        }
                    }
                    Err(e) => {
                        blocks += 1;
                        invalid += 1;
                        match message {
                            Message::Secure { sequence, .. } => eprintln!("block {sequence}: {e}"),
                            Message::Live { .. } => eprintln!("live message: {e}"),
                        }
                    }
                }
            }

            if invalid > 0 {
                eprintln!("{invalid} of {blocks} blocks failed verification.");
                std::process::exit(1);
            }
        }
        Command::Simulate {
            scenario,
            blocks,
            seed,
            noise_std,
            bias,
            wrong_secret,
            config,
        } => {
            let (secret, config) = config.load()?;
            let scenario = match scenario {
                Scenario::Identity => ChannelScenario::Identity,
                Scenario::Noise => ChannelScenario::GaussianNoise { std_dev: noise_std },
                Scenario::Offset => ChannelScenario::Offset { bias },
                Scenario::WrongSecret => ChannelScenario::WrongSecret,
            };

            let series = synthesize_heart_rate(blocks * config.block_len, seed);
            let mut embedder = StreamEmbedder::new(&secret, &config, 0)?;
            let session = Session::new(secret, config);
            let mut channel = Channel::new(seed, Secret::from_passphrase(&wrong_secret)?);

            eprintln!("Simulating {blocks} blocks through {scenario:?}...");
            let mut results = Vec::with_capacity(blocks);
            for block in embedder.process(&series)? {
                let message = Message::from(block);
                if let Outcome::Verified(result) =
                    session.handle_with_scenario(&message, &scenario, &mut channel)?
                {
                    print_result(&result);
                    results.push(result);
                }
            }

            let valid = results.iter().filter(|r| r.is_valid()).count();
            let mean_ber = if results.is_empty() {
                0.0
            } else {
                results.iter().map(|r| r.bit_error_rate).sum::<f64>() / results.len() as f64
            };
            println!("Summary");
            println!("  Valid:     {valid}/{}", results.len());
            println!("  Mean BER:  {mean_ber:.2}%");
        }
    }

    Ok(())
}

fn print_result(result: &VerificationResult) {
    println!(
        "block {:>6}  {:<7}  BER {:>6.2}%  MSE {:>9.4}  PSNR {:>6.2} dB",
        result.sequence,
        result.status,
        result.bit_error_rate,
        result.mean_squared_error,
        result.psnr
    );
}

/// Read one sample per line, skipping blank lines and `#` comments.
fn read_samples(path: &Path) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let mut samples = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value: f64 = line
            .parse()
            .map_err(|e| format!("{}:{}: {e}", path.display(), line_no + 1))?;
        samples.push(value);
    }
    Ok(samples)
}

/// Random-walk heart rate around 75 bpm, clamped to a plausible range.
fn synthesize_heart_rate(num_samples: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut hr = 75.0f64;
    (0..num_samples)
        .map(|_| {
            hr = (hr + rng.gen_range(-1.5..1.5)).clamp(50.0, 180.0);
            hr
        })
        .collect()
}
