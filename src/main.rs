use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use watermark_tone::{decide, error::parse_scale_factor, DecisionConfig, ToneError};

#[derive(Debug, Parser)]
#[clap(
    name = "watermark-tone",
    version,
    about = "Decide whether a watermark over the bottom of an image should be white or black"
)]
struct Args {
    /// Path to the image to inspect (any format the decoder supports).
    #[clap(value_name = "RUTA_IMAGEN")]
    image: PathBuf,

    /// Relative size of the watermark; the analysed region is twice this
    /// fraction of the image height and width.
    #[clap(value_name = "FACTOR_ESCALA", allow_hyphen_values = true)]
    scale_factor: String,

    /// Trailing arguments are accepted and ignored
    #[clap(value_name = "IGNORED", hide = true)]
    extra: Vec<String>,

    /// JSON file overriding the decision thresholds
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full analysis as JSON instead of `<decision> <brightness>`
    #[clap(long)]
    json: bool,
}

fn main() -> ExitCode {
    init_logging();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return handle_parse_error(err),
    };

    match run(&args) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            if let Some(tone_err) = err.downcast_ref::<ToneError>() {
                tracing::debug!("{:?}", tone_err);
                println!("{tone_err}");
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String> {
    if !args.extra.is_empty() {
        tracing::debug!("Ignoring extra arguments: {:?}", args.extra);
    }

    let scale_factor = parse_scale_factor(&args.scale_factor)?;

    let config = match &args.config {
        Some(path) => DecisionConfig::load(path)?,
        None => DecisionConfig::default(),
    };

    let analysis = decide(&args.image, scale_factor, &config)?;

    if args.json {
        Ok(serde_json::to_string(&analysis)?)
    } else {
        Ok(analysis.summary())
    }
}

fn handle_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        ErrorKind::MissingRequiredArgument => {
            println!("{}", ToneError::Usage);
        }
        _ => {
            // Best effort: clap already formats its own message
            let _ = err.print();
            println!("{}", ToneError::Usage);
        }
    }
    ExitCode::FAILURE
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("watermark_tone=warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
