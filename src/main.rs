use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vidsum::config::Config;
use vidsum::pipeline::{Pipeline, PipelineResult};

#[derive(Parser)]
#[command(name = "vidsum")]
#[command(version, about = "Video summarization, captioning and smart editing")]
#[command(
    long_about = "Produce derivative artifacts from a video file or YouTube link: \
                  SRT captions, a keyframe summary video, a narrated highlight video, \
                  or a filler-trimming smart edit."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory for output artifacts
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Disable progress spinners
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate SRT captions for a video
    Caption {
        /// Input video file or YouTube URL/id
        input: String,
    },
    /// Produce a keyframe-reduced summary video
    Keyframes {
        /// Input video file or YouTube URL/id
        input: String,
    },
    /// Trim filler content while keeping the original audio
    SmartEdit {
        /// Input video file or YouTube URL/id
        input: String,
    },
    /// Produce an AI-narrated highlight video
    Narrate {
        /// Input video file or YouTube URL/id
        input: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn print_result(result: &PipelineResult) {
    println!();
    if result.success {
        if let Some(ref artifact) = result.artifact {
            println!("Artifact: {}", artifact.display());
        }
        if !result.descriptive_text.is_empty() {
            println!();
            println!("{}", result.descriptive_text);
        }
    } else {
        println!(
            "Error: {}",
            result.error.as_deref().unwrap_or("unknown failure")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    if let Command::Narrate { .. } = cli.command {
        config
            .validate_for_narration()
            .context("Configuration validation failed")?;
    }

    info!("Output directory: {}", cli.output_dir.display());

    let pipeline = Pipeline::new(config, cli.output_dir).show_progress(!cli.no_progress);

    let result = match &cli.command {
        Command::Caption { input } => pipeline.caption(input).await,
        Command::Keyframes { input } => pipeline.keyframes(input).await,
        Command::SmartEdit { input } => pipeline.smart_edit(input).await,
        Command::Narrate { input } => pipeline.narrate(input).await,
    };

    print_result(&result);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
