use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use katha::api::{ApiServer, ApiState};
use katha::audio::{self, CpalBackend, PlaybackNotice};
use katha::narration::{self, Analyzer, GeminiClient, Synthesizer};
use katha::{Catalog, Config, Language, PlaybackHandle, Region};

/// Katha - regional folk stories, narrated
#[derive(Parser)]
#[command(name = "katha", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// List stories for a region
    Stories {
        #[arg(short, long)]
        region: Region,
        /// Only stories with this theme
        #[arg(short, long)]
        theme: Option<String>,
    },
    /// List themes offered for a region
    Themes {
        #[arg(short, long)]
        region: Region,
    },
    /// Expand a story, synthesize it and play it with interactive controls
    Narrate {
        /// Story id (see `katha stories`)
        story: String,
        /// Narration language (overrides config)
        #[arg(short, long)]
        language: Option<Language>,
    },
    /// Test speaker output
    TestSpeaker,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,katha=info",
        1 => "info,katha=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve { port } => serve(port).await,
        Command::Stories { region, theme } => list_stories(region, theme.as_deref()),
        Command::Themes { region } => list_themes(region),
        Command::Narrate { story, language } => narrate(&story, language).await,
        Command::TestSpeaker => test_speaker().await,
    }
}

/// Run the API server until interrupted
async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load();
    let port = port.unwrap_or(config.server.port);

    let catalog = Arc::new(Catalog::builtin()?);
    let playback = PlaybackHandle::spawn(CpalBackend)?;

    let (analyzer, synthesizer) = match GeminiClient::new(&config.gemini) {
        Ok(client) => {
            let client = Arc::new(client);
            (
                Some(client.clone() as Arc<dyn Analyzer>),
                Some(client as Arc<dyn Synthesizer>),
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "narration disabled");
            (None, None)
        }
    };

    let state = ApiState {
        catalog,
        analyzer,
        synthesizer,
        playback,
        language: config.language,
    };

    tokio::select! {
        result = ApiServer::new(state, port).run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

fn list_stories(region: Region, theme: Option<&str>) -> anyhow::Result<()> {
    let catalog = Catalog::builtin()?;
    let stories = catalog.stories_for(region, theme);

    if stories.is_empty() {
        println!("No {region} stories found");
        return Ok(());
    }

    for story in stories {
        println!("{:<28} {} ({}, {})", story.id, story.title, story.kind, story.era);
        println!("{:<28} {}", "", story.themes.join(", "));
    }

    Ok(())
}

fn list_themes(region: Region) -> anyhow::Result<()> {
    let catalog = Catalog::builtin()?;
    for theme in catalog.themes_for(region) {
        println!("{theme}");
    }
    Ok(())
}

/// Expand, synthesize and play a story
async fn narrate(story_id: &str, language: Option<Language>) -> anyhow::Result<()> {
    let config = Config::load();
    let language = language.unwrap_or(config.language);

    let catalog = Catalog::builtin()?;
    let story = catalog.find(story_id)?;
    let client = GeminiClient::new(&config.gemini)?;

    println!("Expanding \"{}\"...", story.title);
    let analysis = client.analyze(story).await?;

    println!("\n{}\n", analysis.full_narration);
    println!("Emotion:      {} ({}/10)", analysis.emotion, analysis.intensity);
    println!("Nuances:      {}", analysis.cultural_nuances.join(", "));
    println!("Context:      {}", analysis.historical_context);
    println!("Significance: {}", analysis.significance);

    println!("\nSynthesizing {language} narration...");
    let uri = narration::narrate_audio(&client, &analysis, language).await?;

    let playback = PlaybackHandle::spawn(CpalBackend)?;
    interactive(&playback, &uri).await
}

/// Drive playback from stdin: p pause/resume, s stop, r replay, q quit
async fn interactive(playback: &PlaybackHandle, payload: &str) -> anyhow::Result<()> {
    let mut status = playback.watch_status();
    let mut notices = playback.notices();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    report(playback.play(payload).await);
    println!("Controls: p pause/resume, s stop, r replay, q quit");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "p" => report(playback.pause_or_resume().await),
                    "s" => report(playback.stop().await),
                    "r" => report(playback.play(payload).await),
                    "q" => break,
                    "" => {}
                    other => println!("unknown command {other:?} (p, s, r, q)"),
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                println!("[{current}]");
            }
            Ok(PlaybackNotice::Failed { reason }) = notices.recv() => {
                eprintln!("Playback failed: {reason}");
            }
        }
    }

    playback.stop().await?;
    Ok(())
}

/// Print errors the failure notices don't already cover
fn report<T>(result: katha::Result<T>) {
    if let Err(e) = result {
        if !e.is_playback_failure() {
            eprintln!("Error: {e}");
        }
    }
}

/// Test speaker output with a sine wave
async fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let sample_rate = audio::PCM_SAMPLE_RATE;
    let frequency = 440.0_f32;
    let duration_secs = 2.0_f32;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let num_samples = (sample_rate as f32 * duration_secs) as usize;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3 // 30% volume
        })
        .collect();

    println!("Playing {} samples at {} Hz...", samples.len(), sample_rate);

    let playback = PlaybackHandle::spawn(CpalBackend)?;
    let mut status = playback.watch_status();
    playback.play(audio::encode(&samples)).await?;

    // Wait for natural completion
    while *status.borrow_and_update() != katha::PlaybackStatus::Idle {
        if status.changed().await.is_err() {
            break;
        }
    }

    println!("\n---");
    println!("If you heard the tone, your speakers are working!");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pactl list sinks short");
    println!("  3. Try: pavucontrol (to check output levels)");

    Ok(())
}
