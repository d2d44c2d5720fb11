use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ecg_assistant::{
    ArrhythmiaLabel, ChatOutcome, Config, DiagnosisOutcome, HttpRequestClient,
    OrchestrationController, Pose, PresentationEvent, ResponseMapper, Signal, Speaker,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ecg-assistant", about = "Diagnosis and chat client for the ECG service")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, default_value = "config/ecg-assistant")]
    config: String,

    /// Override backend.base_url
    #[arg(long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the service is up and its model is loaded
    Health,
    /// Classify one heartbeat from an MIT-BIH CSV file
    Diagnose {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 0)]
        row: usize,
    },
    /// Send one chat message
    Chat { message: Vec<String> },
    /// Interactive session: place, diagnose [row], chat <text>, reset, status, quit
    Repl {
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;
    if let Some(backend) = cli.backend {
        cfg.backend.base_url = backend;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Backend: {}", cfg.backend.base_url);

    let client = HttpRequestClient::new(&cfg.backend.base_url, cfg.request_timeout())?;

    match cli.command {
        Command::Health => {
            let health = client.health().await?;
            println!(
                "status={} model_loaded={} ready={}",
                health.status,
                health.model_loaded,
                health.is_ready()
            );
        }
        Command::Diagnose { csv, row } => {
            let (signal, annotated) = load_signal(&csv, row, cfg.signal.length).await?;
            let (controller, events) = start_session(&cfg, client);
            let printer = spawn_printer(events);

            controller.on_object_placement_detected(Pose::default()).await;
            let Some(handle) = controller.on_diagnose_requested(signal).await else {
                bail!("Diagnosis was not accepted");
            };

            match handle.await.context("Diagnosis task panicked")? {
                DiagnosisOutcome::Applied(command) => {
                    println!("annotated={} animation={:?}", annotated, command.clip)
                }
                DiagnosisOutcome::Failed(e) => println!("diagnosis failed: {}", e),
                DiagnosisOutcome::Superseded => println!("diagnosis superseded"),
            }

            drop(controller);
            printer.await.ok();
        }
        Command::Chat { message } => {
            let (controller, events) = start_session(&cfg, client);
            let printer = spawn_printer(events);

            let Some(handle) = controller.on_chat_submitted(&message.join(" ")).await else {
                bail!("Message is empty");
            };
            if let ChatOutcome::Failed { error, .. } = handle.await.context("Chat task panicked")? {
                warn!("Chat failed: {}", error);
            }

            drop(controller);
            printer.await.ok();
        }
        Command::Repl { csv } => {
            let (controller, events) = start_session(&cfg, client);
            let printer = spawn_printer(events);

            repl(&controller, csv, cfg.signal.length).await?;

            drop(controller);
            printer.await.ok();
        }
    }

    Ok(())
}

async fn repl(
    controller: &OrchestrationController,
    csv: Option<PathBuf>,
    signal_length: usize,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    println!("commands: place | diagnose [row] | chat <text> | reset | status | quit");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        in_flight.retain(|handle| !handle.is_finished());

        match command {
            "" => {}
            "place" => {
                if !controller.on_object_placement_detected(Pose::default()).await {
                    println!("object already placed");
                }
            }
            "diagnose" => {
                let Some(path) = csv.as_ref() else {
                    println!("start the repl with --csv to diagnose");
                    continue;
                };
                let row = match rest.trim() {
                    "" => 0,
                    arg => match arg.parse::<usize>() {
                        Ok(row) => row,
                        Err(_) => {
                            println!("usage: diagnose [row], row must be a non-negative integer");
                            continue;
                        }
                    },
                };
                let signal = match load_signal(path, row, signal_length).await {
                    Ok((signal, _)) => signal,
                    Err(e) => {
                        println!("{:#}", e);
                        continue;
                    }
                };
                match controller.on_diagnose_requested(signal).await {
                    Some(handle) => in_flight.push(tokio::spawn(async move {
                        handle.await.ok();
                    })),
                    None => println!(
                        "diagnosis not available in state {:?}",
                        controller.state().await
                    ),
                }
            }
            "chat" => match controller.on_chat_submitted(rest).await {
                Some(handle) => in_flight.push(tokio::spawn(async move {
                    handle.await.ok();
                })),
                None => println!("message is empty"),
            },
            "reset" => controller.on_reset().await,
            "status" => {
                let stats = controller.stats().await;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
            "quit" | "exit" => break,
            other => println!("unknown command: {}", other),
        }
    }

    futures::future::join_all(in_flight).await;
    Ok(())
}

async fn load_signal(path: &Path, row: usize, len: usize) -> Result<(Signal, ArrhythmiaLabel)> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let line = contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .nth(row)
        .with_context(|| format!("{} has no row {}", path.display(), row))?;

    Signal::from_csv_row(line, len).with_context(|| format!("Invalid row {}", row))
}

fn start_session(
    cfg: &Config,
    client: HttpRequestClient,
) -> (OrchestrationController, mpsc::Receiver<PresentationEvent>) {
    OrchestrationController::new(cfg.session_config(), Arc::new(client), ResponseMapper::new())
}

fn spawn_printer(mut events: mpsc::Receiver<PresentationEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PresentationEvent::RevealAffordances => println!("[scene] object placed"),
                PresentationEvent::Animate(command) => match command.warning {
                    Some(warning) => println!("[scene] {:?} ({})", command.clip, warning),
                    None => println!("[scene] {:?}", command.clip),
                },
                PresentationEvent::DiagnosisAvailable(result) => println!(
                    "[diagnosis] {} (confidence {:.2})",
                    result.label, result.confidence
                ),
                PresentationEvent::Notice(notice) => println!("[notice] {}", notice.message),
                PresentationEvent::TranscriptAppended(turn) => match turn.speaker {
                    Speaker::User => println!("you: {}", turn.text),
                    Speaker::Agent => println!("agent: {}", turn.text),
                },
                PresentationEvent::SessionReset => println!("[scene] cleared"),
            }
        }
    })
}
