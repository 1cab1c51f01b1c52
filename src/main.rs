use std::process;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use duo_chat::chat::display::render_plain;
use duo_chat::chat::submit::now_millis;
use duo_chat::chat::{Submitter, Transcript};
use duo_chat::common::{Session, UserId};
use duo_chat::config::{self, AppConfig};
use duo_chat::service::ChatService;
use duo_chat::store::{SharedStore, StoreError, open_store};
use duo_chat::ui::DuoChatApp;

#[derive(Parser)]
#[command(
    name = "duo_chat",
    version,
    about = "Two-player chat over a live document store"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// SQLite file for the document store (overrides config and DUO_CHAT_DATABASE)
    #[arg(long, value_name = "FILE")]
    database: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Print the merged transcript of two users and exit
    Print {
        #[arg(long)]
        first: String,
        #[arg(long)]
        second: String,
    },
    /// Store one message for a user and exit
    Send {
        #[arg(long)]
        user: String,
        text: String,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config).with_overrides(cli.database.clone());

    if let Some(Mode::InitConfig) = cli.mode {
        if let Err(err) = config::save_config(&cli.config, &app_config) {
            log::error!("Failed to write config {}: {err}", cli.config);
            process::exit(1);
        }
        log::info!("Wrote config to {}", cli.config);
        return Ok(());
    }

    let store = match open_store(app_config.database_path.as_deref()) {
        Ok(store) => store,
        Err(err) => {
            log::error!("Failed to open document store: {err}");
            process::exit(1);
        }
    };

    let outcome = match cli.mode {
        Some(Mode::Print { first, second }) => {
            print_transcript(store, Session::new(first.into(), second.into())).await
        }
        Some(Mode::Send { user, text }) => send_once(store, user.into(), text).await,
        Some(Mode::InitConfig) => Ok(()),
        None => return run_ui(app_config, store),
    };

    if let Err(err) = outcome {
        log::error!("{err}");
        process::exit(1);
    }
    Ok(())
}

async fn print_transcript(store: SharedStore, session: Session) -> Result<(), StoreError> {
    let transcript = Transcript::spawn(&*store, &session)?;
    if let Some(messages) = transcript.loaded().await {
        print!("{}", render_plain(&messages, &session));
    }
    transcript.close().await;
    Ok(())
}

async fn send_once(store: SharedStore, user: UserId, text: String) -> Result<(), StoreError> {
    let timestamp = now_millis();
    Submitter::new(store)
        .write_message(&user, timestamp, &text)
        .await?;
    println!("{timestamp}");
    Ok(())
}

fn run_ui(app_config: AppConfig, store: SharedStore) -> Result<(), eframe::Error> {
    let session = Session::generate();
    log::info!(
        "Session participants: {} / {}",
        session.first,
        session.second
    );

    // UI -> chat service
    let (cmd_tx, cmd_rx) = mpsc::channel(app_config.command_buffer.max(1));
    tokio::spawn(ChatService::new(store.clone(), cmd_rx).run());

    let transcript = match Transcript::spawn(&*store, &session) {
        Ok(transcript) => transcript,
        Err(err) => {
            log::error!("Failed to subscribe to participant documents: {err}");
            process::exit(1);
        }
    };

    let runtime = Handle::current();
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        &app_config.window_title,
        options,
        Box::new(move |cc| {
            Ok(Box::new(DuoChatApp::new(
                cc, &runtime, session, cmd_tx, transcript,
            )))
        }),
    )
}
