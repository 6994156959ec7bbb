use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use base64::Engine;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use anusarth::config::Config;
use anusarth::history::ChatHistory;
use anusarth::models::DocumentAttachment;
use anusarth::providers::{create_provider, GoogleAiProvider, OpenRouterProvider, ProviderId};
use anusarth::services::{personalized_prompt, ChatService, StudentProfile};

#[derive(Debug, Parser)]
#[command(name = "anusarth", about = "Terminal client for the Anusarth study assistant")]
struct Args {
    /// Upstream provider: openrouter or googleai
    #[arg(long)]
    provider: Option<String>,

    /// Model identifier; defaults to the provider's standard model
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load();

    let provider_id: ProviderId = match args.provider.as_deref() {
        Some(value) => value.parse().map_err(anyhow::Error::msg)?,
        None => config.provider.unwrap_or(ProviderId::OpenRouter),
    };
    let model = args
        .model
        .or_else(|| config.model.clone())
        .unwrap_or_else(|| provider_id.default_model().to_string());

    let api_key = config.api_key_for(provider_id);
    let key_ok = match provider_id {
        ProviderId::OpenRouter => OpenRouterProvider::validate_api_key(&api_key),
        ProviderId::GoogleAi => GoogleAiProvider::validate_api_key(&api_key),
    };
    if !key_ok {
        bail!(
            "No usable API key for {}; set it in {} or the environment",
            provider_id.as_str(),
            Config::config_path().display()
        );
    }

    let profile = config.student.clone().unwrap_or_default();
    let provider = create_provider(provider_id, api_key);
    let mut service = ChatService::new(
        provider,
        ChatHistory::new(),
        model.clone(),
        personalized_prompt(&profile),
    );

    println!("Anusarth — {} / {}", provider_id.as_str(), model);
    println!("Type a message, or /help for commands.\n");
    greet(&profile);

    run_repl(&mut service).await
}

fn greet(profile: &StudentProfile) {
    if let Some(name) = &profile.name {
        println!("Welcome back, {}!\n", name);
    }
}

async fn run_repl(service: &mut ChatService) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut pending_images: Vec<String> = Vec::new();
    let mut pending_documents: Vec<DocumentAttachment> = Vec::new();

    loop {
        let line = match rl.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        if let Some(command) = line.strip_prefix('/') {
            match run_command(service, command, &mut pending_images, &mut pending_documents) {
                Ok(true) => break,
                Ok(false) => continue,
                Err(e) => {
                    eprintln!("error: {:#}", e);
                    continue;
                }
            }
        }

        let images = std::mem::take(&mut pending_images);
        let documents = std::mem::take(&mut pending_documents);
        match service.send_message(line, images, documents).await {
            Ok(reply) => println!("\nanusarth> {}\n", reply),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}

/// Handle a slash command. Returns `true` when the REPL should exit.
fn run_command(
    service: &mut ChatService,
    command: &str,
    pending_images: &mut Vec<String>,
    pending_documents: &mut Vec<DocumentAttachment>,
) -> Result<bool> {
    let (name, rest) = match command.split_once(' ') {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return Ok(true),
        "help" => {
            println!("/new              start a new conversation");
            println!("/sessions         list stored conversations");
            println!("/open <n>         resume conversation n from the list");
            println!("/delete <n>       delete conversation n from the list");
            println!("/clear            reset the current conversation");
            println!("/image <path>     attach an image to the next message");
            println!("/doc <path>       attach a document to the next message");
            println!("/quit             exit");
        }
        "new" => {
            service.new_session();
            println!("Started a new chat.");
        }
        "sessions" => {
            let sessions = service.sessions();
            if sessions.is_empty() {
                println!("No stored conversations.");
            }
            for (i, session) in sessions.iter().enumerate() {
                println!(
                    "{:>3}. {} ({} messages, {})",
                    i + 1,
                    session.title,
                    session.messages.len(),
                    session.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        "open" => {
            let session = nth_session(service, rest)?;
            println!("Resumed \"{}\".", session.title);
            service.open_session(session);
        }
        "delete" => {
            let session = nth_session(service, rest)?;
            service.delete_session(&session.id);
            println!("Deleted \"{}\".", session.title);
        }
        "clear" => {
            service.clear_session();
            println!("Cleared the current conversation.");
        }
        "image" => {
            pending_images.push(read_image(Path::new(rest))?);
            println!("Attached {} image(s) to the next message.", pending_images.len());
        }
        "doc" => {
            pending_documents.push(read_document(Path::new(rest))?);
            println!(
                "Attached {} document(s) to the next message.",
                pending_documents.len()
            );
        }
        other => bail!("Unknown command: /{} (see /help)", other),
    }

    Ok(false)
}

fn nth_session(service: &ChatService, arg: &str) -> Result<anusarth::models::ChatSession> {
    let index: usize = arg
        .parse()
        .with_context(|| format!("Expected a session number, got \"{}\"", arg))?;
    let sessions = service.sessions();
    sessions
        .into_iter()
        .nth(index.wrapping_sub(1))
        .with_context(|| format!("No session {} (see /sessions)", index))
}

fn read_image(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:{};base64,{}", mime, b64))
}

fn read_document(path: &Path) -> Result<DocumentAttachment> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document")
        .to_string();
    let mime_type = match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
    .to_string();
    Ok(DocumentAttachment {
        name,
        mime_type,
        data: base64::engine::general_purpose::STANDARD.encode(&bytes),
    })
}
