use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use ideabox::clock::SystemClock;
use ideabox::config::Config;
use ideabox::models::idea::Idea;
use ideabox::notification::mailer::{HttpMailer, LogMailer, MailSender};
use ideabox::store::attachments::AttachmentStore;
use ideabox::store::memory::MemoryStore;
use ideabox::store::postgres::PgStore;
use ideabox::store::IdeaStore;
use ideabox::{api, cli, config, jobs, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::Ideas { command }) => {
            let state = build_state(cfg).await?;
            handle_idea_command(command, &state).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "ideabox=debug,tower_http=debug".into()),
    );
    let json = std::env::var("IDEABOX_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

async fn build_state(cfg: Config) -> anyhow::Result<AppState> {
    let (store, db): (Arc<dyn IdeaStore>, Option<PgStore>) = match &cfg.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db = PgStore::connect(url).await?;
            tracing::info!("Running migrations...");
            db.migrate().await?;
            (Arc::new(db.clone()), Some(db))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, ideas are kept in memory and lost on restart");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    let attachments = Arc::new(AttachmentStore::from_url(&cfg.upload_url)?);

    let mailer: Arc<dyn MailSender> = match &cfg.mail_api_url {
        Some(url) => Arc::new(HttpMailer::new(
            url.clone(),
            cfg.mail_api_key.clone(),
            cfg.mail_from.clone(),
        )?),
        None => {
            tracing::warn!("IDEABOX_MAIL_API_URL is not set, verification codes are only logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(cfg, store, attachments, mailer, Arc::new(SystemClock));
    Ok(match db {
        Some(db) => state.with_database(db),
        None => state,
    })
}

async fn run_server(cfg: Config, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(build_state(cfg).await?);

    if state.config.require_verified_email {
        tracing::info!("Submissions require a verified email address");
    }

    jobs::cleanup::spawn(state.verification.registry().clone());
    tracing::info!("Background cleanup job started (verification code expiry every 60s)");

    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Ideabox listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_idea_command(cmd: cli::IdeaCommands, state: &AppState) -> anyhow::Result<()> {
    let ideas = &state.ideas;
    match cmd {
        cli::IdeaCommands::List => {
            let all = ideas.list_all().await?;
            if all.is_empty() {
                println!("No ideas found.");
            } else {
                print_ideas(&all);
            }
        }
        cli::IdeaCommands::Board => {
            let board = ideas.priority_board().await?;
            for (title, column) in [
                ("UNPRIORITIZED", &board.unprioritized),
                ("HIGH", &board.high),
                ("MEDIUM", &board.medium),
                ("LOW", &board.low),
            ] {
                println!("== {} ({})", title, column.len());
                print_ideas(column);
                println!();
            }
        }
        cli::IdeaCommands::Status { id, status } => {
            let idea = ideas.set_status(&id, Some(&status)).await?;
            println!("Idea {} status set to {}.", idea.id, idea.status);
        }
        cli::IdeaCommands::Priority { id, priority } => {
            let idea = ideas.set_priority(&id, Some(&priority)).await?;
            println!("Idea {} priority set to {}.", idea.id, idea.priority);
        }
        cli::IdeaCommands::Comment { id, comment } => {
            let idea = ideas.set_comment(&id, Some(&comment)).await?;
            println!("Idea {} comment updated.", idea.id);
        }
        cli::IdeaCommands::Delete { id } => {
            ideas.delete(&id).await?;
            println!("Idea deleted.");
        }
    }
    Ok(())
}

fn print_ideas(ideas: &[Idea]) {
    println!(
        "{:<38} {:<20} {:<10} {:<13} SUBMITTED",
        "ID", "NAME", "STATUS", "PRIORITY"
    );
    for i in ideas {
        let name = if i.name.chars().count() > 20 {
            format!("{}...", i.name.chars().take(17).collect::<String>())
        } else {
            i.name.clone()
        };
        println!(
            "{:<38} {:<20} {:<10} {:<13} {}",
            i.id,
            name,
            i.status.as_str(),
            i.priority.as_str(),
            i.submitted_at.format("%Y-%m-%d %H:%M")
        );
    }
}
