//! RAG Explorer CLI: terminal front end for scenario playback
//!
//! Runs a session in-process against the configured generation provider.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use rag_explorer::genai::LLMProvider;
use rag_explorer::playback::StepOutcome;
use rag_explorer::studio::save_image;
use rag_explorer::{ExplorerConfig, ImageSize, InspectorView, ScenarioName, Session, TENANTS};

#[derive(Parser)]
#[command(name = "rag-explorer", version, about = "RAG Pipeline Explorer CLI")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "RAG_EXPLORER_CONFIG")]
    config: Option<String>,

    /// Use the offline mock provider instead of the configured one
    #[arg(long, global = true)]
    mock: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario from start to finish
    Play {
        /// "ingestion" or "query"
        scenario: ScenarioName,

        /// Tenant to simulate
        #[arg(long, default_value = "T-800")]
        tenant: String,

        /// Question sent to the language model
        #[arg(long)]
        query: Option<String>,
    },
    /// Generate an image
    Image {
        /// Image description
        prompt: String,

        /// Resolution tier (1K, 2K, 4K)
        #[arg(long, default_value = "1K")]
        size: ImageSize,

        /// Save the decoded image to this file
        #[arg(long)]
        out: Option<String>,
    },
    /// List tenants
    Tenants,
    /// Start an interactive stepper
    Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let mut session = match build_session(&cli) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Play { scenario, tenant, query } => {
            run_play(&mut session, scenario, &tenant, query.as_deref(), &cli.format).await
        }
        Commands::Image { prompt, size, out } => run_image(&mut session, &prompt, size, out.as_deref()).await,
        Commands::Tenants => {
            for tenant in TENANTS {
                println!("{}", tenant);
            }
            Ok(())
        }
        Commands::Shell => run_shell(&mut session, &cli.format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_session(cli: &Cli) -> Result<Session, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ExplorerConfig::from_file(path)?,
        None => ExplorerConfig::default(),
    };
    let mut config = config.with_env_overrides(|key| std::env::var(key).ok())?;
    if cli.mock {
        config.genai.provider = LLMProvider::Mock;
    }
    Ok(Session::from_config(&config)?)
}

async fn run_play(
    session: &mut Session,
    scenario: ScenarioName,
    tenant: &str,
    query: Option<&str>,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    session.select_tenant(tenant)?;
    if let Some(query) = query {
        session.set_query(query)?;
    }

    let mut outcome = session.start(scenario);
    while outcome != StepOutcome::Completed {
        print_step(session, outcome, format)?;
        outcome = session.advance();
    }

    session.controller_mut().settle().await;
    print_log(session, format)?;
    Ok(())
}

async fn run_image(
    session: &mut Session,
    prompt: &str,
    size: ImageSize,
    out: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    match session.generate_image(prompt, size).await? {
        Some(image) => {
            match out {
                Some(path) => {
                    let written = save_image(&image, std::path::Path::new(path))?;
                    println!("Wrote {} bytes to {}", written, path);
                }
                None => println!("{}", image),
            }
        }
        None => {
            for line in session.controller().console().lines() {
                println!("> {}", line);
            }
        }
    }
    Ok(())
}

async fn run_shell(session: &mut Session, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("RAG Explorer Interactive Shell");
    println!("Type :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("rag[{}]> ", session.tenant());

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        let (command, arg) = match trimmed.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (trimmed, ""),
        };

        let result: Result<(), Box<dyn std::error::Error>> = match command {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :ingestion | :query   — Start a scenario");
                println!("  :next (or empty line) — Advance one step");
                println!("  :reset                — Return to idle");
                println!("  :tenant <name>        — Select tenant ({})", TENANTS.join(", "));
                println!("  :ask <question>       — Set the query text");
                println!("  :image <1K|2K|4K> <prompt> — Generate an image");
                println!("  :log                  — Show the console log");
                println!("  :quit                 — Exit shell");
                Ok(())
            }
            ":ingestion" | ":query" => command[1..]
                .parse::<ScenarioName>()
                .map_err(Into::into)
                .and_then(|scenario| {
                    let outcome = session.start(scenario);
                    print_step(session, outcome, format)
                }),
            "" | ":next" | ":n" => {
                let outcome = session.advance();
                print_step(session, outcome, format)
            }
            ":reset" => {
                session.reset();
                print_log(session, format)
            }
            ":tenant" => session.select_tenant(arg).map_err(Into::into),
            ":ask" => session.set_query(arg).map_err(Into::into),
            ":log" => {
                session.controller_mut().settle().await;
                print_log(session, format)
            }
            ":image" => match arg.split_once(' ') {
                Some((size, prompt)) => match size.parse::<ImageSize>() {
                    Ok(size) => run_image(session, prompt, size, None).await,
                    Err(e) => Err(e.into()),
                },
                None => Err("usage: :image <1K|2K|4K> <prompt>".into()),
            },
            other => Err(format!("unknown command: {}", other).into()),
        };

        if let Err(e) = result {
            eprintln!("Error: {}", e);
        }
    }

    println!("Bye!");
    Ok(())
}

fn print_step(
    session: &Session,
    outcome: StepOutcome,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = session.view();

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match outcome {
        StepOutcome::Ignored => {
            println!("(nothing to advance; start a scenario first)");
            return Ok(());
        }
        StepOutcome::Completed => {
            println!("> {}", view.log.first().map(String::as_str).unwrap_or_default());
            return Ok(());
        }
        StepOutcome::Applied(_) => {}
    }

    if let Some(progress) = view.progress {
        let edge = view
            .active_edge
            .map(|e| format!("  [{}]", e))
            .unwrap_or_default();
        println!("\nStep {} / {}{}", progress.number, progress.total, edge);
    }
    if let Some(line) = view.log.first() {
        println!("> {}", line);
    }

    match view.inspector {
        InspectorView::Idle => {}
        InspectorView::Ranking { title, description, model, candidates } => {
            println!("{} — {}", title, description);
            if let Some(model) = model {
                println!("model: {}", model);
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["ID", "Document", "Rank", "Score"]);
            for c in &candidates {
                table.add_row(vec![
                    c.id.clone(),
                    c.text.clone(),
                    format!("{} → {}", c.old_rank, c.new_rank),
                    format!("{:.2}", c.score),
                ]);
            }
            println!("{}", table);
        }
        InspectorView::Structured { title, description, body }
        | InspectorView::Text { title, description, body } => {
            println!("{} — {}", title, description);
            println!("{}", body);
        }
    }

    Ok(())
}

fn print_log(session: &Session, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let lines = session.controller().console().lines();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lines)?),
        OutputFormat::Table => {
            println!("\nSystem Logs");
            for line in &lines {
                println!("> {}", line);
            }
        }
    }
    Ok(())
}
