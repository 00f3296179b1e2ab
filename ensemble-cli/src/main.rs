//! ensemble binary: run the supervisor workflow, inspect history, branch.

use clap::{Parser, Subcommand};

use ensemble_cli::{build_history, cmd_branch, cmd_history, cmd_run, CliOptions};

#[derive(Parser, Debug)]
#[command(name = "ensemble")]
#[command(about = "Supervisor workflow: run prompts, inspect checkpoint history, branch")]
struct Args {
    /// Offline mode: mock LLM and embedder, no API keys needed.
    #[arg(long)]
    mock: bool,

    /// Conversation thread id.
    #[arg(long, default_value = "default")]
    thread: String,

    /// Checkpoint database path (default: checkpoints.db).
    #[arg(long)]
    db: Option<String>,

    /// Chat model for the OpenAI client.
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Continue the thread with a new prompt.
    Run {
        /// The user prompt.
        prompt: Vec<String>,
    },
    /// List the thread's checkpoints, newest first.
    History,
    /// Replay from a checkpoint with an edited prompt.
    Branch {
        /// Checkpoint id to branch from (see the history command).
        checkpoint_id: String,
        /// The replacement prompt.
        prompt: Vec<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let _ = dotenv::dotenv();
    init_tracing();

    let args = Args::parse();
    let opts = CliOptions {
        mock: args.mock,
        db_path: args.db.clone(),
        model: args.model.clone(),
    };

    let history = match build_history(&opts) {
        Ok(history) => history,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match args.command {
        Command::Run { prompt } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                Err("provide a prompt".into())
            } else {
                cmd_run(&history, &args.thread, &prompt).await
            }
        }
        Command::History => cmd_history(&history, &args.thread).await,
        Command::Branch {
            checkpoint_id,
            prompt,
        } => {
            let prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                Err("provide a replacement prompt".into())
            } else {
                cmd_branch(&history, &args.thread, &checkpoint_id, &prompt).await
            }
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
