mod logging;

use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use usecase_engine::{LogSink, TraceOutcome, UseCase};
use usecase_lists::{
  Actor, AddItem, AddItemRequest, EDITOR_ROLE, InMemoryListRepository, ListsConfig, add_item,
};

use logging::{LogFormat, LoggingConfig, init_logging};

/// usecase - declarative use cases you can run, audit and document
#[derive(Parser)]
#[command(name = "usecase")]
#[command(version, about, long_about = None)]
struct Cli {
  /// JSON file with lists to seed the repository with
  #[arg(long, global = true)]
  lists: Option<PathBuf>,

  /// Log output format
  #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
  log_format: LogFormat,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the documentation tree of the `add item` use case
  Doc,

  /// Run the `add item` use case with a request read from stdin
  Run {
    #[command(flatten)]
    actor: ActorArgs,

    /// Also record an audit trace to the log
    #[arg(long)]
    audit_log: bool,
  },

  /// Run the `add item` use case and print its audit trace
  Audit {
    #[command(flatten)]
    actor: ActorArgs,
  },
}

#[derive(clap::Args)]
struct ActorArgs {
  /// Name of the acting user
  #[arg(long, default_value = "anonymous")]
  user: String,

  /// Grant the acting user the editor role
  #[arg(long)]
  editor: bool,
}

impl ActorArgs {
  fn into_actor(self) -> Actor {
    let actor = Actor::new(self.user);
    if self.editor {
      actor.with_role(EDITOR_ROLE)
    } else {
      actor
    }
  }
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  init_logging(&LoggingConfig {
    format: cli.log_format,
    ..LoggingConfig::default()
  });

  let config = ListsConfig {
    seed_path: cli.lists,
  };

  let Some(command) = cli.command else {
    println!("usecase - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_command(command, config).await })
}

async fn run_command(command: Commands, config: ListsConfig) -> Result<()> {
  let use_case = build_use_case(&config).await?;

  match command {
    Commands::Doc => {
      println!("{}", serde_json::to_string_pretty(&use_case.doc())?);
    }
    Commands::Run { actor, audit_log } => {
      let request = read_request_from_stdin()?;
      let actor = actor.into_actor();

      let executed = if audit_log {
        use_case.audit_into(request, actor, &LogSink).await
      } else {
        use_case.run(request, actor).await
      };
      let outcome = executed.context("use case execution failed")?;

      let outcome = TraceOutcome::capture(&outcome).context("failed to serialize outcome")?;
      println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    Commands::Audit { actor } => {
      let request = read_request_from_stdin()?;

      let audited = use_case
        .audit(request, actor.into_actor())
        .await
        .context("use case execution failed")?;

      eprintln!("Transaction: {}", audited.trace.transaction_id);
      println!("{}", serde_json::to_string_pretty(&audited.trace)?);
    }
  }

  Ok(())
}

async fn build_use_case(config: &ListsConfig) -> Result<UseCase<AddItem>> {
  let repository = InMemoryListRepository::from_config(config)
    .await
    .context("failed to load lists")?;

  add_item(Arc::new(repository)).context("invalid use case definition")
}

fn read_request_from_stdin() -> Result<AddItemRequest> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    anyhow::bail!("expected an `add item` request on stdin");
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read request from stdin")?;

  serde_json::from_str(&input).context("failed to parse request JSON from stdin")
}
