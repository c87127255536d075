use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mentor::commands::{self, identity_from_args, Context};
use mentor::config::{parse_timeout, DashboardConfig};

#[derive(Parser)]
#[command(name = "mentor")]
#[command(about = "Mentor - Student Dashboard\nProgress, AI insights, predictions and course recommendations")]
#[command(version)]
struct Cli {
  /// Path to a JSON config file
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Override the API base URL
  #[arg(long, global = true)]
  base_url: Option<String>,

  /// Override the request timeout, in seconds
  #[arg(long, global = true, value_parser = parse_timeout_arg)]
  timeout: Option<u64>,

  /// Debug-level diagnostics on stderr
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

/// Student the view is shown for
#[derive(Args)]
struct Student {
  /// Student ID
  #[arg(long)]
  student_id: String,
  /// Display name (defaults to the student ID)
  #[arg(long)]
  name: Option<String>,
}

#[derive(Subcommand)]
enum Command {
  /// Check credentials and print the student's profile
  Login {
    /// Student ID
    #[arg(long)]
    student_id: String,
    /// Password (prompted for when omitted)
    #[arg(long, env = "MENTOR_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Progress charts, insights and predictions
  Progress {
    #[command(flatten)]
    student: Student,
  },
  /// Suggested courses with their learning roadmap
  Recommend {
    #[command(flatten)]
    student: Student,
    /// Open the detail view of card N
    #[arg(long)]
    open: Option<usize>,
  },
  /// Courses taken this term
  Schedule {
    /// Student ID
    #[arg(long)]
    student_id: Option<String>,
    /// Display name (defaults to the student ID)
    #[arg(long)]
    name: Option<String>,
    /// Open the detail view of card N
    #[arg(long)]
    open: Option<usize>,
  },
  /// Sign in and show every view
  Dashboard {
    /// Student ID
    #[arg(long)]
    student_id: String,
    /// Password (prompted for when omitted)
    #[arg(long, env = "MENTOR_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Print the resolved configuration
  Config,
}

fn parse_timeout_arg(raw: &str) -> Result<u64, String> {
  parse_timeout(raw).map_err(|e| e.to_string())
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
  let mut config = DashboardConfig::load(cli.config.as_deref())?;
  if let Some(url) = &cli.base_url {
    config = config.with_base_url(url.clone());
  }
  if let Some(secs) = cli.timeout {
    config = config.with_timeout_secs(secs);
  }
  Ok(config.validate()?)
}

async fn handle(command: Command, ctx: &Context) -> Result<()> {
  match command {
    Command::Login { student_id, password } => commands::show_login(ctx, &student_id, password).await,
    Command::Progress { student } => {
      let identity = identity_from_args(&student.student_id, student.name.as_deref());
      commands::progress(ctx, &identity).await
    }
    Command::Recommend { student, open } => {
      let identity = identity_from_args(&student.student_id, student.name.as_deref());
      commands::recommend(ctx, &identity, open).await
    }
    Command::Schedule { student_id, name, open } => {
      let identity = student_id.map(|id| identity_from_args(&id, name.as_deref()));
      commands::schedule(ctx, identity.as_ref(), open).await
    }
    Command::Dashboard { student_id, password } => commands::dashboard(ctx, &student_id, password).await,
    Command::Config => commands::show_config(&ctx.config),
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  chalk::init_tracing(cli.verbose);

  let config = resolve_config(&cli)?;
  let ctx = Context::new(config)?;

  handle(cli.command, &ctx).await?;
  Ok(())
}
