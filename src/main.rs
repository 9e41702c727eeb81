use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use futures::StreamExt;

use staffhub::api::loans::estimate_monthly_payment;
use staffhub::api::types::{JobFilters, LoginRequest, StaffFilters};
use staffhub::{Config, FileTokenStore, Staffhub};

#[derive(Parser, Debug)]
#[command(name = "staffhub")]
#[command(about = "Command line client for the Staffhub talent platform")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/staffhub/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and store the session
  Login {
    email: String,
    #[arg(long)]
    password: String,
  },
  /// Sign out and clear the session
  Logout,
  /// Browse the staff directory
  Staff {
    /// Search query (three characters minimum)
    #[arg(short, long)]
    query: Option<String>,
    #[arg(short, long)]
    location: Option<String>,
  },
  /// List open jobs
  Jobs,
  /// Show loan terms and a monthly payment estimate
  Loans {
    #[arg(long)]
    amount: Option<f64>,
    #[arg(long)]
    term: Option<u32>,
  },
  /// Poll the notification counter
  Notifications {
    /// Polling interval in seconds
    #[arg(long, default_value_t = 30)]
    every: u64,
  },
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("staffhub");
  let appender = tracing_appender::rolling::daily(log_dir, "staffhub.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("staffhub=info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = init_logging()?;

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let tokens = Arc::new(FileTokenStore::open()?);
  let hub = Staffhub::new(&config, tokens)?;

  match args.command {
    Command::Login { email, password } => {
      let user = hub.auth.login(&LoginRequest { email, password }).await?;
      println!("Signed in as {} ({:?})", user.name, user.role);
    }
    Command::Logout => {
      hub.auth.logout().await?;
      println!("Signed out");
    }
    Command::Staff { query, location } => {
      let filters = StaffFilters {
        location,
        ..StaffFilters::default()
      };

      let page = match query {
        Some(q) => match hub.staff.search(&q, &filters).await? {
          Some(page) => page,
          None => {
            println!("Search queries need at least three characters");
            return Ok(());
          }
        },
        None => hub.staff.list(&filters).await?,
      };

      for profile in &page.data {
        println!(
          "{:<24} {:?} {}",
          profile.user.name,
          profile.availability,
          profile.user.skills.join(", ")
        );
      }
      println!(
        "page {}/{} ({} total)",
        page.pagination.page, page.pagination.total_pages, page.pagination.total
      );
    }
    Command::Jobs => {
      let page = hub.jobs.list(&JobFilters::default()).await?;
      for job in &page.data {
        println!("{:<32} {:<16} {:?}", job.title, job.company, job.status);
      }
    }
    Command::Loans { amount, term } => {
      let terms = hub.loans.terms().await?;
      println!(
        "Loans from {} to {}, terms: {:?} months",
        terms.min_amount, terms.max_amount, terms.terms
      );
      if let (Some(amount), Some(term)) = (amount, term) {
        println!(
          "Estimated monthly payment for {} over {} months: {}",
          amount,
          term,
          estimate_monthly_payment(amount, term)
        );
      }
    }
    Command::Notifications { every } => {
      let mut counts = hub
        .notifications
        .watch_count(Duration::from_secs(every))
        .boxed();
      while let Some(result) = counts.next().await {
        match result {
          Ok(c) => println!("{} unread of {}", c.unread, c.total),
          Err(e) => eprintln!("poll failed: {}", e),
        }
      }
    }
  }

  Ok(())
}
