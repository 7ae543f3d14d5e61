use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use carecache::{Config, ContentHub, EntityKind};

#[derive(Parser, Debug)]
#[command(name = "carecache")]
#[command(about = "Inspect and maintain the clinic content caches")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/carecache/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch and print the doctor catalog
  Doctors,
  /// Fetch and print the service price list
  Services,
  /// Print all news articles from the local store
  News,
  /// Show per-type cache freshness and age
  Status,
  /// Wipe the in-memory cache and snapshot for one type, or all
  Clear {
    #[arg(value_enum)]
    kind: Option<KindArg>,
  },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
  Doctors,
  News,
  Services,
}

impl From<KindArg> for EntityKind {
  fn from(kind: KindArg) -> Self {
    match kind {
      KindArg::Doctors => EntityKind::Doctors,
      KindArg::News => EntityKind::News,
      KindArg::Services => EntityKind::Services,
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let hub = ContentHub::from_config(&config)?;

  match args.command {
    Command::Doctors => {
      for doctor in hub.get_doctors().await? {
        println!("{}\t{}\t{}", doctor.id, doctor.name, doctor.specialization);
      }
    }
    Command::Services => {
      for service in hub.get_services().await? {
        let price = service
          .price
          .map(|p| p.to_string())
          .unwrap_or_else(|| "-".into());
        println!("{}\t{}\t{}", service.id, service.name, price);
      }
    }
    Command::News => {
      for item in hub.get_news().await? {
        println!("{}\t{}\t{}\t{}", item.id, item.date, item.category, item.title);
      }
    }
    Command::Status => {
      for status in hub.status() {
        let age = status
          .age_secs
          .map(|s| format!("{}s ago", s))
          .unwrap_or_else(|| "never".into());
        println!(
          "{}\tfresh={}\tfetched={}\tsubscribers={}",
          status.kind, status.fresh, age, status.subscribers
        );
      }
    }
    Command::Clear { kind } => {
      let kind = kind.map(EntityKind::from);
      hub.clear_cache(kind);
      match kind {
        Some(k) => println!("cleared {} cache", k),
        None => println!("cleared all caches"),
      }
    }
  }

  Ok(())
}
