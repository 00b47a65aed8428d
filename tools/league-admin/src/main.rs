//! Fantasy League Admin CLI
//!
//! Operator commands over the league file:
//! - seed / register / roster: set the league up
//! - prices / deadline: weekly operator chores
//! - finalize: settle a round
//! - standings / history / catalog: read-only views

mod config;
mod logging;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use league_service::{ErrorKind, LeagueError, LeagueService, PriceChange};
use persistence::create_local_store_with_config;
use roster_core::{parse_points, CatalogId, ItemKind, Roster, RoundPoints, BUDGET};

#[derive(Parser)]
#[command(name = "league-admin")]
#[command(about = "Operator CLI for the fantasy league - rosters, prices and round settlement")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (defaults to ./league-admin.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the configuration
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default drivers and constructors into an empty league
    Seed,

    /// Register a new team
    Register {
        /// Team name
        team: String,
    },

    /// Pick and save a team's roster
    Roster {
        /// Team name
        team: String,

        /// Driver ids, in pick order
        #[arg(long = "driver", required = true)]
        drivers: Vec<CatalogId>,

        /// Constructor ids, in pick order
        #[arg(long = "constructor", required = true)]
        constructors: Vec<CatalogId>,
    },

    /// Reprice catalog items; their points go back to zero
    Prices {
        /// New price as id=price, repeatable
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        set: Vec<(CatalogId, String)>,

        /// Reprice constructors instead of drivers
        #[arg(long)]
        constructor: bool,
    },

    /// Show, set or clear the roster deadline
    Deadline {
        /// Lock instant, RFC 3339 (e.g. 2024-03-02T15:00:00Z)
        #[arg(long, conflicts_with = "clear")]
        at: Option<DateTime<Utc>>,

        /// Remove the deadline
        #[arg(long)]
        clear: bool,
    },

    /// Settle a round
    Finalize {
        /// Event label, e.g. "GP de Interlagos"
        #[arg(short, long)]
        label: String,

        /// Driver points as id=points, repeatable
        #[arg(long = "driver", value_parser = parse_assignment)]
        drivers: Vec<(CatalogId, String)>,

        /// Constructor points as id=points, repeatable
        #[arg(long = "constructor", value_parser = parse_assignment)]
        constructors: Vec<(CatalogId, String)>,
    },

    /// Championship standings
    Standings,

    /// Settled rounds
    History {
        /// Show every settlement, not just the latest
        #[arg(long)]
        all: bool,
    },

    /// Drivers and constructors with prices and points
    Catalog,

    /// Print the effective configuration
    Config,
}

fn parse_assignment(raw: &str) -> std::result::Result<(CatalogId, String), String> {
    let (id, value) = raw.split_once('=').ok_or_else(|| format!("expected id=value, got '{raw}'"))?;
    let id = id.trim().parse::<CatalogId>().map_err(|e| format!("invalid id '{id}': {e}"))?;
    Ok((id, value.trim().to_string()))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        report(&err);
        std::process::exit(1);
    }
}

/// One classified message per failure
fn report(err: &anyhow::Error) {
    let Some(league_err) = err.downcast_ref::<LeagueError>() else {
        eprintln!("{} {:#}", "❌ Error:".red().bold(), err);
        return;
    };

    let (label, hint) = match league_err.kind() {
        ErrorKind::Validation => ("Rejected", "nothing was written"),
        ErrorKind::Access => ("Access denied", "check store permissions and retry"),
        ErrorKind::Conflict => ("Conflict", "the league changed meanwhile; reload and retry"),
        ErrorKind::Transient => ("Store failure", "nothing was written; retry"),
    };
    eprintln!("{} {}", format!("❌ {label}:").red().bold(), league_err);
    eprintln!("   {}", hint.dimmed());
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.store.data_dir = data_dir;
    }
    logging::initialize_logging_with_config(&config.logging.level, &config.logging.format)?;

    if let Commands::Config = cli.command {
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("{rendered}");
        return Ok(());
    }

    let mut store = create_local_store_with_config(config.store.clone())?;
    store.initialize().await.context("Failed to open league store")?;
    debug!("Opened league store at {:?}", config.store.store_path());

    let service = LeagueService::new(Arc::new(store), config.league.clone());
    service.start().await?;

    match cli.command {
        Commands::Seed => seed(&service).await,
        Commands::Register { team } => register(&service, &team).await,
        Commands::Roster { team, drivers, constructors } => {
            save_roster(&service, &team, &drivers, &constructors).await
        }
        Commands::Prices { set, constructor } => {
            let kind = if constructor { ItemKind::Constructor } else { ItemKind::Driver };
            update_prices(&service, kind, set).await
        }
        Commands::Deadline { at, clear } => deadline(&service, at, clear).await,
        Commands::Finalize { label, drivers, constructors } => {
            finalize(&service, &label, &drivers, &constructors).await
        }
        Commands::Standings => standings(&service),
        Commands::History { all } => history(&service, all),
        Commands::Catalog => catalog(&service),
        Commands::Config => Ok(()),
    }
}

async fn seed(service: &LeagueService) -> Result<()> {
    if service.seed_if_empty().await? {
        println!("{}", "🌱 Seeded 20 drivers and 10 constructors".green());
    } else {
        println!("{}", "League already has a catalog, nothing to seed".yellow());
    }
    Ok(())
}

async fn register(service: &LeagueService, team: &str) -> Result<()> {
    let entrant = service.register_team(team).await?;
    println!("{} {}", "✅ Registered".green(), entrant.name.bold());
    Ok(())
}

async fn save_roster(
    service: &LeagueService,
    team: &str,
    drivers: &[CatalogId],
    constructors: &[CatalogId],
) -> Result<()> {
    let catalog = service.league_snapshot()?.catalog;

    let mut roster = Roster::new();
    for id in drivers {
        roster = roster.try_add(*id, ItemKind::Driver, &catalog).map_err(LeagueError::from)?;
    }
    for id in constructors {
        roster = roster.try_add(*id, ItemKind::Constructor, &catalog).map_err(LeagueError::from)?;
    }

    service.save_roster(team, &roster).await?;

    println!(
        "{} {} {} (cost {}, {} left)",
        "✅ Saved roster for".green(),
        team.bold(),
        format!("[{} drivers, {} constructors]", roster.drivers.len(), roster.constructors.len()).dimmed(),
        roster.cost(&catalog),
        roster.remaining_budget(&catalog)
    );
    Ok(())
}

async fn update_prices(service: &LeagueService, kind: ItemKind, set: Vec<(CatalogId, String)>) -> Result<()> {
    let changes: Vec<PriceChange> =
        set.into_iter().map(|(id, raw)| PriceChange::new(kind, id, raw)).collect();

    let count = service.update_prices(&changes).await?;

    let catalog = service.league_snapshot()?.catalog;
    println!("{} {} {} prices", "💲 Updated".green(), count, kind);
    for change in &changes {
        if let Some(item) = catalog.of(kind).get(change.id) {
            println!("   {:>3}  {:<22} {:>6}", item.id, item.name, item.price);
        }
    }
    Ok(())
}

async fn deadline(service: &LeagueService, at: Option<DateTime<Utc>>, clear: bool) -> Result<()> {
    if clear {
        service.set_deadline(None).await?;
        println!("{}", "🔓 Deadline cleared, rosters are open".green());
        return Ok(());
    }

    if let Some(at) = at {
        service.set_deadline(Some(at)).await?;
        println!("{} {}", "⏰ Rosters lock after".green(), at.to_rfc3339().bold());
        return Ok(());
    }

    let state = service.league_snapshot()?;
    match state.config.deadline {
        Some(deadline) => {
            let status = if service.is_locked()? { "LOCKED".red().bold() } else { "open".green().bold() };
            println!("Deadline: {} ({})", deadline.to_rfc3339(), status);
        }
        None => println!("No deadline set, rosters are {}", "open".green().bold()),
    }
    Ok(())
}

async fn finalize(
    service: &LeagueService,
    label: &str,
    drivers: &[(CatalogId, String)],
    constructors: &[(CatalogId, String)],
) -> Result<()> {
    let mut points = RoundPoints::new();
    for (id, raw) in drivers {
        points = points.with(ItemKind::Driver, *id, parse_points(raw));
    }
    for (id, raw) in constructors {
        points = points.with(ItemKind::Constructor, *id, parse_points(raw));
    }

    let settlement = service.finalize_round(label, &points).await?;

    println!("{} {} {}", "🏁 Finalized".green().bold(), settlement.name.bold(), format!("#{}", settlement.id).dimmed());
    println!("{:>4}  {:<24} {:>8} {:>8}", "Pos", "Team", "Weekend", "Awarded");
    for (place, result) in settlement.results.iter().enumerate() {
        println!(
            "{:>4}  {:<24} {:>8} {:>8}",
            place + 1,
            result.user_name,
            result.weekend_points,
            format!("+{}", result.championship_points_awarded).cyan()
        );
    }
    Ok(())
}

fn standings(service: &LeagueService) -> Result<()> {
    let standings = service.standings()?;
    if standings.is_empty() {
        println!("{}", "No teams registered yet".yellow());
        return Ok(());
    }

    println!("{}", "🏆 Championship".bold());
    for (place, entrant) in standings.iter().enumerate() {
        let line = format!("{:>4}  {:<24} {:>6}", place + 1, entrant.name, entrant.championship_points);
        match place {
            0 => println!("{}", line.yellow().bold()),
            _ => println!("{line}"),
        }
    }
    Ok(())
}

fn history(service: &LeagueService, all: bool) -> Result<()> {
    let history = service.history()?;
    let shown: Vec<_> = if all { history.iter().collect() } else { history.last().into_iter().collect() };

    if shown.is_empty() {
        println!("{}", "No rounds settled yet".yellow());
        return Ok(());
    }

    for settlement in shown {
        println!("{} {}", settlement.name.bold(), format!("#{}", settlement.id).dimmed());
        for (place, result) in settlement.results.iter().enumerate() {
            println!(
                "{:>4}  {:<24} {:>6} pts  +{}",
                place + 1,
                result.user_name,
                result.weekend_points,
                result.championship_points_awarded
            );
        }
    }
    Ok(())
}

fn catalog(service: &LeagueService) -> Result<()> {
    let state = service.league_snapshot()?;

    for catalog in [&state.catalog.drivers, &state.catalog.constructors] {
        println!("{}", format!("{}s", catalog.kind()).to_uppercase().bold());
        for item in catalog.iter() {
            println!("{:>4}  {:<22} {:>6} {:>6}", item.id, item.name, item.price, item.points);
        }
    }
    println!("Budget: {}", BUDGET.to_string().bold());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("3=21.5").unwrap(), (3, "21.5".to_string()));
        assert_eq!(parse_assignment(" 7 = 12 ").unwrap(), (7, "12".to_string()));
        assert!(parse_assignment("seven=12").is_err());
        assert!(parse_assignment("12").is_err());
    }

    #[test]
    fn test_cli_parses_finalize() {
        let cli = Cli::try_parse_from([
            "league-admin",
            "finalize",
            "--label",
            "GP de Interlagos",
            "--driver",
            "1=25",
            "--driver",
            "3=18",
            "--constructor",
            "1=43",
        ])
        .unwrap();

        match cli.command {
            Commands::Finalize { label, drivers, constructors } => {
                assert_eq!(label, "GP de Interlagos");
                assert_eq!(drivers.len(), 2);
                assert_eq!(constructors, vec![(1, "43".to_string())]);
            }
            _ => panic!("expected finalize"),
        }
    }

    #[test]
    fn test_deadline_flags_conflict() {
        let result = Cli::try_parse_from([
            "league-admin",
            "deadline",
            "--at",
            "2024-03-02T15:00:00Z",
            "--clear",
        ]);
        assert!(result.is_err());
    }
}
