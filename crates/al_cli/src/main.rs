//! Arena League CLI
//!
//! Creates careers, simulates weeks and prints fixtures and standings.
//! Careers live in JSON documents on disk.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use al_cli::{
    import_roster, league_config, load_career, render_fixtures, render_table, render_week_report,
    save_career,
};
#[cfg(feature = "cli")]
use al_core::{config::LEAGUE_TEAMS, simulate_week, Career};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "arena_league")]
#[command(about = "Run an arena league career from the command line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Start a new career
    New {
        /// Output career file
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 7)]
        seed: u64,

        #[arg(long, default_value_t = LEAGUE_TEAMS)]
        teams: usize,

        /// League preset: single, double or quick
        #[arg(long)]
        preset: Option<String>,

        /// YAML league config (overrides --preset)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Team controlled by the user
        #[arg(long)]
        user_team: Option<u32>,
    },

    /// Simulate one or more weeks
    Sim {
        #[arg(long)]
        career: PathBuf,

        #[arg(long, default_value_t = 1)]
        weeks: u32,

        /// Leave the user team's fixture unplayed
        #[arg(long, default_value = "false")]
        except_user: bool,
    },

    /// Print the standings
    Table {
        #[arg(long)]
        career: PathBuf,
    },

    /// Print the fixtures of a week (current week by default)
    Fixtures {
        #[arg(long)]
        career: PathBuf,

        #[arg(long)]
        week: Option<u32>,
    },

    /// Replace a team's roster from a JSON file
    ImportRoster {
        #[arg(long)]
        career: PathBuf,

        #[arg(long)]
        team: u32,

        /// Fighter records (list, or object with a roster list)
        #[arg(long)]
        file: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::New { out, seed, teams, preset, config, user_team } => {
            let league = league_config(preset.as_deref(), config.as_deref())?;
            let mut career = Career::new(seed, teams, league)?;
            career.set_user_team(user_team)?;
            save_career(&out, &career)?;

            println!("New career: {} teams, {} weeks, seed {}", teams, career.total_weeks(), seed);
            println!("   Saved to: {}", out.display());
        }

        Commands::Sim { career: path, weeks, except_user } => {
            let mut career = load_career(&path)?;
            for _ in 0..weeks {
                if career.is_season_finished() {
                    println!("Season finished after week {}", career.total_weeks());
                    break;
                }
                let except = if except_user {
                    career.user_fixture_this_week().map(|f| f.id.clone())
                } else {
                    None
                };
                let report = simulate_week(&mut career, except.as_deref())
                    .context("Week simulation failed")?;
                print!("{}", render_week_report(&career, &report));
                if !report.advanced {
                    break;
                }
            }
            save_career(&path, &career)?;
        }

        Commands::Table { career } => {
            let career = load_career(&career)?;
            print!("{}", render_table(&career));
        }

        Commands::Fixtures { career, week } => {
            let career = load_career(&career)?;
            let week = week.unwrap_or(career.week);
            print!("{}", render_fixtures(&career, week));
        }

        Commands::ImportRoster { career: path, team, file } => {
            let mut career = load_career(&path)?;
            let size = import_roster(&mut career, team, &file)?;
            save_career(&path, &career)?;
            println!(
                "Imported {} fighters for {}",
                size,
                career.team_name(team).unwrap_or("?")
            );
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    std::process::exit(1);
}
