//! Command-line entry point for the foosball league engine
//!
//! Loads a league snapshot (player registry plus match history), replays the
//! history in creation order and prints the resulting leaderboard or one
//! player's analytics.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use foosball_league::config::AppConfig;
use foosball_league::league::{LeagueEngine, Player, ReplayPolicy};
use foosball_league::metrics::EngineMetrics;
use foosball_league::stats::PlayerStats;
use foosball_league::types::LeagueSnapshot;
use foosball_league::utils::display_rating;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Foosball League - Elo ratings and leaderboard for 2v2 table football
#[derive(Parser)]
#[command(
    name = "foosball-league",
    version,
    about = "Replay a foosball league history and print ratings",
    long_about = "Reads a JSON snapshot with the player registry and finished matches, \
                 replays every match through the margin-weighted team Elo model and prints \
                 the tie-aware leaderboard or a single player's statistics."
)]
struct Args {
    /// League snapshot file
    #[arg(value_name = "SNAPSHOT", help = "Path to league snapshot (JSON format)")]
    snapshot: Option<PathBuf>,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without replaying")]
    dry_run: bool,

    /// Show one player instead of the leaderboard
    #[arg(
        short,
        long,
        value_name = "PLAYER",
        help = "Player id, full name or name fragment to show statistics for"
    )]
    player: Option<String>,

    /// Stop at the first match that cannot be applied
    #[arg(long, help = "Abort the replay on the first failing match")]
    abort_on_error: bool,

    /// Emit JSON instead of a table
    #[arg(long, help = "Print results as JSON")]
    json: bool,

    /// Print Prometheus metrics after the replay
    #[arg(long, help = "Print engine metrics in Prometheus text format")]
    metrics: bool,

    /// Limit the leaderboard
    #[arg(long, value_name = "N", help = "Only show the top N leaderboard rows")]
    top: Option<usize>,
}

/// One printed leaderboard line
#[derive(Debug, Serialize)]
struct LeaderboardRow {
    rank: u32,
    last_position: u32,
    player_id: u32,
    name: String,
    rating: i64,
    matches: u32,
    wins: u32,
    losses: u32,
    form: String,
}

#[derive(Debug, Serialize)]
struct PlayerReport<'a> {
    name: &'a str,
    rating: i64,
    rank: Option<u32>,
    recent_form: String,
    role_preference: String,
    stats: &'a PlayerStats,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Display startup banner with engine settings
fn display_startup_banner(config: &AppConfig) {
    info!("Foosball League {}", foosball_league::VERSION);
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Default rating: {}", config.rating.default_rating);
    info!(
        "   K-factor: {} -> {} over {} matches",
        config.k_factor.onboarding_k, config.k_factor.steady_k, config.k_factor.onboarding_matches
    );
    info!(
        "   Blowout: scores above {} scaled to {}",
        config.rating.blowout_threshold, config.rating.blowout_ceiling
    );
    info!("   Ranking minimum: {} matches", config.ranking.min_matches);
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    foosball_league::config::validate_config(&config)?;

    Ok(config)
}

fn load_snapshot(path: &Path) -> Result<LeagueSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot: LeagueSnapshot = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid snapshot {}", path.display()))?;
    info!(
        "Loaded {} players and {} matches from {}",
        snapshot.players.len(),
        snapshot.matches.len(),
        path.display()
    );
    Ok(snapshot)
}

/// Resolve a CLI player argument: numeric id, then full name, then fragment
fn resolve_player<'a>(engine: &'a LeagueEngine, query: &str) -> Option<&'a Player> {
    if let Ok(id) = query.parse::<u32>() {
        if let Some(player) = engine.get_player_by_id(id) {
            return Some(player);
        }
    }
    engine
        .get_player_by_full_name(query)
        .or_else(|| engine.get_player_by_name(query))
}

fn print_leaderboard(engine: &mut LeagueEngine, top: Option<usize>, json: bool) -> Result<()> {
    let entries = engine.rank_table().entries().to_vec();
    let mut rows = Vec::with_capacity(entries.len());

    for entry in entries.iter().take(top.unwrap_or(usize::MAX)) {
        let Some(player) = engine.get_player_by_id(entry.player_id) else {
            continue;
        };
        rows.push(LeaderboardRow {
            rank: entry.rank,
            last_position: entry.last_position(),
            player_id: player.id,
            name: player.name.clone(),
            rating: entry.display_rating,
            matches: player.matches_played,
            wins: player.wins,
            losses: player.losses(),
            form: engine.recent_form(player.id)?.to_string(),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:>6}  {:<24} {:>6} {:>5} {:>7}  {}",
        "Rank", "Player", "Rating", "MP", "W-L", "Form"
    );
    for row in &rows {
        let rank = if row.last_position > row.rank {
            format!("{}-{}", row.rank, row.last_position)
        } else {
            row.rank.to_string()
        };
        println!(
            "{:>6}  {:<24} {:>6} {:>5} {:>7}  {}",
            rank,
            row.name,
            row.rating,
            row.matches,
            format!("{}-{}", row.wins, row.losses),
            row.form
        );
    }

    let enrolled = engine.get_all_players().len();
    let unranked = enrolled - entries.len();
    if unranked > 0 {
        println!("({} players below the ranking minimum)", unranked);
    }

    Ok(())
}

fn print_player(
    engine: &mut LeagueEngine,
    query: &str,
    snapshot: &LeagueSnapshot,
    json: bool,
) -> Result<()> {
    let player_id = resolve_player(engine, query)
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("No player matches '{}'", query))?;

    let rank = engine.get_rank(player_id)?;
    let stats = engine.get_player_stats(player_id, &snapshot.matches)?;
    let recent_form = engine.recent_form(player_id)?.to_string();
    let role_preference = engine.role_preference(player_id)?.to_string();
    let player = engine
        .get_player_by_id(player_id)
        .ok_or_else(|| anyhow!("Player {} disappeared", player_id))?;

    if json {
        let report = PlayerReport {
            name: &player.name,
            rating: display_rating(player.rating),
            rank,
            recent_form,
            role_preference,
            stats: &stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let name_of = |id: u32| {
        engine
            .get_player_by_id(id)
            .map_or_else(|| id.to_string(), |p| p.name.clone())
    };

    println!("{} (#{})", player.name, player.id);
    println!(
        "  Rating: {} (best {})",
        display_rating(player.rating),
        display_rating(player.best_rating)
    );
    match rank {
        Some(rank) => println!("  Rank: {}", rank),
        None => println!("  Rank: unranked"),
    }
    println!(
        "  Record: {}W {}D {}L ({:.0}% wins)",
        stats.overall.wins,
        stats.overall.draws,
        stats.overall.losses,
        stats.win_rate * 100.0
    );
    println!(
        "  As attacker: {}W {}L of {}, as defender: {}W {}L of {} ({})",
        stats.as_attacker.wins,
        stats.as_attacker.losses,
        stats.as_attacker.matches,
        stats.as_defender.wins,
        stats.as_defender.losses,
        stats.as_defender.matches,
        role_preference
    );
    println!(
        "  Goals: {} for, {} against ({:.1} / {:.1} per match)",
        stats.goals_for, stats.goals_against, stats.avg_goals_for, stats.avg_goals_against
    );
    println!(
        "  Streaks: {} wins, {} losses",
        stats.longest_win_streak, stats.longest_loss_streak
    );
    println!("  Recent form: {}", recent_form);

    for (label, summary) in [
        ("Best teammate", stats.best_teammate),
        ("Worst teammate", stats.worst_teammate),
        ("Easiest opponent", stats.best_opponent),
        ("Toughest opponent", stats.worst_opponent),
    ] {
        if let Some(summary) = summary {
            println!(
                "  {}: {} ({:+.1} over {} matches)",
                label,
                name_of(summary.player_id),
                summary.net_delta,
                summary.matches
            );
        }
    }

    for (label, highlight) in [
        ("Best victory (rating)", &stats.best_victory_by_rating),
        ("Worst defeat (rating)", &stats.worst_defeat_by_rating),
        ("Best victory (score)", &stats.best_victory_by_score),
        ("Worst defeat (score)", &stats.worst_defeat_by_score),
    ] {
        if let Some(h) = highlight {
            let swing = h
                .delta
                .map_or_else(String::new, |d| format!(", {:+.0} rating", d));
            println!(
                "  {}: {}-{} with {} vs {} & {}{}",
                label,
                h.goals_for,
                h.goals_against,
                name_of(h.teammate_id),
                name_of(h.opponent_ids[0]),
                name_of(h.opponent_ids[1]),
                swing
            );
        }
    }

    if let Some(trajectory) = stats.rating_trajectory {
        println!(
            "  Rating range: {} to {}",
            display_rating(trajectory.low),
            display_rating(trajectory.peak)
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    display_startup_banner(&config);

    if args.dry_run {
        info!("Configuration validation successful");
        return Ok(());
    }

    let snapshot_path = args
        .snapshot
        .as_deref()
        .ok_or_else(|| anyhow!("A snapshot file is required unless --dry-run is given"))?;
    let mut snapshot = load_snapshot(snapshot_path)?;

    let metrics = if args.metrics {
        Some(Arc::new(EngineMetrics::new()?))
    } else {
        None
    };

    let mut engine = LeagueEngine::new(&config)?;
    if let Some(metrics) = &metrics {
        engine = engine.with_metrics(metrics.clone());
    }
    engine.enroll_all(&snapshot.players)?;

    // Replay expects creation order; the sort is stable for equal timestamps
    snapshot.matches.sort_by_key(|m| m.created_at);

    let policy = if args.abort_on_error {
        ReplayPolicy::Abort
    } else {
        ReplayPolicy::SkipFailed
    };
    let report = engine.replay(&mut snapshot.matches, policy)?;
    for skipped in &report.skipped {
        warn!("Skipped match {}: {}", skipped.match_id, skipped.reason);
    }

    match &args.player {
        Some(query) => print_player(&mut engine, query, &snapshot, args.json)?,
        None => print_leaderboard(&mut engine, args.top, args.json)?,
    }

    if let Some(metrics) = &metrics {
        print!("{}", metrics.render()?);
    }

    Ok(())
}
