use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use civic_bridge::{db, loader, CivicEngine, EngineConfig, LookupResult, MatchPhase, TieBreak};

#[derive(Parser)]
#[command(name = "civic-bridge", version, about = "Trova i tuoi rappresentanti: Camera, Senato, Parlamento Europeo")]
struct Cli {
    /// Directory with the CSV reference tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// SQLite database with the reference tables (preferred over --data-dir)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Tie-break policy for equally good matches: table | alphabetical
    #[arg(long, global = true)]
    tie_break: Option<TieBreak>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up the representatives of a municipality
    Lookup { query: String },

    /// Rank municipality names for autocomplete
    Suggest {
        query: String,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Load the reference data and report integrity gaps
    Check,

    /// Import the CSV data directory into a SQLite database
    Import {
        /// Target database file
        #[arg(long)]
        to: PathBuf,
    },
}

fn main() -> Result<()> {
    civic_bridge::init_tracing();

    let cli = Cli::parse();

    let mut config = EngineConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(db) = cli.database {
        config.database = Some(db);
    }
    if let Some(policy) = cli.tie_break {
        config.tie_break = policy;
    }

    match cli.command {
        Command::Import { to } => run_import(&config, &to),
        Command::Lookup { query } => {
            let engine = config.load_engine()?;
            run_lookup(&engine, &query, cli.json)
        }
        Command::Suggest { query, limit } => {
            let engine = config.load_engine()?;
            run_suggest(&engine, &query, config.effective_limit(limit), cli.json)
        }
        Command::Check => {
            let engine = config.load_engine()?;
            run_check(&engine, cli.json)
        }
    }
}

fn run_import(config: &EngineConfig, to: &Path) -> Result<()> {
    let tables = loader::load_tables(&config.data_dir)
        .with_context(|| format!("Failed to read {}", config.data_dir.display()))?;

    // Validate before writing anything
    let store = civic_bridge::ReferenceStore::build(tables)?;

    let conn = Connection::open(to).with_context(|| format!("Failed to open {}", to.display()))?;
    db::setup_database(&conn)?;
    db::save_tables(&conn, &store.to_tables())?;

    let count = db::count_rows(&conn, "comuni")?;
    println!("✓ Imported {} comuni into {}", count, to.display());

    Ok(())
}

fn run_lookup(engine: &CivicEngine, query: &str, json: bool) -> Result<()> {
    let result = engine.lookup(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        LookupResult::Success {
            municipality,
            matched_by,
            lower_chamber_reps,
            upper_chamber_reps,
            eu_reps,
            counts,
            ..
        } => {
            println!("LOCATION: {}", municipality.display());
            if matched_by == MatchPhase::Contains {
                println!("(corrispondenza parziale per '{}')", query.trim());
            }
            println!("\nTotale rappresentanti: {}", counts.total);

            if !lower_chamber_reps.is_empty() {
                println!("\nCAMERA DEI DEPUTATI ({}):", counts.lower_chamber);
                for m in &lower_chamber_reps {
                    println!("  - {} {} ({}) - {}", m.name, m.surname, m.party, m.email);
                }
            }

            if !upper_chamber_reps.is_empty() {
                println!("\nSENATO DELLA REPUBBLICA ({}):", counts.upper_chamber);
                for m in &upper_chamber_reps {
                    println!("  - {} {} ({}) - {}", m.name, m.surname, m.party, m.email);
                }
            }

            if !eu_reps.is_empty() {
                println!("\nPARLAMENTO EUROPEO ({}):", counts.eu_parliament);
                for m in &eu_reps {
                    println!("  - {} {} ({}) - {}", m.name, m.surname, m.party, m.constituency);
                }
            }

            Ok(())
        }
        LookupResult::NotFound { original_query } => {
            Err(anyhow!("Comune non trovato per: {}", original_query))
        }
    }
}

fn run_suggest(engine: &CivicEngine, query: &str, limit: usize, json: bool) -> Result<()> {
    let suggestions = engine.suggest(query, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        for s in &suggestions {
            println!("{}", s.display);
        }
    }

    Ok(())
}

fn run_check(engine: &CivicEngine, json: bool) -> Result<()> {
    let stats = engine.stats();
    let integrity = engine.store().integrity();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "stats": stats,
                "integrity": integrity,
            }))?
        );
        return Ok(());
    }

    println!("Caricati: {} comuni", stats.municipalities);
    println!("Caricati: {} collegi Camera", stats.lower_districts);
    println!("Caricati: {} collegi Senato", stats.upper_districts);
    println!("Caricati: {} deputati", stats.lower_members);
    println!("Caricati: {} senatori", stats.upper_members);
    println!("Caricati: {} MEP", stats.eu_members);
    println!("Fingerprint: {}", stats.fingerprint);

    if integrity.is_clean() {
        println!("\n✓ No integrity gaps");
    } else {
        println!("\n⚠ Integrity gaps:");
        for gap in &integrity.grouping_gaps {
            println!(
                "  - regione '{}' in {} circoscrizioni EU",
                gap.region,
                gap.constituencies.len()
            );
        }
        for id in &integrity.tokenless_districts {
            println!("  - collegio Camera '{}' senza regione", id);
        }
        if integrity.orphan_district_rows > 0 {
            println!("  - {} righe collegio con comune sconosciuto", integrity.orphan_district_rows);
        }
        if integrity.duplicate_district_rows > 0 {
            println!("  - {} righe collegio duplicate", integrity.duplicate_district_rows);
        }
        for region in &integrity.unmatched_member_regions {
            println!("  - regione senatore '{}' senza comuni", region);
        }
        for name in &integrity.unknown_eu_constituencies {
            println!("  - circoscrizione EU '{}' sconosciuta", name);
        }
    }

    Ok(())
}
