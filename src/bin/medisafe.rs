use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use medisafe_engine::{
    catalog::Catalog,
    config::Config,
    consultation::{book_consultation, booking_calendar, ConsultationMode},
    doctors::{DoctorDirectory, DoctorQuery, DoctorSort},
    history::{describe_age, filter_by_source, HistoryRepository, SourceType},
    locale::Translator,
    session::SessionProvider,
    stdio_server,
    subscription::{price_list, Currency, Plan},
    MediSafeEngine,
};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medisafe")]
#[command(about = "Medicine lookup, history and consultation directory")]
#[command(version)]
struct Cli {
    /// SQLite database (overrides MEDISAFE_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// JSON catalog (overrides MEDISAFE_CATALOG_PATH)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank medicines by name
    Search {
        query: String,
        /// Show match tier and score for each result
        #[arg(long)]
        explain: bool,
    },
    /// Rank, then record one result in history
    Select {
        query: String,
        /// Zero-based result index
        #[arg(long, default_value_t = 0)]
        pick: usize,
        /// camera, search or upload
        #[arg(long, default_value = "search")]
        source: String,
    },
    /// Organ risks and alternatives for one search result
    Analyze {
        query: String,
        /// Zero-based result index
        #[arg(long, default_value_t = 0)]
        pick: usize,
    },
    /// Suggested searches
    Popular,
    /// List history for the current user
    History {
        #[arg(long)]
        source: Option<String>,
    },
    /// Remove one history entry
    HistoryRemove { id: String },
    /// Set or clear the note on a history entry
    HistoryNote { id: String, note: Option<String> },
    /// Remove all history for the current user
    HistoryClear,
    Login {
        email: String,
        password: String,
    },
    Register {
        email: String,
        password: String,
        name: String,
        #[arg(long, default_value = "hi")]
        language: String,
    },
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or set the interface language
    Locale { code: Option<String> },
    /// Search the doctor directory
    Doctors {
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long)]
        specialization: Option<String>,
        /// rating, experience, consultations or fee
        #[arg(long, default_value = "rating")]
        sort: String,
    },
    /// List doctor specializations
    Specializations,
    /// Bookable dates and time slots
    Slots,
    /// Book a consultation with a doctor
    Book {
        doctor_id: String,
        /// YYYY-MM-DD
        date: String,
        /// e.g. "02:30 PM" or 14:30
        time: String,
        symptoms: String,
        #[arg(long)]
        audio: bool,
    },
    /// Paid subscription plans
    Plans {
        /// usd or inr
        #[arg(long, default_value = "usd")]
        currency: String,
    },
    /// Activate a paid plan for the signed-in user
    Subscribe {
        /// monthly or yearly
        plan: String,
    },
    /// Run the JSON-RPC server on stdin/stdout
    Serve,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if cli.catalog.is_some() {
        config.catalog_path = cli.catalog;
    }
    let engine = MediSafeEngine::from_config(&config)?;

    match cli.command {
        Commands::Search { query, explain } => cmd_search(&engine, &query, explain),
        Commands::Select {
            query,
            pick,
            source,
        } => cmd_select(&engine, &query, pick, &source),
        Commands::Analyze { query, pick } => {
            let Some(analysis) = engine.analyze(&query, pick) else {
                bail!("no result at position {pick} for '{query}'");
            };
            print_json(&analysis)
        }
        Commands::Popular => print_json(Catalog::popular_searches()),
        Commands::History { source } => cmd_history(&engine, source.as_deref()),
        Commands::HistoryRemove { id } => {
            let removed = engine.history().remove(&id)?;
            print_json(&json!({ "id": id, "removed": removed }))
        }
        Commands::HistoryNote { id, note } => {
            let updated = engine.history().set_notes(&id, note.as_deref())?;
            print_json(&json!({ "id": id, "updated": updated, "notes": note }))
        }
        Commands::HistoryClear => {
            let user_id = engine.session().history_user_id()?;
            let removed = engine.history().clear(&user_id)?;
            print_json(&json!({ "userId": user_id, "removed": removed }))
        }
        Commands::Login { email, password } => {
            let Some(user) = engine.session().login(&email, &password)? else {
                bail!("login rejected: email required and password must be at least 6 characters");
            };
            print_json(&user)
        }
        Commands::Register {
            email,
            password,
            name,
            language,
        } => {
            let Some(user) = engine
                .session()
                .register(&email, &password, &name, &language)?
            else {
                bail!("registration rejected: invalid details or email already registered");
            };
            print_json(&user)
        }
        Commands::Logout => {
            engine.session().logout()?;
            print_json(&json!({ "status": "signed out" }))
        }
        Commands::Whoami => print_json(&engine.session().current_user()?),
        Commands::Locale { code } => cmd_locale(&engine, code.as_deref()),
        Commands::Doctors {
            text,
            specialization,
            sort,
        } => {
            let Some(sort) = DoctorSort::parse_str(&sort) else {
                bail!("unknown sort: {sort}");
            };
            let directory = DoctorDirectory::builtin();
            let found = directory.find(&DoctorQuery {
                text,
                specialization,
                sort,
            });
            print_json(&found)
        }
        Commands::Specializations => print_json(&DoctorDirectory::builtin().specializations()),
        Commands::Slots => print_json(&booking_calendar(chrono::Local::now().date_naive())),
        Commands::Book {
            doctor_id,
            date,
            time,
            symptoms,
            audio,
        } => {
            let directory = DoctorDirectory::builtin();
            let Some(doctor) = directory.get(&doctor_id) else {
                bail!("unknown doctor: {doctor_id}");
            };
            let mode = if audio {
                ConsultationMode::Audio
            } else {
                ConsultationMode::Video
            };
            let user_id = engine.session().history_user_id()?;
            let booked = book_consultation(&user_id, doctor, &date, &time, mode, &symptoms)?;
            print_json(&booked)
        }
        Commands::Plans { currency } => cmd_plans(&currency),
        Commands::Subscribe { plan } => {
            let Some(plan) = Plan::parse_str(&plan) else {
                bail!("unknown plan: {plan} (expected monthly or yearly)");
            };
            let Some(user) = engine.session().subscribe(plan)? else {
                bail!("sign in first; only monthly and yearly plans can be bought");
            };
            print_json(&user)
        }
        Commands::Serve => stdio_server::run(&engine),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MEDISAFE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("medisafe_engine=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_source(raw: &str) -> Result<SourceType> {
    match SourceType::parse_str(raw) {
        Some(source) => Ok(source),
        None => bail!("unknown source: {raw} (expected camera, search or upload)"),
    }
}

fn cmd_search(engine: &MediSafeEngine, query: &str, explain: bool) -> Result<()> {
    if !explain {
        return print_json(&engine.search(query));
    }
    let search = medisafe_engine::search::SearchEngine::new(engine.catalog(), engine.rank_options());
    let scored: Vec<_> = search
        .explain(query)
        .iter()
        .map(|m| {
            json!({
                "id": m.medicine.id,
                "name": m.medicine.name,
                "score": m.score,
                "tier": m.tier.as_str(),
            })
        })
        .collect();
    print_json(&scored)
}

fn cmd_select(engine: &MediSafeEngine, query: &str, pick: usize, source: &str) -> Result<()> {
    let source = parse_source(source)?;
    let Some(entry) = engine.select(query, pick, source)? else {
        bail!("no result at position {pick} for '{query}'");
    };
    print_json(&entry)
}

fn cmd_history(engine: &MediSafeEngine, source: Option<&str>) -> Result<()> {
    let source = source.map(parse_source).transpose()?;
    let user_id = engine.session().history_user_id()?;
    let translator = Translator::new(&engine.session().locale()?);
    let now = chrono::Utc::now();

    let entries: Vec<_> = filter_by_source(engine.history().list(&user_id)?, source)
        .into_iter()
        .map(|entry| {
            json!({
                "id": entry.id,
                "medicine": entry.medicine.name,
                "risk": translator.t(entry.medicine.risk_level.label_key()),
                "source": translator.t(entry.search_type.label_key()),
                "query": entry.search_query,
                "when": describe_age(&entry.timestamp, now),
            })
        })
        .collect();
    print_json(&json!({ "userId": user_id, "entries": entries }))
}

fn cmd_locale(engine: &MediSafeEngine, code: Option<&str>) -> Result<()> {
    let session = engine.session();
    if let Some(code) = code {
        if !session.set_locale(code)? {
            bail!("unsupported language: {code}");
        }
    }
    print_json(&json!({ "language": session.locale()? }))
}

fn cmd_plans(currency: &str) -> Result<()> {
    let Some(currency) = Currency::parse_str(currency) else {
        bail!("unknown currency: {currency} (expected usd or inr)");
    };
    print_json(&price_list(currency))
}
