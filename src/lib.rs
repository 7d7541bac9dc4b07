pub mod analysis;
pub mod catalog;
pub mod config;
pub mod consultation;
pub mod doctors;
pub mod history;
pub mod locale;
pub mod schema;
pub mod search;
pub mod session;
pub mod stdio_server;
pub mod subscription;

use analysis::MedicineAnalysis;
use anyhow::Result;
use catalog::{Catalog, MedicineRecord};
use config::Config;
use history::{HistoryEntry, HistoryRepository, SourceType, SqliteHistory};
use rusqlite::Connection;
use search::request::{RequestToken, RequestTracker};
use search::{RankOptions, SearchEngine, SearchOutcome};
use session::{SessionProvider, SqliteSession};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

/// Shared handle over the local database and the loaded catalog.
#[derive(Clone)]
pub struct MediSafeEngine {
    db: Arc<Mutex<Connection>>,
    catalog: Arc<Catalog>,
    rank_options: RankOptions,
    instance_id: String,
    requests: Arc<RequestTracker>,
    last_search: Arc<Mutex<Option<SearchOutcome>>>,
}

impl MediSafeEngine {
    pub fn new(db_path: &Path, catalog: Catalog, rank_options: RankOptions) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        schema::run_migrations(&conn)?;
        info!(db = %db_path.display(), medicines = catalog.len(), "engine opened");
        Ok(Self::from_parts(conn, catalog, rank_options))
    }

    /// Opens the database and catalog named by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::from_json_file(path)?,
            None => Catalog::builtin(),
        };
        Self::new(&config.db_path, catalog, config.rank)
    }

    /// Built-in catalog over an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self::from_parts(conn, Catalog::builtin(), RankOptions::default()))
    }

    fn from_parts(conn: Connection, catalog: Catalog, rank_options: RankOptions) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            catalog: Arc::new(catalog),
            rank_options,
            instance_id: Uuid::new_v4().to_string(),
            requests: Arc::new(RequestTracker::new()),
            last_search: Arc::new(Mutex::new(None)),
        }
    }

    pub fn db(&self) -> &Arc<Mutex<Connection>> {
        &self.db
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rank_options(&self) -> RankOptions {
        self.rank_options
    }

    /// Unique per process; tags log lines from this engine.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn history(&self) -> SqliteHistory {
        SqliteHistory::new(self.db.clone())
    }

    pub fn session(&self) -> SqliteSession {
        SqliteSession::new(self.db.clone())
    }

    /// Ranks `query` and remembers the outcome, unless a newer search was
    /// started meanwhile.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let token = self.requests.issue();
        let outcome = SearchEngine::new(&self.catalog, self.rank_options).search(query);
        self.remember(token, &outcome);
        outcome
    }

    fn remember(&self, token: RequestToken, outcome: &SearchOutcome) {
        if !self.requests.is_current(token) {
            debug!(query = %outcome.query, "stale search result dropped");
            return;
        }
        if let Ok(mut last) = self.last_search.lock() {
            *last = Some(outcome.clone());
        }
    }

    /// The results last shown for `query`, so a fallback record keeps its
    /// id, risk and score. Ranks afresh when `query` was not the last search.
    pub fn shown(&self, query: &str) -> SearchOutcome {
        let remembered = self
            .last_search
            .lock()
            .ok()
            .and_then(|last| last.clone())
            .filter(|outcome| outcome.query == query.trim());
        match remembered {
            Some(outcome) => outcome,
            None => self.search(query),
        }
    }

    /// Appends an already-chosen record to the current user's history.
    pub fn record(
        &self,
        medicine: &MedicineRecord,
        query: Option<&str>,
        source: SourceType,
    ) -> Result<HistoryEntry> {
        let user_id = self.session().history_user_id()?;
        let entry = self.history().append(&user_id, medicine, source, query)?;
        info!(
            instance = %self.instance_id,
            user_id = %user_id,
            medicine = %medicine.name,
            source = source.as_str(),
            "selection recorded"
        );
        Ok(entry)
    }

    /// Records result number `pick` (zero-based) of the results shown for
    /// `query`. `None` when there is no such result.
    pub fn select(
        &self,
        query: &str,
        pick: usize,
        source: SourceType,
    ) -> Result<Option<HistoryEntry>> {
        let outcome = self.shown(query);
        let Some(medicine) = outcome.results.get(pick) else {
            return Ok(None);
        };
        self.record(medicine, Some(outcome.query.as_str()), source)
            .map(Some)
    }

    /// Mock analysis of result number `pick` of the results shown for `query`.
    pub fn analyze(&self, query: &str, pick: usize) -> Option<MedicineAnalysis> {
        self.shown(query).results.get(pick).map(analysis::analyze)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_in_memory_engine() {
        let engine = MediSafeEngine::in_memory().unwrap();
        assert_eq!(engine.catalog().len(), 70);
        assert_eq!(engine.rank_options(), RankOptions::default());
    }

    #[test]
    fn clones_share_the_database() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let other = engine.clone();
        let para = engine.catalog().get("1").unwrap().clone();
        engine
            .history()
            .append("guest", &para, SourceType::Search, None)
            .unwrap();
        assert_eq!(other.history().list("guest").unwrap().len(), 1);
        assert_eq!(engine.instance_id(), other.instance_id());
    }

    #[test]
    fn select_records_for_signed_in_user() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let guest = engine.select("crocin", 0, SourceType::Search).unwrap().unwrap();
        assert_eq!(guest.user_id, history::GUEST_USER_ID);
        assert_eq!(guest.medicine.name, "Crocin");
        assert_eq!(guest.search_query.as_deref(), Some("crocin"));

        let user = engine.session().login("asha@example.com", "secret1").unwrap().unwrap();
        let entry = engine.select("crocin", 1, SourceType::Camera).unwrap().unwrap();
        assert_eq!(entry.user_id, user.id);
        assert_eq!(entry.medicine.name, "Paracetamol");
        assert_eq!(entry.search_type, SourceType::Camera);
    }

    #[test]
    fn history_follows_the_session() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let session = engine.session();
        engine.select("omez", 0, SourceType::Search).unwrap();

        let asha = session.login("asha@example.com", "secret1").unwrap().unwrap();
        engine.select("crocin", 0, SourceType::Search).unwrap();
        engine.select("dolo", 0, SourceType::Camera).unwrap();
        session.logout().unwrap();

        let repo = engine.history();
        let guest_names: Vec<String> = repo
            .list(history::GUEST_USER_ID)
            .unwrap()
            .into_iter()
            .map(|e| e.medicine.name)
            .collect();
        assert_eq!(guest_names, vec!["Omeprazole"]);
        assert_eq!(repo.list(&asha.id).unwrap().len(), 2);

        session.login("asha@example.com", "secret1").unwrap();
        assert_eq!(repo.clear(&session.history_user_id().unwrap()).unwrap(), 2);
        assert_eq!(repo.list(history::GUEST_USER_ID).unwrap().len(), 1);
    }

    #[test]
    fn select_out_of_range_records_nothing() {
        let engine = MediSafeEngine::in_memory().unwrap();
        assert!(engine.select("crocin", 40, SourceType::Search).unwrap().is_none());
        assert!(engine.select("   ", 0, SourceType::Search).unwrap().is_none());
        assert!(engine.history().list(history::GUEST_USER_ID).unwrap().is_empty());
    }

    #[test]
    fn selecting_synthetic_result_is_recorded() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let entry = engine.select("zzqx", 0, SourceType::Upload).unwrap().unwrap();
        assert!(entry.medicine.is_synthetic());
        assert_eq!(entry.medicine.name, "Zzqx");
    }

    #[test]
    fn selected_fallback_is_the_one_shown() {
        let engine = MediSafeEngine::in_memory().unwrap();
        for _ in 0..20 {
            let shown = engine.search("zzqx").results[0].clone();
            let recorded = engine.select(" zzqx ", 0, SourceType::Search).unwrap().unwrap();
            assert_eq!(recorded.medicine, shown);
            assert_eq!(engine.analyze("zzqx", 0).unwrap().medicine, shown);
        }
    }

    #[test]
    fn record_keeps_the_given_record() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let shown = engine.search("qwertyx").results[0].clone();
        engine.search("omez");
        let entry = engine.record(&shown, Some("qwertyx"), SourceType::Upload).unwrap();
        assert_eq!(entry.medicine, shown);
        assert_eq!(engine.history().list(history::GUEST_USER_ID).unwrap()[0].medicine, shown);
    }

    #[test]
    fn superseded_search_is_not_remembered() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let older = engine.requests.issue();
        let newer = engine.requests.issue();
        let omez = SearchEngine::new(engine.catalog(), engine.rank_options()).search("omez");
        let crocin = SearchEngine::new(engine.catalog(), engine.rank_options()).search("crocin");
        engine.remember(newer, &omez);
        engine.remember(older, &crocin);

        let remembered = engine.last_search.lock().unwrap().clone().unwrap();
        assert_eq!(remembered.query, "omez");
    }

    #[test]
    fn analysis_follows_the_pick() {
        let engine = MediSafeEngine::in_memory().unwrap();
        let analysis = engine.analyze("omez", 0).unwrap();
        assert_eq!(analysis.organ_risks[0].organ, "Stomach");
        assert!(engine.analyze("omez", 5).is_none());
    }

    #[test]
    fn file_database_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medisafe.db");
        {
            let engine =
                MediSafeEngine::new(&path, Catalog::builtin(), RankOptions::default()).unwrap();
            engine.session().login("asha@example.com", "secret1").unwrap();
        }
        let engine = MediSafeEngine::new(&path, Catalog::builtin(), RankOptions::default()).unwrap();
        let user = engine.session().current_user().unwrap().unwrap();
        assert_eq!(user.email, "asha@example.com");
    }

    #[test]
    fn from_config_loads_custom_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(
            &catalog_path,
            r#"[{"id": "x1", "name": "Zincovit", "genericName": "Multivitamin",
                 "manufacturer": "Apex", "riskLevel": "safe", "overallScore": 8.8}]"#,
        )
        .unwrap();
        let config = Config {
            home: dir.path().to_path_buf(),
            db_path: dir.path().join("m.db"),
            catalog_path: Some(catalog_path),
            rank: RankOptions::default(),
        };
        let engine = MediSafeEngine::from_config(&config).unwrap();
        assert_eq!(engine.catalog().len(), 1);
        assert_eq!(engine.catalog().records()[0].name, "Zincovit");
    }
}
