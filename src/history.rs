use crate::catalog::MedicineRecord;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// History owner used when nobody is signed in.
pub const GUEST_USER_ID: &str = "guest";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Camera,
    Search,
    Upload,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Search => "search",
            Self::Upload => "upload",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "camera" => Some(Self::Camera),
            "search" => Some(Self::Search),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Camera => "history.scanned",
            Self::Search => "history.searched",
            Self::Upload => "history.uploaded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub medicine: MedicineRecord,
    pub search_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HistoryEntry {
    fn new(
        user_id: &str,
        medicine: &MedicineRecord,
        source: SourceType,
        query: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            medicine: medicine.clone(),
            search_type: source,
            search_query: query.map(str::to_string),
            timestamp: Utc::now().to_rfc3339(),
            notes: None,
        }
    }
}

/// Append-only log of looked-up medicines, partitioned by user.
pub trait HistoryRepository {
    fn append(
        &self,
        user_id: &str,
        medicine: &MedicineRecord,
        source: SourceType,
        query: Option<&str>,
    ) -> Result<HistoryEntry>;

    /// Returns whether an entry was removed.
    fn remove(&self, entry_id: &str) -> Result<bool>;

    /// Replaces the free-text note on an entry; `None` clears it. Returns
    /// whether the entry exists.
    fn set_notes(&self, entry_id: &str, notes: Option<&str>) -> Result<bool>;

    /// Drops every entry owned by `user_id`, returning how many went.
    fn clear(&self, user_id: &str) -> Result<usize>;

    /// Newest first.
    fn list(&self, user_id: &str) -> Result<Vec<HistoryEntry>>;
}

pub struct SqliteHistory {
    db: Arc<Mutex<Connection>>,
}

impl SqliteHistory {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn map_row(row: &rusqlite::Row) -> rusqlite::Result<HistoryEntry> {
        let medicine_json: String = row.get(2)?;
        let medicine = serde_json::from_str(&medicine_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let source: String = row.get(3)?;
        Ok(HistoryEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            medicine,
            search_type: SourceType::parse_str(&source).unwrap_or(SourceType::Search),
            search_query: row.get(4)?,
            timestamp: row.get(5)?,
            notes: row.get(6)?,
        })
    }
}

impl HistoryRepository for SqliteHistory {
    fn append(
        &self,
        user_id: &str,
        medicine: &MedicineRecord,
        source: SourceType,
        query: Option<&str>,
    ) -> Result<HistoryEntry> {
        let entry = HistoryEntry::new(user_id, medicine, source, query);
        let snapshot = serde_json::to_string(&entry.medicine)?;
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        conn.execute(
            "INSERT INTO history (id, user_id, medicine_json, source_type, search_query, created_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id,
                entry.user_id,
                snapshot,
                entry.search_type.as_str(),
                entry.search_query,
                entry.timestamp,
                entry.notes,
            ],
        )?;
        Ok(entry)
    }

    fn remove(&self, entry_id: &str) -> Result<bool> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let removed = conn.execute("DELETE FROM history WHERE id = ?1", params![entry_id])?;
        Ok(removed > 0)
    }

    fn set_notes(&self, entry_id: &str, notes: Option<&str>) -> Result<bool> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let updated = conn.execute(
            "UPDATE history SET notes = ?1 WHERE id = ?2",
            params![notes, entry_id],
        )?;
        Ok(updated > 0)
    }

    fn clear(&self, user_id: &str) -> Result<usize> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let removed = conn.execute("DELETE FROM history WHERE user_id = ?1", params![user_id])?;
        Ok(removed)
    }

    fn list(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, medicine_json, source_type, search_query, created_at, notes
             FROM history
             WHERE user_id = ?1
             ORDER BY seq DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to read history")?;
        Ok(rows)
    }
}

/// Process-local history, for tests and callers without a database.
#[derive(Default)]
pub struct InMemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryRepository for InMemoryHistory {
    fn append(
        &self,
        user_id: &str,
        medicine: &MedicineRecord,
        source: SourceType,
        query: Option<&str>,
    ) -> Result<HistoryEntry> {
        let entry = HistoryEntry::new(user_id, medicine, source, query);
        let mut entries = self.entries.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        entries.insert(0, entry.clone());
        Ok(entry)
    }

    fn remove(&self, entry_id: &str) -> Result<bool> {
        let mut entries = self.entries.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let before = entries.len();
        entries.retain(|e| e.id != entry_id);
        Ok(entries.len() != before)
    }

    fn set_notes(&self, entry_id: &str, notes: Option<&str>) -> Result<bool> {
        let mut entries = self.entries.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        match entries.iter_mut().find(|e| e.id == entry_id) {
            Some(entry) => {
                entry.notes = notes.map(str::to_string);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn clear(&self, user_id: &str) -> Result<usize> {
        let mut entries = self.entries.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let before = entries.len();
        entries.retain(|e| e.user_id != user_id);
        Ok(before - entries.len())
    }

    fn list(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }
}

pub fn filter_by_source(entries: Vec<HistoryEntry>, source: Option<SourceType>) -> Vec<HistoryEntry> {
    match source {
        None => entries,
        Some(source) => entries
            .into_iter()
            .filter(|e| e.search_type == source)
            .collect(),
    }
}

/// Coarse age label for a history timestamp. Unparseable input is returned as-is.
pub fn describe_age(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(at) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let at = at.with_timezone(&Utc);
    let hours = (now - at).num_hours();

    if now < at || (now - at).num_minutes() < 60 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours} hours ago")
    } else if hours < 48 {
        "Yesterday".to_string()
    } else {
        at.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::MediSafeEngine;
    use chrono::Duration;

    fn repositories() -> Vec<Box<dyn HistoryRepository>> {
        let engine = MediSafeEngine::in_memory().unwrap();
        vec![
            Box::new(SqliteHistory::new(engine.db().clone())),
            Box::new(InMemoryHistory::new()),
        ]
    }

    #[test]
    fn append_then_list_newest_first() {
        let catalog = Catalog::builtin();
        let para = catalog.get("1").unwrap();
        let ibu = catalog.get("2").unwrap();
        for repo in repositories() {
            repo.append("u1", para, SourceType::Search, Some("crocin")).unwrap();
            repo.append("u1", ibu, SourceType::Camera, None).unwrap();

            let listed = repo.list("u1").unwrap();
            assert_eq!(listed.len(), 2);
            assert_eq!(listed[0].medicine.name, "Ibuprofen");
            assert_eq!(listed[0].search_type, SourceType::Camera);
            assert_eq!(listed[1].medicine, *para);
            assert_eq!(listed[1].search_query.as_deref(), Some("crocin"));
        }
    }

    #[test]
    fn users_do_not_see_each_other() {
        let catalog = Catalog::builtin();
        let para = catalog.get("1").unwrap();
        for repo in repositories() {
            repo.append("u1", para, SourceType::Search, None).unwrap();
            repo.append(GUEST_USER_ID, para, SourceType::Upload, None).unwrap();
            assert_eq!(repo.list("u1").unwrap().len(), 1);
            assert_eq!(repo.list(GUEST_USER_ID).unwrap().len(), 1);
            assert!(repo.list("nobody").unwrap().is_empty());
        }
    }

    #[test]
    fn remove_single_entry() {
        let catalog = Catalog::builtin();
        let para = catalog.get("1").unwrap();
        for repo in repositories() {
            let kept = repo.append("u1", para, SourceType::Search, None).unwrap();
            let gone = repo.append("u1", para, SourceType::Search, None).unwrap();
            assert!(repo.remove(&gone.id).unwrap());
            assert!(!repo.remove(&gone.id).unwrap());
            let listed = repo.list("u1").unwrap();
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].id, kept.id);
        }
    }

    #[test]
    fn notes_round_through_storage() {
        let catalog = Catalog::builtin();
        let para = catalog.get("1").unwrap();
        for repo in repositories() {
            let entry = repo.append("u1", para, SourceType::Search, None).unwrap();
            assert!(repo.set_notes(&entry.id, Some("took with food")).unwrap());
            assert_eq!(repo.list("u1").unwrap()[0].notes.as_deref(), Some("took with food"));

            assert!(repo.set_notes(&entry.id, None).unwrap());
            assert!(repo.list("u1").unwrap()[0].notes.is_none());
            assert!(!repo.set_notes("missing", Some("x")).unwrap());
        }
    }

    #[test]
    fn clear_only_touches_one_user() {
        let catalog = Catalog::builtin();
        let para = catalog.get("1").unwrap();
        for repo in repositories() {
            repo.append("u1", para, SourceType::Search, None).unwrap();
            repo.append("u1", para, SourceType::Camera, None).unwrap();
            repo.append("u2", para, SourceType::Search, None).unwrap();
            assert_eq!(repo.clear("u1").unwrap(), 2);
            assert!(repo.list("u1").unwrap().is_empty());
            assert_eq!(repo.list("u2").unwrap().len(), 1);
        }
    }

    #[test]
    fn synthetic_snapshot_survives_storage() {
        let mut rng = <rand::rngs::StdRng as rand::SeedableRng>::seed_from_u64(5);
        let generated = crate::search::synthetic::generate("zolpimax", &mut rng);
        for repo in repositories() {
            repo.append("u1", &generated, SourceType::Search, Some("zolpimax")).unwrap();
            let listed = repo.list("u1").unwrap();
            assert!(listed[0].medicine.is_synthetic());
            assert_eq!(listed[0].medicine, generated);
        }
    }

    #[test]
    fn filter_keeps_matching_source() {
        let catalog = Catalog::builtin();
        let para = catalog.get("1").unwrap();
        let repo = InMemoryHistory::new();
        repo.append("u1", para, SourceType::Search, None).unwrap();
        repo.append("u1", para, SourceType::Upload, None).unwrap();
        let all = repo.list("u1").unwrap();
        assert_eq!(filter_by_source(all.clone(), None).len(), 2);
        let uploads = filter_by_source(all, Some(SourceType::Upload));
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].search_type, SourceType::Upload);
    }

    #[test]
    fn entry_serializes_camel_case() {
        let catalog = Catalog::builtin();
        let repo = InMemoryHistory::new();
        let entry = repo
            .append("u1", catalog.get("1").unwrap(), SourceType::Camera, None)
            .unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["searchType"], "camera");
        assert_eq!(json["medicine"]["genericName"], "Acetaminophen");
        assert!(json.get("searchQuery").is_none());
    }

    #[test]
    fn age_labels() {
        let now = Utc::now();
        let at = |d: Duration| (now - d).to_rfc3339();
        assert_eq!(describe_age(&at(Duration::minutes(5)), now), "Just now");
        assert_eq!(describe_age(&at(Duration::hours(3)), now), "3 hours ago");
        assert_eq!(describe_age(&at(Duration::hours(30)), now), "Yesterday");
        let old = now - Duration::days(10);
        assert_eq!(
            describe_age(&old.to_rfc3339(), now),
            old.format("%Y-%m-%d").to_string()
        );
        assert_eq!(describe_age("not a date", now), "not a date");
    }
}
