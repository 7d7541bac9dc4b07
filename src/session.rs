use crate::history::GUEST_USER_ID;
use crate::locale::{self, DEFAULT_LANGUAGE};
use crate::subscription::{self, Plan, Subscription};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

pub const MIN_PASSWORD_CHARS: usize = 6;

const KEY_SESSION_USER: &str = "session_user_id";
const KEY_LANGUAGE: &str = "language";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub preferred_language: String,
    pub created_at: String,
    pub subscription: Option<Subscription>,
}

/// Who is signed in and which language they read. Authentication is a mock:
/// credentials are checked for shape only.
pub trait SessionProvider {
    fn current_user(&self) -> Result<Option<User>>;

    /// `Ok(None)` when the credentials are rejected.
    fn login(&self, email: &str, password: &str) -> Result<Option<User>>;

    /// `Ok(None)` when the details are rejected or the email is taken.
    fn register(&self, email: &str, password: &str, name: &str, language: &str)
        -> Result<Option<User>>;

    fn logout(&self) -> Result<()>;

    fn locale(&self) -> Result<String>;

    /// Returns false, leaving the locale unchanged, for unsupported codes.
    fn set_locale(&self, language: &str) -> Result<bool>;

    /// Puts the signed-in user on a paid plan. `Ok(None)` when nobody is
    /// signed in or the plan is not sold.
    fn subscribe(&self, plan: Plan) -> Result<Option<User>>;

    /// Owner id for history writes: the signed-in user, or the guest.
    fn history_user_id(&self) -> Result<String> {
        Ok(self
            .current_user()?
            .map(|u| u.id)
            .unwrap_or_else(|| GUEST_USER_ID.to_string()))
    }
}

fn credentials_acceptable(email: &str, password: &str) -> bool {
    !email.trim().is_empty() && password.chars().count() >= MIN_PASSWORD_CHARS
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct SqliteSession {
    db: Arc<Mutex<Connection>>,
}

impl SqliteSession {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn get_pref(conn: &Connection, key: &str) -> Result<Option<String>> {
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_pref(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn user_by(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT id, email, name, preferred_language, created_at, subscription_json
             FROM users WHERE {column} = ?1"
        );
        let row = conn
            .query_row(&sql, params![value], |row| {
                Ok((
                    User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        name: row.get(2)?,
                        preferred_language: row.get(3)?,
                        created_at: row.get(4)?,
                        subscription: None,
                    },
                    row.get::<_, Option<String>>(5)?,
                ))
            })
            .optional()?;

        let Some((mut user, subscription_json)) = row else {
            return Ok(None);
        };
        let subscription = match subscription_json {
            Some(json) => serde_json::from_str(&json)?,
            None => {
                let placeholder = Subscription::placeholder(&user.id, Utc::now());
                Self::store_subscription(conn, &user.id, &placeholder)?;
                placeholder
            }
        };
        user.subscription = Some(subscription);
        Ok(Some(user))
    }

    fn store_subscription(conn: &Connection, user_id: &str, subscription: &Subscription) -> Result<()> {
        conn.execute(
            "UPDATE users SET subscription_json = ?1 WHERE id = ?2",
            params![serde_json::to_string(subscription)?, user_id],
        )?;
        Ok(())
    }

    fn insert_user(conn: &Connection, user: &User) -> Result<()> {
        let subscription_json = user
            .subscription
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        conn.execute(
            "INSERT INTO users (id, email, name, preferred_language, created_at, subscription_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.name,
                user.preferred_language,
                user.created_at,
                subscription_json,
            ],
        )?;
        Ok(())
    }

    fn start_session(conn: &Connection, user: &User) -> Result<()> {
        Self::set_pref(conn, KEY_SESSION_USER, &user.id)?;
        if locale::is_supported(&user.preferred_language) {
            Self::set_pref(conn, KEY_LANGUAGE, &user.preferred_language)?;
        }
        info!(user_id = %user.id, "session started");
        Ok(())
    }
}

impl SessionProvider for SqliteSession {
    fn current_user(&self) -> Result<Option<User>> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        match Self::get_pref(&conn, KEY_SESSION_USER)? {
            Some(id) => Self::user_by(&conn, "id", &id),
            None => Ok(None),
        }
    }

    fn login(&self, email: &str, password: &str) -> Result<Option<User>> {
        if !credentials_acceptable(email, password) {
            warn!("login rejected");
            return Ok(None);
        }
        let email = normalize_email(email);
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;

        let user = match Self::user_by(&conn, "email", &email)? {
            Some(user) => user,
            None => {
                let now = Utc::now();
                let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, email.as_bytes()).to_string();
                let user = User {
                    name: email.split('@').next().unwrap_or_default().to_string(),
                    email: email.clone(),
                    preferred_language: "en".to_string(),
                    created_at: now.to_rfc3339(),
                    subscription: Some(Subscription::placeholder(&id, now)),
                    id,
                };
                Self::insert_user(&conn, &user)?;
                user
            }
        };

        Self::start_session(&conn, &user)?;
        Ok(Some(user))
    }

    fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
        language: &str,
    ) -> Result<Option<User>> {
        if !credentials_acceptable(email, password) || name.trim().is_empty() {
            warn!("registration rejected");
            return Ok(None);
        }
        let email = normalize_email(email);
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;

        if Self::user_by(&conn, "email", &email)?.is_some() {
            warn!("registration rejected: email already registered");
            return Ok(None);
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let language = if locale::is_supported(language) {
            language
        } else {
            DEFAULT_LANGUAGE
        };
        let user = User {
            email,
            name: name.trim().to_string(),
            preferred_language: language.to_string(),
            created_at: now.to_rfc3339(),
            subscription: Some(Subscription::placeholder(&id, now)),
            id,
        };
        Self::insert_user(&conn, &user)?;
        Self::start_session(&conn, &user)?;
        Ok(Some(user))
    }

    fn logout(&self) -> Result<()> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        conn.execute(
            "DELETE FROM preferences WHERE key = ?1",
            params![KEY_SESSION_USER],
        )?;
        info!("session ended");
        Ok(())
    }

    fn locale(&self) -> Result<String> {
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        Ok(Self::get_pref(&conn, KEY_LANGUAGE)?
            .filter(|code| locale::is_supported(code))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()))
    }

    fn set_locale(&self, language: &str) -> Result<bool> {
        if !locale::is_supported(language) {
            return Ok(false);
        }
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        Self::set_pref(&conn, KEY_LANGUAGE, language)?;
        Ok(true)
    }

    fn subscribe(&self, plan: Plan) -> Result<Option<User>> {
        let Some(offer) = subscription::offer_for(plan) else {
            return Ok(None);
        };
        let conn = self.db.lock().map_err(|e| anyhow::anyhow!("{e}"))?;
        let Some(id) = Self::get_pref(&conn, KEY_SESSION_USER)? else {
            return Ok(None);
        };
        let Some(mut user) = Self::user_by(&conn, "id", &id)? else {
            return Ok(None);
        };
        let active = Subscription::activate(&user.id, offer, Utc::now());
        Self::store_subscription(&conn, &user.id, &active)?;
        info!(user_id = %user.id, plan = offer.name, "subscription activated");
        user.subscription = Some(active);
        Ok(Some(user))
    }
}
