use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{RememberedSession, SessionData, SessionToken, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpiryPolicy {
    pub ttl: Duration,
    pub logout_quarantine: Duration,
}

impl Default for SessionExpiryPolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            logout_quarantine: Duration::minutes(5),
        }
    }
}

impl SessionExpiryPolicy {
    pub fn issue(&self, token: impl Into<String>, now: DateTime<Utc>) -> SessionToken {
        SessionToken::issue(token, now, self.ttl)
    }

    pub fn is_valid(&self, session: &SessionToken, now: DateTime<Utc>) -> bool {
        now < session.expiry
    }

    /// Remembered sessions stay locked out for the quarantine window after an explicit logout.
    pub fn may_restore(&self, logged_out_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match logged_out_at {
            Some(at) => now - at >= self.logout_quarantine,
            None => true,
        }
    }
}

/// Explicit session state, persisted in the local store.
#[derive(Clone)]
pub struct SessionContext {
    db: Arc<Mutex<Connection>>,
    policy: SessionExpiryPolicy,
}

const ACTIVE_KEYS: &[&str] = &[
    queries::ADMIN_TOKEN,
    queries::ADMIN_SESSION_DATA,
    queries::USER,
];

impl SessionContext {
    pub fn new(db: Arc<Mutex<Connection>>, policy: SessionExpiryPolicy) -> Self {
        Self { db, policy }
    }

    pub fn policy(&self) -> &SessionExpiryPolicy {
        &self.policy
    }

    fn store(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| anyhow::anyhow!("local store lock poisoned"))
    }

    pub fn login(
        &self,
        token: &str,
        user: Option<User>,
        remember: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<SessionToken> {
        let session = self.policy.issue(token, now);
        let conn = self.store()?;

        write_active(&conn, &session, user.as_ref(), remember)?;
        if remember {
            queries::set_json(
                &conn,
                queries::REMEMBERED_SESSION,
                &RememberedSession {
                    session: session.clone(),
                    user,
                },
            )?;
        } else {
            queries::remove_values(&conn, &[queries::REMEMBERED_SESSION])?;
        }
        queries::remove_values(&conn, &[queries::ADMIN_LOGOUT_AT])?;

        tracing::info!(expiry = %session.expiry, remember, "session started");
        Ok(session)
    }

    /// The active session, if any. An expired one is purged on the way.
    pub fn current(&self, now: DateTime<Utc>) -> anyhow::Result<Option<SessionToken>> {
        let conn = self.store()?;
        let Some(session) = read_active(&conn)? else {
            return Ok(None);
        };

        if self.policy.is_valid(&session, now) {
            return Ok(Some(session));
        }

        queries::remove_values(&conn, ACTIVE_KEYS)?;
        tracing::info!(expiry = %session.expiry, "session expired");
        Ok(None)
    }

    pub fn user(&self) -> anyhow::Result<Option<User>> {
        let conn = self.store()?;
        queries::get_json(&conn, queries::USER)
    }

    pub fn logout(&self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let conn = self.store()?;
        queries::remove_values(&conn, ACTIVE_KEYS)?;
        queries::set_value(&conn, queries::ADMIN_LOGOUT_AT, &now.to_rfc3339())?;
        tracing::info!("session ended by logout");
        Ok(())
    }

    /// Reinstates the remembered session when there is no active one.
    pub fn restore(&self, now: DateTime<Utc>) -> anyhow::Result<Option<SessionToken>> {
        if let Some(active) = self.current(now)? {
            return Ok(Some(active));
        }

        let conn = self.store()?;
        let Some(remembered) =
            queries::get_json::<RememberedSession>(&conn, queries::REMEMBERED_SESSION)?
        else {
            return Ok(None);
        };

        if !self.policy.is_valid(&remembered.session, now) {
            queries::remove_values(&conn, &[queries::REMEMBERED_SESSION])?;
            tracing::info!("remembered session expired, forgetting it");
            return Ok(None);
        }

        let logged_out_at = queries::get_value(&conn, queries::ADMIN_LOGOUT_AT)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc));
        if !self.policy.may_restore(logged_out_at, now) {
            tracing::debug!("remembered session not restored, logout quarantine active");
            return Ok(None);
        }

        write_active(&conn, &remembered.session, remembered.user.as_ref(), true)?;
        tracing::info!(expiry = %remembered.session.expiry, "remembered session restored");
        Ok(Some(remembered.session))
    }
}

fn write_active(
    conn: &Connection,
    session: &SessionToken,
    user: Option<&User>,
    remember: bool,
) -> anyhow::Result<()> {
    queries::set_value(conn, queries::ADMIN_TOKEN, &session.token)?;
    queries::set_json(
        conn,
        queries::ADMIN_SESSION_DATA,
        &SessionData {
            issued_at: session.issued_at,
            expiry: session.expiry,
            remember,
        },
    )?;
    match user {
        Some(user) => queries::set_json(conn, queries::USER, user)?,
        None => {
            queries::remove_values(conn, &[queries::USER])?;
        }
    }
    Ok(())
}

fn read_active(conn: &Connection) -> anyhow::Result<Option<SessionToken>> {
    let token = queries::get_value(conn, queries::ADMIN_TOKEN)?;
    let data: Option<SessionData> = queries::get_json(conn, queries::ADMIN_SESSION_DATA)?;
    Ok(match (token, data) {
        (Some(token), Some(data)) => Some(SessionToken {
            token,
            issued_at: data.issued_at,
            expiry: data.expiry,
        }),
        _ => None,
    })
}
