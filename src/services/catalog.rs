use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::db::queries;
use crate::services::api::{ApiError, BookingApi};

pub const DEFAULT_NATIONALITIES: &[&str] = &[
    "Filipino",
    "American",
    "Australian",
    "British",
    "Chinese",
    "Japanese",
    "Korean",
    "Other",
];

pub const DEFAULT_ROOM_TYPES: &[&str] = &["Standard", "Deluxe", "Family", "Suite"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Nationalities,
    RoomTypes,
}

impl CatalogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Nationalities => "nationalities",
            CatalogKind::RoomTypes => "room_types",
        }
    }

    fn defaults(&self) -> Vec<String> {
        let list = match self {
            CatalogKind::Nationalities => DEFAULT_NATIONALITIES,
            CatalogKind::RoomTypes => DEFAULT_ROOM_TYPES,
        };
        list.iter().map(|s| s.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Remote,
    Cache,
    Defaults,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Catalog {
    pub items: Vec<String>,
    pub source: CatalogSource,
}

/// Catalog lookups that never fail: remote, then last good copy, then built-in defaults.
pub struct CatalogService {
    api: Arc<dyn BookingApi>,
    db: Arc<Mutex<Connection>>,
}

impl CatalogService {
    pub fn new(api: Arc<dyn BookingApi>, db: Arc<Mutex<Connection>>) -> Self {
        Self { api, db }
    }

    pub async fn get(&self, kind: CatalogKind) -> Catalog {
        let fetched = match kind {
            CatalogKind::Nationalities => self.api.nationalities().await,
            CatalogKind::RoomTypes => self.api.room_types().await,
        };

        match fetched {
            Ok(items) if !items.is_empty() => {
                self.remember(kind, &items);
                Catalog {
                    items,
                    source: CatalogSource::Remote,
                }
            }
            Ok(_) => self.fallback(kind, &ApiError::MalformedResponse("empty catalog".to_string())),
            Err(e) => self.fallback(kind, &e),
        }
    }

    fn remember(&self, kind: CatalogKind, items: &[String]) {
        let Ok(conn) = self.db.lock() else {
            return;
        };
        if let Err(e) = queries::set_json(&conn, &queries::catalog_key(kind.as_str()), &items) {
            tracing::warn!(catalog = kind.as_str(), error = %e, "failed to cache catalog");
        }
    }

    fn fallback(&self, kind: CatalogKind, cause: &ApiError) -> Catalog {
        let cached = self.db.lock().ok().and_then(|conn| {
            queries::get_json::<Vec<String>>(&conn, &queries::catalog_key(kind.as_str()))
                .ok()
                .flatten()
        });

        match cached {
            Some(items) if !items.is_empty() => {
                tracing::warn!(catalog = kind.as_str(), error = %cause, "using cached catalog");
                Catalog {
                    items,
                    source: CatalogSource::Cache,
                }
            }
            _ => {
                tracing::warn!(catalog = kind.as_str(), error = %cause, "using default catalog");
                Catalog {
                    items: kind.defaults(),
                    source: CatalogSource::Defaults,
                }
            }
        }
    }
}
