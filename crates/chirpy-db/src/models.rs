//! Stored record types, mapped one-to-one onto entries of the database file.
//! Distinct from chirpy-types API models to keep the DB layer independent.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chirpy_types::models::{Chirp, User};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChirpRow {
    pub id: u32,
    pub body: String,
    pub author_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: u32,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default, alias = "is_upgraded")]
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRow {
    pub token: String,
    pub user_id: u32,
    pub created_at: DateTime<Utc>,
}

/// The whole database file. Integer keys serialize as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, alias = "posts")]
    pub chirps: BTreeMap<u32, ChirpRow>,
    #[serde(default)]
    pub users: BTreeMap<u32, UserRow>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshTokenRow>,
}

impl From<ChirpRow> for Chirp {
    fn from(row: ChirpRow) -> Self {
        Chirp {
            id: row.id,
            body: row.body,
            author_id: row.author_id,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            is_chirpy_red: row.is_chirpy_red,
        }
    }
}
