use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{ChirpRow, Dataset, RefreshTokenRow, UserRow};

/// `max(existing ids) + 1`, or 1 for an empty collection. Deleting the highest
/// id frees it for the next insert.
pub fn next_id<V>(collection: &BTreeMap<u32, V>) -> u32 {
    collection.keys().next_back().map_or(1, |max| max + 1)
}

impl Dataset {
    // -- Chirps --

    pub fn insert_chirp(&mut self, body: String, author_id: u32) -> ChirpRow {
        let id = next_id(&self.chirps);
        let row = ChirpRow { id, body, author_id };
        self.chirps.insert(id, row.clone());
        row
    }

    pub fn chirp(&self, id: u32) -> Option<&ChirpRow> {
        self.chirps.get(&id)
    }

    pub fn remove_chirp(&mut self, id: u32) -> Option<ChirpRow> {
        self.chirps.remove(&id)
    }

    // -- Users --

    pub fn insert_user(&mut self, email: String, password_hash: String) -> UserRow {
        let id = next_id(&self.users);
        let row = UserRow {
            id,
            email,
            password_hash,
            is_chirpy_red: false,
        };
        self.users.insert(id, row.clone());
        row
    }

    pub fn user(&self, id: u32) -> Option<&UserRow> {
        self.users.get(&id)
    }

    pub fn user_mut(&mut self, id: u32) -> Option<&mut UserRow> {
        self.users.get_mut(&id)
    }

    /// Linear scan; emails are only unique as far as user creation enforces it.
    pub fn user_by_email(&self, email: &str) -> Option<&UserRow> {
        self.users.values().find(|u| u.email == email)
    }

    // -- Refresh tokens --

    pub fn insert_refresh_token(
        &mut self,
        token: String,
        user_id: u32,
        created_at: DateTime<Utc>,
    ) -> RefreshTokenRow {
        let row = RefreshTokenRow {
            token: token.clone(),
            user_id,
            created_at,
        };
        self.refresh_tokens.insert(token, row.clone());
        row
    }

    pub fn refresh_token(&self, token: &str) -> Option<&RefreshTokenRow> {
        self.refresh_tokens.get(token)
    }

    pub fn remove_refresh_token(&mut self, token: &str) -> Option<RefreshTokenRow> {
        self.refresh_tokens.remove(token)
    }
}
