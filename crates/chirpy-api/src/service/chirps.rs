use std::sync::Arc;

use tracing::debug;

use chirpy_db::Database;
use chirpy_types::models::Chirp;

use crate::error::ApiError;

pub const MAX_CHIRP_LEN: usize = 140;

const BLOCKED_WORDS: &[&str] = &["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Replace blocked words, compared case-insensitively, with a mask. Only the
/// space character separates words; tabs and newlines are part of a word.
pub fn censor(body: &str) -> String {
    body.split(' ')
        .map(|word| {
            if BLOCKED_WORDS.contains(&word.to_lowercase().as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct Chirps {
    db: Arc<Database>,
}

impl Chirps {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// The length limit applies to the raw body, before censoring.
    pub fn create(&self, author_id: u32, raw_body: &str) -> Result<Chirp, ApiError> {
        if raw_body.chars().count() > MAX_CHIRP_LEN {
            return Err(ApiError::BodyTooLong);
        }
        let body = censor(raw_body);

        let row = self.db.update(|data| {
            Ok::<_, ApiError>(data.insert_chirp(body, author_id))
        })?;

        debug!("User {} posted chirp {}", author_id, row.id);
        Ok(row.into())
    }

    pub fn list(&self, author_id: Option<u32>, order: SortOrder) -> Result<Vec<Chirp>, ApiError> {
        let mut chirps: Vec<Chirp> = self.db.read(|data| {
            Ok::<_, ApiError>(
                data.chirps
                    .values()
                    .filter(|c| author_id.is_none_or(|a| c.author_id == a))
                    .cloned()
                    .map(Chirp::from)
                    .collect(),
            )
        })?;

        match order {
            SortOrder::Asc => chirps.sort_by_key(|c| c.id),
            SortOrder::Desc => chirps.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        Ok(chirps)
    }

    pub fn get(&self, id: u32) -> Result<Chirp, ApiError> {
        self.db.read(|data| {
            data.chirp(id)
                .cloned()
                .map(Chirp::from)
                .ok_or(ApiError::PostNotFound)
        })
    }

    /// Only the author may delete a chirp.
    pub fn delete(&self, id: u32, requester_id: u32) -> Result<(), ApiError> {
        self.db.update(|data| {
            let chirp = data.chirp(id).ok_or(ApiError::PostNotFound)?;
            if chirp.author_id != requester_id {
                return Err(ApiError::Forbidden);
            }
            data.remove_chirp(id);
            Ok::<_, ApiError>(())
        })?;

        debug!("User {} deleted chirp {}", requester_id, id);
        Ok(())
    }
}
