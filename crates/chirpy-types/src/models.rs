use serde::{Deserialize, Serialize};

/// A user as exposed over the API. The password hash never leaves the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u32,
    pub body: String,
    pub author_id: u32,
}
