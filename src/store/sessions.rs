use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::warn;

use super::BlobStore;
use crate::error::StoreResult;
use crate::session::SessionResult;

pub const SESSIONS_KEY: &str = "sessions";

const ID_LEN: usize = 16;

pub trait SessionStore {
    /// Persist `result` and hand back the stored copy, id filled in
    fn append(&mut self, result: SessionResult) -> StoreResult<SessionResult>;
    /// Every stored session in insertion order; unreadable data reads as empty
    fn list_all(&self) -> Vec<SessionResult>;
    fn list_by_passage(&self, passage_id: &str) -> Vec<SessionResult> {
        self.list_all()
            .into_iter()
            .filter(|s| s.passage_id == passage_id)
            .collect()
    }
    fn clear(&mut self) -> StoreResult<()>;
}

pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Sessions kept as one JSON array under a single key
#[derive(Debug, Clone)]
pub struct BlobSessionStore<B: BlobStore> {
    blobs: B,
}

impl<B: BlobStore> BlobSessionStore<B> {
    pub fn new(blobs: B) -> Self {
        Self { blobs }
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }
}

impl<B: BlobStore> SessionStore for BlobSessionStore<B> {
    fn append(&mut self, mut result: SessionResult) -> StoreResult<SessionResult> {
        let mut sessions = self.list_all();
        result.id = generate_id();
        sessions.push(result.clone());
        let json = serde_json::to_string(&sessions)?;
        self.blobs.write(SESSIONS_KEY, &json)?;
        Ok(result)
    }

    fn list_all(&self) -> Vec<SessionResult> {
        let Some(json) = self.blobs.read(SESSIONS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<SessionResult>>(&json) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(error = %e, "stored sessions are unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.blobs.remove(SESSIONS_KEY)
    }
}
