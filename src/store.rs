//! Document persistence for parties, encounters, and account stats.
//!
//! Each entity is a versioned JSON file under a base directory:
//! `parties/<id>.json`, `encounters/<id>.json`, and a single
//! `stats.json`. Listing peeks at lightweight metadata without
//! deserializing the full document. A [`DebouncedSaver`] coalesces the
//! rapid-fire mutations a live tracker produces into one write.

use crate::model::{Encounter, EncounterId, Party, PartyId, UserStats};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current document format version.
const STORE_VERSION: u32 = 1;

/// A saved party document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedParty {
    pub version: u32,
    pub saved_at: String,
    pub party: Party,
    pub metadata: PartyMetadata,
}

/// Quick-display metadata for a party, readable without a full load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMetadata {
    pub name: String,
    pub player_count: usize,
    #[serde(default)]
    pub updated_at: String,
}

/// A saved encounter document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedEncounter {
    pub version: u32,
    pub saved_at: String,
    pub encounter: Encounter,
    pub metadata: EncounterMetadata,
}

/// Quick-display metadata for an encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterMetadata {
    pub name: String,
    pub monster_count: u32,
    /// True when the encounter carries saved tracker state.
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default)]
    pub updated_at: String,
}

/// A listed document: its path plus the peeked metadata.
#[derive(Debug, Clone)]
pub struct SaveInfo<M> {
    pub path: String,
    pub metadata: M,
}

/// File-backed store for all campaign documents.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    base: PathBuf,
}

impl DocumentStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    // ------------------------------------------------------------------
    // Parties
    // ------------------------------------------------------------------

    pub async fn save_party(&self, party: &Party) -> Result<(), StoreError> {
        let doc = SavedParty {
            version: STORE_VERSION,
            saved_at: crate::model::timestamp_now(),
            metadata: PartyMetadata {
                name: party.name.clone(),
                player_count: party.players.len(),
                updated_at: party.updated_at.clone(),
            },
            party: party.clone(),
        };
        self.write_doc(&self.party_path(party.id), &doc).await
    }

    pub async fn load_party(&self, id: PartyId) -> Result<Party, StoreError> {
        let doc: SavedParty = self.read_doc(&self.party_path(id)).await?;
        check_version(doc.version)?;
        Ok(doc.party)
    }

    pub async fn delete_party(&self, id: PartyId) -> Result<(), StoreError> {
        fs::remove_file(self.party_path(id)).await?;
        Ok(())
    }

    /// List saved parties by metadata, sorted by name.
    pub async fn list_parties(&self) -> Result<Vec<SaveInfo<PartyMetadata>>, StoreError> {
        let mut saves = self
            .list_dir::<PartyMetadata>(&self.base.join("parties"))
            .await?;
        saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Ok(saves)
    }

    // ------------------------------------------------------------------
    // Encounters
    // ------------------------------------------------------------------

    pub async fn save_encounter(&self, encounter: &Encounter) -> Result<(), StoreError> {
        let doc = SavedEncounter {
            version: STORE_VERSION,
            saved_at: crate::model::timestamp_now(),
            metadata: EncounterMetadata {
                name: encounter.name.clone(),
                monster_count: encounter.monster_count(),
                in_progress: encounter.participants.is_some(),
                updated_at: encounter.updated_at.clone(),
            },
            encounter: encounter.clone(),
        };
        self.write_doc(&self.encounter_path(encounter.id), &doc).await
    }

    pub async fn load_encounter(&self, id: EncounterId) -> Result<Encounter, StoreError> {
        let doc: SavedEncounter = self.read_doc(&self.encounter_path(id)).await?;
        check_version(doc.version)?;
        Ok(doc.encounter)
    }

    pub async fn delete_encounter(&self, id: EncounterId) -> Result<(), StoreError> {
        fs::remove_file(self.encounter_path(id)).await?;
        Ok(())
    }

    /// List saved encounters by metadata, sorted by name.
    pub async fn list_encounters(&self) -> Result<Vec<SaveInfo<EncounterMetadata>>, StoreError> {
        let mut saves = self
            .list_dir::<EncounterMetadata>(&self.base.join("encounters"))
            .await?;
        saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Ok(saves)
    }

    /// Peek an encounter's metadata without loading the full document.
    pub async fn peek_encounter(&self, id: EncounterId) -> Result<EncounterMetadata, StoreError> {
        peek_metadata(&self.encounter_path(id)).await
    }

    // ------------------------------------------------------------------
    // Account stats
    // ------------------------------------------------------------------

    pub async fn save_stats(&self, stats: &UserStats) -> Result<(), StoreError> {
        self.write_doc(&self.base.join("stats.json"), stats).await
    }

    /// Load account stats, defaulting to zero counts when no file exists.
    pub async fn load_stats(&self) -> Result<UserStats, StoreError> {
        match self.read_doc(&self.base.join("stats.json")).await {
            Ok(stats) => Ok(stats),
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(UserStats::default())
            }
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn party_path(&self, id: PartyId) -> PathBuf {
        self.base.join("parties").join(format!("{id}.json"))
    }

    fn encounter_path(&self, id: EncounterId) -> PathBuf {
        self.base.join("encounters").join(format!("{id}.json"))
    }

    async fn write_doc<T: Serialize>(&self, path: &Path, doc: &T) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(doc)?;
        fs::write(path, content).await?;
        debug!(path = %path.display(), "document written");
        Ok(())
    }

    async fn read_doc<T: DeserializeOwned>(&self, path: &Path) -> Result<T, StoreError> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    async fn list_dir<M: DeserializeOwned>(
        &self,
        dir: &Path,
    ) -> Result<Vec<SaveInfo<M>>, StoreError> {
        let mut saves = Vec::new();
        if !dir.exists() {
            return Ok(saves);
        }

        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                // Unreadable files are skipped, not fatal.
                if let Ok(metadata) = peek_metadata::<M>(&path).await {
                    saves.push(SaveInfo {
                        path: path.to_string_lossy().to_string(),
                        metadata,
                    });
                }
            }
        }
        Ok(saves)
    }
}

/// Read just the version and metadata out of a document.
async fn peek_metadata<M: DeserializeOwned>(path: &Path) -> Result<M, StoreError> {
    let content = fs::read_to_string(path).await?;

    #[derive(Deserialize)]
    struct Partial<M> {
        version: u32,
        metadata: M,
    }

    let partial: Partial<M> = serde_json::from_str(&content)?;
    check_version(partial.version)?;
    Ok(partial.metadata)
}

fn check_version(found: u32) -> Result<(), StoreError> {
    if found != STORE_VERSION {
        return Err(StoreError::VersionMismatch {
            expected: STORE_VERSION,
            found,
        });
    }
    Ok(())
}

// ============================================================================
// Debounced autosave
// ============================================================================

/// Coalesces bursts of mutations into a single delayed write.
///
/// Every call to [`schedule`] cancels the previous pending write and
/// starts the delay over, so only the last state within a burst hits
/// disk. There is a single writer per saver; last write wins.
///
/// [`schedule`]: Self::schedule
pub struct DebouncedSaver {
    delay: Duration,
    pending: Option<tokio::task::JoinHandle<()>>,
}

impl DebouncedSaver {
    /// Default delay before a scheduled write lands.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `save` to run after the delay, replacing any write that
    /// is still waiting.
    pub fn schedule<F, Fut>(&mut self, save: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            save().await;
        }));
    }

    /// Drop any pending write without running it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Wait for the pending write (if any) to land.
    pub async fn flush(&mut self) {
        if let Some(handle) = self.pending.take() {
            let _ = handle.await;
        }
    }
}

impl Default for DebouncedSaver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

impl Drop for DebouncedSaver {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EncounterMonster, Monster, Player};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sample_party() -> Party {
        let mut party = Party::new("The Wardens");
        party.players.push(Player::new("Nyx", 3, "Rogue"));
        party.players.push(Player::new("Borin", 4, "Cleric"));
        party
    }

    fn sample_encounter() -> Encounter {
        let mut encounter = Encounter::new("Bridge Ambush");
        let mut goblin = Monster::new("Goblin");
        goblin.cr = Some(crate::model::ChallengeRating::Quarter);
        encounter.monsters.push(EncounterMonster::new(goblin, 4));
        encounter
    }

    #[tokio::test]
    async fn test_party_save_and_load() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        let party = sample_party();
        store.save_party(&party).await.expect("save should succeed");

        let loaded = store.load_party(party.id).await.expect("load should succeed");
        assert_eq!(loaded.name, "The Wardens");
        assert_eq!(loaded.players.len(), 2);
        assert_eq!(loaded.id, party.id);
    }

    #[tokio::test]
    async fn test_encounter_round_trip_preserves_tracker_state() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        let mut encounter = sample_encounter();
        let tracker = crate::tracker::EncounterTracker::launch(&encounter, None);
        tracker.snapshot_into(&mut encounter);

        store
            .save_encounter(&encounter)
            .await
            .expect("save should succeed");
        let loaded = store
            .load_encounter(encounter.id)
            .await
            .expect("load should succeed");

        assert_eq!(loaded.participants.as_ref().map(Vec::len), Some(4));
        assert_eq!(loaded.round, Some(1));
        assert_eq!(loaded.current_turn, Some(0));
    }

    #[tokio::test]
    async fn test_peek_encounter_metadata() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        let encounter = sample_encounter();
        store
            .save_encounter(&encounter)
            .await
            .expect("save should succeed");

        let metadata = store
            .peek_encounter(encounter.id)
            .await
            .expect("peek should succeed");
        assert_eq!(metadata.name, "Bridge Ambush");
        assert_eq!(metadata.monster_count, 4);
        assert!(!metadata.in_progress);
    }

    #[tokio::test]
    async fn test_list_parties_sorted() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        for name in ["Charlie Company", "Alpha Squad", "Bravo Band"] {
            store
                .save_party(&Party::new(name))
                .await
                .expect("save should succeed");
        }

        let saves = store.list_parties().await.expect("list should succeed");
        let names: Vec<&str> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Squad", "Bravo Band", "Charlie Company"]);
    }

    #[tokio::test]
    async fn test_list_on_missing_dir_is_empty() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path().join("nothing_here"));

        assert!(store.list_parties().await.expect("list").is_empty());
        assert!(store.list_encounters().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_delete_encounter() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        let encounter = sample_encounter();
        store
            .save_encounter(&encounter)
            .await
            .expect("save should succeed");
        store
            .delete_encounter(encounter.id)
            .await
            .expect("delete should succeed");

        assert!(store.load_encounter(encounter.id).await.is_err());
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        let party = sample_party();
        store.save_party(&party).await.expect("save should succeed");

        // Corrupt the version on disk.
        let path = dir
            .path()
            .join("parties")
            .join(format!("{}.json", party.id));
        let content = std::fs::read_to_string(&path).expect("read");
        let mut doc: serde_json::Value = serde_json::from_str(&content).expect("parse");
        doc["version"] = serde_json::json!(99);
        std::fs::write(&path, doc.to_string()).expect("write");

        match store.load_party(party.id).await {
            Err(StoreError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, STORE_VERSION);
                assert_eq!(found, 99);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stats_default_when_missing() {
        let dir = TempDir::new().expect("temp dir");
        let store = DocumentStore::new(dir.path());

        let stats = store.load_stats().await.expect("load should succeed");
        assert_eq!(stats.parties_count, 0);

        let mut stats = stats;
        stats.encounters_count = 7;
        store.save_stats(&stats).await.expect("save should succeed");
        let reloaded = store.load_stats().await.expect("load should succeed");
        assert_eq!(reloaded.encounters_count, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_writes() {
        let writes = Arc::new(AtomicUsize::new(0));
        let mut saver = DebouncedSaver::new(Duration::from_secs(3));

        for _ in 0..5 {
            let writes = writes.clone();
            saver.schedule(move || async move {
                writes.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        saver.flush().await;
        assert_eq!(writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_cancel_drops_write() {
        let writes = Arc::new(AtomicUsize::new(0));
        let mut saver = DebouncedSaver::new(Duration::from_secs(3));

        let counter = writes.clone();
        saver.schedule(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        saver.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(writes.load(Ordering::SeqCst), 0);
    }
}
