//! D&D 5e campaign and encounter manager engine.
//!
//! This crate provides:
//! - Parties, players, and monster stat blocks as plain JSON documents
//! - Encounter difficulty math (XP thresholds, head-count multiplier)
//! - A live initiative/turn tracker with save and resume
//! - Best-effort character-sheet import and background HP sync
//! - Versioned file persistence with debounced autosave
//!
//! # Quick Start
//!
//! ```ignore
//! use trame_core::{
//!     compute_encounter_stats, DocumentStore, Encounter, EncounterMonster,
//!     EncounterTracker, Party, Player,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut party = Party::new("The Wardens");
//!     party.players.push(Player::new("Nyx", 3, "Rogue"));
//!     party.players.push(Player::new("Borin", 4, "Cleric"));
//!
//!     let mut encounter = Encounter::new("Bridge Ambush");
//!     let goblin = trame_core::catalog::find_or_generic("Goblin");
//!     encounter.monsters.push(EncounterMonster::new(goblin, 4));
//!
//!     let stats = compute_encounter_stats(&encounter.monsters, Some(&party));
//!     println!("{} ({} adjusted XP)", stats.difficulty, stats.adjusted_xp);
//!
//!     let mut tracker = EncounterTracker::launch(&encounter, Some(&party));
//!     tracker.roll_initiative_for_all();
//!     tracker.snapshot_into(&mut encounter);
//!
//!     let store = DocumentStore::new("saves");
//!     store.save_encounter(&encounter).await?;
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod difficulty;
pub mod import;
pub mod model;
pub mod store;
pub mod sync;
pub mod tracker;

// Primary public API
pub use difficulty::{compute_encounter_stats, encounter_multiplier, Difficulty, EncounterStats};
pub use import::CharacterSheet;
pub use model::{
    AbilityScores, ChallengeRating, Encounter, EncounterMonster, EncounterParticipant, Monster,
    Party, Player, UserStats,
};
pub use store::{DebouncedSaver, DocumentStore, StoreError};
pub use sync::{HpUpdate, LiveSync, SheetFetcher, SyncError};
pub use tracker::{EncounterTracker, MoveDirection};
