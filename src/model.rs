//! Core data model for campaigns: players, parties, monsters, encounters.
//!
//! Everything here is a plain serde-serializable document. Entities carry
//! stable UUIDs so references survive save/load, and timestamps are stored
//! as unix-seconds strings to keep the JSON format dependency-free.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a player character.
    PlayerId
);
entity_id!(
    /// Unique identifier for a party.
    PartyId
);
entity_id!(
    /// Unique identifier for a monster.
    MonsterId
);
entity_id!(
    /// Unique identifier for an encounter.
    EncounterId
);
entity_id!(
    /// Unique identifier for a tracker participant.
    ParticipantId
);

// ============================================================================
// Abilities
// ============================================================================

/// The six core ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    /// Three-letter abbreviation (STR, DEX, etc.)
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    /// All six abilities in standard order.
    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

/// A creature's six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    /// Get the score for an ability.
    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    /// Set the score for an ability.
    pub fn set(&mut self, ability: Ability, score: u8) {
        match ability {
            Ability::Strength => self.strength = score,
            Ability::Dexterity => self.dexterity = score,
            Ability::Constitution => self.constitution = score,
            Ability::Intelligence => self.intelligence = score,
            Ability::Wisdom => self.wisdom = score,
            Ability::Charisma => self.charisma = score,
        }
    }

    /// Ability modifier: floor((score - 10) / 2).
    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability) as i32)
    }
}

/// Ability modifier for a raw score, rounding toward negative infinity.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

// ============================================================================
// Challenge rating
// ============================================================================

/// A monster challenge rating.
///
/// Fractional ratings below 1 get their own variants; whole ratings run
/// from 1 to 30. Serializes as a plain JSON number (0.125, 0.5, 7, ...)
/// so documents stay interchangeable with other tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum ChallengeRating {
    Zero,
    Eighth,
    Quarter,
    Half,
    Whole(u8),
}

impl From<f64> for ChallengeRating {
    fn from(value: f64) -> Self {
        if value >= 1.0 {
            ChallengeRating::Whole((value as u8).clamp(1, 30))
        } else if value >= 0.5 {
            ChallengeRating::Half
        } else if value >= 0.25 {
            ChallengeRating::Quarter
        } else if value > 0.0 {
            ChallengeRating::Eighth
        } else {
            ChallengeRating::Zero
        }
    }
}

impl From<ChallengeRating> for f64 {
    fn from(cr: ChallengeRating) -> f64 {
        match cr {
            ChallengeRating::Zero => 0.0,
            ChallengeRating::Eighth => 0.125,
            ChallengeRating::Quarter => 0.25,
            ChallengeRating::Half => 0.5,
            ChallengeRating::Whole(n) => n as f64,
        }
    }
}

impl fmt::Display for ChallengeRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeRating::Zero => write!(f, "0"),
            ChallengeRating::Eighth => write!(f, "1/8"),
            ChallengeRating::Quarter => write!(f, "1/4"),
            ChallengeRating::Half => write!(f, "1/2"),
            ChallengeRating::Whole(n) => write!(f, "{n}"),
        }
    }
}

impl ChallengeRating {
    /// Experience points awarded for a monster of this rating.
    pub fn xp(&self) -> u32 {
        match self {
            ChallengeRating::Zero => 10,
            ChallengeRating::Eighth => 25,
            ChallengeRating::Quarter => 50,
            ChallengeRating::Half => 100,
            ChallengeRating::Whole(n) => match n {
                1 => 200,
                2 => 450,
                3 => 700,
                4 => 1100,
                5 => 1800,
                6 => 2300,
                7 => 2900,
                8 => 3900,
                9 => 5000,
                10 => 5900,
                11 => 7200,
                12 => 8400,
                13 => 10000,
                14 => 11500,
                15 => 13000,
                16 => 15000,
                17 => 18000,
                18 => 20000,
                19 => 22000,
                20 => 25000,
                21 => 33000,
                22 => 41000,
                23 => 50000,
                24 => 62000,
                25 => 75000,
                26 => 90000,
                27 => 105000,
                28 => 120000,
                29 => 135000,
                _ => 155000,
            },
        }
    }
}

// ============================================================================
// Players and parties
// ============================================================================

/// A player character in a party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    pub name: String,

    /// Character level. Threshold math clamps this to 1..=20.
    pub level: u8,

    /// Class name, free-form ("Fighter", "Warlock 3 / Paladin 2", ...).
    pub class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abilities: Option<AbilityScores>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_hp: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative_modifier: Option<i32>,

    /// Walking speed in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    /// External character-sheet id for live HP sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
}

impl Player {
    /// Create a player with the minimum required fields.
    pub fn new(name: impl Into<String>, level: u8, class: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            level,
            class: class.into(),
            race: None,
            abilities: None,
            ac: None,
            max_hp: None,
            current_hp: None,
            initiative_modifier: None,
            speed: None,
            sheet_id: None,
        }
    }

    /// Dexterity modifier, defaulting to 0 when no scores are recorded.
    pub fn dex_modifier(&self) -> i32 {
        self.abilities
            .map(|a| a.modifier(Ability::Dexterity))
            .unwrap_or(0)
    }
}

/// A group of player characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,

    pub name: String,

    pub players: Vec<Player>,

    pub created_at: String,

    pub updated_at: String,
}

impl Party {
    /// Create an empty party.
    pub fn new(name: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: PartyId::new(),
            name: name.into(),
            players: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }
}

/// Mean character level across a party, 0.0 when empty.
///
/// Computed on read so it can never drift from the player list.
pub fn average_party_level(party: &Party) -> f64 {
    if party.players.is_empty() {
        return 0.0;
    }
    let total: u32 = party.players.iter().map(|p| p.level as u32).sum();
    total as f64 / party.players.len() as f64
}

// ============================================================================
// Monsters
// ============================================================================

/// A named descriptive block on a stat sheet (trait, action, reaction...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedBlock {
    pub name: String,
    pub description: String,
}

/// A monster stat block.
///
/// Nearly everything is optional: homebrew entries are often sketched in
/// with just a name and a CR, and the tracker copes with whatever is
/// missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cr: Option<ChallengeRating>,

    /// Explicit XP override; when absent, the CR table supplies the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,

    /// Creature type ("undead", "fiend", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,

    /// Walking speed in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abilities: Option<AbilityScores>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<NamedBlock>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NamedBlock>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<NamedBlock>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legendary_actions: Vec<NamedBlock>,

    /// True for user-authored monsters, false for catalog entries.
    #[serde(default)]
    pub custom: bool,

    /// Where the stat block came from ("srd", "homebrew", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Monster {
    /// Create a bare monster with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MonsterId::new(),
            name: name.into(),
            cr: None,
            xp: None,
            kind: None,
            size: None,
            alignment: None,
            ac: None,
            hp: None,
            speed: None,
            abilities: None,
            traits: Vec::new(),
            actions: Vec::new(),
            reactions: Vec::new(),
            legendary_actions: Vec::new(),
            custom: false,
            source: None,
        }
    }

    /// XP this monster is worth: explicit value first, CR table second,
    /// 0 when neither is known.
    pub fn xp_value(&self) -> u32 {
        self.xp.or_else(|| self.cr.map(|cr| cr.xp())).unwrap_or(0)
    }

    /// Dexterity modifier, 0 when no scores are recorded.
    pub fn dex_modifier(&self) -> i32 {
        self.abilities
            .map(|a| a.modifier(Ability::Dexterity))
            .unwrap_or(0)
    }
}

/// A monster entry in an encounter roster, with a head count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterMonster {
    pub monster: Monster,

    /// How many of this monster the encounter fields. Zero is tolerated
    /// and simply contributes nothing.
    pub quantity: u32,
}

impl EncounterMonster {
    pub fn new(monster: Monster, quantity: u32) -> Self {
        Self { monster, quantity }
    }
}

// ============================================================================
// Encounters
// ============================================================================

/// A planned or in-progress encounter.
///
/// The tracker fields (`participants`, `current_turn`, `round`) are only
/// present once the encounter has been launched, so a live session can be
/// saved mid-combat and resumed later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    pub id: EncounterId,

    pub name: String,

    #[serde(default)]
    pub monsters: Vec<EncounterMonster>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_id: Option<PartyId>,

    /// Folder the encounter is filed under, for grouping in lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,

    /// Short code for read-only sharing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<EncounterParticipant>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,

    pub created_at: String,

    pub updated_at: String,
}

impl Encounter {
    /// Create an empty encounter.
    pub fn new(name: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: EncounterId::new(),
            name: name.into(),
            monsters: Vec::new(),
            party_id: None,
            folder_id: None,
            share_code: None,
            participants: None,
            current_turn: None,
            round: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = timestamp_now();
    }

    /// Total monster head count across the roster.
    pub fn monster_count(&self) -> u32 {
        self.monsters.iter().map(|m| m.quantity).sum()
    }
}

// ============================================================================
// Tracker participants
// ============================================================================

/// Where a participant came from, for stat refresh and live sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantSource {
    Player(PlayerId),
    Monster(MonsterId),
}

/// One creature on the initiative tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterParticipant {
    pub id: ParticipantId,

    pub name: String,

    /// Player characters keep their rolled initiative; monsters get
    /// theirs rolled by the tracker.
    pub is_pc: bool,

    pub initiative: i32,

    /// Dexterity modifier, used as the initiative tie-breaker.
    pub initiative_modifier: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac: Option<i32>,

    /// Never negative; the tracker clamps damage at 0.
    pub current_hp: i32,

    pub max_hp: i32,

    #[serde(default)]
    pub abilities: AbilityScores,

    /// Walking speed in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub conditions: BTreeSet<String>,

    #[serde(default)]
    pub action_used: bool,

    #[serde(default)]
    pub bonus_action_used: bool,

    #[serde(default)]
    pub reaction_used: bool,

    /// Movement left this turn, in 5-foot squares.
    #[serde(default)]
    pub remaining_movement: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cr: Option<ChallengeRating>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ParticipantSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
}

impl EncounterParticipant {
    /// Build a participant from a player character. A player with no
    /// recorded HP gets 10 so the row is alive and takes turns.
    pub fn from_player(player: &Player) -> Self {
        let abilities = player.abilities.unwrap_or_default();
        let max_hp = player.max_hp.filter(|&hp| hp > 0).unwrap_or(10);
        let speed = player.speed;
        Self {
            id: ParticipantId::new(),
            name: player.name.clone(),
            is_pc: true,
            initiative: 0,
            initiative_modifier: player
                .initiative_modifier
                .unwrap_or_else(|| player.dex_modifier()),
            ac: player.ac,
            current_hp: player.current_hp.unwrap_or(max_hp).max(0),
            max_hp,
            abilities,
            speed,
            conditions: BTreeSet::new(),
            action_used: false,
            bonus_action_used: false,
            reaction_used: false,
            remaining_movement: movement_squares(speed),
            cr: None,
            kind: None,
            size: None,
            source: Some(ParticipantSource::Player(player.id)),
            sheet_id: player.sheet_id.clone(),
        }
    }

    /// Build a participant from a monster stat block. The caller appends
    /// an ordinal to the name when fielding several copies. A stat block
    /// with no recorded HP gets 10, same as an unstatted player.
    pub fn from_monster(monster: &Monster, name: impl Into<String>) -> Self {
        let abilities = monster.abilities.unwrap_or_default();
        let hp = monster.hp.filter(|&hp| hp > 0).unwrap_or(10);
        let speed = monster.speed;
        Self {
            id: ParticipantId::new(),
            name: name.into(),
            is_pc: false,
            initiative: 0,
            initiative_modifier: monster.dex_modifier(),
            ac: monster.ac,
            current_hp: hp.max(0),
            max_hp: hp,
            abilities,
            speed,
            conditions: BTreeSet::new(),
            action_used: false,
            bonus_action_used: false,
            reaction_used: false,
            remaining_movement: movement_squares(speed),
            cr: monster.cr,
            kind: monster.kind.clone(),
            size: monster.size.clone(),
            source: Some(ParticipantSource::Monster(monster.id)),
            sheet_id: None,
        }
    }

    /// Whether the participant is out of the fight.
    pub fn is_down(&self) -> bool {
        self.current_hp <= 0
    }

    /// Dexterity modifier from the recorded scores.
    pub fn dex_modifier(&self) -> i32 {
        self.abilities.modifier(Ability::Dexterity)
    }

    /// Apply a signed HP change. Damage clamps at 0; healing above the
    /// maximum is allowed (temporary HP and similar effects). Extreme
    /// deltas saturate instead of overflowing.
    pub fn apply_hp_delta(&mut self, delta: i32) {
        self.current_hp = self.current_hp.saturating_add(delta).max(0);
    }

    /// Hand the participant a fresh turn: action economy back, movement
    /// recomputed from speed.
    pub fn reset_turn(&mut self) {
        self.action_used = false;
        self.bonus_action_used = false;
        self.reaction_used = false;
        self.remaining_movement = movement_squares(self.speed);
    }
}

/// Movement allowance in 5-foot squares for a walking speed in metres.
///
/// Unknown speed falls back to the standard 30 ft (6 squares).
pub fn movement_squares(speed_metres: Option<f32>) -> u32 {
    match speed_metres {
        Some(m) => (m / 1.5).round().max(0.0) as u32,
        None => 6,
    }
}

// ============================================================================
// Account stats
// ============================================================================

/// Per-user content counters and plan limits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub parties_count: u32,

    #[serde(default)]
    pub encounters_count: u32,

    /// Maximum parties the current plan allows; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parties_limit: Option<u32>,

    /// Maximum encounters the current plan allows; `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounters_limit: Option<u32>,
}

impl UserStats {
    /// Whether the plan allows creating another party.
    pub fn can_create_party(&self) -> bool {
        self.parties_limit
            .map(|limit| self.parties_count < limit)
            .unwrap_or(true)
    }

    /// Whether the plan allows creating another encounter.
    pub fn can_create_encounter(&self) -> bool {
        self.encounters_limit
            .map(|limit| self.encounters_count < limit)
            .unwrap_or(true)
    }
}

/// Current timestamp as a unix-seconds string.
pub fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}
