//! Best-effort character-sheet import.
//!
//! Parses the JSON a remote sheet service returns (D&D Beyond's format)
//! into a sparse [`CharacterSheet`]. Extraction never fails: anything
//! missing or malformed just stays `None`, and applying a sheet only
//! overwrites the fields it actually carries.

use crate::model::{ability_modifier, AbilityScores, EncounterParticipant, Player};
use serde_json::Value;

/// Fields recovered from a remote character sheet. All optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterSheet {
    pub name: Option<String>,
    /// Total level summed across classes.
    pub level: Option<u32>,
    pub abilities: Option<AbilityScores>,
    pub max_hp: Option<i32>,
    pub current_hp: Option<i32>,
}

impl CharacterSheet {
    /// Extract whatever the document carries.
    ///
    /// Ability scores layer three arrays: a per-index override wins
    /// outright, otherwise base (default 10) plus bonus (default 0).
    /// Max HP is the explicit override when present, otherwise base +
    /// bonus + CON modifier per level; current HP subtracts the removed
    /// pool. Flat `hitPoints` / `currentHitPoints` fields serve as a
    /// last resort for documents that skip the breakdown.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let name = obj.get("name").and_then(Value::as_str).map(String::from);

        let level = obj.get("classes").and_then(Value::as_array).map(|classes| {
            classes
                .iter()
                .filter_map(|c| c.get("level").and_then(Value::as_u64))
                .sum::<u64>() as u32
        });

        let abilities = obj
            .get("stats")
            .and_then(Value::as_array)
            .map(|_| AbilityScores {
                strength: stat_value(obj, 0),
                dexterity: stat_value(obj, 1),
                constitution: stat_value(obj, 2),
                intelligence: stat_value(obj, 3),
                wisdom: stat_value(obj, 4),
                charisma: stat_value(obj, 5),
            });

        let (max_hp, current_hp) = extract_hp(obj, level, abilities);

        Self {
            name,
            level,
            abilities,
            max_hp,
            current_hp,
        }
    }

    /// Copy the present fields onto a player record.
    pub fn apply_to_player(&self, player: &mut Player) {
        if let Some(name) = &self.name {
            player.name = name.clone();
        }
        if let Some(level) = self.level {
            player.level = level.clamp(1, 20) as u8;
        }
        if let Some(abilities) = self.abilities {
            player.abilities = Some(abilities);
        }
        if let Some(max_hp) = self.max_hp {
            player.max_hp = Some(max_hp);
        }
        if let Some(current_hp) = self.current_hp {
            player.current_hp = Some(current_hp.max(0));
        }
    }

    /// Copy the present stats onto a tracker participant. The tracker
    /// row keeps its own name; only numbers move.
    pub fn apply_to_participant(&self, participant: &mut EncounterParticipant) {
        if let Some(abilities) = self.abilities {
            participant.abilities = abilities;
            participant.initiative_modifier =
                abilities.modifier(crate::model::Ability::Dexterity);
        }
        if let Some(max_hp) = self.max_hp {
            participant.max_hp = max_hp;
        }
        if let Some(current_hp) = self.current_hp {
            participant.current_hp = current_hp.max(0);
        }
    }
}

/// Effective score at a stat index: override first, else base + bonus.
fn stat_value(obj: &serde_json::Map<String, Value>, index: usize) -> u8 {
    let at = |key: &str| {
        obj.get(key)
            .and_then(Value::as_array)
            .and_then(|a| a.get(index))
            .and_then(|s| s.get("value"))
            .and_then(Value::as_i64)
    };

    let score = match at("overrideStats") {
        Some(value) if value > 0 => value,
        _ => at("stats").unwrap_or(10) + at("bonusStats").unwrap_or(0),
    };
    score.clamp(1, 30) as u8
}

fn extract_hp(
    obj: &serde_json::Map<String, Value>,
    level: Option<u32>,
    abilities: Option<AbilityScores>,
) -> (Option<i32>, Option<i32>) {
    let has_breakdown = obj.contains_key("overrideHitPoints")
        || obj.contains_key("baseHitPoints")
        || obj.contains_key("bonusHitPoints");

    if !has_breakdown {
        // Flat fields only, if even those exist.
        let max = obj.get("hitPoints").and_then(Value::as_i64).map(|v| v as i32);
        let current = obj
            .get("currentHitPoints")
            .and_then(Value::as_i64)
            .map(|v| v as i32)
            .or(max);
        return (max, current);
    }

    let int_field = |key: &str| obj.get(key).and_then(Value::as_i64).map(|v| v as i32);

    let mut max_hp = match int_field("overrideHitPoints") {
        Some(v) if v > 0 => v,
        _ => {
            let base = int_field("baseHitPoints").unwrap_or(10);
            let bonus = int_field("bonusHitPoints").unwrap_or(0);
            let con_mod = abilities
                .map(|a| ability_modifier(a.constitution as i32))
                .unwrap_or(0);
            base + bonus + con_mod * level.unwrap_or(0) as i32
        }
    };

    let removed = int_field("removedHitPoints").unwrap_or(0);
    let mut current_hp = max_hp - removed;

    // NPC exports and odd formats skip the breakdown values.
    if max_hp <= 0 {
        if let Some(flat) = int_field("hitPoints") {
            max_hp = flat;
        }
    }
    if current_hp <= 0 {
        if let Some(flat) = int_field("currentHitPoints") {
            current_hp = flat;
        }
    }

    (Some(max_hp), Some(current_hp))
}

/// Pull the flat number out of an HP string like "59 (7d10+21)".
pub fn extract_numeric_hp(text: &str) -> Option<i32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
