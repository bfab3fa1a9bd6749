//! Encounter difficulty math.
//!
//! Pure functions over the roster and party: XP totals, the head-count
//! multiplier, the per-level threshold table, and the final difficulty
//! tier. Nothing here can fail; missing data degrades to a trivial
//! rating instead of an error.

use crate::model::{EncounterMonster, Party};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Daily XP threshold table, levels 1-20.
///
/// Columns are easy / medium / hard / deadly per character.
const XP_THRESHOLDS: [[u32; 4]; 20] = [
    [25, 50, 75, 100],
    [50, 100, 150, 200],
    [75, 150, 225, 400],
    [125, 250, 375, 500],
    [250, 500, 750, 1100],
    [300, 600, 900, 1400],
    [350, 750, 1100, 1700],
    [450, 900, 1400, 2100],
    [550, 1100, 1600, 2400],
    [600, 1200, 1900, 2800],
    [800, 1600, 2400, 3600],
    [1000, 2000, 3000, 4500],
    [1100, 2200, 3400, 5100],
    [1250, 2500, 3800, 5700],
    [1400, 2800, 4300, 6400],
    [1600, 3200, 4800, 7200],
    [2000, 3900, 5900, 8800],
    [2100, 4200, 6300, 9500],
    [2400, 4900, 7300, 10900],
    [2800, 5700, 8500, 12700],
];

/// Encounter difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Trivial,
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl Difficulty {
    /// Lowercase tier name as it appears in saved documents.
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Deadly => "deadly",
        }
    }

    /// Display color tag for the tier.
    pub fn color(&self) -> &'static str {
        match self {
            Difficulty::Trivial => "gray",
            Difficulty::Easy => "green",
            Difficulty::Medium => "yellow",
            Difficulty::Hard => "orange",
            Difficulty::Deadly => "red",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-character XP thresholds for one level, clamped to 1..=20.
pub fn level_thresholds(level: u8) -> [u32; 4] {
    let clamped = level.clamp(1, 20) as usize;
    XP_THRESHOLDS[clamped - 1]
}

/// Summed XP thresholds for a whole party (easy, medium, hard, deadly).
pub fn party_xp_thresholds(party: &Party) -> [u32; 4] {
    let mut totals = [0u32; 4];
    for player in &party.players {
        let row = level_thresholds(player.level);
        for (total, value) in totals.iter_mut().zip(row) {
            *total = total.saturating_add(value);
        }
    }
    totals
}

/// Encounter multiplier for a monster head count.
///
/// Depends only on the count, never on party size. An empty roster maps
/// to 0 so that the adjusted XP of nothing is nothing.
pub fn encounter_multiplier(monster_count: u32) -> f64 {
    match monster_count {
        0 => 0.0,
        1 => 1.0,
        2 => 1.5,
        3..=6 => 2.0,
        7..=10 => 2.5,
        11..=14 => 3.0,
        _ => 4.0,
    }
}

/// Computed difficulty summary for an encounter.
///
/// Derived data: serialized for display payloads but always recomputed
/// from the roster on load, never read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncounterStats {
    /// Raw XP sum over the roster (quantity-weighted).
    pub total_xp: u32,

    /// Total XP scaled by the head-count multiplier, floored.
    pub adjusted_xp: u32,

    /// Quantity-weighted monster head count.
    pub monster_count: u32,

    pub difficulty: Difficulty,

    /// Reward share per player, from the *unadjusted* total. Adjusted XP
    /// is a pacing heuristic, not a reward pool.
    pub xp_per_player: u32,

    /// Color tag matching `difficulty`.
    pub difficulty_color: &'static str,
}

/// Rate an encounter roster against a party.
///
/// With no party (or an empty one) the XP numbers are still computed
/// against a nominal size, but the tier stays trivial since there is
/// nobody to threaten.
pub fn compute_encounter_stats(
    monsters: &[EncounterMonster],
    party: Option<&Party>,
) -> EncounterStats {
    // Widened, saturating sums: absurd quantities cap out instead of
    // overflowing.
    let total_xp = monsters
        .iter()
        .fold(0u64, |acc, m| {
            acc.saturating_add(m.monster.xp_value() as u64 * m.quantity as u64)
        })
        .min(u32::MAX as u64) as u32;
    let monster_count = monsters
        .iter()
        .fold(0u64, |acc, m| acc.saturating_add(m.quantity as u64))
        .min(u32::MAX as u64) as u32;

    let multiplier = encounter_multiplier(monster_count);
    let adjusted_xp = (total_xp as f64 * multiplier).floor() as u32;

    let players = party.map(|p| p.players.as_slice()).unwrap_or(&[]);

    let difficulty = match party {
        Some(p) if !p.players.is_empty() => {
            let [easy, medium, hard, deadly] = party_xp_thresholds(p);
            if adjusted_xp >= deadly {
                Difficulty::Deadly
            } else if adjusted_xp >= hard {
                Difficulty::Hard
            } else if adjusted_xp >= medium {
                Difficulty::Medium
            } else if adjusted_xp >= easy {
                Difficulty::Easy
            } else {
                Difficulty::Trivial
            }
        }
        _ => Difficulty::Trivial,
    };

    let xp_per_player = if players.is_empty() {
        0
    } else {
        total_xp / players.len() as u32
    };

    EncounterStats {
        total_xp,
        adjusted_xp,
        monster_count,
        difficulty,
        xp_per_player,
        difficulty_color: difficulty.color(),
    }
}

/// XP budget for building an encounter: the summed threshold of a party
/// of `party_size` characters at `level` for the given tier.
pub fn xp_budget(level: u8, party_size: u32, tier: Difficulty) -> u32 {
    let row = level_thresholds(level);
    let per_player = match tier {
        Difficulty::Trivial => 0,
        Difficulty::Easy => row[0],
        Difficulty::Medium => row[1],
        Difficulty::Hard => row[2],
        Difficulty::Deadly => row[3],
    };
    per_player * party_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChallengeRating, Monster, Player};

    fn roster(entries: &[(u32, u32)]) -> Vec<EncounterMonster> {
        entries
            .iter()
            .map(|&(xp, quantity)| {
                let mut monster = Monster::new("Test Monster");
                monster.xp = Some(xp);
                EncounterMonster::new(monster, quantity)
            })
            .collect()
    }

    fn party_of_level_1(size: usize) -> Party {
        let mut party = Party::new("Test Party");
        for i in 0..size {
            party
                .players
                .push(Player::new(format!("PC {}", i + 1), 1, "Fighter"));
        }
        party
    }

    #[test]
    fn test_empty_roster_is_trivial() {
        let party = party_of_level_1(4);
        let stats = compute_encounter_stats(&[], Some(&party));

        assert_eq!(stats.total_xp, 0);
        assert_eq!(stats.adjusted_xp, 0);
        assert_eq!(stats.monster_count, 0);
        assert_eq!(stats.difficulty, Difficulty::Trivial);
        assert_eq!(stats.xp_per_player, 0);
        assert_eq!(stats.difficulty_color, "gray");
    }

    #[test]
    fn test_single_cr1_monster_vs_level_1_party() {
        // Four level-1 PCs: thresholds 100/200/300/400. One CR 1 monster
        // is 200 XP with a x1 multiplier, landing exactly on medium.
        let mut monster = Monster::new("Ghoul");
        monster.cr = Some(ChallengeRating::Whole(1));
        let roster = vec![EncounterMonster::new(monster, 1)];
        let party = party_of_level_1(4);

        let stats = compute_encounter_stats(&roster, Some(&party));
        assert_eq!(stats.total_xp, 200);
        assert_eq!(stats.adjusted_xp, 200);
        assert_eq!(stats.difficulty, Difficulty::Medium);
        assert_eq!(stats.xp_per_player, 50);
        assert_eq!(stats.difficulty_color, "yellow");
    }

    #[test]
    fn test_pair_of_monsters_gets_multiplied() {
        // Two 100 XP monsters: total 200, x1.5 multiplier, adjusted 300,
        // which hits the hard threshold for four level-1 PCs.
        let roster = roster(&[(100, 2)]);
        let party = party_of_level_1(4);

        let stats = compute_encounter_stats(&roster, Some(&party));
        assert_eq!(stats.total_xp, 200);
        assert_eq!(stats.adjusted_xp, 300);
        assert_eq!(stats.difficulty, Difficulty::Hard);
        assert_eq!(stats.xp_per_player, 50);
        assert_eq!(stats.difficulty_color, "orange");
    }

    #[test]
    fn test_multiplier_table() {
        assert_eq!(encounter_multiplier(0), 0.0);
        assert_eq!(encounter_multiplier(1), 1.0);
        assert_eq!(encounter_multiplier(2), 1.5);
        assert_eq!(encounter_multiplier(3), 2.0);
        assert_eq!(encounter_multiplier(6), 2.0);
        assert_eq!(encounter_multiplier(7), 2.5);
        assert_eq!(encounter_multiplier(10), 2.5);
        assert_eq!(encounter_multiplier(11), 3.0);
        assert_eq!(encounter_multiplier(14), 3.0);
        assert_eq!(encounter_multiplier(15), 4.0);
        assert_eq!(encounter_multiplier(40), 4.0);
    }

    #[test]
    fn test_multiplier_ignores_party_size() {
        let roster = roster(&[(100, 2)]);
        let small = party_of_level_1(2);
        let large = party_of_level_1(8);

        let a = compute_encounter_stats(&roster, Some(&small));
        let b = compute_encounter_stats(&roster, Some(&large));
        assert_eq!(a.adjusted_xp, b.adjusted_xp);
    }

    #[test]
    fn test_adjusted_xp_monotonic_in_quantity() {
        let party = party_of_level_1(4);
        let mut previous = 0;
        for quantity in 1..=20 {
            let stats = compute_encounter_stats(&roster(&[(100, quantity)]), Some(&party));
            assert!(
                stats.adjusted_xp >= previous,
                "adjusted XP dropped at quantity {quantity}"
            );
            previous = stats.adjusted_xp;
        }
    }

    #[test]
    fn test_no_party_stays_trivial() {
        let roster = roster(&[(25000, 4)]);
        let stats = compute_encounter_stats(&roster, None);

        assert_eq!(stats.difficulty, Difficulty::Trivial);
        assert_eq!(stats.xp_per_player, 0);
        assert!(stats.total_xp > 0);
    }

    #[test]
    fn test_level_clamped_into_table() {
        assert_eq!(level_thresholds(0), level_thresholds(1));
        assert_eq!(level_thresholds(25), level_thresholds(20));
        assert_eq!(level_thresholds(1), [25, 50, 75, 100]);
        assert_eq!(level_thresholds(20), [2800, 5700, 8500, 12700]);
    }

    #[test]
    fn test_threshold_spot_checks() {
        assert_eq!(level_thresholds(3), [75, 150, 225, 400]);
        assert_eq!(level_thresholds(11), [800, 1600, 2400, 3600]);
        assert_eq!(level_thresholds(17), [2000, 3900, 5900, 8800]);
    }

    #[test]
    fn test_xp_per_player_uses_unadjusted_total() {
        // Adjusted XP rises with the multiplier; the reward share does not.
        let roster = roster(&[(100, 4)]);
        let party = party_of_level_1(4);

        let stats = compute_encounter_stats(&roster, Some(&party));
        assert_eq!(stats.total_xp, 400);
        assert_eq!(stats.adjusted_xp, 800);
        assert_eq!(stats.xp_per_player, 100);
    }

    #[test]
    fn test_huge_rosters_saturate_instead_of_overflowing() {
        let party = party_of_level_1(4);

        // 200 XP x 30 million copies blows past u32; the totals cap out.
        let stats = compute_encounter_stats(&roster(&[(200, 30_000_000)]), Some(&party));
        assert_eq!(stats.total_xp, u32::MAX);
        assert_eq!(stats.adjusted_xp, u32::MAX);
        assert_eq!(stats.difficulty, Difficulty::Deadly);

        // Same story when the head count itself overflows.
        let entries: Vec<(u32, u32)> = vec![(1, u32::MAX), (1, u32::MAX)];
        let stats = compute_encounter_stats(&roster(&entries), Some(&party));
        assert_eq!(stats.monster_count, u32::MAX);
    }

    #[test]
    fn test_xp_budget() {
        assert_eq!(xp_budget(1, 4, Difficulty::Medium), 200);
        assert_eq!(xp_budget(5, 3, Difficulty::Deadly), 3300);
        assert_eq!(xp_budget(10, 5, Difficulty::Trivial), 0);
    }
}
