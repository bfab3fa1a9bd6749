//! QA tests for the encounter difficulty engine through the public API.
//!
//! Run with: `cargo test --test qa_difficulty`

use trame_core::catalog;
use trame_core::difficulty::xp_budget;
use trame_core::{
    compute_encounter_stats, ChallengeRating, Difficulty, Encounter, EncounterMonster, Monster,
    Party, Player,
};

fn level_1_party(size: usize) -> Party {
    let mut party = Party::new("Fresh Adventurers");
    for i in 0..size {
        party
            .players
            .push(Player::new(format!("PC {}", i + 1), 1, "Fighter"));
    }
    party
}

// =============================================================================
// TEST 1: The worked reference scenarios
// =============================================================================

#[test]
fn test_one_ghoul_against_four_level_1_pcs_is_medium() {
    let mut ghoul = Monster::new("Ghoul");
    ghoul.cr = Some(ChallengeRating::Whole(1));

    let mut encounter = Encounter::new("Crypt Watch");
    encounter.monsters.push(EncounterMonster::new(ghoul, 1));

    let party = level_1_party(4);
    let stats = compute_encounter_stats(&encounter.monsters, Some(&party));

    assert_eq!(stats.total_xp, 200);
    assert_eq!(stats.adjusted_xp, 200);
    assert_eq!(stats.difficulty, Difficulty::Medium);
    assert_eq!(stats.xp_per_player, 50);
    assert_eq!(stats.difficulty_color, "yellow");
}

#[test]
fn test_adding_a_second_monster_escalates_to_hard() {
    // Two CR 1/2 monsters: same 200 XP total, but the pair multiplier
    // pushes the adjusted value to 300, past the hard threshold.
    let mut orc = Monster::new("Orc");
    orc.cr = Some(ChallengeRating::Half);

    let mut encounter = Encounter::new("Patrol");
    encounter.monsters.push(EncounterMonster::new(orc, 2));

    let party = level_1_party(4);
    let stats = compute_encounter_stats(&encounter.monsters, Some(&party));

    assert_eq!(stats.total_xp, 200);
    assert_eq!(stats.adjusted_xp, 300);
    assert_eq!(stats.difficulty, Difficulty::Hard);
    assert_eq!(stats.difficulty_color, "orange");
}

// =============================================================================
// TEST 2: Degraded inputs never panic, never error
// =============================================================================

#[test]
fn test_empty_everything() {
    let stats = compute_encounter_stats(&[], None);
    assert_eq!(stats.total_xp, 0);
    assert_eq!(stats.adjusted_xp, 0);
    assert_eq!(stats.difficulty, Difficulty::Trivial);
    assert_eq!(stats.xp_per_player, 0);
    assert_eq!(stats.difficulty_color, "gray");
}

#[test]
fn test_monster_without_cr_or_xp_counts_zero() {
    let mystery = Monster::new("Unstatted Horror");
    let roster = vec![EncounterMonster::new(mystery, 3)];
    let party = level_1_party(4);

    let stats = compute_encounter_stats(&roster, Some(&party));
    assert_eq!(stats.total_xp, 0);
    assert_eq!(stats.difficulty, Difficulty::Trivial);
}

#[test]
fn test_out_of_range_levels_are_clamped() {
    let mut dragon = Monster::new("Adult Red Dragon");
    dragon.cr = Some(ChallengeRating::Whole(17));
    let roster = vec![EncounterMonster::new(dragon, 1)];

    let mut party = Party::new("Broken Import");
    party.players.push(Player::new("Zero", 0, "Fighter"));
    party.players.push(Player::new("Hundred", 100, "Wizard"));

    // Level 0 behaves as 1, level 100 as 20. Thresholds are the sum of
    // both rows; 18000 XP lands on deadly for this pair.
    let stats = compute_encounter_stats(&roster, Some(&party));
    assert_eq!(stats.difficulty, Difficulty::Deadly);
}

// =============================================================================
// TEST 3: Catalog monsters feed straight into the math
// =============================================================================

#[test]
fn test_catalog_roster_rating() {
    let goblin = catalog::find_monster("Goblin").expect("goblin in catalog");
    let wolf = catalog::find_monster("Wolf").expect("wolf in catalog");

    let roster = vec![
        EncounterMonster::new(goblin, 4),
        EncounterMonster::new(wolf, 2),
    ];
    let party = level_1_party(4);

    let stats = compute_encounter_stats(&roster, Some(&party));
    // 4x50 + 2x50 = 300 XP, six monsters double it to 600: deadly.
    assert_eq!(stats.total_xp, 300);
    assert_eq!(stats.monster_count, 6);
    assert_eq!(stats.adjusted_xp, 600);
    assert_eq!(stats.difficulty, Difficulty::Deadly);
}

#[test]
fn test_generic_placeholder_is_rateable() {
    let unknown = catalog::find_or_generic("Completely Unknown Beast");
    let roster = vec![EncounterMonster::new(unknown, 1)];
    let party = level_1_party(4);

    let stats = compute_encounter_stats(&roster, Some(&party));
    assert_eq!(stats.total_xp, 200);
    assert_eq!(stats.difficulty, Difficulty::Medium);
}

// =============================================================================
// TEST 4: Budget helper agrees with the rating
// =============================================================================

#[test]
fn test_budget_matches_threshold_crossing() {
    let party = level_1_party(4);
    let budget = xp_budget(1, 4, Difficulty::Hard);
    assert_eq!(budget, 300);

    // An encounter whose adjusted XP equals the hard budget rates hard.
    let mut monster = Monster::new("Exact Fit");
    monster.xp = Some(budget);
    let stats = compute_encounter_stats(&[EncounterMonster::new(monster, 1)], Some(&party));
    assert_eq!(stats.difficulty, Difficulty::Hard);
}
