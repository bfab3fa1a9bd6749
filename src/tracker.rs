//! Initiative and turn tracking for a running encounter.
//!
//! The tracker owns a flat participant list; turn order is a read-time
//! projection (initiative descending, dexterity modifier breaking ties)
//! and is never stored, so there is exactly one ordering authority.
//! Every operation is total: bad ids and empty lists are no-ops, not
//! errors.

use crate::model::{
    Encounter, EncounterParticipant, Monster, ParticipantId, Party, Player,
};
use rand::Rng;

/// Direction for manually reordering a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward the top of the order (acts earlier).
    Up,
    /// Toward the bottom of the order (acts later).
    Down,
}

/// Live state of an encounter in progress.
#[derive(Debug, Clone)]
pub struct EncounterTracker {
    participants: Vec<EncounterParticipant>,
    /// Index into the sorted view, not the storage order.
    current_turn: usize,
    round: u32,
}

impl EncounterTracker {
    /// Start a fresh tracker from an encounter roster and its party.
    ///
    /// Monsters fielded in multiples get ordinal suffixes ("Goblin 1",
    /// "Goblin 2") so the tracker rows stay distinguishable.
    pub fn launch(encounter: &Encounter, party: Option<&Party>) -> Self {
        let mut participants = Vec::new();

        if let Some(party) = party {
            for player in &party.players {
                participants.push(EncounterParticipant::from_player(player));
            }
        }

        for entry in &encounter.monsters {
            for i in 0..entry.quantity {
                let name = if entry.quantity > 1 {
                    format!("{} {}", entry.monster.name, i + 1)
                } else {
                    entry.monster.name.clone()
                };
                participants.push(EncounterParticipant::from_monster(&entry.monster, name));
            }
        }

        Self {
            participants,
            current_turn: 0,
            round: 1,
        }
    }

    /// Restore a tracker from state saved on an encounter, if any.
    pub fn resume(encounter: &Encounter) -> Option<Self> {
        let participants = encounter.participants.clone()?;
        let mut tracker = Self {
            participants,
            current_turn: encounter.current_turn.unwrap_or(0),
            round: encounter.round.unwrap_or(1).max(1),
        };
        if tracker.current_turn >= tracker.participants.len() {
            tracker.current_turn = 0;
        }
        Some(tracker)
    }

    /// Write the live state back onto the encounter for persistence.
    pub fn snapshot_into(&self, encounter: &mut Encounter) {
        encounter.participants = Some(self.participants.clone());
        encounter.current_turn = Some(self.current_turn);
        encounter.round = Some(self.round);
        encounter.touch();
    }

    pub fn participants(&self) -> &[EncounterParticipant] {
        &self.participants
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Position of the active participant within the sorted view.
    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    /// Turn order: initiative descending, dexterity modifier descending
    /// on ties. Recomputed on every read.
    pub fn sorted_participants(&self) -> Vec<&EncounterParticipant> {
        let order = self.sorted_indices();
        order.into_iter().map(|i| &self.participants[i]).collect()
    }

    /// The participant whose turn it is, if anyone is on the tracker.
    pub fn current_participant(&self) -> Option<&EncounterParticipant> {
        let order = self.sorted_indices();
        order
            .get(self.current_turn)
            .map(|&i| &self.participants[i])
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&EncounterParticipant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut EncounterParticipant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    /// Roll initiative for every monster (1d20 + DEX modifier). Player
    /// characters keep whatever initiative they already have; the table
    /// rolls those dice itself. The turn cursor returns to the top.
    pub fn roll_initiative_for_all(&mut self) {
        self.roll_initiative_for_all_with_rng(&mut rand::thread_rng());
    }

    /// Deterministic variant of [`roll_initiative_for_all`] for seeded rolls.
    ///
    /// [`roll_initiative_for_all`]: Self::roll_initiative_for_all
    pub fn roll_initiative_for_all_with_rng<R: Rng>(&mut self, rng: &mut R) {
        for participant in &mut self.participants {
            if !participant.is_pc {
                participant.initiative =
                    rng.gen_range(1..=20) + participant.initiative_modifier;
            }
        }
        self.current_turn = 0;
    }

    /// Advance to the next living participant, bumping the round counter
    /// on wraparound. Downed participants are skipped; landing hands the
    /// participant a fresh turn. No-op when everyone is down.
    pub fn next_turn(&mut self) {
        let order = self.sorted_indices();
        if order.is_empty() || self.all_down() {
            return;
        }

        let len = order.len();
        let mut next = self.current_turn.min(len - 1);
        // Bounded: at most one full lap before hitting a live participant.
        for _ in 0..len {
            next = (next + 1) % len;
            if next == 0 {
                self.round += 1;
            }
            if !self.participants[order[next]].is_down() {
                break;
            }
        }

        self.current_turn = next;
        self.participants[order[next]].reset_turn();
    }

    /// Step back to the previous living participant, decrementing the
    /// round (never below 1) when passing the top of the order.
    pub fn previous_turn(&mut self) {
        let order = self.sorted_indices();
        if order.is_empty() || self.all_down() {
            return;
        }

        let len = order.len();
        let mut prev = self.current_turn.min(len - 1);
        for _ in 0..len {
            if prev == 0 {
                prev = len - 1;
                self.round = self.round.saturating_sub(1).max(1);
            } else {
                prev -= 1;
            }
            if !self.participants[order[prev]].is_down() {
                break;
            }
        }

        self.current_turn = prev;
        self.participants[order[prev]].reset_turn();
    }

    /// Apply a signed HP change to a participant. Damage clamps at 0,
    /// healing past the maximum is allowed. Unknown ids are ignored.
    pub fn update_hp(&mut self, id: ParticipantId, delta: i32) {
        if let Some(participant) = self.participant_mut(id) {
            participant.apply_hp_delta(delta);
        }
    }

    /// Swap a participant's initiative value with its neighbour in the
    /// sorted view, moving it one slot up or down. The swap keeps the
    /// sort as the only ordering authority and is its own inverse.
    /// No-op at the edges of the order or for unknown ids.
    ///
    /// When the neighbour carries the same initiative (order decided by
    /// the DEX tie-break), the moved row's value is stepped past the
    /// neighbour's instead, since swapping equal values changes nothing.
    /// In a multi-way tie that step can carry the row past the whole
    /// tied group.
    pub fn move_participant(&mut self, id: ParticipantId, direction: MoveDirection) {
        let order = self.sorted_indices();
        let Some(pos) = order
            .iter()
            .position(|&i| self.participants[i].id == id)
        else {
            return;
        };

        let neighbour = match direction {
            MoveDirection::Up => {
                if pos == 0 {
                    return;
                }
                pos - 1
            }
            MoveDirection::Down => {
                if pos + 1 >= order.len() {
                    return;
                }
                pos + 1
            }
        };

        let a = order[pos];
        let b = order[neighbour];
        if self.participants[a].initiative == self.participants[b].initiative {
            self.participants[a].initiative = match direction {
                MoveDirection::Up => self.participants[a].initiative.saturating_add(1),
                MoveDirection::Down => self.participants[a].initiative.saturating_sub(1),
            };
            return;
        }
        let tmp = self.participants[a].initiative;
        self.participants[a].initiative = self.participants[b].initiative;
        self.participants[b].initiative = tmp;
    }

    /// Toggle a named condition on a participant.
    pub fn toggle_condition(&mut self, id: ParticipantId, condition: &str) {
        if let Some(participant) = self.participant_mut(id) {
            if !participant.conditions.remove(condition) {
                participant.conditions.insert(condition.to_string());
            }
        }
    }

    /// Add a late-arriving player character mid-encounter.
    pub fn add_player_character(&mut self, player: &Player) {
        self.participants
            .push(EncounterParticipant::from_player(player));
    }

    /// Remove a participant from the tracker. Returns whether anything
    /// was removed. The cursor is clamped back into range if needed.
    pub fn remove_participant(&mut self, id: ParticipantId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        let removed = self.participants.len() != before;
        if removed && self.current_turn >= self.participants.len() {
            self.current_turn = 0;
        }
        removed
    }

    /// Fold a full stat block into a participant, overwriting only the
    /// fields the block actually carries. Used to upgrade placeholder
    /// rows once real data arrives.
    pub fn apply_monster_stats(&mut self, id: ParticipantId, monster: &Monster) {
        let Some(participant) = self.participant_mut(id) else {
            return;
        };

        if let Some(ac) = monster.ac {
            participant.ac = Some(ac);
        }
        if let Some(hp) = monster.hp {
            participant.max_hp = hp;
            participant.current_hp = hp.max(0);
        }
        if let Some(abilities) = monster.abilities {
            participant.abilities = abilities;
            participant.initiative_modifier = monster.dex_modifier();
        }
        if let Some(speed) = monster.speed {
            participant.speed = Some(speed);
            participant.remaining_movement = crate::model::movement_squares(Some(speed));
        }
        if monster.cr.is_some() {
            participant.cr = monster.cr;
        }
        if monster.kind.is_some() {
            participant.kind = monster.kind.clone();
        }
        if monster.size.is_some() {
            participant.size = monster.size.clone();
        }
    }

    /// Restore the pre-combat state: full HP, no conditions, fresh turn
    /// economy, round 1, cursor at the top. Idempotent.
    pub fn reset_encounter(&mut self) {
        for participant in &mut self.participants {
            participant.current_hp = participant.max_hp.max(0);
            participant.conditions.clear();
            participant.reset_turn();
        }
        self.round = 1;
        self.current_turn = 0;
    }

    fn all_down(&self) -> bool {
        self.participants.iter().all(|p| p.is_down())
    }

    fn sorted_indices(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.participants.len()).collect();
        order.sort_by(|&a, &b| {
            let pa = &self.participants[a];
            let pb = &self.participants[b];
            pb.initiative
                .cmp(&pa.initiative)
                .then(pb.dex_modifier().cmp(&pa.dex_modifier()))
        });
        order
    }
}
