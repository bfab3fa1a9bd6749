//! Bundled monster reference data.
//!
//! A small SRD catalog that lookups fall back on when no remote source
//! is configured, plus the name-to-slug mapping for linking out to the
//! AideDD compendium. Names that resolve to nothing get a generic
//! placeholder stat block so the tracker always has something to show.

use crate::model::{AbilityScores, ChallengeRating, Monster, NamedBlock};
use lazy_static::lazy_static;

/// Look up a catalog monster by name, case-insensitively.
pub fn find_monster(name: &str) -> Option<Monster> {
    let name_lower = name.to_lowercase();
    MONSTERS
        .iter()
        .find(|m| m.name.to_lowercase() == name_lower)
        .cloned()
}

/// Resolve a name against the catalog, substituting a generic placeholder
/// when nothing matches.
///
/// The placeholder carries presentation defaults only; encounter math on
/// it is no better than its flat CR 1 guess.
pub fn find_or_generic(name: &str) -> Monster {
    find_monster(name).unwrap_or_else(|| generic_monster(name))
}

/// A generic stand-in stat block for an unknown monster name.
pub fn generic_monster(name: &str) -> Monster {
    let mut monster = Monster::new(name);
    monster.kind = Some("unknown".to_string());
    monster.size = Some("M".to_string());
    monster.alignment = Some("unaligned".to_string());
    monster.ac = Some(12);
    monster.hp = Some(30);
    monster.xp = Some(200);
    monster.cr = Some(ChallengeRating::Whole(1));
    monster.speed = Some(9.0);
    monster.abilities = Some(AbilityScores::default());
    monster.source = Some("generic".to_string());
    monster
}

/// URL slug for a monster name on AideDD.
///
/// Known irregular names resolve through an override table; everything
/// else is slugified (lowercased, accents stripped, apostrophes and
/// spaces turned into single hyphens).
pub fn monster_slug(name: &str) -> String {
    let trimmed = name.trim();
    if let Some(&slug) = SLUG_OVERRIDES
        .iter()
        .find(|(n, _)| *n == trimmed)
        .map(|(_, s)| s)
    {
        return slug.to_string();
    }
    slugify(trimmed)
}

/// Full compendium URL for a monster name.
pub fn monster_url(name: &str) -> String {
    format!("https://www.aidedd.org/dnd/monstres.php?vo={}", monster_slug(name))
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true; // swallow leading separators
    for c in name.chars() {
        let c = strip_accent(c).to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_hyphen = false;
        } else if !last_hyphen {
            // Apostrophes and spaces both become single hyphens.
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Fold the accented characters that show up in compendium names down
/// to ASCII.
fn strip_accent(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' | 'á' | 'À' | 'Â' | 'Ä' | 'Á' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'î' | 'ï' | 'í' | 'Î' | 'Ï' | 'Í' => 'i',
        'ô' | 'ö' | 'ó' | 'Ô' | 'Ö' | 'Ó' => 'o',
        'ù' | 'û' | 'ü' | 'ú' | 'Ù' | 'Û' | 'Ü' | 'Ú' => 'u',
        'ç' | 'Ç' => 'c',
        _ => c,
    }
}

/// Names whose compendium slugs do not follow the mechanical rule.
const SLUG_OVERRIDES: &[(&str, &str)] = &[
    ("Dragon d'ombre rouge jeune", "dragon-d-ombre-rouge-jeune"),
    ("Dragon d'ombre rouge, jeune", "dragon-d-ombre-rouge-jeune"),
    ("Dragon d'ombre rouge", "dragon-d-ombre-rouge-jeune"),
    ("Béhir", "behir"),
    ("Behir", "behir"),
    ("Arbre éveillé", "arbre-eveille"),
    ("Balor", "balor"),
];

fn srd(
    name: &str,
    cr: ChallengeRating,
    ac: i32,
    hp: i32,
    speed: f32,
    scores: [u8; 6],
    kind: &str,
    size: &str,
) -> Monster {
    let mut monster = Monster::new(name);
    monster.cr = Some(cr);
    monster.ac = Some(ac);
    monster.hp = Some(hp);
    monster.speed = Some(speed);
    monster.abilities = Some(AbilityScores {
        strength: scores[0],
        dexterity: scores[1],
        constitution: scores[2],
        intelligence: scores[3],
        wisdom: scores[4],
        charisma: scores[5],
    });
    monster.kind = Some(kind.to_string());
    monster.size = Some(size.to_string());
    monster.source = Some("srd".to_string());
    monster
}

lazy_static! {
    /// Bundled SRD monsters, a working subset for offline use.
    pub static ref MONSTERS: Vec<Monster> = {
        use ChallengeRating::*;
        let mut list = vec![
            srd("Goblin", Quarter, 15, 7, 9.0, [8, 14, 10, 10, 8, 8], "humanoid", "S"),
            srd("Wolf", Quarter, 13, 11, 12.0, [12, 15, 12, 3, 12, 6], "beast", "M"),
            srd("Skeleton", Quarter, 13, 13, 9.0, [10, 14, 15, 6, 8, 5], "undead", "M"),
            srd("Zombie", Quarter, 8, 22, 6.0, [13, 6, 16, 3, 6, 5], "undead", "M"),
            srd("Orc", Half, 13, 15, 9.0, [16, 12, 16, 7, 11, 10], "humanoid", "M"),
            srd("Hobgoblin", Half, 18, 11, 9.0, [13, 12, 12, 10, 10, 9], "humanoid", "M"),
            srd("Ghoul", Whole(1), 12, 22, 9.0, [13, 15, 10, 7, 10, 6], "undead", "M"),
            srd("Bugbear", Whole(1), 16, 27, 9.0, [15, 14, 13, 8, 11, 9], "humanoid", "M"),
            srd("Dire Wolf", Whole(1), 14, 37, 15.0, [17, 15, 15, 3, 12, 7], "beast", "L"),
            srd("Ogre", Whole(2), 11, 59, 12.0, [19, 8, 16, 5, 7, 7], "giant", "L"),
            srd("Ghast", Whole(2), 13, 36, 9.0, [16, 17, 10, 11, 10, 8], "undead", "M"),
            srd("Owlbear", Whole(3), 13, 59, 12.0, [20, 12, 17, 3, 12, 7], "monstrosity", "L"),
            srd("Werewolf", Whole(3), 11, 58, 9.0, [15, 13, 14, 10, 11, 10], "humanoid", "M"),
            srd("Ettin", Whole(4), 12, 85, 12.0, [21, 8, 17, 6, 10, 8], "giant", "L"),
            srd("Troll", Whole(5), 15, 84, 9.0, [18, 13, 20, 7, 9, 7], "giant", "L"),
            srd("Hill Giant", Whole(5), 13, 105, 12.0, [21, 8, 19, 5, 9, 6], "giant", "H"),
            srd("Stone Giant", Whole(7), 17, 126, 12.0, [23, 15, 20, 10, 12, 9], "giant", "H"),
            srd("Frost Giant", Whole(8), 15, 138, 12.0, [23, 9, 21, 9, 10, 12], "giant", "H"),
            srd("Fire Giant", Whole(9), 18, 162, 9.0, [25, 9, 23, 10, 14, 13], "giant", "H"),
            srd("Adult Red Dragon", Whole(17), 19, 256, 12.0, [27, 10, 25, 16, 13, 21], "dragon", "H"),
        ];

        // A couple of entries carry their signature features.
        if let Some(troll) = list.iter_mut().find(|m| m.name == "Troll") {
            troll.traits.push(NamedBlock {
                name: "Regeneration".to_string(),
                description: "The troll regains 10 hit points at the start of its turn \
                              unless it took acid or fire damage."
                    .to_string(),
            });
        }
        if let Some(wolf) = list.iter_mut().find(|m| m.name == "Wolf") {
            wolf.traits.push(NamedBlock {
                name: "Pack Tactics".to_string(),
                description: "The wolf has advantage on attack rolls against a creature \
                              if at least one of the wolf's allies is within 5 feet of it."
                    .to_string(),
            });
        }

        list
    };
}
