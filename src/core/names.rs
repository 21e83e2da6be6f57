//! Generated workspace names

use rand::seq::SliceRandom;

const ADJECTIVES: &[&str] = &[
    "agile", "bright", "creative", "dynamic", "elegant", "fresh", "great", "happy",
    "innovative", "joyful", "keen", "lively", "modern", "noble", "optimal", "prime",
    "quick", "radiant", "smart", "trusted", "unique", "vital", "wise", "zesty",
];

const NOUNS: &[&str] = &[
    "space", "hub", "lab", "zone", "studio", "base", "center", "vault", "forge",
    "workshop", "arena", "chamber", "portal", "nest", "haven", "quarters", "realm",
];

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "{Adjective} {Noun}", e.g. "Radiant Forge"
pub fn generate_workspace_name() -> String {
    let mut rng = rand::thread_rng();
    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("fresh");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("space");
    format!("{} {}", capitalize(adjective), capitalize(noun))
}
