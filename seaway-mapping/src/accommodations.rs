//! Folds operator-specific accommodation labels into the internal closed
//! category set.

use seaway_shared::AccommodationCategory;

/// Exact-match rows for codes we have seen from each operator.
fn exact_match(operator: &str, code: &str) -> Option<AccommodationCategory> {
    use AccommodationCategory::*;
    let table: &[(&str, AccommodationCategory)] = match operator {
        "maghreb" => &[
            ("DECK", Deck),
            ("PULLMAN", Deck),
            ("C2IN", Interior),
            ("C2EX", Exterior),
            ("C4IN", Interior),
            ("C4EX", Exterior),
            ("BERTH-M", SharedBerth),
            ("BERTH-F", SharedBerth),
            ("PETCAB", Pet),
            ("SUITE", Suite),
        ],
        "adriatic" => &[
            ("DKP", Deck),
            ("AB2", Exterior),
            ("AB4", Exterior),
            ("IB2", Interior),
            ("IB4", Interior),
            ("BAL", Balcony),
            ("SUI", Suite),
            ("DRM", SharedBerth),
        ],
        _ => &[],
    };
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, cat)| *cat)
}

/// Keyword heuristics with fixed precedence, used when no exact row
/// matches. Order matters: pet labels often also mention a window, and
/// shared-berth labels often also mention "cabin", so pet is checked
/// before window/outside and berth keywords before generic cabin.
pub fn keyword_fold(label: &str) -> AccommodationCategory {
    use AccommodationCategory::*;
    let l = label.to_lowercase();

    let contains_any = |words: &[&str]| words.iter().any(|w| l.contains(w));

    if contains_any(&["pet", "animal", "dog"]) {
        return Pet;
    }
    if contains_any(&["suite", "deluxe"]) {
        return Suite;
    }
    if contains_any(&["balcony", "terrace"]) {
        return Balcony;
    }
    if contains_any(&["berth", "dorm", "bed", "bunk"]) {
        return SharedBerth;
    }
    if contains_any(&["window", "outside", "exterior", "sea view", "seaview"]) {
        return Exterior;
    }
    if contains_any(&["inside", "interior", "inner", "cabin"]) {
        return Interior;
    }
    if contains_any(&["seat", "pullman", "lounge", "deck"]) {
        return Deck;
    }

    Deck
}

/// Fold one operator accommodation row: exact code first, keywords second.
pub fn fold(operator: &str, code: &str, label: &str) -> AccommodationCategory {
    exact_match(operator, code).unwrap_or_else(|| keyword_fold(label))
}
