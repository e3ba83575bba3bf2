//! Ammo penetration ranking.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ammo {
    pub name: String,
    pub icon_link: Option<String>,
    pub damage: Option<i64>,
    pub penetration_power: Option<i64>,
}

/// Rounds with a known, non-zero penetration, best first, at most `limit`.
pub fn top_penetration(ammo: &[Ammo], limit: usize) -> Vec<&Ammo> {
    let mut ranked: Vec<&Ammo> = ammo
        .iter()
        .filter(|round| round.penetration_power.is_some_and(|pen| pen != 0))
        .collect();
    ranked.sort_by(|a, b| b.penetration_power.cmp(&a.penetration_power));
    ranked.truncate(limit);
    ranked
}

/// Case-insensitive name search ordered by penetration; unknown penetration
/// sorts as zero.
pub fn search_ammo<'a>(ammo: &'a [Ammo], query: &str) -> Vec<&'a Ammo> {
    let needle = query.trim().to_lowercase();
    let mut matches: Vec<&Ammo> = ammo
        .iter()
        .filter(|round| needle.is_empty() || round.name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by_key(|round| std::cmp::Reverse(round.penetration_power.unwrap_or(0)));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(name: &str, pen: Option<i64>) -> Ammo {
        Ammo {
            name: name.to_string(),
            icon_link: None,
            damage: Some(50),
            penetration_power: pen,
        }
    }

    fn names(rounds: &[&Ammo]) -> Vec<String> {
        rounds.iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn top_penetration_skips_unknown_and_zero() {
        let ammo = vec![
            round("5.45x39mm PS gs", Some(28)),
            round("Flare", None),
            round("Buckshot", Some(0)),
            round("7.62x51mm M993", Some(70)),
        ];

        assert_eq!(
            names(&top_penetration(&ammo, 5)),
            vec!["7.62x51mm M993", "5.45x39mm PS gs"]
        );
    }

    #[test]
    fn top_penetration_truncates_and_keeps_ties_in_order() {
        let ammo = vec![
            round("a", Some(40)),
            round("b", Some(53)),
            round("c", Some(40)),
            round("d", Some(10)),
        ];

        assert_eq!(names(&top_penetration(&ammo, 3)), vec!["b", "a", "c"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let ammo = vec![
            round("5.56x45mm M855", Some(31)),
            round("5.56x45mm M855A1", Some(44)),
            round("9x19mm PST gzh", Some(20)),
        ];

        assert_eq!(
            names(&search_ammo(&ammo, " m855")),
            vec!["5.56x45mm M855A1", "5.56x45mm M855"]
        );
    }

    #[test]
    fn empty_search_returns_everything_with_unknown_last() {
        let ammo = vec![round("unknown", None), round("known", Some(5))];
        assert_eq!(names(&search_ammo(&ammo, "")), vec!["known", "unknown"]);
    }
}
