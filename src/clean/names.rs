//! Repair of player names whose diacritics were lost to a broken export encoding

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref NAME_REPLACEMENTS: HashMap<&'static str, &'static str> = HashMap::from([
        ("D?vis Bert?ns", "Davis Bertans"),
        ("Bogdan Bogdanovi?", "Bogdan Bogdanovic"),
        ("Bojan Bogdanovi?", "Bojan Bogdanovic"),
        ("Vlatko ?an?ar", "Vlatko Cancar"),
        ("Luka Don?i?", "Luka Doncic"),
        ("Goran Dragi?", "Goran Dragic"),
        ("Nikola Joki?", "Nikola Jokic"),
        ("Boban Marjanovi?", "Boban Marjanovic"),
        ("Jusuf Nurki?", "Jusuf Nurkic"),
        ("Kristaps Porzi??is", "Kristaps Porzingis"),
        ("Jonas Valan?i?nas", "Jonas Valanciunas"),
        ("Nikola Vu?evi?", "Nikola Vucevic"),
        ("Nikola Jovi?", "Nikola Jovic"),
    ]);

    // A question mark glued to a letter is a lost diacritic, not punctuation
    static ref MISENCODED: Regex = Regex::new(r"\p{L}\?|\?\p{L}").unwrap();
}

/// Map a known mis-encoded name to its ASCII spelling; anything else passes through unchanged
pub fn normalize_name(name: &str) -> String {
    match NAME_REPLACEMENTS.get(name) {
        Some(fixed) => fixed.to_string(),
        None => name.to_string(),
    }
}

/// Whether a name still looks mis-encoded after normalization
pub fn looks_misencoded(name: &str) -> bool {
    MISENCODED.is_match(name)
}

/// Normalize every name in place, warning about names the table does not know
pub fn normalize_names<'a, I>(names: I) -> usize
where
    I: IntoIterator<Item = &'a mut String>,
{
    let mut fixed = 0;
    for name in names {
        let normalized = normalize_name(name);
        if normalized != *name {
            fixed += 1;
            *name = normalized;
        } else if looks_misencoded(name) {
            log::warn!("Player name '{}' looks mis-encoded but has no known replacement", name);
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_are_fixed() {
        assert_eq!(normalize_name("Nikola Joki?"), "Nikola Jokic");
        assert_eq!(normalize_name("Kristaps Porzi??is"), "Kristaps Porzingis");
        assert_eq!(normalize_name("D?vis Bert?ns"), "Davis Bertans");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        assert_eq!(normalize_name("LeBron James"), "LeBron James");
        assert_eq!(normalize_name("nikola joki?"), "nikola joki?");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_misencoded_detection() {
        assert!(looks_misencoded("Dario ?ari?"));
        assert!(!looks_misencoded("Nikola Jokic"));
        assert!(!looks_misencoded("Unknown ?"));
    }

    #[test]
    fn test_normalize_names_counts_fixes() {
        let mut names = vec![
            "Luka Don?i?".to_string(),
            "Jayson Tatum".to_string(),
            "Nikola Vu?evi?".to_string(),
        ];
        assert_eq!(normalize_names(names.iter_mut()), 2);
        assert_eq!(names, vec!["Luka Doncic", "Jayson Tatum", "Nikola Vucevic"]);
    }
}
