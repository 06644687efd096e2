// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Folder name to event title grammar

use chrono::NaiveDate;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Component, Path};
use std::sync::OnceLock;

use crate::config::EventConfig;

/// Built-in whole-word expansions. Keys are lowercase.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("bday", "birthday"),
    ("xmas", "christmas"),
    ("thanksgivng", "thanksgiving"),
    ("hols", "holidays"),
    ("vacay", "vacation"),
    ("grad", "graduation"),
    ("bbq", "barbecue"),
    ("nye", "new year's eve"),
    ("wknd", "weekend"),
    ("bball", "basketball"),
];

fn full_date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})[-_.]?(\d{2})[-_.]?(\d{2})(?:[\s_.,-]+|$)").expect("valid date pattern")
    })
}

fn month_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{4})[-_.](\d{2})(?:[\s_.,-]+|$)").expect("valid month pattern")
    })
}

/// A `YYYY` or `YYYY-MM` folder that groups a year's events
fn year_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[12]\d{3}(?:[-_.]\d{2})?$").expect("valid year pattern"))
}

/// Pure mapping from folder paths to event titles
#[derive(Debug, Clone)]
pub struct EventNamer {
    abbreviations: HashMap<String, String>,
    transparent: Vec<String>,
    context_parents: Vec<String>,
    year_context: bool,
}

impl Default for EventNamer {
    fn default() -> Self {
        Self::from_config(&EventConfig::default())
    }
}

impl EventNamer {
    /// Build a namer from the built-in table plus the configured extras
    pub fn from_config(config: &EventConfig) -> Self {
        let mut abbreviations: HashMap<String, String> = ABBREVIATIONS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        for (k, v) in &config.abbreviations {
            abbreviations.insert(k.to_lowercase(), v.clone());
        }
        Self {
            abbreviations,
            transparent: config.transparent_folders.clone(),
            context_parents: config.context_parents.clone(),
            year_context: config.year_context,
        }
    }

    /// Normalize a folder name into an event title.
    ///
    /// Strips a leading date stamp, turns `_`/`-` into spaces, expands known
    /// abbreviations and title-cases the words. A name that is only a date
    /// becomes that date in ISO form; a name that normalizes to nothing falls
    /// back to the raw name.
    pub fn normalize(&self, folder_name: &str) -> String {
        let raw = folder_name.trim();
        let (date, rest) = match strip_date_prefix(raw) {
            Some((date, rest)) => (Some(date), rest),
            None => (None, raw),
        };

        let expanded = self.expand(&collapse_separators(rest));
        let candidate = match (expanded.is_empty(), date) {
            (false, _) => expanded,
            (true, Some(date)) => date,
            (true, None) if raw.is_empty() => return folder_name.to_string(),
            (true, None) => raw.to_string(),
        };

        title_case(candidate.trim())
    }

    /// Title of the event a media file joins, from the folders above it.
    ///
    /// Transparent folders are skipped. Below a context parent such as
    /// `Life`, the period folder and the folder under it form the title
    /// (`Life/Fall 2010/Whoopie pies` gives `Fall 2010 - Whoopie Pies`).
    /// Below a `YYYY` or `YYYY-MM` folder, the first event-worthy folder is
    /// the event and deeper folders join it, so `2010/Party` and `2015/Party`
    /// stay apart. Otherwise the file's own folder names the event.
    ///
    /// Returns `None` only when the file has no named folder above it.
    pub fn event_title(&self, file: &Path) -> Option<String> {
        let chain: Vec<&str> = file
            .parent()?
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .filter(|name| !is_listed(&self.transparent, name))
            .collect();
        let own = *chain.last()?;

        // Innermost context parent with a period folder under it
        if let Some(i) = (0..chain.len().saturating_sub(1))
            .rev()
            .find(|&i| is_listed(&self.context_parents, chain[i]))
        {
            let period = match chain[i + 1].trim() {
                "" => chain[i + 1],
                trimmed => trimmed,
            };
            return Some(match chain.get(i + 2) {
                Some(event) => format!("{} - {}", period, self.normalize(event)),
                None => period.to_string(),
            });
        }

        if self.year_context {
            if let Some(i) = (0..chain.len().saturating_sub(1))
                .rev()
                .find(|&i| year_pattern().is_match(chain[i].trim()) && is_event_folder(chain[i + 1]))
            {
                return Some(format!("{} - {}", chain[i].trim(), self.normalize(chain[i + 1])));
            }

            // Not event-worthy on its own, keep the year so `2010/12` and `2011/12` differ
            if let [.., year, own] = chain.as_slice() {
                if year_pattern().is_match(year.trim()) && strip_date_prefix(own.trim()).is_none() {
                    return Some(format!("{} - {}", year.trim(), self.normalize(own)));
                }
            }
        }

        Some(self.normalize(own))
    }

    fn expand(&self, spaced: &str) -> String {
        spaced
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(|word| {
                self.abbreviations
                    .get(&word.to_lowercase())
                    .map(String::as_str)
                    .unwrap_or(word)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a leading date stamp off a folder name.
///
/// Returns the date in ISO form and the remainder with the separator after
/// the date removed.
pub fn strip_date_prefix(name: &str) -> Option<(String, &str)> {
    if let Some(caps) = full_date_pattern().captures(name) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            return Some((date.format("%Y-%m-%d").to_string(), &name[end..]));
        }
    }

    let caps = month_pattern().captures(name)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
    Some((date.format("%Y-%m").to_string(), &name[end..]))
}

fn collapse_separators(s: &str) -> String {
    s.replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a folder name can stand as an event on its own: more than two
/// characters and at least one letter
pub fn is_event_folder(name: &str) -> bool {
    let name = name.trim();
    name.chars().count() > 2 && name.chars().any(|c| c.is_ascii_alphabetic())
}

fn is_listed(names: &[String], name: &str) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn namer() -> EventNamer {
        EventNamer::default()
    }

    #[test]
    fn test_date_prefix_and_separators() {
        assert_eq!(namer().normalize("2011-07-04_Family-Picnic"), "Family Picnic");
        assert_eq!(namer().normalize("20100916_Whoopie pies"), "Whoopie Pies");
        assert_eq!(namer().normalize("2010.09.17 (Pillow cookies)"), "(Pillow Cookies)");
        assert_eq!(namer().normalize("2022-11 Thanksgiving"), "Thanksgiving");
    }

    #[test]
    fn test_pure_date_yields_formatted_date() {
        assert_eq!(namer().normalize("20150427"), "2015-04-27");
        assert_eq!(namer().normalize("2011-07-04"), "2011-07-04");
        assert_eq!(namer().normalize("2022-10"), "2022-10");
    }

    #[test]
    fn test_invalid_dates_are_kept() {
        // Not a calendar date, so nothing is stripped
        assert_eq!(namer().normalize("2011-13-45 party"), "2011 13 45 Party");
        assert_eq!(namer().normalize("2022 Pro Fam Photos"), "2022 Pro Fam Photos");
    }

    #[test]
    fn test_abbreviation_expansion() {
        assert_eq!(namer().normalize("2019-03-02_Emma-bday"), "Emma Birthday");
        assert_eq!(namer().normalize("XMAS at grandmas"), "Christmas At Grandmas");
    }

    #[test]
    fn test_configured_abbreviations_override() {
        let mut config = EventConfig::default();
        config.abbreviations.insert("BCM".to_string(), "bible camp".to_string());
        let namer = EventNamer::from_config(&config);
        assert_eq!(namer.normalize("BCM_Banquet"), "Bible Camp Banquet");
    }

    #[test]
    fn test_acronyms_and_numbers_survive() {
        assert_eq!(namer().normalize("BCM Banquet"), "BCM Banquet");
        assert_eq!(namer().normalize("Baby's 4th week"), "Baby's 4th Week");
    }

    #[test]
    fn test_fallback_to_raw_name() {
        assert_eq!(namer().normalize("___"), "___");
        // Whitespace-only names still name an event
        assert_eq!(namer().normalize("  "), "  ");
    }

    #[test]
    fn test_spacing_and_case_variants_agree() {
        let a = namer().normalize("Beach Day");
        let b = namer().normalize("beach  day");
        let c = namer().normalize("beach_day");
        assert_eq!(a, "Beach Day");
        assert_eq!(b, a);
        assert_eq!(c, a);
    }

    #[test]
    fn test_deterministic() {
        let n = namer();
        for name in ["2011-07-04_Family-Picnic", "Fall 2010", "06-07", "xmas"] {
            assert_eq!(n.normalize(name), n.normalize(name));
        }
    }

    fn title(path: &str) -> Option<String> {
        namer().event_title(&Path::new(path).join("a.jpg"))
    }

    #[test]
    fn test_event_title_from_year_folders() {
        let cases = [
            ("Pictures/2010/12", "2010 - 12"),
            ("Pictures/1969/Baby #3 - 12 weeks", "1969 - Baby #3 12 Weeks"),
            ("Pictures/2011", "2011"),
            ("Pictures/2011/05.07.11, Heather's wedding", "2011 - 05.07.11, Heather's Wedding"),
            ("Pictures/2010/Baby's 4th week 10.20-10.26/Originals", "2010 - Baby's 4th Week 10.20 10.26"),
            ("Pictures/Ebaying/20150427", "2015-04-27"),
            ("Pictures/2020/2020-12/1225_Christmas", "2020-12 - 1225 Christmas"),
            ("Pictures/2022/2022-10", "2022-10"),
            ("Pictures/2022/2022-11/11.24 Thanksgiving", "2022-11 - 11.24 Thanksgiving"),
            ("Pictures/2022/2022 Pro Fam Photos/familysession", "2022 - 2022 Pro Fam Photos"),
        ];
        for (path, expected) in cases {
            assert_eq!(title(path).as_deref(), Some(expected), "{}", path);
        }
    }

    #[test]
    fn test_event_title_under_context_parent() {
        let cases = [
            ("Pictures/Life/Fall 2010", "Fall 2010"),
            ("Pictures/Life/Fall 2010/20100916_Whoopie pies", "Fall 2010 - Whoopie Pies"),
            ("Pictures/Life/Fall 2010/20100917 (Pillow cookies)", "Fall 2010 - (Pillow Cookies)"),
            ("Pictures/Life/02-03", "02-03"),
            ("Pictures/Life/06-07/BCM Banquet/Originals", "06-07 - BCM Banquet"),
        ];
        for (path, expected) in cases {
            assert_eq!(title(path).as_deref(), Some(expected), "{}", path);
        }
    }

    #[test]
    fn test_same_folder_in_different_years_stays_apart() {
        assert_eq!(title("/p/2010/Party").as_deref(), Some("2010 - Party"));
        assert_eq!(title("/p/2015/Party").as_deref(), Some("2015 - Party"));
    }

    #[test]
    fn test_event_title_without_context() {
        assert_eq!(title("/p/2011-07-04_Family-Picnic").as_deref(), Some("Family Picnic"));
        assert_eq!(title("/p/Banquet/Originals").as_deref(), Some("Banquet"));
        assert_eq!(title("/p/   ").as_deref(), Some("   "));
        assert_eq!(namer().event_title(Path::new("a.jpg")), None);
    }

    #[test]
    fn test_context_can_be_switched_off() {
        let mut config = EventConfig::default();
        config.year_context = false;
        config.context_parents.clear();
        let namer = EventNamer::from_config(&config);
        let title = |p: &str| namer.event_title(&Path::new(p).join("a.jpg"));
        assert_eq!(title("/p/2010/Party").as_deref(), Some("Party"));
        assert_eq!(title("/p/Life/Fall 2010").as_deref(), Some("Fall 2010"));
    }

    #[test]
    fn test_event_folder_worthiness() {
        assert!(is_event_folder("Party"));
        assert!(is_event_folder("1225_Christmas"));
        assert!(!is_event_folder("12"));
        assert!(!is_event_folder("2022-10"));
        assert!(!is_event_folder("ab"));
    }
}
