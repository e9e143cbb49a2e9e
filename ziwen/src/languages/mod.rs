mod table;

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;

use table::{
    LanguageEntry, BIBLIOGRAPHIC_CODES, COUNTRIES, DEFAULT_REGIONS, LANGUAGES, MISTAKEN_CODES,
    SCRIPTS, SPECIAL, SPECIAL_CODES,
};

/// A language, or one of the pseudo-languages requests can be about
/// (`unknown`, `multiple`, `app`, `generic`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language {
    pub code_1: Option<String>,
    pub code_3: String,
    pub name: String,
    pub supported: bool,
}

impl Language {
    fn from_entry(entry: &LanguageEntry) -> Language {
        Language {
            code_1: entry.code_1.map(str::to_string),
            code_3: entry.code_3.to_string(),
            name: entry.name.to_string(),
            supported: entry.supported,
        }
    }

    fn special(code: &str) -> Language {
        SPECIAL
            .iter()
            .find(|x| x.code_3 == code)
            .map(Language::from_entry)
            .unwrap_or_else(|| Language {
                code_1: None,
                code_3: code.to_string(),
                name: code.to_string(),
                supported: false,
            })
    }

    #[must_use]
    pub fn unknown() -> Language {
        Language::special("unknown")
    }

    #[must_use]
    pub fn generic() -> Language {
        Language::special("generic")
    }

    #[must_use]
    pub fn multiple() -> Language {
        Language::special("multiple")
    }

    #[must_use]
    pub fn app() -> Language {
        Language::special("app")
    }

    /// The ISO 639-1 code if there is one, else the ISO 639-3 code.
    #[must_use]
    pub fn primary_code(&self) -> &str {
        self.code_1.as_deref().unwrap_or(&self.code_3)
    }

    #[must_use]
    pub fn is_english(&self) -> bool {
        self.code_3 == "eng"
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.code_3 == "unknown"
    }

    #[must_use]
    pub fn is_generic(&self) -> bool {
        self.code_3 == "generic"
    }

    /// `multiple` or `app`.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.code_3 == "multiple" || self.code_3 == "app"
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Script {
    /// Four letter ISO 15924 code, lowercase.
    pub code: String,
    pub name: String,
}

/// Result of interpreting free-form language input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub language: Language,
    /// Uppercase ISO 3166-1 alpha-2.
    pub country_code: Option<String>,
    /// Only ever set together with [`Language::unknown`].
    pub script: Option<Script>,
}

impl Conversion {
    fn plain(language: Language) -> Conversion {
        Conversion {
            language,
            country_code: None,
            script: None,
        }
    }
}

fn all_entries() -> impl Iterator<Item = &'static LanguageEntry> {
    LANGUAGES.iter().chain(SPECIAL)
}

/// Look a language up by ISO 639-1 or 639-3 code, forgiving a few
/// habitual mistakes like `jp`.
#[must_use]
pub fn by_code(code: &str) -> Option<Language> {
    let code = code.trim().to_lowercase();
    let code = SPECIAL_CODES
        .iter()
        .chain(MISTAKEN_CODES)
        .chain(BIBLIOGRAPHIC_CODES)
        .find(|(from, _)| *from == code)
        .map_or(code.as_str(), |(_, to)| *to);

    all_entries()
        .find(|x| x.code_1 == Some(code) || x.code_3 == code)
        .map(Language::from_entry)
}

/// Look a language up by its name or a well known alternate name.
#[must_use]
pub fn by_name(name: &str) -> Option<Language> {
    let name = name.trim();
    all_entries()
        .find(|x| {
            x.name.eq_ignore_ascii_case(name)
                || x.alternates.iter().any(|alt| alt.eq_ignore_ascii_case(name))
        })
        .map(Language::from_entry)
}

#[must_use]
pub fn script(code: &str) -> Option<Script> {
    let code = code.trim().to_lowercase();
    SCRIPTS
        .iter()
        .find(|(x, _)| *x == code)
        .map(|(code, name)| Script {
            code: (*code).to_string(),
            name: (*name).to_string(),
        })
}

/// Look a country up by alpha-2 code or English name.
/// Returns the uppercase code and the name.
#[must_use]
pub fn country(input: &str) -> Option<(&'static str, &'static str)> {
    let input = input.trim();
    COUNTRIES
        .iter()
        .find(|(code, name)| code.eq_ignore_ascii_case(input) || name.eq_ignore_ascii_case(input))
        .copied()
}

/// Interpret free-form language input: a code, a name, a regional tag
/// like `de-AT`, `Spanish {Mexico}`, or an unknown-script tag like
/// `unknown-cyrl`.
#[must_use]
pub fn convert(input: &str) -> Option<Conversion> {
    let input = input.trim().trim_matches(|x: char| x == '"' || x == '\'').trim();
    if input.is_empty() {
        return None;
    }

    if let Some((language, rest)) = input.split_once('{') {
        let mut conversion = convert(language)?;
        conversion.country_code = country(rest.trim_end_matches('}')).map(|(code, _)| code.to_string());
        return Some(conversion);
    }

    if let Some((left, right)) = input.split_once(|x: char| x == '-' || x == '_') {
        if let Some(conversion) = convert_tag(left, right) {
            return Some(conversion);
        }
    }

    let by_code = match input.len() {
        2 | 3 if input.chars().all(|x| x.is_ascii_alphabetic()) => by_code(input),
        _ => None,
    };
    by_code.or_else(|| by_name(input)).map(Conversion::plain)
}

fn convert_tag(left: &str, right: &str) -> Option<Conversion> {
    if !left.chars().all(|x| x.is_ascii_alphabetic()) || !right.chars().all(|x| x.is_ascii_alphabetic()) {
        return None;
    }

    if right.len() == 4 {
        let script = script(right)?;
        if !left.eq_ignore_ascii_case("unknown") && !matches!(left.to_lowercase().as_str(), "und" | "mis") {
            return None;
        }
        return Some(Conversion {
            language: Language::unknown(),
            country_code: None,
            script: Some(script),
        });
    }

    if right.len() == 2 && (left.len() == 2 || left.len() == 3) {
        let language = by_code(left)?;
        let tag = format!("{}-{}", left.to_lowercase(), right.to_lowercase());
        let country_code = match DEFAULT_REGIONS.contains(&tag.as_str()) {
            true => None,
            false => country(right).map(|(code, _)| code.to_string()),
        };
        return Some(Conversion {
            language,
            country_code,
            script: None,
        });
    }

    None
}

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("valid regex"));

/// Every real language mentioned by name in `text`, in order of first
/// mention. Words of three letters or less are ignored, they are too
/// likely to be something else.
#[must_use]
pub fn mentioned_languages(text: &str) -> Vec<Language> {
    let mut found: Vec<Language> = Vec::new();
    for word in WORD.find_iter(text).map(|x| x.as_str()) {
        if word.len() <= 3 {
            continue;
        }
        let Some(entry) = LANGUAGES.iter().find(|x| {
            x.code_3 != "zxx"
                && x.code_3 != "art"
                && (x.name.eq_ignore_ascii_case(word)
                    || x.alternates.iter().any(|alt| alt.eq_ignore_ascii_case(word)))
        }) else {
            continue;
        };
        if !found.iter().any(|x| x.code_3 == entry.code_3) {
            found.push(Language::from_entry(entry));
        }
    }
    found
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn codes_and_names() {
        let japanese = convert("ja").unwrap().language;
        assert_eq!(japanese.name, "Japanese");
        assert_eq!(japanese.code_3, "jpn");
        assert_eq!(convert("JPN").unwrap().language, japanese);
        assert_eq!(convert("jp").unwrap().language, japanese);
        assert_eq!(convert("japanese").unwrap().language, japanese);
        assert_eq!(convert("ger").unwrap().language.name, "German");
        assert_eq!(convert("Farsi").unwrap().language.name, "Persian");
        assert_eq!(convert("yue").unwrap().language.primary_code(), "yue");
        assert_eq!(convert("xx"), None);
        assert_eq!(convert("Klingonese"), None);
        assert_eq!(convert("  "), None);
    }

    #[test]
    fn english_is_not_supported() {
        let english = convert("English").unwrap().language;
        assert!(english.is_english());
        assert!(!english.supported);
    }

    #[test]
    fn pseudo_languages() {
        assert!(convert("unknown").unwrap().language.is_unknown());
        assert!(convert("und").unwrap().language.is_unknown());
        assert!(convert("mul").unwrap().language.is_multiple());
        assert!(convert("Any").unwrap().language.is_multiple());
        assert_eq!(convert("app").unwrap().language, Language::app());
    }

    #[test]
    fn regional_tags() {
        let austrian = convert("de-AT").unwrap();
        assert_eq!(austrian.language.name, "German");
        assert_eq!(austrian.country_code.as_deref(), Some("AT"));

        let chinese = convert("zh-CN").unwrap();
        assert_eq!(chinese.country_code, None);

        let mexican = convert("Spanish {Mexico}").unwrap();
        assert_eq!(mexican.language.name, "Spanish");
        assert_eq!(mexican.country_code.as_deref(), Some("MX"));
    }

    #[test]
    fn unknown_scripts() {
        let cyrillic = convert("unknown-cyrl").unwrap();
        assert!(cyrillic.language.is_unknown());
        assert_eq!(cyrillic.script.unwrap().name, "Cyrillic");
        assert_eq!(convert("unknown-zzzz"), None);
        assert_eq!(script("Hani").unwrap().name, "Han Characters");
    }

    #[test]
    fn hyphenated_names_still_work() {
        assert_eq!(convert("Anglo-Saxon").unwrap().language.code_3, "ang");
    }

    #[test]
    fn mentions() {
        let found = mentioned_languages("Croatian is done, French too. Also croatian again. Any app?");
        let names: Vec<_> = found.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, vec!["Croatian", "French"]);
        assert!(mentioned_languages("Lao and art").is_empty());
    }

    #[test]
    fn countries() {
        assert_eq!(country("mx"), Some(("MX", "Mexico")));
        assert_eq!(country("Taiwan"), Some(("TW", "Taiwan")));
        assert_eq!(country("Atlantis"), None);
    }
}
