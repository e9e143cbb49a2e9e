use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::languages::{self, Language};

/// Which way a request goes relative to English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    EnglishFrom,
    EnglishTo,
    EnglishBoth,
    #[default]
    EnglishNone,
}

/// Everything a request title says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleInfo {
    pub source_languages: Vec<Language>,
    pub target_languages: Vec<Language>,
    /// The languages the request is actually about. Never empty.
    pub requested: Vec<Language>,
    /// The title minus its language tag.
    pub actual_title: String,
    pub direction: Direction,
    pub country_code: Option<String>,
    /// Looks like a software localization request.
    pub is_app: bool,
}

/// Look-alikes people use in place of `>`.
const WRONG_DIRECTIONS: &[&str] = &["<", "〉", "›", "》", "»", "⟶", "&gt;", "→", "←", "~"];
const WRONG_BRACKETS_LEFT: &[&str] = &["［", "〚", "【", "〔", "〖", "⟦", "｟", "《"];
const WRONG_BRACKETS_RIGHT: &[&str] = &["］", "〛", "】", "〕", "〗", "⟧", "｠", "》"];

const APP_WORDS: &[&str] = &[
    " app ", "android", "game", "social network", " bot ", "crowdin", "localisation", "localize",
    "localise", "software", "crowdsourced", "localization", "addon", "add-on", "google play",
    "an app", "my app", "chatbot", "firefox",
];

static TAG_JOINER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\s*[>\-]\s*\[").expect("valid regex"));
static COUNTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}\d]+)\}").expect("valid regex"));
static SPELLED_DIRECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sto\s").expect("valid regex"));
static LIST_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,/+&|;:()\\]|\band\b").expect("valid regex"));

#[must_use]
pub fn is_app_request(title: &str) -> bool {
    let title = format!(" {} ", title.to_lowercase());
    APP_WORDS.iter().any(|x| title.contains(x))
}

/// Parse a request title like `[Japanese > English] What does this say?`.
///
/// Never fails: a title with no recognizable languages is a request
/// about [`Language::generic`].
#[must_use]
pub fn parse_title(title: &str) -> TitleInfo {
    let mut title = title
        .split("(x-post")
        .next()
        .unwrap_or(title)
        .trim()
        .to_string();

    for x in WRONG_DIRECTIONS {
        title = title.replace(x, " > ");
    }
    for x in WRONG_BRACKETS_LEFT {
        title = title.replace(x, "[");
    }
    for x in WRONG_BRACKETS_RIGHT {
        title = title.replace(x, "]");
    }
    title = TAG_JOINER.replace_all(&title, " > ").into_owned();

    let country_code = COUNTRY
        .captures(&title)
        .and_then(|x| x.get(1))
        .and_then(|x| languages::country(x.as_str()))
        .map(|(code, _)| code.to_string());
    title = COUNTRY.replace(&title, "").into_owned();

    let (tag, actual_title) = split_tag(&title);
    let is_app = is_app_request(&title);

    let lowercase_tag = tag.to_lowercase();
    if lowercase_tag.trim() == "unknown" || title.trim_start().starts_with('?') {
        return TitleInfo {
            source_languages: vec![Language::unknown()],
            target_languages: vec![english()],
            requested: vec![Language::unknown()],
            actual_title,
            direction: Direction::EnglishTo,
            country_code,
            is_app,
        };
    }

    // Lowercasing can change byte lengths, so positions come from `tag` itself.
    let (source, target) = match tag.find('>') {
        Some(index) => (&tag[..index], &tag[index + 1..]),
        None => match SPELLED_DIRECTION.find(&tag) {
            Some(found) => (&tag[..found.start()], &tag[found.end()..]),
            None => (tag.as_str(), ""),
        },
    };

    let mut source_languages = find_languages(source);
    let mut target_languages = find_languages(target);
    let direction = direction_of(&mut source_languages, &mut target_languages);
    let requested = requested_languages(&source_languages, &target_languages, direction);

    TitleInfo {
        source_languages,
        target_languages,
        requested,
        actual_title,
        direction,
        country_code,
        is_app,
    }
}

fn english() -> Language {
    languages::by_code("en").unwrap_or_else(Language::generic)
}

/// Splits off the bracketed language tag. Without brackets the whole
/// title is the tag and there's no separate title text.
fn split_tag(title: &str) -> (String, String) {
    if let Some(start) = title.find('[') {
        if let Some(length) = title[start..].find(']') {
            let tag = &title[start + 1..start + length];
            let rest = format!("{} {}", &title[..start], &title[start + length + 1..]);
            return (tag.trim().to_string(), rest.trim().to_string());
        }
    }
    (title.to_string(), String::new())
}

/// Languages named in one side of a tag. Bare codes only count when
/// they are the entire list item, otherwise "my" would be Burmese.
fn find_languages(side: &str) -> Vec<Language> {
    let mut found: Vec<Language> = Vec::new();
    for item in LIST_SEPARATOR.split(side) {
        let item = item.trim().trim_matches(|x: char| x.is_ascii_punctuation() && x != '-');
        if item.is_empty() {
            continue;
        }
        let languages_in_item = match languages::convert(item) {
            Some(conversion) => vec![conversion.language],
            None => item
                .split_whitespace()
                .filter(|word| word.chars().count() > 3)
                .filter_map(languages::by_name)
                .collect(),
        };
        for language in languages_in_item {
            if !found.contains(&language) {
                found.push(language);
            }
        }
    }
    if found.is_empty() {
        found.push(Language::generic());
    }
    found
}

fn direction_of(source: &mut Vec<Language>, target: &mut Vec<Language>) -> Direction {
    let in_source = source.iter().any(Language::is_english);
    let in_target = target.iter().any(Language::is_english);

    // "[English, German > English, French]": the longer side keeps its English.
    if in_source && in_target && source.len() + target.len() >= 3 {
        if source.len() >= 2 {
            source.retain(|x| !x.is_english());
        } else if target.len() >= 2 {
            target.retain(|x| !x.is_english());
        }
    }

    match (
        source.iter().any(Language::is_english),
        target.iter().any(Language::is_english),
    ) {
        (true, false) => Direction::EnglishFrom,
        (false, true) => Direction::EnglishTo,
        (true, true) => Direction::EnglishBoth,
        (false, false) => Direction::EnglishNone,
    }
}

fn requested_languages(source: &[Language], target: &[Language], direction: Direction) -> Vec<Language> {
    let first_useful = |languages: &[Language]| -> Option<Language> {
        languages
            .iter()
            .find(|x| !x.is_english() && !x.is_unknown() && !x.is_multiple() && !x.is_generic())
            .or_else(|| languages.iter().find(|x| !x.is_english() && !x.is_generic()))
            .cloned()
    };

    let requested = match direction {
        Direction::EnglishFrom => {
            let targets: Vec<Language> = target
                .iter()
                .filter(|x| !x.is_english() && !x.is_generic())
                .cloned()
                .collect();
            match targets.len() {
                0 => None,
                1 => targets.into_iter().next(),
                _ => return targets,
            }
        }
        Direction::EnglishTo => first_useful(source),
        Direction::EnglishBoth => first_useful(source).or_else(|| first_useful(target)).or_else(|| Some(english())),
        Direction::EnglishNone => first_useful(source).or_else(|| first_useful(target)),
    };

    vec![requested.unwrap_or_else(Language::generic)]
}
