mod stored;

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};

pub use stored::RecordError;

use crate::{
    languages::{Conversion, Language, Script},
    platform::Post,
    title::{self, Direction},
};

/// Longest flair text the subreddit allows.
pub const FLAIR_TEXT_LIMIT: usize = 64;

/// Where a request, or one language of a request, stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Untranslated,
    Missing,
    InProgress,
    Doublecheck,
    Translated,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Untranslated => "untranslated",
            Status::Missing => "missing",
            Status::InProgress => "inprogress",
            Status::Doublecheck => "doublecheck",
            Status::Translated => "translated",
        }
    }

    /// Flair text for statuses that replace the language name in the flair.
    #[must_use]
    pub fn description(self) -> Option<&'static str> {
        match self {
            Status::Untranslated => None,
            Status::Missing => Some("Missing Assets"),
            Status::InProgress => Some("In Progress"),
            Status::Doublecheck => Some("Needs Review"),
            Status::Translated => Some("Translated"),
        }
    }

    /// Marker shown after a language code in a defined multiple flair.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Status::Untranslated => "",
            Status::Missing => "⍉",
            Status::InProgress => "¦",
            Status::Doublecheck => "✓",
            Status::Translated => "✔",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultipleKind {
    #[default]
    Multiple,
    App,
}

impl MultipleKind {
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            MultipleKind::Multiple => "multiple",
            MultipleKind::App => "app",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            MultipleKind::Multiple => "Multiple Languages",
            MultipleKind::App => "App",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleRequest {
    pub language: Language,
    pub original_target_language_name: String,
    pub country_code: Option<String>,
    /// Only on Unknown requests.
    pub script: Option<Script>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedLanguage {
    pub language: Language,
    pub original_target_language_name: String,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipleTargets {
    /// "Any language" requests. One status for the whole request.
    Generic(Status),
    /// A fixed set of languages, each tracked on its own. Sorted by primary code.
    Defined(Vec<RequestedLanguage>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipleRequest {
    pub kind: MultipleKind,
    pub targets: MultipleTargets,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Single(SingleRequest),
    Multiple(MultipleRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub username: String,
    pub claimed_at: i64,
}

/// Post flair: a CSS class and the text shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Flair {
    pub css: String,
    pub text: String,
}

/// The tracking record of one request post.
///
/// Fields that must only grow or that have to stay consistent with each
/// other are private and only change through the methods here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "stored::StoredAjo", into = "stored::StoredAjo")]
pub struct Ajo {
    id: String,
    pub created_utc: i64,
    pub author: String,
    /// Title without the language tag.
    pub title: String,
    pub title_original: String,
    pub direction: Direction,
    pub original_source_language_name: Vec<String>,
    pub is_long: bool,
    pub is_identified: bool,
    pub is_bot_crosspost: bool,
    pub parent_crosspost: Option<String>,
    pub author_messaged: bool,
    request: Request,
    claim: Option<Claim>,
    language_history: Vec<String>,
    time_delta: BTreeMap<Status, i64>,
    recorded_translators: Vec<String>,
    notified: Vec<String>,
}

impl Ajo {
    /// Start tracking a post.
    #[must_use]
    pub fn from_post(post: &Post, bot_username: &str) -> Ajo {
        let author = post.author.clone().unwrap_or_else(|| "[deleted]".to_string());
        let mut ajo = Ajo::new(&post.id, post.created_utc, &author, &post.title);
        if let Some(parent) = &post.crosspost_parent {
            if author.eq_ignore_ascii_case(bot_username) {
                ajo.is_bot_crosspost = true;
                ajo.parent_crosspost = Some(parent.trim_start_matches("t3_").to_string());
            }
        }
        ajo
    }

    #[must_use]
    pub fn new(id: &str, created_utc: i64, author: &str, title_original: &str) -> Ajo {
        let info = title::parse_title(title_original);
        let request = request_from_title(&info);
        let mut ajo = Ajo {
            id: id.to_string(),
            created_utc,
            author: author.to_string(),
            title: match info.actual_title.is_empty() {
                true => title_original.to_string(),
                false => info.actual_title.clone(),
            },
            title_original: title_original.to_string(),
            direction: info.direction,
            original_source_language_name: info
                .source_languages
                .iter()
                .map(|x| x.name.clone())
                .collect(),
            is_long: false,
            is_identified: false,
            is_bot_crosspost: false,
            parent_crosspost: None,
            author_messaged: false,
            request,
            claim: None,
            language_history: Vec::new(),
            time_delta: BTreeMap::new(),
            recorded_translators: Vec::new(),
            notified: Vec::new(),
        };
        ajo.push_history();
        ajo
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    #[must_use]
    pub fn claim(&self) -> Option<&Claim> {
        self.claim.as_ref()
    }

    #[must_use]
    pub fn language_history(&self) -> &[String] {
        &self.language_history
    }

    #[must_use]
    pub fn time_delta(&self) -> &BTreeMap<Status, i64> {
        &self.time_delta
    }

    #[must_use]
    pub fn recorded_translators(&self) -> &[String] {
        &self.recorded_translators
    }

    #[must_use]
    pub fn notified(&self) -> &[String] {
        &self.notified
    }

    /// The request-wide status. `None` for defined multiples, whose
    /// languages each have their own.
    #[must_use]
    pub fn status(&self) -> Option<Status> {
        match &self.request {
            Request::Single(single) => Some(single.status),
            Request::Multiple(MultipleRequest {
                targets: MultipleTargets::Generic(status),
                ..
            }) => Some(*status),
            Request::Multiple(_) => None,
        }
    }

    /// Status of one language of a defined multiple, by primary code.
    #[must_use]
    pub fn status_of(&self, code: &str) -> Option<Status> {
        self.defined_languages()
            .iter()
            .find(|x| x.language.primary_code() == code)
            .map(|x| x.status)
    }

    #[must_use]
    pub fn single(&self) -> Option<&SingleRequest> {
        match &self.request {
            Request::Single(single) => Some(single),
            Request::Multiple(_) => None,
        }
    }

    /// Languages of a defined multiple. Empty for anything else.
    #[must_use]
    pub fn defined_languages(&self) -> &[RequestedLanguage] {
        match &self.request {
            Request::Multiple(MultipleRequest {
                targets: MultipleTargets::Defined(languages),
                ..
            }) => languages,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        matches!(self.request, Request::Multiple(_))
    }

    /// Every language the request is about.
    #[must_use]
    pub fn languages(&self) -> Vec<&Language> {
        match &self.request {
            Request::Single(single) => vec![&single.language],
            Request::Multiple(_) => self.defined_languages().iter().map(|x| &x.language).collect(),
        }
    }

    /// Name used in the language history and in messages.
    #[must_use]
    pub fn language_name(&self) -> &str {
        match &self.request {
            Request::Single(single) => &single.language.name,
            Request::Multiple(multiple) => multiple.kind.label(),
        }
    }

    /// True when nothing is left to do for the request.
    #[must_use]
    pub fn is_translated(&self) -> bool {
        match self.status() {
            Some(status) => status == Status::Translated,
            None => self
                .defined_languages()
                .iter()
                .all(|x| x.status == Status::Translated),
        }
    }

    /// The post flair, derived from the language and status.
    #[must_use]
    pub fn flair(&self) -> Flair {
        let mut flair = match &self.request {
            Request::Single(single) => self.single_flair(single),
            Request::Multiple(multiple) => multiple_flair(multiple),
        };
        if flair.text.chars().count() > FLAIR_TEXT_LIMIT {
            flair.text = flair.text.chars().take(FLAIR_TEXT_LIMIT).collect();
        }
        flair
    }

    fn single_flair(&self, single: &SingleRequest) -> Flair {
        let language = &single.language;
        let (css, tag) = if language.is_unknown() {
            ("unknown".to_string(), "[?]".to_string())
        } else if language.is_generic() {
            ("generic".to_string(), "[--]".to_string())
        } else {
            let code = language.primary_code();
            let tag = format!("[{}]", code.to_uppercase());
            match language.supported {
                true => (code.to_string(), tag),
                false => ("generic".to_string(), tag),
            }
        };

        if let Some(description) = single.status.description() {
            return Flair {
                css: single.status.as_str().to_string(),
                text: format!("{description} {tag}"),
            };
        }

        let mut text = match &single.script {
            Some(script) if language.is_unknown() => format!("{} (Script)", script.name),
            _ => language.name.clone(),
        };
        if let Some(country) = &single.country_code {
            text.push_str(&format!(" {{{country}}}"));
        }
        if self.is_identified {
            text.push_str(" (Identified)");
        }
        if self.is_long {
            text.push_str(" (Long)");
        }
        Flair { css, text }
    }

    fn push_history(&mut self) {
        let name = self.language_name().to_string();
        if self.language_history.last() != Some(&name) {
            self.language_history.push(name);
        }
    }

    /// Records the first time a status was reached. Later calls for the
    /// same status are ignored.
    pub fn set_time(&mut self, status: Status, moment: i64) {
        self.time_delta.entry(status).or_insert(moment);
    }

    /// Set the request-wide status. Returns whether anything changed.
    /// Does nothing on defined multiples, use [`Self::set_status_for`].
    pub fn set_status(&mut self, status: Status, moment: i64) -> bool {
        let current = match &mut self.request {
            Request::Single(single) => &mut single.status,
            Request::Multiple(MultipleRequest {
                targets: MultipleTargets::Generic(current),
                ..
            }) => current,
            Request::Multiple(_) => return false,
        };
        if *current == status {
            return false;
        }
        *current = status;
        if status != Status::InProgress {
            self.claim = None;
        }
        self.set_time(status, moment);
        true
    }

    /// Set the status of one language of a defined multiple.
    /// A translated language stays translated. Returns whether anything changed.
    pub fn set_status_for(&mut self, language: &Language, status: Status, moment: i64) -> bool {
        let Request::Multiple(MultipleRequest {
            targets: MultipleTargets::Defined(languages),
            ..
        }) = &mut self.request
        else {
            return false;
        };
        let Some(entry) = languages
            .iter_mut()
            .find(|x| x.language.code_3 == language.code_3)
        else {
            return false;
        };
        if entry.status == status || entry.status == Status::Translated {
            return false;
        }
        entry.status = status;
        self.set_time(status, moment);
        true
    }

    /// Change the language. Identification marks the language as
    /// confirmed by someone who knows it.
    pub fn set_language(&mut self, conversion: Conversion, identified: bool) {
        let Conversion {
            language,
            country_code,
            script,
        } = conversion;

        if language.is_multiple() {
            let kind = match language.code_3.as_str() {
                "app" => MultipleKind::App,
                _ => MultipleKind::Multiple,
            };
            self.request = Request::Multiple(MultipleRequest {
                kind,
                targets: MultipleTargets::Generic(Status::Untranslated),
            });
        } else {
            let status = self.status().unwrap_or(Status::Untranslated);
            let script = script.filter(|_| language.is_unknown());
            self.request = Request::Single(SingleRequest {
                language,
                original_target_language_name: self.original_target_language_name(),
                country_code,
                script,
                status,
            });
        }
        self.is_identified = identified;
        self.push_history();
    }

    /// Make this an Unknown request written in `script`.
    pub fn set_script(&mut self, script: Script) {
        self.set_language(
            Conversion {
                language: Language::unknown(),
                country_code: None,
                script: Some(script),
            },
            false,
        );
    }

    /// Make this a defined multiple over `languages`, all untranslated.
    /// English and duplicates are dropped, and the list is cut short
    /// so the flair still fits. Returns `false` and leaves the record
    /// alone if no language is left.
    #[must_use]
    pub fn set_defined_multiple(&mut self, languages: Vec<Language>) -> bool {
        let mut languages: Vec<Language> = languages
            .into_iter()
            .filter(|x| !x.is_english() && !x.is_multiple() && !x.is_generic())
            .collect();
        if languages.is_empty() {
            return false;
        }
        languages.sort_by(|a, b| a.primary_code().cmp(b.primary_code()));
        languages.dedup_by(|a, b| a.code_3 == b.code_3);

        let codes_length = |languages: &[Language]| -> usize {
            languages.iter().map(|x| x.primary_code().len() + 2).sum::<usize>()
        };
        if codes_length(&languages) > 34 {
            let mut kept = Vec::new();
            for language in languages {
                if codes_length(&kept) > 28 {
                    break;
                }
                kept.push(language);
            }
            languages = kept;
        }

        let kind = match &self.request {
            Request::Multiple(multiple) => multiple.kind,
            Request::Single(_) => MultipleKind::Multiple,
        };
        self.request = Request::Multiple(MultipleRequest {
            kind,
            targets: MultipleTargets::Defined(
                languages
                    .into_iter()
                    .map(|language| RequestedLanguage {
                        original_target_language_name: language.name.clone(),
                        language,
                        status: Status::Untranslated,
                    })
                    .collect(),
            ),
        });
        self.claim = None;
        self.push_history();
        true
    }

    pub fn set_country(&mut self, country_code: Option<String>) {
        if let Request::Single(single) = &mut self.request {
            single.country_code = country_code.map(|x| x.to_uppercase());
        }
    }

    pub fn set_claim(&mut self, username: &str, moment: i64) -> bool {
        if !matches!(self.request, Request::Single(_)) {
            return false;
        }
        self.set_status(Status::InProgress, moment);
        self.claim = Some(Claim {
            username: username.to_string(),
            claimed_at: moment,
        });
        true
    }

    /// Drop a claim older than `expiry` seconds, putting the request back
    /// to untranslated. Returns whether it did.
    pub fn expire_claim(&mut self, now: i64, expiry: i64) -> bool {
        let Some(claim) = &self.claim else {
            return false;
        };
        if now - claim.claimed_at < expiry {
            return false;
        }
        self.claim = None;
        if self.status() == Some(Status::InProgress) {
            self.set_status(Status::Untranslated, now);
        }
        true
    }

    /// Credit a translator. Already credited names are ignored.
    pub fn add_translator(&mut self, username: &str) {
        if !self.recorded_translators.iter().any(|x| x == username) {
            self.recorded_translators.push(username.to_string());
        }
    }

    pub fn add_notified(&mut self, usernames: &[String]) {
        for username in usernames {
            if !self.notified.contains(username) {
                self.notified.push(username.clone());
            }
        }
    }

    /// Re-derive the language from the original title and start over.
    /// The language history is kept.
    pub fn reset(&mut self) {
        let info = title::parse_title(&self.title_original);
        self.request = request_from_title(&info);
        self.direction = info.direction;
        self.time_delta.clear();
        self.claim = None;
        self.is_identified = false;
        self.push_history();
    }

    fn original_target_language_name(&self) -> String {
        match &self.request {
            Request::Single(single) => single.original_target_language_name.clone(),
            Request::Multiple(_) => title::parse_title(&self.title_original)
                .target_languages
                .first()
                .map(|x| x.name.clone())
                .unwrap_or_default(),
        }
    }
}

fn multiple_flair(multiple: &MultipleRequest) -> Flair {
    let text = match &multiple.targets {
        MultipleTargets::Generic(_) => multiple.kind.label().to_string(),
        MultipleTargets::Defined(languages) => {
            let tags: Vec<String> = languages
                .iter()
                .map(|x| format!("{}{}", x.language.primary_code().to_uppercase(), x.status.symbol()))
                .collect();
            format!("{} [{}]", multiple.kind.label(), tags.join(", "))
        }
    };
    Flair {
        css: multiple.kind.css().to_string(),
        text,
    }
}

fn request_from_title(info: &title::TitleInfo) -> Request {
    let kind = match info.is_app {
        true => MultipleKind::App,
        false => MultipleKind::Multiple,
    };
    let original_target = info
        .target_languages
        .first()
        .map(|x| x.name.clone())
        .unwrap_or_default();

    match info.requested.as_slice() {
        [language] if language.is_multiple() => Request::Multiple(MultipleRequest {
            kind: match language.code_3.as_str() {
                "app" => MultipleKind::App,
                _ => kind,
            },
            targets: MultipleTargets::Generic(Status::Untranslated),
        }),
        [language] => Request::Single(SingleRequest {
            language: language.clone(),
            original_target_language_name: original_target,
            country_code: info.country_code.clone(),
            script: None,
            status: Status::Untranslated,
        }),
        languages => {
            let mut languages: Vec<RequestedLanguage> = languages
                .iter()
                .map(|language| RequestedLanguage {
                    language: language.clone(),
                    original_target_language_name: language.name.clone(),
                    status: Status::Untranslated,
                })
                .collect();
            languages.sort_by(|a, b| a.language.primary_code().cmp(b.language.primary_code()));
            Request::Multiple(MultipleRequest {
                kind,
                targets: MultipleTargets::Defined(languages),
            })
        }
    }
}
