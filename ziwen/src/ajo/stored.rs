//! On-disk shape of an [`Ajo`]: one flat JSON object, with `type`
//! telling single and multiple requests apart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    Ajo, Claim, MultipleKind, MultipleRequest, MultipleTargets, Request, RequestedLanguage,
    SingleRequest, Status,
};
use crate::{
    languages::{self, Language, Script},
    title::Direction,
};

/// Why a stored record couldn't be turned back into an [`Ajo`].
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("language lists have different lengths")]
    LengthMismatch,
    #[error("no status for language {0}")]
    MissingStatus(String),
    #[error("status for {0}, which is not one of the requested languages")]
    StrayStatus(String),
    #[error("defined multiple request with a single status")]
    ScalarStatusForDefined,
    #[error("per-language statuses without any languages")]
    MappedStatusForGeneric,
}

#[derive(Serialize, Deserialize)]
pub struct StoredAjo {
    id: String,
    created_utc: i64,
    author: String,
    title: String,
    title_original: String,
    #[serde(default)]
    direction: Direction,
    #[serde(default)]
    original_source_language_name: Vec<String>,
    #[serde(flatten)]
    language: StoredLanguage,
    #[serde(default)]
    is_long: bool,
    #[serde(default)]
    is_identified: bool,
    #[serde(default)]
    is_bot_crosspost: bool,
    #[serde(default)]
    parent_crosspost: Option<String>,
    #[serde(default)]
    author_messaged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    claimed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    claimed_at: Option<i64>,
    #[serde(default)]
    language_history: Vec<String>,
    #[serde(default)]
    time_delta: BTreeMap<Status, i64>,
    #[serde(default)]
    recorded_translators: Vec<String>,
    #[serde(default)]
    notified: Vec<String>,
    /// Written for whoever reads the database by hand. Never read back,
    /// the flair is always derived again.
    #[serde(default)]
    output_oflair_css: Option<String>,
    #[serde(default)]
    output_oflair_text: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StoredLanguage {
    Single {
        language_code_1: Option<String>,
        language_code_3: String,
        language_name: String,
        #[serde(default)]
        original_target_language_name: String,
        #[serde(default)]
        is_supported: bool,
        #[serde(default)]
        country_code: Option<String>,
        #[serde(default)]
        script_code: Option<String>,
        #[serde(default)]
        script_name: Option<String>,
        status: Status,
    },
    Multiple {
        #[serde(default)]
        multiple_kind: MultipleKind,
        #[serde(default)]
        language_code_1: Vec<Option<String>>,
        #[serde(default)]
        language_code_3: Vec<String>,
        #[serde(default)]
        language_name: Vec<String>,
        #[serde(default)]
        original_target_language_name: Vec<String>,
        #[serde(default)]
        is_supported: bool,
        status: StoredStatus,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredStatus {
    Overall(Status),
    /// Keyed by primary language code.
    PerLanguage(BTreeMap<String, Status>),
}

impl From<Ajo> for StoredAjo {
    fn from(ajo: Ajo) -> Self {
        let flair = ajo.flair();
        let language = match ajo.request {
            Request::Single(single) => StoredLanguage::Single {
                language_code_1: single.language.code_1,
                language_code_3: single.language.code_3,
                language_name: single.language.name,
                original_target_language_name: single.original_target_language_name,
                is_supported: single.language.supported,
                country_code: single.country_code,
                script_code: single.script.as_ref().map(|x| x.code.clone()),
                script_name: single.script.map(|x| x.name),
                status: single.status,
            },
            Request::Multiple(multiple) => {
                let (languages, status) = match multiple.targets {
                    MultipleTargets::Generic(status) => (Vec::new(), StoredStatus::Overall(status)),
                    MultipleTargets::Defined(languages) => {
                        let status = languages
                            .iter()
                            .map(|x| (x.language.primary_code().to_string(), x.status))
                            .collect();
                        (languages, StoredStatus::PerLanguage(status))
                    }
                };
                let mut language_code_1 = Vec::with_capacity(languages.len());
                let mut language_code_3 = Vec::with_capacity(languages.len());
                let mut language_name = Vec::with_capacity(languages.len());
                let mut original_target_language_name = Vec::with_capacity(languages.len());
                for x in languages {
                    language_code_1.push(x.language.code_1);
                    language_code_3.push(x.language.code_3);
                    language_name.push(x.language.name);
                    original_target_language_name.push(x.original_target_language_name);
                }
                StoredLanguage::Multiple {
                    multiple_kind: multiple.kind,
                    language_code_1,
                    language_code_3,
                    language_name,
                    original_target_language_name,
                    is_supported: true,
                    status,
                }
            }
        };

        let (claimed_by, claimed_at) = match ajo.claim {
            Some(claim) => (Some(claim.username), Some(claim.claimed_at)),
            None => (None, None),
        };

        StoredAjo {
            id: ajo.id,
            created_utc: ajo.created_utc,
            author: ajo.author,
            title: ajo.title,
            title_original: ajo.title_original,
            direction: ajo.direction,
            original_source_language_name: ajo.original_source_language_name,
            language,
            is_long: ajo.is_long,
            is_identified: ajo.is_identified,
            is_bot_crosspost: ajo.is_bot_crosspost,
            parent_crosspost: ajo.parent_crosspost,
            author_messaged: ajo.author_messaged,
            claimed_by,
            claimed_at,
            language_history: ajo.language_history,
            time_delta: ajo.time_delta,
            recorded_translators: ajo.recorded_translators,
            notified: ajo.notified,
            output_oflair_css: Some(flair.css),
            output_oflair_text: Some(flair.text),
        }
    }
}

impl TryFrom<StoredAjo> for Ajo {
    type Error = RecordError;

    fn try_from(stored: StoredAjo) -> Result<Self, Self::Error> {
        let request = match stored.language {
            StoredLanguage::Single {
                language_code_1,
                language_code_3,
                language_name,
                original_target_language_name,
                is_supported,
                country_code,
                script_code,
                script_name,
                status,
            } => {
                let script = match (script_code, script_name) {
                    (Some(code), Some(name)) => Some(Script { code, name }),
                    (Some(code), None) => languages::script(&code),
                    _ => None,
                };
                Request::Single(SingleRequest {
                    language: Language {
                        code_1: language_code_1,
                        code_3: language_code_3,
                        name: language_name,
                        supported: is_supported,
                    },
                    original_target_language_name,
                    country_code,
                    script,
                    status,
                })
            }
            StoredLanguage::Multiple {
                multiple_kind,
                language_code_1,
                language_code_3,
                language_name,
                mut original_target_language_name,
                is_supported: _,
                status,
            } => {
                let count = language_code_3.len();
                if original_target_language_name.is_empty() {
                    original_target_language_name = language_name.clone();
                }
                if language_code_1.len() != count
                    || language_name.len() != count
                    || original_target_language_name.len() != count
                {
                    return Err(RecordError::LengthMismatch);
                }

                let targets = match (status, count) {
                    (StoredStatus::Overall(status), 0) => MultipleTargets::Generic(status),
                    (StoredStatus::Overall(_), _) => return Err(RecordError::ScalarStatusForDefined),
                    (StoredStatus::PerLanguage(map), 0) if map.is_empty() => {
                        MultipleTargets::Generic(Status::Untranslated)
                    }
                    (StoredStatus::PerLanguage(_), 0) => return Err(RecordError::MappedStatusForGeneric),
                    (StoredStatus::PerLanguage(mut map), _) => {
                        let mut languages = Vec::with_capacity(count);
                        let rows = language_code_1
                            .into_iter()
                            .zip(language_code_3)
                            .zip(language_name)
                            .zip(original_target_language_name);
                        for (((code_1, code_3), name), original_target) in rows {
                            let key = code_1.clone().unwrap_or_else(|| code_3.clone());
                            let status = map
                                .remove(&key)
                                .ok_or_else(|| RecordError::MissingStatus(key.clone()))?;
                            let supported = languages::by_code(&code_3).map_or(true, |x| x.supported);
                            languages.push(RequestedLanguage {
                                language: Language {
                                    code_1,
                                    code_3,
                                    name,
                                    supported,
                                },
                                original_target_language_name: original_target,
                                status,
                            });
                        }
                        if let Some(stray) = map.into_keys().next() {
                            return Err(RecordError::StrayStatus(stray));
                        }
                        MultipleTargets::Defined(languages)
                    }
                };
                Request::Multiple(MultipleRequest {
                    kind: multiple_kind,
                    targets,
                })
            }
        };

        let claim = match (stored.claimed_by, stored.claimed_at) {
            (Some(username), Some(claimed_at)) => Some(Claim {
                username,
                claimed_at,
            }),
            _ => None,
        };

        Ok(Ajo {
            id: stored.id,
            created_utc: stored.created_utc,
            author: stored.author,
            title: stored.title,
            title_original: stored.title_original,
            direction: stored.direction,
            original_source_language_name: stored.original_source_language_name,
            is_long: stored.is_long,
            is_identified: stored.is_identified,
            is_bot_crosspost: stored.is_bot_crosspost,
            parent_crosspost: stored.parent_crosspost,
            author_messaged: stored.author_messaged,
            request,
            claim,
            language_history: stored.language_history,
            time_delta: stored.time_delta,
            recorded_translators: stored.recorded_translators,
            notified: stored.notified,
        })
    }
}
