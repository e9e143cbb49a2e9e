//! Commands people leave in comments, like `!translated` or `!id:ja`.
//!
//! Parsing and handling are both pure. Handlers take the current record and
//! return what should change; the polling loop does the talking to the site.

mod handlers;

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    ajo::Ajo,
    platform::ParentComment,
    responses, Error,
};

/// Words in a short OP comment that mean the request is done.
pub const THANKS_KEYWORDS: &[&str] = &[
    "thank", "thanks", "tyvm", "tysm", "thx", "danke", "arigato", "gracias", "appreciate",
    "solved",
];

/// Words that make a thank-you not a thank-you.
const RESERVATION_WORDS: &[&str] = &["but", "however", "no"];

/// Short thanks are shorter than this, in characters.
pub const SHORT_THANKS_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!identify:` / `!id:`. `advanced` is the trailing `!` form, which
    /// takes raw ISO 639-3 or ISO 15924 codes.
    Identify { argument: String, advanced: bool },
    /// `!set:`, moderators only. A trailing `!` also resets the status.
    Set { argument: String, reset_status: bool },
    Reset,
    Long,
    Missing,
    Claim,
    Doublecheck,
    Translated,
    Delete,
    Reference { argument: String },
    /// A short "thank you" from the OP.
    ShortThanks,
}

static IDENTIFY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!(?:identify|id):\s?(?:"([^"]+)"|\[([^\]]+)\]|([\w\-+'{}]+)(!)?)"#)
        .expect("valid regex")
});
static SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!set:\s?([\w\-+'{}]+)(!)?").expect("valid regex"));
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!reference:\s?(?:"([^"]+)"|([\w\-']+))"#).expect("valid regex")
});
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Find the command in a comment. The first rule that matches wins, so
/// `!id:ja !translated` is an identification.
#[must_use]
pub fn parse(text: &str) -> Option<Command> {
    let text = text.to_lowercase();

    if text.contains("!identify:") || text.contains("!id:") {
        let captures = IDENTIFY.captures(&text)?;
        let argument = (1..=3).find_map(|x| captures.get(x))?.as_str().trim();
        if argument.is_empty() {
            return None;
        }
        return Some(Command::Identify {
            argument: argument.to_string(),
            advanced: captures.get(4).is_some(),
        });
    }
    if text.contains("!set:") {
        let captures = SET.captures(&text)?;
        return Some(Command::Set {
            argument: captures.get(1)?.as_str().to_string(),
            reset_status: captures.get(2).is_some(),
        });
    }

    let simple = [
        ("!reset", Command::Reset),
        ("!long", Command::Long),
        ("!missing", Command::Missing),
        ("!claim", Command::Claim),
        ("!doublecheck", Command::Doublecheck),
        ("!translated", Command::Translated),
        ("!delete", Command::Delete),
    ];
    if let Some((_, command)) = simple.into_iter().find(|(x, _)| text.contains(x)) {
        return Some(command);
    }

    if text.contains("!reference:") {
        let captures = REFERENCE.captures(&text)?;
        let argument = captures.get(1).or_else(|| captures.get(2))?.as_str().trim();
        return Some(Command::Reference {
            argument: argument.to_string(),
        });
    }

    is_short_thanks(&text).then_some(Command::ShortThanks)
}

/// Whether a comment reads like a short and unreserved thank-you.
#[must_use]
pub fn is_short_thanks(text: &str) -> bool {
    let text = text.trim().to_lowercase();
    if text.chars().count() >= SHORT_THANKS_LIMIT {
        return false;
    }
    if !THANKS_KEYWORDS.iter().any(|x| text.contains(x)) {
        return false;
    }
    !WORD
        .find_iter(&text)
        .any(|x| RESERVATION_WORDS.contains(&x.as_str()))
}

/// Who said a command, where, and when.
#[derive(Debug, Clone)]
pub struct CommandContext<'a> {
    pub author: &'a str,
    pub is_moderator: bool,
    pub body: &'a str,
    /// The comment being replied to, if the command isn't top-level.
    pub parent: Option<&'a ParentComment>,
    /// Link to the post, for messages.
    pub permalink: &'a str,
    pub now: i64,
    pub claim_expiry_secs: i64,
}

impl CommandContext<'_> {
    fn is_op(&self, ajo: &Ajo) -> bool {
        self.author.eq_ignore_ascii_case(&ajo.author)
    }
}

/// Something the caller has to do on the site besides replying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    MessageUser {
        to: String,
        subject: String,
        body: String,
    },
    RemovePost,
}

/// What a command results in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The changed record. `None` if nothing changed.
    pub ajo: Option<Ajo>,
    /// Reply to the command's comment.
    pub reply: Option<String>,
    pub effects: Vec<Effect>,
}

impl Response {
    fn reply(text: String) -> Response {
        Response {
            reply: Some(text),
            ..Default::default()
        }
    }
}

/// Run a command against a record.
#[must_use]
pub fn dispatch(ajo: &Ajo, command: &Command, context: &CommandContext) -> Response {
    let mut updated = ajo.clone();
    let result = match command {
        Command::Identify { argument, advanced } => {
            handlers::identify(&mut updated, argument, *advanced)
        }
        Command::Set {
            argument,
            reset_status,
        } => handlers::set(&mut updated, argument, *reset_status, context),
        Command::Reset => Ok(handlers::reset(&mut updated, context)),
        Command::Long => Ok(handlers::long(&mut updated, context)),
        Command::Missing => Ok(handlers::missing(&mut updated, context)),
        Command::Claim => Ok(handlers::claim(&mut updated, context)),
        Command::Doublecheck => Ok(handlers::doublecheck(&mut updated, context)),
        Command::Translated => Ok(handlers::translated(&mut updated, context)),
        Command::Delete => Ok(handlers::delete(&updated, context)),
        Command::Reference { argument } => Ok(handlers::reference(argument)),
        Command::ShortThanks => Ok(handlers::short_thanks(&mut updated, context)),
    };

    let mut response = match result {
        Ok(response) => response,
        Err(Error::LanguageUnrecognized(input)) => {
            log::debug!("Unrecognized language {input:?} in {command:?}");
            return Response::reply(responses::invalid_language(&input));
        }
        Err(e) => {
            log::warn!("{command:?} on {} failed: {e}", ajo.id());
            return Response::default();
        }
    };
    if updated != *ajo {
        response.ajo = Some(updated);
    }
    response
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::ajo::{
        fixtures::{bronze_statue, great_lion},
        Status,
    };

    fn context<'a>(author: &'a str, body: &'a str) -> CommandContext<'a> {
        CommandContext {
            author,
            is_moderator: false,
            body,
            parent: None,
            permalink: "https://www.reddit.com/r/translator/comments/abc/",
            now: 1_700_000_000,
            claim_expiry_secs: 8 * 60 * 60,
        }
    }

    fn run(ajo: &Ajo, author: &str, body: &str) -> Response {
        let command = parse(body).unwrap();
        dispatch(ajo, &command, &context(author, body))
    }

    fn fresh() -> Ajo {
        Ajo::new("abc", 1_600_000_000, "asker", "[Japanese > English] Sign at a shrine")
    }

    #[test]
    fn parsing() {
        assert_eq!(
            parse("I think it's !id:ko"),
            Some(Command::Identify {
                argument: "ko".to_string(),
                advanced: false
            })
        );
        assert_eq!(
            parse("!identify: \"Classical Chinese\""),
            Some(Command::Identify {
                argument: "classical chinese".to_string(),
                advanced: false
            })
        );
        assert_eq!(
            parse("!identify:arb!"),
            Some(Command::Identify {
                argument: "arb".to_string(),
                advanced: true
            })
        );
        assert_eq!(
            parse("!set:de-AT!"),
            Some(Command::Set {
                argument: "de-at".to_string(),
                reset_status: true
            })
        );
        assert_eq!(parse("Done! !Translated"), Some(Command::Translated));
        assert_eq!(
            parse("!reference:\"Tok Pisin\""),
            Some(Command::Reference {
                argument: "tok pisin".to_string()
            })
        );
        assert_eq!(parse("thanks!"), Some(Command::ShortThanks));
        assert_eq!(parse("thanks but no"), None);
        assert_eq!(parse("thank you so much for all of this"), None);
        assert_eq!(parse("This is just a translation."), None);
        assert_eq!(parse("!id:"), None);
    }

    #[test]
    fn first_rule_wins() {
        assert!(matches!(
            parse("!id:ja and !translated"),
            Some(Command::Identify { .. })
        ));
        assert_eq!(parse("!claim then !translated"), Some(Command::Claim));
    }

    #[test]
    fn great_lion_croatian_translated() {
        let ajo = great_lion();
        let response = run(&ajo, "helper", "!translated Croatian");
        let updated = response.ajo.unwrap();
        assert_eq!(updated.status_of("hr"), Some(Status::Translated));
        assert_eq!(
            updated.flair().text,
            "Multiple Languages [FI✔, FR✔, HR✔, JA✔, NL✔, NO✔]"
        );
        assert!(updated.is_translated());
    }

    #[test]
    fn short_translated_reads_parent_comment() {
        let ajo = great_lion();
        let parent = ParentComment {
            id: "p1".to_string(),
            author: Some("croat".to_string()),
            body: "Croatian: the sign says no parking.".to_string(),
        };
        let context = CommandContext {
            parent: Some(&parent),
            ..context("helper", "!translated")
        };
        let response = dispatch(&ajo, &Command::Translated, &context);
        assert_eq!(
            response.ajo.unwrap().status_of("hr"),
            Some(Status::Translated)
        );
    }

    #[test]
    fn plain_text_does_nothing() {
        assert_eq!(parse("What a lovely statue."), None);
    }

    #[test]
    fn unrecognized_language_only_replies() {
        let ajo = fresh();
        let response = run(&ajo, "helper", "!id:klingonese");
        assert_eq!(response.ajo, None);
        assert!(response.reply.unwrap().contains("klingonese"));
        assert!(response.effects.is_empty());
    }

    #[test]
    fn multiple_with_nothing_left_is_unrecognized() {
        let ajo = fresh();
        let response = run(&ajo, "helper", "!id:en+english");
        assert_eq!(response.ajo, None);
        assert!(response.reply.unwrap().contains("en+english"));
        assert_eq!(ajo.flair().text, "Japanese");
    }

    #[test]
    fn multiple_names_skipped_parts() {
        let ajo = fresh();
        let response = run(&ajo, "helper", "!id:ko+klingonese");
        let updated = response.ajo.unwrap();
        assert_eq!(updated.flair().text, "Multiple Languages [KO]");
        assert!(response.reply.unwrap().contains("`klingonese`"));

        let stored = serde_json::to_string(&updated).unwrap();
        let back: Ajo = serde_json::from_str(&stored).unwrap();
        assert_eq!(back, updated);
    }

    #[test]
    fn identify_changes_language() {
        let ajo = fresh();
        let updated = run(&ajo, "helper", "!id:ko").ajo.unwrap();
        assert_eq!(updated.flair().css, "ko");
        assert_eq!(updated.flair().text, "Korean (Identified)");
        assert_eq!(updated.language_history(), ["Japanese", "Korean"]);

        let regional = run(&ajo, "helper", "!id:de-AT").ajo.unwrap();
        assert_eq!(regional.flair().text, "German {AT} (Identified)");

        let several = run(&ajo, "helper", "!id:ko+ja").ajo.unwrap();
        assert_eq!(several.flair().text, "Multiple Languages [JA, KO]");
    }

    #[test]
    fn advanced_identify() {
        let ajo = fresh();
        let script = run(&ajo, "helper", "!id:cyrl!").ajo.unwrap();
        assert_eq!(script.flair().css, "unknown");
        assert_eq!(script.flair().text, "Cyrillic (Script)");

        let bad_script = run(&ajo, "helper", "!id:qqqq!");
        assert_eq!(bad_script.ajo, None);
        assert!(bad_script.reply.unwrap().contains("qqqq"));

        let too_long = run(&ajo, "helper", "!id:abcde!");
        assert_eq!(too_long.ajo, None);
        assert!(too_long.reply.is_some());
    }

    #[test]
    fn set_is_for_moderators() {
        let ajo = fresh();
        assert_eq!(run(&ajo, "helper", "!set:ko"), Response::default());

        let mut translated = fresh();
        translated.set_status(Status::Translated, 5);
        let context = CommandContext {
            is_moderator: true,
            ..context("moddy", "!set:ko!")
        };
        let command = parse("!set:ko!").unwrap();
        let updated = dispatch(&translated, &command, &context).ajo.unwrap();
        assert_eq!(updated.status(), Some(Status::Untranslated));
        assert!(!updated.is_identified);
        assert_eq!(updated.flair().text, "Korean");
    }

    #[test]
    fn reapplying_is_a_no_op() {
        let ajo = fresh();
        let doublechecked = run(&ajo, "helper", "!doublecheck").ajo.unwrap();
        assert_eq!(doublechecked.status(), Some(Status::Doublecheck));
        assert_eq!(run(&doublechecked, "helper", "!doublecheck"), Response::default());

        let translated = bronze_statue();
        assert_eq!(run(&translated, "helper", "!translated"), Response::default());
        assert_eq!(run(&translated, "helper", "!claim"), Response::default());
        assert_eq!(run(&translated, "helper", "!doublecheck"), Response::default());
        assert_eq!(run(&translated, "helper", "!missing"), Response::default());
    }

    #[test]
    fn translated_messages_the_author_once() {
        let ajo = fresh();
        let response = run(&ajo, "helper", "It says 'pray here'. !translated");
        let updated = response.ajo.unwrap();
        assert!(updated.author_messaged);
        assert!(matches!(
            response.effects.as_slice(),
            [Effect::MessageUser { to, .. }] if to == "asker"
        ));

        let mut back = updated.clone();
        back.set_status(Status::Doublecheck, 10);
        let again = run(&back, "helper2", "!translated");
        assert!(again.effects.is_empty());
    }

    #[test]
    fn claims() {
        let ajo = fresh();
        let response = run(&ajo, "helper", "!claim");
        let claimed = response.ajo.unwrap();
        assert_eq!(claimed.status(), Some(Status::InProgress));
        assert!(response.reply.unwrap().contains("u/helper"));
        assert_eq!(claimed.flair().text, "In Progress [JA]");

        let other = run(&claimed, "someone_else", "!claim");
        assert_eq!(other.ajo, None);
        assert!(other.reply.unwrap().contains("u/helper"));

        assert_eq!(run(&claimed, "helper", "!claim"), Response::default());

        let mut later = context("someone_else", "!claim");
        later.now += later.claim_expiry_secs;
        let taken_over = dispatch(&claimed, &Command::Claim, &later).ajo.unwrap();
        assert_eq!(taken_over.claim().unwrap().username, "someone_else");

        assert_eq!(run(&great_lion(), "helper", "!claim"), Response::default());
    }

    #[test]
    fn missing_messages_the_author() {
        let response = run(&fresh(), "helper", "!missing");
        assert_eq!(response.ajo.unwrap().status(), Some(Status::Missing));
        assert!(matches!(
            response.effects.as_slice(),
            [Effect::MessageUser { to, .. }] if to == "asker"
        ));
    }

    #[test]
    fn reset_and_long_need_rights() {
        let mut ajo = fresh();
        ajo.set_status(Status::Translated, 5);

        assert_eq!(run(&ajo, "helper", "!reset"), Response::default());
        let reset = run(&ajo, "asker", "!reset").ajo.unwrap();
        assert_eq!(reset.status(), Some(Status::Untranslated));
        assert!(reset.time_delta().is_empty());

        assert_eq!(run(&ajo, "asker", "!long"), Response::default());
        let mut moderator = context("moddy", "!long");
        moderator.is_moderator = true;
        let long = dispatch(&ajo, &Command::Long, &moderator).ajo.unwrap();
        assert!(long.is_long);
        let short = dispatch(&long, &Command::Long, &moderator).ajo.unwrap();
        assert!(!short.is_long);
    }

    #[test]
    fn delete_only_bot_crossposts() {
        let ajo = fresh();
        assert_eq!(run(&ajo, "asker", "!delete"), Response::default());

        let mut crosspost = fresh();
        crosspost.is_bot_crosspost = true;
        assert_eq!(run(&crosspost, "helper", "!delete"), Response::default());
        assert_eq!(
            run(&crosspost, "asker", "!delete").effects,
            vec![Effect::RemovePost]
        );
    }

    #[test]
    fn reference_cards() {
        let ajo = fresh();
        let card = run(&ajo, "helper", "!reference:\"tok pisin\"");
        assert_eq!(card.ajo, None);
        assert!(card.reply.unwrap().contains("`tpi`"));

        let unknown = run(&ajo, "helper", "!reference:qqq");
        assert!(unknown.reply.unwrap().contains("qqq"));
    }

    #[test]
    fn short_thanks_from_the_op() {
        let ajo = fresh();
        let updated = run(&ajo, "asker", "Thanks!").ajo.unwrap();
        assert_eq!(updated.status(), Some(Status::Translated));

        assert_eq!(run(&ajo, "helper", "Thanks!"), Response::default());

        let identified = run(&ajo, "helper", "!id:ko").ajo.unwrap();
        assert_eq!(run(&identified, "asker", "Thanks!"), Response::default());
    }
}
