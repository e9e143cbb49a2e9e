//! Points for helping out.
//!
//! Points are worked out when a comment is processed, from the comment
//! alone, rather than tallied up later.

use crate::{
    ajo::Ajo,
    commands::THANKS_KEYWORDS,
    config::Config,
    database::{Database, PointsEntry},
    languages, Error,
};

/// Words that turn a `!translated` into agreeing with someone else's translation.
const VERIFYING_KEYWORDS: &[&str] = &[
    "concur", "agree", "verify", "verified", "approve", "is correct", "is right", "well done",
    "well-done", "good job", "marking", "good work",
];

/// Fixed bonuses for using commands.
const KEYWORD_POINTS: &[(&str, i64)] = &[
    ("!identify:", 3),
    ("!id:", 3),
    ("`", 2),
    ("!missing", 2),
    ("!claim", 1),
    ("!page:", 1),
    ("!search:", 1),
    ("!reference:", 1),
];

const UNKNOWN_MULTIPLIER: i64 = 4;

/// Accounts whose comments never earn anything.
const IGNORED_AUTHORS: &[&str] = &["AutoModerator"];

/// Points going to someone other than the commenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub username: String,
    pub points: i64,
    /// Given for an OP's thank-you. Only given once per amount and post.
    pub for_thanks: bool,
}

/// What one comment earned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Award {
    pub points: i64,
    pub credit: Option<Credit>,
    /// Who to add to the request's translators.
    pub translator: Option<String>,
}

impl Award {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points == 0 && self.credit.as_ref().map_or(true, |x| x.points == 0)
    }
}

/// A comment as the tabulator sees it.
#[derive(Debug, Clone, Copy)]
pub struct ScoredComment<'a> {
    pub author: &'a str,
    pub body: &'a str,
    pub post_author: &'a str,
    /// Author of the comment this one replies to. `None` for top-level comments.
    pub parent_author: Option<&'a str>,
}

/// The language the points for a comment on `ajo` are worth, by name.
/// `None` if the comment earns nothing, like a comment on a multiple
/// request that doesn't name a language.
#[must_use]
pub fn language_for(ajo: &Ajo, body: &str) -> Option<String> {
    match ajo.single() {
        Some(single) if single.language.code_3 == "art" => None,
        Some(single) => Some(single.language.name.clone()),
        None => languages::mentioned_languages(body)
            .into_iter()
            .next()
            .map(|x| x.name),
    }
}

#[must_use]
pub fn multiplier(config: &Config, language_name: &str) -> i64 {
    match language_name {
        "Unknown" => UNKNOWN_MULTIPLIER,
        name => config.points_multiplier(name),
    }
}

/// Work out what a comment earns, given how much its language is worth.
#[must_use]
pub fn tabulate(comment: &ScoredComment, multiplier: i64) -> Award {
    if IGNORED_AUTHORS.contains(&comment.author) {
        return Award::default();
    }

    let body = comment.body.trim().to_lowercase();
    let length = body.chars().count();
    let is_op = comment.author.eq_ignore_ascii_case(comment.post_author);
    let has_thanks = THANKS_KEYWORDS.iter().any(|x| body.contains(x));

    // OP chatter.
    if is_op && !has_thanks && length < 20 {
        return Award::default();
    }

    let translated = body.contains("!translated");
    let full_award = 1 + multiplier;
    let mut award = Award::default();
    let mut credited = 0;
    let mut for_thanks = false;

    if body.contains('+') && length < 3 {
        credited += 3;
    }

    if (length > 13 && !is_op && translated) || body.contains("!doublecheck") {
        if length < 60 && translated && VERIFYING_KEYWORDS.iter().any(|x| body.contains(x)) {
            if comment.parent_author.is_some() {
                credited += full_award;
                award.points += 1;
            }
        } else {
            award.translator = Some(comment.author.to_string());
            award.points += full_award;
        }
    } else if length < 13 && translated {
        if let Some(parent) = comment.parent_author {
            credited += full_award;
            if !parent.eq_ignore_ascii_case(comment.author) {
                award.points += 1;
            }
        }
        award.points += 1;
    } else if length > 13 && translated && is_op {
        if comment
            .parent_author
            .is_some_and(|x| !x.eq_ignore_ascii_case(comment.post_author))
        {
            credited += full_award;
        }
    }

    if length > 120 && !is_op {
        award.points += 1 + quarter_rounded(multiplier);
    }

    for (keyword, points) in KEYWORD_POINTS {
        if body.contains(keyword) {
            award.points += points;
        }
    }

    if has_thanks && is_op && length < 20 && comment.parent_author.is_some() {
        credited += full_award;
        for_thanks = true;
    }

    if let Some(parent) = comment.parent_author.filter(|_| credited != 0) {
        award.translator = Some(parent.to_string());
        award.credit = Some(Credit {
            username: parent.to_string(),
            points: credited,
            for_thanks,
        });
    }
    award
}

/// A quarter of `value`, with halves rounded to even.
fn quarter_rounded(value: i64) -> i64 {
    let (quotient, remainder) = (value.div_euclid(4), value.rem_euclid(4));
    match remainder {
        0 | 1 => quotient,
        2 if quotient % 2 == 0 => quotient,
        _ => quotient + 1,
    }
}

/// Write an award into the points ledger. Returns what was written.
pub async fn record(
    database: &Database,
    award: &Award,
    commenter: &str,
    comment_id: &str,
    post_id: &str,
    month: &str,
) -> Result<Vec<PointsEntry>, Error> {
    let mut entries = Vec::new();
    if award.points != 0 {
        entries.push(PointsEntry {
            month: month.to_string(),
            comment_id: comment_id.to_string(),
            username: commenter.to_string(),
            points: award.points,
            post_id: post_id.to_string(),
        });
    }

    if let Some(credit) = award.credit.as_ref().filter(|x| x.points != 0) {
        let repeated = credit.for_thanks
            && database
                .has_points_entry(&credit.username, post_id, credit.points)
                .await?;
        if repeated {
            log::debug!("u/{} was already thanked on {post_id}", credit.username);
        } else {
            entries.push(PointsEntry {
                month: month.to_string(),
                comment_id: comment_id.to_string(),
                username: credit.username.clone(),
                points: credit.points,
                post_id: post_id.to_string(),
            });
        }
    }

    for entry in &entries {
        database.add_points(entry).await?;
        log::debug!("Points: {entry:?}");
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::ajo::fixtures::great_lion;

    fn comment<'a>(author: &'a str, body: &'a str, parent: Option<&'a str>) -> ScoredComment<'a> {
        ScoredComment {
            author,
            body,
            post_author: "asker",
            parent_author: parent,
        }
    }

    #[test]
    fn real_translation() {
        let award = tabulate(
            &comment("helper", "It says 'pray for rain'. !translated", None),
            3,
        );
        assert_eq!(award.points, 4);
        assert_eq!(award.credit, None);
        assert_eq!(award.translator.as_deref(), Some("helper"));
    }

    #[test]
    fn cleanup_translated_credits_the_parent() {
        let award = tabulate(&comment("cleaner", "!translated", Some("helper")), 3);
        assert_eq!(award.points, 2);
        assert_eq!(
            award.credit,
            Some(Credit {
                username: "helper".to_string(),
                points: 4,
                for_thanks: false,
            })
        );
        assert_eq!(award.translator.as_deref(), Some("helper"));

        let own = tabulate(&comment("helper", "!translated", Some("helper")), 3);
        assert_eq!(own.points, 1);
    }

    #[test]
    fn verification() {
        let award = tabulate(
            &comment("checker", "I agree with this. !translated", Some("helper")),
            1,
        );
        assert_eq!(award.points, 1);
        assert_eq!(award.credit.unwrap().points, 2);
    }

    #[test]
    fn long_comments_and_keywords() {
        let long = "a".repeat(130);
        assert_eq!(tabulate(&comment("helper", &long, None), 4).points, 2);
        assert_eq!(tabulate(&comment("helper", &long, None), 2).points, 1);
        assert_eq!(tabulate(&comment("helper", &long, None), 6).points, 3);
        assert_eq!(tabulate(&comment("helper", &long, None), 10).points, 3);
        assert_eq!(tabulate(&comment("helper", &long, None), 14).points, 5);
        assert_eq!(tabulate(&comment("helper", "!id:ko", None), 4).points, 3);
        assert_eq!(tabulate(&comment("helper", "!claim", None), 4).points, 1);
        assert_eq!(tabulate(&comment("helper", "`字`", None), 4).points, 2);
    }

    #[test]
    fn op_thanks() {
        let award = tabulate(&comment("asker", "thank you!", Some("helper")), 2);
        assert_eq!(award.points, 0);
        assert_eq!(
            award.credit,
            Some(Credit {
                username: "helper".to_string(),
                points: 3,
                for_thanks: true,
            })
        );

        assert!(tabulate(&comment("asker", "ok cool", Some("helper")), 2).is_empty());
        assert!(tabulate(&comment("AutoModerator", "!translated", Some("helper")), 2).is_empty());
    }

    #[test]
    fn languages_of_multiple_requests() {
        let ajo = great_lion();
        assert_eq!(
            language_for(&ajo, "Croatian: ne diraj").as_deref(),
            Some("Croatian")
        );
        assert_eq!(language_for(&ajo, "no language here"), None);
        assert_eq!(multiplier(&Config::default(), "Unknown"), UNKNOWN_MULTIPLIER);
    }

    #[tokio::test]
    async fn thanks_are_only_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(&dir.path().join("points.sqlite"))
            .await
            .unwrap();
        let award = tabulate(&comment("asker", "thanks!", Some("helper")), 2);

        let first = record(&database, &award, "asker", "c1", "p1", "2024-05")
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        let second = record(&database, &award, "asker", "c2", "p1", "2024-05")
            .await
            .unwrap();
        assert!(second.is_empty());
        assert_eq!(database.points_for_user("helper").await.unwrap(), 3);
    }
}
