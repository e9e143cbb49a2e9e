//! The streamer watches comments all over the site for people asking for
//! something to be brought to the subreddit, and crossposts it.

use std::{future::Future, sync::Arc, sync::LazyLock, time::Duration};

use regex::Regex;
use ziwen_commons::useful_methods::with_retries;

use crate::{
    config::Config,
    database::Database,
    languages::{self, Language},
    platform::{Comment, Platform, Post},
    responses, Error,
};

/// Longest title the site takes.
const TITLE_LIMIT: usize = 300;

/// Things that look like `r/translate` but aren't.
const NOT_THE_SUBREDDIT: &[&str] = &[
    ".fr", ".ar", ".cr", ".gr", ".ir", ".nr", ".tr", ".kr", "r/translater",
];

const SEND_TRIES: u8 = 3;
const SEND_RETRY_DELAY: Duration = Duration::from_secs(2);

/// `!translate` or `!translator`, optionally with `:language`. Needs
/// whitespace before it so spoiler syntax (`>!translate`) doesn't count.
static CROSSPOST_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)!translat(?:e|or)(?::([^\s]+))?\^?(?:\s|$)").expect("valid regex")
});
static WRONG_SUBREDDIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s/])r/translate\b").expect("valid regex"));
static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"));

/// What to do about one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamAction {
    /// Crosspost the post as a request for `language`. `reverse` means
    /// from English rather than to it.
    Crosspost { language: Language, reverse: bool },
    /// Asked for a crosspost of something already in English.
    EnglishOnly,
    /// Linked the wrong subreddit.
    WrongSubreddit,
    Ignore,
}

/// Decide what a site-wide comment asks for.
#[must_use]
pub fn classify(comment: &Comment, post: &Post, config: &Config) -> StreamAction {
    let Some(author) = comment.author.as_deref() else {
        return StreamAction::Ignore;
    };
    let streamer = &config.streamer;
    if config.is_self(author)
        || post.subreddit.eq_ignore_ascii_case(&config.subreddit)
        || streamer.is_excluded(author, &post.subreddit)
    {
        return StreamAction::Ignore;
    }

    let body = comment.body.to_lowercase();

    if let Some(captures) = CROSSPOST_COMMAND.captures(&body) {
        let op = post.author.as_deref().unwrap_or_default();
        if post.author.is_none()
            || streamer.is_blacklisted(author, &post.subreddit)
            || streamer.is_blacklisted(op, &post.subreddit)
        {
            log::info!("Not crossposting {}: blacklisted or deleted.", post.id);
            return StreamAction::Ignore;
        }

        let (language, reverse) = match captures.get(1) {
            Some(argument) => {
                let argument = argument.as_str();
                let reverse = argument.contains('<');
                let cleaned: String = argument
                    .chars()
                    .filter(|x| !matches!(x, '<' | '^' | '`' | '.' | ',' | ':'))
                    .collect();
                let language = languages::convert(&cleaned)
                    .map_or_else(Language::unknown, |x| x.language);
                (language, reverse)
            }
            None => {
                let language = languages::mentioned_languages(&post.title)
                    .into_iter()
                    .find(|x| !x.is_english())
                    .unwrap_or_else(Language::unknown);
                (language, false)
            }
        };

        if language.is_english() {
            return StreamAction::EnglishOnly;
        }
        return StreamAction::Crosspost { language, reverse };
    }

    if WRONG_SUBREDDIT.is_match(&body)
        && !body.contains("r/translator")
        && !NOT_THE_SUBREDDIT.iter().any(|x| body.contains(x))
    {
        return StreamAction::WrongSubreddit;
    }

    StreamAction::Ignore
}

/// Title for the crosspost of `post`.
#[must_use]
pub fn crosspost_title(post: &Post, language: &Language, reverse: bool) -> String {
    let bare = TITLE_TAG.replace_all(&post.title, "");
    let bare = bare.trim();
    let title = match reverse {
        false => format!("[{language} > English] {bare}"),
        true => format!("[English > {language}] {bare}"),
    };
    if title.chars().count() < TITLE_LIMIT {
        return title;
    }
    let mut title: String = title.chars().take(TITLE_LIMIT - 4).collect();
    title.push_str("...");
    title
}

/// Tally of one streamer cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub crossposted: usize,
    pub replied: usize,
    pub ignored: usize,
    pub failures: usize,
}

enum Handled {
    Crossposted,
    /// Includes pointing at an earlier crosspost.
    Replied,
    Ignored,
}

pub struct Streamer<P> {
    pub platform: Arc<P>,
    pub database: Arc<Database>,
    pub config: Arc<Config>,
}

impl<P: Platform> Streamer<P> {
    pub async fn stream_once(&self) -> Result<StreamReport, Error> {
        let mut report = StreamReport::default();
        for comment in self.platform.site_comments().await? {
            match self.bounded(self.handle(&comment)).await {
                Ok(Handled::Ignored) => report.ignored += 1,
                Ok(Handled::Crossposted) => report.crossposted += 1,
                Ok(Handled::Replied) => report.replied += 1,
                Err(e) if e.is_fatal_for_cycle() => return Err(e),
                Err(e) => {
                    log::warn!("Failed to handle site comment {}: {e}", comment.id);
                    report.failures += 1;
                }
            }
        }
        Ok(report)
    }

    async fn bounded<T>(&self, work: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
        let limit = self.config.handler_timeout();
        tokio::time::timeout(limit, work)
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    async fn handle(&self, comment: &Comment) -> Result<Handled, Error> {
        let post = match &comment.post {
            Some(post) => post.clone(),
            None => match self.platform.post(&comment.post_id).await? {
                Some(post) => post,
                None => return Ok(Handled::Ignored),
            },
        };
        let action = classify(comment, &post, &self.config);
        let reply_to = format!("t1_{}", comment.id);

        match &action {
            StreamAction::Crosspost { language, reverse } => {
                let Some(mut link) = post.link() else {
                    return Ok(Handled::Ignored);
                };
                link.set_query(None);
                link.set_fragment(None);

                if let Some(existing) = self.database.crosspost_for(link.as_str()).await? {
                    log::info!("{} was already crossposted as {existing}", post.id);
                    let existing = format!("{}/comments/{existing}/", self.subreddit_link());
                    self.reply(&reply_to, &responses::already_crossposted(&existing))
                        .await?;
                    return Ok(Handled::Replied);
                }

                let title = crosspost_title(&post, language, *reverse);
                let new_post = self
                    .platform
                    .crosspost(&post, &self.config.subreddit, &title)
                    .await?;
                self.database
                    .record_crosspost(link.as_str(), &new_post.id)
                    .await?;
                log::info!(
                    "Crossposted {} from r/{} as {} for u/{}",
                    post.id,
                    post.subreddit,
                    new_post.id,
                    comment.author.as_deref().unwrap_or_default()
                );

                let note = responses::crosspost_note(
                    post.author.as_deref().unwrap_or_default(),
                    &post.subreddit,
                    comment.link().map(String::from).unwrap_or_default().as_str(),
                    comment.author.as_deref().unwrap_or_default(),
                );
                self.reply(&format!("t3_{}", new_post.id), &note).await?;
                let new_link = new_post.link().map(String::from).unwrap_or_default();
                self.reply(
                    &reply_to,
                    &responses::crosspost_confirmation(&language.name, &new_link),
                )
                .await?;
                Ok(Handled::Crossposted)
            }
            StreamAction::EnglishOnly => {
                self.reply(&reply_to, &responses::english_only()).await?;
                Ok(Handled::Replied)
            }
            StreamAction::WrongSubreddit => {
                log::info!("r/translate mentioned in {}", comment.id);
                self.reply(&reply_to, &responses::wrong_subreddit()).await?;
                Ok(Handled::Replied)
            }
            StreamAction::Ignore => Ok(Handled::Ignored),
        }
    }

    fn subreddit_link(&self) -> String {
        format!("{}/r/{}", crate::platform::SITE_ROOT, self.config.subreddit)
    }

    async fn reply(&self, parent_id: &str, text: &str) -> Result<(), Error> {
        with_retries("reply", SEND_TRIES, SEND_RETRY_DELAY, || {
            self.platform.reply(parent_id, text)
        })
        .await?;
        Ok(())
    }
}

/// Watch the site forever, until the database goes away.
pub async fn streamer_spinloop<P: Platform>(
    platform: Arc<P>,
    database: std::sync::Weak<Database>,
    config: Arc<Config>,
) {
    loop {
        let Some(database) = database.upgrade() else {
            return;
        };
        let streamer = Streamer {
            platform: platform.clone(),
            database,
            config: config.clone(),
        };

        match streamer.stream_once().await {
            Ok(report) => log::debug!("Stream cycle done: {report:?}"),
            Err(e) => log::error!("Stream cycle aborted: {e}"),
        }

        drop(streamer);
        tokio::time::sleep(config.streamer.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::platform::{memory::MemoryPlatform, OutboxAction};

    fn post() -> Post {
        Post {
            id: "orig".to_string(),
            title: "Sign I saw in Kyoto, is it Japanese?".to_string(),
            author: Some("traveller".to_string()),
            created_utc: 1_600_000_000,
            permalink: "/r/japanlife/comments/orig/sign/".to_string(),
            subreddit: "japanlife".to_string(),
            ..Default::default()
        }
    }

    fn comment(author: &str, body: &str) -> Comment {
        Comment {
            id: "c1".to_string(),
            post_id: "orig".to_string(),
            author: Some(author.to_string()),
            body: body.to_string(),
            subreddit: "japanlife".to_string(),
            permalink: "/r/japanlife/comments/orig/sign/c1/".to_string(),
            post: Some(post()),
            ..Default::default()
        }
    }

    fn classify_as(author: &str, body: &str) -> StreamAction {
        classify(&comment(author, body), &post(), &Config::default())
    }

    fn language(code: &str) -> Language {
        languages::convert(code).unwrap().language
    }

    #[test]
    fn crosspost_requests() {
        assert_eq!(
            classify_as("curious", "No idea. !translate"),
            StreamAction::Crosspost {
                language: language("ja"),
                reverse: false
            }
        );
        assert_eq!(
            classify_as("curious", "!translator:ko"),
            StreamAction::Crosspost {
                language: language("ko"),
                reverse: false
            }
        );
        assert_eq!(
            classify_as("curious", "!translate:<es please"),
            StreamAction::Crosspost {
                language: language("es"),
                reverse: true
            }
        );
        assert_eq!(
            classify_as("curious", "!translate:qqqq"),
            StreamAction::Crosspost {
                language: Language::unknown(),
                reverse: false
            }
        );
        assert_eq!(classify_as("curious", "!translate:en"), StreamAction::EnglishOnly);
    }

    #[test]
    fn lookalikes_are_ignored() {
        assert_eq!(classify_as("curious", "!translated"), StreamAction::Ignore);
        assert_eq!(classify_as("curious", ">!translate this!<"), StreamAction::Ignore);
        assert_eq!(classify_as("curious", "!translateme"), StreamAction::Ignore);
        assert_eq!(classify_as("AutoModerator", "!translate"), StreamAction::Ignore);
        assert_eq!(classify_as("translator-BOT", "!translate"), StreamAction::Ignore);
    }

    #[test]
    fn wrong_subreddit() {
        assert_eq!(
            classify_as("curious", "Try r/translate for that"),
            StreamAction::WrongSubreddit
        );
        assert_eq!(
            classify_as("curious", "Try r/translator for that"),
            StreamAction::Ignore
        );
        assert_eq!(
            classify_as("curious", "see google.fr/translate"),
            StreamAction::Ignore
        );
    }

    #[test]
    fn blacklists_and_home() {
        let mut config = Config::default();
        config.streamer.blacklisted_users = vec!["Traveller".to_string()];
        assert_eq!(
            classify(&comment("curious", "!translate"), &post(), &config),
            StreamAction::Ignore
        );

        let home = Post {
            subreddit: "translator".to_string(),
            ..post()
        };
        assert_eq!(
            classify(&comment("curious", "!translate"), &home, &Config::default()),
            StreamAction::Ignore
        );
    }

    #[test]
    fn titles() {
        let tagged = Post {
            title: "[OC] Grandma's recipe".to_string(),
            ..post()
        };
        assert_eq!(
            crosspost_title(&tagged, &language("ko"), false),
            "[Korean > English] Grandma's recipe"
        );
        assert_eq!(
            crosspost_title(&tagged, &language("ko"), true),
            "[English > Korean] Grandma's recipe"
        );

        let long = Post {
            title: "a".repeat(400),
            ..post()
        };
        let title = crosspost_title(&long, &language("ko"), false);
        assert_eq!(title.chars().count(), TITLE_LIMIT - 1);
        assert!(title.ends_with("..."));
    }

    #[tokio::test]
    async fn crossposts_once() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::open(&dir.path().join("streamer.sqlite"))
            .await
            .unwrap();
        let streamer = Streamer {
            platform: Arc::new(MemoryPlatform::default()),
            database: Arc::new(database),
            config: Arc::new(Config::default()),
        };

        streamer
            .platform
            .site_comments
            .lock()
            .unwrap()
            .push(comment("curious", "!translate"));
        let report = streamer.stream_once().await.unwrap();
        assert_eq!(report.crossposted, 1);

        let sent = streamer.platform.sent();
        assert!(matches!(
            &sent[0],
            OutboxAction::Crosspost { original_id, subreddit, title, .. }
                if original_id == "orig"
                    && subreddit == "translator"
                    && title == "[Japanese > English] Sign I saw in Kyoto, is it Japanese?"
        ));
        let OutboxAction::Crosspost { post_id, .. } = &sent[0] else {
            unreachable!()
        };
        assert!(sent.iter().any(|x| matches!(
            x,
            OutboxAction::Reply { parent_id, .. } if *parent_id == format!("t3_{post_id}")
        )));
        assert!(sent.iter().any(|x| matches!(
            x,
            OutboxAction::Reply { parent_id, .. } if parent_id == "t1_c1"
        )));
        assert_eq!(
            streamer
                .database
                .crosspost_for("https://www.reddit.com/r/japanlife/comments/orig/sign/")
                .await
                .unwrap()
                .as_deref(),
            Some(post_id.as_str())
        );

        streamer
            .platform
            .site_comments
            .lock()
            .unwrap()
            .push(comment("someone_else", "!translate:ja"));
        let report = streamer.stream_once().await.unwrap();
        assert_eq!(report.crossposted, 0);
        assert_eq!(report.replied, 1);
    }
}
