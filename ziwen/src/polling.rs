//! The main loop: watch the subreddit, track requests, act on commands.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use ziwen_commons::useful_methods::{split_for_reddit, with_retries};

use crate::{
    ajo::Ajo,
    commands::{self, CommandContext, Effect, Response},
    config::Config,
    database::{Database, Tracked},
    platform::{Comment, Platform, Post},
    points::{self, Award, ScoredComment},
    Error,
};

/// Tries for each outgoing action before giving up on it.
const SEND_TRIES: u8 = 3;
const SEND_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Cycles a failing comment is tried in before it's dropped. Cycles cut
/// short by a fatal error don't count.
const COMMENT_ATTEMPTS: u8 = 3;

/// Tally of one polling cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub posts_tracked: usize,
    pub comments_handled: usize,
    pub comments_skipped: usize,
    pub claims_expired: usize,
    pub failures: usize,
}

enum Outcome {
    Handled,
    Skipped,
}

/// A comment that still has to be handled, and how often it failed.
#[derive(Debug, Clone)]
struct Pending {
    comment: Comment,
    failures: u8,
}

/// Everything the loop works with.
pub struct Ziwen<P> {
    pub platform: Arc<P>,
    pub database: Arc<Database>,
    pub config: Arc<Config>,
    /// Comments carried over from earlier cycles. The site only hands
    /// each comment out once.
    backlog: Arc<Mutex<Vec<Pending>>>,
}

impl<P: Platform> Ziwen<P> {
    #[must_use]
    pub fn new(platform: Arc<P>, database: Arc<Database>, config: Arc<Config>) -> Ziwen<P> {
        Ziwen {
            platform,
            database,
            config,
            backlog: Arc::default(),
        }
    }

    /// Run one cycle. Failures of single items are logged and counted;
    /// an error is only returned if the cycle couldn't go on.
    pub async fn poll_once(&self) -> Result<CycleReport, Error> {
        let mut report = CycleReport::default();

        for post in self.platform.new_posts().await? {
            match self.bounded(self.handle_post(&post)).await {
                Ok(true) => report.posts_tracked += 1,
                Ok(false) => (),
                Err(e) if e.is_fatal_for_cycle() => return Err(e),
                Err(e) => {
                    log::warn!("Failed to handle post {}: {e}", post.id);
                    report.failures += 1;
                }
            }
        }

        let mut pending = std::mem::take(&mut *self.backlog.lock().await);
        match self.platform.new_comments().await {
            Ok(comments) => pending.extend(comments.into_iter().map(|comment| Pending {
                comment,
                failures: 0,
            })),
            Err(e) => {
                self.backlog.lock().await.extend(pending);
                return Err(e.into());
            }
        }

        let mut retry = Vec::new();
        let mut queue = pending.into_iter();
        while let Some(mut item) = queue.next() {
            match self.bounded(self.handle_comment(&item.comment)).await {
                Ok(Outcome::Handled) => report.comments_handled += 1,
                Ok(Outcome::Skipped) => report.comments_skipped += 1,
                Err(e) if e.is_fatal_for_cycle() => {
                    let mut backlog = self.backlog.lock().await;
                    backlog.extend(retry);
                    backlog.push(item);
                    backlog.extend(queue);
                    return Err(e);
                }
                Err(e) => {
                    report.failures += 1;
                    item.failures += 1;
                    if item.failures >= COMMENT_ATTEMPTS {
                        log::error!("Giving up on comment {}: {e}", item.comment.id);
                    } else {
                        log::warn!("Failed to handle comment {}: {e}", item.comment.id);
                        retry.push(item);
                    }
                }
            }
        }
        self.backlog.lock().await.extend(retry);

        report.claims_expired = self.expire_claims().await?;
        Ok(report)
    }

    async fn bounded<T>(&self, work: impl Future<Output = Result<T, Error>>) -> Result<T, Error> {
        let limit = self.config.handler_timeout();
        tokio::time::timeout(limit, work)
            .await
            .map_err(|_| Error::Timeout(limit))?
    }

    /// Start tracking a new post. Returns `false` if it was already tracked
    /// or isn't a request.
    async fn handle_post(&self, post: &Post) -> Result<bool, Error> {
        if !post.is_request() {
            return Ok(false);
        }
        let (ajo, changed) = self.update(post, |_| ()).await?.0;
        if changed {
            log::info!("Tracking {}: {}", post.id, ajo.title_original);
            self.push_flair(&ajo).await;
        }
        Ok(changed)
    }

    /// A comment counts as processed once its record is stored. Anything
    /// failing before that leaves it to be tried again, anything after
    /// that (points, replies, messages) happens at most once.
    async fn handle_comment(&self, comment: &Comment) -> Result<Outcome, Error> {
        let Some(author) = comment.author.as_deref() else {
            return Ok(Outcome::Skipped);
        };
        if self.config.is_self(author) {
            return Ok(Outcome::Skipped);
        }
        if self.database.is_comment_processed(&comment.id).await? {
            log::debug!("Comment {} was already processed", comment.id);
            return Ok(Outcome::Skipped);
        }

        let post = match &comment.post {
            Some(post) => post.clone(),
            None => self
                .platform
                .post(&comment.post_id)
                .await?
                .ok_or_else(|| Error::NotFound(comment.post_id.clone()))?,
        };
        if !post.is_request() {
            self.database.mark_comment_processed(&comment.id).await?;
            return Ok(Outcome::Skipped);
        }

        let now = chrono::Utc::now().timestamp();
        let permalink = post.link().map(String::from).unwrap_or_default();
        let context = CommandContext {
            author,
            is_moderator: self.config.is_moderator(author),
            body: &comment.body,
            parent: comment.parent.as_ref(),
            permalink: &permalink,
            now,
            claim_expiry_secs: self.config.claim_expiry_secs,
        };
        let command = commands::parse(&comment.body);
        if let Some(command) = &command {
            log::info!("{command:?} from u/{author} on {}", post.id);
        }

        let award = self.score(comment, author, &post).await?;

        let ((ajo, changed), response) = self
            .update(&post, |ajo| {
                if let Some(translator) = &award.translator {
                    ajo.add_translator(translator);
                }
                let Some(command) = &command else {
                    return Response::default();
                };
                let mut response = commands::dispatch(ajo, command, &context);
                if let Some(updated) = response.ajo.take() {
                    *ajo = updated;
                }
                response
            })
            .await?;

        if !self.database.mark_comment_processed(&comment.id).await? {
            log::debug!("Comment {} was processed meanwhile", comment.id);
            return Ok(Outcome::Skipped);
        }
        if !award.is_empty() {
            let month = chrono::Utc::now().format("%Y-%m").to_string();
            points::record(&self.database, &award, author, &comment.id, &post.id, &month).await?;
        }

        if changed {
            self.push_flair(&ajo).await;
        }
        if let Some(reply) = &response.reply {
            self.reply(&format!("t1_{}", comment.id), reply).await;
        }
        for effect in &response.effects {
            self.perform(&post, effect).await;
        }
        Ok(Outcome::Handled)
    }

    /// Work out the points a comment earns, against the record as it is now.
    async fn score(&self, comment: &Comment, author: &str, post: &Post) -> Result<Award, Error> {
        let ajo = match self.database.get(&post.id).await {
            Ok(Some(tracked)) => tracked.into_ajo(),
            Ok(None) => Ajo::from_post(post, &self.config.username),
            // Gets rebuilt from the post when the command is applied.
            Err(Error::MalformedRecord { .. }) => Ajo::from_post(post, &self.config.username),
            Err(e) => return Err(e),
        };
        let Some(language) = points::language_for(&ajo, &comment.body) else {
            return Ok(Award::default());
        };
        let multiplier = points::multiplier(&self.config, &language);
        Ok(points::tabulate(
            &ScoredComment {
                author,
                body: &comment.body,
                post_author: &ajo.author,
                parent_author: comment.parent.as_ref().and_then(|x| x.author.as_deref()),
            },
            multiplier,
        ))
    }

    /// Load the record of `post` (creating it if needed), change it and store it.
    /// If someone else stored it in between, reload and change again, once.
    /// Returns the record and whether it was written.
    async fn update<T>(
        &self,
        post: &Post,
        mut change: impl FnMut(&mut Ajo) -> T,
    ) -> Result<((Ajo, bool), T), Error> {
        let mut retried = false;
        loop {
            let (mut tracked, created) = self.load_or_track(post).await?;
            let before = tracked.ajo().clone();
            let output = change(tracked.ajo_mut());
            if !created && *tracked.ajo() == before {
                return Ok(((tracked.into_ajo(), false), output));
            }
            match self.database.put_checked(&mut tracked).await {
                Ok(()) => return Ok(((tracked.into_ajo(), true), output)),
                Err(Error::Conflict(id)) if !retried => {
                    log::warn!("Record {id} changed while handling it, retrying.");
                    retried = true;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn load_or_track(&self, post: &Post) -> Result<(Tracked, bool), Error> {
        match self.database.get(&post.id).await {
            Ok(Some(tracked)) => Ok((tracked, false)),
            Ok(None) => Ok((
                Tracked::new(Ajo::from_post(post, &self.config.username)),
                true,
            )),
            Err(Error::MalformedRecord { id, source }) => {
                log::error!("Record {id} is malformed ({source}), quarantining and rebuilding it.");
                self.database.quarantine(&id).await?;
                Ok((
                    Tracked::new(Ajo::from_post(post, &self.config.username)),
                    true,
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// Put lapsed claims back to untranslated. Returns how many there were.
    async fn expire_claims(&self) -> Result<usize, Error> {
        let now = chrono::Utc::now().timestamp();
        let mut expired = 0;
        for id in self.database.in_progress_ids().await? {
            let mut tracked = match self.database.load(&id).await {
                Ok(tracked) => tracked,
                Err(e) => {
                    log::warn!("Could not check the claim on {id}: {e}");
                    continue;
                }
            };
            if !tracked
                .ajo_mut()
                .expire_claim(now, self.config.claim_expiry_secs)
            {
                continue;
            }
            match self.database.put_checked(&mut tracked).await {
                Ok(()) => {
                    log::info!("Claim on {id} lapsed.");
                    self.push_flair(tracked.ajo()).await;
                    expired += 1;
                }
                Err(Error::Conflict(_)) => (),
                Err(e) => return Err(e),
            }
        }
        Ok(expired)
    }

    async fn push_flair(&self, ajo: &Ajo) {
        let flair = ajo.flair();
        let result = with_retries("set flair", SEND_TRIES, SEND_RETRY_DELAY, || {
            self.platform.set_flair(ajo.id(), &flair)
        })
        .await;
        if let Err(e) = result {
            log::error!("Could not set the flair of {}: {e}", ajo.id());
        }
    }

    async fn reply(&self, parent_id: &str, text: &str) {
        for part in split_for_reddit(text) {
            let result = with_retries("reply", SEND_TRIES, SEND_RETRY_DELAY, || {
                self.platform.reply(parent_id, part)
            })
            .await;
            if let Err(e) = result {
                log::error!("Could not reply to {parent_id}: {e}");
                return;
            }
        }
    }

    async fn perform(&self, post: &Post, effect: &Effect) {
        let result = match effect {
            Effect::MessageUser { to, subject, body } => {
                with_retries("message", SEND_TRIES, SEND_RETRY_DELAY, || {
                    self.platform.message_user(to, subject, body)
                })
                .await
            }
            Effect::RemovePost => {
                with_retries("remove post", SEND_TRIES, SEND_RETRY_DELAY, || {
                    self.platform.remove_post(&post.id)
                })
                .await
            }
        };
        if let Err(e) = result {
            log::error!("Could not carry out {effect:?} on {}: {e}", post.id);
        }
    }
}

/// Poll forever, until the database goes away.
pub async fn polling_spinloop<P: Platform>(
    platform: Arc<P>,
    database: std::sync::Weak<Database>,
    config: Arc<Config>,
) {
    let backlog: Arc<Mutex<Vec<Pending>>> = Arc::default();
    loop {
        let Some(database) = database.upgrade() else {
            return;
        };
        let ziwen = Ziwen {
            platform: platform.clone(),
            database,
            config: config.clone(),
            backlog: backlog.clone(),
        };

        match ziwen.poll_once().await {
            Ok(report) => log::debug!("Cycle done: {report:?}"),
            Err(e) => log::error!("Cycle aborted: {e}"),
        }

        drop(ziwen);
        tokio::time::sleep(config.poll_interval()).await;
    }
}
