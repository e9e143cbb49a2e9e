mod spool;
#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};
use url::Url;

pub use spool::SpoolPlatform;

use crate::ajo::Flair;

/// Where permalinks are relative to.
pub static SITE_ROOT: &str = "https://www.reddit.com";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Bare ID, without the `t3_` prefix.
    pub id: String,
    pub title: String,
    /// `None` if the account was deleted.
    pub author: Option<String>,
    pub created_utc: i64,
    #[serde(default)]
    pub permalink: String,
    /// Link target for link posts.
    #[serde(default)]
    pub url: Option<String>,
    pub subreddit: String,
    /// Fullname of the post this one crossposts.
    #[serde(default)]
    pub crosspost_parent: Option<String>,
    #[serde(default)]
    pub flair_css: Option<String>,
}

impl Post {
    /// Absolute link to the post.
    #[must_use]
    pub fn link(&self) -> Option<Url> {
        Url::parse(SITE_ROOT).ok()?.join(&self.permalink).ok()
    }

    /// Meta and community posts are not requests.
    #[must_use]
    pub fn is_request(&self) -> bool {
        !matches!(self.flair_css.as_deref(), Some("meta" | "community"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentComment {
    pub id: String,
    pub author: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub author: Option<String>,
    pub body: String,
    pub created_utc: i64,
    pub subreddit: String,
    #[serde(default)]
    pub permalink: String,
    /// `None` for top-level comments.
    #[serde(default)]
    pub parent: Option<ParentComment>,
    /// The post the comment is on, when the feed includes it.
    #[serde(default)]
    pub post: Option<Post>,
}

impl Comment {
    #[must_use]
    pub fn link(&self) -> Option<Url> {
        Url::parse(SITE_ROOT).ok()?.join(&self.permalink).ok()
    }
}

/// The site refused or couldn't be reached.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("spool I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode action: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    Refused(String),
}

/// Everything the bots need from the site.
pub trait Platform: Send + Sync {
    /// Posts on the served subreddit not returned before, oldest first.
    fn new_posts(&self) -> impl Future<Output = Result<Vec<Post>, UpstreamError>> + Send;

    /// Comments on the served subreddit not returned before, oldest first.
    fn new_comments(&self) -> impl Future<Output = Result<Vec<Comment>, UpstreamError>> + Send;

    /// Comments anywhere on the site that mention the served subreddit.
    fn site_comments(&self) -> impl Future<Output = Result<Vec<Comment>, UpstreamError>> + Send;

    fn post(&self, id: &str) -> impl Future<Output = Result<Option<Post>, UpstreamError>> + Send;

    /// Reply to a post or comment. Returns the ID of the new comment.
    fn reply(
        &self,
        parent_id: &str,
        text: &str,
    ) -> impl Future<Output = Result<String, UpstreamError>> + Send;

    fn set_flair(
        &self,
        post_id: &str,
        flair: &Flair,
    ) -> impl Future<Output = Result<(), UpstreamError>> + Send;

    fn message_user(
        &self,
        username: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), UpstreamError>> + Send;

    fn remove_post(&self, post_id: &str) -> impl Future<Output = Result<(), UpstreamError>> + Send;

    /// Crosspost `post` to `subreddit` under `title`. Returns the new post.
    fn crosspost(
        &self,
        post: &Post,
        subreddit: &str,
        title: &str,
    ) -> impl Future<Output = Result<Post, UpstreamError>> + Send;
}

/// One side effect, as written to the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboxAction {
    Reply {
        parent_id: String,
        comment_id: String,
        text: String,
    },
    SetFlair {
        post_id: String,
        css: String,
        text: String,
    },
    MessageUser {
        username: String,
        subject: String,
        body: String,
    },
    RemovePost {
        post_id: String,
    },
    Crosspost {
        original_id: String,
        post_id: String,
        subreddit: String,
        title: String,
    },
}
