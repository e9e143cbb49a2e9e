#![allow(clippy::unwrap_used)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Mutex,
    },
};

use super::{Comment, OutboxAction, Platform, Post, UpstreamError};
use crate::ajo::Flair;

/// In-memory site for exercising the loops.
#[derive(Debug, Default)]
pub(crate) struct MemoryPlatform {
    pub posts: Mutex<Vec<Post>>,
    pub comments: Mutex<Vec<Comment>>,
    pub site_comments: Mutex<Vec<Comment>>,
    pub known: Mutex<HashMap<String, Post>>,
    pub sent: Mutex<Vec<OutboxAction>>,
    /// Makes every fetch fail.
    pub down: AtomicBool,
    /// Makes only single post lookups fail.
    pub lookups_down: AtomicBool,
    next_id: AtomicU64,
}

impl MemoryPlatform {
    pub fn add_post(&self, post: Post) {
        self.known.lock().unwrap().insert(post.id.clone(), post.clone());
        self.posts.lock().unwrap().push(post);
    }

    pub fn add_comment(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }

    pub fn sent(&self) -> Vec<OutboxAction> {
        self.sent.lock().unwrap().clone()
    }

    fn check_up(&self) -> Result<(), UpstreamError> {
        if self.down.load(Ordering::Relaxed) {
            return Err(UpstreamError::Refused("site is down".to_string()));
        }
        Ok(())
    }

    fn record(&self, action: OutboxAction) {
        self.sent.lock().unwrap().push(action);
    }
}

impl Platform for MemoryPlatform {
    async fn new_posts(&self) -> Result<Vec<Post>, UpstreamError> {
        self.check_up()?;
        Ok(std::mem::take(&mut *self.posts.lock().unwrap()))
    }

    async fn new_comments(&self) -> Result<Vec<Comment>, UpstreamError> {
        self.check_up()?;
        Ok(std::mem::take(&mut *self.comments.lock().unwrap()))
    }

    async fn site_comments(&self) -> Result<Vec<Comment>, UpstreamError> {
        self.check_up()?;
        Ok(std::mem::take(&mut *self.site_comments.lock().unwrap()))
    }

    async fn post(&self, id: &str) -> Result<Option<Post>, UpstreamError> {
        self.check_up()?;
        if self.lookups_down.load(Ordering::Relaxed) {
            return Err(UpstreamError::Refused("lookups are down".to_string()));
        }
        Ok(self.known.lock().unwrap().get(id).cloned())
    }

    async fn reply(&self, parent_id: &str, text: &str) -> Result<String, UpstreamError> {
        let comment_id = format!("r{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.record(OutboxAction::Reply {
            parent_id: parent_id.to_string(),
            comment_id: comment_id.clone(),
            text: text.to_string(),
        });
        Ok(comment_id)
    }

    async fn set_flair(&self, post_id: &str, flair: &Flair) -> Result<(), UpstreamError> {
        self.record(OutboxAction::SetFlair {
            post_id: post_id.to_string(),
            css: flair.css.clone(),
            text: flair.text.clone(),
        });
        Ok(())
    }

    async fn message_user(
        &self,
        username: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), UpstreamError> {
        self.record(OutboxAction::MessageUser {
            username: username.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn remove_post(&self, post_id: &str) -> Result<(), UpstreamError> {
        self.record(OutboxAction::RemovePost {
            post_id: post_id.to_string(),
        });
        Ok(())
    }

    async fn crosspost(
        &self,
        post: &Post,
        subreddit: &str,
        title: &str,
    ) -> Result<Post, UpstreamError> {
        let id = format!("x{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.record(OutboxAction::Crosspost {
            original_id: post.id.clone(),
            post_id: id.clone(),
            subreddit: subreddit.to_string(),
            title: title.to_string(),
        });
        let new_post = Post {
            id,
            title: title.to_string(),
            author: Some("translator-BOT".to_string()),
            subreddit: subreddit.to_string(),
            crosspost_parent: Some(format!("t3_{}", post.id)),
            ..Default::default()
        };
        self.add_post(new_post.clone());
        Ok(new_post)
    }
}
