//! A file-backed stand-in for the site.
//!
//! Whatever talks to the real API writes JSON lines into the inboxes
//! (`posts.jsonl`, `comments.jsonl`, `site_comments.jsonl`) and reads
//! the bots' actions back out of `outbox.jsonl`.

use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::de::DeserializeOwned;
use tokio::{io::AsyncWriteExt, sync::Mutex};

use super::{Comment, OutboxAction, Platform, Post, UpstreamError};
use crate::ajo::Flair;

const POSTS: &str = "posts.jsonl";
const COMMENTS: &str = "comments.jsonl";
const SITE_COMMENTS: &str = "site_comments.jsonl";
const OUTBOX: &str = "outbox.jsonl";

/// How many posts are kept around for lookups by ID.
const KNOWN_POSTS_LIMIT: usize = 2000;

/// Recently seen posts. The oldest arrivals are forgotten first.
#[derive(Debug, Default)]
struct KnownPosts {
    by_id: HashMap<String, Post>,
    arrival: VecDeque<String>,
    limit: usize,
}

impl KnownPosts {
    fn with_limit(limit: usize) -> KnownPosts {
        KnownPosts {
            limit,
            ..Default::default()
        }
    }

    fn insert(&mut self, post: Post) {
        if !self.by_id.contains_key(&post.id) {
            self.arrival.push_back(post.id.clone());
        }
        self.by_id.insert(post.id.clone(), post);
        while self.arrival.len() > self.limit {
            if let Some(oldest) = self.arrival.pop_front() {
                self.by_id.remove(&oldest);
            }
        }
    }

    fn get(&self, id: &str) -> Option<&Post> {
        self.by_id.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Post> {
        self.by_id.get_mut(id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.by_id.len()
    }
}

#[derive(Debug)]
pub struct SpoolPlatform {
    dir: PathBuf,
    username: String,
    /// Posts seen lately, for lookups by ID.
    known_posts: Mutex<KnownPosts>,
    /// Serializes writes to the spool files.
    write_lock: Mutex<()>,
    next_id: AtomicU64,
}

impl SpoolPlatform {
    /// Open a spool directory, creating it if needed.
    pub async fn new(dir: &Path, username: &str) -> Result<SpoolPlatform, UpstreamError> {
        tokio::fs::create_dir_all(dir).await?;
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |x| x.as_secs());
        Ok(SpoolPlatform {
            dir: dir.to_path_buf(),
            username: username.to_string(),
            known_posts: Mutex::new(KnownPosts::with_limit(KNOWN_POSTS_LIMIT)),
            write_lock: Mutex::new(()),
            next_id: AtomicU64::new(seed),
        })
    }

    fn new_id(&self) -> String {
        format!("{:x}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Take everything currently in an inbox file.
    ///
    /// The file is moved aside first so that lines written in the meantime
    /// land in a fresh file. A leftover from an interrupted drain is read
    /// before anything new.
    async fn drain<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>, UpstreamError> {
        let path = self.dir.join(name);
        let draining = self.dir.join(format!("{name}.draining"));

        if !tokio::fs::try_exists(&draining).await? {
            match tokio::fs::rename(&path, &draining).await {
                Ok(()) => (),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            }
        }

        let text = tokio::fs::read_to_string(&draining).await?;
        tokio::fs::remove_file(&draining).await?;

        let mut items = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(item) => items.push(item),
                Err(e) => {
                    log::warn!("Skipping line {} of {name}: {e}", number + 1);
                }
            }
        }
        Ok(items)
    }

    async fn append_line(&self, name: &str, line: String) -> Result<(), UpstreamError> {
        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(name))
            .await?;
        file.write_all(format!("{line}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn send(&self, action: &OutboxAction) -> Result<(), UpstreamError> {
        log::debug!("Outbox: {action:?}");
        self.append_line(OUTBOX, serde_json::to_string(action)?).await
    }

    async fn remember(&self, posts: impl IntoIterator<Item = Post>) {
        let mut known = self.known_posts.lock().await;
        for post in posts {
            known.insert(post);
        }
    }

    async fn drain_comments(&self, name: &str) -> Result<Vec<Comment>, UpstreamError> {
        let comments: Vec<Comment> = self.drain(name).await?;
        self.remember(comments.iter().filter_map(|x| x.post.clone()))
            .await;
        Ok(comments)
    }
}

impl Platform for SpoolPlatform {
    async fn new_posts(&self) -> Result<Vec<Post>, UpstreamError> {
        let mut posts: Vec<Post> = self.drain(POSTS).await?;
        posts.sort_by_key(|x| x.created_utc);
        self.remember(posts.iter().cloned()).await;
        Ok(posts)
    }

    async fn new_comments(&self) -> Result<Vec<Comment>, UpstreamError> {
        let mut comments = self.drain_comments(COMMENTS).await?;
        comments.sort_by_key(|x| x.created_utc);
        Ok(comments)
    }

    async fn site_comments(&self) -> Result<Vec<Comment>, UpstreamError> {
        self.drain_comments(SITE_COMMENTS).await
    }

    async fn post(&self, id: &str) -> Result<Option<Post>, UpstreamError> {
        Ok(self.known_posts.lock().await.get(id).cloned())
    }

    async fn reply(&self, parent_id: &str, text: &str) -> Result<String, UpstreamError> {
        let comment_id = self.new_id();
        self.send(&OutboxAction::Reply {
            parent_id: parent_id.to_string(),
            comment_id: comment_id.clone(),
            text: text.to_string(),
        })
        .await?;
        Ok(comment_id)
    }

    async fn set_flair(&self, post_id: &str, flair: &Flair) -> Result<(), UpstreamError> {
        self.send(&OutboxAction::SetFlair {
            post_id: post_id.to_string(),
            css: flair.css.clone(),
            text: flair.text.clone(),
        })
        .await?;
        if let Some(post) = self.known_posts.lock().await.get_mut(post_id) {
            post.flair_css = Some(flair.css.clone());
        }
        Ok(())
    }

    async fn message_user(
        &self,
        username: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), UpstreamError> {
        self.send(&OutboxAction::MessageUser {
            username: username.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        })
        .await
    }

    async fn remove_post(&self, post_id: &str) -> Result<(), UpstreamError> {
        self.send(&OutboxAction::RemovePost {
            post_id: post_id.to_string(),
        })
        .await
    }

    async fn crosspost(
        &self,
        post: &Post,
        subreddit: &str,
        title: &str,
    ) -> Result<Post, UpstreamError> {
        let id = self.new_id();
        let new_post = Post {
            permalink: format!("/r/{subreddit}/comments/{id}/"),
            id,
            title: title.to_string(),
            author: Some(self.username.clone()),
            created_utc: chrono::Utc::now().timestamp(),
            url: post.link().map(String::from),
            subreddit: subreddit.to_string(),
            crosspost_parent: Some(format!("t3_{}", post.id)),
            flair_css: None,
        };
        self.send(&OutboxAction::Crosspost {
            original_id: post.id.clone(),
            post_id: new_post.id.clone(),
            subreddit: subreddit.to_string(),
            title: title.to_string(),
        })
        .await?;
        // So the main bot picks it up like any other new post.
        self.append_line(POSTS, serde_json::to_string(&new_post)?)
            .await?;
        self.remember([new_post.clone()]).await;
        Ok(new_post)
    }
}
