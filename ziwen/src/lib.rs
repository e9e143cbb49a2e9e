//! Source code for Ziwen, the request tracking bot of r/translator.

/// Errors shared by every part of the bot.
mod error;
pub use error::Error;

/// Runtime configuration.
pub mod config;

/// The table of languages, scripts and countries the bot knows.
pub mod languages;

/// Parser for request post titles.
pub mod title;

/// The per-post request record and its flair.
pub mod ajo;

/// The database.
pub mod database;

/// Text of everything the bot says.
mod responses;

/// Comment commands and what they do to a request.
pub mod commands;

/// Points awarded for comments.
pub mod points;

/// What the bot needs from the site, and a file-backed implementation of it.
pub mod platform;

/// The main polling loop.
pub mod polling;

/// Cross-site mention watcher.
pub mod streamer;

/// Entry functions that start the bots.
mod entry;
pub use entry::*;

/// Subreddit the bot serves when the config doesn't say otherwise.
pub static DEFAULT_SUBREDDIT: &str = "translator";

/// Account name the bot posts as when the config doesn't say otherwise.
pub static DEFAULT_USERNAME: &str = "translator-BOT";
