//! Planet Digest - A feed digest generator
//!
//! This crate fetches a configured list of RSS feeds, merges their recent
//! entries into one time-ordered top-N list, and renders it as a Markdown
//! page with YAML front matter.

pub mod config;
pub mod digest;
pub mod error;
pub mod feed;
pub mod ranker;
pub mod render;
