//! Merges entries from many feeds into one list ordered by publication time.
//!
//! Each source contributes at most [`PER_SOURCE_CAP`] of its most recent
//! items. Items whose title matches the skip title are dropped, and the
//! survivors from all sources are sorted newest first and cut to the limit.
//! The sort is stable: entries with equal timestamps keep source order, then
//! their order within the source.

use std::ops::Deref;

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::PlanetError;
use crate::feed::{FeedSource, SourceFeed};

/// Number of most recent items each source may contribute.
pub const PER_SOURCE_CAP: usize = 10;

/// `pubDate` layout, e.g. `Tue, 02 Jan 2024 03:04:05 +0000`.
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

const WEEKDAY_PREFIX: &str = "%a, ";
const DATE_BODY_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub published_at: DateTime<FixedOffset>,
    pub source_title: String,
    pub source_link: String,
    pub title: String,
    pub link: String,
}

impl Entry {
    /// Publication time as `YYYY-MM-DD HH:MM:SS ZONE`, in the entry's own offset.
    pub fn published_display(&self) -> String {
        format!(
            "{} {}",
            self.published_at.format("%Y-%m-%d %H:%M:%S"),
            zone_abbreviation(self.published_at.offset())
        )
    }
}

/// `UTC` for a zero offset, otherwise `UTC+HH:MM` / `UTC-HH:MM`.
pub fn zone_abbreviation(offset: &FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }

    let sign = if seconds < 0 { '-' } else { '+' };
    let seconds = seconds.abs();
    let (hours, minutes, rest) = (seconds / 3600, seconds % 3600 / 60, seconds % 60);
    if rest == 0 {
        format!("UTC{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("UTC{}{:02}:{:02}:{:02}", sign, hours, minutes, rest)
    }
}

/// Entries sorted by `published_at`, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedResult(Vec<Entry>);

impl RankedResult {
    /// Sort `entries` newest first and keep the first `limit`.
    pub fn top(mut entries: Vec<Entry>, limit: usize) -> Self {
        sort_newest_first(&mut entries);
        entries.truncate(limit);
        Self(entries)
    }

    pub fn into_inner(self) -> Vec<Entry> {
        self.0
    }
}

impl Deref for RankedResult {
    type Target = [Entry];

    fn deref(&self) -> &[Entry] {
        &self.0
    }
}

impl IntoIterator for RankedResult {
    type Item = Entry;
    type IntoIter = std::vec::IntoIter<Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn sort_newest_first(entries: &mut [Entry]) {
    // `sort_by` is stable, which fixes the tie order.
    entries.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// What to do when a source cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run on the first failure.
    #[default]
    Abort,
    /// Log the failure and let the source contribute no entries.
    Skip,
}

#[derive(Debug, Clone, Copy)]
pub struct RankOptions<'a> {
    pub limit: usize,
    pub skip_title: &'a str,
    pub on_fetch_error: FailurePolicy,
}

/// Parse a `pubDate` in [`DATE_FORMAT`].
///
/// The weekday must be a weekday name but is not checked against the date.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, PlanetError> {
    let date_err = |source| PlanetError::Date {
        value: value.to_string(),
        source,
    };

    let mut weekday = Parsed::new();
    let body = format::parse_and_remainder(
        &mut weekday,
        value.trim(),
        StrftimeItems::new(WEEKDAY_PREFIX),
    )
    .map_err(date_err)?;

    DateTime::parse_from_str(body, DATE_BODY_FORMAT).map_err(date_err)
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Turn one fetched feed into its eligible entries: the [`PER_SOURCE_CAP`]
/// most recent items, minus those matching `skip_title`.
///
/// Every item's date is parsed to find the most recent ones, so one malformed
/// date fails the whole source. Title and link are only required of items
/// within the cap.
pub fn collect_entries(feed: &SourceFeed, skip_title: &str) -> Result<Vec<Entry>, PlanetError> {
    let mut dated = feed
        .items
        .iter()
        .map(|item| -> Result<_, PlanetError> { Ok((parse_date(&item.published)?, item)) })
        .collect::<Result<Vec<_>, _>>()?;

    // Stable, so equal dates keep document order.
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    dated.truncate(PER_SOURCE_CAP);

    let missing = |field| PlanetError::MissingField {
        source_id: feed.title.clone(),
        field,
    };

    let skip = normalize_title(skip_title);
    let mut entries = Vec::with_capacity(dated.len());
    for (published_at, item) in dated {
        let title = item.title.clone().ok_or_else(|| missing("item title"))?;
        let link = item.link.clone().ok_or_else(|| missing("item link"))?;

        if normalize_title(&title) == skip {
            debug!("Skipping entry '{}' from '{}'", title, feed.title);
            continue;
        }

        entries.push(Entry {
            published_at,
            source_title: feed.title.clone(),
            source_link: feed.link.clone(),
            title,
            link,
        });
    }

    Ok(entries)
}

/// Fetch every source in order and return the globally newest
/// `options.limit` entries.
pub async fn rank<S: FeedSource>(
    source: &S,
    sources: &[String],
    options: &RankOptions<'_>,
) -> Result<RankedResult, PlanetError> {
    let mut all_entries = Vec::new();

    for source_id in sources {
        let collected = match source.fetch(source_id).await {
            Ok(feed) => collect_entries(&feed, options.skip_title),
            Err(e) => Err(e),
        };

        match (collected, options.on_fetch_error) {
            (Ok(entries), _) => {
                info!("Collected {} entries from '{}'", entries.len(), source_id);
                all_entries.extend(entries);
            }
            (Err(e), FailurePolicy::Abort) => return Err(e),
            (Err(e), FailurePolicy::Skip) => {
                warn!("Skipping feed '{}': {}", source_id, e);
            }
        }
    }

    let ranked = RankedResult::top(all_entries, options.limit);
    info!("Ranked {} entries from {} feeds", ranked.len(), sources.len());
    Ok(ranked)
}
