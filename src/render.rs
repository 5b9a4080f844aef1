//! Markdown rendering: YAML front matter followed by a table of entries.
//!
//! Templates use the `md` extension, so askama performs no escaping and
//! every value is written verbatim.

use askama::Template;
use chrono::{Local, NaiveDateTime};

use crate::error::PlanetError;
use crate::ranker::Entry;

const GENERATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Template)]
#[template(path = "front_matter.md")]
struct FrontMatterTemplate<'a> {
    title: &'a str,
    author: &'a str,
    generated: String,
    menu_name: &'a str,
    weight: &'a str,
    icon: &'a str,
}

#[derive(Template)]
#[template(path = "table.md")]
struct TableTemplate<'a> {
    entries: &'a [Entry],
}

/// Front matter stamped with the current local time.
pub fn render_header(
    title: &str,
    author: &str,
    menu_name: &str,
    weight: &str,
    icon: &str,
) -> Result<String, PlanetError> {
    render_header_at(
        Local::now().naive_local(),
        title,
        author,
        menu_name,
        weight,
        icon,
    )
}

/// Front matter stamped with `generated`, followed by a blank line.
pub fn render_header_at(
    generated: NaiveDateTime,
    title: &str,
    author: &str,
    menu_name: &str,
    weight: &str,
    icon: &str,
) -> Result<String, PlanetError> {
    let mut header = FrontMatterTemplate {
        title,
        author,
        generated: generated.format(GENERATED_FORMAT).to_string(),
        menu_name,
        weight,
        icon,
    }
    .render()?;
    header.push_str("\n\n");
    Ok(header)
}

/// Table of entries in the given order.
pub fn render_table(entries: &[Entry]) -> Result<String, PlanetError> {
    Ok(TableTemplate { entries }.render()?)
}
