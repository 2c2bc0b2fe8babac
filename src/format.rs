//! Changelog stanza rendering.

use chrono::{FixedOffset, TimeZone, Utc};

use crate::segment::ChangelogEntry;

/// Format a timestamp as an RFC 2822 date in the given timezone offset.
///
/// The offset is the commit's own, in minutes east of UTC; the day of the
/// month is zero-padded as changelog trailers conventionally are.
pub fn rfc2822_date(time: i64, tz_offset_minutes: i32) -> String {
    let localized = FixedOffset::east_opt(tz_offset_minutes * 60)
        .and_then(|offset| offset.timestamp_opt(time, 0).single());

    match localized {
        Some(date) => date.format("%a, %d %b %Y %H:%M:%S %z").to_string(),
        None => Utc
            .timestamp_opt(time, 0)
            .single()
            .map(|date| date.format("%a, %d %b %Y %H:%M:%S %z").to_string())
            .unwrap_or_default(),
    }
}

/// Render one changelog stanza.
///
/// ```text
/// <name> (<version>) <release>; urgency=<urgency>
///
/// <body>
///
///  -- <author> <<email>>  <date>
///
/// ```
///
/// The body holds one bullet per message; when more than one author
/// contributed, each author's block is preceded by a bracketed heading.
pub fn format_stanza(
    name: &str,
    version: &str,
    release: &str,
    urgency: &str,
    entry: &ChangelogEntry,
) -> String {
    let multiple_authors = entry.author_count() > 1;

    let body = entry
        .iter()
        .map(|(author, messages)| {
            let bullets = messages
                .iter()
                .map(|message| format!("  * {}", message))
                .collect::<Vec<_>>()
                .join("\n");

            if multiple_authors {
                format!("  [ {} ]\n{}", author, bullets)
            } else {
                bullets
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{} ({}) {}; urgency={}\n\n{}\n\n -- {} <{}>  {}\n\n",
        name,
        version,
        release,
        urgency,
        body,
        entry.author,
        entry.email,
        rfc2822_date(entry.time, entry.tz_offset_minutes)
    )
}
