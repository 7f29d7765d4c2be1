use crate::{Config, Entry, Journal, OpContext};
use chrono::{DateTime, Local, TimeZone};
use std::path::Path;

/// Test helper to create a `Config` whose journal lives in `dir`.
pub fn mk_config(dir: &Path) -> Config {
    Config::new(dir.join("doing.md"))
}

/// 2025-08-15 at `hour:minute`, local time.
pub fn at(hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2025, 8, 15, hour, minute, 0)
        .single()
        .expect("valid test time")
}

pub fn ctx_at(now: DateTime<Local>) -> OpContext {
    OpContext::new(&Config::new("doing.md"), now)
}

/// A small journal shared by the query and operation tests.
///
/// ```text
/// Currently:
///     - 2025-08-15 11:00 | Review PR @work @review
///         ask the reviewer about naming
///     - 2025-08-15 10:00 | Write report @work @done(2025-08-15 10:30)
///     - 2025-08-15 09:00 | Coffee @break
/// Later:
///     - 2025-08-14 18:00 | Call the bank
///     - 2025-08-14 17:00 | Read a book @leisure
/// ```
pub fn sample_journal() -> Journal {
    let yesterday = |h| at(h, 0) - chrono::Duration::days(1);
    let mut j = Journal::new("Currently");
    for (hour, subject) in [
        (9, "Coffee @break"),
        (10, "Write report @work @done(2025-08-15 10:30)"),
    ] {
        j.add_entry("Currently", Entry::new(at(hour, 0), subject), true);
    }
    j.add_entry(
        "Currently",
        Entry::new(at(11, 0), "Review PR @work @review")
            .with_notes(vec!["ask the reviewer about naming".to_string()]),
        true,
    );
    j.add_entry("Later", Entry::new(yesterday(17), "Read a book @leisure"), true);
    j.add_entry("Later", Entry::new(yesterday(18), "Call the bank"), true);
    j
}
