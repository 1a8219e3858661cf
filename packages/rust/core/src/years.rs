//! Year ranges for sweeping a source across publication years.

use chrono::Datelike;

use inspectors_shared::{InspectorError, Result};

/// The standard `--since` / `--year` scraper options.
#[derive(Debug, Clone, Default)]
pub struct YearOptions {
    /// First year of an inclusive range ending at the current year.
    pub since: Option<String>,
    /// A single year.
    pub year: Option<String>,
}

/// Resolve the years to scrape, relative to today's date.
pub fn year_range(opts: &YearOptions) -> Result<Vec<i32>> {
    year_range_at(opts, chrono::Local::now().year())
}

/// Resolve the years to scrape, given the current year.
///
/// Values after `current_year` are clamped to it. `since` takes precedence
/// over `year`; with neither set the result is just `current_year`.
pub fn year_range_at(opts: &YearOptions, current_year: i32) -> Result<Vec<i32>> {
    let since = parse_year("since", opts.since.as_deref())?.map(|y| y.min(current_year));
    let year = parse_year("year", opts.year.as_deref())?.map(|y| y.min(current_year));

    let range = match (since, year) {
        (Some(since), _) => (since..=current_year).collect(),
        (None, Some(year)) => vec![year],
        (None, None) => vec![current_year],
    };

    Ok(range)
}

/// Empty strings count as unset.
fn parse_year(name: &str, value: Option<&str>) -> Result<Option<i32>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| InspectorError::config(format!("invalid --{name} value: {v:?}"))),
    }
}
