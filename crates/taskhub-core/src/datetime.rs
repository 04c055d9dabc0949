use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Resolves an IANA zone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok()
}

/// Short local date in the `M/D/YYYY` shape browsers use for `en-US`.
#[must_use]
pub fn format_local_date(dt: DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%-m/%-d/%Y").to_string()
}
