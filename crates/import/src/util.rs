use chrono::{NaiveDate, NaiveDateTime};

/// Date layouts seen in bank exports and warehouse dumps, tried after the
/// configured one.
const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y", "%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%b %d, %Y", "%d-%b-%Y", "%d %b %Y", "%m-%d-%Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// A record's position is where the reader stopped after the previous one,
/// which is before any empty lines it skipped. Counts those to find the line
/// the record itself starts on.
pub(crate) fn start_line(bytes: &[u8], pos: &csv::Position) -> usize {
    let rest = usize::try_from(pos.byte())
        .ok()
        .and_then(|start| bytes.get(start..))
        .unwrap_or_default();
    let skipped = rest
        .iter()
        .take_while(|b| matches!(b, b'\r' | b'\n'))
        .filter(|&&b| b == b'\n')
        .count();
    usize::try_from(pos.line()).unwrap_or(usize::MAX).saturating_add(skipped)
}

pub fn parse_date(s: &str, format: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, format) {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
        return Some(dt.date());
    }

    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            FALLBACK_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
