use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

static RE_COMPACT: OnceLock<Regex> = OnceLock::new();
static RE_CANONICAL: OnceLock<Regex> = OnceLock::new();

pub fn extract_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let compact = RE_COMPACT.get_or_init(|| Regex::new(r"(\d{8})_(\d{6})").unwrap());
    if let Some(caps) = compact.captures(file_name) {
        let joined = format!("{}{}", &caps[1], &caps[2]);
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(&joined, "%Y%m%d%H%M%S") {
            return Some(timestamp);
        }
    }

    let canonical = RE_CANONICAL
        .get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2}) (\d{2}-\d{2}-\d{2})").unwrap());
    if let Some(caps) = canonical.captures(file_name) {
        let joined = format!("{} {}", &caps[1], &caps[2]);
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H-%M-%S") {
            return Some(timestamp);
        }
    }

    None
}
