use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Version tag format: UTC at second resolution, e.g. `20260315T142005Z`.
/// Fixed width, so lexical order equals time order.
const TAG_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Unique, time-ordered identifier for a stored model artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        VersionTag(at.format(TAG_FORMAT).to_string())
    }

    /// Parse a tag back from its string form, rejecting anything that is not
    /// a well-formed timestamp.
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(s, TAG_FORMAT).ok()?;
        Some(VersionTag(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tag_format_matches_clock() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 14, 20, 5).unwrap();
        assert_eq!(VersionTag::from_datetime(at).as_str(), "20260315T142005Z");
    }

    #[test]
    fn test_tags_order_by_time() {
        let earlier = VersionTag::from_datetime(Utc.with_ymd_and_hms(2026, 3, 15, 14, 20, 5).unwrap());
        let later = VersionTag::from_datetime(Utc.with_ymd_and_hms(2026, 3, 15, 14, 20, 6).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn test_parse_roundtrip() {
        let tag = VersionTag::parse("20260315T142005Z").unwrap();
        assert_eq!(tag.as_str(), "20260315T142005Z");
    }

    #[test]
    fn test_parse_rejects_malformed_tags() {
        assert!(VersionTag::parse("not-a-tag").is_none());
        assert!(VersionTag::parse("20261340T990000Z").is_none());
        assert!(VersionTag::parse("20260315T142005").is_none());
    }
}
