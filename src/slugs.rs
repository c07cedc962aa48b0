use chrono::{DateTime, Utc};

/// Slug for a category: the slugified name.
pub fn category_slug(name: &str) -> String {
    slug::slugify(name)
}

/// Slug for an item: title plus the microsecond part of `now`, so items
/// sharing a title still get distinct slugs.
pub fn item_slug(title: &str, now: DateTime<Utc>) -> String {
    slug::slugify(format!("{}-{}", title, now.format("%6f")))
}

/// Caller-provided slug, or `fallback` when it is missing or blank.
pub fn explicit_or(slug: Option<String>, fallback: impl FnOnce() -> String) -> String {
    match slug.map(|s| slug::slugify(s.trim())) {
        Some(s) if !s.is_empty() => s,
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_slug_from_name() {
        assert_eq!(category_slug("Sport Wear"), "sport-wear");
    }

    #[test]
    fn item_slug_carries_microseconds() {
        let now = Utc
            .timestamp_opt(1_700_000_000, 123_456_000)
            .single()
            .unwrap();
        assert_eq!(item_slug("Blue Shirt", now), "blue-shirt-123456");
    }

    #[test]
    fn explicit_slug_wins_when_present() {
        assert_eq!(explicit_or(Some("My Slug".into()), || "x".into()), "my-slug");
        assert_eq!(explicit_or(Some("   ".into()), || "x".into()), "x");
        assert_eq!(explicit_or(None, || "x".into()), "x");
    }
}
