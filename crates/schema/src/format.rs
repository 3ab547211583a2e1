//! Named string formats.
//!
//! A process-wide registry maps format names to validators. It starts out
//! with the common formats below and callers may add their own.

use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;
use shapecheck_value::Date;

pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

static REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_defaults);

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{2}):(\d{2}):(\d{2})(\.\d+)?(z|[+-]\d{2}(:?\d{2})?)?$").unwrap()
});
static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d{4}-\d{2}-\d{2}[t ]\d{2}:\d{2}:\d{2}(\.\d+)?(z|[+-]\d{2}:\d{2})$").unwrap()
});
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$",
    )
    .unwrap()
});
static HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[-0-9a-z]{0,61}[0-9a-z])?)*\.?$")
        .unwrap()
});
static IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)$")
        .unwrap()
});
static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:urn:uuid:)?[0-9a-f]{8}-(?:[0-9a-f]{4}-){3}[0-9a-f]{12}$").unwrap()
});
static URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+\-.]*:[^\s]*$").unwrap());

const DAYS: [u32; 13] = [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap_year(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn is_date(s: &str) -> bool {
    let Some(caps) = DATE.captures(s) else {
        return false;
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let (Some(year), Some(month), Some(day)) = (field(1), field(2), field(3)) else {
        return false;
    };
    if !(1..=12).contains(&month) || day == 0 {
        return false;
    }
    let max = if month == 2 && !is_leap_year(year) { 28 } else { DAYS[month as usize] };
    day <= max
}

fn is_time(s: &str) -> bool {
    let Some(caps) = TIME.captures(s) else {
        return false;
    };
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    matches!((field(1), field(2), field(3)), (Some(h), Some(m), Some(sec)) if h <= 23 && m <= 59 && sec <= 60)
}

fn is_date_time(s: &str) -> bool {
    DATE_TIME.is_match(s) && is_date(&s[..10]) && Date::parse(s).is_some_and(|d| d.is_valid())
}

fn is_hostname(s: &str) -> bool {
    !s.is_empty() && s.len() <= 253 && HOSTNAME.is_match(s)
}

/// Registry of named string format validators.
pub struct FormatRegistry {
    formats: RwLock<HashMap<String, FormatFn>>,
}

impl FormatRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            formats: RwLock::new(HashMap::new()),
        }
    }

    /// A registry preloaded with `date-time`, `date`, `time`, `email`,
    /// `uuid`, `uri`, `ipv4`, `ipv6`, `hostname` and `regex`.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.set("date", is_date);
        registry.set("time", is_time);
        registry.set("date-time", is_date_time);
        registry.set("email", |s| EMAIL.is_match(s));
        registry.set("uuid", |s| UUID.is_match(s));
        registry.set("uri", |s| URI.is_match(s));
        registry.set("ipv4", |s| IPV4.is_match(s));
        registry.set("ipv6", |s| s.parse::<Ipv6Addr>().is_ok());
        registry.set("hostname", is_hostname);
        registry.set("regex", |s| Regex::new(s).is_ok());
        registry
    }

    /// The process-wide registry consulted by every check.
    pub fn global() -> &'static FormatRegistry {
        &REGISTRY
    }

    /// Registers or replaces the validator for `name`.
    pub fn set<F>(&self, name: impl Into<String>, check: F)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(check));
    }

    pub fn remove(&self, name: &str) -> bool {
        self.formats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Returns the validator for `name`.
    pub fn get(&self, name: &str) -> Option<FormatFn> {
        self.formats
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Tests `value` against the named format. `None` if no such format is
    /// registered.
    pub fn check(&self, name: &str, value: &str) -> Option<bool> {
        self.get(name).map(|f| f(value))
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_formats() {
        let r = FormatRegistry::with_defaults();
        assert_eq!(r.check("date", "2024-02-29"), Some(true));
        assert_eq!(r.check("date", "2023-02-29"), Some(false));
        assert_eq!(r.check("time", "23:59:59Z"), Some(true));
        assert_eq!(r.check("time", "24:00:00"), Some(false));
        assert_eq!(r.check("date-time", "2024-01-01T10:00:00Z"), Some(true));
        assert_eq!(r.check("date-time", "2024-01-01"), Some(false));
        assert_eq!(r.check("email", "a@example.com"), Some(true));
        assert_eq!(r.check("email", "nope"), Some(false));
        assert_eq!(r.check("uuid", "123e4567-e89b-12d3-a456-426614174000"), Some(true));
        assert_eq!(r.check("ipv4", "192.168.0.1"), Some(true));
        assert_eq!(r.check("ipv4", "256.0.0.1"), Some(false));
        assert_eq!(r.check("ipv6", "::1"), Some(true));
        assert_eq!(r.check("hostname", "example.com"), Some(true));
        assert_eq!(r.check("uri", "https://example.com/x?y=1"), Some(true));
        assert_eq!(r.check("regex", "("), Some(false));
        assert_eq!(r.check("unknown", "x"), None);
    }

    #[test]
    fn custom_formats_can_be_added_and_removed() {
        let r = FormatRegistry::new();
        r.set("even-length", |s| s.len() % 2 == 0);
        assert!(r.has("even-length"));
        assert_eq!(r.check("even-length", "ab"), Some(true));
        assert!(r.remove("even-length"));
        assert!(!r.has("even-length"));
    }
}
