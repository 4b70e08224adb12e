use std::collections::HashMap;
use std::fmt;

use axum::http::{HeaderMap, header};

use crate::session::cookie_value;

pub const LOCALE_COOKIE: &str = "locale";
const LOCALE_COOKIE_MAX_AGE: u32 = 31_536_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    En,
    Ru
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ru];

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ru => "ru"
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::En => "🇺🇸",
            Self::Ru => "🇷🇺"
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code.trim()))
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::En => Self::Ru,
            Self::Ru => Self::En
        }
    }

    /// Picks the page locale.
    ///
    /// An explicit locale wins outright and falls back to English when it is
    /// not supported. Otherwise a supported `locale` cookie is used, then the
    /// best supported `Accept-Language` entry, then English.
    pub fn resolve(explicit: Option<&str>, cookie: Option<&str>, accept_language: Option<&str>) -> Self {
        if let Some(code) = explicit {
            return Self::from_code(code).unwrap_or_default();
        }

        if let Some(locale) = cookie.and_then(Self::from_code) {
            return locale;
        }

        accept_language
            .and_then(Self::from_accept_language)
            .unwrap_or_default()
    }

    pub fn from_request(explicit: Option<&str>, headers: &HeaderMap) -> Self {
        let cookie = cookie_value(headers, LOCALE_COOKIE);
        let accept_language = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Self::resolve(explicit, cookie.as_deref(), accept_language)
    }

    /// Highest `q` among supported languages; on equal weight the entry that
    /// appears first wins.
    fn from_accept_language(header: &str) -> Option<Self> {
        let mut best: Option<(Self, f32)> = None;

        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let tag = parts.next().unwrap_or_default().trim();
            let primary = tag.split(['-', '_']).next().unwrap_or_default();
            let Some(locale) = Self::from_code(primary) else {
                continue;
            };

            let q = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            if !q.is_finite() || q <= 0.0 {
                continue;
            }

            if best.is_none_or(|(_, best_q)| q > best_q) {
                best = Some((locale, q));
            }
        }

        best.map(|(locale, _)| locale)
    }

    pub fn cookie(self) -> String {
        format!(
            "{LOCALE_COOKIE}={}; Path=/; Max-Age={LOCALE_COOKIE_MAX_AGE}; SameSite=Lax",
            self.code()
        )
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

type Table = HashMap<String, String>;

/// Translation tables for every supported locale, embedded at build time.
#[derive(Debug, Clone)]
pub struct Translations {
    tables: HashMap<Locale, Table>
}

impl Translations {
    pub fn load() -> Result<Self, serde_json::Error> {
        let mut tables = HashMap::new();
        tables.insert(Locale::En, serde_json::from_str(include_str!("../locales/en.json"))?);
        tables.insert(Locale::Ru, serde_json::from_str(include_str!("../locales/ru.json"))?);
        Ok(Self { tables })
    }

    pub fn messages(&self, locale: Locale) -> Messages<'_> {
        Messages {
            table: self.tables.get(&locale),
            fallback: self.tables.get(&Locale::En)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Messages<'a> {
    table: Option<&'a Table>,
    fallback: Option<&'a Table>
}

impl<'a> Messages<'a> {
    /// Missing keys fall back to English, then to the key itself.
    pub fn get(&self, key: &'a str) -> &'a str {
        self.table
            .and_then(|t| t.get(key))
            .or_else(|| self.fallback.and_then(|t| t.get(key)))
            .map_or(key, String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_wins_without_explicit_locale() {
        assert_eq!(Locale::resolve(None, Some("ru"), None), Locale::Ru);
        assert_eq!(Locale::resolve(None, Some("ru"), Some("en-US,en;q=0.9")), Locale::Ru);
    }

    #[test]
    fn test_invalid_cookie_falls_through_to_header() {
        assert_eq!(
            Locale::resolve(None, Some("de"), Some("ru-RU,ru;q=0.9,en;q=0.8")),
            Locale::Ru
        );
        assert_eq!(Locale::resolve(None, Some("de"), Some("ru, en")), Locale::Ru);
    }

    #[test]
    fn test_header_order_breaks_ties() {
        assert_eq!(Locale::resolve(None, None, Some("en, ru")), Locale::En);
        assert_eq!(Locale::resolve(None, None, Some("ru, en")), Locale::Ru);
    }

    #[test]
    fn test_header_weight_beats_order() {
        assert_eq!(Locale::resolve(None, None, Some("en;q=0.5, ru;q=0.8")), Locale::Ru);
        assert_eq!(Locale::resolve(None, None, Some("ru;q=0, en;q=0.1")), Locale::En);
    }

    #[test]
    fn test_header_ignores_unusable_weights() {
        assert_eq!(Locale::resolve(None, None, Some("ru;q=NaN, en;q=0.5")), Locale::En);
        assert_eq!(Locale::resolve(None, None, Some("en;q=0.2, ru;q=inf")), Locale::En);
        assert_eq!(Locale::resolve(None, None, Some("ru;q=abc, en;q=0.5")), Locale::Ru);
    }

    #[test]
    fn test_header_ignores_region_lookalikes() {
        // "bg-RU" is Bulgarian, not Russian.
        assert_eq!(Locale::resolve(None, None, Some("bg-RU, en")), Locale::En);
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(Locale::resolve(None, None, None), Locale::En);
        assert_eq!(Locale::resolve(None, Some(""), Some("de-DE, fr")), Locale::En);
    }

    #[test]
    fn test_explicit_locale() {
        assert_eq!(Locale::resolve(Some("ru"), Some("en"), Some("en")), Locale::Ru);
        assert_eq!(Locale::resolve(Some("fr"), Some("ru"), Some("ru")), Locale::En);
    }

    #[test]
    fn test_from_request_reads_cookie_and_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("ru"));
        assert_eq!(Locale::from_request(None, &headers), Locale::Ru);

        headers.insert(header::COOKIE, HeaderValue::from_static("session=x; locale=en"));
        assert_eq!(Locale::from_request(None, &headers), Locale::En);
    }

    #[test]
    fn test_toggle_and_cookie() {
        assert_eq!(Locale::En.toggled(), Locale::Ru);
        assert_eq!(Locale::Ru.toggled(), Locale::En);
        assert_eq!(
            Locale::Ru.cookie(),
            "locale=ru; Path=/; Max-Age=31536000; SameSite=Lax"
        );
    }

    #[test]
    fn test_embedded_tables_share_keys() {
        let translations = Translations::load().unwrap();
        let en = &translations.tables[&Locale::En];
        let ru = &translations.tables[&Locale::Ru];
        let mut missing: Vec<_> = en.keys().filter(|k| !ru.contains_key(*k)).collect();
        missing.sort();
        assert!(missing.is_empty(), "missing ru keys: {missing:?}");
    }

    #[test]
    fn test_messages_fallback() {
        let translations = Translations::load().unwrap();
        let ru = translations.messages(Locale::Ru);
        assert_eq!(translations.messages(Locale::En).get("title"), "DVORFS DOWNLOADER");
        assert_ne!(ru.get("fetch_button"), translations.messages(Locale::En).get("fetch_button"));
        assert_eq!(ru.get("no.such.key"), "no.such.key");
    }
}
