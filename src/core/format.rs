//! Currency formatting with a bounded formatter cache
//!
//! Building a formatter means resolving locale conventions; list pages that
//! format a price per row keep one [`FormatterCache`] and reuse formatters
//! keyed by `(locale, currency)`.

use crate::core::cache::LruCache;
use std::sync::Arc;

/// Default number of formatters kept per cache
pub const DEFAULT_FORMATTER_CAPACITY: usize = 16;

/// Where the currency symbol goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$1,234.50`
    Prefix,
    /// `1.234,50 €`
    Suffix,
}

/// Number conventions of a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleConventions {
    pub group_separator: &'static str,
    pub decimal_separator: char,
    pub symbol_position: SymbolPosition,
}

impl LocaleConventions {
    /// Conventions for a BCP 47 tag, matched on the language and region
    ///
    /// Unknown locales fall back to `en-US` conventions.
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.replace('_', "-").to_ascii_lowercase();
        let language = normalized.split('-').next().unwrap_or_default();
        match (language, normalized.as_str()) {
            (_, "de-ch") => Self::new("'", '.', SymbolPosition::Prefix),
            ("fr", _) => Self::new("\u{202f}", ',', SymbolPosition::Suffix),
            ("de" | "es" | "it" | "nl" | "pt", _) => Self::new(".", ',', SymbolPosition::Suffix),
            ("pl" | "cs" | "sv" | "nb" | "fi", _) => Self::new("\u{a0}", ',', SymbolPosition::Suffix),
            _ => Self::new(",", '.', SymbolPosition::Prefix),
        }
    }

    const fn new(
        group_separator: &'static str,
        decimal_separator: char,
        symbol_position: SymbolPosition,
    ) -> Self {
        Self {
            group_separator,
            decimal_separator,
            symbol_position,
        }
    }
}

/// Symbol and minor-unit exponent for an ISO 4217 code
fn currency_info(code: &str) -> (String, u32) {
    match code {
        "USD" => ("$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "CHF" => ("CHF".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        "KRW" => ("₩".to_string(), 0),
        "CAD" => ("CA$".to_string(), 2),
        "AUD" => ("A$".to_string(), 2),
        "BHD" | "KWD" | "OMR" => (code.to_string(), 3),
        other => (other.to_string(), 2),
    }
}

/// Formats minor-unit amounts (cents) for one locale and currency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormatter {
    locale: String,
    currency: String,
    symbol: String,
    exponent: u32,
    conventions: LocaleConventions,
}

impl CurrencyFormatter {
    pub fn new(locale: &str, currency: &str) -> Self {
        let currency = currency.to_ascii_uppercase();
        let (symbol, exponent) = currency_info(&currency);
        Self {
            locale: locale.to_string(),
            currency,
            symbol,
            exponent,
            conventions: LocaleConventions::for_locale(locale),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Format an amount given in the currency's minor unit
    pub fn format_minor(&self, amount: i64) -> String {
        let negative = amount < 0;
        let abs = amount.unsigned_abs();
        let scale = 10u64.pow(self.exponent);
        let major = abs / scale;
        let minor = abs % scale;

        let mut number = group_digits(major, self.conventions.group_separator);
        if self.exponent > 0 {
            number.push(self.conventions.decimal_separator);
            number.push_str(&format!("{:0width$}", minor, width = self.exponent as usize));
        }

        let sign = if negative { "-" } else { "" };
        match self.conventions.symbol_position {
            SymbolPosition::Prefix => format!("{}{}{}", sign, self.symbol, number),
            SymbolPosition::Suffix => format!("{}{}\u{a0}{}", sign, number, self.symbol),
        }
    }
}

fn group_digits(value: u64, separator: &str) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Bounded LRU of formatters keyed by `(locale, currency)`
///
/// Owned by whoever formats; there is no process-wide instance.
#[derive(Debug)]
pub struct FormatterCache {
    formatters: LruCache<(String, String), Arc<CurrencyFormatter>>,
}

impl FormatterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            formatters: LruCache::new(capacity),
        }
    }

    /// Cached formatter, built on first use
    pub fn get(&mut self, locale: &str, currency: &str) -> Arc<CurrencyFormatter> {
        let key = (locale.to_string(), currency.to_ascii_uppercase());
        if let Some(formatter) = self.formatters.get(&key) {
            return Arc::clone(formatter);
        }
        let formatter = Arc::new(CurrencyFormatter::new(locale, currency));
        if let Some(((locale, currency), _)) = self.formatters.insert(key, Arc::clone(&formatter)) {
            tracing::trace!(%locale, %currency, "evicted currency formatter");
        }
        formatter
    }

    pub fn format_minor(&mut self, locale: &str, currency: &str, amount: i64) -> String {
        self.get(locale, currency).format_minor(amount)
    }

    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

impl Default for FormatterCache {
    fn default() -> Self {
        Self::new(DEFAULT_FORMATTER_CAPACITY)
    }
}
