//! Language utilities for ISO language code handling
//!
//! Caption tracks are requested from the downloader with ISO 639-1 codes
//! (`fr`, `en`), while users may type 639-2 codes in either the
//! terminology (`fra`) or bibliographic (`fre`) form.

use anyhow::{anyhow, Result};
use isolang::Language;

/// Bibliographic ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let terminology = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized)
                .map_or(normalized.as_str(), |(_, terminology)| *terminology);
            Language::from_639_3(terminology)
        }
        _ => None,
    }
}

/// Normalize to ISO 639-1 when the language has one, ISO 639-2/T otherwise.
///
/// This is the form caption tracks are named and requested with.
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let lang = lookup(code)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map_or_else(|| lang.to_639_3().to_string(), |part1| part1.to_string()))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    lookup(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}
