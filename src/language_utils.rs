use anyhow::{anyhow, Result};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// The web engines and translate-shell all address languages by their
/// ISO 639-1 code ("en", "id"), so configured codes are resolved through
/// isolang and reduced to that form where one exists.
fn resolve(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => Language::from_639_3(&normalized).or_else(|| {
            // ISO 639-2/B codes that differ from 639-2/T
            let part2t = match normalized.as_str() {
                "fre" => "fra",
                "ger" => "deu",
                "dut" => "nld",
                "chi" => "zho",
                "may" => "msa",
                "per" => "fas",
                "rum" => "ron",
                _ => return None,
            };
            Language::from_639_3(part2t)
        }),
        _ => None,
    }
}

/// Code used when talking to translation engines
pub fn to_engine_code(code: &str) -> Result<String> {
    let lang = resolve(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| lang.to_639_3().to_string()))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let lang = resolve(code).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;
    Ok(lang.to_name().to_string())
}
