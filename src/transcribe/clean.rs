use regex::Regex;
use std::sync::OnceLock;

/// Artifact preambles the STT service sometimes prepends to valid output
fn artifact_patterns() -> &'static Vec<Regex> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)^Transcription by ESO\. Translation by[—\-–]\s*",
            r"(?i)^Transcription by ESO[—\-–]\s*",
            r"(?i)^Translation by[—\-–]\s*",
            r"(?i)^\[Music\]\s*",
            r"(?i)^\[Applause\]\s*",
            r"(?i)^\[Laughter\]\s*",
            r"(?i)^\[Silence\]\s*",
            r"(?i)^\[Background noise\]\s*",
            r"(?i)^\[Noise\]\s*",
            r"(?i)^\[Static\]\s*",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("artifact pattern is valid"))
        .collect()
    })
}

/// Exact prefixes tried after the patterns, for variants with plain dashes
const ARTIFACT_PREFIXES: &[&str] = &[
    "Transcription by ESO. Translation by —",
    "Transcription by ESO. Translation by -",
    "Transcription by ESO. Translation by –",
    "Transcription by ESO —",
    "Transcription by ESO -",
    "Transcription by ESO –",
    "Translation by —",
    "Translation by -",
    "Translation by –",
    "Transcription by ESO.",
    "Translation by",
];

/// Leading words that indicate residual artifacts after cleaning
fn residual_artifact() -> &'static Regex {
    static RESIDUAL: OnceLock<Regex> = OnceLock::new();
    RESIDUAL.get_or_init(|| {
        Regex::new(r"(?i)^(transcription|translation|music|applause|laughter|silence|background|noise|static)")
            .expect("residual pattern is valid")
    })
}

/// Char-wise ASCII-case-insensitive prefix strip
///
/// Never byte-indexes into a re-cased copy, so multibyte characters after
/// (or inside) the matched region stay intact.
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = text;
    for p in prefix.chars() {
        let c = rest.chars().next()?;
        if !c.eq_ignore_ascii_case(&p) {
            return None;
        }
        rest = &rest[c.len_utf8()..];
    }
    Some(rest)
}

/// Strip known transcription-artifact boilerplate and collapse whitespace
///
/// Returns an empty string when nothing but artifacts remains; callers
/// treat results shorter than 2 characters as an empty transcript.
pub fn clean_transcript(raw: &str) -> String {
    let mut cleaned = raw.trim().to_string();

    if cleaned.len() < 2 {
        return cleaned;
    }

    for pattern in artifact_patterns() {
        cleaned = pattern.replace(&cleaned, "").trim().to_string();
    }

    for prefix in ARTIFACT_PREFIXES {
        if let Some(rest) = strip_prefix_ignore_case(&cleaned, prefix) {
            cleaned = rest.trim().to_string();
        }
    }

    // Collapse runs of whitespace
    cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.len() < 2 {
        return String::new();
    }

    // A short remainder still starting with an artifact word is noise
    if residual_artifact().is_match(&cleaned) && cleaned.len() < 50 {
        return String::new();
    }

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_eso_preamble() {
        assert_eq!(
            clean_transcript("Transcription by ESO. Translation by — Hello there"),
            "Hello there"
        );
    }

    #[test]
    fn strips_prefixes_case_insensitively_with_multibyte_text() {
        assert_eq!(
            clean_transcript("TRANSLATION BY — Résumé walkthrough went well"),
            "Résumé walkthrough went well"
        );
        assert_eq!(
            clean_transcript("transcription by eso. translation by — Héllo there"),
            "Héllo there"
        );
    }

    #[test]
    fn strips_bracket_tags() {
        assert_eq!(clean_transcript("[Music] Good morning"), "Good morning");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_transcript("  hello   world  "), "hello world");
    }

    #[test]
    fn artifact_only_input_cleans_to_empty() {
        assert_eq!(clean_transcript("Transcription by ESO."), "");
        assert_eq!(clean_transcript("[Silence]"), "");
    }

    #[test]
    fn passes_normal_text_through() {
        let text = "I built a REST API using Node.js and Postgres.";
        assert_eq!(clean_transcript(text), text);
    }
}
