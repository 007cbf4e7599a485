//! Post-processing of raw model output

use crate::processing::document::DocumentKind;
use regex::Regex;

/// Strips chat boilerplate from generated sections
pub struct ResponseCleaner {
    preamble_line: Regex,
    inline_prefix: Regex,
    salutation: Regex,
    generic_opening: Regex,
    closing: Regex,
    stray_line: Regex,
    blank_lines: Regex,
}

impl Default for ResponseCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCleaner {
    pub fn new() -> Self {
        Self {
            preamble_line: Regex::new(
                r"(?im)^(?:here(?:'s| is)|below is|the following is|based on|sure|certainly)\b[^\n]*:[ \t]*$\n?",
            )
            .expect("Invalid preamble regex"),
            inline_prefix: Regex::new(
                r"(?im)^(?:here(?:'s| is)\s+(?:a|the|your)\s+|i'll create\s+|let me create\s+|below is\s+|the following is\s+)",
            )
            .expect("Invalid prefix regex"),
            salutation: Regex::new(r"(?im)^(?:dear|to whom it may concern|hello)\b[^\n]*\n?")
                .expect("Invalid salutation regex"),
            generic_opening: Regex::new(r"(?im)^I am writing to[^\n]*?position\b\.?[ \t]*")
                .expect("Invalid opening regex"),
            closing: Regex::new(
                r"(?ims)^[ \t]*(?:sincerely|best regards|kind regards|yours truly|thank you[^\n]*consideration)\b.*$",
            )
            .expect("Invalid closing regex"),
            stray_line: Regex::new(r"(?im)^(?:I look forward[^\n]*|\[Your Name\][^\n]*)$")
                .expect("Invalid stray line regex"),
            blank_lines: Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)*").expect("Invalid blank line regex"),
        }
    }

    pub fn clean(&self, response: &str, kind: DocumentKind) -> String {
        let mut cleaned = self.preamble_line.replace_all(response.trim(), "").to_string();
        cleaned = self.inline_prefix.replace_all(&cleaned, "").to_string();

        if kind == DocumentKind::CoverLetter {
            cleaned = self.salutation.replace_all(&cleaned, "").to_string();
            cleaned = self.generic_opening.replace_all(&cleaned, "").to_string();
            cleaned = self.closing.replace_all(&cleaned, "").to_string();
            cleaned = self.stray_line.replace_all(&cleaned, "").to_string();
        }

        cleaned = self.blank_lines.replace_all(cleaned.trim(), "\n\n").to_string();

        if kind == DocumentKind::CoverLetter {
            cleaned = first_substantial_paragraph(&cleaned).to_string();
        }

        cleaned.trim().to_string()
    }
}

/// First paragraph longer than a greeting, falling back to the first one.
fn first_substantial_paragraph(text: &str) -> &str {
    let paragraphs: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    paragraphs
        .iter()
        .find(|p| {
            let lower = p.to_lowercase();
            p.len() > 50 && !["dear", "to whom", "hello"].iter().any(|g| lower.starts_with(g))
        })
        .or_else(|| paragraphs.first())
        .copied()
        .unwrap_or(text)
}

/// Normalise a model-proposed job title; `None` if it doesn't look like one.
pub fn clean_job_title(raw: &str) -> Option<String> {
    let prefix = Regex::new(r"(?i)^(?:the\s+)?(?:job\s+title\s+is:?|position:|role:|title:)\s*")
        .expect("Invalid title prefix regex");

    let first_line = raw.trim().lines().next().unwrap_or_default();
    let unquoted = first_line.trim().trim_matches(|c| c == '"' || c == '\'' || c == '*');
    let title = prefix.replace(unquoted, "").trim().trim_end_matches('.').to_string();

    let len = title.chars().count();
    (len > 5 && len < 100).then_some(title)
}

/// Normalise a model-proposed professional title; `None` if it doesn't look like one.
pub fn clean_professional_title(raw: &str) -> Option<String> {
    let prefix = Regex::new(r"(?i)^(?:the\s+)?(?:professional\s+title\s+is:?|field:|title:|profession:)\s*")
        .expect("Invalid professional title prefix regex");

    let first_line = raw.trim().lines().next().unwrap_or_default();
    let unquoted = first_line.trim().trim_matches(|c| c == '"' || c == '\'' || c == '*');
    let title = prefix.replace(unquoted, "").trim().trim_end_matches('.').to_string();

    let len = title.chars().count();
    (len > 3 && len < 100 && !title.contains('{')).then_some(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_letter_keeps_only_body_paragraph() {
        let raw = "Here's the paragraph you asked for:\n\n\
                   Dear Hiring Manager,\n\n\
                   My five years building Rust services at Initech map directly onto Acme's platform needs.\n\n\
                   Sincerely,\nJane";

        let cleaned = ResponseCleaner::new().clean(raw, DocumentKind::CoverLetter);
        assert_eq!(
            cleaned,
            "My five years building Rust services at Initech map directly onto Acme's platform needs."
        );
    }

    #[test]
    fn test_summary_prefix_removed() {
        let raw = "Here is a summary tailored to the role:\nBackend engineer with deep Rust and tokio experience.";
        let cleaned = ResponseCleaner::new().clean(raw, DocumentKind::Resume);
        assert_eq!(cleaned, "Backend engineer with deep Rust and tokio experience.");
    }

    #[test]
    fn test_summary_keeps_multiple_paragraphs() {
        let raw = "First paragraph.\n\n\n\nSecond paragraph.";
        let cleaned = ResponseCleaner::new().clean(raw, DocumentKind::Resume);
        assert_eq!(cleaned, "First paragraph.\n\nSecond paragraph.");
    }

    #[test]
    fn test_clean_job_title() {
        assert_eq!(
            clean_job_title("\"Job title is: Senior Data Engineer\"").as_deref(),
            Some("Senior Data Engineer")
        );
        assert_eq!(clean_job_title("Dev"), None);
        assert_eq!(
            clean_job_title("Site Reliability Engineer\nsome explanation").as_deref(),
            Some("Site Reliability Engineer")
        );
    }

    #[test]
    fn test_clean_professional_title() {
        assert_eq!(
            clean_professional_title("The professional title is: Data Scientist").as_deref(),
            Some("Data Scientist")
        );
        assert_eq!(clean_professional_title("'Field: Nurse'").as_deref(), Some("Nurse"));
        assert_eq!(clean_professional_title("CPA"), None);
        assert_eq!(clean_professional_title("{\"field\": \"x\"}"), None);
    }
}
