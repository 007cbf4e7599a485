//! Heuristics for pulling the job title and company out of a pasted listing,
//! and the candidate's own professional title out of a resume

use regex::Regex;

pub const FALLBACK_JOB_TITLE: &str = "Desired Position";
pub const FALLBACK_COMPANY: &str = "Target Company";
pub const FALLBACK_PROFESSIONAL_TITLE: &str = "Professional";

/// Values the model uses when it can't tell what the candidate does.
const GENERIC_FIELDS: &[&str] = &["professional", "employee", "worker"];

pub struct ListingAnalyzer {
    title_patterns: Vec<Regex>,
    title_suffix: Regex,
    company_label: Regex,
    company_after: Vec<Regex>,
}

impl Default for ListingAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingAnalyzer {
    pub fn new() -> Self {
        let title_patterns = [
            r"(?im)^\s*(?:job\s+title|position|role|title)\s*:\s*([^\n\r]+)",
            r"(?im)\b(?:hiring|seeking|looking for)\s+(?:an?\s+)?([^\n\r,.]+?)(?:\s+at\b|\s+for\b|\s+to\b|\s*[.,]|\s*$)",
            r"(?m)^([A-Z][^\n\r]+?)(?:\s+at\b|\s+for\b|\s+-\s)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid job title regex"))
        .collect();

        let company_name = r"([A-Z][A-Za-z0-9&'\-]*(?:\s+[A-Z][A-Za-z0-9&'\-]*){0,3}(?:,?\s+(?:Inc|Ltd|LLC|Corp|Co|GmbH)\.?)?)";
        let company_after = ["at", "join", "for"]
            .iter()
            .map(|kw| Regex::new(&format!(r"\b{}\s+{}", kw, company_name)).expect("Invalid company regex"))
            .collect();

        Self {
            title_patterns,
            title_suffix: Regex::new(r"(?i)\s*\([^)]*\)$|^the\s+").expect("Invalid title cleanup regex"),
            company_label: Regex::new(r"(?im)^\s*(?:company|employer|organi[sz]ation)(?:\s+name)?\s*:\s*([^\n\r]+)")
                .expect("Invalid company label regex"),
            company_after,
        }
    }

    /// Title found by pattern matching alone.
    pub fn job_title(&self, listing: &str) -> Option<String> {
        self.title_patterns.iter().find_map(|pattern| {
            let captured = pattern.captures(listing)?.get(1)?.as_str();
            let title = self.title_suffix.replace_all(captured.trim(), "").trim().to_string();
            let len = title.chars().count();
            (len > 5 && len < 100).then_some(title)
        })
    }

    /// Company from an explicit label or a capitalised name after "at", "join" or "for".
    pub fn company(&self, listing: &str) -> Option<String> {
        let labelled = self
            .company_label
            .captures(listing)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string());

        labelled
            .into_iter()
            .chain(self.company_after.iter().filter_map(|pattern| {
                pattern
                    .captures(listing)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
            }))
            .find(|name| (2..=75).contains(&name.chars().count()))
    }

    /// Override first, then the listing, then the generic fallback.
    pub fn resolve_company(&self, listing: &str, company_override: Option<&str>) -> String {
        company_override
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .or_else(|| self.company(listing))
            .unwrap_or_else(|| FALLBACK_COMPANY.to_string())
    }
}

/// Finds how a candidate describes themselves ("Senior Data Engineer") in
/// resume text
pub struct ProfessionalTitle {
    patterns: Vec<Regex>,
    cleanup: Regex,
}

impl Default for ProfessionalTitle {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfessionalTitle {
    pub fn new() -> Self {
        let patterns = [
            r"(?im)\b(?:objective|summary|profile)\b.*?\b(?:seeking|as|for)\s+(?:an?\s+)?([^\n\r.]+?)(?:\s+position|\s+role|\.|$)",
            r"(?i)\b(?:experienced|skilled|professional)\s+([^\n\r,]+?)(?:\s+with\b|\s+in\b|\s*,)",
            r"(?m)^\s*([A-Z][^\n\r]*?\b(?:Engineer|Developer|Manager|Analyst|Specialist|Coordinator|Director|Designer|Consultant))\b",
            r"(?im)\b(?:title|position|role)\s*:\s*([^\n\r]+)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid professional title regex"))
        .collect();

        Self {
            patterns,
            cleanup: Regex::new(r"(?i)\s*\([^)]*\)$|^the\s+").expect("Invalid title cleanup regex"),
        }
    }

    /// Whether a parsed `field` is missing or too vague to use.
    pub fn needs_replacing(field: &str) -> bool {
        let field = field.trim().to_lowercase();
        field.is_empty() || GENERIC_FIELDS.contains(&field.as_str())
    }

    /// Title found by pattern matching alone.
    pub fn from_resume(&self, resume_text: &str) -> Option<String> {
        self.patterns.iter().find_map(|pattern| {
            let captured = pattern.captures(resume_text)?.get(1)?.as_str();
            let title = self.cleanup.replace_all(captured.trim(), "").trim().to_string();
            let len = title.chars().count();
            (len > 5 && len < 100).then_some(title)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_job_title() {
        let listing = "About us\nJob Title: Senior Backend Engineer (Remote)\nWe build things.";
        assert_eq!(
            ListingAnalyzer::new().job_title(listing).as_deref(),
            Some("Senior Backend Engineer")
        );
    }

    #[test]
    fn test_hiring_phrase_job_title() {
        let listing = "We are hiring a Platform Engineer to scale our infrastructure.";
        assert_eq!(
            ListingAnalyzer::new().job_title(listing).as_deref(),
            Some("Platform Engineer")
        );
    }

    #[test]
    fn test_no_job_title() {
        assert_eq!(ListingAnalyzer::new().job_title("great benefits, apply now"), None);
    }

    #[test]
    fn test_company_from_label_and_phrase() {
        let analyzer = ListingAnalyzer::new();
        assert_eq!(
            analyzer.company("Company: Initech\nRole: Engineer").as_deref(),
            Some("Initech")
        );
        assert_eq!(
            analyzer.company("Senior Rust Engineer at Acme Corp. Must know tokio.").as_deref(),
            Some("Acme Corp")
        );
    }

    #[test]
    fn test_company_override_wins() {
        let analyzer = ListingAnalyzer::new();
        assert_eq!(analyzer.resolve_company("Engineer at Acme", Some(" Globex ")), "Globex");
        assert_eq!(analyzer.resolve_company("Engineer at Acme", Some("  ")), "Acme");
        assert_eq!(analyzer.resolve_company("no company here", None), FALLBACK_COMPANY);
    }

    #[test]
    fn test_professional_title_from_objective() {
        let resume = "Jane Doe\nSummary: seeking a Site Reliability Engineer role.\n";
        assert_eq!(
            ProfessionalTitle::new().from_resume(resume).as_deref(),
            Some("Site Reliability Engineer")
        );
    }

    #[test]
    fn test_professional_title_from_experienced_phrase() {
        let resume = "Experienced marketing strategist with ten years in retail.";
        assert_eq!(
            ProfessionalTitle::new().from_resume(resume).as_deref(),
            Some("marketing strategist")
        );
    }

    #[test]
    fn test_professional_title_from_heading_line() {
        let resume = "Jane Doe\nSenior Backend Developer | Berlin\njane@example.com";
        assert_eq!(
            ProfessionalTitle::new().from_resume(resume).as_deref(),
            Some("Senior Backend Developer")
        );
    }

    #[test]
    fn test_professional_title_not_found() {
        let resume = "Ada Lovelace\nCurrently enrolled in BSc Mathematics";
        assert_eq!(ProfessionalTitle::new().from_resume(resume), None);
    }

    #[test]
    fn test_generic_fields_need_replacing() {
        assert!(ProfessionalTitle::needs_replacing(""));
        assert!(ProfessionalTitle::needs_replacing(" Professional "));
        assert!(ProfessionalTitle::needs_replacing("worker"));
        assert!(!ProfessionalTitle::needs_replacing("Data Scientist"));
    }
}
