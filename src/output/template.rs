//! Markdown templates with `{{Name}}` placeholders

use crate::error::Result;
use crate::processing::document::DocumentKind;
use log::info;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Placeholder name to replacement text
pub type Substitutions = BTreeMap<String, String>;

pub struct TemplateRenderer {
    placeholder: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self {
            placeholder: Regex::new(r"\{\{([^{}\n]+)\}\}").expect("Invalid placeholder regex"),
        }
    }

    /// Replace every `{{Name}}` that has an entry in `substitutions`.
    ///
    /// Single pass: inserted values are never scanned again, and names
    /// without an entry stay in the output verbatim.
    pub fn render(&self, template: &str, substitutions: &Substitutions) -> String {
        self.render_tracked(template, substitutions).0
    }

    /// Render and return the names that had no substitution, in order of
    /// first appearance in the template. Braces inside inserted values are
    /// not counted.
    pub fn render_tracked(
        &self,
        template: &str,
        substitutions: &Substitutions,
    ) -> (String, Vec<String>) {
        let mut unresolved: Vec<String> = Vec::new();
        let text = self
            .placeholder
            .replace_all(template, |caps: &Captures<'_>| match substitutions.get(&caps[1]) {
                Some(value) => value.clone(),
                None => {
                    if !unresolved.iter().any(|name| name == &caps[1]) {
                        unresolved.push(caps[1].to_string());
                    }
                    caps[0].to_string()
                }
            })
            .into_owned();
        (text, unresolved)
    }

    /// Names of placeholders still present, in order of first appearance.
    pub fn unresolved_placeholders(&self, text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in self.placeholder.captures_iter(text) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Drop bullet lines that only contain the bullet marker after rendering.
pub fn strip_empty_bullets(text: &str) -> String {
    let mut kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !((trimmed.starts_with('-') || trimmed.starts_with('*')) && trimmed.len() <= 2)
        })
        .collect();

    if text.ends_with('\n') {
        kept.push("");
    }
    kept.join("\n")
}

/// Loads templates from disk, seeding missing ones with the built-in defaults
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, kind: DocumentKind) -> PathBuf {
        self.dir.join(kind.template_file_name())
    }

    pub fn load(&self, kind: DocumentKind) -> Result<String> {
        let path = self.path(kind);
        if !path.exists() {
            self.write_default(kind)?;
        }
        Ok(std::fs::read_to_string(&path)?)
    }

    /// Write any missing default templates, returning the files created.
    pub fn ensure_defaults(&self) -> Result<Vec<PathBuf>> {
        let mut created = Vec::new();
        for kind in DocumentKind::ALL {
            if !self.path(kind).exists() {
                created.push(self.write_default(kind)?);
            }
        }
        Ok(created)
    }

    fn write_default(&self, kind: DocumentKind) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path(kind);
        std::fs::write(&path, default_template(kind))?;
        info!("Created default {} template: {}", kind, path.display());
        Ok(path)
    }
}

pub fn default_template(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Resume => DEFAULT_RESUME_TEMPLATE,
        DocumentKind::CoverLetter => DEFAULT_COVER_LETTER_TEMPLATE,
    }
}

const DEFAULT_RESUME_TEMPLATE: &str = "# {{Your Full Name}}

**Email:** {{Your Email}} | **Phone:** {{Your Phone Number}} | **Location:** {{Your Location}}
**LinkedIn:** {{Your LinkedIn URL}}

## Professional Summary

{{CustomSummary}}

## Skills

{{Skills}}

## Relevant Coursework

{{Coursework}}

## Experience

{{ExperienceSection}}

## Education

**{{Degree}}**
{{School}} | {{GraduationYear}}

## Volunteer

{{VolunteerSection}}
";

const DEFAULT_COVER_LETTER_TEMPLATE: &str = "{{Your Full Name}}
{{Your Email}} | {{Your Phone Number}}
{{Your Location}}

{{HiringManagerName}}
{{Company}}

Dear {{HiringManagerName}},

I am writing to express my strong interest in the {{JobTitle}} position at {{Company}}. As a {{YourField}} professional with experience in {{Skill1}} and {{Skill2}}, I am excited about the opportunity to contribute to your team.

{{CustomParagraphFromAI}}

My background includes:
- {{BulletPoint1a}}
- {{BulletPoint1b}}
- {{BulletPoint2a}}

I am particularly drawn to {{Company}} because of your innovative approach and commitment to excellence. I would welcome the opportunity to discuss how my skills and experience can contribute to your team's success.

Thank you for your time and consideration. I look forward to hearing from you.

Sincerely,
{{Your Full Name}}
";
