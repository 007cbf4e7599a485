//! Prompt construction for generated resume and cover letter sections

use crate::config::ModelSettings;
use crate::error::{JobAppError, Result};
use crate::processing::document::DocumentKind;
use crate::profile::Profile;
use log::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Rough size of one token in prompt bytes
const BYTES_PER_TOKEN: usize = 4;

/// Floor for the prompt budget when the context window is tiny or misconfigured
const MIN_PROMPT_BUDGET: usize = 4096;

const RESUME_TRUNCATION_NOTICE: &str = "\n[... existing resume truncated ...]";

/// Everything a section prompt is built from
#[derive(Debug, Clone)]
pub struct PromptInput<'a> {
    pub profile: &'a Profile,
    pub job_listing: &'a str,
    pub extracted_resume: Option<&'a str>,
    pub job_title: &'a str,
    pub company: &'a str,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_prompt_len: usize,
}

impl PromptBuilder {
    /// Budget the prompt to what is left of the context window after the
    /// completion's `max_tokens`.
    pub fn new(settings: &ModelSettings) -> Self {
        let prompt_tokens = settings
            .context_window
            .saturating_sub(settings.max_tokens as usize);
        Self::with_budget((prompt_tokens * BYTES_PER_TOKEN).max(MIN_PROMPT_BUDGET))
    }

    pub fn with_budget(max_prompt_len: usize) -> Self {
        Self { max_prompt_len }
    }

    pub fn max_prompt_len(&self) -> usize {
        self.max_prompt_len
    }

    pub fn build(&self, input: &PromptInput<'_>, kind: DocumentKind) -> Result<String> {
        if input.job_listing.trim().is_empty() {
            return Err(JobAppError::InvalidInput("Job listing is empty".to_string()));
        }

        let section = kind.section_name();
        let head = format!(
            "Based on the following job listing and my personal information, write a concise and professional {section}.\n\n"
        );
        let body = self.essential_context(input)?;
        let tail = format!(
            "EXAMPLE {} CONTENT:\n{}\n---\n\n{}\n\n{}",
            section.to_uppercase(),
            example_content(kind, input.job_title),
            section_instructions(kind),
            critical_requirements(section, input.company),
        );

        let fixed_len = head.len() + body.len() + tail.len();
        let resume_section = match input.extracted_resume.map(str::trim) {
            Some(resume) if !resume.is_empty() => {
                self.resume_section(resume, self.max_prompt_len.saturating_sub(fixed_len))
            }
            _ => String::new(),
        };

        Ok(format!("{head}{body}{resume_section}{tail}"))
    }

    /// Listing, title, company, education and profile; never truncated.
    fn essential_context(&self, input: &PromptInput<'_>) -> Result<String> {
        let profile_json = serde_json::to_string_pretty(input.profile)?;
        let education = input.profile.personal_info.education();

        Ok(format!(
            "---\nJOB LISTING:\n{}\n---\n\nJOB TITLE: {}\n---\n\n\
             PERSONAL INFORMATION (ONLY use this information for facts about my background):\n{}\n---\n\n\
             TARGET COMPANY NAME:\n{}\n---\n\n\
             EDUCATION STATUS: {}\n---\n\n",
            input.job_listing.trim(),
            input.job_title,
            profile_json,
            input.company,
            education.education_line,
        ))
    }

    fn resume_section(&self, resume: &str, available: usize) -> String {
        let header = "EXISTING RESUME (supplementary context; prefer PERSONAL INFORMATION when they disagree):\n";
        let footer = "\n---\n\n";
        let overhead = header.len() + footer.len();

        if resume.len() + overhead <= available {
            return format!("{header}{resume}{footer}");
        }

        let room = available.saturating_sub(overhead + RESUME_TRUNCATION_NOTICE.len());
        if room == 0 {
            warn!("Prompt budget exhausted, leaving the existing resume out of the prompt");
            return String::new();
        }

        warn!(
            "Existing resume is {} bytes, truncating to {} to fit the prompt budget",
            resume.len(),
            room
        );
        format!("{header}{}{RESUME_TRUNCATION_NOTICE}{footer}", truncate_graphemes(resume, room))
    }
}

/// Longest prefix of `text` that fits in `max_len` bytes without splitting a grapheme.
pub fn truncate_graphemes(text: &str, max_len: usize) -> &str {
    let mut end = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        if idx + grapheme.len() > max_len {
            break;
        }
        end = idx + grapheme.len();
    }
    &text[..end]
}

fn example_content(kind: DocumentKind, job_title: &str) -> String {
    match kind {
        DocumentKind::Resume => format!(
            "Highly motivated and results-oriented professional with X years of experience in [YourField], \
             skilled in [Skill1] and [Skill2]. Seeking to leverage expertise in [Area] to contribute as a {job_title}."
        ),
        DocumentKind::CoverLetter => format!(
            "My experience in [relevant experience] aligns perfectly with the requirements for the {job_title} position, \
             particularly my proficiency in [specific skill] and my track record in [achievement]. I am confident that my \
             background in [area] and proven ability to [accomplishment] would enable me to make meaningful contributions to your team."
        ),
    }
}

fn section_instructions(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Resume => {
            "The summary should be a concise paragraph (2-4 sentences) for a resume. \
             Focus on your key skills, experiences, and career goals relevant to the job. \
             DO NOT include salutations, closings, or any conversational filler. \
             It should directly start with your qualifications. \
             DO NOT mention any company names in the summary - this is for a resume. \
             Provide ONLY the summary content, nothing else."
        }
        DocumentKind::CoverLetter => {
            "Write ONLY a single middle paragraph for a cover letter (not the opening or closing). \
             This paragraph should connect your experience and skills directly to the job requirements. \
             You MAY mention the company name when relevant to show specific interest. \
             DO NOT include:\n\
             - Opening greetings (Dear..., Hello..., etc.)\n\
             - Closing statements (Sincerely, Best regards, Thank you, etc.)\n\
             - Generic openings like 'I am writing to express interest...'\n\
             - Any signature lines or contact information\n\
             Focus ONLY on highlighting your relevant qualifications and what you can contribute. \
             Start directly with your qualifications or experience."
        }
    }
}

fn critical_requirements(section: &str, company: &str) -> String {
    format!(
        "CRITICAL REQUIREMENTS:\n\
         - When referring to the company, ALWAYS use the 'TARGET COMPANY NAME' provided: {company}\n\
         - When mentioning education, use the exact phrasing from 'EDUCATION STATUS' above\n\
         - DO NOT invent or fabricate any information, including skills, experiences, degrees, or certifications \
         that are not explicitly present in the 'PERSONAL INFORMATION' section\n\
         - Tailor the content by emphasizing and rephrasing EXISTING information from 'PERSONAL INFORMATION' to align with the 'JOB LISTING'\n\
         - Do not add new, false facts\n\
         - Focus on highlighting transferable skills and relevant experiences from your background\n\
         - Provide ONLY the {section} content, without any conversational filler, explanations, or extra remarks\n\
         - Do not start with phrases like \"Here's the...\" or \"Based on...\""
    )
}

/// Prompt asking the model for nothing but the job title.
pub fn job_title_prompt(job_listing: &str) -> String {
    format!(
        "Extract ONLY the job title from this job listing. Return only the job title, nothing else.\n\n\
         Job Listing:\n{}\n\n\
         Examples of good responses:\n\
         - Software Engineer\n\
         - Marketing Manager\n\
         - Data Scientist\n\
         - Senior Frontend Developer\n\n\
         Respond with ONLY the job title:",
        truncate_graphemes(job_listing, 1000)
    )
}

/// Prompt asking the model what the candidate calls themselves.
pub fn professional_title_prompt(resume_text: &str) -> String {
    format!(
        "Extract the main professional title or field from this resume. Return only the professional title/field, nothing else.\n\n\
         Resume Text:\n{}\n\n\
         Examples of good responses:\n\
         - Software Engineer\n\
         - Marketing Professional\n\
         - Data Scientist\n\
         - Business Analyst\n\
         - Graphic Designer\n\n\
         Respond with ONLY the professional title/field:",
        truncate_graphemes(resume_text, 1500)
    )
}

pub const RESUME_PARSER_SYSTEM_PROMPT: &str = r#"You are an expert resume parser. Your task is to extract structured information from a resume and return it as valid JSON.

IMPORTANT: You must return ONLY valid JSON, no additional text or explanations.

The JSON structure should match this exact format:
{
  "personal_info": {
    "full_name": "extracted name",
    "email": "extracted email",
    "phone": "extracted phone",
    "linkedin": "extracted linkedin url or empty string",
    "location": "extracted location",
    "field": "professional field/title",
    "degree": "highest degree",
    "major": "field of study",
    "school": "university/college name",
    "graduation_year": "year of graduation",
    "degree_status": "completed"
  },
  "skills": ["skill1", "skill2", "skill3", "skill4"],
  "coursework": ["course1", "course2", "course3", "course4"],
  "experience": [
    {
      "job_title": "position title",
      "company": "company name",
      "dates": "employment period",
      "bullet_points": ["achievement or responsibility 1", "achievement or responsibility 2"]
    }
  ],
  "volunteer": [
    {
      "title": "volunteer position title",
      "organization": "organization name",
      "dates": "volunteer period",
      "bullet_points": ["volunteer achievement or responsibility 1"]
    }
  ]
}

Rules:
- Extract only factual information present in the resume
- If information is missing, use empty string "" or empty array []
- For degree_status use "completed", "in_progress" or "expected"
- For experience, include 2-3 most recent/relevant positions with 2-3 key achievements each
- Ensure all JSON is properly formatted and valid"#;

pub fn resume_parse_prompt(resume_text: &str) -> String {
    format!(
        "Parse the following resume text and extract structured information:\n\n\
         RESUME TEXT:\n{}\n\n\
         Return the extracted information as valid JSON following the specified format.",
        resume_text
    )
}
