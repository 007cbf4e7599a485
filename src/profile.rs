//! Candidate profile: contact details, education, skills and work history

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub linkedin: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub graduation_year: String,
    #[serde(default)]
    pub degree_status: DegreeStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeStatus {
    #[default]
    Completed,
    #[serde(alias = "in-progress", alias = "In Progress")]
    InProgress,
    Expected,
}

impl DegreeStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "completed" => Some(DegreeStatus::Completed),
            "in_progress" | "in progress" => Some(DegreeStatus::InProgress),
            "expected" => Some(DegreeStatus::Expected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub job_title: String,
    pub company: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default)]
    pub bullet_points: Vec<String>,
}

/// Everything the generator knows about the candidate.
///
/// Flattened into the top level of the configuration document, so the
/// JSON keys are `personal_info`, `skills`, `coursework`, `experience`
/// and `volunteer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub coursework: Vec<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub volunteer: Vec<Volunteer>,
}

/// Formatted education strings derived from the degree status
#[derive(Debug, Clone, PartialEq)]
pub struct EducationSummary {
    pub degree_text: String,
    pub education_line: String,
}

impl PersonalInfo {
    pub fn education(&self) -> EducationSummary {
        let base = if self.major.is_empty() {
            self.degree.clone()
        } else {
            format!("{} in {}", self.degree, self.major)
        };

        match self.degree_status {
            DegreeStatus::InProgress => {
                let degree_text = format!("{} (In Progress)", base);
                let education_line = format!(
                    "{}, {}, Expected {}",
                    degree_text, self.school, self.graduation_year
                );
                EducationSummary { degree_text, education_line }
            }
            DegreeStatus::Expected => EducationSummary {
                education_line: format!("{}, {}, Expected {}", base, self.school, self.graduation_year),
                degree_text: base,
            },
            DegreeStatus::Completed => EducationSummary {
                education_line: format!("{}, {}, {}", base, self.school, self.graduation_year),
                degree_text: base,
            },
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        let placeholder_bullets = |prefix: &str| {
            (1..=3)
                .map(|i| format!("{} {}", prefix, i))
                .collect::<Vec<_>>()
        };

        Self {
            personal_info: PersonalInfo {
                full_name: "Your Full Name".to_string(),
                email: "your.email@example.com".to_string(),
                phone: "(555) 123-4567".to_string(),
                linkedin: "https://linkedin.com/in/yourprofile".to_string(),
                location: "City, State".to_string(),
                field: "Your Professional Field".to_string(),
                degree: "Your Degree".to_string(),
                major: "Your Major".to_string(),
                school: "Your University".to_string(),
                graduation_year: "2023".to_string(),
                degree_status: DegreeStatus::Completed,
            },
            skills: (1..=8).map(|i| format!("Skill {}", i)).collect(),
            coursework: (1..=6).map(|i| format!("Course {}", i)).collect(),
            experience: (1..=2)
                .map(|i| Experience {
                    job_title: format!("Job Title {}", i),
                    company: format!("Company {}", i),
                    dates: "Start Date - End Date".to_string(),
                    bullet_points: placeholder_bullets("Achievement or responsibility"),
                })
                .collect(),
            volunteer: vec![Volunteer {
                title: "Volunteer Title 1".to_string(),
                organization: "Volunteer Organization 1".to_string(),
                dates: "Start Date - End Date".to_string(),
                bullet_points: placeholder_bullets("Volunteer responsibility or achievement"),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(status: DegreeStatus) -> PersonalInfo {
        PersonalInfo {
            degree: "BSc".to_string(),
            major: "Computer Science".to_string(),
            school: "State University".to_string(),
            graduation_year: "2026".to_string(),
            degree_status: status,
            ..Profile::default().personal_info
        }
    }

    #[test]
    fn test_education_completed() {
        let edu = info(DegreeStatus::Completed).education();
        assert_eq!(edu.degree_text, "BSc in Computer Science");
        assert_eq!(edu.education_line, "BSc in Computer Science, State University, 2026");
    }

    #[test]
    fn test_education_in_progress() {
        let edu = info(DegreeStatus::InProgress).education();
        assert_eq!(edu.degree_text, "BSc in Computer Science (In Progress)");
        assert!(edu.education_line.ends_with("Expected 2026"));
    }

    #[test]
    fn test_education_without_major() {
        let mut personal = info(DegreeStatus::Expected);
        personal.major.clear();
        let edu = personal.education();
        assert_eq!(edu.degree_text, "BSc");
        assert_eq!(edu.education_line, "BSc, State University, Expected 2026");
    }

    #[test]
    fn test_degree_status_parsing() {
        assert_eq!(DegreeStatus::parse("In-Progress"), Some(DegreeStatus::InProgress));
        assert_eq!(DegreeStatus::parse(" expected "), Some(DegreeStatus::Expected));
        assert_eq!(DegreeStatus::parse("dropped"), None);
    }

    #[test]
    fn test_profile_accepts_missing_optional_sections() {
        let json = r#"{
            "personal_info": {"full_name": "Ada", "email": "ada@example.com", "phone": "1"}
        }"#;
        let profile: Profile = serde_json::from_str(json).unwrap();
        assert!(profile.volunteer.is_empty());
        assert_eq!(profile.personal_info.degree_status, DegreeStatus::Completed);
    }
}
