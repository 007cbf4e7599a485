//! Builds the placeholder values for one application

use crate::output::template::Substitutions;
use crate::processing::document::{DocumentKind, GeneratedContent};
use crate::profile::{Experience, Profile, Volunteer};

const SKILL_SLOTS: usize = 8;
const COURSEWORK_SLOTS: usize = 6;
const JOB_SLOTS: usize = 2;
const VOLUNTEER_SLOTS: usize = 1;
const BULLET_SLOTS: usize = 3;
const MAX_BULLETS: usize = 26;

pub const HIRING_MANAGER: &str = "Hiring Manager";

/// Values for every placeholder the default templates use.
///
/// Numbered slots (`Skill1`, `BulletPoint2c`, ...) are always present up to
/// the fixed minimum counts so templates written for a fuller profile render
/// blanks instead of leaking `{{...}}` markers; profiles with more entries
/// get more slots.
pub fn build_substitutions(
    profile: &Profile,
    job_title: &str,
    company: &str,
    content: &GeneratedContent,
) -> Substitutions {
    let info = &profile.personal_info;
    let education = info.education();
    let mut vars = Substitutions::new();

    let mut set = |key: String, value: &str| {
        vars.insert(key, value.to_string());
    };

    set("JobTitle".into(), job_title);
    set("Company".into(), company);
    set("HiringManagerName".into(), HIRING_MANAGER);
    set("Your Full Name".into(), &info.full_name);
    set("Your Email".into(), &info.email);
    set("Your Phone Number".into(), &info.phone);
    set("Your LinkedIn URL".into(), &info.linkedin);
    set("Your Location".into(), &info.location);
    set("YourField".into(), &info.field);
    set("Degree".into(), &education.degree_text);
    set("Major".into(), &info.major);
    set("School".into(), &info.school);
    set("GraduationYear".into(), &info.graduation_year);
    set("EducationLine".into(), &education.education_line);

    for kind in DocumentKind::ALL {
        set(kind.placeholder().into(), content.get(kind));
    }

    for (i, skill) in padded(&profile.skills, SKILL_SLOTS).enumerate() {
        set(format!("Skill{}", i + 1), skill);
    }
    for (i, course) in padded(&profile.coursework, COURSEWORK_SLOTS).enumerate() {
        set(format!("Coursework{}", i + 1), course);
    }

    for i in 0..profile.experience.len().max(JOB_SLOTS) {
        let job = profile.experience.get(i);
        let n = i + 1;
        set(format!("JobTitle{}", n), job.map_or("", |j| j.job_title.as_str()));
        set(format!("Company{}", n), job.map_or("", |j| j.company.as_str()));
        set(format!("Dates{}", n), job.map_or("", |j| j.dates.as_str()));
        let bullets = job.map_or(&[][..], |j| &j.bullet_points[..]);
        for (letter, bullet) in bullet_letters(bullets) {
            set(format!("BulletPoint{}{}", n, letter), bullet);
        }
    }

    for i in 0..profile.volunteer.len().max(VOLUNTEER_SLOTS) {
        let role = profile.volunteer.get(i);
        let n = i + 1;
        set(format!("VolunteerTitle{}", n), role.map_or("", |v| v.title.as_str()));
        set(format!("VolunteerOrganization{}", n), role.map_or("", |v| v.organization.as_str()));
        set(format!("VolunteerDates{}", n), role.map_or("", |v| v.dates.as_str()));
        let bullets = role.map_or(&[][..], |v| &v.bullet_points[..]);
        for (letter, bullet) in bullet_letters(bullets) {
            set(format!("VolunteerBulletPoint{}{}", n, letter), bullet);
        }
    }

    set("Skills".into(), &bullet_list(&profile.skills));
    set("Coursework".into(), &non_empty(&profile.coursework).join(", "));
    set("ExperienceSection".into(), &experience_section(&profile.experience));
    set("VolunteerSection".into(), &volunteer_section(&profile.volunteer));

    vars
}

fn padded(items: &[String], slots: usize) -> impl Iterator<Item = &str> {
    items
        .iter()
        .map(String::as_str)
        .chain(std::iter::repeat(""))
        .take(items.len().max(slots))
}

fn bullet_letters(bullets: &[String]) -> impl Iterator<Item = (char, &str)> {
    padded(bullets, BULLET_SLOTS)
        .take(MAX_BULLETS)
        .enumerate()
        .map(|(j, bullet)| ((b'a' + j as u8) as char, bullet))
}

fn non_empty(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn bullet_list(items: &[String]) -> String {
    non_empty(items)
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn entry_block(heading: &str, dates: &str, bullets: &[String]) -> String {
    let mut block = format!("### {}", heading);
    if !dates.trim().is_empty() {
        block.push_str(&format!("\n*{}*", dates.trim()));
    }
    let list = bullet_list(bullets);
    if !list.is_empty() {
        block.push('\n');
        block.push_str(&list);
    }
    block
}

fn heading(title: &str, place: &str) -> String {
    match (title.trim(), place.trim()) {
        (t, "") => t.to_string(),
        ("", p) => p.to_string(),
        (t, p) => format!("{} | {}", t, p),
    }
}

fn experience_section(jobs: &[Experience]) -> String {
    jobs.iter()
        .filter(|j| !heading(&j.job_title, &j.company).is_empty())
        .map(|j| entry_block(&heading(&j.job_title, &j.company), &j.dates, &j.bullet_points))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn volunteer_section(roles: &[Volunteer]) -> String {
    roles
        .iter()
        .filter(|v| !heading(&v.title, &v.organization).is_empty())
        .map(|v| entry_block(&heading(&v.title, &v.organization), &v.dates, &v.bullet_points))
        .collect::<Vec<_>>()
        .join("\n\n")
}
