//! Edit commands: the field bindings of the profile edit form.
//!
//! Commands mutate a draft copy of the record. Nothing is trimmed here:
//! list fields are split exactly as typed so in-progress input survives,
//! and `CvData::sanitized` cleans the draft when it is saved.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{CvData, Education, Experience};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Email,
    Phone,
    Location,
    Linkedin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceField {
    Role,
    Company,
    Location,
    Dates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationField {
    Degree,
    Institution,
    Location,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditCommand {
    SetFullName { value: String },
    SetProfessionalTitle { value: String },
    SetSummary { value: String },
    SetContact { field: ContactField, value: String },
    SetSkillsText { text: String },
    SetLanguagesText { text: String },
    AddExperience,
    UpdateExperience { index: usize, field: ExperienceField, value: String },
    SetAchievementsText { index: usize, text: String },
    RemoveExperience { index: usize },
    AddEducation,
    UpdateEducation { index: usize, field: EducationField, value: String },
    RemoveEducation { index: usize },
    RemovePhoto,
}

/// Entry prepended by "Add" in the experience section.
pub fn new_experience_template() -> Experience {
    Experience {
        role: "New Role".to_string(),
        company: "Company".to_string(),
        location: "Dubai, UAE".to_string(),
        dates: "2023 - Present".to_string(),
        achievements: vec!["Key achievement...".to_string()],
    }
}

/// Entry prepended by "Add" in the education section.
pub fn new_education_template() -> Education {
    Education {
        degree: "Degree Name".to_string(),
        institution: "University".to_string(),
        location: "Location".to_string(),
        year: "Year".to_string(),
    }
}

impl EditCommand {
    pub fn apply(self, draft: &mut CvData) -> Result<(), AppError> {
        match self {
            EditCommand::SetFullName { value } => draft.full_name = value,
            EditCommand::SetProfessionalTitle { value } => draft.professional_title = value,
            EditCommand::SetSummary { value } => draft.summary = value,
            EditCommand::SetContact { field, value } => match field {
                ContactField::Email => draft.contact.email = value,
                ContactField::Phone => draft.contact.phone = value,
                ContactField::Location => draft.contact.location = value,
                ContactField::Linkedin => draft.contact.linkedin = Some(value),
            },
            EditCommand::SetSkillsText { text } => draft.skills = split_list(&text, ','),
            EditCommand::SetLanguagesText { text } => draft.languages = split_list(&text, ','),
            EditCommand::AddExperience => draft.experience.insert(0, new_experience_template()),
            EditCommand::UpdateExperience {
                index,
                field,
                value,
            } => {
                let exp = entry_mut(&mut draft.experience, index, "experience")?;
                match field {
                    ExperienceField::Role => exp.role = value,
                    ExperienceField::Company => exp.company = value,
                    ExperienceField::Location => exp.location = value,
                    ExperienceField::Dates => exp.dates = value,
                }
            }
            EditCommand::SetAchievementsText { index, text } => {
                entry_mut(&mut draft.experience, index, "experience")?.achievements =
                    split_list(&text, '\n');
            }
            EditCommand::RemoveExperience { index } => {
                entry_mut(&mut draft.experience, index, "experience")?;
                draft.experience.remove(index);
            }
            EditCommand::AddEducation => draft.education.insert(0, new_education_template()),
            EditCommand::UpdateEducation {
                index,
                field,
                value,
            } => {
                let edu = entry_mut(&mut draft.education, index, "education")?;
                match field {
                    EducationField::Degree => edu.degree = value,
                    EducationField::Institution => edu.institution = value,
                    EducationField::Location => edu.location = value,
                    EducationField::Year => edu.year = value,
                }
            }
            EditCommand::RemoveEducation { index } => {
                entry_mut(&mut draft.education, index, "education")?;
                draft.education.remove(index);
            }
            EditCommand::RemovePhoto => draft.photo = None,
        }
        Ok(())
    }
}

/// Applies commands in order; the first failing command aborts the batch and
/// leaves the draft untouched.
pub fn apply_all(draft: &mut CvData, commands: Vec<EditCommand>) -> Result<(), AppError> {
    let mut working = draft.clone();
    for command in commands {
        command.apply(&mut working)?;
    }
    *draft = working;
    Ok(())
}

fn split_list(text: &str, separator: char) -> Vec<String> {
    text.split(separator).map(str::to_string).collect()
}

fn entry_mut<'a, T>(items: &'a mut [T], index: usize, section: &str) -> Result<&'a mut T, AppError> {
    let len = items.len();
    items.get_mut(index).ok_or_else(|| {
        AppError::Validation(format!(
            "{section} index {index} is out of range ({len} entries)"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CvData {
        CvData {
            full_name: "Aisha Khan".into(),
            experience: vec![Experience {
                role: "Analyst".into(),
                company: "Emirates NBD".into(),
                achievements: vec!["Built models".into()],
                ..Default::default()
            }],
            education: vec![Education {
                degree: "BBA".into(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_commands_deserialize_from_tagged_json() {
        let json = r#"[
            {"op": "set_contact", "field": "linkedin", "value": "linkedin.com/in/aisha"},
            {"op": "update_experience", "index": 0, "field": "dates", "value": "2020 - 2024"},
            {"op": "add_education"},
            {"op": "remove_photo"}
        ]"#;
        let commands: Vec<EditCommand> = serde_json::from_str(json).unwrap();
        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[1],
            EditCommand::UpdateExperience {
                index: 0,
                field: ExperienceField::Dates,
                value: "2020 - 2024".into()
            }
        );
    }

    #[test]
    fn test_skills_text_keeps_raw_segments_while_typing() {
        let mut cv = sample();
        EditCommand::SetSkillsText {
            text: "Negotiation, ROI,".into(),
        }
        .apply(&mut cv)
        .unwrap();
        assert_eq!(cv.skills, vec!["Negotiation", " ROI", ""]);
        assert_eq!(cv.sanitized().skills, vec!["Negotiation", "ROI"]);
    }

    #[test]
    fn test_achievements_split_on_newlines_only() {
        let mut cv = sample();
        EditCommand::SetAchievementsText {
            index: 0,
            text: "Grew revenue by 30%, year on year\n\nLed 5 analysts".into(),
        }
        .apply(&mut cv)
        .unwrap();
        assert_eq!(
            cv.experience[0].achievements,
            vec!["Grew revenue by 30%, year on year", "", "Led 5 analysts"]
        );
    }

    #[test]
    fn test_add_experience_prepends_template() {
        let mut cv = sample();
        EditCommand::AddExperience.apply(&mut cv).unwrap();
        assert_eq!(cv.experience.len(), 2);
        assert_eq!(cv.experience[0], new_experience_template());
        assert_eq!(cv.experience[1].role, "Analyst");
    }

    #[test]
    fn test_remove_education_out_of_range_is_validation_error() {
        let mut cv = sample();
        let err = EditCommand::RemoveEducation { index: 3 }
            .apply(&mut cv)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(cv.education.len(), 1);
    }

    #[test]
    fn test_apply_all_is_atomic() {
        let mut cv = sample();
        let result = apply_all(
            &mut cv,
            vec![
                EditCommand::SetFullName {
                    value: "Changed".into(),
                },
                EditCommand::RemoveExperience { index: 9 },
            ],
        );
        assert!(result.is_err());
        assert_eq!(cv.full_name, "Aisha Khan");
    }

    #[test]
    fn test_update_education_and_contact() {
        let mut cv = sample();
        apply_all(
            &mut cv,
            vec![
                EditCommand::UpdateEducation {
                    index: 0,
                    field: EducationField::Institution,
                    value: "American University of Sharjah".into(),
                },
                EditCommand::SetContact {
                    field: ContactField::Phone,
                    value: "+971 50 000 0000".into(),
                },
            ],
        )
        .unwrap();
        assert_eq!(cv.education[0].institution, "American University of Sharjah");
        assert_eq!(cv.contact.phone, "+971 50 000 0000");
    }
}
