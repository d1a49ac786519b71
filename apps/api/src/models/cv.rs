use serde::{Deserialize, Serialize};

/// The candidate profile produced by the rewrite and edited by the user.
///
/// Field names follow the camelCase wire shape the model is asked to return.
/// Every collection defaults to empty and every string to "" so a sparse
/// model response still deserializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvData {
    pub full_name: String,
    pub professional_title: String,
    pub contact: Contact,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ats_score: Option<u8>,
    /// `data:<mime>;base64,<bytes>` URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    pub role: String,
    pub company: String,
    pub location: String,
    pub dates: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub year: String,
}

/// Scores of 85 and above are rated excellent.
pub const EXCELLENT_ATS_SCORE: u8 = 85;

/// Raw shape of the model response. `atsScore` arrives as an arbitrary JSON
/// number, so it is read as `f64` and clamped before it becomes a `CvData`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCvData {
    #[serde(flatten)]
    pub data: CvData,
    #[serde(default, rename = "atsScore")]
    pub raw_ats_score: Option<f64>,
}

impl From<RawCvData> for CvData {
    fn from(raw: RawCvData) -> Self {
        let mut data = raw.data;
        data.ats_score = raw
            .raw_ats_score
            .filter(|s| s.is_finite())
            .map(|s| s.round().clamp(0.0, 100.0) as u8);
        data.normalized()
    }
}

impl CvData {
    /// Tidies a freshly generated record: trims the top-level strings and any
    /// empty contact link.
    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.full_name);
        trim_in_place(&mut self.professional_title);
        trim_in_place(&mut self.summary);
        trim_in_place(&mut self.contact.email);
        trim_in_place(&mut self.contact.phone);
        trim_in_place(&mut self.contact.location);
        self.contact.linkedin = self
            .contact
            .linkedin
            .take()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self.ats_score = self.ats_score.map(|s| s.min(100));
        self
    }

    /// Save-time clean-up of an edited draft.
    ///
    /// Skills, languages and achievements are trimmed and empty items dropped.
    /// Experience entries with neither a role nor a company are removed, as is
    /// a blank LinkedIn link.
    pub fn sanitized(mut self) -> Self {
        self.skills = clean_list(self.skills);
        self.languages = clean_list(self.languages);
        self.experience = self
            .experience
            .into_iter()
            .map(|mut exp| {
                exp.achievements = clean_list(exp.achievements);
                exp
            })
            .filter(|exp| !exp.role.is_empty() || !exp.company.is_empty())
            .collect();
        self.contact.linkedin = self.contact.linkedin.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn is_excellent(&self) -> bool {
        self.ats_score.is_some_and(|s| s >= EXCELLENT_ATS_SCORE)
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}
