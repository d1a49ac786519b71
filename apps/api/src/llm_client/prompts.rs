// Prompt constants and the response schema for the CV rewrite.

use serde_json::{json, Value};

/// System instruction for the rewrite: UAE-market executive coach plus the ATS rubric.
pub const CV_SYSTEM_INSTRUCTION: &str = r#"You are an elite Executive Career Coach specialising in the Dubai and UAE job market.
Your task is to rewrite and restructure a user's existing CV into a high-impact "Dubai Business Associate" profile.

Rules for the UAE market:
1. Professionalism: use formal British English (standard in Dubai).
2. Formatting: clean, structured and easy to read.
3. Keywords: emphasise terms such as "Strategic Partnerships", "Business Development", "MENA Region", "Stakeholder Management", "ROI" and "Cross-functional Leadership".
4. Tone: confident and achievement-oriented, yet respectful.
5. Image: Dubai employers value prestige and polish. Present routine tasks as strategic achievements.
6. Structure: open with a strong professional summary that pitches the candidate immediately.

ATS scoring:
Evaluate the resulting CV against Applicant Tracking System criteria:
- Presence of essential contact details (location, email, phone).
- Use of strong action verbs (e.g. Spearheaded, Orchestrated, Optimised).
- Quantifiable achievements (numbers, percentages).
- Clarity of role titles and dates.
- Relevance of skills to a Business Associate role.
Assign a score from 0 to 100. A score above 85 is excellent.

Input: raw text from the user's current CV.
Output: a JSON object that follows the provided schema.
If the input lacks specific details (such as a phone number), use placeholders like "[Phone Number]" but DO NOT invent professional experience.
Rephrase experience bullets so they read as executive-level achievements."#;

/// User prompt template. Replace `{cv_text}` before sending.
pub const CV_TRANSFORM_PROMPT: &str = "Here is the raw text of my current CV: \n\n{cv_text}\n\n \
    Please transform this into a top-tier Dubai Business Associate CV.";

pub fn build_transform_prompt(cv_text: &str) -> String {
    CV_TRANSFORM_PROMPT.replace("{cv_text}", cv_text)
}

/// Response schema in the OpenAPI subset accepted by `responseSchema`.
pub fn cv_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullName": { "type": "STRING" },
            "professionalTitle": {
                "type": "STRING",
                "description": "A strong title like 'Business Associate' or 'Strategic Consultant'"
            },
            "contact": {
                "type": "OBJECT",
                "properties": {
                    "email": { "type": "STRING" },
                    "phone": { "type": "STRING" },
                    "location": { "type": "STRING" },
                    "linkedin": { "type": "STRING" }
                },
                "required": ["email", "location"]
            },
            "summary": {
                "type": "STRING",
                "description": "A compelling 3-4 sentence professional summary."
            },
            "skills": { "type": "ARRAY", "items": { "type": "STRING" } },
            "experience": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "role": { "type": "STRING" },
                        "company": { "type": "STRING" },
                        "location": { "type": "STRING" },
                        "dates": { "type": "STRING" },
                        "achievements": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["role", "company", "achievements"]
                }
            },
            "education": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "degree": { "type": "STRING" },
                        "institution": { "type": "STRING" },
                        "location": { "type": "STRING" },
                        "year": { "type": "STRING" }
                    }
                }
            },
            "languages": { "type": "ARRAY", "items": { "type": "STRING" } },
            "atsScore": { "type": "INTEGER", "description": "ATS Score from 0 to 100" }
        },
        "required": ["fullName", "summary", "experience", "education", "skills", "atsScore"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_cv_text() {
        let prompt = build_transform_prompt("Jane Doe\nSales Lead");
        assert!(prompt.contains("Jane Doe\nSales Lead"));
        assert!(prompt.ends_with("Dubai Business Associate CV."));
        assert!(!prompt.contains("{cv_text}"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = cv_response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec!["fullName", "summary", "experience", "education", "skills", "atsScore"]
        );
        assert_eq!(
            schema["properties"]["experience"]["items"]["required"],
            json!(["role", "company", "achievements"])
        );
    }

    #[test]
    fn test_system_instruction_forbids_invented_experience() {
        assert!(CV_SYSTEM_INSTRUCTION.contains("DO NOT invent professional experience"));
        assert!(CV_SYSTEM_INSTRUCTION.contains("[Phone Number]"));
    }
}
