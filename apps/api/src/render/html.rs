//! Print-ready HTML preview of a `CvData` record (A4, two columns).

use url::Url;

use crate::models::CvData;

const STYLE: &str = r#"
        @page { size: A4; margin: 0; }
        * { box-sizing: border-box; }
        body { margin: 0; background: #f3f4f6; font-family: "Helvetica Neue", Arial, sans-serif; color: #334155; }
        .page { width: 210mm; min-height: 297mm; margin: 24px auto; padding: 20mm; background: #fff; box-shadow: 0 10px 30px rgba(0,0,0,.15); }
        header { display: flex; justify-content: space-between; align-items: flex-end; border-bottom: 2px solid #c5a059; padding-bottom: 18px; margin-bottom: 28px; }
        .identity { display: flex; align-items: flex-end; gap: 16px; }
        .photo { width: 28mm; height: 35mm; object-fit: cover; border: 1px solid #e5e7eb; }
        h1 { font-family: Georgia, serif; font-size: 28pt; text-transform: uppercase; letter-spacing: .04em; color: #0f172a; margin: 0 0 6px; }
        .title { color: #c5a059; font-size: 12pt; letter-spacing: .2em; text-transform: uppercase; margin: 0; }
        .contact { text-align: right; font-size: 9.5pt; line-height: 1.6; color: #4b5563; }
        .contact a { color: inherit; text-decoration: none; }
        .columns { display: grid; grid-template-columns: 2fr 1fr; gap: 28px; }
        h3 { font-size: 9.5pt; text-transform: uppercase; letter-spacing: .1em; color: #0f172a; border-bottom: 1px solid #e5e7eb; padding-bottom: 4px; margin: 0 0 10px; }
        section { margin-bottom: 26px; break-inside: avoid; }
        .summary { font-size: 10pt; line-height: 1.6; text-align: justify; }
        .job { border-left: 2px solid #f5f0e6; padding-left: 12px; margin-bottom: 18px; break-inside: avoid; }
        .row { display: flex; justify-content: space-between; align-items: baseline; }
        .role { font-weight: 700; color: #111827; }
        .dates { font-size: 8.5pt; color: #c5a059; white-space: nowrap; }
        .company { font-size: 9.5pt; font-weight: 600; }
        .location { font-size: 8.5pt; font-style: italic; color: #6b7280; }
        .job ul { margin: 6px 0 0 16px; padding: 0; font-size: 9.5pt; line-height: 1.45; }
        .skills { display: flex; flex-wrap: wrap; gap: 6px; }
        .skill { border: 1px solid #e5e7eb; border-radius: 3px; padding: 2px 6px; font-size: 8.5pt; }
        .edu { margin-bottom: 12px; }
        .degree { font-size: 9.5pt; font-weight: 700; color: #111827; }
        .meta { font-size: 8.5pt; color: #6b7280; }
        .languages { list-style: none; margin: 0; padding: 0; font-size: 9.5pt; }
        .languages li { border-bottom: 1px dashed #e5e7eb; padding: 2px 0; }
        .ats { position: fixed; top: 16px; right: 16px; background: #0f172a; color: #fff; padding: 6px 12px; border-radius: 999px; font-size: 9pt; }
        .ats.excellent { background: #15803d; }
        footer { margin-top: 40px; display: flex; justify-content: center; }
        footer div { width: 60px; height: 4px; background: #c5a059; opacity: .5; border-radius: 2px; }
        @media print {
            body { background: #fff; }
            .page { margin: 0; box-shadow: none; }
            .no-print { display: none; }
        }
"#;

/// Escape HTML special characters.
///
/// Replaces: & < > " '
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Makes a user-supplied link safe for an `href`.
///
/// A missing scheme is treated as `https://`. Only http and https survive;
/// anything else (including `javascript:`) and unparsable input become `#`.
pub fn sanitize_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "#".to_string();
    }
    let lower = raw.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    match Url::parse(&with_scheme) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => url.to_string(),
        _ => "#".to_string(),
    }
}

fn section_open(html: &mut String, heading: &str) {
    html.push_str("<section>\n");
    html.push_str(&format!("<h3>{}</h3>\n", escape_html(heading)));
}

/// Renders the record as a standalone HTML document suitable for printing.
pub fn render_html(cv: &CvData) -> String {
    let mut html = String::with_capacity(8 * 1024);
    let title = if cv.full_name.trim().is_empty() {
        "CV".to_string()
    } else {
        format!("{} - CV", cv.full_name)
    };

    html.push_str("<!DOCTYPE html>\n<html lang=\"en-GB\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&title)));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    if let Some(score) = cv.ats_score {
        let class = if cv.is_excellent() { "ats excellent" } else { "ats" };
        html.push_str(&format!(
            "<div class=\"no-print {class}\">ATS Score: {score}/100</div>\n"
        ));
    }

    html.push_str("<div class=\"page\">\n<header>\n<div class=\"identity\">\n");
    if let Some(photo) = cv.photo.as_deref().filter(|p| p.starts_with("data:image/")) {
        html.push_str(&format!(
            "<img class=\"photo\" src=\"{}\" alt=\"Profile photo\">\n",
            escape_html(photo)
        ));
    }
    html.push_str("<div>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&cv.full_name)));
    html.push_str(&format!(
        "<p class=\"title\">{}</p>\n",
        escape_html(&cv.professional_title)
    ));
    html.push_str("</div>\n</div>\n");

    // Contact column
    html.push_str("<div class=\"contact\">\n");
    let contact = &cv.contact;
    if !contact.location.is_empty() {
        html.push_str(&format!("<div>{}</div>\n", escape_html(&contact.location)));
    }
    if !contact.email.is_empty() {
        html.push_str(&format!(
            "<div><a href=\"mailto:{0}\">{0}</a></div>\n",
            escape_html(&contact.email)
        ));
    }
    if !contact.phone.is_empty() {
        html.push_str(&format!("<div>{}</div>\n", escape_html(&contact.phone)));
    }
    if let Some(link) = contact.linkedin.as_deref().filter(|l| !l.trim().is_empty()) {
        html.push_str(&format!(
            "<div><a href=\"{}\" target=\"_blank\" rel=\"noreferrer\">LinkedIn Profile</a></div>\n",
            escape_html(&sanitize_url(link))
        ));
    }
    html.push_str("</div>\n</header>\n");

    html.push_str("<div class=\"columns\">\n<div class=\"main\">\n");

    section_open(&mut html, "Professional Profile");
    html.push_str(&format!(
        "<p class=\"summary\">{}</p>\n</section>\n",
        escape_html(&cv.summary)
    ));

    section_open(&mut html, "Professional Experience");
    for exp in &cv.experience {
        html.push_str("<div class=\"job\">\n");
        html.push_str(&format!(
            "<div class=\"row\"><span class=\"role\">{}</span><span class=\"dates\">{}</span></div>\n",
            escape_html(&exp.role),
            escape_html(&exp.dates)
        ));
        html.push_str(&format!(
            "<div class=\"row\"><span class=\"company\">{}</span><span class=\"location\">{}</span></div>\n",
            escape_html(&exp.company),
            escape_html(&exp.location)
        ));
        if !exp.achievements.is_empty() {
            html.push_str("<ul>\n");
            for achievement in &exp.achievements {
                html.push_str(&format!("<li>{}</li>\n", escape_html(achievement)));
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n</div>\n");

    // Sidebar
    html.push_str("<div class=\"sidebar\">\n");
    section_open(&mut html, "Core Competencies");
    html.push_str("<div class=\"skills\">\n");
    for skill in &cv.skills {
        html.push_str(&format!("<span class=\"skill\">{}</span>\n", escape_html(skill)));
    }
    html.push_str("</div>\n</section>\n");

    section_open(&mut html, "Education");
    for edu in &cv.education {
        html.push_str("<div class=\"edu\">\n");
        html.push_str(&format!("<div class=\"degree\">{}</div>\n", escape_html(&edu.degree)));
        html.push_str(&format!("<div class=\"meta\">{}</div>\n", escape_html(&edu.institution)));
        html.push_str(&format!(
            "<div class=\"row meta\"><span>{}</span><span>{}</span></div>\n",
            escape_html(&edu.location),
            escape_html(&edu.year)
        ));
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n");

    if !cv.languages.is_empty() {
        section_open(&mut html, "Languages");
        html.push_str("<ul class=\"languages\">\n");
        for language in &cv.languages {
            html.push_str(&format!("<li>{}</li>\n", escape_html(language)));
        }
        html.push_str("</ul>\n</section>\n");
    }
    html.push_str("</div>\n</div>\n");

    html.push_str("<footer><div></div></footer>\n</div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::Contact;
    use crate::models::{Education, Experience};

    fn sample() -> CvData {
        CvData {
            full_name: "Aisha Khan".into(),
            professional_title: "Business Associate".into(),
            contact: Contact {
                email: "aisha@example.com".into(),
                phone: "+971 50 123 4567".into(),
                location: "Dubai, UAE".into(),
                linkedin: Some("linkedin.com/in/aishakhan".into()),
            },
            summary: "Strategic partnerships lead across the MENA region.".into(),
            skills: vec!["Stakeholder Management".into(), "ROI Analysis".into()],
            experience: vec![Experience {
                role: "Business Development Manager".into(),
                company: "Emaar".into(),
                location: "Dubai".into(),
                dates: "2019 - Present".into(),
                achievements: vec!["Spearheaded AED 12M in new partnerships".into()],
            }],
            education: vec![Education {
                degree: "MBA".into(),
                institution: "INSEAD".into(),
                location: "Abu Dhabi".into(),
                year: "2018".into(),
            }],
            languages: vec![],
            ats_score: Some(91),
            photo: None,
        }
    }

    #[test]
    fn test_sanitize_url_adds_https() {
        assert_eq!(
            sanitize_url("linkedin.com/in/aisha"),
            "https://linkedin.com/in/aisha"
        );
        assert_eq!(sanitize_url("HTTP://example.com/"), "http://example.com/");
    }

    #[test]
    fn test_sanitize_url_blocks_script_and_garbage() {
        assert_eq!(sanitize_url(""), "#");
        assert_eq!(sanitize_url("   "), "#");
        assert_eq!(sanitize_url("javascript:alert(1)"), "#");
        assert_eq!(sanitize_url("https://"), "#");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"R&D"</b> 'x'"#),
            "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt; &#39;x&#39;"
        );
    }

    #[test]
    fn test_render_contains_sections_and_escapes_content() {
        let mut cv = sample();
        cv.summary = "<script>alert('x')</script>".into();
        let html = render_html(&cv);
        assert!(html.contains("<h1>Aisha Khan</h1>"));
        assert!(html.contains("Professional Experience"));
        assert!(html.contains("Core Competencies"));
        assert!(html.contains("Spearheaded AED 12M in new partnerships"));
        assert!(html.contains("href=\"https://linkedin.com/in/aishakhan\""));
        assert!(html.contains("mailto:aisha@example.com"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("ATS Score: 91/100"));
        assert!(html.contains("ats excellent"));
    }

    #[test]
    fn test_languages_section_omitted_when_empty() {
        let mut cv = sample();
        assert!(!render_html(&cv).contains("Languages"));
        cv.languages = vec!["Arabic".into(), "English".into()];
        let html = render_html(&cv);
        assert!(html.contains("<h3>Languages</h3>"));
        assert!(html.contains("<li>Arabic</li>"));
    }

    #[test]
    fn test_photo_rendered_only_for_image_data_urls() {
        let mut cv = sample();
        cv.photo = Some("javascript:alert(1)".into());
        assert!(!render_html(&cv).contains("class=\"photo\""));
        cv.photo = Some("data:image/png;base64,iVBORw0KGgo=".into());
        assert!(render_html(&cv).contains("src=\"data:image/png;base64,iVBORw0KGgo=\""));
    }
}
