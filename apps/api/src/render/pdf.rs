//! PDF export via `lopdf`, set in the Helvetica standard fonts.
//!
//! Single-column layout: header, gold rule, then the sections in reading
//! order. Lines are wrapped with the static metric tables in `layout` and a
//! new page starts whenever the next block would cross the bottom margin.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use tracing::warn;

use super::ExportError;
use crate::layout::{get_metrics, Face, PageConfig, A4};
use crate::models::CvData;

type Rgb = (f32, f32, f32);

const DARK: Rgb = (0.06, 0.09, 0.16);
const GOLD: Rgb = (0.77, 0.63, 0.35);
const BODY: Rgb = (0.2, 0.25, 0.33);
const MUTED: Rgb = (0.42, 0.45, 0.5);
const RULE: Rgb = (0.9, 0.91, 0.92);

const BULLET_INDENT: f32 = 8.0;
const BULLET_TEXT_INDENT: f32 = 18.0;
/// Minimum space between wrapped left text and a right-aligned column.
const COLUMN_GUTTER: f32 = 12.0;

/// Maps a char to its WinAnsiEncoding byte.
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        '\t' | '\n' | '\r' => b' ',
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u32 as u8,
        '€' => 0x80,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        _ => return None,
    };
    Some(byte)
}

/// Encodes for the standard Type1 fonts. Callers check
/// [`unencodable_fields`] first; anything left unmapped becomes '?'.
pub(crate) fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars().map(|c| win_ansi_byte(c).unwrap_or(b'?')).collect()
}

fn encodable(s: &str) -> bool {
    s.chars().all(|c| win_ansi_byte(c).is_some())
}

/// Names of the record fields holding characters the standard fonts cannot
/// show (Arabic script, for example).
pub(crate) fn unencodable_fields(cv: &CvData) -> Vec<&'static str> {
    let all = |items: &[String]| items.iter().all(|s| encodable(s));
    let checks = [
        ("fullName", encodable(&cv.full_name)),
        ("professionalTitle", encodable(&cv.professional_title)),
        (
            "contact",
            encodable(&cv.contact.email)
                && encodable(&cv.contact.phone)
                && encodable(&cv.contact.location)
                && cv.contact.linkedin.as_deref().map_or(true, encodable),
        ),
        ("summary", encodable(&cv.summary)),
        ("skills", all(&cv.skills)),
        (
            "experience",
            cv.experience.iter().all(|e| {
                encodable(&e.role)
                    && encodable(&e.company)
                    && encodable(&e.location)
                    && encodable(&e.dates)
                    && all(&e.achievements)
            }),
        ),
        (
            "education",
            cv.education.iter().all(|e| {
                encodable(&e.degree)
                    && encodable(&e.institution)
                    && encodable(&e.location)
                    && encodable(&e.year)
            }),
        ),
        ("languages", all(&cv.languages)),
    ];
    checks
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| name)
        .collect()
}

/// Accumulates content-stream operations page by page.
struct PdfWriter {
    config: PageConfig,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PdfWriter {
    fn new(config: PageConfig) -> Self {
        Self {
            config,
            pages: Vec::new(),
            ops: Vec::new(),
            y: config.top(),
        }
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.ops);
        self.pages.push(finished);
        self.y = self.config.top();
    }

    /// Starts a new page unless `height` points still fit above the bottom margin.
    fn ensure_space(&mut self, height: f32) {
        if self.y - height < self.config.bottom() && self.y < self.config.top() {
            self.new_page();
        }
    }

    fn text_at(&mut self, face: Face, size: f32, x: f32, y: f32, color: Rgb, text: &str) {
        self.ops.push(Operation::new(
            "rg",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![face.resource_name().into(), size.into()],
        ));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn rule(&mut self, y: f32, color: Rgb, width: f32) {
        self.ops.push(Operation::new(
            "RG",
            vec![color.0.into(), color.1.into(), color.2.into()],
        ));
        self.ops.push(Operation::new("w", vec![width.into()]));
        self.ops.push(Operation::new(
            "m",
            vec![self.config.left().into(), y.into()],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![self.config.right().into(), y.into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    /// Left text with optional right-aligned text sharing its first baseline.
    ///
    /// The right text is wrapped to at most half the text width; the left text
    /// wraps into whatever the right column leaves free.
    fn line(&mut self, left: (Face, f32, Rgb, &str), right: Option<(Face, f32, Rgb, &str)>) {
        let (face, size, color, text) = left;
        let text_width = self.config.text_width();

        let (right_lines, right_width) = match right.filter(|r| !r.3.trim().is_empty()) {
            Some((r_face, r_size, r_color, r_text)) => {
                let metrics = get_metrics(r_face);
                let lines: Vec<(String, f32)> = metrics
                    .wrap(r_text, r_size, text_width / 2.0)
                    .into_iter()
                    .map(|l| {
                        let w = metrics.measure(&l, r_size);
                        (l, w)
                    })
                    .collect();
                let width = lines.iter().map(|(_, w)| *w).fold(0.0, f32::max);
                (
                    lines
                        .into_iter()
                        .map(|(l, w)| (r_face, r_size, r_color, l, w))
                        .collect::<Vec<_>>(),
                    width,
                )
            }
            None => (Vec::new(), 0.0),
        };

        let left_max = if right_lines.is_empty() {
            text_width
        } else {
            text_width - right_width - COLUMN_GUTTER
        };
        let left_lines = get_metrics(face).wrap(text, size, left_max);

        let height = self.config.line_height(size);
        let rows = left_lines.len().max(right_lines.len()).max(1);
        for row in 0..rows {
            self.ensure_space(height);
            self.y -= height;
            let y = self.y;
            if let Some(l) = left_lines.get(row) {
                let x = self.config.left();
                self.text_at(face, size, x, y, color, l);
            }
            if let Some((r_face, r_size, r_color, r_text, r_width)) = right_lines.get(row) {
                let rx = self.config.right() - r_width;
                self.text_at(*r_face, *r_size, rx, y, *r_color, r_text);
            }
        }
    }

    /// Wrapped paragraph starting at `indent` from the left margin.
    fn paragraph(&mut self, face: Face, size: f32, color: Rgb, indent: f32, text: &str) {
        let max_width = self.config.text_width() - indent;
        let height = self.config.line_height(size);
        for wrapped in get_metrics(face).wrap(text, size, max_width) {
            self.ensure_space(height);
            self.y -= height;
            let (x, y) = (self.config.left() + indent, self.y);
            self.text_at(face, size, x, y, color, &wrapped);
        }
    }

    fn bullet(&mut self, size: f32, text: &str) {
        let lines = get_metrics(Face::Regular).wrap(text, size, self.config.text_width() - BULLET_TEXT_INDENT);
        let height = self.config.line_height(size);
        for (i, wrapped) in lines.iter().enumerate() {
            self.ensure_space(height);
            self.y -= height;
            let y = self.y;
            if i == 0 {
                let x = self.config.left() + BULLET_INDENT;
                self.text_at(Face::Regular, size, x, y, GOLD, "•");
            }
            let x = self.config.left() + BULLET_TEXT_INDENT;
            self.text_at(Face::Regular, size, x, y, BODY, wrapped);
        }
    }

    fn gap(&mut self, points: f32) {
        self.y -= points;
    }

    fn section_heading(&mut self, title: &str) {
        // Keep the heading with at least two lines of its content.
        self.ensure_space(self.config.line_height(10.0) * 3.0 + 8.0);
        self.gap(8.0);
        self.line((Face::Bold, 10.0, DARK, &title.to_uppercase()), None);
        let y = self.y - 4.0;
        self.rule(y, RULE, 0.75);
        self.gap(6.0);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

fn layout(cv: &CvData, config: PageConfig) -> Vec<Vec<Operation>> {
    let mut w = PdfWriter::new(config);
    let body = config.body_size_pt;

    // Header
    w.line((Face::Bold, 22.0, DARK, &cv.full_name.to_uppercase()), None);
    if !cv.professional_title.is_empty() {
        w.gap(2.0);
        w.line((Face::Regular, 11.0, GOLD, &cv.professional_title.to_uppercase()), None);
    }
    let contact: Vec<&str> = [
        cv.contact.location.as_str(),
        cv.contact.email.as_str(),
        cv.contact.phone.as_str(),
        cv.contact.linkedin.as_deref().unwrap_or(""),
    ]
    .into_iter()
    .filter(|s| !s.trim().is_empty())
    .collect();
    if !contact.is_empty() {
        w.paragraph(Face::Regular, 9.0, MUTED, 0.0, &contact.join("  |  "));
    }
    let y = w.y - 8.0;
    w.rule(y, GOLD, 1.5);
    w.gap(12.0);

    if !cv.summary.trim().is_empty() {
        w.section_heading("Professional Profile");
        w.paragraph(Face::Regular, body, BODY, 0.0, &cv.summary);
    }

    if !cv.experience.is_empty() {
        w.section_heading("Professional Experience");
        for (i, exp) in cv.experience.iter().enumerate() {
            if i > 0 {
                w.gap(6.0);
            }
            w.ensure_space(config.line_height(11.0) + config.line_height(body) * 2.0);
            w.line(
                (Face::Bold, 11.0, DARK, &exp.role),
                Some((Face::Bold, 9.0, GOLD, &exp.dates)),
            );
            w.line(
                (Face::Bold, body, BODY, &exp.company),
                Some((Face::Regular, 9.0, MUTED, &exp.location)),
            );
            for achievement in &exp.achievements {
                w.bullet(body, achievement);
            }
        }
    }

    if !cv.skills.is_empty() {
        w.section_heading("Core Competencies");
        w.paragraph(Face::Regular, body, BODY, 0.0, &cv.skills.join("  •  "));
    }

    if !cv.education.is_empty() {
        w.section_heading("Education");
        for edu in &cv.education {
            w.line(
                (Face::Bold, body, DARK, &edu.degree),
                Some((Face::Regular, 9.0, MUTED, &edu.year)),
            );
            let place = [edu.institution.as_str(), edu.location.as_str()]
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !place.is_empty() {
                w.paragraph(Face::Regular, 9.0, MUTED, 0.0, &place);
            }
            w.gap(4.0);
        }
    }

    if !cv.languages.is_empty() {
        w.section_heading("Languages");
        w.paragraph(Face::Regular, body, BODY, 0.0, &cv.languages.join("  •  "));
    }

    w.finish()
}

/// Renders the record as an A4 PDF document.
///
/// Fails with [`ExportError::UnsupportedText`] rather than printing '?' when a
/// field holds characters outside WinAnsi.
pub fn render_pdf(cv: &CvData) -> Result<Vec<u8>, ExportError> {
    let unsupported = unencodable_fields(cv);
    if !unsupported.is_empty() {
        warn!(
            "PDF export refused: non-Latin text in {}",
            unsupported.join(", ")
        );
        return Err(ExportError::UnsupportedText(unsupported.join(", ")));
    }

    let config = A4;
    let pages = layout(cv, config);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Face::Regular.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Face::Bold.base_font(),
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Face::Regular.resource_name() => regular_id,
            Face::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), config.width_pt.into(), config.height_pt.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&format!("{} CV", cv.full_name))),
        "Producer" => Object::string_literal("CV Architect"),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buf)
}
