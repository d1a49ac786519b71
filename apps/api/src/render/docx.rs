//! DOCX export via `docx-rs`.
//!
//! ATS-friendly single column: real heading styles, a bullet numbering
//! definition for achievements and right-aligned tab stops for dates, so the
//! document stays editable in Word rather than being a picture of the preview.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, LineSpacing,
    NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, Pic, Run, SpecialIndentType,
    Start, Style, StyleType, Tab, TabValueType,
};
use image::ImageFormat;
use tracing::warn;

use super::html::sanitize_url;
use super::ExportError;
use crate::models::{CvData, Photo};

// A4 in twentieths of a point, 20 mm margins.
const PAGE_WIDTH_TWIPS: u32 = 11_906;
const PAGE_HEIGHT_TWIPS: u32 = 16_838;
const MARGIN_TWIPS: i32 = 1_134;
/// Right edge of the text block, used for right-aligned tab stops.
const RIGHT_TAB_POS: usize = (PAGE_WIDTH_TWIPS as usize) - 2 * (MARGIN_TWIPS as usize);

const BULLET_ABSTRACT_ID: usize = 1;
const BULLET_NUMBERING_ID: usize = 1;

const GOLD: &str = "C5A059";
const DARK: &str = "0F172A";
const MUTED: &str = "6B7280";

/// Photo width on the page: 28 mm in EMU.
const PHOTO_WIDTH_EMU: u32 = 28 * 36_000;

fn styles(docx: Docx) -> Docx {
    docx.add_style(
        Style::new("Title", StyleType::Paragraph)
            .name("Title")
            .size(44)
            .bold()
            .color(DARK),
    )
    .add_style(
        Style::new("Heading1", StyleType::Paragraph)
            .name("Heading 1")
            .size(21)
            .bold()
            .color(DARK),
    )
}

fn bullet_numbering(docx: Docx) -> Docx {
    docx.add_abstract_numbering(
        AbstractNumbering::new(BULLET_ABSTRACT_ID).add_level(
            Level::new(
                0,
                Start::new(1),
                NumberFormat::new("bullet"),
                LevelText::new("•"),
                LevelJc::new("left"),
            )
            .indent(Some(360), Some(SpecialIndentType::Hanging(240)), None, None),
        ),
    )
    .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_ABSTRACT_ID))
}

fn spaced(paragraph: Paragraph, before: u32, after: u32) -> Paragraph {
    paragraph.line_spacing(LineSpacing::new().before(before).after(after))
}

fn section_heading(title: &str) -> Paragraph {
    spaced(
        Paragraph::new()
            .style("Heading1")
            .add_run(Run::new().add_text(title.to_uppercase()).bold().size(21).color(DARK)),
        240,
        80,
    )
}

/// Left text and right text separated by a right-aligned tab stop at the margin.
fn tabbed_line(left: Run, right: Option<Run>) -> Paragraph {
    let mut paragraph = Paragraph::new()
        .add_tab(Tab::new().val(TabValueType::Right).pos(RIGHT_TAB_POS))
        .add_run(left);
    if let Some(right) = right {
        paragraph = paragraph.add_run(right.add_tab_first());
    }
    paragraph
}

/// `Run::add_tab` appends; dates need the tab before their text.
trait TabFirst {
    fn add_tab_first(self) -> Run;
}

impl TabFirst for Run {
    fn add_tab_first(self) -> Run {
        let mut run = Run::new().add_tab();
        run.run_property = self.run_property;
        run.children.extend(self.children);
        run
    }
}

/// docx-rs stores every media part as `.png`, so the photo is re-encoded first.
fn photo_paragraph(data_url: &str) -> Option<Paragraph> {
    let photo = match Photo::decode(data_url) {
        Ok(photo) => photo,
        Err(e) => {
            warn!("Skipping photo in DOCX export: {e}");
            return None;
        }
    };
    let image = match image::load_from_memory(&photo.bytes) {
        Ok(image) => image,
        Err(e) => {
            warn!("Skipping {} photo in DOCX export: {e}", photo.mime);
            return None;
        }
    };
    let (width_px, height_px) = (image.width(), image.height());
    if width_px == 0 || height_px == 0 {
        return None;
    }
    let mut png = Vec::new();
    if let Err(e) = image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
        warn!("Skipping photo in DOCX export: PNG encoding failed: {e}");
        return None;
    }

    let height_emu =
        (u64::from(PHOTO_WIDTH_EMU) * u64::from(height_px) / u64::from(width_px)) as u32;
    let pic = Pic::new_with_dimensions(png, width_px, height_px).size(PHOTO_WIDTH_EMU, height_emu);
    Some(Paragraph::new().add_run(Run::new().add_image(pic)))
}

fn build(cv: &CvData) -> Docx {
    let mut docx = Docx::new()
        .page_size(PAGE_WIDTH_TWIPS, PAGE_HEIGHT_TWIPS)
        .page_margin(
            PageMargin::new()
                .top(MARGIN_TWIPS)
                .bottom(MARGIN_TWIPS)
                .left(MARGIN_TWIPS)
                .right(MARGIN_TWIPS),
        );
    docx = bullet_numbering(styles(docx));

    if let Some(paragraph) = cv.photo.as_deref().and_then(photo_paragraph) {
        docx = docx.add_paragraph(paragraph);
    }

    // Header
    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Title")
            .add_run(Run::new().add_text(cv.full_name.to_uppercase()).bold().size(44).color(DARK)),
    );
    if !cv.professional_title.is_empty() {
        docx = docx.add_paragraph(spaced(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(cv.professional_title.to_uppercase())
                    .size(24)
                    .color(GOLD),
            ),
            0,
            80,
        ));
    }
    let linkedin = cv
        .contact
        .linkedin
        .as_deref()
        .filter(|l| !l.trim().is_empty())
        .map(sanitize_url)
        .filter(|l| l != "#");
    let contact: Vec<&str> = [
        cv.contact.location.as_str(),
        cv.contact.email.as_str(),
        cv.contact.phone.as_str(),
        linkedin.as_deref().unwrap_or(""),
    ]
    .into_iter()
    .filter(|s| !s.trim().is_empty())
    .collect();
    if !contact.is_empty() {
        docx = docx.add_paragraph(spaced(
            Paragraph::new().add_run(Run::new().add_text(contact.join("  |  ")).size(18).color(MUTED)),
            0,
            120,
        ));
    }

    if !cv.summary.trim().is_empty() {
        docx = docx
            .add_paragraph(section_heading("Professional Profile"))
            .add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Both)
                    .add_run(Run::new().add_text(&cv.summary).size(20)),
            );
    }

    if !cv.experience.is_empty() {
        docx = docx.add_paragraph(section_heading("Professional Experience"));
        for exp in &cv.experience {
            docx = docx.add_paragraph(spaced(
                tabbed_line(
                    Run::new().add_text(&exp.role).bold().size(22),
                    Some(Run::new().add_text(&exp.dates).bold().size(18).color(GOLD)),
                ),
                160,
                0,
            ));
            docx = docx.add_paragraph(tabbed_line(
                Run::new().add_text(&exp.company).bold().size(20),
                Some(Run::new().add_text(&exp.location).italic().size(18).color(MUTED)),
            ));
            for achievement in &exp.achievements {
                docx = docx.add_paragraph(
                    Paragraph::new()
                        .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0))
                        .add_run(Run::new().add_text(achievement).size(20)),
                );
            }
        }
    }

    if !cv.skills.is_empty() {
        docx = docx
            .add_paragraph(section_heading("Core Competencies"))
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(cv.skills.join("  •  ")).size(20)),
            );
    }

    if !cv.education.is_empty() {
        docx = docx.add_paragraph(section_heading("Education"));
        for edu in &cv.education {
            docx = docx.add_paragraph(tabbed_line(
                Run::new().add_text(&edu.degree).bold().size(20),
                Some(Run::new().add_text(&edu.year).size(18).color(MUTED)),
            ));
            let place = [edu.institution.as_str(), edu.location.as_str()]
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            if !place.is_empty() {
                docx = docx.add_paragraph(spaced(
                    Paragraph::new().add_run(Run::new().add_text(place).size(18).color(MUTED)),
                    0,
                    80,
                ));
            }
        }
    }

    if !cv.languages.is_empty() {
        docx = docx
            .add_paragraph(section_heading("Languages"))
            .add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(cv.languages.join("  •  ")).size(20)),
            );
    }

    docx
}

/// Renders the record as a DOCX document.
pub fn render_docx(cv: &CvData) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    build(cv)
        .build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(buf.into_inner())
}
