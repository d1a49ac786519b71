//! Page geometry in PDF points (1/72 inch).

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Layout parameters for one exported page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
    pub body_size_pt: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub leading: f32,
}

/// A4 portrait with 20 mm margins and 10 pt body text.
pub const A4: PageConfig = PageConfig {
    width_pt: 210.0 * MM_TO_PT,
    height_pt: 297.0 * MM_TO_PT,
    margin_pt: 20.0 * MM_TO_PT,
    body_size_pt: 10.0,
    leading: 1.35,
};

impl PageConfig {
    pub fn text_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }

    pub fn left(&self) -> f32 {
        self.margin_pt
    }

    pub fn right(&self) -> f32 {
        self.width_pt - self.margin_pt
    }

    /// Baseline of the first line on a fresh page.
    pub fn top(&self) -> f32 {
        self.height_pt - self.margin_pt
    }

    pub fn bottom(&self) -> f32 {
        self.margin_pt
    }

    pub fn line_height(&self, size_pt: f32) -> f32 {
        size_pt * self.leading
    }
}
