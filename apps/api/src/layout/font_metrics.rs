//! Static font-metric tables for the PDF standard fonts used by the exporter.
//!
//! Widths come from the Adobe AFM files for Helvetica and Helvetica-Bold and are
//! in 1/1000 em. Both tables cover ASCII 0x20..=0x7E (95 printable characters);
//! index = (char as usize) - 32. Anything outside that range is measured with
//! `average_char_width`.

/// The two faces the PDF exporter sets text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Regular,
    Bold,
}

impl Face {
    /// PostScript name of the standard Type1 font.
    pub fn base_font(self) -> &'static str {
        match self {
            Face::Regular => "Helvetica",
            Face::Bold => "Helvetica-Bold",
        }
    }

    /// Resource name inside the page's font dictionary.
    pub fn resource_name(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

/// Static character-width table for one face.
pub struct FontMetricTable {
    widths: [u16; 95],
    pub average_char_width: u16,
}

impl FontMetricTable {
    /// Width of a string in points at `size_pt`.
    pub fn measure(&self, s: &str, size_pt: f32) -> f32 {
        s.chars().map(|c| self.char_width(c, size_pt)).sum()
    }

    /// Greedy word wrap into lines no wider than `max_width_pt`.
    ///
    /// A word wider than the line is broken between characters. Whitespace-only
    /// input yields no lines.
    pub fn wrap(&self, s: &str, size_pt: f32, max_width_pt: f32) -> Vec<String> {
        let space_w = self.measure(" ", size_pt);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0.0_f32;

        for word in s.split_whitespace() {
            let word_w = self.measure(word, size_pt);
            if !current.is_empty() && current_width + space_w + word_w <= max_width_pt {
                current.push(' ');
                current.push_str(word);
                current_width += space_w + word_w;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if word_w <= max_width_pt {
                current.push_str(word);
                current_width = word_w;
                continue;
            }
            // Overlong word: fill lines character by character.
            current_width = 0.0;
            for c in word.chars() {
                let char_w = self.char_width(c, size_pt);
                if !current.is_empty() && current_width + char_w > max_width_pt {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0.0;
                }
                current.push(c);
                current_width += char_w;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn char_width(&self, c: char, size_pt: f32) -> f32 {
        let code = c as usize;
        let units = if (32..=126).contains(&code) {
            self.widths[code - 32]
        } else {
            self.average_char_width
        };
        f32::from(units) * size_pt / 1000.0
    }
}

/// Helvetica (regular).
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    average_char_width: 556,
};

/// Helvetica-Bold.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    average_char_width: 611,
};

/// Returns the static metric table for a face.
pub fn get_metrics(face: Face) -> &'static FontMetricTable {
    match face {
        Face::Regular => &HELVETICA_TABLE,
        Face::Bold => &HELVETICA_BOLD_TABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_is_zero() {
        assert_eq!(get_metrics(Face::Regular).measure("", 10.0), 0.0);
    }

    #[test]
    fn test_measure_known_word() {
        // "Dubai" = D(722) + u(556) + b(556) + a(556) + i(222) = 2612 units
        let width = get_metrics(Face::Regular).measure("Dubai", 10.0);
        assert!((width - 26.12).abs() < 1e-3, "got {width}");
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Business Development Manager";
        assert!(
            get_metrics(Face::Bold).measure(text, 11.0)
                > get_metrics(Face::Regular).measure(text, 11.0)
        );
    }

    #[test]
    fn test_non_ascii_uses_average_width() {
        let metrics = get_metrics(Face::Regular);
        assert!((metrics.measure("é", 1000.0) - 556.0).abs() < 1e-3);
    }

    #[test]
    fn test_wrap_respects_width() {
        let metrics = get_metrics(Face::Regular);
        let text = "Spearheaded strategic partnerships across the MENA region, \
                    delivering a 35% uplift in qualified pipeline within 12 months";
        let lines = metrics.wrap(text, 10.0, 200.0);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(metrics.measure(line, 10.0) <= 200.0, "line too wide: {line}");
        }
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let metrics = get_metrics(Face::Regular);
        let lines = metrics.wrap("Supercalifragilistic", 10.0, 30.0);
        assert!(lines.len() > 2);
        for line in &lines {
            assert!(metrics.measure(line, 10.0) <= 30.0, "line too wide: {line}");
        }
        assert_eq!(lines.concat(), "Supercalifragilistic");
    }

    #[test]
    fn test_wrap_blank_input_is_empty() {
        assert!(get_metrics(Face::Bold).wrap("  \n ", 10.0, 100.0).is_empty());
    }
}
