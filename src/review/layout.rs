//! Word-wrap layout for transcript units.
//!
//! Maps each timed unit to the screen spans it occupies, so the renderer can
//! style spans by unit state and the mouse handler can hit-test a click back
//! to a unit index. Pure geometry; no terminal access.

/// A run of one unit's text on a single layout line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSpan {
    /// Index of the unit this span belongs to.
    pub unit: usize,
    /// Column where the span starts, in cells.
    pub col: u16,
    /// Span text as rendered.
    pub text: String,
}

/// A wrapped transcript: one entry per screen line.
#[derive(Debug, Default)]
pub struct TranscriptLayout {
    lines: Vec<Vec<UnitSpan>>,
    /// First layout line of each unit, indexed by unit.
    first_line: Vec<usize>,
}

impl TranscriptLayout {
    /// Wraps unit texts into lines of at most `width` cells.
    ///
    /// Tokens are placed greedily and joined with single spaces; a token
    /// longer than the full width is hard-split. Width zero yields an empty
    /// layout.
    pub fn build(unit_texts: &[&str], width: u16) -> Self {
        if width == 0 {
            return Self {
                lines: Vec::new(),
                first_line: vec![0; unit_texts.len()],
            };
        }

        let width = width as usize;
        let mut lines: Vec<Vec<UnitSpan>> = vec![Vec::new()];
        let mut first_line = vec![usize::MAX; unit_texts.len()];
        let mut col = 0usize;

        for (unit, text) in unit_texts.iter().enumerate() {
            for token in text.split_whitespace() {
                for piece in split_oversized(token, width) {
                    // A piece on a non-empty line needs a separating space.
                    if col > 0 && col + 1 + piece.len() > width {
                        lines.push(Vec::new());
                        col = 0;
                    }

                    let line_index = lines.len() - 1;
                    let start_col = if col > 0 { col + 1 } else { 0 };

                    if first_line[unit] == usize::MAX {
                        first_line[unit] = line_index;
                    }

                    // Merge with a preceding span of the same unit on this line.
                    let line = &mut lines[line_index];
                    match line.last_mut() {
                        Some(last) if last.unit == unit => {
                            last.text.push(' ');
                            last.text.push_str(piece);
                        }
                        _ => line.push(UnitSpan {
                            unit,
                            col: start_col as u16,
                            text: piece.to_string(),
                        }),
                    }

                    col = start_col + piece.len();
                }
            }
        }

        // Units with no printable tokens anchor to the current last line.
        let fallback = lines.len().saturating_sub(1);
        for entry in &mut first_line {
            if *entry == usize::MAX {
                *entry = fallback;
            }
        }

        Self { lines, first_line }
    }

    pub fn lines(&self) -> &[Vec<UnitSpan>] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// First layout line occupied by the given unit.
    pub fn line_of(&self, unit: usize) -> Option<usize> {
        self.first_line.get(unit).copied()
    }

    /// Maps a (line, column) position back to the unit rendered there.
    pub fn hit_test(&self, line: usize, col: u16) -> Option<usize> {
        let spans = self.lines.get(line)?;
        spans
            .iter()
            .find(|span| {
                let end = span.col as usize + span.text.len();
                (span.col as usize..end).contains(&(col as usize))
            })
            .map(|span| span.unit)
    }

    /// Scroll offset that centers `line` within a viewport of `height` rows,
    /// clamped so the last page stays full.
    pub fn centered_scroll(&self, line: usize, height: u16) -> usize {
        let height = height as usize;
        if height == 0 {
            return 0;
        }
        let max_scroll = self.line_count().saturating_sub(height);
        line.saturating_sub(height / 2).min(max_scroll)
    }
}

/// Splits a token into width-sized pieces; tokens that fit pass through.
fn split_oversized(token: &str, width: usize) -> Vec<&str> {
    if token.len() <= width {
        return vec![token];
    }

    let mut pieces = Vec::new();
    let mut rest = token;
    while rest.len() > width {
        // Split on a char boundary at or below the width. A single char
        // wider than the whole line passes through intact.
        let mut cut = width;
        while cut > 0 && !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        if cut == 0 {
            cut = rest
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
        }
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(layout: &TranscriptLayout) -> Vec<String> {
        layout
            .lines()
            .iter()
            .map(|spans| {
                let mut line = String::new();
                for span in spans {
                    while line.len() < span.col as usize {
                        line.push(' ');
                    }
                    line.push_str(&span.text);
                }
                line
            })
            .collect()
    }

    #[test]
    fn short_transcript_fits_one_line() {
        let layout = TranscriptLayout::build(&["patient", "denies", "pain"], 80);
        assert_eq!(layout.line_count(), 1);
        assert_eq!(texts(&layout), vec!["patient denies pain"]);
        assert_eq!(layout.line_of(0), Some(0));
        assert_eq!(layout.line_of(2), Some(0));
    }

    #[test]
    fn words_wrap_at_width() {
        let layout = TranscriptLayout::build(&["patient", "denies", "pain"], 14);
        assert_eq!(texts(&layout), vec!["patient denies", "pain"]);
        assert_eq!(layout.line_of(2), Some(1));
    }

    #[test]
    fn hit_test_maps_columns_to_units() {
        let layout = TranscriptLayout::build(&["patient", "denies", "pain"], 80);
        assert_eq!(layout.hit_test(0, 0), Some(0));
        assert_eq!(layout.hit_test(0, 6), Some(0));
        assert_eq!(layout.hit_test(0, 8), Some(1));
        assert_eq!(layout.hit_test(0, 15), Some(2));
        // The space between words belongs to no unit.
        assert_eq!(layout.hit_test(0, 7), None);
        assert_eq!(layout.hit_test(3, 0), None);
    }

    #[test]
    fn multi_word_segment_spans_merge_on_a_line() {
        let layout = TranscriptLayout::build(&["patient denies pain", "will follow up"], 80);
        let spans = &layout.lines()[0];
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].unit, 0);
        assert_eq!(spans[0].text, "patient denies pain");
        assert_eq!(spans[1].unit, 1);
    }

    #[test]
    fn oversized_token_is_hard_split() {
        let layout = TranscriptLayout::build(&["pneumonoultramicroscopic"], 10);
        assert!(layout.line_count() >= 2);
        assert!(texts(&layout).iter().all(|l| l.len() <= 10));
    }

    #[test]
    fn centered_scroll_clamps_at_both_ends() {
        let unit_texts: Vec<String> = (0..40).map(|i| format!("word{i}")).collect();
        let refs: Vec<&str> = unit_texts.iter().map(|s| s.as_str()).collect();
        let layout = TranscriptLayout::build(&refs, 10);
        let lines = layout.line_count();
        assert!(lines > 20);

        // Near the top: no scrolling.
        assert_eq!(layout.centered_scroll(0, 10), 0);
        // Middle: active line sits at the center.
        assert_eq!(layout.centered_scroll(lines / 2, 10), lines / 2 - 5);
        // Bottom: clamped to keep the last page full.
        assert_eq!(layout.centered_scroll(lines - 1, 10), lines - 10);
    }

    #[test]
    fn zero_width_produces_empty_layout() {
        let layout = TranscriptLayout::build(&["patient"], 0);
        assert_eq!(layout.line_count(), 0);
        assert_eq!(layout.hit_test(0, 0), None);
    }
}
