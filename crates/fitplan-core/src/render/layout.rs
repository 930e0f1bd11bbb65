use super::{Document, Line, LineStyle, Page, RenderOptions};

/// Horizontal offset per indent level, in points.
const INDENT_WIDTH: u32 = 12;
const ELLIPSIS: &str = "...";

/// Running cursor that places lines top to bottom and opens a new page
/// when the next line would cross the bottom margin.
pub(crate) struct Layout<'a> {
    options: &'a RenderOptions,
    pages: Vec<Page>,
    cursor_y: u32,
}

impl<'a> Layout<'a> {
    pub(crate) fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            pages: vec![Page {
                number: 1,
                lines: Vec::new(),
            }],
            cursor_y: options.top_margin,
        }
    }

    pub(crate) fn line(&mut self, style: LineStyle, indent: u8, text: impl AsRef<str>) {
        let height = style.height(self.options.line_height.max(1));
        let bottom = self
            .options
            .page_height
            .saturating_sub(self.options.bottom_margin);
        // A fresh page always takes at least one line, even if it overflows.
        if self.cursor_y + height > bottom && !self.current().lines.is_empty() {
            self.new_page();
        }

        let max_chars = self
            .options
            .max_line_chars
            .saturating_sub(usize::from(indent) * 2);
        let line = Line {
            x: self.options.left_margin + u32::from(indent) * INDENT_WIDTH,
            y: self.cursor_y,
            style,
            indent,
            text: truncate(text.as_ref(), max_chars),
        };
        self.current_mut().lines.push(line);
        self.cursor_y += height;
    }

    /// Blank space of half a line. Dropped at the top of a page.
    pub(crate) fn gap(&mut self) {
        if !self.current().lines.is_empty() {
            self.cursor_y += self.options.line_height / 2;
        }
    }

    pub(crate) fn finish(self, title: String) -> Document {
        Document {
            title,
            pages: self.pages,
        }
    }

    fn new_page(&mut self) {
        let number = self.pages.len() as u32 + 1;
        self.pages.push(Page {
            number,
            lines: Vec::new(),
        });
        self.cursor_y = self.options.top_margin;
    }

    fn current(&self) -> &Page {
        &self.pages[self.pages.len() - 1]
    }

    fn current_mut(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with
/// `...` when there is room for it.
pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        assert_eq!(truncate("abcdef", 2), "ab");
        // Counts characters, not bytes.
        assert_eq!(truncate("تمرين الضغط", 11), "تمرين الضغط");
    }

    #[test]
    fn page_that_fits_nothing_still_advances() {
        let options = RenderOptions {
            page_height: 10,
            top_margin: 5,
            bottom_margin: 5,
            ..RenderOptions::default()
        };
        let mut layout = Layout::new(&options);
        for i in 0..3 {
            layout.line(LineStyle::Body, 0, format!("line {i}"));
        }
        let doc = layout.finish("t".to_owned());
        assert_eq!(doc.page_count(), 3);
        assert!(doc.pages.iter().all(|p| p.lines.len() == 1));
    }

    #[test]
    fn gap_at_top_of_page_is_dropped() {
        let options = RenderOptions::default();
        let mut layout = Layout::new(&options);
        layout.gap();
        layout.line(LineStyle::Body, 0, "first");
        let doc = layout.finish("t".to_owned());
        assert_eq!(doc.pages[0].lines[0].y, options.top_margin);
    }
}
