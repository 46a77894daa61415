//! Page geometry and the render cursor.
//!
//! Offsets are measured in points from the top edge of the page. Every line
//! the cursor emits has the same height, which makes the page count a pure
//! function of the number of emitted lines.

/// Page geometry. Defaults to A4 portrait with 10pt text on 16pt lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub left_margin: f32,
    /// Offset of the first line on every page.
    pub top_margin: f32,
    /// Lowest offset content may reach; the footer lives below it.
    pub page_capacity: f32,
    pub line_height: f32,
    pub font_size: f32,
    /// Offset of the footer line.
    pub footer_offset: f32,
    /// Characters per wrapped body line.
    pub wrap_width: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            left_margin: 50.0,
            top_margin: 50.0,
            page_capacity: 762.0,
            line_height: 16.0,
            font_size: 10.0,
            footer_offset: 800.0,
            wrap_width: 90,
        }
    }
}

impl LayoutConfig {
    pub fn lines_per_page(&self) -> usize {
        ((self.page_capacity - self.top_margin) / self.line_height).floor() as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// A piece of text placed at an absolute column.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub text: String,
    pub weight: FontWeight,
}

impl TextRun {
    pub fn regular(x: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            text: text.into(),
            weight: FontWeight::Regular,
        }
    }

    pub fn bold(x: f32, text: impl Into<String>) -> Self {
        Self {
            x,
            text: text.into(),
            weight: FontWeight::Bold,
        }
    }
}

/// One laid-out line: its offset from the top and the runs on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub offset: f32,
    pub runs: Vec<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<Line>,
    pub footer: Vec<TextRun>,
}

/// The laid-out document, ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub config: LayoutConfig,
    pub title: String,
    pub pages: Vec<Page>,
    /// Number of lines emitted through the cursor, spacers included.
    pub content_lines: usize,
}

/// Tracks where the next line goes. Lives for a single render call.
#[derive(Debug)]
pub struct RenderCursor {
    config: LayoutConfig,
    offset: f32,
    page: usize,
    pages: Vec<Page>,
    emitted: usize,
}

impl RenderCursor {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            offset: config.top_margin,
            page: 0,
            pages: vec![Page::default()],
            emitted: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Current offset from the top of the current page.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Zero-based index of the page being written.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Write one line, breaking to a new page first if it would not fit.
    pub fn emit_line(&mut self, runs: Vec<TextRun>) {
        if self.offset + self.config.line_height > self.config.page_capacity {
            self.page += 1;
            self.offset = self.config.top_margin;
            self.pages.push(Page::default());
        }
        self.pages[self.page].lines.push(Line {
            offset: self.offset,
            runs,
        });
        self.offset += self.config.line_height;
        self.emitted += 1;
    }

    pub fn emit_text(&mut self, text: impl Into<String>) {
        let x = self.config.left_margin;
        self.emit_line(vec![TextRun::regular(x, text)]);
    }

    pub fn emit_bold(&mut self, text: impl Into<String>) {
        let x = self.config.left_margin;
        self.emit_line(vec![TextRun::bold(x, text)]);
    }

    /// An empty line of the standard height.
    pub fn emit_spacer(&mut self) {
        self.emit_line(Vec::new());
    }

    /// Bold title followed by body lines.
    pub fn emit_section<I, S>(&mut self, title: &str, body: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.emit_bold(title);
        for line in body {
            self.emit_text(line);
        }
    }

    /// Second pass: stamp "Page i / N" and the product label on every page.
    pub fn finish(mut self, title: String, label: &str) -> Document {
        let total = self.pages.len();
        let x = self.config.left_margin;
        let label_x = self.config.page_width - self.config.left_margin - label.len() as f32 * 4.5;
        for (index, page) in self.pages.iter_mut().enumerate() {
            page.footer = vec![
                TextRun::regular(x, format!("Page {} / {}", index + 1, total)),
                TextRun::regular(label_x, label),
            ];
        }
        Document {
            config: self.config,
            title,
            pages: self.pages,
            content_lines: self.emitted,
        }
    }
}
