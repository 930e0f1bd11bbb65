//! Paginated plain-text rendering of plans.
//!
//! [`render`] lays a plan out as positioned lines on fixed-size pages
//! (A4 in points by default). The resulting [`Document`] serializes to
//! UTF-8 text with pages separated by form feeds, which prints and pipes
//! cleanly.
//!
//! Layout rules:
//!
//! - a running vertical cursor starts each page at the top margin;
//! - a line that would cross the bottom margin opens a new page, so nothing
//!   is clipped;
//! - lines longer than [`RenderOptions::max_line_chars`] are truncated with
//!   `...`, never wrapped.

mod labels;
mod layout;
mod meal;
mod workout;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Plan, PlanMeta};
use labels::Labels;
use layout::Layout;

/// Form feed, written between pages.
pub const PAGE_BREAK: char = '\u{000C}';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Page size in points.
    pub page_width: u32,
    pub page_height: u32,
    pub top_margin: u32,
    pub bottom_margin: u32,
    pub left_margin: u32,
    /// Height of a body line; other styles scale from it.
    pub line_height: u32,
    pub max_line_chars: usize,
    /// Overrides the title derived from the plan kind and language.
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            page_width: 595,
            page_height: 842,
            top_margin: 50,
            bottom_margin: 50,
            left_margin: 50,
            line_height: 14,
            max_line_chars: 95,
            title: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Title,
    Heading,
    Subheading,
    Body,
    Muted,
}

impl LineStyle {
    fn height(self, line_height: u32) -> u32 {
        match self {
            Self::Title => line_height * 2,
            Self::Heading => line_height * 3 / 2,
            Self::Subheading | Self::Body | Self::Muted => line_height,
        }
    }
}

/// One positioned line. `y` grows downward from the top edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub x: u32,
    pub y: u32,
    pub style: LineStyle,
    pub indent: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based.
    pub number: u32,
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Plain text, two spaces per indent level, pages separated by
    /// [`PAGE_BREAK`].
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                out.push(PAGE_BREAK);
            }
            for line in &page.lines {
                for _ in 0..line.indent {
                    out.push_str("  ");
                }
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        out
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_text().into_bytes()
    }
}

/// Lay out `plan` as a paginated document.
///
/// Headings and field labels follow the plan's language; plan content is
/// printed as stored.
pub fn render(plan: &Plan, options: &RenderOptions) -> Document {
    let labels = Labels::for_language(plan.meta().language);
    let title = options.title.clone().unwrap_or_else(|| {
        match plan {
            Plan::Meal(_) => labels.meal_title,
            Plan::Workout(_) => labels.workout_title,
        }
        .to_owned()
    });

    let mut layout = Layout::new(options);
    layout.line(LineStyle::Title, 0, &title);
    match plan {
        Plan::Meal(p) => {
            layout.line(LineStyle::Muted, 0, meal::summary(p, labels));
            layout.line(LineStyle::Muted, 0, generated_line(&p.meta, labels));
            meal::days(&mut layout, p, labels);
            meal::shopping_list(&mut layout, p, labels);
        }
        Plan::Workout(p) => {
            layout.line(LineStyle::Muted, 0, workout::summary(p, labels));
            layout.line(LineStyle::Muted, 0, generated_line(&p.meta, labels));
            workout::days(&mut layout, p, labels);
        }
    }
    disclaimer(&mut layout, plan.meta());
    layout.finish(title)
}

fn generated_line(meta: &PlanMeta, labels: &Labels) -> String {
    format!(
        "{} {} | {} {}",
        labels.generated,
        format_timestamp(meta.created_at),
        meta.generator,
        meta.generator_version
    )
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// The disclaimer closes every document, one sentence per line so it is
/// not cut by truncation.
fn disclaimer(layout: &mut Layout<'_>, meta: &PlanMeta) {
    layout.gap();
    for sentence in meta.disclaimer.split_inclusive(". ") {
        let sentence = sentence.trim();
        if !sentence.is_empty() {
            layout.line(LineStyle::Muted, 0, sentence);
        }
    }
}

/// "a, b, c", or `None` for an empty list.
fn joined(items: &[String]) -> Option<String> {
    (!items.is_empty()).then(|| items.join(", "))
}
