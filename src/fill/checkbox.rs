use tracing::debug;

use super::{FillContext, FillStep};
use crate::docx::{
    W_P, W_R, W_T, W_TC, W_TR, WordDocument, XmlElement, paragraph_text, row_text,
};
use crate::patterns::{CHECKED_GLYPH, first_unchecked_glyph};

pub struct CheckboxTicker;

impl FillStep for CheckboxTicker {
    fn name(&self) -> &'static str {
        "checkboxes"
    }

    fn apply(&self, document: &mut WordDocument, context: &FillContext<'_>) -> bool {
        let titles: Vec<String> = context
            .data
            .movie_titles()
            .map(|title| title.trim().to_lowercase())
            .filter(|title| !title.is_empty())
            .collect();
        if titles.is_empty() {
            return false;
        }
        let mentions_title = |text: &str| {
            let text = text.to_lowercase();
            titles.iter().any(|title| text.contains(title.as_str()))
        };

        let mut ticked = 0usize;
        for paragraph in document.paragraphs_mut() {
            if mentions_title(&paragraph_text(paragraph)) && tick_first_glyph(paragraph) {
                ticked += 1;
            }
        }
        for table in document.tables_mut() {
            for row in table.children_named_mut(W_TR) {
                if mentions_title(&row_text(row, false)) && tick_row(row) {
                    ticked += 1;
                }
            }
        }

        debug!(ticked, "movie checkboxes ticked");
        ticked > 0
    }
}

fn tick_row(row: &mut XmlElement) -> bool {
    row.children_named_mut(W_TC)
        .flat_map(|cell| cell.children_named_mut(W_P))
        .any(tick_first_glyph)
}

/// Replaces the first unchecked glyph held by one of the paragraph's direct
/// runs. Glyphs split across text elements are not recognised.
fn tick_first_glyph(paragraph: &mut XmlElement) -> bool {
    for run in paragraph.children_named_mut(W_R) {
        for text in run.children_named_mut(W_T) {
            let content = text.text();
            let Some((at, glyph)) = first_unchecked_glyph(&content) else {
                continue;
            };
            let mut ticked = String::with_capacity(content.len());
            ticked.push_str(&content[..at]);
            ticked.push_str(CHECKED_GLYPH);
            ticked.push_str(&content[at + glyph.len()..]);
            text.set_text(ticked);
            return true;
        }
    }
    false
}
