use regex::{Captures, Regex};
use tracing::debug;

use super::{FillContext, FillStep};
use crate::docx::{WordDocument, paragraph_text, set_paragraph_text};
use crate::model::{FormData, Movie};
use crate::patterns::{FormPatterns, MovieRules};

/// Which part of the form the paragraph walk is in. Headings switch the
/// section and are never rewritten themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Customer,
    Movies,
}

pub struct TextPlaceholderFiller;

impl FillStep for TextPlaceholderFiller {
    fn name(&self) -> &'static str {
        "text_placeholders"
    }

    fn apply(&self, document: &mut WordDocument, context: &FillContext<'_>) -> bool {
        let mut walk = SectionWalk::new(context.patterns, context.data);
        let mut rewritten = 0usize;

        for paragraph in document.paragraphs_mut() {
            let text = paragraph_text(paragraph);
            let Some(updated) = walk.rewrite(&text) else {
                continue;
            };
            if updated != text {
                set_paragraph_text(paragraph, &updated);
                rewritten += 1;
            }
        }

        debug!(
            rewritten,
            movies_used = walk.cursor,
            "text placeholders rewritten"
        );
        rewritten > 0
    }
}

struct SectionWalk<'a> {
    patterns: &'a FormPatterns,
    data: &'a FormData,
    section: Section,
    cursor: usize,
}

impl<'a> SectionWalk<'a> {
    fn new(patterns: &'a FormPatterns, data: &'a FormData) -> Self {
        Self {
            patterns,
            data,
            section: Section::Customer,
            cursor: 0,
        }
    }

    fn rewrite(&mut self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        if self.patterns.movies_heading.is_match(trimmed) {
            self.section = Section::Movies;
            return None;
        }
        if self.patterns.customer_heading.is_match(trimmed) {
            self.section = Section::Customer;
            return None;
        }

        Some(match self.section {
            Section::Customer => self.rewrite_customer(text, trimmed),
            Section::Movies => self.rewrite_movie(text, trimmed),
        })
    }

    fn rewrite_customer(&self, text: &str, trimmed: &str) -> String {
        let mut updated = text.to_string();
        for rule in &self.patterns.customer {
            let Some(value) = rule.kind.value(self.data) else {
                continue;
            };
            if rule.guard.is_match(trimmed) {
                updated = replace_after_label(&rule.rewrite, &updated, value);
            }
        }
        updated
    }

    fn rewrite_movie(&mut self, text: &str, trimmed: &str) -> String {
        let Some(movie) = self.data.movies.get(self.cursor) else {
            return text.to_string();
        };
        let rules: &MovieRules = &self.patterns.movies;

        if rules.title_label.is_match(trimmed) && rules.language_label.is_match(trimmed) {
            self.cursor += 1;
            return fill_combined_line(rules, text, movie);
        }

        let mut updated = text.to_string();
        if rules.title_line.is_match(trimmed) {
            updated = replace_after_label(&rules.title_rewrite, &updated, &movie.title);
        }
        if rules.language_line.is_match(trimmed) {
            updated = replace_after_label(&rules.language_rewrite, &updated, &movie.language);
            self.cursor += 1;
        }
        updated
    }
}

fn replace_after_label(rewrite: &Regex, text: &str, value: &str) -> String {
    rewrite
        .replace_all(text, |caps: &Captures<'_>| format!("{}{value}", &caps[1]))
        .into_owned()
}

fn fill_combined_line(rules: &MovieRules, text: &str, movie: &Movie) -> String {
    rules
        .combined
        .replace_all(text, |caps: &Captures<'_>| {
            let old_title = &caps[3];
            let gap = &old_title[old_title.trim_end().len()..];
            format!(
                "{}{}{gap}{}{}",
                &caps[1], movie.title, &caps[4], movie.language
            )
        })
        .into_owned()
}
