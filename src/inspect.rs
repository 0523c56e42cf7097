use tracing::debug;

use crate::docx::{
    WordDocument, XmlElement, cell_text, paragraph_text, row_cells, row_text, table_rows,
};
use crate::error::FormError;
use crate::model::{DetectedField, FormStructure};
use crate::patterns::FormPatterns;

#[derive(Debug)]
pub struct Inspector {
    patterns: FormPatterns,
}

impl Inspector {
    pub fn new() -> Result<Self, FormError> {
        Ok(Self {
            patterns: FormPatterns::new()?,
        })
    }

    pub fn inspect_bytes(&self, bytes: &[u8]) -> Result<FormStructure, FormError> {
        let document = WordDocument::open(bytes)?;
        Ok(self.inspect(&document))
    }

    pub fn inspect(&self, document: &WordDocument) -> FormStructure {
        let structure = FormStructure {
            detected_fields: self.detect_fields(document),
            movie_table_index: find_movie_table(document),
            available_movies: self.extract_options(document),
        };

        debug!(
            fields = structure.detected_fields.len(),
            movie_table = ?structure.movie_table_index,
            options = structure.available_movies.len(),
            "inspected form structure"
        );

        structure
    }

    fn detect_fields(&self, document: &WordDocument) -> Vec<DetectedField> {
        let mut detected: Vec<DetectedField> = Vec::new();

        for paragraph in document.paragraphs() {
            let text = paragraph_text(paragraph);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            for rule in &self.patterns.detection {
                if detected.iter().any(|field| field.kind == rule.kind) {
                    continue;
                }
                let Some(captures) = rule.label.captures(text) else {
                    continue;
                };
                let label = captures
                    .get(1)
                    .map(|label| label.as_str())
                    .unwrap_or_default();
                detected.push(DetectedField {
                    kind: rule.kind,
                    label: label.to_string(),
                    paragraph: text.to_string(),
                });
            }
        }

        detected.sort_by_key(|field| field.kind as u8);
        detected
    }

    fn extract_options(&self, document: &WordDocument) -> Vec<String> {
        let mut options = Vec::new();

        for paragraph in document.paragraphs() {
            let text = paragraph_text(paragraph);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if let Some(option) = self.option_title(text) {
                options.push(option);
            }
        }

        for table in document.tables() {
            for row in table_rows(table) {
                if let Some(option) = self.option_title(&row_text(row, true)) {
                    options.push(option);
                }
            }
        }

        options
    }

    fn option_title(&self, text: &str) -> Option<String> {
        if !self.patterns.checkbox.is_match(text) {
            return None;
        }
        let stripped = self.patterns.checkbox.replace_all(text, "");
        let stripped = self.patterns.option_separator.replace(stripped.trim(), "");
        let title = stripped.trim();
        (title.chars().count() > 1).then(|| title.to_string())
    }
}

fn find_movie_table(document: &WordDocument) -> Option<usize> {
    document
        .tables()
        .position(is_movie_table)
}

fn is_movie_table(table: &XmlElement) -> bool {
    let Some(header) = table_rows(table).next() else {
        return false;
    };
    let headers: Vec<String> = row_cells(header)
        .map(|cell| cell_text(cell).trim().to_lowercase())
        .collect();

    let has_title = headers.iter().any(|header| header.contains("title"));
    let has_language = headers
        .iter()
        .any(|header| header.contains("language") || header.contains("lang"));
    has_title && has_language
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::testing::{build_docx, para, table};
    use crate::model::FieldKind;

    fn inspect(body: &str) -> FormStructure {
        Inspector::new().unwrap().inspect_bytes(&build_docx(body)).unwrap()
    }

    #[test]
    fn detects_the_four_address_labels() {
        let body = [
            para("Movie Order Form"),
            para("Customer Information"),
            para("Name: ________"),
            para("Street: ________"),
            para("Postal Code and City: ________"),
            para("Country: ________"),
        ]
        .concat();

        let structure = inspect(&body);
        let kinds: Vec<FieldKind> = structure.detected_fields.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, FieldKind::ALL.to_vec());
        assert_eq!(structure.detected_fields[2].label, "Postal Code");
        assert_eq!(structure.detected_fields[0].paragraph, "Name: ________");
        assert!(!structure.has_movie_table());
        assert!(!structure.has_checkbox_list());
    }

    #[test]
    fn first_label_occurrence_wins() {
        let body = [para("Customer Name: ____"), para("Name: ____")].concat();
        let structure = inspect(&body);
        assert_eq!(structure.detected_fields.len(), 1);
        assert_eq!(structure.detected_fields[0].paragraph, "Customer Name: ____");
    }

    #[test]
    fn picks_the_first_qualifying_movie_table() {
        let body = [
            table(&[&["Item", "Price"], &["Popcorn", "3"]]),
            table(&[&["Movie Title", "Lang."], &["", ""]]),
            table(&[&["Title", "Language"]]),
        ]
        .concat();
        let structure = inspect(&body);
        assert_eq!(structure.movie_table_index, Some(1));
        assert!(structure.has_movie_table());
    }

    #[test]
    fn table_without_title_and_language_headers_is_not_a_movie_table() {
        let body = table(&[&["Item", "Quantity"], &["Popcorn", "2"]]);
        let structure = inspect(&body);
        assert_eq!(structure.movie_table_index, None);
        assert!(!structure.has_movie_table());
    }

    #[test]
    fn header_must_be_in_the_first_row() {
        let body = table(&[&["Order", "Details"], &["Title", "Language"]]);
        assert_eq!(inspect(&body).movie_table_index, None);
    }

    #[test]
    fn collects_checkbox_options_from_paragraphs_and_rows() {
        let body = [
            para("☐ Inception"),
            para("□ – The Matrix"),
            para("☐ X"),
            para("Plain paragraph"),
            table(&[&["☐", "Inception"], &["○", "Heat"]]),
        ]
        .concat();

        let structure = inspect(&body);
        assert_eq!(
            structure.available_movies,
            vec!["Inception", "The Matrix", "Inception", "Heat"]
        );
        assert!(structure.has_checkbox_list());
    }

    #[test]
    fn rejects_invalid_container() {
        let err = Inspector::new().unwrap().inspect_bytes(b"not a docx").unwrap_err();
        assert!(matches!(err, FormError::Container(_)));
    }
}
