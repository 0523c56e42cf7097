use tracing::debug;

use super::{FillContext, FillStep};
use crate::aliases::ControlValues;
use crate::docx::{W_T, WordDocument, XmlElement, XmlNode, text_element};

const W_SDT: &str = "w:sdt";
const W_SDT_PR: &str = "w:sdtPr";
const W_SDT_CONTENT: &str = "w:sdtContent";
const W_TAG: &str = "w:tag";
const W_ALIAS: &str = "w:alias";
const W_SHOWING_PLACEHOLDER: &str = "w:showingPlcHdr";

pub struct ContentControlFiller;

impl FillStep for ContentControlFiller {
    fn name(&self) -> &'static str {
        "content_controls"
    }

    fn apply(&self, document: &mut WordDocument, context: &FillContext<'_>) -> bool {
        let values = ControlValues::from_form_data(context.data);
        if values.is_empty() {
            return false;
        }
        let filled = fill_controls(document.root_mut(), &values);
        debug!(filled, "content controls filled");
        filled > 0
    }
}

fn fill_controls(element: &mut XmlElement, values: &ControlValues) -> usize {
    let mut filled = 0;
    for child in element.elements_mut() {
        if child.is(W_SDT) && fill_control(child, values) {
            filled += 1;
        }
        filled += fill_controls(child, values);
    }
    filled
}

fn control_identifier(properties: &XmlElement) -> Option<&str> {
    match properties.child(W_TAG) {
        Some(tag) => tag.attr("w:val"),
        None => properties.child(W_ALIAS).and_then(|alias| alias.attr("w:val")),
    }
}

fn fill_control(control: &mut XmlElement, values: &ControlValues) -> bool {
    let Some(value) = control
        .child(W_SDT_PR)
        .and_then(control_identifier)
        .and_then(|identifier| values.get(identifier))
    else {
        return false;
    };

    let Some(text) = control
        .child_mut(W_SDT_CONTENT)
        .and_then(|content| content.find_descendant_mut(W_T))
    else {
        debug!(value, "content control has no text to replace");
        return false;
    };
    *text = text_element(value);

    if let Some(properties) = control.child_mut(W_SDT_PR) {
        properties.children.retain(|node| match node {
            XmlNode::Element(element) => !element.is(W_SHOWING_PLACEHOLDER),
            _ => true,
        });
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::{paragraph_text, testing::build_docx};
    use crate::model::{FormData, FormStructure, Movie};
    use crate::patterns::FormPatterns;

    fn control(properties: &str, content: &str) -> String {
        format!("<w:sdt><w:sdtPr>{properties}</w:sdtPr><w:sdtContent>{content}</w:sdtContent></w:sdt>")
    }

    fn apply(document: &mut WordDocument, data: &FormData) -> bool {
        let patterns = FormPatterns::new().unwrap();
        let structure = FormStructure::default();
        let context = FillContext {
            data,
            structure: &structure,
            patterns: &patterns,
        };
        ContentControlFiller.apply(document, &context)
    }

    fn data() -> FormData {
        FormData {
            name: Some("Jane Doe".to_string()),
            country: Some("United States".to_string()),
            movies: vec![Movie::new("Dune", "English"), Movie::new("Heat", "English")],
            ..FormData::default()
        }
    }

    #[test]
    fn fills_inline_controls_by_tag_and_alias() {
        let body = format!(
            "<w:p><w:r><w:t xml:space=\"preserve\">Name: </w:t></w:r>{}</w:p>\
             <w:p>{}</w:p>\
             <w:p>{}</w:p>",
            control(
                "<w:tag w:val=\"customer_name\"/><w:showingPlcHdr/>",
                "<w:r><w:t>Click here</w:t></w:r><w:r><w:t> to enter</w:t></w:r>",
            ),
            control("<w:alias w:val=\"Country\"/>", "<w:r><w:t>Country</w:t></w:r>"),
            control("<w:tag w:val=\"OrderNumber\"/>", "<w:r><w:t>#</w:t></w:r>"),
        );
        let mut document = WordDocument::open(&build_docx(&body)).unwrap();
        assert!(apply(&mut document, &data()));

        let paragraphs: Vec<&XmlElement> = document.paragraphs().collect();
        let first = paragraphs[0].child(W_SDT).unwrap();
        let content = first.child(W_SDT_CONTENT).unwrap();
        let texts: Vec<String> = content
            .descendants()
            .into_iter()
            .filter(|element| element.is(W_T))
            .map(|element| element.text())
            .collect();
        assert_eq!(texts, vec!["Jane Doe", " to enter"]);
        assert!(first.child(W_SDT_PR).unwrap().child(W_SHOWING_PLACEHOLDER).is_none());

        let country = paragraphs[1].find_descendant(W_T).unwrap();
        assert_eq!(country.text(), "United States");
        let untouched = paragraphs[2].find_descendant(W_T).unwrap();
        assert_eq!(untouched.text(), "#");
    }

    #[test]
    fn tag_wins_over_alias_and_movies_use_the_first_entry() {
        let body = [
            control(
                "<w:alias w:val=\"Name\"/><w:tag w:val=\"movie_title\"/>",
                "<w:p><w:r><w:t>title</w:t></w:r></w:p>",
            ),
            control(
                "<w:tag w:val=\"Language\"/>",
                "<w:p><w:r><w:t>lang</w:t></w:r></w:p>",
            ),
        ]
        .concat();
        let mut document = WordDocument::open(&build_docx(&body)).unwrap();
        assert!(apply(&mut document, &data()));

        let texts: Vec<String> = document
            .body()
            .descendants()
            .into_iter()
            .filter(|element| element.is("w:p"))
            .map(paragraph_text)
            .collect();
        assert_eq!(texts, vec!["Dune", "English"]);
    }

    #[test]
    fn document_without_controls_reports_no_change() {
        let bytes = build_docx("<w:p><w:r><w:t>Name: ____</w:t></w:r></w:p>");
        let mut document = WordDocument::open(&bytes).unwrap();
        assert!(!apply(&mut document, &data()));
        assert_eq!(document.to_bytes(), bytes);
    }
}
