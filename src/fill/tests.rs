use super::*;
use crate::docx::testing::{build_docx, para, table};
use crate::docx::{paragraph_text, row_text, table_rows};
use crate::error::ContainerError;
use crate::inspect::Inspector;
use crate::model::Movie;

fn jane(movies: &[(&str, &str)]) -> FormData {
    FormData {
        name: Some("Jane Doe".to_string()),
        street: Some("1 Main St".to_string()),
        postal_code_city: Some("90210 LA".to_string()),
        country: Some("United States".to_string()),
        movies: movies
            .iter()
            .map(|(title, language)| Movie::new(title, language))
            .collect(),
    }
}

fn fill(input: &[u8], data: &FormData) -> FillOutcome {
    let structure = Inspector::new().unwrap().inspect_bytes(input).unwrap();
    FormFiller::new().unwrap().fill(input, data, &structure).unwrap()
}

fn paragraphs(bytes: &[u8]) -> Vec<String> {
    let document = WordDocument::open(bytes).unwrap();
    document.paragraphs().map(paragraph_text).collect()
}

fn address_form() -> Vec<u8> {
    let body = [
        para("Name: ____"),
        para("Street: ____"),
        para("Postal Code and City: ____"),
        para("Country: ____"),
    ]
    .concat();
    build_docx(&body)
}

#[test]
fn address_lines_are_filled_inline() {
    let input = address_form();
    let outcome = fill(&input, &jane(&[("Dune", "English")]));

    assert_eq!(outcome.strategy, Strategy::Inline);
    assert!(!outcome.changed("merge_fields"));
    assert!(outcome.changed("text_placeholders"));
    assert!(!outcome.changed("movie_table"));
    assert_eq!(
        paragraphs(&outcome.bytes),
        vec![
            "Name: Jane Doe",
            "Street: 1 Main St",
            "Postal Code and City: 90210 LA",
            "Country: United States",
        ]
    );
}

#[test]
fn movie_table_ends_with_one_row_per_movie() {
    let body = table(&[
        &["Title", "Language"],
        &["a", "b"],
        &["c", "d"],
        &["e", "f"],
    ]);
    let input = build_docx(&body);
    let outcome = fill(&input, &jane(&[("Dune", "English"), ("Heat", "English")]));

    assert!(outcome.changed("movie_table"));
    let document = WordDocument::open(&outcome.bytes).unwrap();
    let table = document.tables().next().unwrap();
    let rows: Vec<String> = table_rows(table).map(|row| row_text(row, true)).collect();
    assert_eq!(rows, vec!["Title Language", "Dune English", "Heat English"]);
}

#[test]
fn checkbox_option_is_ticked() {
    let input = build_docx(&[para("Movies Ordered"), para("☐ Inception")].concat());
    let outcome = fill(&input, &jane(&[("Inception", "English")]));

    assert!(outcome.changed("checkboxes"));
    assert_eq!(paragraphs(&outcome.bytes)[1], "☑ Inception");
}

#[test]
fn table_without_movie_headers_is_never_synthesized() {
    let body = table(&[&["Item", "Price"], &["Popcorn", "3"]]);
    let input = build_docx(&body);
    let data = jane(&[("Dune", "English")]);
    let structure = Inspector::new().unwrap().inspect_bytes(&input).unwrap();
    assert!(!structure.has_movie_table());

    let outcome = FormFiller::new().unwrap().fill(&input, &data, &structure).unwrap();
    assert!(!outcome.changed("movie_table"));
    let document = WordDocument::open(&outcome.bytes).unwrap();
    let table = document.tables().next().unwrap();
    assert_eq!(table_rows(table).count(), 2);
}

#[test]
fn filling_twice_gives_identical_bytes() {
    let body = [
        para("Customer Information"),
        para("Name: ____"),
        para("Country: ____"),
        para("Movies Ordered"),
        para("☐ Dune"),
        table(&[&["Title", "Language"], &["", ""]]),
    ]
    .concat();
    let input = build_docx(&body);
    let data = jane(&[("Dune", "English")]);

    let first = fill(&input, &data);
    let second = fill(&input, &data);
    assert_eq!(first.bytes, second.bytes);
    assert_ne!(first.bytes, input);
}

#[test]
fn untouched_documents_come_back_unchanged() {
    let input = build_docx(&para("Thank you for your order!"));
    let outcome = fill(&input, &jane(&[("Dune", "English")]));
    assert_eq!(outcome.strategy, Strategy::Inline);
    assert!(outcome.steps.iter().all(|step| !step.changed));
    assert_eq!(outcome.bytes, input);
}

#[test]
fn merge_fields_win_and_checkboxes_still_tick() {
    let body = "<w:p><w:r><w:t xml:space=\"preserve\">Name: </w:t></w:r>\
                <w:fldSimple w:instr=\" MERGEFIELD CustomerName \"><w:r><w:t>«CustomerName»</w:t></w:r></w:fldSimple></w:p>\
                <w:p><w:r><w:t>Street: ____</w:t></w:r></w:p>\
                <w:p><w:r><w:t>☐ Dune</w:t></w:r></w:p>";
    let input = build_docx(body);
    let outcome = fill(&input, &jane(&[("Dune", "English")]));

    assert_eq!(outcome.strategy, Strategy::MergeFields);
    let steps: Vec<&str> = outcome.steps.iter().map(|step| step.step.as_str()).collect();
    assert_eq!(steps, vec!["merge_fields", "checkboxes"]);
    assert_eq!(
        paragraphs(&outcome.bytes),
        vec!["Name: Jane Doe", "Street: ____", "☑ Dune"]
    );
}

#[test]
fn incomplete_form_is_rejected_before_any_step() {
    let input = address_form();
    let mut data = jane(&[]);
    data.country = None;
    let structure = FormStructure::default();

    let err = FormFiller::new().unwrap().fill(&input, &data, &structure).unwrap_err();
    match err {
        FormError::IncompleteForm { missing } => {
            assert_eq!(missing, vec!["Country", "Movies"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreadable_container_is_a_distinct_failure() {
    let data = jane(&[("Dune", "English")]);
    let err = FormFiller::new()
        .unwrap()
        .fill(b"PK\x03\x04 broken", &data, &FormStructure::default())
        .unwrap_err();
    assert!(matches!(err, FormError::Container(ContainerError::MissingEndOfCentralDirectory)));
}

#[test]
fn saved_structure_fills_like_a_fresh_inspection() {
    let input = build_docx(
        &[
            para("Name: ____"),
            para("☐ Dune"),
            table(&[&["Title", "Language"], &["", ""]]),
        ]
        .concat(),
    );
    let data = jane(&[("Dune", "English")]);
    let structure = Inspector::new().unwrap().inspect_bytes(&input).unwrap();
    let saved = serde_json::to_vec_pretty(&structure).unwrap();
    let restored: FormStructure = serde_json::from_slice(&saved).unwrap();
    assert_eq!(restored, structure);

    let filler = FormFiller::new().unwrap();
    let from_saved = filler.fill(&input, &data, &restored).unwrap();
    assert!(from_saved.changed("movie_table"));
    assert_eq!(from_saved.bytes, fill(&input, &data).bytes);
}
