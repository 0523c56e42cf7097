use super::Package;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn document_xml(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n<w:document xmlns:w=\"{W_NS}\"><w:body>{body}<w:sectPr/></w:body></w:document>"
    )
}

pub fn build_docx(body: &str) -> Vec<u8> {
    build_docx_with_parts(body, &[])
}

pub fn build_docx_with_parts(body: &str, extra_parts: &[(&str, &str)]) -> Vec<u8> {
    let mut package = Package::default();
    package.write_part("[Content_Types].xml", CONTENT_TYPES.as_bytes());
    package.write_part("_rels/.rels", ROOT_RELS.as_bytes());
    package.write_part("word/document.xml", document_xml(body).as_bytes());
    for (name, xml) in extra_parts {
        package.write_part(name, xml.as_bytes());
    }
    package.to_bytes()
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn run(text: &str) -> String {
    format!(
        "<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        escape_text(text)
    )
}

pub fn para(text: &str) -> String {
    format!("<w:p>{}</w:p>", run(text))
}

pub fn table(rows: &[&[&str]]) -> String {
    let columns = rows.first().map(|row| row.len()).unwrap_or(0);
    let grid: String = (0..columns)
        .map(|_| "<w:gridCol w:w=\"4320\"/>".to_string())
        .collect();
    let body: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|cell| format!("<w:tc><w:tcPr><w:tcW w:w=\"4320\" w:type=\"dxa\"/></w:tcPr>{}</w:tc>", para(cell)))
                .collect();
            format!("<w:tr>{cells}</w:tr>")
        })
        .collect();
    format!("<w:tbl><w:tblPr/><w:tblGrid>{grid}</w:tblGrid>{body}</w:tbl>")
}
