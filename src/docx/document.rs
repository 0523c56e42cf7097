use tracing::debug;

use super::package::Package;
use super::xml::{XmlDocument, XmlElement, XmlNode};
use crate::error::ContainerError;

pub const DOCUMENT_PART: &str = "word/document.xml";

pub const W_BODY: &str = "w:body";
pub const W_P: &str = "w:p";
pub const W_R: &str = "w:r";
pub const W_T: &str = "w:t";
pub const W_TAB: &str = "w:tab";
pub const W_BR: &str = "w:br";
pub const W_CR: &str = "w:cr";
pub const W_RPR: &str = "w:rPr";
pub const W_HYPERLINK: &str = "w:hyperlink";
pub const W_TBL: &str = "w:tbl";
pub const W_TBL_GRID: &str = "w:tblGrid";
pub const W_GRID_COL: &str = "w:gridCol";
pub const W_TR: &str = "w:tr";
pub const W_TC: &str = "w:tc";
pub const W_TCPR: &str = "w:tcPr";
pub const W_TCW: &str = "w:tcW";
pub const W_GRID_SPAN: &str = "w:gridSpan";

#[derive(Debug, Clone)]
pub struct XmlPart {
    pub name: String,
    pub xml: XmlDocument,
    pristine: XmlDocument,
}

impl XmlPart {
    fn open(package: &Package, name: &str) -> Result<Self, ContainerError> {
        let bytes = package.read_part(name)?;
        let xml = XmlDocument::parse(&bytes, name)?;
        Ok(Self {
            name: name.to_string(),
            pristine: xml.clone(),
            xml,
        })
    }

    pub fn is_modified(&self) -> bool {
        self.xml != self.pristine
    }
}

#[derive(Debug, Clone)]
pub struct WordDocument {
    package: Package,
    main: XmlPart,
    headers_footers: Vec<XmlPart>,
}

impl WordDocument {
    pub fn open(bytes: &[u8]) -> Result<Self, ContainerError> {
        let package = Package::from_bytes(bytes)?;
        let main = XmlPart::open(&package, DOCUMENT_PART)?;
        if main.xml.root.child(W_BODY).is_none() {
            return Err(ContainerError::MissingBody);
        }

        let names: Vec<String> = package
            .part_names()
            .filter(|name| is_header_or_footer(name))
            .map(ToOwned::to_owned)
            .collect();
        let headers_footers = names
            .iter()
            .map(|name| XmlPart::open(&package, name))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            parts = headers_footers.len() + 1,
            "opened word document package"
        );

        Ok(Self {
            package,
            main,
            headers_footers,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut package = self.package.clone();
        for part in std::iter::once(&self.main).chain(&self.headers_footers) {
            if part.is_modified() {
                package.write_part(&part.name, &part.xml.to_bytes());
            }
        }
        package.to_bytes()
    }

    pub fn body(&self) -> &XmlElement {
        let root = &self.main.xml.root;
        root.child(W_BODY).unwrap_or(root)
    }

    pub fn body_mut(&mut self) -> Option<&mut XmlElement> {
        self.main.xml.root.child_mut(W_BODY)
    }

    pub fn root_mut(&mut self) -> &mut XmlElement {
        &mut self.main.xml.root
    }

    pub fn field_roots(&self) -> impl Iterator<Item = &XmlElement> {
        std::iter::once(&self.main)
            .chain(&self.headers_footers)
            .map(|part| &part.xml.root)
    }

    pub fn field_roots_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        std::iter::once(&mut self.main)
            .chain(&mut self.headers_footers)
            .map(|part| &mut part.xml.root)
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &XmlElement> {
        self.body().children_named(W_P)
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.body_mut()
            .into_iter()
            .flat_map(|body| body.children_named_mut(W_P))
    }

    pub fn tables(&self) -> impl Iterator<Item = &XmlElement> {
        self.body().children_named(W_TBL)
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.body_mut()
            .into_iter()
            .flat_map(|body| body.children_named_mut(W_TBL))
    }

    pub fn table_mut(&mut self, index: usize) -> Option<&mut XmlElement> {
        self.tables_mut().nth(index)
    }
}

fn is_header_or_footer(name: &str) -> bool {
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    (file.starts_with("header") || file.starts_with("footer"))
        && file.ends_with(".xml")
        && !file.contains('/')
}

pub fn run_text(run: &XmlElement) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            W_T => out.push_str(&child.text()),
            W_TAB => out.push('\t'),
            W_BR | W_CR => out.push('\n'),
            _ => {}
        }
    }
    out
}

pub fn paragraph_text(paragraph: &XmlElement) -> String {
    let mut out = String::new();
    for child in paragraph.elements() {
        if child.is(W_R) {
            out.push_str(&run_text(child));
        } else if child.is(W_HYPERLINK) {
            for run in child.children_named(W_R) {
                out.push_str(&run_text(run));
            }
        }
    }
    out
}

pub fn set_run_text(run: &mut XmlElement, text: &str) {
    run.children.retain(|node| match node {
        XmlNode::Element(element) => element.is(W_RPR),
        _ => false,
    });

    let mut pending = String::new();
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush_text(run, &mut pending);
                run.push(XmlElement::new(W_TAB));
            }
            '\n' => {
                flush_text(run, &mut pending);
                run.push(XmlElement::new(W_BR));
            }
            '\r' => {}
            _ => pending.push(ch),
        }
    }
    flush_text(run, &mut pending);
}

fn flush_text(run: &mut XmlElement, pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    run.push(text_element(pending));
    pending.clear();
}

pub fn text_element(text: &str) -> XmlElement {
    let mut element = XmlElement::new(W_T).with_text(text);
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        element.set_attr("xml:space", "preserve");
    }
    element
}

pub fn new_run(text: &str) -> XmlElement {
    let mut run = XmlElement::new(W_R);
    set_run_text(&mut run, text);
    run
}

pub fn set_paragraph_text(paragraph: &mut XmlElement, text: &str) {
    for hyperlink in paragraph.children_named_mut(W_HYPERLINK) {
        for run in hyperlink.children_named_mut(W_R) {
            set_run_text(run, "");
        }
    }
    if paragraph.child(W_R).is_none() {
        paragraph.push(new_run(text));
        return;
    }
    for (index, run) in paragraph.children_named_mut(W_R).enumerate() {
        set_run_text(run, if index == 0 { text } else { "" });
    }
}

pub fn table_rows(table: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    table.children_named(W_TR)
}

pub fn row_cells(row: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    row.children_named(W_TC)
}

pub fn cell_span(cell: &XmlElement) -> usize {
    cell.child(W_TCPR)
        .and_then(|properties| properties.child(W_GRID_SPAN))
        .and_then(|span| span.attr("w:val"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

pub fn row_grid_cells(row: &XmlElement) -> impl Iterator<Item = (usize, &XmlElement)> {
    row_cells(row).scan(0usize, |column, cell| {
        let start = *column;
        *column += cell_span(cell);
        Some((start, cell))
    })
}

pub fn cell_text(cell: &XmlElement) -> String {
    cell.children_named(W_P)
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn row_text(row: &XmlElement, trim_cells: bool) -> String {
    row_cells(row)
        .map(|cell| {
            let text = cell_text(cell);
            if trim_cells {
                text.trim().to_string()
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn set_cell_text(cell: &mut XmlElement, text: &str) {
    cell.children.retain(|node| match node {
        XmlNode::Element(element) => element.is(W_TCPR),
        _ => false,
    });
    cell.push(XmlElement::new(W_P).with_child(new_run(text)));
}

pub fn truncate_to_header_row(table: &mut XmlElement) {
    let mut seen_row = false;
    table.children.retain(|node| match node {
        XmlNode::Element(element) if element.is(W_TR) => {
            let keep = !seen_row;
            seen_row = true;
            keep
        }
        _ => true,
    });
}

pub fn new_table_row(table: &XmlElement) -> XmlElement {
    let widths: Vec<Option<String>> = match table.child(W_TBL_GRID) {
        Some(grid) if grid.children_named(W_GRID_COL).next().is_some() => grid
            .children_named(W_GRID_COL)
            .map(|col| col.attr("w:w").map(ToOwned::to_owned))
            .collect(),
        _ => {
            let columns = table_rows(table)
                .next()
                .map(|row| row_cells(row).map(cell_span).sum::<usize>())
                .unwrap_or(1);
            vec![None; columns]
        }
    };

    let mut row = XmlElement::new(W_TR);
    for width in widths {
        let mut cell = XmlElement::new(W_TC);
        if let Some(width) = width {
            cell.push(
                XmlElement::new(W_TCPR).with_child(
                    XmlElement::new(W_TCW)
                        .with_attr("w:type", "dxa")
                        .with_attr("w:w", width),
                ),
            );
        }
        cell.push(XmlElement::new(W_P));
        row.push(cell);
    }
    row
}
