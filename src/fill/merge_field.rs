use std::collections::BTreeMap;

use tracing::debug;

use super::{FillContext, FillStep};
use crate::aliases::merge_values;
use crate::docx::{W_R, W_RPR, W_T, WordDocument, XmlElement, XmlNode, set_run_text};
use crate::patterns::FormPatterns;

const W_FLD_SIMPLE: &str = "w:fldSimple";
const W_FLD_CHAR: &str = "w:fldChar";
const W_INSTR_TEXT: &str = "w:instrText";

pub struct MergeFieldFiller;

impl FillStep for MergeFieldFiller {
    fn name(&self) -> &'static str {
        "merge_fields"
    }

    fn apply(&self, document: &mut WordDocument, context: &FillContext<'_>) -> bool {
        let declared = declared_merge_fields(document, context.patterns);
        if declared.is_empty() {
            return false;
        }

        let values = merge_values(context.data, &declared);
        debug!(
            declared = declared.len(),
            matched = values.len(),
            "merge fields discovered"
        );
        if values.is_empty() {
            return false;
        }

        for root in document.field_roots_mut() {
            replace_fields(root, &values, context.patterns);
        }
        true
    }
}

pub fn declared_merge_fields(document: &WordDocument, patterns: &FormPatterns) -> Vec<String> {
    let mut names = Vec::new();
    for root in document.field_roots() {
        collect_names(root, patterns, &mut names);
    }
    names
}

fn collect_names(element: &XmlElement, patterns: &FormPatterns, names: &mut Vec<String>) {
    for field in complex_fields(element) {
        if let Some(name) = merge_field_name(&field.instruction, patterns) {
            push_unique(names, name);
        }
    }
    for child in element.elements() {
        if child.is(W_FLD_SIMPLE) {
            if let Some(name) = child
                .attr("w:instr")
                .and_then(|instr| merge_field_name(instr, patterns))
            {
                push_unique(names, name);
            }
        }
        collect_names(child, patterns, names);
    }
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}

fn merge_field_name(instruction: &str, patterns: &FormPatterns) -> Option<String> {
    patterns
        .merge_field
        .captures(instruction)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
}

/// A complex field spread over sibling runs, as child indices of its
/// container.
#[derive(Debug)]
struct ComplexField {
    begin: usize,
    end: usize,
    instruction: String,
    separated: bool,
    first_result: Option<usize>,
}

fn complex_fields(container: &XmlElement) -> Vec<ComplexField> {
    let mut fields = Vec::new();
    let mut open: Option<ComplexField> = None;
    let mut depth = 0usize;

    for (index, node) in container.children.iter().enumerate() {
        let XmlNode::Element(run) = node else {
            continue;
        };
        if !run.is(W_R) {
            continue;
        }

        for child in run.elements() {
            if child.is(W_FLD_CHAR) {
                match child.attr("w:fldCharType") {
                    Some("begin") => {
                        depth += 1;
                        if depth == 1 {
                            open = Some(ComplexField {
                                begin: index,
                                end: index,
                                instruction: String::new(),
                                separated: false,
                                first_result: None,
                            });
                        }
                    }
                    Some("separate") if depth == 1 => {
                        if let Some(field) = open.as_mut() {
                            field.separated = true;
                        }
                    }
                    Some("end") if depth > 0 => {
                        depth -= 1;
                        if depth == 0 {
                            if let Some(mut field) = open.take() {
                                field.end = index;
                                fields.push(field);
                            }
                        }
                    }
                    _ => {}
                }
            } else if depth == 1 {
                let Some(field) = open.as_mut() else {
                    continue;
                };
                if child.is(W_INSTR_TEXT) && !field.separated {
                    field.instruction.push_str(&child.text());
                } else if child.is(W_T) && field.separated && field.first_result.is_none() {
                    field.first_result = Some(index);
                }
            }
        }
    }

    fields
}

fn run_properties(run: Option<&XmlNode>) -> Option<XmlElement> {
    match run {
        Some(XmlNode::Element(run)) => run.child(W_RPR).cloned(),
        _ => None,
    }
}

fn value_run(properties: Option<XmlElement>, value: &str) -> XmlNode {
    let mut run = XmlElement::new(W_R);
    if let Some(properties) = properties {
        run.push(properties);
    }
    set_run_text(&mut run, value);
    XmlNode::Element(run)
}

/// Replaces every merge field under `element` with a plain run. Declared
/// fields without a collected value become empty.
fn replace_fields(
    element: &mut XmlElement,
    values: &BTreeMap<String, String>,
    patterns: &FormPatterns,
) {
    for field in complex_fields(element).into_iter().rev() {
        let Some(name) = merge_field_name(&field.instruction, patterns) else {
            continue;
        };
        let value = values.get(&name).map(String::as_str).unwrap_or_default();
        let source = field.first_result.unwrap_or(field.begin);
        let properties = run_properties(element.children.get(source));
        element
            .children
            .splice(field.begin..=field.end, [value_run(properties, value)]);
    }

    for node in element.children.iter_mut() {
        let XmlNode::Element(child) = &*node else {
            continue;
        };
        if !child.is(W_FLD_SIMPLE) {
            continue;
        }
        let Some(name) = child
            .attr("w:instr")
            .and_then(|instr| merge_field_name(instr, patterns))
        else {
            continue;
        };
        let value = values.get(&name).map(String::as_str).unwrap_or_default();
        let properties = child.child(W_R).and_then(|run| run.child(W_RPR)).cloned();
        *node = value_run(properties, value);
    }

    for child in element.elements_mut() {
        replace_fields(child, values, patterns);
    }
}
