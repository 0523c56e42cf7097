use regex::Regex;

use crate::model::FieldKind;

pub const UNCHECKED_GLYPHS: [&str; 6] = ["☐", "□", "○", "◯", "( )", "[ ]"];
pub const CHECKED_GLYPH: &str = "☑";

#[derive(Debug)]
pub struct DetectionRule {
    pub kind: FieldKind,
    pub label: Regex,
}

#[derive(Debug)]
pub struct CustomerRule {
    pub kind: FieldKind,
    pub guard: Regex,
    pub rewrite: Regex,
}

#[derive(Debug)]
pub struct MovieRules {
    pub title_label: Regex,
    pub language_label: Regex,
    pub combined: Regex,
    pub title_line: Regex,
    pub title_rewrite: Regex,
    pub language_line: Regex,
    pub language_rewrite: Regex,
}

#[derive(Debug)]
pub struct FormPatterns {
    pub detection: Vec<DetectionRule>,
    pub checkbox: Regex,
    pub option_separator: Regex,
    pub movies_heading: Regex,
    pub customer_heading: Regex,
    pub customer: Vec<CustomerRule>,
    pub movies: MovieRules,
    pub merge_field: Regex,
}

impl FormPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        let detection = vec![
            DetectionRule {
                kind: FieldKind::Name,
                label: Regex::new(r"(?i)\b(name|full\s*name|customer\s*name)\s*[:：]?\s*[_\s]*")?,
            },
            DetectionRule {
                kind: FieldKind::Street,
                label: Regex::new(r"(?i)\b(street|address|street\s*address)\s*[:：]?\s*[_\s]*")?,
            },
            DetectionRule {
                kind: FieldKind::PostalCity,
                label: Regex::new(
                    r"(?i)\b(postal\s*code|zip|city|postal\s*code\s*and\s*city|zip\s*code)\s*[:：]?\s*[_\s]*",
                )?,
            },
            DetectionRule {
                kind: FieldKind::Country,
                label: Regex::new(r"(?i)\b(country|nation)\s*[:：]?\s*[_\s]*")?,
            },
        ];

        let customer = vec![
            CustomerRule {
                kind: FieldKind::Name,
                guard: Regex::new(r"(?i)^name\s*[:：]")?,
                rewrite: Regex::new(r"(?i)(name\s*[:：]\s*)(.*)")?,
            },
            CustomerRule {
                kind: FieldKind::Street,
                guard: Regex::new(r"(?i)^street\s*[:：]")?,
                rewrite: Regex::new(r"(?i)(street\s*[:：]\s*)(.*)")?,
            },
            CustomerRule {
                kind: FieldKind::PostalCity,
                guard: Regex::new(r"(?i)^(postal|zip|city)")?,
                rewrite: Regex::new(
                    r"(?i)((?:postal\s*code|zip(?:\s*code)?|city)(?:\s*(?:and|&)\s*(?:city|postal\s*code))?\s*[:：]\s*)(.*)",
                )?,
            },
            CustomerRule {
                kind: FieldKind::Country,
                guard: Regex::new(r"(?i)^country\s*[:：]")?,
                rewrite: Regex::new(r"(?i)(country\s*[:：]\s*)(.*)")?,
            },
        ];

        let movies = MovieRules {
            title_label: Regex::new(r"(?i)(name|title)\s*[:：]")?,
            language_label: Regex::new(r"(?i)language\s*[:：]")?,
            combined: Regex::new(r"(?i)((name|title)\s*[:：]\s*)([^:]*?)(language\s*[:：]\s*)(.*)")?,
            title_line: Regex::new(r"(?i)^(name|title)\s*[:：]")?,
            title_rewrite: Regex::new(r"(?i)((name|title)\s*[:：]\s*)(.*)")?,
            language_line: Regex::new(r"(?i)^language\s*[:：]")?,
            language_rewrite: Regex::new(r"(?i)(language\s*[:：]\s*)(.*)")?,
        };

        Ok(Self {
            detection,
            checkbox: Regex::new(r"[☐□○◯☑✓✔\[\]\(\)]")?,
            option_separator: Regex::new(r"^[\s\-–—:]+")?,
            movies_heading: Regex::new(r"(?i)movies?\s*ordered")?,
            customer_heading: Regex::new(r"(?i)customer\s*info")?,
            customer,
            movies,
            merge_field: Regex::new(r#"(?i)^\s*MERGEFIELD\s+"?([^\s"]+)"?"#)?,
        })
    }
}

pub fn first_unchecked_glyph(text: &str) -> Option<(usize, &'static str)> {
    UNCHECKED_GLYPHS
        .iter()
        .filter_map(|glyph| text.find(glyph).map(|at| (at, *glyph)))
        .min_by_key(|(at, _)| *at)
}
