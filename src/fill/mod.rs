mod checkbox;
mod content_control;
mod merge_field;
mod movie_table;
mod placeholder;

#[cfg(test)]
mod tests;

use serde::Serialize;
use tracing::{debug, info};

use crate::docx::WordDocument;
use crate::error::FormError;
use crate::model::{FormData, FormStructure, StepReport};
use crate::patterns::FormPatterns;

pub use checkbox::CheckboxTicker;
pub use content_control::ContentControlFiller;
pub use merge_field::MergeFieldFiller;
pub use movie_table::MovieTableSynthesizer;
pub use placeholder::TextPlaceholderFiller;

pub struct FillContext<'a> {
    pub data: &'a FormData,
    pub structure: &'a FormStructure,
    pub patterns: &'a FormPatterns,
}

pub trait FillStep {
    fn name(&self) -> &'static str;

    fn apply(&self, document: &mut WordDocument, context: &FillContext<'_>) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MergeFields,
    Inline,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MergeFields => "merge_fields",
            Self::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FillOutcome {
    pub strategy: Strategy,
    pub steps: Vec<StepReport>,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
impl FillOutcome {
    pub fn changed(&self, step: &str) -> bool {
        self.steps
            .iter()
            .any(|report| report.step == step && report.changed)
    }
}

#[derive(Debug)]
pub struct FormFiller {
    patterns: FormPatterns,
}

impl FormFiller {
    pub fn new() -> Result<Self, FormError> {
        Ok(Self {
            patterns: FormPatterns::new()?,
        })
    }

    pub fn fill(
        &self,
        input: &[u8],
        data: &FormData,
        structure: &FormStructure,
    ) -> Result<FillOutcome, FormError> {
        if !data.is_complete() {
            return Err(FormError::IncompleteForm {
                missing: data.missing_fields(),
            });
        }

        let original = WordDocument::open(input)?;
        let context = FillContext {
            data,
            structure,
            patterns: &self.patterns,
        };

        let mut merged = original.clone();
        let merge_steps = run_steps(&mut merged, &[&MergeFieldFiller], &context);
        if merge_steps.iter().any(|step| step.changed) {
            let mut steps = merge_steps;
            steps.extend(run_steps(&mut merged, &[&CheckboxTicker], &context));
            info!(strategy = Strategy::MergeFields.as_str(), "filled document");
            return Ok(FillOutcome {
                strategy: Strategy::MergeFields,
                steps,
                bytes: merged.to_bytes(),
            });
        }

        let mut document = original;
        let mut steps = merge_steps;
        steps.extend(run_steps(
            &mut document,
            &[
                &ContentControlFiller,
                &TextPlaceholderFiller,
                &CheckboxTicker,
                &MovieTableSynthesizer,
            ],
            &context,
        ));
        info!(strategy = Strategy::Inline.as_str(), "filled document");

        Ok(FillOutcome {
            strategy: Strategy::Inline,
            steps,
            bytes: document.to_bytes(),
        })
    }
}

fn run_steps(
    document: &mut WordDocument,
    steps: &[&dyn FillStep],
    context: &FillContext<'_>,
) -> Vec<StepReport> {
    steps
        .iter()
        .map(|step| {
            let changed = step.apply(document, context);
            debug!(step = step.name(), changed, "fill step finished");
            StepReport {
                step: step.name().to_string(),
                changed,
            }
        })
        .collect()
}
