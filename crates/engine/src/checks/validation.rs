//! Format validations anchored per line instead of per string. `^` and
//! `$` match around embedded newlines, so such a pattern can be bypassed
//! with a crafted multi-line value.

use super::{Check, CheckContext};
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use ir::FileRole;

pub struct FormatValidation;

impl Check for FormatValidation {
    fn name(&self) -> &'static str {
        "FormatValidation"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Model
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for model in cx.index.models() {
            if model.file != cx.file.path {
                continue;
            }
            for validation in &model.validations {
                let Some(pattern) = &validation.pattern else { continue };
                if !pattern.starts_with('^') && !pattern.ends_with('$') {
                    continue;
                }
                out.push(
                    Warning::new(
                        self.name(),
                        Category::Model,
                        "Format Validation",
                        Confidence::Weak,
                        format!(
                            "Insufficient validation for {} using {}. Use \\A and \\z as anchors",
                            validation.attribute, pattern
                        ),
                        &model.file,
                    )
                    .with_line(validation.line),
                );
            }
        }
        Ok(out)
    }
}
