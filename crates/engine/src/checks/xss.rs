//! Unsafe output rendering: tainted values reaching a render boundary
//! whose required sanitizer set is not satisfied. The sink context drives
//! the message, so an href finding is distinct from a body-interpolation
//! finding at the same confidence.

use super::{source_phrase, Check, CheckContext};
use crate::sanitizers::SinkContext;
use crate::warning::{Category, Warning};
use anyhow::Result;
use ir::FileRole;

pub struct CrossSiteScripting;

impl Check for CrossSiteScripting {
    fn name(&self) -> &'static str {
        "CrossSiteScripting"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Template
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for sink in &cx.taint.sinks {
            let d = &sink.descriptor;
            if !d.tainted || sink.context.satisfied_by(&d.sanitized_by, cx.sanitizers) {
                continue;
            }
            let message = match sink.context {
                SinkContext::Body => {
                    format!("Unescaped {} rendered in tag body", source_phrase(d))
                }
                SinkContext::AttrValue => {
                    format!("Unescaped {} rendered in tag attribute value", source_phrase(d))
                }
                SinkContext::AttrName => {
                    format!("Tainted {} used as tag attribute name", source_phrase(d))
                }
                SinkContext::Href => {
                    format!("Potentially dangerous {} in link href", source_phrase(d))
                }
                SinkContext::Json => {
                    format!("Unescaped {} in JSON output", source_phrase(d))
                }
            };
            out.push(
                Warning::new(
                    self.name(),
                    Category::Template,
                    "Cross-Site Scripting",
                    d.confidence,
                    message,
                    &sink.file,
                )
                .with_line(sink.line)
                .with_rendered(sink.code.clone(), sink.skeleton.clone())
                .with_user_input(d.origin.as_ref().map(|o| o.code.clone())),
            );
        }
        Ok(out)
    }
}
