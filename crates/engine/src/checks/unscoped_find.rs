//! Finds on owned models keyed by a raw request parameter instead of
//! going through the owning association's scope.

use super::{calls, code_role, first_active_arg, receiver, Check, CheckContext};
use crate::taint::SourceKind;
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use index::ClassKind;
use ir::FileRole;

pub struct UnscopedFind;

impl Check for UnscopedFind {
    fn name(&self) -> &'static str {
        "UnscopedFind"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            if !matches!(call.as_str(), Some("find") | Some("find_by_id")) {
                continue;
            }
            let Some(model) = receiver(call)
                .filter(|r| r.tag == "const")
                .and_then(|r| r.as_str())
                .and_then(|c| cx.index.class(c))
                .filter(|c| c.kind == ClassKind::Model && !c.associations.is_empty())
            else {
                continue;
            };
            let Some((_, d)) = first_active_arg(cx, call) else { continue };
            if !d.sources.contains(&SourceKind::Parameter) {
                continue;
            }
            out.push(
                Warning::new(
                    self.name(),
                    Category::for_role(cx.file.role),
                    "Unscoped Find",
                    Confidence::Weak,
                    format!("Unscoped call to {}.find", model.name),
                    &cx.file.path,
                )
                .with_node(call)
                .with_user_input(d.origin.as_ref().map(|o| o.code.clone())),
            );
        }
        Ok(out)
    }
}
