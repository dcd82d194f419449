//! Unrestricted mass data binding: once per offending call site, plus
//! once per model lacking any attribute whitelist, independent of call
//! sites.

use super::{calls, receiver, Check, CheckContext};
use crate::taint::SourceKind;
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use ir::FileRole;

const BINDING_METHODS: &[&str] = &[
    "new",
    "create",
    "create!",
    "update_attributes",
    "update_attributes!",
    "attributes=",
];

pub struct MassAssignment;

impl Check for MassAssignment {
    fn name(&self) -> &'static str {
        "MassAssignment"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        matches!(role, FileRole::Controller | FileRole::Model | FileRole::Mixin)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !BINDING_METHODS.contains(&name) {
                continue;
            }
            let model_receiver = receiver(call)
                .filter(|r| r.tag == "const")
                .and_then(|r| r.as_str())
                .and_then(|c| cx.index.class(c))
                .is_some_and(|c| c.kind == index::ClassKind::Model)
                || receiver(call)
                    .filter(|r| r.tag == "call")
                    .and_then(|r| cx.index.instance_of(r))
                    .is_some()
                || receiver(call)
                    .filter(|r| r.tag == "lvar")
                    .and_then(|r| cx.taint.class_of(r))
                    .and_then(|c| cx.index.class(c))
                    .is_some_and(|c| c.kind == index::ClassKind::Model);
            if !model_receiver {
                continue;
            }
            for arg in call.children.iter().skip(1) {
                let raw_params = arg.tag == "params";
                let tainted_hash = cx
                    .taint
                    .active(arg)
                    .is_some_and(|d| d.sources.contains(&SourceKind::Parameter));
                if raw_params || tainted_hash {
                    let confidence = if raw_params {
                        Confidence::High
                    } else {
                        Confidence::Medium
                    };
                    out.push(
                        Warning::new(
                            self.name(),
                            Category::for_role(cx.file.role),
                            "Mass Assignment",
                            confidence,
                            "Unprotected mass assignment",
                            &cx.file.path,
                        )
                        .with_node(call)
                        .with_user_input(Some(arg.render())),
                    );
                    break;
                }
            }
        }
        Ok(out)
    }
}

pub struct AttributeRestriction;

impl Check for AttributeRestriction {
    fn name(&self) -> &'static str {
        "AttributeRestriction"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Model
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for model in cx.index.models() {
            if model.file != cx.file.path || model.accessible.is_some() {
                continue;
            }
            out.push(
                Warning::new(
                    self.name(),
                    Category::Model,
                    "Attribute Restriction",
                    Confidence::High,
                    format!(
                        "Mass assignment is not restricted using attr_accessible in {}",
                        model.name
                    ),
                    &model.file,
                )
                .with_line(model.line),
            );
        }
        Ok(out)
    }
}
