//! Controllers that never enable request-forgery protection, directly or
//! through an ancestor.

use super::{Check, CheckContext};
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use index::{AppIndex, ClassInfo};
use ir::FileRole;
use std::collections::HashSet;

pub struct Csrf;

fn protected_anywhere(index: &AppIndex, class: &ClassInfo) -> bool {
    let mut seen = HashSet::new();
    let mut pending = vec![class.name.clone()];
    while let Some(name) = pending.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(info) = index.class(&name) else { continue };
        if info.csrf_protected {
            return true;
        }
        pending.extend(info.mixins.iter().cloned());
        if let Some(sup) = &info.superclass {
            pending.push(sup.clone());
        }
    }
    false
}

impl Check for Csrf {
    fn name(&self) -> &'static str {
        "Csrf"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Controller
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for controller in cx.index.controllers() {
            if controller.file != cx.file.path || protected_anywhere(cx.index, controller) {
                continue;
            }
            out.push(
                Warning::new(
                    self.name(),
                    Category::Controller,
                    "Cross-Site Request Forgery",
                    Confidence::High,
                    format!(
                        "Forgery protection is not enabled in {}",
                        controller.name
                    ),
                    &controller.file,
                )
                .with_line(controller.line),
            );
        }
        Ok(out)
    }
}
