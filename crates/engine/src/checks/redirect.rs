//! Unvalidated redirect targets.

use super::{calls, code_warning, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::FileRole;

pub struct Redirect;

impl Check for Redirect {
    fn name(&self) -> &'static str {
        "Redirect"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Controller
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            if call.as_str() != Some("redirect_to") {
                continue;
            }
            let Some(target) = call.child(1) else { continue };
            // url_for and model lookups pin the destination to the app.
            if target.tag == "call" {
                if target.as_str() == Some("url_for") {
                    continue;
                }
                if cx.index.instance_of(target).is_some() {
                    continue;
                }
            }
            if let Some(d) = cx.taint.active(target) {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "Redirect",
                    "Possible unprotected redirect".to_string(),
                    call,
                    d,
                ));
            }
        }
        Ok(out)
    }
}
