//! Dynamic evaluation of tainted strings.

use super::{calls, code_role, code_warning, first_active_arg, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::FileRole;

const EVAL_METHODS: &[&str] = &["eval", "instance_eval", "class_eval", "module_eval"];

pub struct Eval;

impl Check for Eval {
    fn name(&self) -> &'static str {
        "Eval"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !EVAL_METHODS.contains(&name) {
                continue;
            }
            if let Some((_, d)) = first_active_arg(cx, call) {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "Dangerous Eval",
                    format!("User input in {name}"),
                    call,
                    d,
                ));
            }
        }
        Ok(out)
    }
}
