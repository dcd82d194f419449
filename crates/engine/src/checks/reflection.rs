//! Reflection-based class resolution and dynamic dispatch fed by
//! tainted input.

use super::{calls, code_role, code_warning, first_active_arg, receiver, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::FileRole;

const REFLECTION_METHODS: &[&str] = &[
    "constantize",
    "safe_constantize",
    "const_get",
    "qualified_const_get",
];

pub struct Constantize;

impl Check for Constantize {
    fn name(&self) -> &'static str {
        "Constantize"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !REFLECTION_METHODS.contains(&name) {
                continue;
            }
            // constantize taints through its receiver, const_get through
            // its argument.
            let tainted = receiver(call)
                .and_then(|r| cx.taint.active(r))
                .or_else(|| first_active_arg(cx, call).map(|(_, d)| d));
            if let Some(d) = tainted {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "Remote Code Execution",
                    format!("Unsafe reflection method {name} called with parameter value"),
                    call,
                    d,
                ));
            }
        }
        Ok(out)
    }
}

const DISPATCH_METHODS: &[&str] = &["send", "__send__", "public_send", "try"];

pub struct DangerousSend;

impl Check for DangerousSend {
    fn name(&self) -> &'static str {
        "DangerousSend"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !DISPATCH_METHODS.contains(&name) {
                continue;
            }
            // Only the method-name argument makes dispatch dangerous.
            let Some(target) = call.child(1) else { continue };
            if let Some(d) = cx.taint.active(target) {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "Dangerous Send",
                    "User controlled method execution".to_string(),
                    call,
                    d,
                ));
            }
        }
        Ok(out)
    }
}
