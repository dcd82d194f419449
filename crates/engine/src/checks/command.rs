//! Shell-command construction from tainted input.

use super::{calls, code_role, code_warning, first_active_arg, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::FileRole;
use tracing::debug;

const COMMAND_METHODS: &[&str] = &["system", "exec", "popen", "capture2", "spawn", "xstr"];

pub struct CommandInjection;

impl Check for CommandInjection {
    fn name(&self) -> &'static str {
        "CommandInjection"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !COMMAND_METHODS.contains(&name) {
                continue;
            }
            if let Some((_, d)) = first_active_arg(cx, call) {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "Command Injection",
                    "Possible command injection".to_string(),
                    call,
                    d,
                ));
                continue;
            }
            // Constant invocations: split the literal into an argv to
            // confirm there is nothing dynamic hiding in the string.
            if let Some(lit) = call
                .children
                .iter()
                .skip(1)
                .find(|a| a.tag == "str")
                .and_then(|a| a.as_str())
            {
                if shlex::split(lit).is_none() {
                    debug!(file = %cx.file.path, line = call.line, "unparsable constant command skipped");
                }
            }
        }
        Ok(out)
    }
}
