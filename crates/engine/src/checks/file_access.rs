//! File-path construction from tainted input.

use super::{calls, code_role, code_warning, first_active_arg, receiver, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::FileRole;

const FILE_METHODS: &[&str] = &["open", "read", "readlines", "write", "delete", "foreach"];
const FILE_CLASSES: &[&str] = &["File", "IO", "Dir", "Pathname"];

pub struct FileAccess;

impl Check for FileAccess {
    fn name(&self) -> &'static str {
        "FileAccess"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !FILE_METHODS.contains(&name) {
                continue;
            }
            let on_file_class = receiver(call)
                .filter(|r| r.tag == "const")
                .and_then(|r| r.as_str())
                .is_some_and(|c| FILE_CLASSES.contains(&c));
            if !on_file_class {
                continue;
            }
            if let Some((_, d)) = first_active_arg(cx, call) {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "File Access",
                    "Parameter value used in file name".to_string(),
                    call,
                    d,
                ));
            }
        }
        Ok(out)
    }
}
