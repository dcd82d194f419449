//! Denial-of-service vectors: symbol interning and regular-expression
//! construction from tainted strings.

use super::{calls, code_role, code_warning, first_active_arg, receiver, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::FileRole;

pub struct SymbolDos;

impl Check for SymbolDos {
    fn name(&self) -> &'static str {
        "SymbolDos"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            if !matches!(call.as_str(), Some("to_sym") | Some("intern")) {
                continue;
            }
            let Some(d) = receiver(call).and_then(|r| cx.taint.active(r)) else {
                continue;
            };
            out.push(code_warning(
                cx,
                self.name(),
                "Denial of Service",
                "Symbol conversion from unsafe string".to_string(),
                call,
                d,
            ));
        }
        Ok(out)
    }
}

pub struct RegexDos;

impl Check for RegexDos {
    fn name(&self) -> &'static str {
        "RegexDos"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let regexp_ctor = matches!(call.as_str(), Some("new") | Some("union"))
                && receiver(call)
                    .filter(|r| r.tag == "const")
                    .and_then(|r| r.as_str())
                    == Some("Regexp");
            if !regexp_ctor {
                continue;
            }
            if let Some((_, d)) = first_active_arg(cx, call) {
                out.push(code_warning(
                    cx,
                    self.name(),
                    "Denial of Service",
                    "Parameter value used in regular expression".to_string(),
                    call,
                    d,
                ));
            }
        }
        Ok(out)
    }
}
