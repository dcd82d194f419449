//! Query construction where a tainted string reaches a query call
//! without passing a parameterization boundary.

use super::{calls, code_role, code_warning, source_phrase, Check, CheckContext};
use crate::taint::TaintDescriptor;
use crate::warning::Warning;
use anyhow::Result;
use ir::{FileRole, SyntaxNode};

const QUERY_METHODS: &[&str] = &[
    "find_by_sql",
    "where",
    "execute",
    "select_all",
    "count_by_sql",
    "order",
    "group",
    "having",
];

/// Live taint carried by a query argument: the argument itself, or a
/// string construction nested inside a conditions hash/array. Plain
/// values inside a container are parameter slots and stay clean; only
/// interpolated query text is attacker-controlled SQL.
fn tainted_fragment<'a>(
    cx: &CheckContext<'a>,
    arg: &'a SyntaxNode,
) -> Option<&'a TaintDescriptor> {
    if let Some(d) = cx.taint.active(arg) {
        return Some(d);
    }
    let mut found = None;
    arg.walk(&mut |n| {
        if found.is_none() && n.tag == "dstr" {
            found = cx.taint.active(n);
        }
    });
    found
}

pub struct SqlInjection;

impl Check for SqlInjection {
    fn name(&self) -> &'static str {
        "SqlInjection"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for call in calls(cx.file) {
            let Some(name) = call.as_str() else { continue };
            if !QUERY_METHODS.contains(&name) {
                continue;
            }
            for arg in call.children.iter().skip(1) {
                let Some(d) = tainted_fragment(cx, arg) else { continue };
                out.push(code_warning(
                    cx,
                    self.name(),
                    "SQL Injection",
                    format!("Possible SQL injection from {}", source_phrase(d)),
                    call,
                    d,
                ));
                break;
            }
        }
        Ok(out)
    }
}
