//! Independent vulnerability detectors consuming taint annotations plus
//! the app index. Checks are side-effect-free and order-independent; a
//! failing check is logged and isolated to that (check, file) pair.

use crate::fingerprint;
use crate::sanitizers::SanitizerTable;
use crate::taint::{FileTaint, SourceKind, TaintDescriptor};
use crate::warning::{Category, Warning};
use anyhow::Result;
use index::AppIndex;
use ir::{FileRole, FileSyntax, SyntaxNode};
use std::collections::HashSet;
use tracing::warn;

mod advisories;
mod command;
mod csrf;
mod dos;
mod eval;
mod file_access;
mod mass_assignment;
mod redirect;
mod reflection;
mod render_path;
mod routes;
mod session;
mod sql;
mod unscoped_find;
mod validation;
mod xss;

/// Everything a check may consult for one analysis unit.
pub struct CheckContext<'a> {
    pub index: &'a AppIndex,
    pub file: &'a FileSyntax,
    pub taint: &'a FileTaint,
    pub sanitizers: &'a SanitizerTable,
}

pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;
    fn applies_to(&self, role: FileRole) -> bool;
    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>>;
}

/// The full fixed registry.
pub fn default_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(eval::Eval),
        Box::new(command::CommandInjection),
        Box::new(sql::SqlInjection),
        Box::new(file_access::FileAccess),
        Box::new(redirect::Redirect),
        Box::new(render_path::DynamicRenderPath),
        Box::new(unscoped_find::UnscopedFind),
        Box::new(mass_assignment::MassAssignment),
        Box::new(mass_assignment::AttributeRestriction),
        Box::new(reflection::Constantize),
        Box::new(reflection::DangerousSend),
        Box::new(dos::SymbolDos),
        Box::new(dos::RegexDos),
        Box::new(xss::CrossSiteScripting),
        Box::new(csrf::Csrf),
        Box::new(session::SessionSettings),
        Box::new(advisories::VersionAdvisories),
        Box::new(routes::DefaultRoutes),
        Box::new(validation::FormatValidation),
    ]
}

/// Runs every applicable, enabled check over one unit, sealing
/// fingerprints on the way out. Check failures are logged and skipped.
pub fn run_checks(
    checks: &[Box<dyn Check>],
    cx: &CheckContext,
    disabled: &HashSet<String>,
) -> Vec<Warning> {
    let mut out = Vec::new();
    for check in checks {
        if disabled.contains(check.name()) || !check.applies_to(cx.file.role) {
            continue;
        }
        match check.run(cx) {
            Ok(warnings) => {
                for mut w in warnings {
                    fingerprint::seal(&mut w);
                    out.push(w);
                }
            }
            Err(e) => {
                warn!(check = check.name(), file = %cx.file.path, error = %e, "check failed");
            }
        }
    }
    out
}

/// Roles that carry analyzable code bodies.
pub(crate) fn code_role(role: FileRole) -> bool {
    matches!(
        role,
        FileRole::Controller | FileRole::Model | FileRole::Template | FileRole::Mixin
    )
}

/// Collects every call node in the file, depth first.
pub(crate) fn calls(file: &FileSyntax) -> Vec<&SyntaxNode> {
    let mut out = Vec::new();
    file.walk(&mut |n| {
        if n.tag == "call" {
            out.push(n);
        }
    });
    out
}

/// First argument of a call that still carries live taint.
pub(crate) fn first_active_arg<'a>(
    cx: &'a CheckContext,
    call: &'a SyntaxNode,
) -> Option<(&'a SyntaxNode, &'a TaintDescriptor)> {
    call.children
        .iter()
        .skip(1)
        .find_map(|arg| cx.taint.active(arg).map(|d| (arg, d)))
}

/// The call receiver, when explicit.
pub(crate) fn receiver<'a>(call: &'a SyntaxNode) -> Option<&'a SyntaxNode> {
    call.child(0).filter(|r| r.tag != "self")
}

/// Human phrase for the dominant source of a tainted value.
pub(crate) fn source_phrase(d: &TaintDescriptor) -> &'static str {
    if d.sources.contains(&SourceKind::Parameter) {
        "parameter value"
    } else if d.sources.contains(&SourceKind::Cookie) {
        "cookie value"
    } else if d.sources.contains(&SourceKind::Session) {
        "session value"
    } else if d.sources.contains(&SourceKind::RequestEnvironment) {
        "request value"
    } else if d.sources.contains(&SourceKind::ModelAttribute) {
        "model attribute"
    } else {
        "tainted value"
    }
}

/// Standard code warning: category from the file role, location and
/// implicated code from the call node, user input from the taint origin.
pub(crate) fn code_warning(
    cx: &CheckContext,
    check_name: &str,
    warning_type: &str,
    message: String,
    node: &SyntaxNode,
    descriptor: &TaintDescriptor,
) -> Warning {
    Warning::new(
        check_name,
        Category::for_role(cx.file.role),
        warning_type,
        descriptor.confidence,
        message,
        &cx.file.path,
    )
    .with_node(node)
    .with_user_input(descriptor.origin.as_ref().map(|o| o.code.clone()))
}
