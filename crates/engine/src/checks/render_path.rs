//! Render calls whose template path is computed from tainted input.

use super::{code_role, code_warning, source_phrase, Check, CheckContext};
use crate::warning::Warning;
use anyhow::Result;
use ir::{FileRole, SyntaxNode};

pub struct DynamicRenderPath;

impl Check for DynamicRenderPath {
    fn name(&self) -> &'static str {
        "DynamicRenderPath"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        code_role(role)
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut renders: Vec<&SyntaxNode> = Vec::new();
        cx.file.walk(&mut |n| {
            if n.tag == "render" {
                renders.push(n);
            }
        });
        let mut out = Vec::new();
        for node in renders {
            // A static path has no expression child and nothing to taint.
            let Some(d) = node.children.iter().find_map(|c| cx.taint.active(c)) else {
                continue;
            };
            out.push(code_warning(
                cx,
                self.name(),
                "Dynamic Render Path",
                format!("Render path contains {}", source_phrase(d)),
                node,
                d,
            ));
        }
        Ok(out)
    }
}
