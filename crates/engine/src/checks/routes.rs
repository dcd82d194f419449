//! Catch-all route patterns that expose every public controller method
//! as an action.

use super::{Check, CheckContext};
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use ir::FileRole;

pub struct DefaultRoutes;

impl Check for DefaultRoutes {
    fn name(&self) -> &'static str {
        "DefaultRoutes"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Routes
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for route in cx.index.routes() {
            if route.file != cx.file.path {
                continue;
            }
            if route.pattern.contains(":controller") && route.pattern.contains(":action") {
                out.push(
                    Warning::new(
                        self.name(),
                        Category::Generic,
                        "Default Routes",
                        Confidence::High,
                        "All public methods in controllers are available as actions",
                        &route.file,
                    )
                    .with_line(route.line),
                );
            }
        }
        Ok(out)
    }
}
