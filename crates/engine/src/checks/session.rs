//! Weak session configuration: cookies readable from script, cookies
//! sent over plain HTTP, and short signing secrets.

use super::{Check, CheckContext};
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use ir::FileRole;

const MIN_SECRET_LEN: usize = 30;

pub struct SessionSettings;

impl Check for SessionSettings {
    fn name(&self) -> &'static str {
        "SessionSettings"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Config
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let mut out = Vec::new();
        for setting in cx.index.settings() {
            if setting.file != cx.file.path {
                continue;
            }
            let message = match setting.path.as_str() {
                "session.httponly" if setting.value.as_bool() == Some(false) => {
                    "Session cookies should be set to HTTP only".to_string()
                }
                "session.secure" if setting.value.as_bool() == Some(false) => {
                    "Session cookies should be restricted to HTTPS".to_string()
                }
                "session.secret" => {
                    let Some(secret) = setting.value.as_str() else { continue };
                    if secret.len() >= MIN_SECRET_LEN {
                        continue;
                    }
                    format!(
                        "Session secret should be at least {MIN_SECRET_LEN} characters long"
                    )
                }
                _ => continue,
            };
            out.push(
                Warning::new(
                    self.name(),
                    Category::Generic,
                    "Session Setting",
                    Confidence::High,
                    message,
                    &setting.file,
                )
                .with_line(setting.line),
            );
        }
        Ok(out)
    }
}
