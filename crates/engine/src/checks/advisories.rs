//! Known framework vulnerabilities gated on the declared version. Runs
//! only on the file that declares the version so each advisory fires at
//! most once per scan.

use super::{Check, CheckContext};
use crate::version;
use crate::warning::{Category, Confidence, Warning};
use anyhow::Result;
use ir::FileRole;

struct Advisory {
    warning_type: &'static str,
    /// First version that carries the fix.
    fixed_in: &'static str,
    message: &'static str,
    /// A method whose presence anywhere in the app counts as a manual
    /// mitigation and suppresses the advisory.
    workaround: Option<&'static str>,
}

const ADVISORIES: &[Advisory] = &[
    Advisory {
        warning_type: "Cross-Site Scripting",
        fixed_in: "2.3.13",
        message: "Versions before 2.3.13 have a vulnerability in strip_tags (CVE-2011-2931)",
        workaround: None,
    },
    Advisory {
        warning_type: "Response Splitting",
        fixed_in: "2.3.13",
        message: "Versions before 2.3.13 have a header injection vulnerability (CVE-2011-3186)",
        workaround: None,
    },
    Advisory {
        warning_type: "Remote Code Execution",
        fixed_in: "2.3.15",
        message: "Versions before 2.3.15 have a remote code execution vulnerability in parameter parsing (CVE-2013-0156)",
        workaround: Some("reject_xml_params"),
    },
];

pub struct VersionAdvisories;

impl Check for VersionAdvisories {
    fn name(&self) -> &'static str {
        "VersionAdvisories"
    }

    fn applies_to(&self, role: FileRole) -> bool {
        role == FileRole::Config
    }

    fn run(&self, cx: &CheckContext) -> Result<Vec<Warning>> {
        let Some(setting) = cx.index.setting("framework.version") else {
            return Ok(Vec::new());
        };
        if setting.file != cx.file.path {
            return Ok(Vec::new());
        }
        let declared = setting
            .value
            .as_str()
            .unwrap_or_default()
            .to_string();
        // Surfaces a malformed declaration as a check failure instead of
        // silently skipping every advisory.
        version::parse(&declared)?;

        let mut out = Vec::new();
        for advisory in ADVISORIES {
            if !version::below(&declared, advisory.fixed_in) {
                continue;
            }
            if let Some(method) = advisory.workaround {
                if cx.index.any_method_named(method) {
                    continue;
                }
            }
            out.push(Warning::new(
                self.name(),
                Category::Generic,
                advisory.warning_type,
                Confidence::Medium,
                format!("{} - upgrade to {}", advisory.message, advisory.fixed_in),
                &setting.file,
            ));
        }
        Ok(out)
    }
}
