//! Warning records emitted by checks, plus the confidence and category
//! vocabulary shared across the engine.

use ir::{FileRole, SyntaxNode};
use serde::{Deserialize, Serialize};

/// Graded certainty that a flow is truly exploitable. Ordinal, not a
/// probability: `High < Medium < Weak`, so the strongest grade is the
/// minimum.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Confidence {
    High,
    Medium,
    Weak,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
            Confidence::Weak => "Weak",
        }
    }

    /// One step toward Weak, used by the conservative unknown-call rule.
    pub fn downgraded(self) -> Confidence {
        match self {
            Confidence::High => Confidence::Medium,
            _ => Confidence::Weak,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Controller,
    Model,
    Template,
    Generic,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Controller => "controller",
            Category::Model => "model",
            Category::Template => "template",
            Category::Generic => "generic",
        }
    }

    /// Category of a code warning raised in a file of the given role.
    pub fn for_role(role: FileRole) -> Category {
        match role {
            FileRole::Controller => Category::Controller,
            FileRole::Model | FileRole::Mixin => Category::Model,
            FileRole::Template => Category::Template,
            FileRole::Routes | FileRole::Config => Category::Generic,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A single finding. Immutable once sealed by the check registry; the
/// fingerprint is derived from content only, never from line numbers.
pub struct Warning {
    pub check_name: String,
    pub category: Category,
    pub warning_type: String,
    pub confidence: Confidence,
    pub message: String,
    pub file: String,
    /// Absent for whole-file and version advisories.
    pub line: Option<usize>,
    pub implicated_code: Option<String>,
    /// Rendered origin of the tainted value, when there is one.
    pub user_input: Option<String>,
    pub fingerprint: String,
    /// Literal-elided rendering of the implicated expression; feeds the
    /// fingerprint and is not part of the report surface.
    #[serde(skip)]
    pub(crate) skeleton: String,
}

impl Warning {
    pub fn new(
        check_name: &str,
        category: Category,
        warning_type: &str,
        confidence: Confidence,
        message: impl Into<String>,
        file: &str,
    ) -> Self {
        Self {
            check_name: check_name.to_string(),
            category,
            warning_type: warning_type.to_string(),
            confidence,
            message: message.into(),
            file: file.to_string(),
            line: None,
            implicated_code: None,
            user_input: None,
            fingerprint: String::new(),
            skeleton: String::new(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach the implicated expression; its rendering goes into the
    /// report and its literal-elided skeleton into the fingerprint.
    pub fn with_node(mut self, node: &SyntaxNode) -> Self {
        self.line = Some(node.line);
        self.implicated_code = Some(node.render());
        self.skeleton = node.skeleton();
        self
    }

    /// Attach pre-rendered code, used when the node is no longer at hand
    /// (sink findings collected during the taint pass).
    pub fn with_rendered(mut self, code: String, skeleton: String) -> Self {
        self.implicated_code = Some(code);
        self.skeleton = skeleton;
        self
    }

    pub fn with_user_input(mut self, input: Option<String>) -> Self {
        self.user_input = input;
        self
    }
}
