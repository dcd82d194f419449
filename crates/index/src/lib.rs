//! Application index: one-pass registry of every class, method, scope,
//! validation, route and configuration assignment in the scanned app,
//! plus the approximate call resolution the taint engine depends on.
//!
//! Indexing is a synchronization barrier: the index is built once over all
//! files and is read-only afterwards, so analysis passes can share it
//! freely across threads. A structurally malformed file is recorded as a
//! [`StructuralError`] and skipped; the remaining files are still indexed.

use anyhow::{bail, Result};
use ir::{FileRole, FileSyntax, SyntaxNode};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

mod resolver;
pub use resolver::Resolution;

/// Classification of an indexed class.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ClassKind {
    Controller,
    Model,
    Mixin,
    Plain,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Serialize)]
/// A method (or scope pseudo-method) body reachable by the resolver.
pub struct MethodInfo {
    /// Class the method is defined on.
    pub owner: String,
    pub name: String,
    /// Declared parameter names, in order.
    pub params: Vec<String>,
    /// Body statements, shared with every analysis pass.
    #[serde(skip)]
    pub body: Arc<Vec<SyntaxNode>>,
    pub visibility: Visibility,
    pub line: usize,
}

impl MethodInfo {
    /// Stable identity used as memoization key: `Owner#name`.
    pub fn identity(&self) -> String {
        format!("{}#{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
/// A declared format/presence validation on a model attribute.
pub struct Validation {
    pub attribute: String,
    /// Source of the format regex, when the validation declares one.
    pub pattern: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub kind: ClassKind,
    pub superclass: Option<String>,
    /// Included mixins, in declaration order.
    pub mixins: Vec<String>,
    #[serde(skip)]
    pub methods: HashMap<String, MethodInfo>,
    /// Scope / named-query declarations, registered as pseudo-methods.
    pub scopes: Vec<String>,
    /// Names of owning associations (`belongs_to` declarations).
    pub associations: Vec<String>,
    pub validations: Vec<Validation>,
    /// Attribute whitelist (`attr_accessible`), when declared.
    pub accessible: Option<Vec<String>>,
    /// Whether a forgery-protection declaration appears on the class.
    pub csrf_protected: bool,
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub pattern: String,
    pub controller: String,
    pub action: String,
    pub constraints: Option<JsonValue>,
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
/// A configuration assignment (`setting` node), e.g. session flags or the
/// declared framework version.
pub struct Setting {
    pub path: String,
    pub value: JsonValue,
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Per-file indexing failure. Recorded, never fatal.
pub struct StructuralError {
    pub file: String,
    pub detail: String,
}

/// Read-only registry built once before any analysis pass.
#[derive(Debug, Default)]
pub struct AppIndex {
    classes: HashMap<String, ClassInfo>,
    /// Precomputed method-lookup order per class: the class itself,
    /// its mixins (latest include first), then the superclass chain.
    lookup_order: HashMap<String, Vec<String>>,
    routes: Vec<Route>,
    settings: Vec<Setting>,
    templates: HashMap<String, Arc<Vec<SyntaxNode>>>,
}

impl AppIndex {
    /// Indexes every file. Malformed files yield a [`StructuralError`]
    /// and are skipped; the index is still built from the rest.
    pub fn build(files: &[FileSyntax]) -> (Self, Vec<StructuralError>) {
        let mut index = AppIndex::default();
        let mut errors = Vec::new();
        for file in files {
            debug!(path = %file.path, "indexing file");
            if let Err(e) = index.index_file(file) {
                warn!(path = %file.path, error = %e, "structural parse failure");
                errors.push(StructuralError {
                    file: file.path.clone(),
                    detail: e.to_string(),
                });
            }
        }
        index.lookup_order = resolver::linearize(&index.classes);
        (index, errors)
    }

    fn index_file(&mut self, file: &FileSyntax) -> Result<()> {
        match file.role {
            FileRole::Controller | FileRole::Model | FileRole::Mixin => {
                // Stage classes so a malformed declaration later in the
                // file does not leave a half-indexed entry behind.
                let mut staged = Vec::new();
                for node in &file.nodes {
                    match node.tag.as_str() {
                        "class" | "mixin" => staged.push(index_class(node, file)?),
                        _ => {}
                    }
                }
                for class in staged {
                    self.classes.insert(class.name.clone(), class);
                }
            }
            FileRole::Template => {
                self.templates
                    .insert(file.path.clone(), Arc::new(file.nodes.clone()));
            }
            FileRole::Routes => {
                let mut staged = Vec::new();
                for node in &file.nodes {
                    if node.tag == "route" {
                        staged.push(index_route(node, &file.path)?);
                    }
                }
                self.routes.extend(staged);
            }
            FileRole::Config => {
                let mut staged = Vec::new();
                for node in &file.nodes {
                    if node.tag == "setting" {
                        staged.push(index_setting(node, &file.path)?);
                    }
                }
                self.settings.extend(staged);
            }
        }
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }

    pub fn controllers(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes
            .values()
            .filter(|c| c.kind == ClassKind::Controller)
    }

    pub fn models(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values().filter(|c| c.kind == ClassKind::Model)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn settings(&self) -> &[Setting] {
        &self.settings
    }

    pub fn setting(&self, path: &str) -> Option<&Setting> {
        self.settings.iter().find(|s| s.path == path)
    }

    /// Declared framework version in dotted-numeric form, when configured.
    pub fn framework_version(&self) -> Option<&str> {
        self.setting("framework.version").and_then(|s| s.value.as_str())
    }

    pub fn template(&self, path: &str) -> Option<&Arc<Vec<SyntaxNode>>> {
        self.templates.get(path)
    }

    /// Whether any class in the app defines a method with this name.
    /// Used by version-gated advisories to recognize workaround patterns.
    pub fn any_method_named(&self, name: &str) -> bool {
        self.classes.values().any(|c| c.methods.contains_key(name))
    }
}

fn index_class(node: &SyntaxNode, file: &FileSyntax) -> Result<ClassInfo> {
    let Some(name) = node.as_str() else {
        bail!("class declaration without a name at line {}", node.line);
    };
    let kind = if node.tag == "mixin" || file.role == FileRole::Mixin {
        ClassKind::Mixin
    } else {
        match file.role {
            FileRole::Controller => ClassKind::Controller,
            FileRole::Model => ClassKind::Model,
            _ => ClassKind::Plain,
        }
    };
    let mut class = ClassInfo {
        name: name.to_string(),
        kind,
        superclass: None,
        mixins: Vec::new(),
        methods: HashMap::new(),
        scopes: Vec::new(),
        associations: Vec::new(),
        validations: Vec::new(),
        accessible: None,
        csrf_protected: false,
        file: file.path.clone(),
        line: node.line,
    };
    let mut visibility = Visibility::Public;
    for child in &node.children {
        match child.tag.as_str() {
            "superclass" => class.superclass = child.as_str().map(str::to_string),
            "include" => {
                if let Some(m) = child.as_str() {
                    class.mixins.push(m.to_string());
                }
            }
            "private" => visibility = Visibility::Private,
            "def" => {
                let method = index_method(child, name, visibility)?;
                class.methods.insert(method.name.clone(), method);
            }
            "scope" => {
                let Some(scope_name) = child.as_str() else {
                    bail!("scope declaration without a name at line {}", child.line);
                };
                // Scope bodies become pseudo-methods so they are reachable
                // and checkable like ordinary methods.
                class.scopes.push(scope_name.to_string());
                class.methods.insert(
                    scope_name.to_string(),
                    MethodInfo {
                        owner: name.to_string(),
                        name: scope_name.to_string(),
                        params: Vec::new(),
                        body: Arc::new(child.children.clone()),
                        visibility: Visibility::Public,
                        line: child.line,
                    },
                );
            }
            "validates" => {
                if let Some(attr) = child.as_str() {
                    class.validations.push(Validation {
                        attribute: attr.to_string(),
                        pattern: None,
                        line: child.line,
                    });
                } else if let Some(obj) = child.value.as_object() {
                    class.validations.push(Validation {
                        attribute: obj
                            .get("attribute")
                            .and_then(|v| v.as_str())
                            .unwrap_or("")
                            .to_string(),
                        pattern: obj
                            .get("format")
                            .and_then(|v| v.as_str())
                            .map(str::to_string),
                        line: child.line,
                    });
                }
            }
            "attr_accessible" => {
                let attrs = match &child.value {
                    JsonValue::Array(items) => items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                    JsonValue::String(s) => vec![s.clone()],
                    _ => Vec::new(),
                };
                class.accessible = Some(attrs);
            }
            "belongs_to" => {
                if let Some(owner) = child.as_str() {
                    class.associations.push(owner.to_string());
                }
            }
            "csrf_protect" => class.csrf_protected = true,
            _ => {}
        }
    }
    Ok(class)
}

fn index_method(node: &SyntaxNode, owner: &str, visibility: Visibility) -> Result<MethodInfo> {
    let Some(name) = node.as_str() else {
        bail!("method definition without a name at line {}", node.line);
    };
    let mut params = Vec::new();
    let mut body = Vec::new();
    for child in &node.children {
        if child.tag == "args" {
            match &child.value {
                JsonValue::Array(items) => {
                    params.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)))
                }
                JsonValue::String(s) => params.push(s.clone()),
                _ => {}
            }
        } else {
            body.push(child.clone());
        }
    }
    Ok(MethodInfo {
        owner: owner.to_string(),
        name: name.to_string(),
        params,
        body: Arc::new(body),
        visibility,
        line: node.line,
    })
}

fn index_route(node: &SyntaxNode, file: &str) -> Result<Route> {
    let Some(obj) = node.value.as_object() else {
        bail!("route without declaration data at line {}", node.line);
    };
    let Some(controller) = obj.get("controller").and_then(|v| v.as_str()) else {
        bail!("route without a controller at line {}", node.line);
    };
    Ok(Route {
        pattern: obj
            .get("pattern")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        controller: controller.to_string(),
        action: obj
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        constraints: obj.get("constraints").cloned(),
        file: file.to_string(),
        line: node.line,
    })
}

fn index_setting(node: &SyntaxNode, file: &str) -> Result<Setting> {
    let Some(obj) = node.value.as_object() else {
        bail!("config assignment without data at line {}", node.line);
    };
    let Some(path) = obj.get("path").and_then(|v| v.as_str()) else {
        bail!("config assignment without a path at line {}", node.line);
    };
    Ok(Setting {
        path: path.to_string(),
        value: obj.get("value").cloned().unwrap_or(JsonValue::Null),
        file: file.to_string(),
        line: node.line,
    })
}
