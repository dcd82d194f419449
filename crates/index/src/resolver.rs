//! Approximate call resolution over the indexed class table.
//!
//! Resolution returns a *set* of candidate method bodies rather than a
//! single target; anything that cannot be pinned to an indexed class
//! degrades to [`Resolution::Unknown`], which the taint engine treats
//! with its conservative fallback rule.

use crate::{AppIndex, ClassInfo, MethodInfo};
use ir::SyntaxNode;
use std::collections::{HashMap, HashSet};

/// Outcome of resolving a call site.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Candidate in-app method bodies, best match first.
    Methods(Vec<&'a MethodInfo>),
    /// Receiver type or method unknown; callers fall back to the
    /// conservative propagation rule.
    Unknown,
}

/// Precompute the method-lookup order for every class: the class itself,
/// its mixins (latest include first), then the superclass chain with its
/// own mixins, recursively. Cycles in the superclass chain are broken by
/// the visited set.
pub(crate) fn linearize(classes: &HashMap<String, ClassInfo>) -> HashMap<String, Vec<String>> {
    let mut out = HashMap::with_capacity(classes.len());
    for name in classes.keys() {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name.as_str());
        while let Some(cls) = current {
            if !seen.insert(cls.to_string()) {
                break;
            }
            order.push(cls.to_string());
            let Some(info) = classes.get(cls) else { break };
            for mixin in info.mixins.iter().rev() {
                if seen.insert(mixin.clone()) {
                    order.push(mixin.clone());
                }
            }
            current = info.superclass.as_deref();
        }
        out.insert(name.clone(), order);
    }
    out
}

impl AppIndex {
    /// Walks a class's precomputed lookup order for a method body.
    pub fn lookup_method(&self, class: &str, method: &str) -> Option<&MethodInfo> {
        let order = self.lookup_order.get(class)?;
        for cls in order {
            if let Some(m) = self.class(cls).and_then(|c| c.methods.get(method)) {
                return Some(m);
            }
        }
        None
    }

    /// Resolves a call site to candidate in-app bodies.
    ///
    /// Order: an explicit receiver naming a known class wins; an
    /// implicit/`self` receiver searches the current class and its
    /// ancestors; anything else is [`Resolution::Unknown`].
    pub fn resolve(
        &self,
        receiver_class: Option<&str>,
        method: &str,
        current_class: Option<&str>,
    ) -> Resolution<'_> {
        let target = match receiver_class {
            Some(cls) if self.class(cls).is_some() => Some(cls),
            Some(_) => return Resolution::Unknown,
            None => current_class,
        };
        match target {
            Some(cls) => match self.lookup_method(cls, method) {
                Some(m) => Resolution::Methods(vec![m]),
                None => Resolution::Unknown,
            },
            None => Resolution::Unknown,
        }
    }

    /// Approximate receiver typing: a call on a known class that yields an
    /// instance of it (`new`, finders). Anything else is not typed.
    pub fn instance_of(&self, call: &SyntaxNode) -> Option<String> {
        if call.tag != "call" {
            return None;
        }
        let name = call.as_str()?;
        let recv = call.child(0)?;
        if recv.tag != "const" {
            return None;
        }
        let class = recv.as_str()?;
        self.class(class)?;
        let yields_instance = matches!(name, "new" | "find" | "first" | "last" | "all")
            || name.starts_with("find_by");
        yields_instance.then(|| class.to_string())
    }
}
