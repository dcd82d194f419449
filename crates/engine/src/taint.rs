//! Forward taint pass over method and template bodies.
//!
//! One pass, no fixpoint: a loop body is analyzed once, trading
//! completeness for tractability and a low false-positive rate. The pass
//! never mutates syntax nodes; results live in a side table keyed by node
//! id plus a list of classified sink reaches. Calls into in-app methods
//! recurse through the resolver, with summaries memoized per method
//! identity and an active-stack guard breaking cycles.

use crate::sanitizers::{SanitizerTable, SinkContext};
use crate::warning::Confidence;
use index::{AppIndex, MethodInfo, Resolution};
use ir::{FileRole, FileSyntax, SyntaxNode};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Untrusted input source a value is associated with.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Parameter,
    Cookie,
    Session,
    RequestEnvironment,
    ModelAttribute,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
/// Where a tainted value entered the program.
pub struct Origin {
    pub code: String,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize)]
/// Taint attached to one expression value. Transient, per analysis pass.
pub struct TaintDescriptor {
    pub tainted: bool,
    pub sources: BTreeSet<SourceKind>,
    pub confidence: Confidence,
    /// Sanitizers applied to the value, in application order. A non-empty
    /// list deactivates the descriptor for propagation; render sinks
    /// re-examine it against their own required set.
    pub sanitized_by: Vec<String>,
    pub origin: Option<Origin>,
    /// True when the taint flows purely from a callee's formal parameters
    /// (used by memoized summaries, not surfaced in warnings).
    #[serde(skip)]
    pub(crate) argument_derived: bool,
}

impl TaintDescriptor {
    pub fn clean() -> Self {
        Self {
            tainted: false,
            sources: BTreeSet::new(),
            confidence: Confidence::Weak,
            sanitized_by: Vec::new(),
            origin: None,
            argument_derived: false,
        }
    }

    pub fn source(kind: SourceKind, confidence: Confidence, origin: Origin) -> Self {
        let mut sources = BTreeSet::new();
        sources.insert(kind);
        Self {
            tainted: true,
            sources,
            confidence,
            sanitized_by: Vec::new(),
            origin: Some(origin),
            argument_derived: false,
        }
    }

    /// Symbolic binding for a callee's formal parameter.
    fn argument() -> Self {
        Self {
            tainted: true,
            sources: BTreeSet::new(),
            confidence: Confidence::High,
            sanitized_by: Vec::new(),
            origin: None,
            argument_derived: true,
        }
    }

    /// Whether the value still carries live taint: tainted and not yet
    /// passed through any sanitizer.
    pub fn active(&self) -> bool {
        self.tainted && self.sanitized_by.is_empty()
    }

    /// Records a sanitizer application. Taint stays visible to sinks but
    /// stops propagating.
    pub fn sanitized(mut self, name: &str) -> Self {
        self.sanitized_by.push(name.to_string());
        self
    }

    /// Branch-join union: tainted if either arm taints, confidence is the
    /// strongest among tainted arms, sources union, and only sanitizers
    /// applied on every tainted arm survive.
    pub fn merge(a: &Self, b: &Self) -> Self {
        match (a.tainted, b.tainted) {
            (false, false) => Self::clean(),
            (true, false) => a.clone(),
            (false, true) => b.clone(),
            (true, true) => Self {
                tainted: true,
                sources: a.sources.union(&b.sources).copied().collect(),
                confidence: a.confidence.min(b.confidence),
                sanitized_by: a
                    .sanitized_by
                    .iter()
                    .filter(|s| b.sanitized_by.contains(s))
                    .cloned()
                    .collect(),
                origin: if a.confidence <= b.confidence {
                    a.origin.clone().or_else(|| b.origin.clone())
                } else {
                    b.origin.clone().or_else(|| a.origin.clone())
                },
                argument_derived: a.argument_derived || b.argument_derived,
            },
        }
    }

    /// String-construction combine: tainted if any operand is live,
    /// confidence is the weakest among live operands, sanitized operands
    /// excluded entirely.
    pub fn concat(a: &Self, b: &Self) -> Self {
        match (a.active(), b.active()) {
            (false, false) => Self::clean(),
            (true, false) => a.clone(),
            (false, true) => b.clone(),
            (true, true) => Self {
                tainted: true,
                sources: a.sources.union(&b.sources).copied().collect(),
                confidence: a.confidence.max(b.confidence),
                sanitized_by: Vec::new(),
                origin: a.origin.clone().or_else(|| b.origin.clone()),
                argument_derived: a.argument_derived || b.argument_derived,
            },
        }
    }
}

/// Local-variable environment, threaded forward through a body and merged
/// at branch joins. Also carries approximate class bindings for locals
/// assigned from recognized constructors/finders.
#[derive(Debug, Clone, Default)]
pub struct TaintEnv {
    vars: HashMap<String, TaintDescriptor>,
    classes: HashMap<String, String>,
}

impl TaintEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&TaintDescriptor> {
        self.vars.get(name)
    }

    /// Last write wins; there is no static single-assignment form.
    pub fn set(&mut self, name: &str, d: TaintDescriptor) {
        self.vars.insert(name.to_string(), d);
    }

    pub fn class_of(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }

    pub fn set_class(&mut self, name: &str, class: String) {
        self.classes.insert(name.to_string(), class);
    }

    /// Union-merge of branch environments. A variable is tainted at the
    /// join if any arm taints it; a class binding survives only when every
    /// arm agrees on it.
    pub fn merge_branches(mut branches: Vec<TaintEnv>) -> TaintEnv {
        let Some(first) = branches.pop() else {
            return TaintEnv::new();
        };
        let mut out = first;
        for env in branches {
            let mut keys: BTreeSet<String> = out.vars.keys().cloned().collect();
            keys.extend(env.vars.keys().cloned());
            let mut merged = HashMap::with_capacity(keys.len());
            for key in keys {
                let a = out.vars.get(&key).cloned().unwrap_or_else(TaintDescriptor::clean);
                let b = env.vars.get(&key).cloned().unwrap_or_else(TaintDescriptor::clean);
                merged.insert(key, TaintDescriptor::merge(&a, &b));
            }
            out.vars = merged;
            out.classes.retain(|k, v| env.classes.get(k) == Some(v));
        }
        out
    }
}

/// Memoized per-method taint summaries. The only mutable state shared
/// between parallel analysis passes: write-once per key, first writer
/// wins, since a summary is a pure function of the method body and the
/// index.
#[derive(Debug, Default)]
pub struct MemoCache {
    map: RwLock<HashMap<String, TaintDescriptor>>,
}

impl MemoCache {
    pub fn get(&self, key: &str) -> Option<TaintDescriptor> {
        self.map
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Inserts unless present; returns the stored value either way.
    pub fn insert_once(&self, key: &str, value: TaintDescriptor) -> TaintDescriptor {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.entry(key.to_string()).or_insert(value).clone()
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
/// A tainted value reaching a render boundary, classified by context.
pub struct SinkFinding {
    /// File owning the output node (a shared partial keeps its own path,
    /// so identical content collapses under one fingerprint).
    pub file: String,
    pub line: usize,
    pub context: SinkContext,
    pub descriptor: TaintDescriptor,
    pub code: String,
    pub skeleton: String,
}

/// Result of one file's taint pass: a node-id side table plus every
/// classified sink reach.
#[derive(Debug, Default)]
pub struct FileTaint {
    pub annotations: HashMap<usize, TaintDescriptor>,
    /// Approximate class bindings observed on local-variable reads, by
    /// node id. Lets checks type lvar receivers the way the pass did.
    pub classes: HashMap<usize, String>,
    pub sinks: Vec<SinkFinding>,
}

impl FileTaint {
    pub fn descriptor(&self, node: &SyntaxNode) -> Option<&TaintDescriptor> {
        self.annotations.get(&node.id)
    }

    pub fn class_of(&self, node: &SyntaxNode) -> Option<&str> {
        self.classes.get(&node.id).map(String::as_str)
    }

    /// Descriptor for the node, if it still carries live taint.
    pub fn active(&self, node: &SyntaxNode) -> Option<&TaintDescriptor> {
        self.descriptor(node).filter(|d| d.active())
    }
}

struct PassCx {
    out: FileTaint,
    /// File owning the nodes currently under evaluation; switches while a
    /// rendered partial is inlined.
    file: String,
    /// Whether node annotations are recorded. Off inside callee bodies and
    /// inlined partials, whose node ids belong to other files.
    record: bool,
    current_class: Option<String>,
    /// Active method identities and partial paths, for cycle breaking.
    stack: Vec<String>,
    /// Explicit `return` descriptors of the current method frame.
    returns: Vec<TaintDescriptor>,
    /// Stack index of the outermost frame a detected call cycle reaches,
    /// `usize::MAX` when none. Summaries computed inside that region vary
    /// with the caller chain and must not enter the shared cache.
    cycle_low: usize,
}

/// The taint engine proper. Holds only shared read-only state plus the
/// memo cache, so one instance serves every parallel analysis unit.
pub struct TaintEngine<'a> {
    index: &'a AppIndex,
    sanitizers: &'a SanitizerTable,
    memo: &'a MemoCache,
}

impl<'a> TaintEngine<'a> {
    pub fn new(index: &'a AppIndex, sanitizers: &'a SanitizerTable, memo: &'a MemoCache) -> Self {
        Self {
            index,
            sanitizers,
            memo,
        }
    }

    /// Analyzes every method/scope body (controllers, models, mixins) or
    /// the whole template, producing the file's side table and sinks.
    pub fn analyze_file(&self, file: &FileSyntax) -> FileTaint {
        let mut cx = PassCx {
            out: FileTaint::default(),
            file: file.path.clone(),
            record: true,
            current_class: None,
            stack: Vec::new(),
            returns: Vec::new(),
            cycle_low: usize::MAX,
        };
        match file.role {
            FileRole::Controller | FileRole::Model | FileRole::Mixin => {
                for class_node in &file.nodes {
                    if !matches!(class_node.tag.as_str(), "class" | "mixin") {
                        continue;
                    }
                    cx.current_class = class_node.as_str().map(str::to_string);
                    for member in &class_node.children {
                        match member.tag.as_str() {
                            "def" => {
                                let mut env = TaintEnv::new();
                                cx.returns.clear();
                                for stmt in member.children.iter().filter(|c| c.tag != "args") {
                                    self.eval(stmt, &mut env, &mut cx);
                                }
                            }
                            "scope" => {
                                let mut env = TaintEnv::new();
                                cx.returns.clear();
                                for stmt in &member.children {
                                    self.eval(stmt, &mut env, &mut cx);
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
            FileRole::Template => {
                let mut env = TaintEnv::new();
                for node in &file.nodes {
                    self.eval(node, &mut env, &mut cx);
                }
            }
            FileRole::Routes | FileRole::Config => {}
        }
        cx.out
    }

    fn eval(&self, node: &SyntaxNode, env: &mut TaintEnv, cx: &mut PassCx) -> TaintDescriptor {
        let d = self.eval_inner(node, env, cx);
        if cx.record {
            cx.out.annotations.insert(node.id, d.clone());
        }
        d
    }

    fn eval_inner(
        &self,
        node: &SyntaxNode,
        env: &mut TaintEnv,
        cx: &mut PassCx,
    ) -> TaintDescriptor {
        let origin = || Origin {
            code: node.render(),
            line: node.line,
        };
        match node.tag.as_str() {
            "params" => TaintDescriptor::source(SourceKind::Parameter, Confidence::High, origin()),
            "cookies" => TaintDescriptor::source(SourceKind::Cookie, Confidence::High, origin()),
            "session" => TaintDescriptor::source(SourceKind::Session, Confidence::High, origin()),
            "request_env" => TaintDescriptor::source(
                SourceKind::RequestEnvironment,
                Confidence::High,
                origin(),
            ),
            "attr" => TaintDescriptor::source(
                SourceKind::ModelAttribute,
                Confidence::Medium,
                origin(),
            ),
            "lvar" => {
                let Some(name) = node.as_str() else {
                    return TaintDescriptor::clean();
                };
                if cx.record {
                    if let Some(cls) = env.class_of(name) {
                        cx.out.classes.insert(node.id, cls.to_string());
                    }
                }
                env.get(name).cloned().unwrap_or_else(TaintDescriptor::clean)
            }
            "lasgn" => {
                let d = node
                    .child(0)
                    .map(|rhs| self.eval(rhs, env, cx))
                    .unwrap_or_else(TaintDescriptor::clean);
                if let Some(name) = node.as_str() {
                    env.set(name, d.clone());
                    if let Some(cls) = node.child(0).and_then(|rhs| self.index.instance_of(rhs)) {
                        env.set_class(name, cls);
                    }
                }
                d
            }
            "dstr" => {
                let mut acc = TaintDescriptor::clean();
                for c in &node.children {
                    let d = self.eval(c, env, cx);
                    acc = TaintDescriptor::concat(&acc, &d);
                }
                acc
            }
            "if" => {
                if let Some(cond) = node.child(0) {
                    self.eval(cond, env, cx);
                }
                let mut then_env = env.clone();
                let then_d = node
                    .child(1)
                    .map(|n| self.eval(n, &mut then_env, cx))
                    .unwrap_or_else(TaintDescriptor::clean);
                let (else_env, else_d) = match node.child(2) {
                    Some(n) => {
                        let mut e = env.clone();
                        let d = self.eval(n, &mut e, cx);
                        (e, d)
                    }
                    // No else arm: the untaken path keeps the incoming env.
                    None => (env.clone(), TaintDescriptor::clean()),
                };
                *env = TaintEnv::merge_branches(vec![then_env, else_env]);
                TaintDescriptor::merge(&then_d, &else_d)
            }
            "case" => {
                let mut envs = Vec::with_capacity(node.children.len());
                let mut d = TaintDescriptor::clean();
                for arm in &node.children {
                    let mut e = env.clone();
                    let arm_d = self.eval(arm, &mut e, cx);
                    d = TaintDescriptor::merge(&d, &arm_d);
                    envs.push(e);
                }
                if envs.is_empty() {
                    envs.push(env.clone());
                }
                *env = TaintEnv::merge_branches(envs);
                d
            }
            "block" => {
                let mut last = TaintDescriptor::clean();
                for c in &node.children {
                    last = self.eval(c, env, cx);
                }
                last
            }
            "return" => {
                let d = node
                    .child(0)
                    .map(|c| self.eval(c, env, cx))
                    .unwrap_or_else(TaintDescriptor::clean);
                cx.returns.push(d.clone());
                d
            }
            "output" => {
                let context = node
                    .as_str()
                    .and_then(SinkContext::parse)
                    .unwrap_or(SinkContext::Body);
                if let Some(child) = node.child(0) {
                    let d = self.eval(child, env, cx);
                    if d.tainted {
                        cx.out.sinks.push(SinkFinding {
                            file: cx.file.clone(),
                            line: node.line,
                            context,
                            descriptor: d,
                            code: child.render(),
                            skeleton: child.skeleton(),
                        });
                    }
                }
                TaintDescriptor::clean()
            }
            "render" => {
                // A dynamic path expression is evaluated so render-path
                // checks see its taint; only a static path can be inlined.
                for c in &node.children {
                    self.eval(c, env, cx);
                }
                self.inline_partial(node, cx);
                TaintDescriptor::clean()
            }
            "call" => self.eval_call(node, env, cx),
            _ => {
                // Unknown structural tags (arrays, hashes, conditions
                // lists) are parameterization boundaries: children are
                // still analyzed for annotations but taint stops here.
                for c in &node.children {
                    self.eval(c, env, cx);
                }
                TaintDescriptor::clean()
            }
        }
    }

    fn inline_partial(&self, node: &SyntaxNode, cx: &mut PassCx) {
        let Some(path) = node.as_str() else { return };
        if cx.stack.iter().any(|s| s == path) {
            return;
        }
        let Some(body) = self.index.template(path).map(Arc::clone) else {
            return;
        };
        cx.stack.push(path.to_string());
        let saved_file = std::mem::replace(&mut cx.file, path.to_string());
        let saved_record = std::mem::replace(&mut cx.record, false);
        let mut env = TaintEnv::new();
        for n in body.iter() {
            self.eval(n, &mut env, cx);
        }
        cx.record = saved_record;
        cx.file = saved_file;
        cx.stack.pop();
    }

    fn eval_call(&self, node: &SyntaxNode, env: &mut TaintEnv, cx: &mut PassCx) -> TaintDescriptor {
        let Some(name) = node.as_str().map(str::to_string) else {
            for c in &node.children {
                self.eval(c, env, cx);
            }
            return TaintDescriptor::clean();
        };
        let mut child_ds = Vec::with_capacity(node.children.len());
        for c in &node.children {
            child_ds.push(self.eval(c, env, cx));
        }
        let recv = node.child(0);
        let recv_d = match recv {
            Some(r) if !matches!(r.tag.as_str(), "self" | "const") => child_ds.first().cloned(),
            _ => None,
        };
        let arg_ds: &[TaintDescriptor] = if child_ds.is_empty() {
            &[]
        } else {
            &child_ds[1..]
        };

        // Sanitizer catalogue wins over resolution.
        if let Some(s) = self.sanitizers.lookup(&name, self.index.framework_version()) {
            let mut base = recv_d.unwrap_or_else(TaintDescriptor::clean);
            for d in arg_ds {
                base = TaintDescriptor::concat(&base, d);
            }
            return base.sanitized(s.name);
        }

        // Approximate receiver typing: None = implicit receiver,
        // Some(class) = pinned, unresolvable receivers fall out as Unknown.
        enum Recv {
            Implicit,
            Class(String),
            Unresolved,
        }
        let receiver = match recv {
            None => Recv::Implicit,
            Some(r) => match r.tag.as_str() {
                "self" => Recv::Implicit,
                "const" => match r.as_str() {
                    Some(c) => Recv::Class(c.to_string()),
                    None => Recv::Unresolved,
                },
                "lvar" => match r.as_str().and_then(|v| env.class_of(v)) {
                    Some(c) => Recv::Class(c.to_string()),
                    None => Recv::Unresolved,
                },
                "call" => match self.index.instance_of(r) {
                    Some(c) => Recv::Class(c),
                    None => Recv::Unresolved,
                },
                _ => Recv::Unresolved,
            },
        };
        let resolution = match &receiver {
            Recv::Implicit => self.index.resolve(None, &name, cx.current_class.as_deref()),
            Recv::Class(c) => self.index.resolve(Some(c), &name, cx.current_class.as_deref()),
            Recv::Unresolved => Resolution::Unknown,
        };

        match resolution {
            Resolution::Methods(candidates) => {
                let mut summary: Option<TaintDescriptor> = None;
                for m in candidates {
                    match self.analyze_method(m, cx) {
                        Some(s) => {
                            summary = Some(match summary {
                                Some(prev) => TaintDescriptor::merge(&prev, &s),
                                None => s,
                            });
                        }
                        // Cycle: fall back to the conservative rule.
                        None => return unknown_call(recv_d, arg_ds),
                    }
                }
                match summary {
                    Some(s) => apply_summary(&name, &s, recv_d, arg_ds),
                    None => unknown_call(recv_d, arg_ds),
                }
            }
            Resolution::Unknown => unknown_call(recv_d, arg_ds),
        }
    }

    /// Analyzes a resolved callee with formals bound to symbolic tainted
    /// arguments, memoizing the return summary. `None` signals a cycle.
    fn analyze_method(&self, m: &MethodInfo, cx: &mut PassCx) -> Option<TaintDescriptor> {
        let key = m.identity();
        if let Some(d) = self.memo.get(&key) {
            return Some(d);
        }
        if let Some(pos) = cx.stack.iter().position(|s| s == &key) {
            cx.cycle_low = cx.cycle_low.min(pos);
            return None;
        }
        let frame = cx.stack.len();
        cx.stack.push(key.clone());
        let saved_returns = std::mem::take(&mut cx.returns);
        let saved_record = std::mem::replace(&mut cx.record, false);
        let saved_class = std::mem::replace(&mut cx.current_class, Some(m.owner.clone()));

        let mut env = TaintEnv::new();
        for p in &m.params {
            env.set(p, TaintDescriptor::argument());
        }
        let mut ret = TaintDescriptor::clean();
        for stmt in m.body.iter() {
            ret = self.eval(stmt, &mut env, cx);
        }
        for r in std::mem::take(&mut cx.returns) {
            ret = TaintDescriptor::merge(&ret, &r);
        }

        cx.returns = saved_returns;
        cx.record = saved_record;
        cx.current_class = saved_class;
        cx.stack.pop();

        // A summary computed while the cycle guard fired depends on the
        // caller chain; caching it would make results depend on which
        // analysis unit got here first.
        let in_cycle = cx.cycle_low <= frame;
        if cx.cycle_low == frame {
            cx.cycle_low = usize::MAX;
        }
        if in_cycle {
            debug!(method = %key, "cycle-involved summary recomputed per caller");
            return Some(ret);
        }
        debug!(method = %key, tainted = ret.tainted, "memoized method summary");
        Some(self.memo.insert_once(&key, ret))
    }
}

/// Conservative fallback for unresolved calls: tainted if the receiver or
/// any argument is live, confidence downgraded one step, `Unknown` added
/// to the source set.
fn unknown_call(recv_d: Option<TaintDescriptor>, arg_ds: &[TaintDescriptor]) -> TaintDescriptor {
    let mut base = recv_d.unwrap_or_else(TaintDescriptor::clean);
    for d in arg_ds {
        base = TaintDescriptor::concat(&base, d);
    }
    if !base.active() {
        return TaintDescriptor::clean();
    }
    base.confidence = base.confidence.downgraded();
    base.sources.insert(SourceKind::Unknown);
    base
}

/// Projects a memoized callee summary onto the actual call site.
fn apply_summary(
    method_name: &str,
    summary: &TaintDescriptor,
    recv_d: Option<TaintDescriptor>,
    arg_ds: &[TaintDescriptor],
) -> TaintDescriptor {
    if !summary.tainted {
        return TaintDescriptor::clean();
    }
    let mut base = recv_d.unwrap_or_else(TaintDescriptor::clean);
    for d in arg_ds {
        base = TaintDescriptor::concat(&base, d);
    }
    let mut parts: Vec<TaintDescriptor> = Vec::new();
    if summary.argument_derived && base.tainted {
        let mut through = base;
        if !summary.sanitized_by.is_empty() {
            // The callee cleansed its input: the call acts as a local
            // sanitize-style method and records itself.
            through.sanitized_by.extend(summary.sanitized_by.iter().cloned());
            through.sanitized_by.push(method_name.to_string());
        }
        parts.push(through);
    }
    if !summary.sources.is_empty() {
        // The callee reads untrusted sources of its own.
        let mut own = summary.clone();
        own.argument_derived = false;
        parts.push(own);
    }
    parts
        .into_iter()
        .reduce(|a, b| TaintDescriptor::merge(&a, &b))
        .unwrap_or_else(TaintDescriptor::clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_strongest_confidence_across_tainted_arms() {
        let a = TaintDescriptor::source(
            SourceKind::Parameter,
            Confidence::High,
            Origin { code: "params[:q]".into(), line: 1 },
        );
        let b = TaintDescriptor::source(
            SourceKind::ModelAttribute,
            Confidence::Medium,
            Origin { code: ".name".into(), line: 2 },
        );
        let m = TaintDescriptor::merge(&a, &b);
        assert!(m.tainted);
        assert_eq!(m.confidence, Confidence::High);
        assert!(m.sources.contains(&SourceKind::Parameter));
        assert!(m.sources.contains(&SourceKind::ModelAttribute));
    }

    #[test]
    fn merge_with_untainted_arm_keeps_taint() {
        let a = TaintDescriptor::source(
            SourceKind::Parameter,
            Confidence::High,
            Origin { code: "params[:q]".into(), line: 1 },
        );
        let m = TaintDescriptor::merge(&a, &TaintDescriptor::clean());
        assert!(m.tainted);
        assert_eq!(m.confidence, Confidence::High);
    }

    #[test]
    fn concat_takes_weakest_contributing_confidence() {
        let a = TaintDescriptor::source(
            SourceKind::Parameter,
            Confidence::High,
            Origin { code: "params[:q]".into(), line: 1 },
        );
        let b = TaintDescriptor::source(
            SourceKind::ModelAttribute,
            Confidence::Medium,
            Origin { code: ".name".into(), line: 1 },
        );
        assert_eq!(TaintDescriptor::concat(&a, &b).confidence, Confidence::Medium);
    }

    #[test]
    fn concat_excludes_sanitized_operands() {
        let a = TaintDescriptor::source(
            SourceKind::Parameter,
            Confidence::High,
            Origin { code: "params[:q]".into(), line: 1 },
        )
        .sanitized("to_i");
        let c = TaintDescriptor::concat(&TaintDescriptor::clean(), &a);
        assert!(!c.active());
        assert!(!c.tainted);
    }

    #[test]
    fn memo_cache_first_writer_wins() {
        let cache = MemoCache::default();
        let first = TaintDescriptor::clean();
        let second = TaintDescriptor::source(
            SourceKind::Parameter,
            Confidence::High,
            Origin { code: "params[:q]".into(), line: 1 },
        );
        let stored = cache.insert_once("User#name", first);
        assert!(!stored.tainted);
        let stored = cache.insert_once("User#name", second);
        assert!(!stored.tainted);
        assert_eq!(cache.len(), 1);
    }
}
