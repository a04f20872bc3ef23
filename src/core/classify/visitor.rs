use swc_common::Span;
use swc_ecma_ast::{
    AssignExpr, AssignTarget, BinExpr, BinaryOp, CallExpr, Callee, Class, ClassMethod, ClassProp,
    CondExpr, Constructor, Decorator, DoWhileStmt, ExportAll, Expr, ExprOrSpread, ForStmt,
    Function, IfStmt, ImportDecl, KeyValueProp, Lit, MemberExpr, MemberProp, NamedExport, NewExpr,
    ObjectLit, PrivateMethod, PrivateProp, Prop, PropName, PropOrSpread, SimpleAssignTarget,
    StaticBlock, Str, SwitchStmt, ThrowStmt, Tpl, TsImportEqualsDecl, TsType, WhileStmt,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::classify::ClassifierOptions;
use crate::core::classify::arena::NodeArena;
use crate::core::classify::policy::{AggressiveMode, CallContext, Verdict};
use crate::core::data::{CandidateKind, FoundString, RestrictedCandidate};
use crate::core::markup::MarkupSource;
use crate::core::offset::LineIndex;
use crate::core::parsers::ts::ParsedSource;

/// File identity and lookup tables shared by both passes.
pub(super) struct FileScope<'a> {
    pub parsed: &'a ParsedSource,
    pub index: &'a LineIndex<'a>,
    pub options: &'a ClassifierOptions,
    pub file_abs: &'a str,
    pub file_rel: &'a str,
}

impl FileScope<'_> {
    fn candidate(&self, span: Span, text: &str, kind: CandidateKind) -> FoundString {
        let (lo, _) = self.parsed.range(span);
        let position = self.index.position(lo);
        FoundString {
            file_abs: self.file_abs.to_string(),
            file_rel: self.file_rel.to_string(),
            line: position.line,
            column: position.column,
            text: text.to_string(),
            raw_text: Some(self.parsed.snippet(span).to_string()),
            kind,
            is_already_translated: false,
            enclosing_quotes: Vec::new(),
        }
    }
}

// ============================================================
// Pass 1: inline templates
// ============================================================

/// Finds `template` properties of component decorators and hands their
/// content to the markup scanner, marking the literal as consumed.
pub(super) struct TemplateExtractor<'a> {
    scope: &'a FileScope<'a>,
    arena: &'a mut NodeArena,
    pub found: Vec<FoundString>,
}

impl<'a> TemplateExtractor<'a> {
    pub fn new(scope: &'a FileScope<'a>, arena: &'a mut NodeArena) -> Self {
        Self {
            scope,
            arena,
            found: Vec::new(),
        }
    }

    fn extract_template(&mut self, metadata: &ObjectLit) {
        for prop in &metadata.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let Prop::KeyValue(kv) = &**prop else {
                continue;
            };
            if prop_name(&kv.key).as_deref() != Some("template") {
                continue;
            }
            let span = match &*kv.value {
                Expr::Lit(Lit::Str(s)) => s.span,
                Expr::Tpl(tpl) if tpl.exprs.is_empty() => tpl.span,
                _ => continue,
            };

            let code = &self.scope.parsed.code;
            let (lo, hi) = self.scope.parsed.range(span);
            if hi < lo + 2 {
                continue;
            }
            let host_quote = code[lo..].chars().next();
            let body = &code[lo + 1..hi - 1];
            let source = MarkupSource {
                file_abs: self.scope.file_abs,
                file_rel: self.scope.file_rel,
                origin: Some(self.scope.index.position(lo + 1)),
                host_quote,
            };

            let found = self.scope.options.markup_scanner().scan(body, &source);
            tracing::debug!(
                file = self.scope.file_rel,
                count = found.len(),
                "scanned inline template"
            );
            self.found.extend(found);
            self.arena.consume(span);
        }
    }
}

impl Visit for TemplateExtractor<'_> {
    fn visit_decorator(&mut self, node: &Decorator) {
        if let Expr::Call(call) = &*node.expr
            && let Callee::Expr(callee) = &call.callee
            && let Expr::Ident(ident) = &**callee
            && self.scope.options.policy.is_component_decorator(&ident.sym)
        {
            for arg in &call.args {
                if let Expr::Object(metadata) = &*arg.expr {
                    self.extract_template(metadata);
                }
            }
        }
        node.visit_children_with(self);
    }
}

// ============================================================
// Pass 2: literal classification
// ============================================================

/// What `this` refers to where the literal sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ThisBinding {
    /// Module level, or inside a `function` with its own `this`.
    #[default]
    Module,
    /// Static member or static block.
    Static,
    /// Method, accessor, constructor or non-static property initializer.
    Instance,
}

impl ThisBinding {
    fn member(is_static: bool) -> Self {
        if is_static {
            ThisBinding::Static
        } else {
            ThisBinding::Instance
        }
    }

    fn label(self) -> &'static str {
        match self {
            ThisBinding::Module => "module scope",
            ThisBinding::Static => "a static member",
            ThisBinding::Instance => "an instance member",
        }
    }
}

/// Where the literal being visited sits.
///
/// Saved before entering a node that changes it and restored afterwards.
#[derive(Debug, Clone, Default)]
struct TraversalContext {
    /// Inside the arguments of an ignored (framework) decorator.
    in_ignored_decorator: bool,
    /// Inside an `if`/loop/`switch` test, a ternary test or an equality operand.
    in_condition: bool,
    /// The value is shown to the user as a message (alert, throw, `title:` ...).
    message_context: bool,
    /// Set only while visiting a literal that is directly a call argument.
    call: Option<CallContext>,
    this_binding: ThisBinding,
}

/// Visits every string and template literal and decides whether it is UI text.
pub(super) struct LiteralClassifier<'a> {
    scope: &'a FileScope<'a>,
    arena: &'a NodeArena,
    ctx: TraversalContext,
    pub found: Vec<FoundString>,
    pub restricted: Vec<RestrictedCandidate>,
}

impl<'a> LiteralClassifier<'a> {
    pub fn new(scope: &'a FileScope<'a>, arena: &'a NodeArena) -> Self {
        Self {
            scope,
            arena,
            ctx: TraversalContext::default(),
            found: Vec::new(),
            restricted: Vec::new(),
        }
    }

    fn with_context<U, V>(&mut self, update: U, visit: V)
    where
        U: FnOnce(&mut TraversalContext),
        V: FnOnce(&mut Self),
    {
        let saved = self.ctx.clone();
        update(&mut self.ctx);
        visit(self);
        self.ctx = saved;
    }

    fn visit_condition<N: VisitWith<Self>>(&mut self, node: &N) {
        self.with_context(
            |ctx| {
                ctx.in_condition = true;
                ctx.call = None;
            },
            |this| node.visit_with(this),
        );
    }

    fn classify(&mut self, span: Span, value: &str, kind: CandidateKind) {
        if self.arena.is_consumed(span) {
            return;
        }
        if self.ctx.in_ignored_decorator || self.ctx.in_condition {
            return;
        }

        let options = self.scope.options;
        let policy = &options.policy;
        let text = value.trim();
        if let Some(reason) = policy.rejection_reason(text) {
            tracing::debug!(file = self.scope.file_rel, text, reason, "skipped literal");
            return;
        }
        let ignores_length = self.ctx.call.is_some()
            && options.permissiveness.mode == AggressiveMode::High;
        if !ignores_length && text.chars().count() < options.min_length {
            return;
        }

        let candidate = self.scope.candidate(span, text, kind);
        if self.ctx.message_context || policy.is_high_confidence(text) {
            self.accept(candidate);
            return;
        }

        let Some(call) = &self.ctx.call else {
            return;
        };
        match options.permissiveness.evaluate(policy, text, call) {
            Verdict::Accept(reason) => {
                tracing::debug!(file = self.scope.file_rel, text, reason = %reason, "accepted call argument");
                self.accept(candidate);
            }
            Verdict::Reject(reason) => self.restricted.push(RestrictedCandidate {
                candidate,
                reason,
                call_context: call.label(),
            }),
        }
    }

    /// Keep an accepted literal, unless its rewrite would need a `this` that
    /// is not a component instance.
    fn accept(&mut self, candidate: FoundString) {
        let binding = self.ctx.this_binding;
        if self.scope.options.instance_only && binding != ThisBinding::Instance {
            tracing::debug!(file = self.scope.file_rel, text = %candidate.text, "literal outside an instance member");
            self.restricted.push(RestrictedCandidate {
                candidate,
                reason: "no component instance to reach the translate service".to_string(),
                call_context: binding.label().to_string(),
            });
            return;
        }
        self.found.push(candidate);
    }

    fn with_binding<V: FnOnce(&mut Self)>(&mut self, binding: ThisBinding, visit: V) {
        self.with_context(|ctx| ctx.this_binding = binding, visit);
    }

    fn record_translated(&mut self, key: &Str) {
        if let Some(value) = key.value.as_str() {
            let mut candidate = self
                .scope
                .candidate(key.span, value, CandidateKind::StringLiteral);
            candidate.is_already_translated = true;
            self.found.push(candidate);
        }
    }

    fn visit_arguments(&mut self, callee: &str, args: &[ExprOrSpread], message: bool, span: Span) {
        let source_text = self.scope.parsed.snippet(span).to_string();
        for (arg_index, arg) in args.iter().enumerate() {
            let direct = matches!(
                unparen(&arg.expr),
                Expr::Lit(Lit::Str(_)) | Expr::Tpl(_)
            );
            let call = direct.then(|| CallContext {
                callee: callee.to_string(),
                arg_index,
                source_text: source_text.clone(),
            });
            self.with_context(
                |ctx| {
                    ctx.call = call;
                    ctx.message_context = message;
                    if message {
                        ctx.in_condition = false;
                    }
                },
                |this| arg.expr.visit_with(this),
            );
        }
    }
}

impl Visit for LiteralClassifier<'_> {
    fn visit_import_decl(&mut self, _: &ImportDecl) {}

    fn visit_named_export(&mut self, _: &NamedExport) {}

    fn visit_export_all(&mut self, _: &ExportAll) {}

    fn visit_ts_import_equals_decl(&mut self, _: &TsImportEqualsDecl) {}

    fn visit_ts_type(&mut self, _: &TsType) {}

    fn visit_decorator(&mut self, node: &Decorator) {
        let ignored = decorator_name(node)
            .is_some_and(|name| self.scope.options.policy.is_ignored_decorator(&name));
        self.with_context(
            |ctx| ctx.in_ignored_decorator |= ignored,
            |this| node.visit_children_with(this),
        );
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        self.visit_condition(&*node.test);
        node.cons.visit_with(self);
        node.alt.visit_with(self);
    }

    fn visit_while_stmt(&mut self, node: &WhileStmt) {
        self.visit_condition(&*node.test);
        node.body.visit_with(self);
    }

    fn visit_do_while_stmt(&mut self, node: &DoWhileStmt) {
        node.body.visit_with(self);
        self.visit_condition(&*node.test);
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        node.init.visit_with(self);
        if let Some(test) = &node.test {
            self.visit_condition(&**test);
        }
        node.update.visit_with(self);
        node.body.visit_with(self);
    }

    fn visit_switch_stmt(&mut self, node: &SwitchStmt) {
        self.visit_condition(&*node.discriminant);
        for case in &node.cases {
            if let Some(test) = &case.test {
                self.visit_condition(&**test);
            }
            case.cons.visit_with(self);
        }
    }

    fn visit_cond_expr(&mut self, node: &CondExpr) {
        self.visit_condition(&*node.test);
        self.with_context(|ctx| ctx.call = None, |this| {
            node.cons.visit_with(this);
            node.alt.visit_with(this);
        });
    }

    fn visit_bin_expr(&mut self, node: &BinExpr) {
        match node.op {
            BinaryOp::EqEq
            | BinaryOp::NotEq
            | BinaryOp::EqEqEq
            | BinaryOp::NotEqEq
            | BinaryOp::In
            | BinaryOp::InstanceOf => {
                self.visit_condition(&*node.left);
                self.visit_condition(&*node.right);
            }
            _ => self.with_context(|ctx| ctx.call = None, |this| {
                node.visit_children_with(this)
            }),
        }
    }

    fn visit_throw_stmt(&mut self, node: &ThrowStmt) {
        self.with_context(
            |ctx| {
                ctx.message_context = true;
                ctx.call = None;
            },
            |this| node.arg.visit_with(this),
        );
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        let callee = match &node.callee {
            // Dynamic `import('...')`.
            Callee::Import(_) => return,
            Callee::Super(_) => {
                self.visit_arguments("super", &node.args, false, node.span);
                return;
            }
            Callee::Expr(expr) => expr,
        };
        let Some(name) = expr_name(callee) else {
            node.visit_children_with(self);
            return;
        };
        let scope = self.scope;
        let policy = &scope.options.policy;
        let (receiver, method) = match name.rsplit_once('.') {
            Some((receiver, method)) => (Some(receiver), method),
            None => (None, name.as_str()),
        };

        if let Some(receiver) = receiver
            && policy.is_translate_call(receiver, method)
        {
            if let Some(first) = node.args.first()
                && let Expr::Lit(Lit::Str(key)) = unparen(&first.expr)
            {
                self.record_translated(key);
            }
            return;
        }
        if policy.is_ignored_call(receiver, method) {
            return;
        }

        let message = policy.is_message_call(&name)
            || receiver.is_some_and(|r| policy.is_message_service_call(r, method));
        self.with_context(|ctx| ctx.call = None, |this| callee.visit_with(this));
        self.visit_arguments(&name, &node.args, message, node.span);
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        let name = expr_name(&node.callee).unwrap_or_default();
        let message = self.scope.options.policy.is_message_constructor(&name);
        if let Some(args) = &node.args {
            self.visit_arguments(&name, args, message, node.span);
        }
    }

    fn visit_key_value_prop(&mut self, node: &KeyValueProp) {
        let message = prop_name(&node.key)
            .is_some_and(|key| self.scope.options.policy.is_message_property(&key));
        node.key.visit_with(self);
        self.with_context(
            |ctx| {
                ctx.message_context = message;
                ctx.call = None;
            },
            |this| node.value.visit_with(this),
        );
    }

    fn visit_class_prop(&mut self, node: &ClassProp) {
        node.decorators.visit_with(self);
        let message = prop_name(&node.key)
            .is_some_and(|key| self.scope.options.policy.is_message_property(&key));
        self.with_context(
            |ctx| {
                ctx.message_context = message;
                ctx.call = None;
                ctx.this_binding = ThisBinding::member(node.is_static);
            },
            |this| node.value.visit_with(this),
        );
    }

    fn visit_private_prop(&mut self, node: &PrivateProp) {
        node.decorators.visit_with(self);
        self.with_binding(ThisBinding::member(node.is_static), |this| {
            node.value.visit_with(this)
        });
    }

    fn visit_class(&mut self, node: &Class) {
        self.with_binding(ThisBinding::Module, |this| node.visit_children_with(this));
    }

    // Methods visit their function's children directly, so `visit_function`
    // only sees plain functions.
    fn visit_class_method(&mut self, node: &ClassMethod) {
        node.key.visit_with(self);
        self.with_binding(ThisBinding::member(node.is_static), |this| {
            (*node.function).visit_children_with(this)
        });
    }

    fn visit_private_method(&mut self, node: &PrivateMethod) {
        self.with_binding(ThisBinding::member(node.is_static), |this| {
            (*node.function).visit_children_with(this)
        });
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        self.with_binding(ThisBinding::Instance, |this| node.visit_children_with(this));
    }

    fn visit_static_block(&mut self, node: &StaticBlock) {
        self.with_binding(ThisBinding::Static, |this| node.visit_children_with(this));
    }

    fn visit_function(&mut self, node: &Function) {
        self.with_binding(ThisBinding::Module, |this| node.visit_children_with(this));
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        let message = match &node.left {
            AssignTarget::Simple(SimpleAssignTarget::Member(member)) => match &member.prop {
                MemberProp::Ident(prop) => self.scope.options.policy.is_message_property(&prop.sym),
                _ => false,
            },
            _ => false,
        };
        node.left.visit_with(self);
        self.with_context(
            |ctx| {
                ctx.message_context = message;
                ctx.call = None;
            },
            |this| node.right.visit_with(this),
        );
    }

    fn visit_prop_name(&mut self, node: &PropName) {
        if let PropName::Computed(computed) = node {
            computed.visit_with(self);
        }
    }

    fn visit_member_expr(&mut self, node: &MemberExpr) {
        node.obj.visit_with(self);
        if let MemberProp::Computed(computed) = &node.prop
            && !matches!(&*computed.expr, Expr::Lit(Lit::Str(_)))
        {
            computed.visit_with(self);
        }
    }

    fn visit_str(&mut self, node: &Str) {
        if let Some(value) = node.value.as_str() {
            self.classify(node.span, value, CandidateKind::StringLiteral);
        }
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        if node.exprs.is_empty() {
            if let Some(quasi) = node.quasis.first()
                && let Some(cooked) = &quasi.cooked
                && let Some(value) = cooked.as_str()
            {
                self.classify(node.span, value, CandidateKind::TemplateLiteral);
            }
            return;
        }
        self.with_context(|ctx| ctx.call = None, |this| node.exprs.visit_with(this));
    }
}

fn unparen(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unparen(&paren.expr),
        _ => expr,
    }
}

/// Dotted name of a callee expression: `alert`, `this.toastr.success`.
pub(super) fn expr_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::This(_) => Some("this".to_string()),
        Expr::Paren(paren) => expr_name(&paren.expr),
        Expr::Member(member) => {
            let object = expr_name(&member.obj)?;
            match &member.prop {
                MemberProp::Ident(prop) => Some(format!("{}.{}", object, prop.sym)),
                MemberProp::PrivateName(prop) => Some(format!("{}.#{}", object, prop.name)),
                MemberProp::Computed(_) => None,
            }
        }
        _ => None,
    }
}

fn decorator_name(node: &Decorator) -> Option<String> {
    match &*node.expr {
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => expr_name(callee),
            _ => None,
        },
        expr => expr_name(expr),
    }
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(str::to_string),
        _ => None,
    }
}
