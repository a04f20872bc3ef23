//! Declarative heuristic table for deciding what counts as user-facing text.
//!
//! Every name list and shape pattern the classifier and the markup scanner
//! consult lives here, so the heuristic surface can be audited and tested
//! independently of the AST traversal.

use std::sync::LazyLock;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::contains_alphabetic;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:[a-z][a-z0-9+.-]*://|//|www\.|mailto:|tel:|data:|javascript:)").unwrap()
});
static PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\.{0,2}/|~/|[A-Za-z]:\\)\S*$").unwrap());
static FILE_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+\.[A-Za-z0-9]{2,5}$").unwrap());
static SLASHED_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.:-]+(?:/[\w.:{}-]*)+$").unwrap());
static ATTRIBUTE_FRAGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"=\s*["']"#).unwrap());
static CLASS_LIST_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*(?:\s+[a-z0-9]+(?:-[a-z0-9]+)*)*$").unwrap()
});
static CONTROL_FLOW_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(?:if|else|for|switch|case|default|defer|empty|placeholder|loading)\b\s*[({]")
        .unwrap()
});
static INTERPOLATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\$\{").unwrap());
static SNAKE_CASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+(?:_[A-Za-z0-9]+)+$").unwrap());
static CAMEL_CASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:[A-Z][a-z0-9]*)+$").unwrap());
static PASCAL_CASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z][a-z0-9]+){2,}$").unwrap());
static KEBAB_CASE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)+$").unwrap());
static DOTTED_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*(?:\.[\w$]+)+$").unwrap());
static MESSAGE_SERVICE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:toast|snack|notif|message|alert|dialog|modal|confirm)").unwrap()
});
static TRANSLATE_OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)transl").unwrap());

/// How readily call-argument literals are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AggressiveMode {
    /// Reject every call-argument literal.
    Low,
    /// Accept multi-word text and long single words; reject identifier shapes.
    #[default]
    Moderate,
    /// Accept every call-argument literal regardless of minimum length.
    High,
}

impl std::fmt::Display for AggressiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggressiveMode::Low => write!(f, "low"),
            AggressiveMode::Moderate => write!(f, "moderate"),
            AggressiveMode::High => write!(f, "high"),
        }
    }
}

/// A named identifier shape that marks text as technical.
#[derive(Debug, Clone)]
pub struct ShapeRule {
    pub name: &'static str,
    pub pattern: Regex,
}

/// The heuristic table consulted by the classifier and the markup scanner.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    /// Decorators whose metadata object may carry an inline `template`.
    pub component_decorators: Vec<String>,
    /// Decorators whose arguments are framework metadata, never UI text.
    pub ignored_decorators: Vec<String>,
    /// Global functions whose arguments are shown to the user.
    pub message_calls: Vec<String>,
    /// Constructors whose arguments are messages (`new Error('...')`).
    pub message_constructors: Vec<String>,
    /// Object property names whose string values are UI text.
    pub message_properties: Vec<String>,
    /// Methods that display their argument when called on a message-like service.
    pub message_service_methods: Vec<String>,
    /// Pattern on the receiver of a method call that marks a message service.
    pub message_service_object: Regex,
    /// Receivers whose calls are never UI (`console.log(...)`).
    pub ignored_call_objects: Vec<String>,
    /// Free functions whose arguments are never UI (`require`, `querySelector`).
    pub ignored_calls: Vec<String>,
    /// Methods of a translate service that take a key: `translate.instant('KEY')`.
    pub translate_methods: Vec<String>,
    /// Pattern on the receiver name identifying the translate service.
    pub translate_object: Regex,
    /// Shapes rejected as technical identifiers under `moderate`.
    pub technical_shapes: Vec<ShapeRule>,
    /// Single words longer than this are accepted under `moderate`.
    pub long_word_threshold: usize,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            component_decorators: strings(&["Component"]),
            ignored_decorators: strings(&[
                "Component",
                "NgModule",
                "Injectable",
                "Pipe",
                "Directive",
                "Input",
                "Output",
                "HostListener",
                "HostBinding",
                "ViewChild",
                "ViewChildren",
                "ContentChild",
                "ContentChildren",
                "Inject",
                "Attribute",
            ]),
            message_calls: strings(&["alert", "confirm", "prompt"]),
            message_constructors: strings(&[
                "Error",
                "TypeError",
                "RangeError",
                "SyntaxError",
                "Notification",
            ]),
            message_properties: strings(&[
                "message",
                "title",
                "label",
                "text",
                "description",
                "placeholder",
                "tooltip",
                "header",
                "subtitle",
                "summary",
                "detail",
                "caption",
                "hint",
                "content",
                "errorMessage",
                "successMessage",
                "confirmText",
                "cancelText",
                "okText",
                "buttonText",
                "emptyMessage",
                "ariaLabel",
            ]),
            message_service_methods: strings(&[
                "success", "error", "warning", "warn", "info", "show", "open", "add", "notify",
                "confirm", "alert",
            ]),
            message_service_object: MESSAGE_SERVICE_REGEX.clone(),
            ignored_call_objects: strings(&["console", "localStorage", "sessionStorage", "JSON"]),
            ignored_calls: strings(&[
                "require",
                "querySelector",
                "querySelectorAll",
                "getElementById",
                "addEventListener",
                "removeEventListener",
                "setAttribute",
                "getAttribute",
                "getItem",
                "setItem",
                "removeItem",
                "dispatchEvent",
                "createElement",
            ]),
            translate_methods: strings(&["instant", "get", "stream"]),
            translate_object: TRANSLATE_OBJECT_REGEX.clone(),
            technical_shapes: vec![
                ShapeRule {
                    name: "snake_case",
                    pattern: SNAKE_CASE_REGEX.clone(),
                },
                ShapeRule {
                    name: "camelCase",
                    pattern: CAMEL_CASE_REGEX.clone(),
                },
                ShapeRule {
                    name: "PascalCase",
                    pattern: PASCAL_CASE_REGEX.clone(),
                },
                ShapeRule {
                    name: "kebab-case",
                    pattern: KEBAB_CASE_REGEX.clone(),
                },
                ShapeRule {
                    name: "dotted path",
                    pattern: DOTTED_PATH_REGEX.clone(),
                },
            ],
            long_word_threshold: 10,
        }
    }
}

impl PolicyTable {
    /// Why `text` does not look like user-facing text, or `None` if it does.
    ///
    /// Shared by the markup scanner and the literal classifier. Minimum length
    /// is checked separately because the `high` tier ignores it.
    pub fn rejection_reason(&self, text: &str) -> Option<&'static str> {
        let text = text.trim();
        if text.is_empty() {
            return Some("empty");
        }
        if !contains_alphabetic(text) {
            return Some("no letters");
        }
        if INTERPOLATION_REGEX.is_match(text) {
            return Some("contains interpolation syntax");
        }
        if URL_REGEX.is_match(text) {
            return Some("looks like a URL");
        }
        if text.starts_with('#') && !text.contains(' ') {
            return Some("looks like a fragment or selector");
        }
        if PATH_REGEX.is_match(text) || SLASHED_TOKEN_REGEX.is_match(text) {
            return Some("looks like a path");
        }
        if FILE_NAME_REGEX.is_match(text) && !text.contains(' ') && text.contains('.') {
            let ext = text.rsplit('.').next().unwrap_or_default();
            if ext.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
                return Some("looks like a file name");
            }
        }
        if text.contains('=') && (text.contains('"') || text.contains('\''))
            || ATTRIBUTE_FRAGMENT_REGEX.is_match(text)
        {
            return Some("looks like an attribute fragment");
        }
        if text.contains('-') && CLASS_LIST_REGEX.is_match(text) {
            return Some("looks like a class list");
        }
        if CONTROL_FLOW_REGEX.is_match(text) {
            return Some("looks like a control-flow block");
        }
        None
    }

    /// Capitalized multi-word text, or text ending in terminal punctuation.
    pub fn is_high_confidence(&self, text: &str) -> bool {
        let text = text.trim();
        let starts_upper = text.chars().next().is_some_and(|c| c.is_uppercase());
        if starts_upper && is_multi_word(text) {
            return true;
        }
        contains_alphabetic(text) && text.ends_with(['.', '!', '?', '…'])
            && !DOTTED_PATH_REGEX.is_match(text.trim_end_matches(['.', '!', '?', '…']))
    }

    /// Name of the technical identifier shape `text` matches, if any.
    pub fn technical_shape(&self, text: &str) -> Option<&'static str> {
        let text = text.trim();
        self.technical_shapes
            .iter()
            .find(|rule| rule.pattern.is_match(text))
            .map(|rule| rule.name)
    }

    pub fn is_component_decorator(&self, name: &str) -> bool {
        self.component_decorators.iter().any(|d| d == name)
    }

    pub fn is_ignored_decorator(&self, name: &str) -> bool {
        self.ignored_decorators.iter().any(|d| d == name)
    }

    pub fn is_message_call(&self, name: &str) -> bool {
        let bare = name.strip_prefix("window.").unwrap_or(name);
        self.message_calls.iter().any(|c| c == bare)
    }

    pub fn is_message_constructor(&self, name: &str) -> bool {
        self.message_constructors.iter().any(|c| c == name)
    }

    pub fn is_message_property(&self, name: &str) -> bool {
        self.message_properties
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }

    /// `this.toastr.success(...)`, `snackBar.open(...)` and the like.
    pub fn is_message_service_call(&self, receiver: &str, method: &str) -> bool {
        self.message_service_methods.iter().any(|m| m == method)
            && self.message_service_object.is_match(receiver)
    }

    pub fn is_ignored_call(&self, receiver: Option<&str>, name: &str) -> bool {
        if let Some(receiver) = receiver {
            let root = receiver.split('.').next().unwrap_or(receiver);
            let root = if root == "window" {
                receiver.split('.').nth(1).unwrap_or(root)
            } else {
                root
            };
            if self.ignored_call_objects.iter().any(|o| o == root) {
                return true;
            }
        }
        self.ignored_calls.iter().any(|c| c == name)
    }

    pub fn is_translate_call(&self, receiver: &str, method: &str) -> bool {
        self.translate_methods.iter().any(|m| m == method)
            && receiver
                .rsplit('.')
                .next()
                .is_some_and(|last| self.translate_object.is_match(last))
    }
}

/// More than one whitespace-separated word containing letters.
pub fn is_multi_word(text: &str) -> bool {
    text.split_whitespace()
        .filter(|w| contains_alphabetic(w))
        .count()
        > 1
}

/// Verdict of the permissiveness policy for one call-argument literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept(String),
    Reject(String),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept(_))
    }

    pub fn reason(&self) -> &str {
        match self {
            Verdict::Accept(reason) | Verdict::Reject(reason) => reason,
        }
    }
}

/// The enclosing call of a literal that is passed as an argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Dotted callee name, e.g. `this.notify.show`.
    pub callee: String,
    pub arg_index: usize,
    /// Full source text of the call expression.
    pub source_text: String,
}

impl CallContext {
    /// `callee(argIndex)`, the string matched by context-allow patterns.
    pub fn label(&self) -> String {
        format!("{}({})", self.callee, self.arg_index)
    }
}

/// Tiered policy plus user override patterns for call-argument literals.
#[derive(Debug, Clone, Default)]
pub struct Permissiveness {
    pub mode: AggressiveMode,
    /// Matched against the call's full source text.
    pub allow_call: Vec<Regex>,
    /// Matched against `callee(argIndex)`.
    pub allow_context: Vec<Regex>,
}

impl Permissiveness {
    pub fn new(mode: AggressiveMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Decide whether a call-argument literal is accepted.
    ///
    /// Override patterns win over the tier verdict.
    pub fn evaluate(&self, policy: &PolicyTable, text: &str, call: &CallContext) -> Verdict {
        let label = call.label();
        if let Some(re) = self.allow_context.iter().find(|re| re.is_match(&label)) {
            return Verdict::Accept(format!("call context `{}` matches `{}`", label, re.as_str()));
        }
        if let Some(re) = self
            .allow_call
            .iter()
            .find(|re| re.is_match(&call.source_text))
        {
            return Verdict::Accept(format!("call matches `{}`", re.as_str()));
        }

        let text = text.trim();
        match self.mode {
            AggressiveMode::Low => {
                Verdict::Reject("call arguments are not extracted in low mode".to_string())
            }
            AggressiveMode::High => Verdict::Accept("high mode accepts call arguments".to_string()),
            AggressiveMode::Moderate => {
                if is_multi_word(text) {
                    return Verdict::Accept("multi-word text".to_string());
                }
                if let Some(shape) = policy.technical_shape(text) {
                    return Verdict::Reject(format!("looks like a {} identifier", shape));
                }
                if text.chars().count() > policy.long_word_threshold {
                    return Verdict::Accept("long single word".to_string());
                }
                Verdict::Reject("short single word in call argument".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(callee: &str, arg_index: usize, source: &str) -> CallContext {
        CallContext {
            callee: callee.to_string(),
            arg_index,
            source_text: source.to_string(),
        }
    }

    #[test]
    fn test_rejection_reasons() {
        let policy = PolicyTable::default();
        assert_eq!(policy.rejection_reason("12345"), Some("no letters"));
        assert_eq!(policy.rejection_reason("---"), Some("no letters"));
        assert_eq!(
            policy.rejection_reason("https://example.com"),
            Some("looks like a URL")
        );
        assert_eq!(policy.rejection_reason("/sources"), Some("looks like a path"));
        assert_eq!(policy.rejection_reason("api/v1/users"), Some("looks like a path"));
        assert_eq!(policy.rejection_reason("#top"), Some("looks like a fragment or selector"));
        assert_eq!(policy.rejection_reason("logo.png"), Some("looks like a file name"));
        assert_eq!(
            policy.rejection_reason("Hello {{ name }}"),
            Some("contains interpolation syntax")
        );
        assert_eq!(
            policy.rejection_reason(r#"class="btn""#),
            Some("looks like an attribute fragment")
        );
        assert_eq!(
            policy.rejection_reason("btn btn-primary mat-raised-button"),
            Some("looks like a class list")
        );
        assert_eq!(
            policy.rejection_reason("@if (user) {"),
            Some("looks like a control-flow block")
        );
    }

    #[test]
    fn test_accepts_ui_text() {
        let policy = PolicyTable::default();
        assert_eq!(policy.rejection_reason("Source CVs"), None);
        assert_eq!(policy.rejection_reason("Save"), None);
        assert_eq!(policy.rejection_reason("Are you sure?"), None);
        assert_eq!(policy.rejection_reason("Version 2.0 released."), None);
    }

    #[test]
    fn test_high_confidence() {
        let policy = PolicyTable::default();
        assert!(policy.is_high_confidence("Source CVs"));
        assert!(policy.is_high_confidence("saved successfully."));
        assert!(policy.is_high_confidence("really?"));
        assert!(!policy.is_high_confidence("debug info"));
        assert!(!policy.is_high_confidence("Save"));
        assert!(!policy.is_high_confidence("config.json."));
    }

    #[test]
    fn test_technical_shapes() {
        let policy = PolicyTable::default();
        assert_eq!(policy.technical_shape("user_name"), Some("snake_case"));
        assert_eq!(policy.technical_shape("USER_NAME"), Some("snake_case"));
        assert_eq!(policy.technical_shape("userName"), Some("camelCase"));
        assert_eq!(policy.technical_shape("UserProfile"), Some("PascalCase"));
        assert_eq!(policy.technical_shape("user-profile"), Some("kebab-case"));
        assert_eq!(policy.technical_shape("app.home.title"), Some("dotted path"));
        assert_eq!(policy.technical_shape("Welcome"), None);
    }

    #[test]
    fn test_low_rejects_call_arguments() {
        let policy = PolicyTable::default();
        let perm = Permissiveness::new(AggressiveMode::Low);
        let verdict = perm.evaluate(&policy, "Saved changes", &call("notify", 0, "notify('Saved changes')"));
        assert!(!verdict.is_accept());
    }

    #[test]
    fn test_moderate_tiers() {
        let policy = PolicyTable::default();
        let perm = Permissiveness::new(AggressiveMode::Moderate);
        let ctx = call("setStatus", 0, "setStatus(x)");

        assert!(perm.evaluate(&policy, "saved all changes", &ctx).is_accept());
        assert!(!perm.evaluate(&policy, "user_name", &ctx).is_accept());
        assert!(!perm.evaluate(&policy, "userName", &ctx).is_accept());
        assert!(perm.evaluate(&policy, "Configuration", &ctx).is_accept());
        assert!(!perm.evaluate(&policy, "Save", &ctx).is_accept());

        let verdict = perm.evaluate(&policy, "user-profile", &ctx);
        assert_eq!(verdict.reason(), "looks like a kebab-case identifier");
    }

    #[test]
    fn test_high_accepts_everything() {
        let policy = PolicyTable::default();
        let perm = Permissiveness::new(AggressiveMode::High);
        let ctx = call("f", 1, "f(a, 'x')");
        assert!(perm.evaluate(&policy, "x", &ctx).is_accept());
        assert!(perm.evaluate(&policy, "user_name", &ctx).is_accept());
    }

    #[test]
    fn test_moderate_acceptance_implies_high_acceptance() {
        let policy = PolicyTable::default();
        let moderate = Permissiveness::new(AggressiveMode::Moderate);
        let high = Permissiveness::new(AggressiveMode::High);
        let ctx = call("f", 0, "f('...')");
        for text in ["Save", "user_name", "Configuration", "two words", "ok", "kebab-case"] {
            if moderate.evaluate(&policy, text, &ctx).is_accept() {
                assert!(high.evaluate(&policy, text, &ctx).is_accept(), "{text}");
            }
        }
    }

    #[test]
    fn test_overrides_take_priority() {
        let policy = PolicyTable::default();
        let mut perm = Permissiveness::new(AggressiveMode::Low);
        perm.allow_context.push(Regex::new(r"^setTitle\(0\)$").unwrap());
        perm.allow_call.push(Regex::new(r"snackBar\.open").unwrap());

        let verdict = perm.evaluate(&policy, "Home", &call("setTitle", 0, "setTitle('Home')"));
        assert!(verdict.is_accept());
        assert!(verdict.reason().contains("setTitle(0)"));

        let verdict = perm.evaluate(
            &policy,
            "Done",
            &call("this.snackBar.open", 0, "this.snackBar.open('Done')"),
        );
        assert!(verdict.is_accept());

        let verdict = perm.evaluate(&policy, "Home", &call("setTitle", 1, "setTitle(a, 'Home')"));
        assert!(!verdict.is_accept());
    }

    #[test]
    fn test_call_lookups() {
        let policy = PolicyTable::default();
        assert!(policy.is_message_call("confirm"));
        assert!(policy.is_message_call("window.alert"));
        assert!(policy.is_ignored_call(Some("console"), "log"));
        assert!(policy.is_ignored_call(Some("window.console"), "debug"));
        assert!(policy.is_ignored_call(None, "require"));
        assert!(policy.is_message_service_call("this.toastr", "success"));
        assert!(!policy.is_message_service_call("this.http", "get"));
        assert!(policy.is_translate_call("this.translate", "instant"));
        assert!(policy.is_translate_call("translateService", "get"));
        assert!(!policy.is_translate_call("this.http", "get"));
    }
}
