//! Supporting imports and injection for rewritten files.
//!
//! The rewriter replaces literals with `this.translate.instant(...)` calls and
//! `| translate` pipes; a file only compiles once it also imports and injects
//! the translate API. The reverse mapper asks for the opposite once a file no
//! longer uses it.

use std::sync::LazyLock;

use regex::Regex;

pub const TRANSLATE_MODULE: &str = "@ngx-translate/core";
pub const ANGULAR_CORE: &str = "@angular/core";

static CLASS_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+\w+[^{]*\{").unwrap()
});
static IMPORTS_ARRAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimports\s*:\s*\[").unwrap());
static IMPORT_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\b[^;]*;[ \t]*\r?\n?").unwrap());
static PIPE_USE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|\s*translate\b").unwrap());

/// Adds and removes what a file needs to use the translate API.
pub trait Scaffolder: Send + Sync {
    /// After `code` gained `{accessor}.instant(...)` calls.
    fn ensure_call_support(&self, code: &str, accessor: &str) -> String;

    /// After `code` (a component, or the class behind a markup file) gained
    /// `| translate` pipes.
    fn ensure_pipe_support(&self, code: &str) -> String;

    /// After references were reverted; drops what `code` no longer uses.
    ///
    /// `external_template` is the component's `templateUrl` markup, which may
    /// still use the pipe.
    fn cleanup(&self, code: &str, accessor: &str, external_template: Option<&str>) -> String;
}

/// `@ngx-translate/core` with `inject()`-based injection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NgxTranslateScaffolder;

impl Scaffolder for NgxTranslateScaffolder {
    fn ensure_call_support(&self, code: &str, accessor: &str) -> String {
        let Some(field) = accessor_field(accessor) else {
            return code.to_string();
        };
        let mut out = code.to_string();
        let has_field = Regex::new(&format!(r"\b{}\s*[:=]", regex::escape(field)))
            .map(|re| re.is_match(&out))
            .unwrap_or(false);
        if !has_field && let Some(open) = CLASS_OPEN.find(&out) {
            let line = format!("\n  private readonly {} = inject(TranslateService);", field);
            out.insert_str(open.end(), &line);
            out = add_named_import(&out, "inject", ANGULAR_CORE);
        }
        add_named_import(&out, "TranslateService", TRANSLATE_MODULE)
    }

    fn ensure_pipe_support(&self, code: &str) -> String {
        let Some(array) = IMPORTS_ARRAY.find(code) else {
            return code.to_string();
        };
        let mut out = code.to_string();
        let rest = &code[array.end()..];
        let list_end = rest.find(']').unwrap_or(rest.len());
        if !contains_word(&rest[..list_end], "TranslatePipe") {
            let separator = if rest[..list_end].trim().is_empty() { "" } else { ", " };
            out.insert_str(array.end(), &format!("TranslatePipe{}", separator));
        }
        add_named_import(&out, "TranslatePipe", TRANSLATE_MODULE)
    }

    fn cleanup(&self, code: &str, accessor: &str, external_template: Option<&str>) -> String {
        let mut out = code.to_string();

        let still_calls = out.contains(&format!("{}.", accessor));
        if !still_calls
            && let Some(field) = accessor_field(accessor)
            && let Ok(re) = Regex::new(&format!(
                r"(?m)^[ \t]*(?:private\s+|protected\s+|public\s+)?(?:readonly\s+)?{}\s*=\s*inject\(\s*TranslateService\s*\)\s*;[ \t]*\r?\n",
                regex::escape(field)
            ))
        {
            out = re.replace(&out, "").into_owned();
        }
        if count_word_outside_imports(&out, "TranslateService") == 0 {
            out = remove_named_import(&out, "TranslateService", TRANSLATE_MODULE);
        }
        if count_word_outside_imports(&out, "inject") == 0 {
            out = remove_named_import(&out, "inject", ANGULAR_CORE);
        }

        let pipe_used =
            PIPE_USE.is_match(&out) || external_template.is_some_and(|t| PIPE_USE.is_match(t));
        if !pipe_used {
            out = remove_from_imports_array(&out, "TranslatePipe");
            if count_word_outside_imports(&out, "TranslatePipe") == 0 {
                out = remove_named_import(&out, "TranslatePipe", TRANSLATE_MODULE);
            }
        }
        out
    }
}

/// `this.translate` → `translate`. Other accessor shapes get no field.
fn accessor_field(accessor: &str) -> Option<&str> {
    let field = accessor.strip_prefix("this.")?;
    field
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        .then_some(field)
}

fn contains_word(haystack: &str, word: &str) -> bool {
    Regex::new(&format!(r"\b{}\b", regex::escape(word)))
        .map(|re| re.is_match(haystack))
        .unwrap_or(false)
}

fn count_word_outside_imports(code: &str, word: &str) -> usize {
    let without_imports = IMPORT_STATEMENT.replace_all(code, "");
    Regex::new(&format!(r"\b{}\b", regex::escape(word)))
        .map(|re| re.find_iter(&without_imports).count())
        .unwrap_or(0)
}

fn named_import_regex(module: &str) -> Option<Regex> {
    Regex::new(&format!(
        r#"(?m)^import\s*\{{([^}}]*)\}}\s*from\s*['"]{}['"]\s*;?[ \t]*\r?\n?"#,
        regex::escape(module)
    ))
    .ok()
}

/// Add `name` to the `import { ... } from 'module'` statement, creating it after
/// the last import when missing.
pub fn add_named_import(code: &str, name: &str, module: &str) -> String {
    let Some(re) = named_import_regex(module) else {
        return code.to_string();
    };
    if let Some(caps) = re.captures(code) {
        let names = &caps[1];
        if names.split(',').any(|n| n.trim() == name) {
            return code.to_string();
        }
        let Some(list) = caps.get(1) else {
            return code.to_string();
        };
        let mut entries: Vec<&str> = names
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        entries.push(name);
        let mut out = code.to_string();
        out.replace_range(list.range(), &format!(" {} ", entries.join(", ")));
        return out;
    }

    let statement = format!("import {{ {} }} from '{}';\n", name, module);
    let insert_at = IMPORT_STATEMENT
        .find_iter(code)
        .last()
        .map(|m| m.end())
        .unwrap_or(0);
    let mut out = code.to_string();
    if insert_at > 0 && !code[..insert_at].ends_with('\n') {
        out.insert(insert_at, '\n');
        out.insert_str(insert_at + 1, &statement);
    } else {
        out.insert_str(insert_at, &statement);
    }
    out
}

/// Remove `name` from the `import { ... } from 'module'` statement, dropping the
/// statement when it becomes empty.
pub fn remove_named_import(code: &str, name: &str, module: &str) -> String {
    let Some(re) = named_import_regex(module) else {
        return code.to_string();
    };
    let Some(caps) = re.captures(code) else {
        return code.to_string();
    };
    let (Some(whole), Some(list)) = (caps.get(0), caps.get(1)) else {
        return code.to_string();
    };
    let entries: Vec<&str> = list
        .as_str()
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if !entries.contains(&name) {
        return code.to_string();
    }
    let kept: Vec<&str> = entries.into_iter().filter(|n| *n != name).collect();

    let mut out = code.to_string();
    if kept.is_empty() {
        out.replace_range(whole.range(), "");
    } else {
        out.replace_range(list.range(), &format!(" {} ", kept.join(", ")));
    }
    out
}

fn remove_from_imports_array(code: &str, name: &str) -> String {
    let Some(array) = IMPORTS_ARRAY.find(code) else {
        return code.to_string();
    };
    let rest = &code[array.end()..];
    let Some(list_end) = rest.find(']') else {
        return code.to_string();
    };
    let list = &rest[..list_end];
    if !contains_word(list, name) {
        return code.to_string();
    }
    let kept: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty() && *n != name)
        .collect();

    let mut out = code.to_string();
    out.replace_range(array.end()..array.end() + list_end, &kept.join(", "));
    out
}
