//! Reverse mapping: key references back to literal text.
//!
//! Only the base locale tree is available, so references are recognized by
//! their syntax alone. Each source line is matched against four patterns:
//!
//! | Reference                              | Restored as             |
//! |----------------------------------------|-------------------------|
//! | `{{ 'KEY' \| translate }}`             | the raw value           |
//! | `('KEY' \| translate)`                 | `'value'`               |
//! | `[attr]="'KEY' \| translate"`          | `attr="value"`          |
//! | `translate.instant('KEY')`, `.get(..)` | `'value'`               |

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::{Captures, Regex};

use crate::core::offset::{LineIndex, Position};
use crate::core::rewrite::scaffold::Scaffolder;
use crate::core::rewrite::{FileRewrite, RewritePlan};
use crate::core::store::tree::LocaleTree;
use crate::issues::{Failure, FailureKind};
use crate::utils::{encode_entities, escape_single_quoted};

/// `'KEY'`, `"KEY"` or `\'KEY\'`; the key lands in one of three consecutive groups.
macro_rules! key_literal {
    () => {
        r#"(?:'([\w.\-]+)'|"([\w.\-]+)"|\\'([\w.\-]+)\\')"#
    };
}

static BRACED_PIPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(r"\{\{\s*", key_literal!(), r"\s*\|\s*translate\s*\}\}")).unwrap()
});
static PAREN_PIPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(r"\(\s*", key_literal!(), r"\s*\|\s*translate\s*\)")).unwrap()
});
static BOUND_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\[([A-Za-z_][\w\-.]*)\]\s*=\s*(?:"\s*'([\w.\-]+)'\s*\|\s*translate\s*"|'\s*"([\w.\-]+)"\s*\|\s*translate\s*')"#,
    )
    .unwrap()
});
static TRANSLATE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"([A-Za-z_$][\w$]*(?:\??\.[A-Za-z_$][\w$]*)*)\??\.(instant|get)\(\s*",
        key_literal!(),
        r"\s*\)"
    ))
    .unwrap()
});
static TRANSLATE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)transl").unwrap());

/// One reference found in a file, with its restored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversal {
    pub position: Position,
    pub key: String,
    /// Exact reference text as scanned.
    pub matched: String,
    pub replacement: String,
}

pub struct ReverseMapper<'a> {
    values: HashMap<String, String>,
    accessor: &'a str,
    scaffolder: Option<&'a dyn Scaffolder>,
}

impl<'a> ReverseMapper<'a> {
    /// Index the non-blank values of the base tree.
    pub fn new(base: &LocaleTree, accessor: &'a str) -> Self {
        let values = base
            .flatten()
            .into_iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        Self {
            values,
            accessor,
            scaffolder: None,
        }
    }

    pub fn with_scaffolder(mut self, scaffolder: &'a dyn Scaffolder) -> Self {
        self.scaffolder = Some(scaffolder);
        self
    }

    /// Every reference in `content` whose key has a value.
    pub fn scan(&self, content: &str) -> Vec<Reversal> {
        let mut found = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let mut spans: Vec<(usize, usize, String, String)> = Vec::new();
            self.collect(line, &BRACED_PIPE, 1, &mut spans, |caps, value| {
                let start = caps.get(0).map_or(0, |m| m.start());
                Some(encode_entities(value, attribute_quote(&line[..start])))
            });
            self.collect(line, &PAREN_PIPE, 1, &mut spans, |caps, value| {
                Some(restore_literal(value, caps, 1))
            });
            self.collect_attributes(line, &mut spans);
            self.collect(line, &TRANSLATE_CALL, 3, &mut spans, |caps, value| {
                if &caps[2] == "get" && !TRANSLATE_OBJECT.is_match(&caps[1]) {
                    return None;
                }
                Some(restore_literal(value, caps, 3))
            });

            spans.sort_by_key(|(start, ..)| *start);
            let mut last_end = 0;
            for (start, end, key, replacement) in spans {
                if start < last_end {
                    continue;
                }
                last_end = end;
                let column = line[..start].chars().count() + 1;
                found.push(Reversal {
                    position: Position::new(idx + 1, column),
                    key,
                    matched: line[start..end].to_string(),
                    replacement,
                });
            }
        }
        found
    }

    /// Collect matches of `pattern` whose key (in groups `key_group..key_group + 3`) has a value.
    fn collect<F>(
        &self,
        line: &str,
        pattern: &Regex,
        key_group: usize,
        spans: &mut Vec<(usize, usize, String, String)>,
        restore: F,
    ) where
        F: Fn(&Captures<'_>, &str) -> Option<String>,
    {
        for caps in pattern.captures_iter(line) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(key) = (key_group..key_group + 3)
                .find_map(|i| caps.get(i))
                .map(|m| m.as_str())
            else {
                continue;
            };
            let Some(value) = self.values.get(key) else { continue };
            if let Some(replacement) = restore(&caps, value) {
                spans.push((whole.start(), whole.end(), key.to_string(), replacement));
            }
        }
    }

    fn collect_attributes(&self, line: &str, spans: &mut Vec<(usize, usize, String, String)>) {
        for caps in BOUND_ATTRIBUTE.captures_iter(line) {
            let (Some(whole), Some(attr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(key) = caps.get(2).or(caps.get(3)).map(|m| m.as_str()) else {
                continue;
            };
            let Some(value) = self.values.get(key) else { continue };
            let replacement = if caps.get(2).is_some() {
                format!("{}=\"{}\"", attr.as_str(), encode_entities(value, Some('"')))
            } else {
                format!("{}='{}'", attr.as_str(), encode_entities(value, Some('\'')))
            };
            spans.push((whole.start(), whole.end(), key.to_string(), replacement));
        }
    }

    /// Plan the reversal of every file. Nothing is written.
    pub fn plan(&self, files: &[(PathBuf, String)]) -> RewritePlan {
        let mut plan = RewritePlan::default();
        let mut reverted: BTreeMap<PathBuf, FileRewrite> = BTreeMap::new();

        for (path, file_rel) in files {
            let original = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(err) => {
                    plan.failures.push(Failure::new(
                        FailureKind::ParseFailure,
                        file_rel,
                        format!("Failed to read file: {}", err),
                    ));
                    continue;
                }
            };
            let reversals = self.scan(&original);
            if reversals.is_empty() {
                continue;
            }
            let (updated, applied, failures) = apply_reversals(&original, &reversals, file_rel);
            plan.skipped += failures.len();
            plan.failures.extend(failures);
            if applied == 0 {
                continue;
            }
            reverted.insert(
                path.clone(),
                FileRewrite {
                    path: path.clone(),
                    file_rel: file_rel.clone(),
                    original,
                    updated,
                    replaced: applied,
                },
            );
        }

        if let Some(scaffolder) = self.scaffolder {
            self.clean_up(scaffolder, &mut reverted);
        }
        plan.files = reverted.into_values().collect();
        plan
    }

    /// Drop scaffolding from reverted classes and from the classes behind reverted markup.
    fn clean_up(&self, scaffolder: &dyn Scaffolder, reverted: &mut BTreeMap<PathBuf, FileRewrite>) {
        let mut classes: Vec<PathBuf> = reverted
            .keys()
            .filter(|p| p.extension().is_some_and(|e| e == "ts"))
            .cloned()
            .collect();
        for path in reverted.keys() {
            if path.extension().is_some_and(|e| e == "html") {
                let class = path.with_extension("ts");
                if !reverted.contains_key(&class) && class.is_file() {
                    classes.push(class);
                }
            }
        }

        for class in classes {
            let template = external_template(reverted, &class);
            if let Some(file) = reverted.get_mut(&class) {
                file.updated = scaffolder.cleanup(&file.updated, self.accessor, template.as_deref());
                continue;
            }
            let Ok(original) = fs::read_to_string(&class) else {
                continue;
            };
            let updated = scaffolder.cleanup(&original, self.accessor, template.as_deref());
            if updated != original {
                let file_rel = reverted
                    .get(&class.with_extension("html"))
                    .map(|f| {
                        Path::new(&f.file_rel)
                            .with_extension("ts")
                            .to_string_lossy()
                            .replace('\\', "/")
                    })
                    .unwrap_or_else(|| class.to_string_lossy().to_string());
                reverted.insert(
                    class.clone(),
                    FileRewrite {
                        path: class,
                        file_rel,
                        original,
                        updated,
                        replaced: 0,
                    },
                );
            }
        }
    }
}

/// The markup next to a component class, as reverted in this run or as on disk.
fn external_template(reverted: &BTreeMap<PathBuf, FileRewrite>, class: &Path) -> Option<String> {
    let html = class.with_extension("html");
    reverted
        .get(&html)
        .map(|f| f.updated.clone())
        .or_else(|| fs::read_to_string(&html).ok())
}

/// Apply reversals from the end of the file backwards.
///
/// A reference no longer at its scanned position is looked up on the same
/// line; if it is gone the reversal fails and the rest continue.
pub fn apply_reversals(
    content: &str,
    reversals: &[Reversal],
    file_rel: &str,
) -> (String, usize, Vec<Failure>) {
    let mut ordered: Vec<&Reversal> = reversals.iter().collect();
    ordered.sort_by(|a, b| b.position.cmp(&a.position));

    let mut out = content.to_string();
    let mut applied = 0;
    let mut failures = Vec::new();
    for reversal in ordered {
        let index = LineIndex::new(&out);
        let at = index
            .offset(reversal.position)
            .filter(|&offset| out[offset..].starts_with(&reversal.matched))
            .or_else(|| {
                let line_start = index.offset(Position::new(reversal.position.line, 1))?;
                let line = index.line_text(reversal.position.line)?;
                line.find(&reversal.matched).map(|i| line_start + i)
            });
        match at {
            Some(start) => {
                out.replace_range(start..start + reversal.matched.len(), &reversal.replacement);
                applied += 1;
            }
            None => {
                tracing::warn!(file = %file_rel, position = %reversal.position, key = %reversal.key, "reference not found");
                failures.push(
                    Failure::new(
                        FailureKind::ReversalNotFound,
                        file_rel,
                        format!("'{}' is no longer in the file", reversal.matched),
                    )
                    .at(reversal.position),
                );
            }
        }
    }
    (out, applied, failures)
}

/// Quote `value` the way the key literal at capture group `first` was quoted.
/// Quote of the attribute value still open at the end of `prefix`, if any.
///
/// Tags spanning several lines are not tracked.
fn attribute_quote(prefix: &str) -> Option<char> {
    let mut in_tag = false;
    let mut quote = None;
    for c in prefix.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                '"' | '\'' if in_tag => quote = Some(c),
                _ => {}
            },
        }
    }
    quote
}

fn restore_literal(value: &str, caps: &Captures<'_>, first: usize) -> String {
    if caps.get(first + 1).is_some() {
        let escaped = value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n");
        format!("\"{}\"", escaped)
    } else if caps.get(first + 2).is_some() {
        format!("\\'{}\\'", value.replace('\'', "&#39;"))
    } else {
        format!("'{}'", escape_single_quoted(value))
    }
}
