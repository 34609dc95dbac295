//! Textual substitution of formal template parameters.

use crate::model::{Argument, ArgumentList};
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z_0-9:]*").expect("Invalid regex"));

/// Replace every identifier in `text` that names a formal parameter.
///
/// The positional actual wins; without one the formal's default value is
/// substituted (itself substituted recursively, but never when it equals the
/// text being rewritten). An actual that is `formal` or starts with
/// `formal::` is left alone so `A::T` cannot grow into `A::T::T`.
pub fn substitute_template_arguments(
    text: &str,
    formals: &[Argument],
    actuals: &ArgumentList,
) -> String {
    substitute(text, formals, actuals, formals.len())
}

fn substitute(text: &str, formals: &[Argument], actuals: &ArgumentList, budget: usize) -> String {
    if formals.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + 8);
    let mut last = 0;

    for found in IDENTIFIER.find_iter(text) {
        result.push_str(&text[last..found.start()]);
        let ident = found.as_str();
        match replacement(ident, text, formals, actuals, budget) {
            Some(replaced) => {
                result.push_str(&replaced);
                result.push(' ');
            }
            None => result.push_str(ident),
        }
        last = found.end();
    }
    result.push_str(&text[last..]);

    tidy(&result)
}

fn replacement(
    ident: &str,
    whole: &str,
    formals: &[Argument],
    actuals: &ArgumentList,
    budget: usize,
) -> Option<String> {
    let (index, formal) = formals
        .iter()
        .enumerate()
        .find(|(_, formal)| formal.name == ident)?;

    if let Some(actual) = actuals.arguments.get(index) {
        if actual.type_name.is_empty() || left_scope_match(&actual.type_name, ident) {
            return None;
        }
        return Some(if actual.name.is_empty() {
            actual.type_name.clone()
        } else {
            format!("{} {}", actual.type_name, actual.name)
        });
    }

    if formal.default_value.is_empty() || formal.default_value == whole || budget == 0 {
        return None;
    }
    Some(substitute(&formal.default_value, formals, actuals, budget - 1))
}

/// `scope` is `name` or lives inside it.
fn left_scope_match(scope: &str, name: &str) -> bool {
    scope == name
        || scope
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// Collapse whitespace runs and drop spaces just inside brackets and before commas.
fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space
            && !matches!(c, ',' | ')' | '>' | ']')
            && !out.ends_with(['(', '<', '['])
        {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}
