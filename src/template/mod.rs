//! Template instantiation.
//!
//! Instances are keyed by their argument spec as text. How a spec is turned
//! into a cache key and how formals are rewritten into actuals is delegated
//! to a [`TemplateMatcher`], so a structural strategy can replace the
//! textual one without touching the callers in [`instance`].

mod args;
pub mod instance;

pub use args::substitute_template_arguments;

use crate::model::{Argument, ArgumentList, normalize_whitespace};

/// Strategy for keying and expanding template instances.
pub trait TemplateMatcher {
    /// Cache key for an argument spec such as `< int , T* >`.
    fn instance_key(&self, spec: &str) -> String;

    /// Rewrite `text`, replacing formal parameters by the actual arguments.
    fn substitute(&self, text: &str, formals: &[Argument], actuals: &ArgumentList) -> String;
}

/// Exact-text matching after whitespace normalisation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextualTemplateMatcher;

impl TemplateMatcher for TextualTemplateMatcher {
    fn instance_key(&self, spec: &str) -> String {
        normalize_whitespace(spec)
    }

    fn substitute(&self, text: &str, formals: &[Argument], actuals: &ArgumentList) -> String {
        substitute_template_arguments(text, formals, actuals)
    }
}
