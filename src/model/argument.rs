//! Argument lists parsed from their textual form.
//!
//! Parsing is deliberately shallow: arguments are split on top-level commas
//! (respecting `<>`, `()`, `[]` and `{}` nesting), and each argument is cut
//! into type, name, array suffix and default value. No type system sits
//! behind it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One formal or actual argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub type_name: String,
    pub name: String,
    /// Array suffix such as `[4]`
    pub array: String,
    pub default_value: String,
}

/// A parsed argument list including trailing qualifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentList {
    pub arguments: Vec<Argument>,
    pub is_const: bool,
    pub is_volatile: bool,
    /// Declared `= 0`
    pub is_pure: bool,
}

/// Words that are part of a type even when they come last.
const TYPE_WORDS: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "float", "double", "signed", "unsigned",
    "const", "volatile", "auto", "wchar_t", "char16_t", "char32_t", "size_t",
];

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Collapse whitespace the way declarations are compared and displayed.
///
/// A single space survives only between two identifier characters, and every
/// comma is followed by exactly one space: `std::map< int ,T >` becomes
/// `std::map<int, T>`.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space {
            if let Some(prev) = out.chars().last() {
                if is_ident_char(prev) && is_ident_char(c) {
                    out.push(' ');
                }
            }
            pending_space = false;
        }

        out.push(c);
        if c == ',' {
            out.push(' ');
            pending_space = false;
        }
    }

    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Split on `sep` at nesting depth zero.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte index of the bracket closing the one at `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, c) in text[open..].char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Position of a lone `=` at depth zero (not part of `==`, `<=`, `>=`, `!=`).
fn default_separator(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' | b'(' | b'[' | b'{' => depth += 1,
            b'>' | b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                let prev = i.checked_sub(1).map(|p| bytes[p]);
                let next = bytes.get(i + 1).copied();
                let compound = matches!(prev, Some(b'=' | b'<' | b'>' | b'!'))
                    || next == Some(b'=');
                if !compound {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

impl Argument {
    /// Parse one declaration like `const T &value = T()`.
    pub fn parse(text: &str) -> Self {
        let (decl, default_value) = match default_separator(text) {
            Some(pos) => (&text[..pos], text[pos + 1..].trim()),
            None => (text, ""),
        };
        let mut decl = decl.trim();

        let mut array = String::new();
        if decl.ends_with(']') {
            if let Some(open) = decl.find('[') {
                array = normalize_whitespace(&decl[open..]);
                decl = decl[..open].trim_end();
            }
        }

        let ident_start = decl
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_ident_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(decl.len());
        let ident = &decl[ident_start..];
        let prefix = decl[..ident_start].trim_end();

        let splits_name = !ident.is_empty()
            && !prefix.is_empty()
            && !prefix.ends_with(':')
            && !ident.chars().next().is_some_and(|c| c.is_ascii_digit())
            && !TYPE_WORDS.contains(&ident);

        let (type_name, name) = if splits_name {
            (normalize_whitespace(prefix), ident.to_string())
        } else {
            (normalize_whitespace(decl), String::new())
        };

        Self {
            type_name,
            name,
            array,
            default_value: normalize_whitespace(default_value),
        }
    }

    /// Parse a formal template parameter (`class T`, `typename U`, `int N = 3`, bare `T`).
    pub fn parse_template_param(text: &str) -> Self {
        let mut arg = Self::parse(text);
        if arg.name.is_empty() && !arg.type_name.contains(char::is_whitespace) {
            arg.name = std::mem::replace(&mut arg.type_name, "class".to_string());
        }
        arg
    }

    /// Whether this formal names a type (as opposed to a value parameter).
    pub fn is_type_param(&self) -> bool {
        self.type_name == "class"
            || self.type_name == "typename"
            || self.type_name.starts_with("template")
    }

    /// Type with elaborated-type keywords dropped, for signature comparison.
    fn comparable_type(&self) -> String {
        let words: Vec<&str> = self
            .type_name
            .split_whitespace()
            .filter(|w| !matches!(*w, "class" | "struct" | "union"))
            .collect();
        format!("{}{}", normalize_whitespace(&words.join(" ")), self.array)
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)?;
        if !self.name.is_empty() {
            if !self.type_name.is_empty() {
                f.write_str(" ")?;
            }
            f.write_str(&self.name)?;
        }
        f.write_str(&self.array)?;
        if !self.default_value.is_empty() {
            write!(f, " = {}", self.default_value)?;
        }
        Ok(())
    }
}

impl ArgumentList {
    /// Parse `(const T &a, int b = 0) const`.
    ///
    /// Text without parentheses yields an empty list.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(open) = text.find('(') else {
            return Self::default();
        };
        let close = matching_close(text, open).unwrap_or(text.len());
        let inner = &text[open + 1..close.min(text.len())];
        let trailing = text.get(close + 1..).unwrap_or("");

        let arguments = Self::split_arguments(inner, Argument::parse);

        let trailing = normalize_whitespace(trailing);
        let words: Vec<&str> = trailing
            .split(|c: char| !is_ident_char(c))
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            arguments,
            is_const: words.contains(&"const"),
            is_volatile: words.contains(&"volatile"),
            is_pure: trailing.replace(' ', "").ends_with("=0"),
        }
    }

    /// Parse actual template arguments such as `<int, std::vector<T> >`.
    ///
    /// Each argument keeps its whole text as the type.
    pub fn parse_template_spec(spec: &str) -> Self {
        let spec = spec.trim();
        let inner = match spec.find('<') {
            Some(open) => {
                let close = matching_close(spec, open).unwrap_or(spec.len());
                &spec[open + 1..close.min(spec.len())]
            }
            None => spec,
        };

        let arguments = Self::split_arguments(inner, |text| Argument {
            type_name: normalize_whitespace(text),
            ..Argument::default()
        });

        Self {
            arguments,
            ..Self::default()
        }
    }

    fn split_arguments(inner: &str, parse: impl Fn(&str) -> Argument) -> Vec<Argument> {
        let parts: Vec<&str> = split_top_level(inner, ',')
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() == 1 && parts[0] == "void" {
            return Vec::new();
        }
        parts.into_iter().map(parse).collect()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Lightweight signature compatibility.
    ///
    /// Same arity, same `const`/`volatile` qualifiers and pairwise equal
    /// normalised types. Names and default values are ignored.
    pub fn matches(&self, other: &ArgumentList) -> bool {
        if self.arguments.len() != other.arguments.len()
            || self.is_const != other.is_const
            || self.is_volatile != other.is_volatile
        {
            return false;
        }

        self.arguments
            .iter()
            .zip(&other.arguments)
            .all(|(a, b)| a.comparable_type() == b.comparable_type())
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")?;
        if self.is_const {
            f.write_str(" const")?;
        }
        if self.is_volatile {
            f.write_str(" volatile")?;
        }
        if self.is_pure {
            f.write_str("=0")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  const   T  & "), "const T&");
        assert_eq!(normalize_whitespace("std::map< int ,T >"), "std::map<int, T>");
        assert_eq!(normalize_whitespace("unsigned   long"), "unsigned long");
        assert_eq!(normalize_whitespace("<int,float>"), "<int, float>");
    }

    #[test]
    fn test_parse_argument_splits_name_and_default() {
        let arg = Argument::parse("const std::string &label = \"x\"");
        assert_eq!(arg.type_name, "const std::string&");
        assert_eq!(arg.name, "label");
        assert_eq!(arg.default_value, "\"x\"");

        let arg = Argument::parse("unsigned int");
        assert_eq!(arg.type_name, "unsigned int");
        assert!(arg.name.is_empty());

        let arg = Argument::parse("char buf[16]");
        assert_eq!(arg.type_name, "char");
        assert_eq!(arg.name, "buf");
        assert_eq!(arg.array, "[16]");

        let arg = Argument::parse("std::vector<int>");
        assert_eq!(arg.type_name, "std::vector<int>");
        assert!(arg.name.is_empty());
    }

    #[test]
    fn test_parse_template_params() {
        let t = Argument::parse_template_param("class T");
        assert_eq!((t.type_name.as_str(), t.name.as_str()), ("class", "T"));
        assert!(t.is_type_param());

        let n = Argument::parse_template_param("int N = 3");
        assert_eq!((n.type_name.as_str(), n.name.as_str()), ("int", "N"));
        assert_eq!(n.default_value, "3");
        assert!(!n.is_type_param());

        let bare = Argument::parse_template_param("U");
        assert_eq!((bare.type_name.as_str(), bare.name.as_str()), ("class", "U"));
    }

    #[test]
    fn test_parse_argument_list_with_qualifiers() {
        let list = ArgumentList::parse("(const T &a, int b = 0) const");
        assert_eq!(list.len(), 2);
        assert!(list.is_const);
        assert!(!list.is_volatile);
        assert_eq!(list.arguments[1].default_value, "0");

        let pure = ArgumentList::parse("() const = 0");
        assert!(pure.is_empty());
        assert!(pure.is_pure);

        assert!(ArgumentList::parse("(void)").is_empty());
        assert!(ArgumentList::parse("").is_empty());
    }

    #[test]
    fn test_nested_commas_stay_in_one_argument() {
        let list = ArgumentList::parse("(std::map<int, float> m, void (*cb)(int, int))");
        assert_eq!(list.len(), 2);
        assert_eq!(list.arguments[0].type_name, "std::map<int, float>");
    }

    #[test]
    fn test_signature_matching() {
        let a = ArgumentList::parse("(const Foo &x, int n)");
        let b = ArgumentList::parse("(const Foo& other, int)");
        let c = ArgumentList::parse("(const Foo &x, long n)");
        let d = ArgumentList::parse("(const Foo &x, int n) const");
        let e = ArgumentList::parse("(const class Foo &x, int n)");

        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert!(!a.matches(&d));
        assert!(a.matches(&e));
        assert!(ArgumentList::parse("(void)").matches(&ArgumentList::parse("()")));
    }

    #[test]
    fn test_template_spec() {
        let spec = ArgumentList::parse_template_spec("< int , std::pair<A,B> >");
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.arguments[0].type_name, "int");
        assert_eq!(spec.arguments[1].type_name, "std::pair<A, B>");
    }

    #[test]
    fn test_display_round_trip_text() {
        let list = ArgumentList::parse("(const T &a, int b = 0) const");
        assert_eq!(list.to_string(), "(const T& a, int b = 0) const");
    }
}
