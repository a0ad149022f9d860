//! Flag name normalization and option lookup.

use ngcli_options::OptionModel;
use std::borrow::Cow;

fn is_separator(c: char) -> bool {
    matches!(c, '-' | '_' | '.') || c.is_whitespace()
}

/// Convert `dry-run`, `dry_run` or `dry run` into `dryRun`.
///
/// Separator runs are dropped and the following character upper-cased; a
/// leading capital is lower-cased.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if is_separator(c) {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        _ => out,
    }
}

/// Convert `dryRun` into `dry-run`.
pub fn dasherize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            out.push('-');
        }
        if c == ' ' || c == '_' {
            out.push('-');
        } else {
            out.extend(c.to_lowercase());
        }
        prev = Some(c);
    }
    out
}

/// Whether `name` is written in camelCase (`fooBar`), as opposed to the
/// dasherized form the command line documents.
pub fn is_camel_case(name: &str) -> bool {
    let lower = name.chars().take_while(char::is_ascii_lowercase).count();
    lower > 0 && name.chars().nth(lower).is_some_and(|c| c.is_ascii_uppercase())
}

/// Resolve a flag name or alias to its option.
///
/// Names containing `-` or `_` are also tried in camelCase form. Options are
/// scanned in declaration order and the first match wins, so colliding
/// aliases resolve to the earlier option.
pub fn find_option<'o>(name: &str, options: &'o [OptionModel]) -> Option<&'o OptionModel> {
    let camel: Cow<'_, str> = if name.contains(['-', '_']) {
        Cow::Owned(camelize(name))
    } else {
        Cow::Borrowed(name)
    };
    let camel = camel.as_ref();

    options.iter().find(|option| {
        option.name == name
            || option.name == camel
            || option.aliases.iter().any(|alias| alias == name || alias == camel)
    })
}
