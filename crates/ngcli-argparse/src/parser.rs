//! The argument parser proper.
//!
//! Parsing is a single pass over the tokens. Flag tokens are assigned as they
//! are seen, bare tokens are collected and bound to positional options once
//! every flag has been processed. Coercion failures do not stop the pass;
//! they are gathered and reported together in a [`ParseArgumentException`].

use crate::arguments::Arguments;
use crate::coerce::coerce;
use crate::lookup::{camelize, dasherize, find_option, is_camel_case};
use ngcli_options::{OptionModel, OptionType, Value};
use thiserror::Error;

/// One or more flags could not be coerced to their option's type.
#[derive(Debug, Clone, Error)]
#[error("One or more errors occurred while parsing arguments:\n  {}", .comments.join("\n  "))]
pub struct ParseArgumentException {
    /// One message per failed coercion.
    pub comments: Vec<String>,
    /// Everything that was assigned successfully, leftovers included.
    pub parsed: Arguments,
    /// Tokens dropped because their value could not be coerced.
    pub ignored: Vec<String>,
}

fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-')
}

fn coercion_error(flag: &str, raw: Option<&str>, option: &OptionModel) -> String {
    let shown = Value::from(raw.unwrap_or_default());
    let mut message = format!("Argument {flag} could not be parsed using value {shown}.");
    match &option.enum_values {
        Some(allowed) => {
            let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
            message.push_str(&format!(" Valid values are: {}.", allowed.join(", ")));
        }
        None => {
            let types: Vec<&str> = option.accepted_types().iter().map(|t| t.as_str()).collect();
            message.push_str(&format!(" Valid type(s) is: {}", types.join(", ")));
        }
    }
    message
}

/// Accumulators for one parse call.
struct ParseState<'o> {
    options: &'o [OptionModel],
    parsed: Arguments,
    positionals: Vec<String>,
    leftovers: Vec<String>,
    ignored: Vec<String>,
    errors: Vec<String>,
}

impl<'o> ParseState<'o> {
    fn new(options: &'o [OptionModel]) -> Self {
        Self {
            options,
            parsed: Arguments::new(),
            positionals: Vec::new(),
            leftovers: Vec::new(),
            ignored: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Assign a single `--flag[=value]` or `-f[=value]` token.
    ///
    /// Returns whether `next` was consumed as the flag's value.
    fn assign_option<'a>(&mut self, arg: &'a str, next: Option<&'a str>) -> bool {
        let body = arg
            .strip_prefix("--")
            .or_else(|| arg.strip_prefix('-'))
            .unwrap_or(arg);
        let mut consumed_next = false;

        let (flag, name, resolved): (&str, &str, Option<(&'o OptionModel, Option<&str>)>) =
            if let Some((name, value)) = body.split_once('=') {
                let flag = &arg[..arg.len() - body.len() + name.len()];
                let resolved = find_option(name, self.options).map(|o| (o, Some(value)));
                (flag, name, resolved)
            } else {
                let negated = body.strip_prefix("no").and_then(|rest| {
                    let rest = rest.strip_prefix('-').unwrap_or(rest);
                    find_option(&camelize(rest), self.options)
                        .filter(|o| o.option_type == OptionType::Boolean)
                        .map(|o| (o, Some("false")))
                });

                let resolved = negated.or_else(|| {
                    find_option(body, self.options).map(|option| {
                        let value = next.filter(|candidate| {
                            !looks_like_flag(candidate)
                                && coerce(Some(*candidate), Some(option), None).is_some()
                        });
                        consumed_next = value.is_some();
                        (option, value)
                    })
                });
                (arg, body, resolved)
            };

        let Some((option, raw)) = resolved else {
            self.leftovers.push(arg.to_string());
            if let Some(next) = next.filter(|n| !n.is_empty() && !looks_like_flag(n)) {
                self.leftovers.push(next.to_string());
                return true;
            }
            return false;
        };

        let previous = self.parsed.get(&option.name).cloned();
        let coerced = coerce(raw, Some(option), previous.as_ref());
        match coerced {
            Some(value) => {
                if let Some(previous) = previous.filter(|p| *p != value) {
                    if option.option_type != OptionType::Array {
                        tracing::warn!(
                            "Option \"{}\" was already specified with value {previous}. \
                             The new value {value} will override it.",
                            option.name
                        );
                    }
                }
                self.parsed.set(option.name.clone(), value);
            }
            None => {
                self.errors.push(coercion_error(flag, raw, option));
                self.ignored.push(arg.to_string());
            }
        }

        if is_camel_case(name) {
            tracing::warn!(
                "Support for camel case arguments has been deprecated. Use '--{}' instead of '--{name}'.",
                dasherize(name)
            );
        }

        consumed_next
    }

    /// Assign a `-abc` cluster. Only the last letter may take a value.
    fn assign_short_cluster<'a>(&mut self, arg: &'a str, next: Option<&'a str>) -> bool {
        let letters: Vec<(usize, char)> = arg.char_indices().skip(1).collect();
        let last = letters.len().saturating_sub(1);

        for (pos, &(offset, letter)) in letters.iter().enumerate() {
            let after = &arg[offset + letter.len_utf8()..];
            if after.starts_with('=') {
                return self.assign_option(&format!("-{letter}{after}"), next);
            }
            if pos == last {
                return self.assign_option(&format!("-{letter}"), next);
            }

            // Unknown letters inside a cluster are dropped without a diagnostic.
            let mut buf = [0u8; 4];
            if let Some(option) = find_option(letter.encode_utf8(&mut buf), self.options) {
                let previous = self.parsed.get(&option.name);
                if let Some(value) = coerce(None, Some(option), previous) {
                    self.parsed.set(option.name.clone(), value);
                }
            }
        }
        false
    }

    /// Bind collected bare tokens to options declaring a positional slot.
    fn bind_positionals(&mut self) {
        let options = self.options;
        let mut slot = 0usize;
        let mut index = 0usize;

        while index < self.positionals.len() {
            let mut candidates = options
                .iter()
                .filter(|o| o.positional == Some(slot))
                .peekable();
            if candidates.peek().is_none() {
                index += 1;
                continue;
            }

            let token = self.positionals[index].as_str();
            let claim = candidates
                .filter(|o| !self.parsed.contains(&o.name))
                .find_map(|o| coerce(Some(token), Some(o), None).map(|value| (o, value)));

            if let Some((option, value)) = claim {
                tracing::debug!(option = %option.name, slot, "bound positional argument");
                self.parsed.set(option.name.clone(), value);
                self.positionals.remove(index);
            }
            slot += 1;
        }
    }

    fn finish(self) -> Result<Arguments, ParseArgumentException> {
        let Self {
            mut parsed,
            positionals,
            leftovers,
            ignored,
            errors,
            ..
        } = self;

        parsed.push_leftovers(positionals.into_iter().chain(leftovers));

        if errors.is_empty() {
            Ok(parsed)
        } else {
            Err(ParseArgumentException {
                comments: errors,
                parsed,
                ignored,
            })
        }
    }
}

/// Parse `tokens` against `options`.
///
/// Unknown flags and unbound bare tokens end up in the `--` bucket of the
/// result, as does everything after a literal `--`. If any flag value fails
/// to coerce, the whole parse fails with a [`ParseArgumentException`] that
/// still carries the partial result.
pub fn parse_arguments(
    tokens: &[String],
    options: &[OptionModel],
) -> Result<Arguments, ParseArgumentException> {
    tracing::debug!(tokens = tokens.len(), options = options.len(), "parsing arguments");

    let mut state = ParseState::new(options);
    let mut index = 0usize;

    while index < tokens.len() {
        let arg = tokens[index].as_str();
        let next = tokens.get(index + 1).map(String::as_str);

        if arg == "--" {
            state.leftovers.extend(tokens[index + 1..].iter().cloned());
            break;
        }

        let consumed_next = if arg.starts_with("--") {
            state.assign_option(arg, next)
        } else if arg.starts_with('-') && arg.len() > 1 {
            state.assign_short_cluster(arg, next)
        } else {
            state.positionals.push(arg.to_string());
            false
        };

        index += if consumed_next { 2 } else { 1 };
    }

    state.bind_positionals();
    state.finish()
}

fn plain_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse `tokens` without any option schema.
///
/// `--name=value` and `--name value` store `value` under `name` (coerced as
/// `any`, repeated names accumulate into an array). A following token that
/// starts with `-` is not taken as a value, so `--name` alone stores `true`.
/// `-abc` sets `a`, `b` and `c` to `true`, and every other token is left
/// over. Never fails.
///
/// Accumulation works on strings: an earlier scalar becomes its JSON text and
/// a repeat without a value appends `""`, so `--b --b` yields
/// `{"b": ["true", ""]}`.
pub fn parse_free_form_arguments(tokens: &[String]) -> Arguments {
    let mut parsed = Arguments::new();
    let mut leftovers: Vec<String> = Vec::new();
    let mut rest = tokens.iter().peekable();

    while let Some(arg) = rest.next() {
        if arg == "--" {
            leftovers.extend(rest.by_ref().cloned());
            break;
        }

        if let Some(body) = arg.strip_prefix("--") {
            let (name, raw) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, rest.next_if(|next| !looks_like_flag(next)).map(String::as_str)),
            };
            let previous = parsed.get(name).map(|p| match p {
                Value::Array(_) => p.clone(),
                scalar => Value::Array(vec![plain_string(scalar)]),
            });
            if let Some(value) = coerce(raw, None, previous.as_ref()) {
                parsed.set(name.to_string(), value);
            }
        } else if arg.len() > 1 && arg.starts_with('-') {
            for letter in arg.chars().skip(1) {
                parsed.set(letter.to_string(), Value::Bool(true));
            }
        } else {
            leftovers.push(arg.clone());
        }
    }

    parsed.push_leftovers(leftovers);
    parsed
}
