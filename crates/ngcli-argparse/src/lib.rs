//! Schema-driven argument parsing and help rendering.
//!
//! The parser reconciles raw argv tokens with a list of [`OptionModel`]s:
//! - `--flag`, `--flag=value`, `--flag value` and `--no-flag` for booleans
//! - combined short flags (`-abc`, `-o=value`)
//! - positional binding for options declaring a positional slot
//! - type coercion (boolean/number/string/array/any) with enum filtering
//!
//! Tokens that match no option are never errors: they are collected into the
//! `--` bucket of [`Arguments`] so callers can forward them to a nested tool.

pub mod arguments;
pub mod coerce;
pub mod help;
pub mod lookup;
pub mod parser;

pub use arguments::Arguments;
pub use ngcli_options::{OptionModel, OptionType, Value};
pub use parser::{ParseArgumentException, parse_arguments, parse_free_form_arguments};
