//! Help rendering for a command and its option list.

use crate::lookup::dasherize;
use ngcli_options::{Deprecation, OptionModel, OptionType};

/// Command description used in the help header.
pub trait CommandInfo {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn aliases(&self) -> &[String] {
        &[]
    }
}

fn format_flag(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{}", dasherize(name))
    }
}

fn format_positional_left(option: &OptionModel) -> String {
    let name = dasherize(&option.name);
    if option.required {
        format!("<{name}>")
    } else {
        format!("[{name}]")
    }
}

fn format_option_left(option: &OptionModel) -> String {
    let mut out = format!("--{}", dasherize(&option.name));
    if !option.aliases.is_empty() {
        let aliases: Vec<String> = option.aliases.iter().map(|a| format_flag(a)).collect();
        out.push_str(&format!(" ({})", aliases.join(", ")));
    }
    match option.option_type {
        OptionType::Boolean | OptionType::Any => {}
        other => out.push_str(&format!(" <{other}>")),
    }
    out
}

fn format_option_help(option: &OptionModel) -> String {
    let mut parts: Vec<String> = Vec::new();
    match &option.deprecated {
        Some(Deprecation::Message(message)) => parts.push(format!("(deprecated: {message})")),
        Some(Deprecation::Flag(true)) => parts.push("(deprecated)".to_string()),
        _ => {}
    }

    let description = option.description.trim();
    if !description.is_empty() {
        parts.push(description.to_string());
    }
    if let Some(allowed) = &option.enum_values {
        let allowed: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        parts.push(format!("[choices: {}]", allowed.join(", ")));
    }
    if let Some(default) = &option.default {
        parts.push(format!("[default: {default}]"));
    }
    if option.required && option.positional.is_none() {
        parts.push("(required)".to_string());
    }
    parts.join(" ")
}

fn push_table(out: &mut String, title: &str, rows: Vec<(String, String)>) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}

/// Render help text for `command` from its option list.
///
/// Hidden options are omitted. Positional options are listed under
/// `Arguments:` in slot order, every other option under `Options:`.
pub fn render_help<C: CommandInfo + ?Sized>(command: &C, options: &[OptionModel]) -> String {
    let mut positionals: Vec<&OptionModel> = options
        .iter()
        .filter(|o| !o.hidden && o.positional.is_some())
        .collect();
    positionals.sort_by_key(|o| o.positional);
    let flags: Vec<&OptionModel> = options
        .iter()
        .filter(|o| !o.hidden && o.positional.is_none())
        .collect();

    let mut out = String::new();
    let description = command.description().trim();
    if description.is_empty() {
        out.push_str(command.name());
        out.push('\n');
    } else {
        out.push_str(&format!("{} - {}\n", command.name(), description));
    }

    let mut usage = format!("\nUsage: {}", command.name());
    for option in &positionals {
        usage.push(' ');
        usage.push_str(&format_positional_left(option));
    }
    if !flags.is_empty() {
        usage.push_str(" [options]");
    }
    out.push_str(&usage);
    out.push('\n');

    if !command.aliases().is_empty() {
        out.push_str(&format!("\nAliases: {}\n", command.aliases().join(", ")));
    }

    push_table(
        &mut out,
        "Arguments",
        positionals
            .iter()
            .map(|o| (format_positional_left(o), format_option_help(o)))
            .collect(),
    );
    push_table(
        &mut out,
        "Options",
        flags
            .iter()
            .map(|o| (format_option_left(o), format_option_help(o)))
            .collect(),
    );

    out
}
