//! Convenience constructors for common matchers.

use crate::matcher::Matcher;

/// Matches every text message.
pub fn on_text() -> Matcher {
    Matcher::new().name("text").check(|ctx| ctx.text().is_some())
}

/// Matches text messages starting with `prefix` (e.g. `"/"`).
pub fn on_prefix(prefix: impl Into<String>) -> Matcher {
    let prefix = prefix.into();
    Matcher::new()
        .name(format!("prefix:{prefix}"))
        .check(move |ctx| ctx.text().is_some_and(|t| t.trim_start().starts_with(&prefix)))
}

/// Matches text messages whose first word is exactly `command` (e.g. `"/help"`).
pub fn on_command(command: impl Into<String>) -> Matcher {
    let command = command.into();
    Matcher::new()
        .name(format!("command:{command}"))
        .check(move |ctx| {
            ctx.text()
                .and_then(|t| t.split_whitespace().next())
                .is_some_and(|word| word == command)
        })
}

/// Matches messages whose content type tag equals `type_id`.
pub fn on_content(type_id: &'static str) -> Matcher {
    Matcher::new()
        .name(format!("content:{type_id}"))
        .check(move |ctx| ctx.content().type_id() == type_id)
}
