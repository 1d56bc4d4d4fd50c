use crate::output::Output;
use color_eyre::Result;
use dialoguer::{Input, Password};
use playstate_core::{select_ordinal, DEFAULT_MAX_ATTEMPTS};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder
        .interact_text()
        .map(|s| s.trim().to_string())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a secret (masked input)
pub fn prompt_password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read password: {}", e))
}

/// Print a numbered list and ask for one entry by its number.
///
/// Returns `None` when the list is empty or the operator gave up after too
/// many invalid answers.
pub fn select_from_list(output: &Output, title: &str, entries: &[String]) -> Result<Option<usize>> {
    if entries.is_empty() {
        return Ok(None);
    }

    output.info(title);
    for (idx, entry) in entries.iter().enumerate() {
        output.info(format!("{}. {}", idx + 1, entry));
    }

    let choice = select_ordinal(
        entries.len(),
        DEFAULT_MAX_ATTEMPTS,
        || {
            Input::<String>::new()
                .with_prompt("Enter number")
                .interact_text()
                .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
        },
        |e| output.error(e.to_string()),
    )?;

    if choice.is_none() {
        output.error(format!(
            "No valid selection after {} attempts.",
            DEFAULT_MAX_ATTEMPTS
        ));
    }
    Ok(choice)
}
