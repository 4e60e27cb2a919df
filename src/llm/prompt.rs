use crate::util::os_name;

/// Builds the prompt for a fresh suggestion.
pub fn build_prompt(description: &str) -> String {
    render(description, &os_name(), "", "")
}

/// Builds the prompt asking for an alternative after `error_context`.
pub fn build_prompt_with_context(description: &str, error_context: &str) -> String {
    let error_section = format!(
        "\nIMPORTANT CONTEXT: {error_context}\n\nPlease suggest an alternative command that addresses the error or takes a different approach.\n"
    );
    render(
        description,
        &os_name(),
        &error_section,
        "\n- Consider the error context and suggest a different approach",
    )
}

fn render(description: &str, os: &str, error_section: &str, extra_requirement: &str) -> String {
    format!(
        r#"Given this description: '{description}', suggest a single CLI command that would accomplish this task.

SYSTEM CONTEXT:
- Operating System: {os}
{error_section}
You MUST respond with ONLY valid JSON in this EXACT format:
{{"command": "the raw command", "description": "brief 1-2 line explanation of what this command does"}}

IMPORTANT REQUIREMENTS:
- Return ONLY the JSON object, no other text
- Do not wrap in markdown code blocks
- Do not include backticks, explanations, or any other formatting
- The command field must contain the exact command that can be executed
- The description field must be 1-2 lines maximum
- Ensure the JSON is properly formatted and valid
- Consider the operating system when suggesting commands{extra_requirement}"#
    )
}
