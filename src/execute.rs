use std::io::{self, BufRead, Write};
use anyhow::{anyhow, Result};
use tracing::debug;
use suggest::llm::{select_provider, LlmError, Provider};
use suggest::runner::run_command;
use suggest::ui::{
    command_style, copy_to_clipboard, error_style, info_style, print_suggestion, prompt_line,
    success_style, with_spinner, Action,
};
use suggest::{logging, Config, Suggestion};
use crate::cli::CLI;

const ACTION_PROMPT: &str = "Press Enter to run, 'y' to copy to clipboard, or any other key to exit: ";
const RETRY_PROMPT: &str = "Press 'r' to ask for an alternative, or any other key to exit: ";

pub fn execute(cli: CLI) -> Result<()> {
    logging::init(cli.verbose);
    let description = cli.description();
    debug!(%description, "asking for a suggestion");

    let config = Config::load()?;
    let provider = select_provider(&config, cli.provider).map_err(suggestion_error)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    interact(provider.as_ref(), &description, &mut input, &mut out)
}

fn suggestion_error(e: LlmError) -> anyhow::Error {
    anyhow!("Error getting suggestion: {e}")
}

fn interact<R: BufRead, W: Write>(
    provider: &dyn Provider,
    description: &str,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let mut reply = with_spinner(|| provider.generate_command(description));
    loop {
        let suggestion = Suggestion::parse(&reply.map_err(suggestion_error)?).map_err(suggestion_error)?;
        print_suggestion(&suggestion);

        let choice = prompt_line(ACTION_PROMPT, input, out)?;
        match Action::from_input(&choice) {
            Action::Run => {
                println!("\n {} {}", info_style("Running:"), command_style(&suggestion.command));
                let Err(e) = run_command(&suggestion.command) else {
                    return Ok(());
                };
                println!("\n {}", error_style(&format!("Error running command: {e:#}")));
                let again = prompt_line(RETRY_PROMPT, input, out)?;
                if Action::from_retry_input(&again) != Action::Retry {
                    println!("\n {}", info_style("Exiting..."));
                    return Ok(());
                }
                let context = format!("The previous suggestion `{}` failed: {e:#}", suggestion.command);
                reply = with_spinner(|| provider.generate_command_with_context(description, &context));
            }
            Action::Copy => {
                match copy_to_clipboard(&suggestion.command) {
                    Ok(()) => println!("\n {}", success_style("Command copied to clipboard!")),
                    Err(e) => println!("\n {}", error_style(&format!("Error copying to clipboard: {e:#}"))),
                }
                return Ok(());
            }
            Action::Retry | Action::Exit => {
                println!("\n {}", info_style("Exiting..."));
                return Ok(());
            }
        }
    }
}
