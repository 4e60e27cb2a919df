use std::str::FromStr;
use clap::{ArgAction, Parser};
use suggest::{ProviderKind, SUGGEST_HELP_TEXT};

#[derive(Debug, Parser, Clone)]
#[clap(name = "suggest", author, version, about = SUGGEST_HELP_TEXT, long_about = None)]
pub struct CLI {
    /// What you want to do, in plain words
    #[clap(required = true, num_args = 1.., value_name = "DESCRIPTION")]
    pub(crate) description: Vec<String>,
    /// Provider to ask (gemini, openai or anthropic). Defaults to the first one with an API key
    #[clap(long, env = "SUGGEST_PROVIDER", value_parser = ProviderKind::from_str)]
    pub(crate) provider: Option<ProviderKind>,
    /// More log output on stderr (repeatable)
    #[clap(short, long, action = ArgAction::Count)]
    pub(crate) verbose: u8,
}

impl CLI {
    pub(crate) fn description(&self) -> String {
        self.description.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        CLI::command().debug_assert();
    }

    #[test]
    fn test_words_are_joined() {
        let cli = CLI::try_parse_from(["suggest", "list", "files", "by", "size"]).unwrap();
        assert_eq!(cli.description(), "list files by size");
        assert_eq!(cli.provider, None);
    }

    #[test]
    fn test_requires_description() {
        assert!(CLI::try_parse_from(["suggest"]).is_err());
    }

    #[test]
    fn test_provider_and_verbosity() {
        let cli = CLI::try_parse_from(["suggest", "-vv", "--provider", "anthropic", "undo", "commit"]).unwrap();
        assert_eq!(cli.provider, Some(ProviderKind::Anthropic));
        assert_eq!(cli.verbose, 2);
        assert!(CLI::try_parse_from(["suggest", "--provider", "mistral", "x"]).is_err());
    }

    #[test]
    fn test_provider_aliases() {
        let cli = CLI::try_parse_from(["suggest", "--provider", "Claude", "x"]).unwrap();
        assert_eq!(cli.provider, Some(ProviderKind::Anthropic));
        let cli = CLI::try_parse_from(["suggest", "--provider", "google", "x"]).unwrap();
        assert_eq!(cli.provider, Some(ProviderKind::Gemini));
    }

    #[test]
    fn test_about_text() {
        let help = CLI::command().render_help().to_string();
        assert!(help.contains(SUGGEST_HELP_TEXT));
    }
}
