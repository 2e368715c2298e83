//! Classification of a single preprocessed, parameter-bound line.

use std::time::Duration;
use thiserror::Error;

/// Declares the parameters a timeline needs, e.g. `#req player, item`.
pub const REQUIRE_PREFIX: &str = "#req ";
/// Pauses the run, e.g. `#wait 500`.
pub const WAIT_PREFIX: &str = "#wait ";
/// Separator between the names of a `#req` directive.
pub const REQUIRE_SEPARATOR: &str = ", ";

/// What one line of a timeline means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Nothing to execute: a comment or a line without tokens.
    Comment,
    /// `#wait <ms>`.
    Wait(Duration),
    /// `#req a, b, ...`.
    Require(Vec<String>),
    /// Any other line.
    Command(CommandLine),
}

/// A tokenized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Feedback to the actor is suppressed.
    pub silent: bool,
    /// The line without its leading specifier.
    pub text: String,
    /// The command name, lower-cased.
    pub name: String,
    pub args: Vec<String>,
}

/// The two prefixes a command line may start with.
#[derive(Debug, Clone, Copy)]
pub struct Specifiers<'a> {
    pub normal: &'a str,
    pub silent: &'a str,
}

/// The value after `#wait ` is not a non-negative integer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid interval '{0}' for #wait action")]
pub struct InvalidInterval(pub String);

impl Directive {
    /// Classifies `line`, which must already be comment-stripped and bound.
    ///
    /// `tokenize` is the host's argument splitter.
    pub fn parse<F>(
        line: &str,
        specifiers: Specifiers<'_>,
        tokenize: F,
    ) -> Result<Directive, InvalidInterval>
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        if let Some(rest) = line.strip_prefix(WAIT_PREFIX) {
            let millis = rest
                .trim()
                .parse::<u64>()
                .map_err(|_| InvalidInterval(rest.to_string()))?;
            return Ok(Directive::Wait(Duration::from_millis(millis)));
        }
        if let Some(rest) = line.strip_prefix(REQUIRE_PREFIX) {
            let names = rest.split(REQUIRE_SEPARATOR).map(str::to_string).collect();
            return Ok(Directive::Require(names));
        }

        let (silent, text) = split_specifier(line, specifiers);
        let mut args = tokenize(text);
        if args.is_empty() {
            return Ok(Directive::Comment);
        }
        let name = args.remove(0).to_lowercase();
        Ok(Directive::Command(CommandLine {
            silent,
            text: text.to_string(),
            name,
            args,
        }))
    }
}

fn split_specifier<'l>(line: &'l str, specifiers: Specifiers<'_>) -> (bool, &'l str) {
    if !specifiers.silent.is_empty() {
        if let Some(rest) = line.strip_prefix(specifiers.silent) {
            return (true, rest);
        }
    }
    if !specifiers.normal.is_empty() {
        if let Some(rest) = line.strip_prefix(specifiers.normal) {
            return (false, rest);
        }
    }
    (false, line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::tokenize;

    const SPECIFIERS: Specifiers<'static> = Specifiers {
        normal: "/",
        silent: ".",
    };

    fn parse(line: &str) -> Result<Directive, InvalidInterval> {
        Directive::parse(line, SPECIFIERS, tokenize)
    }

    #[test]
    fn wait_directive_parses_milliseconds() {
        assert_eq!(
            parse("#wait 500").unwrap(),
            Directive::Wait(Duration::from_millis(500))
        );
        assert_eq!(
            parse("#wait  250 ").unwrap(),
            Directive::Wait(Duration::from_millis(250))
        );
    }

    #[test]
    fn wait_directive_rejects_non_numbers() {
        assert_eq!(
            parse("#wait notanumber"),
            Err(InvalidInterval("notanumber".into()))
        );
        assert!(parse("#wait -5").is_err());
        assert!(parse("#wait ").is_err());
    }

    #[test]
    fn require_directive_splits_on_comma_space() {
        assert_eq!(
            parse("#req player, item, amount").unwrap(),
            Directive::Require(vec!["player".into(), "item".into(), "amount".into()])
        );
    }

    #[test]
    fn plain_command_line() {
        let Directive::Command(cmd) = parse("Say hello world").unwrap() else {
            panic!("expected a command");
        };
        assert_eq!(cmd.name, "say");
        assert_eq!(cmd.args, vec!["hello", "world"]);
        assert_eq!(cmd.text, "Say hello world");
        assert!(!cmd.silent);
    }

    #[test]
    fn specifiers_are_stripped() {
        let Directive::Command(normal) = parse("/time noon").unwrap() else {
            panic!("expected a command");
        };
        assert!(!normal.silent);
        assert_eq!(normal.text, "time noon");

        let Directive::Command(silent) = parse(".time noon").unwrap() else {
            panic!("expected a command");
        };
        assert!(silent.silent);
        assert_eq!(silent.name, "time");
    }

    #[test]
    fn lines_without_tokens_are_skipped() {
        assert_eq!(parse("").unwrap(), Directive::Comment);
        assert_eq!(parse("/").unwrap(), Directive::Comment);
    }
}
