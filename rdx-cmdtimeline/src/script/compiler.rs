//! Compiles timeline text into an [`ActionQueue`].
//!
//! Compilation walks the file once:
//!
//! ```text
//! SkippingLeadingComments ──► ExpectingOptionalRequire ──► CompilingBody ──► Done
//!          │ (file exhausted)          │ (#req not satisfied)     │ (bad line)
//!          ▼                           ▼                          ▼
//!    EmptyTimeline             MissingParameters       InvalidWaitInterval /
//!                                                      CannotRunFromConsole /
//!                                                      Format / Other
//! ```
//!
//! Any error aborts compilation: a caller either gets the full queue or none.
//! Nothing is executed here.

use super::binder::bind;
use super::directive::{Directive, Specifiers, REQUIRE_PREFIX, REQUIRE_SEPARATOR};
use super::preprocess::{preprocess, Line};
use crate::action::{Action, ActionQueue};
use crate::error::TimelineError;
use crate::host::CommandHost;
use tracing::debug;

pub struct Compiler<'a> {
    name: &'a str,
    params: &'a [String],
    host: &'a dyn CommandHost,
    specifiers: Specifiers<'a>,
}

impl<'a> Compiler<'a> {
    /// `name` is the timeline identifier used in errors; `params` are the
    /// arguments of the run.
    pub fn new(
        name: &'a str,
        params: &'a [String],
        host: &'a dyn CommandHost,
        specifiers: Specifiers<'a>,
    ) -> Self {
        Self {
            name,
            params,
            host,
            specifiers,
        }
    }

    /// Compiles a whole timeline file.
    pub fn compile(&self, raw: &str) -> Result<ActionQueue, TimelineError> {
        let mut lines = raw.lines().enumerate().map(|(index, line)| (index + 1, line));

        let (first_number, first) = lines
            .by_ref()
            .find_map(|(number, line)| match preprocess(line) {
                Line::Text(text) if !text.trim().is_empty() => Some((number, text)),
                _ => None,
            })
            .ok_or_else(|| TimelineError::EmptyTimeline(self.name.to_string()))?;

        let mut queue = ActionQueue::new();
        if let Some(names) = first.strip_prefix(REQUIRE_PREFIX) {
            let names: Vec<&str> = names.split(REQUIRE_SEPARATOR).collect();
            if self.params.len() < names.len() {
                let formatted = names
                    .iter()
                    .map(|name| format!("<{name}>"))
                    .collect::<Vec<_>>()
                    .join(" ");
                return Err(TimelineError::MissingParameters(formatted));
            }
        } else {
            self.compile_line(first_number, first, &mut queue)?;
        }

        for (number, line) in lines {
            if let Line::Text(text) = preprocess(line) {
                self.compile_line(number, text, &mut queue)?;
            }
        }

        debug!("Compiled {} action(s) from {}.", queue.len(), self.name);
        Ok(queue)
    }

    /// Compiles lines with no leading-comment or `#req` handling. Empty input
    /// yields an empty queue.
    pub fn compile_body(&self, raw: &str) -> Result<ActionQueue, TimelineError> {
        let mut queue = ActionQueue::new();
        for (index, line) in raw.lines().enumerate() {
            if let Line::Text(text) = preprocess(line) {
                self.compile_line(index + 1, text, &mut queue)?;
            }
        }
        Ok(queue)
    }

    fn compile_line(
        &self,
        number: usize,
        text: &str,
        queue: &mut ActionQueue,
    ) -> Result<(), TimelineError> {
        let bound;
        let text = if self.params.is_empty() {
            text
        } else {
            bound = bind(text, self.params).map_err(|source| TimelineError::Format {
                line: number,
                source,
            })?;
            bound.as_str()
        };

        let directive = Directive::parse(text, self.specifiers, |t| self.host.tokenize(t))
            .map_err(|invalid| TimelineError::InvalidWaitInterval {
                line: number,
                value: invalid.0,
            })?;

        match directive {
            Directive::Comment => {}
            Directive::Wait(duration) => queue.push_back(Action::Delay {
                line: number,
                duration,
            }),
            Directive::Require(_) => {
                return Err(TimelineError::Other(format!(
                    "{}: #req must be the first non-comment line (found on line {})",
                    self.name, number
                )));
            }
            Directive::Command(cmd) => {
                let handlers = self.host.find_commands(&cmd.name);
                if handlers.is_empty() {
                    queue.push_back(Action::ResponseDelivery {
                        line: number,
                        key: cmd.name,
                        raw: cmd.text,
                        args: cmd.args,
                    });
                    return Ok(());
                }
                if handlers.iter().any(|h| !h.allow_server()) {
                    return Err(TimelineError::CannotRunFromConsole {
                        name: self.name.to_string(),
                        command: cmd.name,
                        line: number,
                    });
                }
                for handler in handlers {
                    queue.push_back(Action::Invoke {
                        line: number,
                        command: cmd.name.clone(),
                        handler,
                        raw: cmd.text.clone(),
                        silent: cmd.silent,
                        args: cmd.args.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Command, LocalHost};
    use std::time::Duration;

    const SPECIFIERS: Specifiers<'static> = Specifiers {
        normal: "/",
        silent: ".",
    };

    fn host() -> LocalHost {
        let host = LocalHost::new();
        host.commands().register(Command::new(["say"], |_| Ok(())));
        host.commands().register(Command::new(["time"], |_| Ok(())));
        host.commands()
            .register(Command::new(["home"], |_| Ok(())).allow_console(false));
        host
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn compile(raw: &str, params: &[String]) -> Result<ActionQueue, TimelineError> {
        let host = host();
        Compiler::new("test.txt", params, &host, SPECIFIERS).compile(raw)
    }

    #[test]
    fn hello_wait_bye_compiles_to_three_actions() {
        let queue = compile("say hello {0}\n#wait 500\nsay bye", &args(&["world"])).unwrap();
        let actions: Vec<&Action> = queue.iter().collect();
        assert_eq!(actions.len(), 3);

        match actions[0] {
            Action::Invoke { command, args, line, .. } => {
                assert_eq!(command, "say");
                assert_eq!(args, &vec!["hello".to_string(), "world".to_string()]);
                assert_eq!(*line, 1);
            }
            other => panic!("expected invoke, got {other:?}"),
        }
        match actions[1] {
            Action::Delay { duration, .. } => assert_eq!(*duration, Duration::from_millis(500)),
            other => panic!("expected delay, got {other:?}"),
        }
        match actions[2] {
            Action::Invoke { command, args, .. } => {
                assert_eq!(command, "say");
                assert_eq!(args, &vec!["bye".to_string()]);
            }
            other => panic!("expected invoke, got {other:?}"),
        }
    }

    #[test]
    fn comment_only_files_are_empty() {
        for raw in ["//comment only", "", "// a\n// b\n", "   // indented\n\n", "// a\n   \n"] {
            let err = compile(raw, &[]).unwrap_err();
            assert!(
                matches!(err, TimelineError::EmptyTimeline(ref name) if name == "test.txt"),
                "{raw:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn missing_parameters_are_listed() {
        let err = compile("#req x, y\nsay {0} {1}", &args(&["1"])).unwrap_err();
        match err {
            TimelineError::MissingParameters(list) => assert_eq!(list, "<x> <y>"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn satisfied_require_is_consumed() {
        let queue = compile("// header\n#req who\nsay hi {0}", &args(&["bob"])).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].line(), 3);
    }

    #[test]
    fn require_after_commands_is_rejected() {
        let err = compile("say hi\n#req who", &args(&["bob"])).unwrap_err();
        assert_eq!(err.as_label(), "timeline_error");
    }

    #[test]
    fn invalid_wait_aborts_whole_compilation() {
        let err = compile("say one\n#wait notanumber\nsay two", &[]).unwrap_err();
        match err {
            TimelineError::InvalidWaitInterval { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "notanumber");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wait_interval_can_come_from_a_parameter() {
        let queue = compile("#wait {0}", &args(&["250"])).unwrap();
        assert!(matches!(
            queue[0],
            Action::Delay { duration, .. } if duration == Duration::from_millis(250)
        ));
    }

    #[test]
    fn console_forbidden_command_aborts() {
        let err = compile("say hi\n\n/home", &[]).unwrap_err();
        match err {
            TimelineError::CannotRunFromConsole { command, line, .. } => {
                assert_eq!(command, "home");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_command_becomes_response_delivery() {
        let queue = compile("Yes please", &[]).unwrap();
        match &queue[0] {
            Action::ResponseDelivery { key, raw, args, .. } => {
                assert_eq!(key, "yes");
                assert_eq!(raw, "Yes please");
                assert_eq!(args, &vec!["please".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn silent_specifier_and_inline_comments() {
        let queue = compile(".time noon // quietly", &[]).unwrap();
        match &queue[0] {
            Action::Invoke { silent, raw, args, .. } => {
                assert!(*silent);
                assert_eq!(raw, "time noon");
                assert_eq!(args, &vec!["noon".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn out_of_range_placeholder_is_a_format_error() {
        let err = compile("say {1}", &args(&["only"])).unwrap_err();
        assert!(matches!(err, TimelineError::Format { line: 1, .. }));
    }

    #[test]
    fn placeholders_are_left_alone_without_parameters() {
        let queue = compile("say {0}", &[]).unwrap();
        assert!(matches!(&queue[0], Action::Invoke { args, .. } if args == &vec!["{0}".to_string()]));
    }

    #[test]
    fn shared_alias_enqueues_one_invoke_per_command() {
        let host = host();
        host.commands()
            .register(Command::new(["announce", "say"], |_| Ok(())));
        let queue = Compiler::new("test.txt", &[], &host, SPECIFIERS)
            .compile("say hi")
            .unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn compile_body_accepts_empty_input() {
        let host = host();
        let compiler = Compiler::new("cleanup", &[], &host, SPECIFIERS);
        assert!(compiler.compile_body("").unwrap().is_empty());
        assert_eq!(compiler.compile_body("say done\n#wait 5").unwrap().len(), 2);
    }
}
