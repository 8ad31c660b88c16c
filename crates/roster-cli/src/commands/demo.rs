//! The demo screen: a counter line above a word list, driven by text
//! commands instead of buttons.

use crate::config::RosterConfig;
use crate::support::{open_input_or_exit, resolve_identity_or_exit};
use roster_core::{IdentityKind, split_sentence};
use roster_transport::{Handle, RegistryKey, Session, TransportError};
use std::io::BufRead;

pub struct Args {
    pub script: Option<String>,
    pub initial: Option<i32>,
    pub identity: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("unknown command: {0} (try inc, reset, add, pop, remove, dup, show, entries, quit)")]
    UnknownCommand(String),

    #[error("{0} needs a key argument")]
    MissingKey(&'static str),

    #[error("word cannot be empty")]
    EmptyWord,

    #[error("invalid key {0:?}: expected an integer ID")]
    InvalidKey(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(Vec<String>),
    Quit,
}

/// One counter plus one word list, owned through a transport session.
pub struct Screen {
    session: Session,
    counter: Handle,
    list: Handle,
    identity: IdentityKind,
}

impl Screen {
    pub fn new(initial: i32, identity: IdentityKind) -> Self {
        let mut session = Session::new();
        let counter = session.create_counter(initial);
        let list = session.create_registry(identity);
        Self {
            session,
            counter,
            list,
            identity,
        }
    }

    /// Counter line, then one line per rendered word.
    pub fn render(&self) -> Result<Vec<String>, ScriptError> {
        let mut lines = vec![format!(
            "Counter: {}",
            self.session.counter_value(self.counter)?
        )];
        let words = self.session.formatted_string(self.list)?;
        lines.extend(split_sentence(&words).into_iter().map(|word| format!("  {word}")));
        Ok(lines)
    }

    pub fn execute(&mut self, line: &str) -> Result<Step, ScriptError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Step::Continue(Vec::new()));
        }
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));

        let output = match command {
            "inc" => {
                let value = self.session.increment_counter(self.counter)?;
                vec![format!("Counter: {value}")]
            }
            "reset" => {
                let value = self.session.reset_counter(self.counter)?;
                vec![format!("Counter: {value}")]
            }
            "add" => {
                if rest.is_empty() {
                    return Err(ScriptError::EmptyWord);
                }
                self.session.add_string(self.list, rest)?;
                Vec::new()
            }
            "pop" => {
                self.session.remove_last_string(self.list)?;
                Vec::new()
            }
            "remove" => {
                let key = self.parse_key("remove", rest)?;
                if self.session.remove_specific_string(self.list, &key)? {
                    vec![format!("Removed {key}")]
                } else {
                    vec![format!("No entry for {key}")]
                }
            }
            "dup" => {
                let key = self.parse_key("dup", rest)?;
                if self.session.duplicate_string(self.list, &key)? {
                    vec![format!("Duplicated {key}")]
                } else {
                    vec![format!("No entry for {key}")]
                }
            }
            "show" => self.render()?,
            "entries" => self
                .session
                .entries(self.list)?
                .into_iter()
                .map(|row| format!("{} {} {}", row.position, row.key, row.value))
                .collect(),
            "quit" | "exit" => return Ok(Step::Quit),
            other => return Err(ScriptError::UnknownCommand(other.to_string())),
        };
        Ok(Step::Continue(output))
    }

    /// Release both instances, the way the screen does when it is destroyed.
    pub fn close(mut self) -> Result<(), ScriptError> {
        self.session.delete_counter(self.counter)?;
        self.session.delete_registry(self.list)?;
        Ok(())
    }

    fn parse_key(&self, command: &'static str, raw: &str) -> Result<RegistryKey, ScriptError> {
        if raw.is_empty() {
            return Err(ScriptError::MissingKey(command));
        }
        match self.identity {
            IdentityKind::Value => Ok(RegistryKey::Text(raw.to_string())),
            IdentityKind::Synthetic => raw
                .parse()
                .map(RegistryKey::Id)
                .map_err(|_| ScriptError::InvalidKey(raw.to_string())),
        }
    }
}

pub fn run(args: Args, config: &RosterConfig) {
    let identity = resolve_identity_or_exit(args.identity.as_deref(), config);
    let initial = args.initial.unwrap_or(config.counter.initial);
    let scripted = args.script.is_some();
    let input = open_input_or_exit(args.script.as_deref());

    let mut screen = Screen::new(initial, identity);
    tracing::info!(%identity, initial, "demo screen opened");
    let mut failures = 0usize;

    match screen.render() {
        Ok(lines) => lines.iter().for_each(|line| println!("{line}")),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

    for (index, line) in input.lines().enumerate() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("error: failed to read input: {e}");
            std::process::exit(1);
        });
        match screen.execute(&line) {
            Ok(Step::Continue(lines)) => lines.iter().for_each(|line| println!("{line}")),
            Ok(Step::Quit) => break,
            Err(e) => {
                failures += 1;
                eprintln!("error: line {}: {e}", index + 1);
            }
        }
    }

    if let Err(e) = screen.close() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    if scripted && failures > 0 {
        std::process::exit(1);
    }
}
