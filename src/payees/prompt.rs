//! Asking the operator for the name of an unknown payee.

use std::io::{BufRead, IsTerminal};

use anyhow::{bail, Result};
use console::Term;
use dialoguer::{theme::ColorfulTheme, Input};

/// Details of the transaction that an unknown payee appeared in.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PromptRequest {
    pub date: String,
    pub payee: String,
    pub contra_account: String,
    /// Currency followed by the signed amount, e.g. `EUR-12.50`.
    pub amount: String,
    pub narration: String,
    /// The key that the answer will be cached under.
    pub key: String,
}

/// Source of operator answers for unresolved payees.
pub trait Prompter {
    /// Returns a single line of input, without the line terminator.
    fn prompt(&mut self, request: &PromptRequest) -> Result<String>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn prompt(&mut self, request: &PromptRequest) -> Result<String> {
        (**self).prompt(request)
    }
}

/// Prompts on stderr and reads the answer from stdin. Uses an interactive
/// line editor on a terminal, and plain lines when stdin is piped.
pub struct TerminalPrompter {
    term: Term,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn prompt(&mut self, request: &PromptRequest) -> Result<String> {
        if !std::io::stdin().is_terminal() {
            return LinePrompter::new(std::io::stdin().lock()).prompt(request);
        }

        write_details(&self.term, request)?;
        let answer: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(question(request))
            .allow_empty(true)
            .interact_text_on(&self.term)?;
        Ok(answer)
    }
}

/// Prompts on stderr and reads one line per answer from `reader`. Running
/// out of input is an error, so that the remaining payees are never resolved
/// to empty names.
pub struct LinePrompter<R: BufRead> {
    term: Term,
    reader: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            term: Term::stderr(),
            reader,
        }
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn prompt(&mut self, request: &PromptRequest) -> Result<String> {
        write_details(&self.term, request)?;
        self.term.write_line(&question(request))?;
        read_answer(&mut self.reader, &request.key)
    }
}

fn write_details(term: &Term, request: &PromptRequest) -> Result<()> {
    term.write_line("New payee in transaction")?;
    term.write_line(&format!("Date: {}", request.date))?;
    term.write_line(&format!("Payee: {}", request.payee))?;
    term.write_line(&format!("Account: {}", request.contra_account))?;
    term.write_line(&format!("Amount: {}", request.amount))?;
    term.write_line(&format!("Narration: {}", request.narration))?;
    Ok(())
}

fn question(request: &PromptRequest) -> String {
    format!(
        "Give a name for {}, = to preserve, q to exit, s to skip, S to skip all",
        request.key
    )
}

fn read_answer<R: BufRead>(reader: &mut R, key: &str) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        bail!("input closed while asking for the payee of {:?}", key);
    }
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Replays canned answers and records what was asked.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub requests: Vec<PromptRequest>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            requests: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn prompt(&mut self, request: &PromptRequest) -> Result<String> {
        self.requests.push(request.clone());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt for {:?}", request.key))
    }
}
