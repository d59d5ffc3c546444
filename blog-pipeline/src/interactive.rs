//! Console prompting behind a trait so interactive flows can be scripted.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use crate::error::{PipelineError, PipelineResult};

pub trait Prompter: Send + Sync {
    /// Show `prompt` and return the trimmed reply.
    fn ask(&self, prompt: &str) -> PipelineResult<String>;
}

pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&self, prompt: &str) -> PipelineResult<String> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt).map_err(|e| PipelineError::io("<stdout>", e))?;
        stdout.flush().map_err(|e| PipelineError::io("<stdout>", e))?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| PipelineError::io("<stdin>", e))?;
        Ok(line.trim().to_string())
    }
}

/// Replays canned answers; an exhausted script answers with empty strings.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, prompt: &str) -> PipelineResult<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        let answer = self
            .answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .unwrap_or_default();
        Ok(answer.trim().to_string())
    }
}

/// `y/n` question; an empty reply means yes.
pub fn confirm(prompter: &dyn Prompter, question: &str) -> PipelineResult<bool> {
    let reply = prompter.ask(&format!("{} (y/n) [y]: ", question))?;
    Ok(matches!(reply.to_lowercase().as_str(), "" | "y" | "yes"))
}

/// Ask for a number, falling back to `default` on an empty reply.
pub fn ask_number(prompter: &dyn Prompter, question: &str, default: u32) -> PipelineResult<u32> {
    let reply = prompter.ask(&format!("{} [{}]: ", question, default))?;
    if reply.is_empty() {
        return Ok(default);
    }
    reply
        .parse()
        .map_err(|_| PipelineError::Config(format!("'{}' is not a number", reply)))
}
