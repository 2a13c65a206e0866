//! Blocking "show message, get choice" capability
//!
//! The pipeline only talks to [`Prompter`]; the terminal implementation lives
//! here so the binary can plug it in.

use console::style;
use dialoguer::{theme::ColorfulTheme, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserChoice {
    Accept,
    Decline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub title: String,
    pub message: String,
    pub accept_label: String,
    pub decline_label: String,
}

impl Prompt {
    pub fn retry_or_close() -> Self {
        Self {
            title: "Unable to send".to_string(),
            message: "Error while sending your feedback. Do you want to retry?".to_string(),
            accept_label: "Retry".to_string(),
            decline_label: "Close feedback".to_string(),
        }
    }
}

pub trait Prompter {
    /// Block until the user picks one of the two options.
    fn confirm(&mut self, prompt: &Prompt) -> UserChoice;

    /// Block until the user acknowledges the message.
    fn notify(&mut self, title: &str, message: &str);
}

/// Interactive terminal prompts.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &Prompt) -> UserChoice {
        eprintln!();
        eprintln!("  {}", style(&prompt.title).red().bold());
        eprintln!("  {}", prompt.message);
        let items = [prompt.accept_label.as_str(), prompt.decline_label.as_str()];
        match Select::with_theme(&ColorfulTheme::default())
            .items(&items)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => UserChoice::Accept,
            // Escape, a closed terminal or the decline entry all close
            _ => UserChoice::Decline,
        }
    }

    fn notify(&mut self, title: &str, message: &str) {
        eprintln!();
        eprintln!("  {}", style(title).cyan().bold());
        eprintln!("  {}", message);
        eprintln!();
    }
}

/// Non-interactive prompter: prints notices and answers every confirm the same way.
#[derive(Debug)]
pub struct AutoPrompter {
    pub answer: UserChoice,
}

impl Prompter for AutoPrompter {
    fn confirm(&mut self, prompt: &Prompt) -> UserChoice {
        tracing::info!(
            title = %prompt.title,
            answer = ?self.answer,
            "{}",
            prompt.message
        );
        self.answer
    }

    fn notify(&mut self, title: &str, message: &str) {
        eprintln!("  {}: {}", title, message);
    }
}

/// Scripted prompter for tests: replays answers and records notices.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    pub answers: std::collections::VecDeque<UserChoice>,
    pub confirms: Vec<Prompt>,
    pub notices: Vec<(String, String)>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn answering(answers: &[UserChoice]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, prompt: &Prompt) -> UserChoice {
        self.confirms.push(prompt.clone());
        self.answers.pop_front().unwrap_or(UserChoice::Decline)
    }

    fn notify(&mut self, title: &str, message: &str) {
        self.notices.push((title.to_string(), message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_prompter_answers_consistently() {
        let mut prompter = AutoPrompter {
            answer: UserChoice::Decline,
        };
        let prompt = Prompt::retry_or_close();
        assert_eq!(prompter.confirm(&prompt), UserChoice::Decline);
        assert_eq!(prompter.confirm(&prompt), UserChoice::Decline);
    }

    #[test]
    fn test_scripted_prompter_defaults_to_decline_when_exhausted() {
        let mut prompter = ScriptedPrompter::answering(&[UserChoice::Accept]);
        let prompt = Prompt::retry_or_close();
        assert_eq!(prompter.confirm(&prompt), UserChoice::Accept);
        assert_eq!(prompter.confirm(&prompt), UserChoice::Decline);
        assert_eq!(prompter.confirms.len(), 2);
    }
}
