//! User-driven retry for the form fallback
//!
//! An explicit state machine: there is no attempt limit, only the user's
//! "close" ends a failing run, and stack depth stays constant no matter how
//! many times they choose to retry.

use crate::prompt::{Prompt, Prompter, UserChoice};
use crate::submit::FormResponse;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq)]
enum RetryState {
    Attempt,
    FailedPrompt(FormResponse),
    Done(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    pub success: bool,
    pub attempts: u32,
    /// Transport error of the last failed attempt
    pub last_error: Option<String>,
}

/// Run `attempt` until it succeeds or the user declines to retry.
pub async fn run_with_retry<F, Fut>(mut attempt: F, prompter: &mut dyn Prompter) -> RetryOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FormResponse>,
{
    let mut state = RetryState::Attempt;
    let mut attempts = 0u32;
    let mut last_error = None;

    loop {
        state = match state {
            RetryState::Attempt => {
                attempts += 1;
                let response = attempt().await;
                if response.success {
                    RetryState::Done(true)
                } else {
                    tracing::error!(
                        attempt = attempts,
                        status = response.status_code,
                        "Error while sending feedback: {}",
                        response.raw_error
                    );
                    RetryState::FailedPrompt(response)
                }
            }
            RetryState::FailedPrompt(response) => {
                last_error = Some(response.raw_error);
                match prompter.confirm(&Prompt::retry_or_close()) {
                    UserChoice::Accept => RetryState::Attempt,
                    UserChoice::Decline => RetryState::Done(false),
                }
            }
            RetryState::Done(success) => {
                return RetryOutcome {
                    success,
                    attempts,
                    last_error: if success { None } else { last_error },
                };
            }
        };
    }
}
