//! One feedback cycle, end to end
//!
//! Gate first, then (for a full report) probes and bundle, then delivery.
//! The scratch space is owned by the cycle and removed exactly once on every
//! exit path via [`ScratchGuard`]. Nothing here returns an error: every
//! failure comes back as an outcome value.

use crate::archive::{Archive, ArchiveBuilder, ScratchGuard, ScratchSpace, SystemTar};
use crate::config::{AccountProfile, Config};
use crate::error::{ArchiveError, SubmitError};
use crate::gate::Gatekeeper;
use crate::probe::{default_catalog, DiagnosticProbe, LogStore, ProbeSettings};
use crate::prompt::{AutoPrompter, Prompter, UserChoice};
use crate::retry::{run_with_retry, RetryOutcome};
use crate::stats::SharedPostSubmit;
use crate::submit::{ApiClient, Category, FormClient, FormSubmission, Report, SubmissionOutcome};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const UNABLE_TO_SEND_TITLE: &str = "Unable to send";
pub const UNABLE_TO_SEND_MESSAGE: &str =
    "Please check that you have internet and are logged into your account.";
pub const THANK_YOU_TITLE: &str = "Thank you";
pub const THANK_YOU_MESSAGE: &str = "Your feedback is very important to us.";

/// Builds the probe catalog for a given account username.
pub type CatalogFactory = Box<dyn Fn(&str) -> Vec<Box<dyn DiagnosticProbe>> + Send + Sync>;

/// System catalog wired to the configured paths and log store.
pub fn system_catalog(config: &Config, work_dir: PathBuf, log_store: Arc<dyn LogStore>) -> CatalogFactory {
    let base = ProbeSettings {
        timeout: config.command_timeout(),
        paths: config.probes.clone(),
        work_dir,
        username: String::new(),
        log_store,
    };
    Box::new(move |username: &str| {
        default_catalog(&ProbeSettings {
            username: username.to_string(),
            ..base.clone()
        })
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screenshot {
    None,
    CopyFrom(PathBuf),
    /// Capture tool argv; `{path}` is replaced with the destination
    Capture(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub text: String,
    pub subject: String,
    /// Attach the diagnostic bundle
    pub full_report: bool,
    pub screenshot: Screenshot,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub api_url: Option<String>,
    pub form_url: String,
    pub request_timeout: Duration,
    pub command_timeout: Duration,
    /// Offer a retry after a failed form submission
    pub retry: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_url: config.api_url(),
            form_url: config.form_url.clone(),
            request_timeout: config.request_timeout(),
            command_timeout: config.command_timeout(),
            retry: true,
        }
    }
}

/// Account state read once the gate has passed.
struct Session {
    profile: AccountProfile,
    token: Option<String>,
}

/// Gate checks and post-submit hooks do blocking I/O and may wait on an
/// interactive remedy, so they run on the blocking pool.
pub struct Pipeline<'a> {
    settings: PipelineSettings,
    scratch: ScratchSpace,
    gate: Arc<Mutex<Gatekeeper>>,
    prompter: &'a mut dyn Prompter,
    post_submit: SharedPostSubmit,
    catalog: CatalogFactory,
    archiver: SystemTar,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        settings: PipelineSettings,
        scratch: ScratchSpace,
        gate: Gatekeeper,
        prompter: &'a mut dyn Prompter,
        post_submit: SharedPostSubmit,
        catalog: CatalogFactory,
    ) -> Self {
        let archiver = SystemTar::new(settings.command_timeout);
        Self {
            settings,
            scratch,
            gate: Arc::new(Mutex::new(gate)),
            prompter,
            post_submit,
            catalog,
            archiver,
        }
    }

    pub fn with_archiver(mut self, archiver: SystemTar) -> Self {
        self.archiver = archiver;
        self
    }

    fn notify_unable_to_send(&mut self) {
        self.prompter.notify(UNABLE_TO_SEND_TITLE, UNABLE_TO_SEND_MESSAGE);
    }

    /// Pass the gate (running remedies if needed) and read the account.
    async fn open_session(&self) -> Option<Session> {
        let gate = Arc::clone(&self.gate);
        let opened = tokio::task::spawn_blocking(move || {
            let mut gate = gate.lock().unwrap_or_else(PoisonError::into_inner);
            if !gate.ensure_ready() {
                return None;
            }
            let account = gate.account();
            Some(Session {
                profile: account.profile(),
                token: account.token(),
            })
        })
        .await;
        match opened {
            Ok(session) => session,
            Err(err) => {
                tracing::error!("gate worker failed: {}", err);
                None
            }
        }
    }

    async fn record_delivery(&self) {
        let hooks = Arc::clone(&self.post_submit);
        let done = tokio::task::spawn_blocking(move || {
            let mut hooks = hooks.lock().unwrap_or_else(PoisonError::into_inner);
            hooks.increment_bugs_submitted();
            hooks.purge_logs();
        })
        .await;
        if let Err(err) = done {
            tracing::error!("post-submit worker failed: {}", err);
        }
    }

    /// Run the probes and pack the bundle on the blocking pool.
    ///
    /// Leaves the scratch space in place; the caller decides when it goes.
    pub async fn collect_bundle(
        &self,
        username: &str,
        screenshot: &Screenshot,
    ) -> Result<Archive, ArchiveError> {
        let builder = ArchiveBuilder::new(
            self.scratch.clone(),
            (self.catalog)(username),
            Box::new(self.archiver.clone()),
        );
        let screenshot = screenshot.clone();
        let timeout = self.settings.command_timeout;

        tokio::task::spawn_blocking(move || {
            stage_screenshot(builder.scratch(), &screenshot, timeout)?;
            builder.build()
        })
        .await
        .map_err(|e| ArchiveError::Worker(e.to_string()))?
    }

    /// API path: gate, optional bundle, one delivery attempt, cleanup.
    pub async fn send_report(&mut self, request: &ReportRequest) -> SubmissionOutcome {
        // Also clears anything a previous run left behind
        let _guard = ScratchGuard::new(self.scratch.clone());

        let Some(Session { profile, token }) = self.open_session().await else {
            self.notify_unable_to_send();
            return SubmissionOutcome::failed(UNABLE_TO_SEND_MESSAGE);
        };
        let Some(token) = token else {
            return SubmissionOutcome::failed(SubmitError::MissingToken.to_string());
        };
        let client = match self.api_client(&token) {
            Ok(client) => client,
            Err(err) => return SubmissionOutcome::failed(err.to_string()),
        };

        let attachment = if request.full_report {
            let username = profile.username.clone().unwrap_or_default();
            match self.collect_bundle(&username, &request.screenshot).await {
                Ok(archive) => Some(archive),
                Err(err) => {
                    tracing::error!("failed to build diagnostic bundle: {}", err);
                    return SubmissionOutcome::failed(SubmitError::from(err).to_string());
                }
            }
        } else {
            None
        };

        let report = Report {
            text: request.text.clone(),
            email: profile.email.unwrap_or_default(),
            category: Category::Os,
            subject: request.subject.clone(),
            attachment,
        };
        let outcome = self.client_submit(&client, &report).await;

        if outcome.success {
            if request.full_report {
                self.record_delivery().await;
            }
            self.prompter.notify(THANK_YOU_TITLE, THANK_YOU_MESSAGE);
        }
        outcome
    }

    async fn client_submit(&self, client: &ApiClient, report: &Report) -> SubmissionOutcome {
        if let Some(archive) = &report.attachment {
            tracing::info!(members = ?archive.members, "sending report with diagnostic bundle");
        } else {
            tracing::info!("sending report");
        }
        client.submit(report).await
    }

    fn api_client(&self, token: &str) -> Result<ApiClient, SubmitError> {
        let base = self
            .settings
            .api_url
            .as_deref()
            .ok_or(SubmitError::NotConfigured)?;
        ApiClient::new(base, token, self.settings.request_timeout)
    }

    /// Form path: gate, then post until delivered or the user gives up.
    pub async fn send_form(&mut self, title: &str, body: &str) -> RetryOutcome {
        let _guard = ScratchGuard::new(self.scratch.clone());

        let Some(Session { profile, .. }) = self.open_session().await else {
            self.notify_unable_to_send();
            return RetryOutcome {
                success: false,
                attempts: 0,
                last_error: Some(UNABLE_TO_SEND_MESSAGE.to_string()),
            };
        };
        let form = FormSubmission {
            title: title.to_string(),
            username: profile.username.unwrap_or_default(),
            body: body.to_string(),
            email: profile.email.unwrap_or_default(),
        };
        let client = match FormClient::new(&self.settings.form_url, self.settings.request_timeout) {
            Ok(client) => client,
            Err(err) => {
                return RetryOutcome {
                    success: false,
                    attempts: 0,
                    last_error: Some(err.to_string()),
                }
            }
        };

        let mut no_retry = AutoPrompter {
            answer: UserChoice::Decline,
        };
        let prompter: &mut dyn Prompter = if self.settings.retry {
            &mut *self.prompter
        } else {
            &mut no_retry
        };
        let outcome = run_with_retry(|| client.submit_form(&form), prompter).await;

        if outcome.success {
            self.prompter.notify(THANK_YOU_TITLE, THANK_YOU_MESSAGE);
        }
        outcome
    }
}

fn stage_screenshot(
    scratch: &ScratchSpace,
    screenshot: &Screenshot,
    timeout: Duration,
) -> Result<(), ArchiveError> {
    match screenshot {
        Screenshot::None => Ok(()),
        Screenshot::CopyFrom(path) => scratch.copy_screenshot(path).map(|_| ()),
        Screenshot::Capture(argv) => {
            // A missing screenshot tool should not cost the user their report
            if let Err(err) = scratch.capture_screenshot(argv, timeout) {
                tracing::warn!("screenshot capture failed: {}", err);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::testing::gatekeeper;
    use crate::probe::testing::StaticProbe;
    use crate::prompt::ScriptedPrompter;
    use crate::stats::testing::CountingPostSubmit;
    use mockito::Matcher;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn static_catalog() -> CatalogFactory {
        Box::new(|_username: &str| -> Vec<Box<dyn DiagnosticProbe>> {
            vec![
                Box::new(StaticProbe {
                    name: "process.txt",
                    output: Some("PID 1 init\n"),
                }),
                Box::new(StaticProbe {
                    name: "dmesg.txt",
                    output: None,
                }),
            ]
        })
    }

    fn settings(api_url: Option<String>, form_url: String) -> PipelineSettings {
        PipelineSettings {
            api_url,
            form_url,
            request_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(10),
            retry: true,
        }
    }

    fn full_request() -> ReportRequest {
        ReportRequest {
            text: "wifi drops".to_string(),
            subject: "Network".to_string(),
            full_report: true,
            screenshot: Screenshot::None,
        }
    }

    // ========================================================================
    // Gate
    // ========================================================================

    #[tokio::test]
    async fn test_closed_gate_sends_nothing_and_notifies() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (gate, _, _) = gatekeeper((false, false), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(Some(server.url()), format!("{}/form", server.url())),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_report(&full_request())
        .await;

        never.assert_async().await;
        assert!(!outcome.success);
        assert!(!scratch.exists());
        assert_eq!(post.lock().unwrap().increments, 0);
        assert_eq!(
            prompter.notices,
            vec![(UNABLE_TO_SEND_TITLE.to_string(), UNABLE_TO_SEND_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_closed_gate_skips_form_submission() {
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (gate, _, login) = gatekeeper((true, true), (false, false));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(None, format!("{}/form", server.url())),
            ScratchSpace::new(TempDir::new().unwrap().path().join("scratch")),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_form("title", "body")
        .await;

        never.assert_async().await;
        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 0);
        assert_eq!(login.load(Ordering::SeqCst), 1);
        assert!(prompter.confirms.is_empty());
    }

    #[tokio::test]
    async fn test_closed_gate_removes_leftover_scratch() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        std::fs::create_dir_all(scratch.root()).unwrap();
        std::fs::write(scratch.root().join("screenshot.png"), b"png").unwrap();

        let (gate, _, _) = gatekeeper((false, false), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(None, String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_report(&full_request())
        .await;

        assert!(!outcome.success);
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_closed_gate_on_form_path_removes_leftover_scratch() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        std::fs::create_dir_all(scratch.root()).unwrap();
        std::fs::write(scratch.root().join("bug_report.tar.gz"), b"old").unwrap();

        let (gate, _, _) = gatekeeper((true, true), (false, false));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(None, String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_form("title", "body")
        .await;

        assert!(!outcome.success);
        assert!(!scratch.exists());
    }

    // ========================================================================
    // API path
    // ========================================================================

    #[tokio::test]
    async fn test_full_report_success_counts_once_and_cleans_up() {
        crate::logging::init_test_logging();
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/feedback")
            .match_header("authorization", "Bearer test-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="email"\r\n\r\nada@example.com"#.to_string()),
                Matcher::Regex(r#"name="report"; filename="bug_report.tar.gz""#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .expect(1)
            .create_async()
            .await;

        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(Some(server.url()), String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_report(&full_request())
        .await;

        mock.assert_async().await;
        assert_eq!(outcome, SubmissionOutcome::delivered());
        assert!(!scratch.exists());
        assert_eq!(post.lock().unwrap().increments, 1);
        assert_eq!(post.lock().unwrap().purges, 1);
        assert_eq!(prompter.notices.len(), 1);
        assert_eq!(prompter.notices[0].0, THANK_YOU_TITLE);
    }

    #[tokio::test]
    async fn test_rejected_report_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/feedback")
            .with_status(503)
            .with_body(r#"{"error": "maintenance"}"#)
            .create_async()
            .await;

        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(Some(server.url()), String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_report(&full_request())
        .await;

        assert!(!outcome.success);
        assert!(outcome.error_message.unwrap().contains("maintenance"));
        assert!(!scratch.exists());
        assert_eq!(post.lock().unwrap().increments, 0);
        assert_eq!(post.lock().unwrap().purges, 0);
        assert!(prompter.notices.is_empty());
    }

    #[tokio::test]
    async fn test_text_only_report_skips_bundle_and_counter() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let mut server = mockito::Server::new_async().await;
        let with_bundle = server
            .mock("POST", "/feedback")
            .match_body(Matcher::Regex(r#"name="report""#.to_string()))
            .expect(0)
            .create_async()
            .await;
        let plain = server
            .mock("POST", "/feedback")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let request = ReportRequest {
            full_report: false,
            ..full_request()
        };
        let outcome = Pipeline::new(
            settings(Some(server.url()), String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_report(&request)
        .await;

        with_bundle.assert_async().await;
        plain.assert_async().await;
        assert!(outcome.success);
        assert!(!scratch.exists());
        assert_eq!(post.lock().unwrap().increments, 0);
    }

    #[tokio::test]
    async fn test_archiver_failure_is_reported_and_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let mut server = mockito::Server::new_async().await;
        let never = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(Some(server.url()), String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .with_archiver(SystemTar {
            program: "diagdrop-no-such-tar".to_string(),
            timeout: Duration::from_secs(1),
        })
        .send_report(&full_request())
        .await;

        never.assert_async().await;
        assert!(!outcome.success);
        assert!(!scratch.exists());
        assert_eq!(post.lock().unwrap().increments, 0);
    }

    #[tokio::test]
    async fn test_missing_api_url_fails_without_touching_scratch() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let outcome = Pipeline::new(
            settings(None, String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_report(&full_request())
        .await;

        assert_eq!(
            outcome,
            SubmissionOutcome::failed(SubmitError::NotConfigured.to_string())
        );
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn test_collect_bundle_stages_screenshot_and_keeps_scratch() {
        let dir = TempDir::new().unwrap();
        let scratch = ScratchSpace::new(dir.path().join("scratch"));
        let image = dir.path().join("shot.png");
        std::fs::write(&image, b"png").unwrap();

        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let pipeline = Pipeline::new(
            settings(None, String::new()),
            scratch.clone(),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        );
        let archive = pipeline
            .collect_bundle("ada", &Screenshot::CopyFrom(image))
            .await
            .unwrap();

        assert_eq!(archive.members, vec!["process.txt", "screenshot.png"]);
        assert!(scratch.exists());
    }

    // ========================================================================
    // Form path
    // ========================================================================

    #[tokio::test]
    async fn test_form_retry_until_user_closes() {
        crate::logging::init_test_logging();
        let mut prompter =
            ScriptedPrompter::answering(&[UserChoice::Accept, UserChoice::Decline]);
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let outcome = Pipeline::new(
            settings(None, "http://127.0.0.1:1/formResponse".to_string()),
            ScratchSpace::new(TempDir::new().unwrap().path().join("scratch")),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_form("title", "body")
        .await;

        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(prompter.confirms.len(), 2);
        assert!(prompter.notices.is_empty());
        assert_eq!(post.lock().unwrap().increments, 0);
    }

    #[tokio::test]
    async fn test_form_without_retry_makes_one_attempt() {
        let mut prompter = ScriptedPrompter::answering(&[UserChoice::Accept]);
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let mut no_retry = settings(None, "http://127.0.0.1:1/formResponse".to_string());
        no_retry.retry = false;
        let outcome = Pipeline::new(
            no_retry,
            ScratchSpace::new(TempDir::new().unwrap().path().join("scratch")),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_form("title", "body")
        .await;

        assert!(!outcome.success);
        assert_eq!(outcome.attempts, 1);
        assert!(prompter.confirms.is_empty());
    }

    #[tokio::test]
    async fn test_form_success_uses_profile_and_thanks_user() {
        let mut server = mockito::Server::new_async().await;
        let expected = FormSubmission {
            title: "\"Broken\"".to_string(),
            username: "ada".to_string(),
            body: "sound is off".to_string(),
            email: "ada@example.com".to_string(),
        };
        let mock = server
            .mock("POST", "/formResponse")
            .match_body(Matcher::Exact(expected.encode()))
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let mut prompter = ScriptedPrompter::default();
        let post = Arc::new(Mutex::new(CountingPostSubmit::default()));
        let (gate, _, _) = gatekeeper((true, true), (true, true));
        let outcome = Pipeline::new(
            settings(None, format!("{}/formResponse", server.url())),
            ScratchSpace::new(TempDir::new().unwrap().path().join("scratch")),
            gate,
            &mut prompter,
            post.clone(),
            static_catalog(),
        )
        .send_form("\"Broken\"", "sound is off")
        .await;

        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.attempts, 1);
        assert_eq!(
            prompter.notices,
            vec![(THANK_YOU_TITLE.to_string(), THANK_YOU_MESSAGE.to_string())]
        );
    }
}
