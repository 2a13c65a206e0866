//! Connectivity and login preconditions
//!
//! Runs before any submission. Each check gets one interactive remedy and a
//! re-check; the gate passes only when both hold afterwards. Login is not
//! attempted while offline.

use crate::account;
use crate::keyring;
use crate::config::{AccountProfile, Config};
use crate::error::GateError;
use crate::util::{command_from_argv, command_label, run_interactive_with_timeout};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Implementations run on a blocking worker thread, hence `Send`.
pub trait Reachability: Send {
    fn is_online(&self) -> bool;

    /// Interactive network configuration; blocks until the user is done.
    fn remedy(&mut self);
}

pub trait AccountSession: Send {
    fn token(&self) -> Option<String>;

    fn profile(&self) -> AccountProfile;

    /// Interactive login; blocks until the user is done.
    fn remedy(&mut self);

    fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

pub struct Gatekeeper {
    network: Box<dyn Reachability>,
    account: Box<dyn AccountSession>,
}

impl Gatekeeper {
    pub fn new(network: Box<dyn Reachability>, account: Box<dyn AccountSession>) -> Self {
        Self { network, account }
    }

    pub fn account(&self) -> &dyn AccountSession {
        self.account.as_ref()
    }

    pub fn try_connect(&mut self) -> bool {
        if self.network.is_online() {
            return true;
        }
        tracing::info!("network unreachable, launching network setup");
        self.network.remedy();
        self.network.is_online()
    }

    pub fn try_login(&mut self) -> bool {
        if self.account.is_logged_in() {
            return true;
        }
        tracing::info!("not logged in, launching login");
        self.account.remedy();
        self.account.is_logged_in()
    }

    pub fn check(&mut self) -> Result<(), GateError> {
        if !self.try_connect() {
            return Err(GateError::Offline);
        }
        if !self.try_login() {
            return Err(GateError::NotLoggedIn);
        }
        Ok(())
    }

    pub fn ensure_ready(&mut self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("cannot send feedback: {}", err);
                false
            }
        }
    }
}

fn run_remedy(argv: &[String], timeout: Duration) {
    let label = command_label(argv);
    let Some(mut command) = command_from_argv(argv) else {
        return;
    };
    match run_interactive_with_timeout(&mut command, timeout) {
        Ok(result) if result.timed_out => tracing::warn!(command = %label, "remedy timed out"),
        Ok(result) => tracing::debug!(command = %label, code = ?result.exit_code(), "remedy finished"),
        Err(err) => tracing::warn!(command = %label, "remedy failed to start: {}", err),
    }
}

/// Reachability by opening a TCP connection to a well-known host.
#[derive(Debug, Clone)]
pub struct TcpReachability {
    pub target: String,
    pub timeout: Duration,
    pub remedy: Option<Vec<String>>,
    pub remedy_timeout: Duration,
}

impl TcpReachability {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target: config.connectivity_target.clone(),
            timeout: config.connect_timeout(),
            remedy: config.network_remedy.clone(),
            remedy_timeout: config.remedy_timeout(),
        }
    }
}

impl Reachability for TcpReachability {
    fn is_online(&self) -> bool {
        let addrs = match self.target.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(err) => {
                tracing::debug!(target = %self.target, "resolve failed: {}", err);
                return false;
            }
        };
        addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok())
    }

    fn remedy(&mut self) {
        match &self.remedy {
            Some(argv) => run_remedy(argv, self.remedy_timeout),
            None => tracing::warn!("no network_remedy configured; connect to a network and retry"),
        }
    }
}

/// Session backed by `DIAGDROP_TOKEN` / the system keychain.
#[derive(Debug, Clone)]
pub struct KeyringSession {
    config: Config,
    interactive: bool,
}

impl KeyringSession {
    pub fn new(config: Config, interactive: bool) -> Self {
        Self {
            config,
            interactive,
        }
    }
}

impl AccountSession for KeyringSession {
    fn token(&self) -> Option<String> {
        account::stored_token()
    }

    fn profile(&self) -> AccountProfile {
        self.config.account.clone()
    }

    fn remedy(&mut self) {
        if let Some(argv) = self.config.login_remedy.clone() {
            run_remedy(&argv, self.config.remedy_timeout());
            // The external tool may have written a token and a profile
            keyring::invalidate_cache();
            let reloaded = Config::load();
            self.config.account = reloaded.account;
            return;
        }
        if !self.interactive {
            tracing::warn!("not logged in; run `diagdrop login` first");
            return;
        }
        if let Err(err) = account::interactive_login(&mut self.config) {
            tracing::warn!("login failed: {}", err);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{gatekeeper, FakeNetwork};
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_ready_without_remedies() {
        let (mut gate, net, login) = gatekeeper((true, true), (true, true));
        assert!(gate.ensure_ready());
        assert_eq!(net.load(Ordering::SeqCst), 0);
        assert_eq!(login.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remedies_that_work_pass_the_gate() {
        let (mut gate, net, login) = gatekeeper((false, true), (false, true));
        assert!(gate.ensure_ready());
        assert_eq!(net.load(Ordering::SeqCst), 1);
        assert_eq!(login.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_offline_after_remedy_skips_login() {
        let (mut gate, net, login) = gatekeeper((false, false), (false, true));
        assert_eq!(gate.check(), Err(GateError::Offline));
        assert_eq!(net.load(Ordering::SeqCst), 1);
        assert_eq!(login.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_login_failure_after_remedy() {
        let (mut gate, _, login) = gatekeeper((true, true), (false, false));
        assert_eq!(gate.check(), Err(GateError::NotLoggedIn));
        assert!(!gate.ensure_ready());
        assert_eq!(login.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tcp_reachability_against_local_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let target = listener.local_addr().unwrap().to_string();
        let probe = TcpReachability {
            target,
            timeout: Duration::from_secs(2),
            remedy: None,
            remedy_timeout: Duration::from_secs(1),
        };
        assert!(probe.is_online());
    }

    #[test]
    fn test_tcp_reachability_unresolvable_target() {
        let probe = TcpReachability {
            target: "not a host".to_string(),
            timeout: Duration::from_millis(200),
            remedy: None,
            remedy_timeout: Duration::from_secs(1),
        };
        assert!(!probe.is_online());
    }

    #[cfg(unix)]
    #[test]
    fn test_login_tool_token_is_seen_on_recheck() {
        let _lock = keyring::testing::lock();
        let saved_env = std::env::var(account::TOKEN_ENV).ok();
        std::env::remove_var(account::TOKEN_ENV);

        // An empty store gets cached before the login tool runs
        keyring::testing::set_stored_token(None);
        keyring::invalidate_cache();
        assert_eq!(account::stored_token(), None);
        keyring::testing::set_stored_token(Some("tool-token"));

        let config = Config {
            login_remedy: Some(vec!["true".to_string()]),
            ..Config::default()
        };
        let mut gate = Gatekeeper::new(
            Box::new(FakeNetwork {
                online: true,
                online_after_remedy: true,
                remedies: Arc::new(AtomicU32::new(0)),
            }),
            Box::new(KeyringSession::new(config, false)),
        );
        let result = gate.check();
        let token = gate.account().token();

        keyring::testing::set_stored_token(None);
        keyring::invalidate_cache();
        if let Some(val) = saved_env {
            std::env::set_var(account::TOKEN_ENV, val);
        }

        assert_eq!(result, Ok(()));
        assert_eq!(token.as_deref(), Some("tool-token"));
    }
}
