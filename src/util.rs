use std::io::{BufReader, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

pub fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }

    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }

    if max <= 3 {
        return s.chars().take(max).collect();
    }

    let truncated: String = s.chars().take(max - 3).collect();
    format!("{}...", truncated)
}

#[derive(Debug)]
pub struct CommandRunResult {
    pub status: Option<ExitStatus>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CommandRunResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.map(|s| s.success()).unwrap_or(false)
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.status.and_then(|s| s.code())
    }
}

/// Put the child in its own process group so a timeout can kill the whole
/// pipeline it starts, not just the direct child.
#[cfg(unix)]
fn isolate_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn isolate_process_group(_command: &mut Command) {}

#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    // The child leads its own group, so the group id is its pid
    if let Ok(pgid) = i32::try_from(child.id()) {
        // SAFETY: plain signal delivery to a process group we created
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
}

/// How long to keep draining pipes after a timeout kill. A descendant that
/// left the process group can keep a pipe open indefinitely.
const DRAIN_AFTER_KILL: Duration = Duration::from_millis(500);

fn spawn_reader<R: Read + Send + 'static>(source: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let mut reader = BufReader::new(source);
        let _ = reader.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

fn collect_output(rx: &Receiver<Vec<u8>>, timed_out: bool) -> Vec<u8> {
    if timed_out {
        rx.recv_timeout(DRAIN_AFTER_KILL).unwrap_or_default()
    } else {
        rx.recv().unwrap_or_default()
    }
}

pub fn run_command_with_timeout(
    command: &mut Command,
    timeout: Duration,
) -> Result<CommandRunResult, String> {
    isolate_process_group(command);
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("Failed to start command: {}", e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| "Failed to capture stdout".to_string())?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| "Failed to capture stderr".to_string())?;

    let stdout_rx = spawn_reader(stdout);
    let stderr_rx = spawn_reader(stderr);

    let start = Instant::now();
    let mut timed_out = false;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    timed_out = true;
                    kill_process_tree(&mut child);
                    match child.wait() {
                        Ok(status) => break Some(status),
                        Err(_) => break None,
                    }
                }
                thread::sleep(Duration::from_millis(20));
            }
            Err(e) => return Err(format!("Failed to wait for command: {}", e)),
        }
    };

    let stdout_bytes = collect_output(&stdout_rx, timed_out);
    let stderr_bytes = collect_output(&stderr_rx, timed_out);

    Ok(CommandRunResult {
        status,
        stdout: String::from_utf8_lossy(&stdout_bytes).to_string(),
        stderr: String::from_utf8_lossy(&stderr_bytes).to_string(),
        timed_out,
    })
}

/// Interactive variant: the child inherits the terminal, only the exit
/// status is observed.
pub fn run_interactive_with_timeout(
    command: &mut Command,
    timeout: Duration,
) -> Result<CommandRunResult, String> {
    let mut child = command
        .spawn()
        .map_err(|e| format!("Failed to start command: {}", e))?;

    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(CommandRunResult {
                    status: Some(status),
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: false,
                })
            }
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let status = child.wait().ok();
                    return Ok(CommandRunResult {
                        status,
                        stdout: String::new(),
                        stderr: String::new(),
                        timed_out: true,
                    });
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(format!("Failed to wait for command: {}", e)),
        }
    }
}

/// Build a `Command` from an argv list. Returns `None` for an empty list.
pub fn command_from_argv(argv: &[String]) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let mut command = Command::new(program);
    command.args(args);
    Some(command)
}

pub fn command_label(argv: &[String]) -> String {
    argv.join(" ").trim().to_string()
}
