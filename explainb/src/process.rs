//! Timeout-bounded process capture. stdout/stderr are drained on separate
//! threads so a chatty child can never deadlock against a full pipe while
//! we wait on it.

use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Completed(CapturedOutput),
    TimedOut { timeout: Duration },
}

fn spawn_capture_thread(
    reader: Option<impl std::io::Read + Send + 'static>,
) -> Option<JoinHandle<Result<Vec<u8>, std::io::Error>>> {
    reader.map(|mut r| {
        std::thread::spawn(move || {
            let mut buf: Vec<u8> = vec![];
            r.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_capture_thread(
    handle: Option<JoinHandle<Result<Vec<u8>, std::io::Error>>>,
) -> Result<Vec<u8>, std::io::Error> {
    let Some(handle) = handle else {
        return Ok(vec![]);
    };
    handle
        .join()
        .map_err(|_| std::io::Error::other("capture thread panicked"))?
}

/// Run `command`, capturing both output streams, killing the child if it
/// outlives `timeout`.
pub fn run_capture_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> Result<CaptureOutcome, std::io::Error> {
    command.stdout(Stdio::piped()).stderr(Stdio::piped());
    let started = Instant::now();
    let mut child = command.spawn()?;

    let stdout_thread = spawn_capture_thread(child.stdout.take());
    let stderr_thread = spawn_capture_thread(child.stderr.take());

    let Some(status) = child.wait_timeout(timeout)? else {
        let _ = child.kill();
        let _ = child.wait();
        let _ = join_capture_thread(stdout_thread);
        let _ = join_capture_thread(stderr_thread);
        return Ok(CaptureOutcome::TimedOut { timeout });
    };

    let stdout = join_capture_thread(stdout_thread)?;
    let stderr = join_capture_thread(stderr_thread)?;
    Ok(CaptureOutcome::Completed(CapturedOutput {
        status,
        stdout,
        stderr,
        elapsed: started.elapsed(),
    }))
}

/// Lossy decode with ANSI escapes stripped; database CLIs colorize when
/// they think they have a terminal.
pub fn decode_output(bytes: &[u8]) -> String {
    let stripped = strip_ansi_escapes::strip(bytes);
    String::from_utf8_lossy(&stripped).into_owned()
}
