use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{CredentialKind, TestEvent};

/// How to invoke the backend test entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendCommand {
    pub program: OsString,
    /// Interpreter arguments placed before the script path.
    pub args: Vec<OsString>,
    pub script: PathBuf,
}

impl BackendCommand {
    /// Split an interpreter command line (`"py -3"`) and pair it with a script.
    pub fn from_interpreter(interpreter: &str, script: impl Into<PathBuf>) -> io::Result<Self> {
        let mut words = shell_words::split(interpreter)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?
            .into_iter();
        let program = words.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "interpreter command is empty")
        })?;
        Ok(Self {
            program: program.into(),
            args: words.map(OsString::from).collect(),
            script: script.into(),
        })
    }

    /// Full argv for one test kind, program first.
    #[must_use]
    pub fn argv(&self, kind: CredentialKind) -> Vec<OsString> {
        let mut argv = Vec::with_capacity(self.args.len() + 3);
        argv.push(self.program.clone());
        argv.extend(self.args.iter().cloned());
        argv.push(self.script.clone().into_os_string());
        argv.push(kind.selector().to_string().into());
        argv
    }
}

/// A started backend: its pid and the ordered event stream that ends in
/// `Closed` or `Error`.
pub struct LaunchedTest {
    pub pid: u32,
    pub events: Receiver<TestEvent>,
}

/// Seam between the tester and the OS so tests can script backend behavior.
pub trait BackendLauncher: Send {
    fn launch(&self, kind: CredentialKind) -> io::Result<LaunchedTest>;
}

/// Spawns the real backend process.
pub struct ProcessLauncher {
    command: BackendCommand,
}

impl ProcessLauncher {
    #[must_use]
    pub fn new(command: BackendCommand) -> Self {
        Self { command }
    }
}

impl BackendLauncher for ProcessLauncher {
    fn launch(&self, kind: CredentialKind) -> io::Result<LaunchedTest> {
        let argv = self.command.argv(kind);
        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group so the tree kill reaches interpreter children.
            command.process_group(0);
        }

        let mut child = command.spawn()?;
        let pid = child.id();
        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(io::Error::other("failed to capture backend output"));
            }
        };
        tracing::info!(kind = %kind, pid, argv = ?argv, "backend test started");

        let (tx, rx) = unbounded();
        let _ = tx.send(TestEvent::Spawned { pid });
        thread::Builder::new()
            .name(format!("{}-test", kind.label().to_ascii_lowercase()))
            .spawn(move || supervise_child(child, stdout, stderr, tx))?;

        Ok(LaunchedTest { pid, events: rx })
    }
}

/// Read one line and decode it lossily, so stray non-UTF-8 bytes from the
/// interpreter (e.g. a cp1252 console) never end the stream. `Ok(None)` at EOF.
fn read_lossy_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn spawn_line_reader<R, F>(source: R, tx: Sender<TestEvent>, wrap: F) -> thread::JoinHandle<()>
where
    R: Read + Send + 'static,
    F: Fn(String) -> TestEvent + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        while let Ok(Some(line)) = read_lossy_line(&mut reader, &mut buf) {
            if tx.send(wrap(line)).is_err() {
                break;
            }
        }
    })
}

/// Forward stdout, then stderr's tail, then exactly one terminal event.
fn supervise_child(
    mut child: Child,
    stdout: ChildStdout,
    stderr: ChildStderr,
    tx: Sender<TestEvent>,
) {
    let stderr_reader = spawn_line_reader(stderr, tx.clone(), TestEvent::Stderr);

    let mut read_error = None;
    let mut receiver_gone = false;
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        match read_lossy_line(&mut reader, &mut buf) {
            Ok(Some(line)) => {
                if tx.send(TestEvent::Stdout(line)).is_err() {
                    receiver_gone = true;
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                read_error = Some(err);
                break;
            }
        }
    }

    if receiver_gone {
        tracing::debug!(pid = child.id(), "test receiver dropped; killing backend");
        let _ = child.kill();
        let _ = child.wait();
        return;
    }

    if let Some(err) = read_error {
        let _ = tx.send(TestEvent::Error(format!("failed to read backend output: {err}")));
        // The tester kills the tree on Error; reap whatever is left.
        let _ = child.wait();
        return;
    }

    if stderr_reader.join().is_err() {
        tracing::warn!("backend stderr reader panicked");
    }

    let terminal = match child.wait() {
        Ok(status) => TestEvent::Closed {
            code: status.code(),
        },
        Err(err) => TestEvent::Error(format!("failed to wait for backend: {err}")),
    };
    let _ = tx.send(terminal);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpreter_words_precede_script_and_selector() {
        let command = BackendCommand::from_interpreter("py -3", "backend/test.py").expect("split");
        assert_eq!(
            command.argv(CredentialKind::Discord),
            vec![
                OsString::from("py"),
                OsString::from("-3"),
                OsString::from("backend/test.py"),
                OsString::from("10"),
            ]
        );
    }

    #[test]
    fn quoted_interpreter_paths_stay_whole() {
        let command = BackendCommand::from_interpreter(
            "\"C:/Program Files/Python/python.exe\"",
            "backend/test.py",
        )
        .expect("split");
        assert_eq!(command.program, OsString::from("C:/Program Files/Python/python.exe"));
        assert!(command.args.is_empty());
    }

    #[test]
    fn empty_interpreter_is_rejected() {
        let err = BackendCommand::from_interpreter("   ", "backend/test.py").expect_err("empty");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[cfg(unix)]
    #[test]
    fn process_launcher_streams_lines_then_close() {
        let command = BackendCommand {
            program: "sh".into(),
            args: vec!["-c".into(), "echo start; echo oops >&2; echo \"$1\"; exit 3".into()],
            script: PathBuf::from("backend"),
        };
        let launched = ProcessLauncher::new(command)
            .launch(CredentialKind::Twitter)
            .expect("launch sh");

        let events: Vec<TestEvent> = launched.events.iter().collect();
        assert_eq!(events.first(), Some(&TestEvent::Spawned { pid: launched.pid }));
        assert!(events.contains(&TestEvent::Stdout("start".into())));
        assert!(events.contains(&TestEvent::Stdout("9".into())));
        assert!(events.contains(&TestEvent::Stderr("oops".into())));
        assert_eq!(events.last(), Some(&TestEvent::Closed { code: Some(3) }));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_output_is_decoded_lossily() {
        let command = BackendCommand {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                "printf 'caf\\351\\r\\n'; printf 'bad\\377\\n' >&2; echo 'Test successfully completed.'"
                    .into(),
            ],
            script: PathBuf::from("backend"),
        };
        let launched = ProcessLauncher::new(command)
            .launch(CredentialKind::Twitter)
            .expect("launch sh");

        let events: Vec<TestEvent> = launched.events.iter().collect();
        assert!(events.contains(&TestEvent::Stdout("caf\u{FFFD}".into())));
        assert!(events.contains(&TestEvent::Stderr("bad\u{FFFD}".into())));
        assert!(events.contains(&TestEvent::Stdout("Test successfully completed.".into())));
        assert!(!events.iter().any(|event| matches!(event, TestEvent::Error(_))));
        assert_eq!(events.last(), Some(&TestEvent::Closed { code: Some(0) }));
    }

    #[test]
    fn lossy_reader_strips_crlf_and_keeps_final_partial_line() {
        let mut reader = io::Cursor::new(b"one\r\ntwo\n\xffthree".to_vec());
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        while let Some(line) = read_lossy_line(&mut reader, &mut buf).expect("read") {
            lines.push(line);
        }
        assert_eq!(lines, vec!["one", "two", "\u{FFFD}three"]);
    }

    #[test]
    fn missing_interpreter_fails_to_launch() {
        let command = BackendCommand {
            program: "gbf-settings-no-such-interpreter".into(),
            args: Vec::new(),
            script: PathBuf::from("backend/test.py"),
        };
        assert!(ProcessLauncher::new(command)
            .launch(CredentialKind::Twitter)
            .is_err());
    }
}
