use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{Command, ExitStatus, Stdio},
};

/// Captured result of one external program run.
#[derive(Clone, Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// One-line description of a failed run, for error messages.
    pub fn failure_summary(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exited with {}", self.status)
        } else {
            format!("exited with {}: {stderr}", self.status)
        }
    }
}

/// Runs `program` to completion and captures stdout/stderr.
///
/// Stdin is inherited so prompts from the external tool reach the user. Output is returned
/// verbatim; whether a non-zero exit is fatal is up to the caller. Spawn and wait errors are
/// returned unmodified.
pub fn run_command(
    program: impl AsRef<OsStr>,
    args: &[OsString],
    working_dir: Option<&Path>,
) -> std::io::Result<CommandOutput> {
    let program = program.as_ref();
    tracing::debug!(
        cwd = ?working_dir,
        "running {}",
        command_line(program, args)
    );

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = working_dir {
        cmd.current_dir(dir);
    }

    let out = cmd.output()?;
    Ok(CommandOutput {
        status: out.status,
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
    })
}

/// Shell-ish rendering of a command line for logs.
pub fn command_line(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| {
            let s = a.to_string_lossy();
            if s.is_empty() || s.contains(char::is_whitespace) {
                format!("'{s}'")
            } else {
                s.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
