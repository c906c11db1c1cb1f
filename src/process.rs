//! Running external document tools.

use std::ffi::OsStr;
use std::process::Command;

/// Run `program` with `args` and wait for it to finish.
///
/// On failure the error message names the program and carries its stderr,
/// ready to be wrapped in the caller's error variant.
pub(crate) fn run_tool<I, S>(program: &str, args: I) -> Result<(), String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    log::debug!("Running {}", program);

    let output = Command::new(program).args(args).output().map_err(|e| {
        format!(
            "failed to run '{}'. Is it installed and on PATH? Error: {}",
            program, e
        )
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "'{}' exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        ));
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program() {
        let err = run_tool("docfill-no-such-tool", ["--version"]).unwrap_err();
        assert!(err.contains("docfill-no-such-tool"));
        assert!(err.contains("Is it installed"));
    }

    #[test]
    fn test_failing_program() {
        let err = run_tool("sh", ["-c", "echo broken template >&2; exit 3"]).unwrap_err();
        assert!(err.contains("broken template"));
    }

    #[test]
    fn test_successful_program() {
        assert!(run_tool("sh", ["-c", "exit 0"]).is_ok());
    }
}
