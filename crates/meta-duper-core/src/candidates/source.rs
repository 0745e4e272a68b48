use crate::error::Error;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Where the raw list of names comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateSource {
    /// Entries of a single directory (not recursive).
    Directory(PathBuf),
    /// An external program printing one name per line, e.g. `ls` on a share.
    Command { program: String, args: Vec<String> },
    /// Newline separated names on standard input.
    Stdin,
}

impl CandidateSource {
    /// List raw names. Any failure here is fatal for the run.
    pub fn list_names(&self) -> Result<Vec<String>, Error> {
        self.list_names_from(io::stdin().lock())
    }

    /// Like [`list_names`](Self::list_names), with `stdin` standing in for
    /// standard input.
    pub fn list_names_from<R: BufRead>(&self, stdin: R) -> Result<Vec<String>, Error> {
        let names = match self {
            CandidateSource::Directory(dir) => list_directory(dir)?,
            CandidateSource::Command { program, args } => list_from_command(program, args)?,
            CandidateSource::Stdin => list_from_reader(stdin)?,
        };
        info!("Listed {} names from {}", names.len(), self);
        Ok(names)
    }
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateSource::Directory(dir) => write!(f, "directory {}", dir.display()),
            CandidateSource::Command { program, args } => {
                write!(f, "command `{}", program)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, "`")
            }
            CandidateSource::Stdin => write!(f, "stdin"),
        }
    }
}

/// File names directly inside `dir`. Subdirectories are not listed.
pub fn list_directory(dir: &Path) -> Result<Vec<String>, Error> {
    let entries = fs::read_dir(dir).map_err(|err| {
        Error::CandidateSource(format!("Error reading directory {}: {}", dir.display(), err))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Error::CandidateSource(format!(
                "Error reading entry in directory {}: {}",
                dir.display(),
                err
            ))
        })?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Run `program` to completion and read its stdout as a name list.
/// Anything written to stderr, or a non-zero exit, aborts the run.
pub fn list_from_command(program: &str, args: &[String]) -> Result<Vec<String>, Error> {
    debug!("Running listing command {} {:?}", program, args);
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| Error::CandidateSource(format!("Could not run {}: {}", program, err)))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return Err(Error::CandidateSource(format!(
            "{} reported errors: {}",
            program,
            stderr.trim()
        )));
    }
    if !output.status.success() {
        return Err(Error::CandidateSource(format!(
            "{} exited with {}",
            program, output.status
        )));
    }

    list_from_reader(output.stdout.as_slice())
}

pub fn list_from_reader<R: BufRead>(reader: R) -> Result<Vec<String>, Error> {
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let name = line.trim_end_matches(['\r', '\n']);
        if !name.trim().is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_directory_skips_subdirectories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ts.meta"), "x").unwrap();
        fs::write(dir.path().join("a.ts"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.ts.meta")).unwrap();

        let mut names = list_directory(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["a.ts".to_string(), "a.ts.meta".to_string()]);
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert!(matches!(
            CandidateSource::Directory(missing).list_names(),
            Err(Error::CandidateSource(_))
        ));
    }

    #[test]
    fn test_reader_ignores_blank_lines() {
        let input = "one.ts.meta\r\n\n  \ntwo.ts.meta\n";
        let names = list_from_reader(input.as_bytes()).unwrap();
        assert_eq!(names, vec!["one.ts.meta".to_string(), "two.ts.meta".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_is_listed() {
        let names = list_from_command("sh", &["-c".to_string(), "printf 'b\\na\\n'".to_string()])
            .unwrap();
        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_stderr_is_fatal() {
        let result = list_from_command(
            "sh",
            &["-c".to_string(), "echo a; echo 'host down' >&2".to_string()],
        );
        assert!(matches!(result, Err(Error::CandidateSource(_))));
    }

    #[test]
    fn test_stdin_source_reads_given_input() {
        let names = CandidateSource::Stdin
            .list_names_from("b.ts.meta\n\na.ts.meta\n".as_bytes())
            .unwrap();
        assert_eq!(names, vec!["b.ts.meta".to_string(), "a.ts.meta".to_string()]);
    }

    #[test]
    fn test_directory_source_ignores_stdin() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ts.meta"), "x").unwrap();
        let names = CandidateSource::Directory(dir.path().to_path_buf())
            .list_names_from("other.ts.meta\n".as_bytes())
            .unwrap();
        assert_eq!(names, vec!["a.ts.meta".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_without_stderr_is_fatal() {
        let result = list_from_command("sh", &["-c".to_string(), "exit 3".to_string()]);
        match result {
            Err(Error::CandidateSource(msg)) => assert!(msg.contains("exited with")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
