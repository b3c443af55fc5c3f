//! Run the Python ray-tracing application with a system interpreter.
//!
//! The interpreter is looked up on `PATH` and must answer `--version`
//! before the script is started. The script inherits standard streams
//! and its exit status becomes ours.

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

/// Script run when none is given.
pub const DEFAULT_SCRIPT: &str = "source/RayTracing.py";

/// Extensions tried on Windows when `PATHEXT` is unset.
const DEFAULT_PATHEXT: &str = ".COM;.EXE;.BAT;.CMD";

/// Errors that can occur before the script gets to run.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("no working Python interpreter found on PATH (tried: {})", .0.join(", "))]
    InterpreterNotFound(Vec<String>),

    #[error("script not found: {}", .0.display())]
    ScriptMissing(PathBuf),

    #[error("failed to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        source: io::Error,
    },
}

pub type LaunchResult<T> = Result<T, LaunchError>;

/// Interpreter names probed by default on this platform.
pub fn default_interpreters() -> Vec<String> {
    if cfg!(windows) {
        vec!["python".to_string()]
    } else {
        vec!["python3".to_string()]
    }
}

/// Launch settings.
#[derive(Debug, Clone)]
pub struct Launcher {
    /// Interpreter names, tried in order
    pub interpreters: Vec<String>,
    pub script: PathBuf,
    /// Wait for Enter after the run
    pub pause: bool,
    /// Search path override; `PATH` from the environment when unset
    pub search_path: Option<OsString>,
}

impl Launcher {
    fn search_path(&self) -> OsString {
        self.search_path
            .clone()
            .or_else(|| env::var_os("PATH"))
            .unwrap_or_default()
    }

    /// Find the first candidate that exists on the search path and runs.
    pub fn resolve_interpreter(&self) -> LaunchResult<PathBuf> {
        let search_path = self.search_path();

        for name in &self.interpreters {
            let Some(path) = find_on_path(name, &search_path) else {
                log::debug!("'{name}' not found on PATH");
                continue;
            };
            if probe(&path) {
                log::debug!("Using interpreter {}", path.display());
                return Ok(path);
            }
            log::warn!("{} did not answer --version, skipping", path.display());
        }

        Err(LaunchError::InterpreterNotFound(self.interpreters.clone()))
    }

    /// Run the script with `args` and return its exit code.
    ///
    /// A child terminated by a signal reports 1.
    pub fn run(&self, args: &[OsString]) -> LaunchResult<i32> {
        let interpreter = self.resolve_interpreter()?;
        if !self.script.is_file() {
            return Err(LaunchError::ScriptMissing(self.script.clone()));
        }

        log::info!(
            "Running {} {}",
            interpreter.display(),
            self.script.display()
        );
        let status = Command::new(&interpreter)
            .arg(&self.script)
            .args(args)
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: interpreter.clone(),
                source,
            })?;

        Ok(exit_code(status))
    }

    /// Run, report any failure, pause if asked, and return the process exit code.
    pub fn launch(&self, args: &[OsString]) -> i32 {
        let code = match self.run(args) {
            Ok(code) => code,
            Err(err) => {
                report(&err, &mut io::stderr().lock());
                1
            }
        };

        if self.pause {
            wait_for_enter();
        }
        code
    }
}

/// Print a launch failure for the user, whatever the log filter.
fn report<W: Write>(err: &LaunchError, out: &mut W) {
    log::debug!("Launch failed: {err:?}");
    let _ = writeln!(out, "lumen launch: {err}");
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// True when `path` starts and exits successfully with `--version`.
fn probe(path: &Path) -> bool {
    Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Locate `program` in the directories of `search_path`.
///
/// Names containing a path separator are checked as given. On Windows
/// each `PATHEXT` extension is tried for names without one.
pub fn find_on_path(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return is_executable(as_path).then(|| as_path.to_path_buf());
    }

    let names = candidate_names(program);
    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| is_executable(candidate))
}

fn candidate_names(program: &str) -> Vec<String> {
    if !cfg!(windows) || Path::new(program).extension().is_some() {
        return vec![program.to_string()];
    }

    let pathext = env::var("PATHEXT").unwrap_or_else(|_| DEFAULT_PATHEXT.to_string());
    pathext
        .split(';')
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!("{program}{}", ext.to_ascii_lowercase()))
        .collect()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

fn wait_for_enter() {
    print!("Press Enter to continue . . . ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;

    // Writing an executable while another test forks can fail with ETXTBSY
    static SERIAL: Mutex<()> = Mutex::new(());

    fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Interpreter that answers --version and otherwise records its
    /// arguments in `args.txt` and exits with `code`.
    fn fake_python(dir: &Path, name: &str, code: i32) -> PathBuf {
        let log = dir.join("args.txt");
        write_executable(
            dir,
            name,
            &format!(
                "if [ \"$1\" = \"--version\" ]; then echo 'Python 3.12.0'; exit 0; fi\n\
                 printf '%s\\n' \"$@\" > '{}'\n\
                 exit {code}",
                log.display()
            ),
        )
    }

    fn launcher(dir: &Path, interpreters: &[&str], script: PathBuf) -> Launcher {
        Launcher {
            interpreters: interpreters.iter().map(|s| s.to_string()).collect(),
            script,
            pause: false,
            search_path: Some(dir.as_os_str().to_owned()),
        }
    }

    #[test]
    fn test_find_on_path() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let exe = write_executable(dir.path(), "python3", "exit 0");
        fs::write(dir.path().join("python"), "not executable").unwrap();

        let search = env::join_paths([Path::new("/nonexistent"), dir.path()]).unwrap();
        assert_eq!(find_on_path("python3", &search), Some(exe.clone()));
        assert_eq!(find_on_path("python", &search), None);
        assert_eq!(find_on_path(exe.to_str().unwrap(), OsStr::new("")), Some(exe));
    }

    #[test]
    fn test_missing_interpreter() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let launcher = launcher(dir.path(), &["python3"], dir.path().join("app.py"));

        let err = launcher.run(&[]).unwrap_err();
        assert!(matches!(err, LaunchError::InterpreterNotFound(ref names) if names == &["python3"]));
        assert_eq!(launcher.launch(&[]), 1);
    }

    #[test]
    fn test_report_names_tried_interpreters() {
        let mut out = Vec::new();
        let err = LaunchError::InterpreterNotFound(vec!["python3".to_string(), "python".to_string()]);
        report(&err, &mut out);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "lumen launch: no working Python interpreter found on PATH (tried: python3, python)\n"
        );
    }

    #[test]
    fn test_probe_failure_falls_back() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        write_executable(dir.path(), "python3", "exit 1");
        let good = fake_python(dir.path(), "python", 0);

        let launcher = launcher(dir.path(), &["python3", "python"], dir.path().join("app.py"));
        assert_eq!(launcher.resolve_interpreter().unwrap(), good);
    }

    #[test]
    fn test_missing_script() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fake_python(dir.path(), "python3", 0);
        let script = dir.path().join("source").join("RayTracing.py");

        let launcher = launcher(dir.path(), &["python3"], script.clone());
        let err = launcher.run(&[]).unwrap_err();
        assert!(matches!(err, LaunchError::ScriptMissing(ref p) if p == &script));
    }

    #[test]
    fn test_forwards_arguments_and_exit_code() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fake_python(dir.path(), "python3", 7);
        let script = dir.path().join("RayTracing.py");
        fs::write(&script, "print('hello')\n").unwrap();

        let launcher = launcher(dir.path(), &["python3"], script.clone());
        let args = [OsString::from("--scene"), OsString::from("two words")];
        assert_eq!(launcher.run(&args).unwrap(), 7);

        let recorded = fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert_eq!(
            recorded,
            format!("{}\n--scene\ntwo words\n", script.display())
        );
    }

    #[test]
    fn test_signal_maps_to_one() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        write_executable(
            dir.path(),
            "python3",
            "if [ \"$1\" = \"--version\" ]; then exit 0; fi\nkill -9 $$",
        );
        let script = dir.path().join("app.py");
        fs::write(&script, "").unwrap();

        let launcher = launcher(dir.path(), &["python3"], script);
        assert_eq!(launcher.run(&[]).unwrap(), 1);
    }
}
