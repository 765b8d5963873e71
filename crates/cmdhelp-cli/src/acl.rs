//! Permissions-listing tool
//!
//! Runs an ACL application (`getfacl`, `icacls.exe`, ...) against a single
//! target path:
//!
//! ```text
//! cmdhelp --app=/usr/bin/getfacl --path=/srv --log=/tmp/acl.log --appendToLogFile
//! cmdhelp -a/usr/bin/getfacl -p/srv -l/tmp/acl.log
//! ```

use clap::{CommandFactory, Parser};
use cmdhelp_core::CommandLineTool;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Program name used when rendering help and parse errors
const PROGRAM_NAME: &str = "cmdhelp";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = PROGRAM_NAME)]
#[command(about = "List the access control entries of a path through a staged script")]
#[command(version)]
pub struct AclArgs {
    /// Application that prints permissions, e.g. /usr/bin/getfacl
    #[arg(short = 'a', long = "app", value_parser = unquote)]
    pub app: String,

    /// Path whose permissions are listed
    #[arg(short = 'p', long = "path", value_parser = unquote)]
    pub path: String,

    /// File that receives the captured output
    #[arg(short = 'l', long = "log", value_parser = unquote_path)]
    pub log: Option<PathBuf>,

    /// Append to the log file instead of replacing it
    #[arg(long = "appendToLogFile")]
    pub append_to_log_file: bool,
}

/// Strip one pair of surrounding double quotes
fn unquote(value: &str) -> Result<String, String> {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Ok(value.to_string())
}

fn unquote_path(value: &str) -> Result<PathBuf, String> {
    unquote(value).map(PathBuf::from)
}

/// [`CommandLineTool`] wrapping [`AclArgs`]
#[derive(Debug, Default)]
pub struct AclTool {
    args: Option<AclArgs>,
}

impl AclTool {
    /// Parsed arguments, if the last parse succeeded
    pub fn args(&self) -> Option<&AclArgs> {
        self.args.as_ref()
    }
}

impl CommandLineTool for AclTool {
    fn name(&self) -> &str {
        "acl"
    }

    fn parse_arguments(&mut self, args: &[String]) -> bool {
        let argv = std::iter::once(PROGRAM_NAME.to_string()).chain(args.iter().cloned());
        match AclArgs::try_parse_from(argv) {
            Ok(parsed) => {
                self.args = Some(parsed);
                true
            }
            Err(e) => {
                debug!(error = %e, "argument parsing failed");
                self.args = None;
                false
            }
        }
    }

    fn commands(&self) -> Option<String> {
        self.args.as_ref().map(command_line)
    }

    fn log_file_path(&self) -> Option<&Path> {
        self.args.as_ref().and_then(|a| a.log.as_deref())
    }

    fn append_to_log_file(&self) -> bool {
        self.args.as_ref().is_some_and(|a| a.append_to_log_file)
    }

    fn usage(&self) -> String {
        AclArgs::command().render_help().to_string()
    }
}

#[cfg(unix)]
fn command_line(args: &AclArgs) -> String {
    format!("{}\n", shell_words::join([&args.app, &args.path]))
}

#[cfg(not(unix))]
fn command_line(args: &AclArgs) -> String {
    format!("\"{}\" \"{}\"\r\n", args.app, args.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(values: &[&str]) -> (AclTool, bool) {
        let mut tool = AclTool::default();
        let args: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let parsed = tool.parse_arguments(&args);
        (tool, parsed)
    }

    #[test]
    fn test_usage_is_not_empty() {
        let usage = AclTool::default().usage();
        assert!(usage.contains("--app"));
        assert!(usage.contains("--appendToLogFile"));
    }

    #[test]
    fn test_parse_long_arguments() {
        let (tool, parsed) = parse(&[
            "--app=\"C:\\windows\\system32\\icacls.exe\"",
            "--path=C:\\",
            "--log=\"C:\\temp\\out.log\"",
            "--appendToLogFile",
        ]);

        assert!(parsed);
        let args = tool.args().unwrap();
        assert_eq!(args.app, "C:\\windows\\system32\\icacls.exe");
        assert_eq!(args.path, "C:\\");
        assert_eq!(tool.log_file_path(), Some(Path::new("C:\\temp\\out.log")));
        assert!(tool.append_to_log_file());
    }

    #[test]
    fn test_parse_short_arguments() {
        let (tool, parsed) = parse(&["-a\"/usr/bin/getfacl\"", "-p/srv", "-l\"/tmp/out.log\""]);

        assert!(parsed);
        let args = tool.args().unwrap();
        assert_eq!(args.app, "/usr/bin/getfacl");
        assert_eq!(args.path, "/srv");
        assert_eq!(tool.log_file_path(), Some(Path::new("/tmp/out.log")));
        assert!(!tool.append_to_log_file());
    }

    #[test]
    fn test_values_with_separators_survive() {
        let (tool, parsed) = parse(&[
            "--app=\"C:\\win dows\\syst-em32\\ica=cls.exe\"",
            "--path=C:\\e=mc2--done.txt",
        ]);

        assert!(parsed);
        let args = tool.args().unwrap();
        assert_eq!(args.app, "C:\\win dows\\syst-em32\\ica=cls.exe");
        assert_eq!(args.path, "C:\\e=mc2--done.txt");
        assert!(tool.log_file_path().is_none());
    }

    #[test]
    fn test_missing_path_fails() {
        let (tool, parsed) = parse(&["--app=/usr/bin/getfacl"]);
        assert!(!parsed);
        assert!(tool.commands().is_none());
    }

    #[test]
    fn test_failed_parse_clears_previous_arguments() {
        let mut tool = AclTool::default();
        assert!(tool.parse_arguments(&["-agetfacl".to_string(), "-p/".to_string()]));
        assert!(!tool.parse_arguments(&["--bogus".to_string()]));
        assert!(tool.args().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_are_shell_quoted() {
        let (tool, parsed) = parse(&["--app=/usr/bin/getfacl", "--path=/srv/shared data"]);
        assert!(parsed);
        assert_eq!(
            tool.commands().as_deref(),
            Some("/usr/bin/getfacl '/srv/shared data'\n")
        );
    }

    #[test]
    fn test_unquote_only_strips_matching_pair() {
        assert_eq!(unquote("\"abc\"").unwrap(), "abc");
        assert_eq!(unquote("\"abc").unwrap(), "\"abc");
        assert_eq!(unquote("abc").unwrap(), "abc");
    }
}
