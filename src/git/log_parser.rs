use crate::error::InsightError;
use crate::types::{CommitRecord, FileChangeRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

// Header fields are separated by the ASCII unit separator (0x1f).
const LOG_FORMAT: &str = "--pretty=format:COMMIT%x1f%H%x1f%an%x1f%ae%x1f%ad%x1f%s";
const COMMIT_PREFIX: &str = "COMMIT\u{1f}";
const FIELD_SEP: char = '\u{1f}';

static NUMSTAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+|-)\t(\d+|-)\t(.+)$").unwrap());

static RENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]* => ([^}]*)\}").unwrap());

/// Runs one `git log --all --numstat` over `dir` and returns every commit
/// with its per-file line counts.
pub fn read_log(dir: &Path) -> Result<(Vec<CommitRecord>, Vec<FileChangeRecord>), InsightError> {
    let mut child = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["log", "--all", LOG_FORMAT, "--date=iso", "--numstat", "--no-color"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| InsightError::Git(format!("failed to run git: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| InsightError::Git("failed to capture git stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| InsightError::Git("failed to capture git stderr".to_string()))?;

    // Drain stderr on its own thread so a chatty git cannot block on a full pipe.
    let stderr_reader = thread::spawn(move || {
        let mut text = String::new();
        let _ = BufReader::new(stderr).read_to_string(&mut text);
        text
    });

    let parsed = parse_log(BufReader::new(stdout));

    let status = child
        .wait()
        .map_err(|e| InsightError::Git(format!("failed to wait for git: {e}")))?;
    let stderr_text = stderr_reader.join().unwrap_or_default();
    if !status.success() {
        return Err(InsightError::Git(format!(
            "git log failed in {}: {}",
            dir.display(),
            stderr_text.trim()
        )));
    }

    let (commits, changes) = parsed?;
    debug!(commits = commits.len(), file_changes = changes.len(), "read git log");
    Ok((commits, changes))
}

/// Parses `git log` output in the format [`read_log`] requests, line by line.
/// Bytes that are not valid UTF-8 (legacy-encoded names, paths) are replaced
/// with U+FFFD instead of failing the read.
pub fn parse_log<R: BufRead>(mut reader: R) -> Result<(Vec<CommitRecord>, Vec<FileChangeRecord>), InsightError> {
    let mut acc = LogAccumulator::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| InsightError::Git(format!("failed reading git output: {e}")))?;
        if n == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        acc.push_line(line.trim_end_matches(['\n', '\r']));
    }
    Ok(acc.finish())
}

#[derive(Default)]
struct LogAccumulator {
    commits: Vec<CommitRecord>,
    changes: Vec<FileChangeRecord>,
    current: Option<CommitRecord>,
}

impl LogAccumulator {
    fn push_line(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix(COMMIT_PREFIX) {
            self.flush();
            let mut parts = rest.splitn(5, FIELD_SEP);
            if let (Some(hash), Some(author), Some(email), Some(date), Some(subject)) =
                (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
            {
                self.current = Some(CommitRecord {
                    hash: hash.to_string(),
                    author: author.to_string(),
                    email: email.to_string(),
                    raw_timestamp: date.to_string(),
                    message: subject.to_string(),
                    insertions: 0,
                    deletions: 0,
                });
            }
            return;
        }

        let Some(current) = self.current.as_mut() else { return };
        let Some(caps) = NUMSTAT_RE.captures(line) else { return };
        let Some(path) = normalize_filename(&caps[3]) else { return };

        // Binary files report "-" for both counts.
        let insertions = caps[1].parse().unwrap_or(0);
        let deletions = caps[2].parse().unwrap_or(0);
        current.insertions += insertions;
        current.deletions += deletions;
        self.changes.push(FileChangeRecord {
            hash: current.hash.clone(),
            filepath: path,
            insertions,
            deletions,
        });
    }

    fn flush(&mut self) {
        if let Some(c) = self.current.take() {
            self.commits.push(c);
        }
    }

    fn finish(mut self) -> (Vec<CommitRecord>, Vec<FileChangeRecord>) {
        self.flush();
        (self.commits, self.changes)
    }
}

/// Resolves git rename notation to the new path:
///   "src/{old => new}/file.rs" → "src/new/file.rs"
///   "old.rs => new.rs"         → "new.rs"
fn normalize_filename(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.contains('{') && t.contains(" => ") {
        let resolved = RENAME_RE.replace(t, "$1").replace("//", "/");
        let resolved = resolved.trim_start_matches('/').to_string();
        return if resolved.is_empty() || resolved.contains('{') { None } else { Some(resolved) };
    }
    if let Some((_, new)) = t.rsplit_once(" => ") {
        let new = new.trim();
        return if new.is_empty() { None } else { Some(new.to_string()) };
    }
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds one header line the way `LOG_FORMAT` renders it.
    fn header(fields: [&str; 5]) -> String {
        format!("COMMIT\u{1f}{}\n", fields.join("\u{1f}"))
    }

    fn sample() -> String {
        let mut text = header(["aaa111", "Alice", "alice@example.com", "2024-03-10 02:30:00 +0800", "Fix parser | handle pipes"]);
        text.push_str("10\t2\tsrc/main.rs\n-\t-\tassets/logo.png\n\n");
        text.push_str(&header(["bbb222", "Bob", "bob@example.com", "2024-03-09 23:00:00 +0000", "Bump deps"]));
        text.push_str("1\t1\tCargo.lock\n");
        text.push_str(&header(["ccc333", "Carol", "carol@example.com", "2024-03-08 10:00:00 +0800", "Empty merge"]));
        text
    }

    fn parse_log_text(text: &str) -> (Vec<CommitRecord>, Vec<FileChangeRecord>) {
        parse_log(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_parses_commits_and_totals() {
        let (commits, changes) = parse_log_text(&sample());
        assert_eq!(commits.len(), 3);
        assert_eq!(commits[0].hash, "aaa111");
        assert_eq!(commits[0].author, "Alice");
        assert_eq!(commits[0].email, "alice@example.com");
        assert_eq!(commits[0].raw_timestamp, "2024-03-10 02:30:00 +0800");
        assert_eq!(commits[0].message, "Fix parser | handle pipes", "subject keeps its own pipes");
        assert_eq!(commits[0].insertions, 10);
        assert_eq!(commits[0].deletions, 2);
        assert_eq!(commits[2].insertions, 0, "commit with no numstat lines");
        assert_eq!(changes.len(), 3);
    }

    #[test]
    fn test_binary_counts_are_zero() {
        let (_, changes) = parse_log_text(&sample());
        let logo = changes.iter().find(|c| c.filepath == "assets/logo.png").unwrap();
        assert_eq!(logo.hash, "aaa111");
        assert_eq!((logo.insertions, logo.deletions), (0, 0));
    }

    #[test]
    fn test_numstat_before_any_commit_is_ignored() {
        let (commits, changes) = parse_log_text("3\t4\tstray.rs\n");
        assert!(commits.is_empty());
        assert!(changes.is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let text = "COMMIT\u{1f}h\u{1f}A\u{1f}a@x\u{1f}2024-01-01 10:00:00 +0800\u{1f}msg\r\n5\t0\tsrc/lib.rs\r\n";
        let (commits, changes) = parse_log_text(text);
        assert_eq!(commits[0].message, "msg", "trailing CR stripped from the subject");
        assert_eq!(commits[0].insertions, 5);
        assert_eq!(changes[0].filepath, "src/lib.rs");
    }

    #[test]
    fn test_pipe_in_author_and_email_keeps_fields_aligned() {
        let text = header(["h1", "Ann|Lee", "ann|lee@example.com", "2024-03-10 21:00:00 +0800", "msg"]);
        let (commits, _) = parse_log_text(&text);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].author, "Ann|Lee");
        assert_eq!(commits[0].email, "ann|lee@example.com");
        assert_eq!(
            commits[0].raw_timestamp, "2024-03-10 21:00:00 +0800",
            "timestamp must not pick up a shifted field"
        );
        assert_eq!(commits[0].message, "msg");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let mut bytes = b"COMMIT\x1fh1\x1fJos\xe9\x1fjose@example.com\x1f2024-03-10 21:00:00 +0800\x1fcaf\xe9\n".to_vec();
        bytes.extend_from_slice(b"3\t1\tdocs/r\xe9sum\xe9.md\n");
        let (commits, changes) = parse_log(&bytes[..]).expect("legacy-encoded bytes must not abort the read");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].author, "Jos\u{fffd}");
        assert_eq!(commits[0].message, "caf\u{fffd}");
        assert_eq!(commits[0].raw_timestamp, "2024-03-10 21:00:00 +0800");
        assert_eq!(commits[0].insertions, 3);
        assert_eq!(changes[0].filepath, "docs/r\u{fffd}sum\u{fffd}.md");
    }

    #[test]
    fn test_normalize_brace_rename() {
        assert_eq!(normalize_filename("src/{old => new}/file.rs").as_deref(), Some("src/new/file.rs"));
        assert_eq!(normalize_filename("src/{ => sub}/file.rs").as_deref(), Some("src/sub/file.rs"));
        assert_eq!(normalize_filename("src/{sub => }/file.rs").as_deref(), Some("src/file.rs"));
    }

    #[test]
    fn test_normalize_plain_rename() {
        assert_eq!(normalize_filename("old.rs => new.rs").as_deref(), Some("new.rs"));
    }

    #[test]
    fn test_normalize_plain_path() {
        assert_eq!(normalize_filename("  README.md ").as_deref(), Some("README.md"));
        assert_eq!(normalize_filename("   "), None);
    }

    #[test]
    fn test_read_log_outside_repo_is_git_error() {
        let dir = tempfile::tempdir().unwrap();
        match read_log(dir.path()) {
            Err(InsightError::Git(_)) => {}
            Ok(_) => panic!("an empty directory is not a repository"),
            Err(other) => panic!("unexpected error kind: {other}"),
        }
    }
}
