//! Git repository metadata, collected by running `git`.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use thiserror::Error;
use url::Url;

pub const REPO_COMMIT: &str = "REPO_COMMIT";
pub const REPO_TAG: &str = "REPO_TAG";
pub const REPO_TAG_CLEAN: &str = "REPO_TAG_CLEAN";
pub const REPO_URL: &str = "REPO_URL";
pub const REPO_HOST: &str = "REPO_HOST";
pub const REPO_NAME: &str = "REPO_NAME";
pub const REPO_ROOT: &str = "REPO_ROOT";

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),
    #[error("`git {args}` failed: {stderr}")]
    CommandFailed { args: String, stderr: String },
    #[error("git output was not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("`git {args}` printed nothing")]
    Empty { args: String },
}

/// Runs `git` in `dir` and returns its trimmed stdout.
fn git(dir: &Path, args: &[&str]) -> Result<String, VcsError> {
    let output = Command::new("git").arg("-C").arg(dir).args(args).output()?;
    if !output.status.success() {
        return Err(VcsError::CommandFailed {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    let stdout = String::from_utf8(output.stdout)?.trim().to_string();
    if stdout.is_empty() {
        return Err(VcsError::Empty {
            args: args.join(" "),
        });
    }
    Ok(stdout)
}

/// Adds the metadata of the repository containing `dir` to `meta`.
///
/// Nothing here is fatal: keys whose value cannot be determined are left
/// out and the reason is logged.
pub fn repo_metadata(dir: &Path, meta: &mut BTreeMap<String, String>) {
    match git(dir, &["rev-parse", "HEAD"]) {
        Ok(commit) => {
            meta.insert(REPO_COMMIT.to_string(), commit);
        }
        Err(err) => {
            tracing::debug!(error = %err, dir = %dir.display(), "no git commit");
            // not a repository (or no git): nothing else will work either
            return;
        }
    }

    // annotated tags carry the date of their commit in `*committerdate`,
    // lightweight tags in `committerdate`
    let tags = git(
        dir,
        &[
            "for-each-ref",
            "--format=%(*committerdate:unix)|%(committerdate:unix)|%(refname)",
            "refs/tags",
        ],
    );
    match tags {
        Ok(listing) => match latest_tag(&listing) {
            Some(refname) => tag_metadata(refname, meta),
            None => tracing::debug!("no tag points at a commit"),
        },
        Err(err) => tracing::debug!(error = %err, "no git tag"),
    }

    match git(dir, &["remote", "get-url", "origin"]) {
        Ok(remote) => url_metadata(&remote, meta),
        Err(err) => tracing::debug!(error = %err, "no origin remote"),
    }
}

/// Picks the tag whose commit has the newest committer date from lines of
/// `<tagged commit date>|<commit date>|<refname>`, where one of the two dates
/// is empty. On equal dates the first listed tag wins.
pub fn latest_tag(listing: &str) -> Option<&str> {
    let mut latest: Option<(i64, &str)> = None;
    for line in listing.lines() {
        let mut fields = line.splitn(3, '|');
        let (Some(tagged), Some(direct), Some(refname)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let date = if tagged.is_empty() { direct } else { tagged };
        let Ok(date) = date.parse::<i64>() else {
            continue;
        };
        if latest.map_or(true, |(newest, _)| date > newest) {
            latest = Some((date, refname.trim()));
        }
    }
    latest.map(|(_, refname)| refname)
}

/// Sets `REPO_TAG` (and `REPO_TAG_CLEAN` for `v`-prefixed tags) from a ref name.
pub fn tag_metadata(refname: &str, meta: &mut BTreeMap<String, String>) {
    let tag = refname.rsplit('/').next().unwrap_or(refname);
    meta.insert(REPO_TAG.to_string(), tag.to_string());
    if let Some(clean) = tag.strip_prefix('v') {
        meta.insert(REPO_TAG_CLEAN.to_string(), clean.to_string());
    }
}

/// Sets the `REPO_URL`, `REPO_HOST`, `REPO_ROOT` and `REPO_NAME` keys from a
/// remote URL.
pub fn url_metadata(remote: &str, meta: &mut BTreeMap<String, String>) {
    let repo_url = normalize_remote_url(remote);

    if let Ok(parsed) = Url::parse(&repo_url) {
        if let Some(host) = parsed.host_str() {
            meta.insert(REPO_HOST.to_string(), host.to_string());
        }
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        if segments.len() > 1 {
            meta.insert(REPO_ROOT.to_string(), segments[0].to_string());
        }
    }

    let name = repo_url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let name = name.strip_suffix(".git").unwrap_or(name);
    if !name.is_empty() {
        meta.insert(REPO_NAME.to_string(), name.to_string());
    }
    meta.insert(REPO_URL.to_string(), repo_url);
}

/// Turns ssh remotes into browsable `https://` URLs.
///
/// - `git@github.com:owner/repo.git` → `https://github.com/owner/repo`
/// - `ssh://git@github.com/owner/repo.git` → `https://github.com/owner/repo`
///
/// Other URLs are returned unchanged.
pub fn normalize_remote_url(remote: &str) -> String {
    let remote = remote.trim();
    if remote.contains("://") {
        return match Url::parse(remote) {
            Ok(u) if u.scheme().starts_with("ssh") || u.scheme() == "git" => {
                https_url(u.host_str().unwrap_or_default(), u.path())
            }
            _ => remote.to_string(),
        };
    }

    // scp-like syntax: [user@]host:path
    match remote.split_once(':') {
        Some((user_host, path)) if !user_host.contains('/') => {
            let host = user_host.rsplit('@').next().unwrap_or(user_host);
            https_url(host, path)
        }
        _ => remote.to_string(),
    }
}

fn https_url(host: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    format!("https://{host}/{path}")
}
