//! Repository detection from remote URLs

use crate::error::{Error, Result};
use crate::types::RepoInfo;
use url::Url;

/// Parse owner/repo/host out of a remote URL
///
/// Handles both `https://host/owner/repo(.git)` and scp-like
/// `git@host:owner/repo(.git)` forms. Hosts other than `github.com` are
/// kept as custom hosts (GitHub Enterprise).
pub fn parse_repo_info(remote_url: &str) -> Result<RepoInfo> {
    let (host, path) = if let Some(rest) = remote_url.strip_prefix("git@") {
        let (host, path) = rest
            .split_once(':')
            .ok_or_else(|| Error::Config(format!("unrecognized remote URL: {remote_url}")))?;
        (host.to_string(), path.to_string())
    } else {
        let parsed = Url::parse(remote_url)
            .map_err(|e| Error::Config(format!("unrecognized remote URL {remote_url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Config(format!("remote URL has no host: {remote_url}")))?
            .to_string();
        (host, parsed.path().trim_start_matches('/').to_string())
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    let mut segments = path.split('/');
    let (Some(owner), Some(repo), None) = (segments.next(), segments.next(), segments.next())
    else {
        return Err(Error::Config(format!(
            "expected owner/repo in remote URL: {remote_url}"
        )));
    };
    if owner.is_empty() || repo.is_empty() {
        return Err(Error::Config(format!(
            "expected owner/repo in remote URL: {remote_url}"
        )));
    }

    Ok(RepoInfo {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != "github.com").then_some(host),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_url() {
        let info = parse_repo_info("https://github.com/nodejs/node.git").unwrap();
        assert_eq!(info.owner, "nodejs");
        assert_eq!(info.repo, "node");
        assert_eq!(info.host, None);
    }

    #[test]
    fn parses_ssh_url() {
        let info = parse_repo_info("git@github.com:nodejs/node.git").unwrap();
        assert_eq!(info.owner, "nodejs");
        assert_eq!(info.repo, "node");
        assert_eq!(info.host, None);
    }

    #[test]
    fn keeps_enterprise_host() {
        let info = parse_repo_info("https://github.corp.example.com/team/service").unwrap();
        assert_eq!(info.host.as_deref(), Some("github.corp.example.com"));
    }

    #[test]
    fn rejects_pathless_url() {
        assert!(parse_repo_info("https://github.com/").is_err());
        assert!(parse_repo_info("nonsense").is_err());
    }
}
