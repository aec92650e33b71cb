/// Hosting platform detection and branch URL construction. Thin
/// formatting layer; the session only consults it for the open-in-browser
/// action.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Auto,
    GitHub,
    GitLab,
    Bitbucket,
}

impl Platform {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Platform::Auto),
            "github" => Some(Platform::GitHub),
            "gitlab" => Some(Platform::GitLab),
            "bitbucket" => Some(Platform::Bitbucket),
            _ => None,
        }
    }

    fn sniff(host: &str) -> Option<Self> {
        if host.contains("github") {
            Some(Platform::GitHub)
        } else if host.contains("gitlab") {
            Some(Platform::GitLab)
        } else if host.contains("bitbucket") {
            Some(Platform::Bitbucket)
        } else {
            None
        }
    }
}

/// "git@host:owner/repo.git" or "https://host/owner/repo.git"
/// -> (host, "owner/repo").
fn split_remote_url(url: &str) -> Option<(String, String)> {
    let url = url.trim().trim_end_matches(".git");

    if let Some(rest) = url.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        return Some((host.to_string(), path.trim_matches('/').to_string()));
    }

    for scheme in ["https://", "http://", "ssh://git@", "ssh://"] {
        if let Some(rest) = url.strip_prefix(scheme) {
            let (host, path) = rest.split_once('/')?;
            return Some((host.to_string(), path.trim_matches('/').to_string()));
        }
    }
    None
}

/// Web page for a branch on the configured (or sniffed) platform.
pub fn branch_url(platform: Platform, remote_url: &str, branch: &str) -> Option<String> {
    let (host, repo) = split_remote_url(remote_url)?;
    let platform = match platform {
        Platform::Auto => Platform::sniff(&host)?,
        p => p,
    };

    let url = match platform {
        Platform::GitHub => format!("https://{}/{}/tree/{}", host, repo, branch),
        Platform::GitLab => format!("https://{}/{}/-/tree/{}", host, repo, branch),
        Platform::Bitbucket => format!("https://{}/{}/branch/{}", host, repo, branch),
        Platform::Auto => unreachable!(),
    };
    Some(url)
}

/// Fire-and-forget browser launch.
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(all(unix, not(target_os = "macos")))]
    let opener = "xdg-open";
    #[cfg(windows)]
    let opener = "explorer";

    std::process::Command::new(opener)
        .arg(url)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_github_url_from_ssh_remote() {
        let url = branch_url(
            Platform::Auto,
            "git@github.com:krzmknt/twig.git",
            "feature/x",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://github.com/krzmknt/twig/tree/feature/x")
        );
    }

    #[test]
    fn builds_gitlab_url_from_https_remote() {
        let url = branch_url(
            Platform::GitLab,
            "https://gitlab.example.com/group/proj.git",
            "main",
        );
        assert_eq!(
            url.as_deref(),
            Some("https://gitlab.example.com/group/proj/-/tree/main")
        );
    }

    #[test]
    fn auto_sniff_fails_on_unknown_host() {
        assert!(branch_url(Platform::Auto, "git@git.corp.internal:a/b.git", "x").is_none());
        // But an explicit platform still works there.
        assert!(branch_url(Platform::GitHub, "git@git.corp.internal:a/b.git", "x").is_some());
    }
}
