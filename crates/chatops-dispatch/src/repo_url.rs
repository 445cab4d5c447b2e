//! Recognizes repository URLs the GitHub integration can enrich.

use url::Url;

const GITHUB_HOST: &str = "github.com";

/// Owner and repository name parsed from a GitHub URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepoRef {
    pub owner: String,
    pub name: String,
}

impl GithubRepoRef {
    /// Parses `https://github.com/<owner>/<repo>[.git][/]` and
    /// `git@github.com:<owner>/<repo>[.git]` shapes.
    pub fn parse_url(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let path = if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
            rest.to_string()
        } else {
            let parsed = Url::parse(trimmed).ok()?;
            if !matches!(parsed.scheme(), "https" | "http" | "ssh" | "git") {
                return None;
            }
            let host = parsed.host_str()?.to_ascii_lowercase();
            if host != GITHUB_HOST && host != "www.github.com" {
                return None;
            }
            parsed.path().to_string()
        };

        let mut segments = path
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty());
        let owner = segments.next()?.trim();
        let name = segments.next()?.trim();
        if segments.next().is_some() {
            return None;
        }
        let name = name.strip_suffix(".git").unwrap_or(name);
        if owner.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn as_slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// True when `raw` has the GitHub repository URL shape.
pub fn is_github_url(raw: &str) -> bool {
    GithubRepoRef::parse_url(raw).is_some()
}
