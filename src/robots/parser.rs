use robotstxt::DefaultMatcher;

/// Rules from one host's robots.txt
///
/// Matching is delegated to the `robotstxt` crate on demand.
#[derive(Debug, Clone)]
pub struct ParsedRobots {
    content: String,
    allow_all: bool,
}

impl ParsedRobots {
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Rules that allow everything
    ///
    /// Used when a host has no robots.txt or it could not be fetched.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Checks whether `agent` may fetch `url`
    pub fn is_allowed(&self, url: &str, agent: &str) -> bool {
        if self.allow_all || self.content.trim().is_empty() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, agent, url)
    }

    pub fn allows_everything(&self) -> bool {
        self.allow_all
    }
}
