//! User agent sent with upstream requests.

/// Sent when no `user_agent` is configured.
pub const USER_AGENT: &str = concat!(
    "advisories/",
    env!("CARGO_PKG_VERSION"),
    " (travel advisory mirror)"
);

/// The configured agent, or [`USER_AGENT`] when unset or blank.
pub fn resolve_user_agent(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|agent| !agent.is_empty())
        .unwrap_or(USER_AGENT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_agent_names_the_crate() {
        assert_eq!(resolve_user_agent(None), USER_AGENT);
        assert!(USER_AGENT.starts_with("advisories/"));
    }

    #[test]
    fn test_configured_agent() {
        assert_eq!(resolve_user_agent(Some("MirrorBot/2.0")), "MirrorBot/2.0");
        assert_eq!(resolve_user_agent(Some("   ")), USER_AGENT);
    }
}
