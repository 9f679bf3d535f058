use crate::db::enums::IgnoreMatchMode;

/// The resolved ignore rules of one configuration. Matching is a pure
/// prefix test over the ordered rule set, O(rules) per call.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    rules: Vec<String>,
    mode: IgnoreMatchMode,
}

impl IgnoreSet {
    pub fn new(rules: Vec<String>, mode: IgnoreMatchMode) -> Self {
        Self { rules, mode }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// True iff the relative path is excluded by some rule.
    ///
    /// In `Prefix` mode a rule is a literal prefix: `logs` matches `logs2`
    /// as well as `logs/app.log`. `Segment` mode additionally requires the
    /// match to end at a `/` boundary (or be exact).
    pub fn matches(&self, relative_path: &str) -> bool {
        self.rules.iter().any(|rule| match self.mode {
            IgnoreMatchMode::Prefix => relative_path.starts_with(rule.as_str()),
            IgnoreMatchMode::Segment => segment_prefix_matches(relative_path, rule),
        })
    }
}

fn segment_prefix_matches(path: &str, rule: &str) -> bool {
    let rule = rule.trim_end_matches('/');
    if rule.is_empty() {
        return false;
    }
    match path.strip_prefix(rule) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix_set(rules: &[&str]) -> IgnoreSet {
        IgnoreSet::new(
            rules.iter().map(|s| s.to_string()).collect(),
            IgnoreMatchMode::Prefix,
        )
    }

    fn segment_set(rules: &[&str]) -> IgnoreSet {
        IgnoreSet::new(
            rules.iter().map(|s| s.to_string()).collect(),
            IgnoreMatchMode::Segment,
        )
    }

    #[test]
    fn empty_set_matches_nothing() {
        let set = prefix_set(&[]);
        assert!(!set.matches("anything"));
        assert!(!set.matches(""));
    }

    #[test]
    fn literal_prefix_matching() {
        let set = prefix_set(&["logs", "tmp/cache"]);
        assert!(set.matches("logs"));
        assert!(set.matches("logs/app.log"));
        assert!(set.matches("tmp/cache/x"));
        assert!(!set.matches("data/logs"));
        assert!(!set.matches("tmp"));
    }

    #[test]
    fn prefix_mode_keeps_the_historical_quirk() {
        // A rule `logs` also swallows `logs2` in prefix mode.
        let set = prefix_set(&["logs"]);
        assert!(set.matches("logs2"));
        assert!(set.matches("logs2/b.txt"));
    }

    #[test]
    fn segment_mode_respects_path_boundaries() {
        let set = segment_set(&["logs"]);
        assert!(set.matches("logs"));
        assert!(set.matches("logs/app.log"));
        assert!(!set.matches("logs2"));
        assert!(!set.matches("logs2/b.txt"));
    }

    #[test]
    fn segment_mode_tolerates_trailing_slash_in_rule() {
        let set = segment_set(&["logs/"]);
        assert!(set.matches("logs"));
        assert!(set.matches("logs/app.log"));
        assert!(!set.matches("logs2"));
    }

    #[test]
    fn first_matching_rule_wins_regardless_of_order() {
        let set = prefix_set(&["a/b", "a"]);
        assert!(set.matches("a/c"));
        assert!(set.matches("a/b/c"));
    }
}
