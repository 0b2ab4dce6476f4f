use serde::{Deserialize, Serialize};

/// How the engine moves on after descending into a nested record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Traversal {
    /// Visit every field at every level.
    #[default]
    AllSiblings,
    /// Return as soon as the first nested record at a level has been copied.
    /// Fields declared after it at that level are left untouched.
    StopAfterFirstRecord,
}

/// Engine knobs. The defaults visit the whole tree with no depth limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub traversal: Traversal,
    /// Deepest level of nested records the engine will enter. The top-level
    /// record is depth 0.
    pub max_depth: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let opts: Options =
            serde_json::from_str(r#"{"traversal":"stop_after_first_record"}"#).unwrap();
        assert_eq!(
            opts,
            Options {
                traversal: Traversal::StopAfterFirstRecord,
                max_depth: None,
            }
        );
        let opts: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, Options::default());
    }
}
