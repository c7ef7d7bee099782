use serde::Deserialize;

pub const DEFAULT_NODE_COL: &str = "node";
pub const DEFAULT_X_COL: &str = "x";
pub const DEFAULT_Y_COL: &str = "y";
pub const DEFAULT_FROM_COL: &str = "init_node";
pub const DEFAULT_TO_COL: &str = "term_node";
pub const FLOW_FILE_FROM_COL: &str = "from";
pub const FLOW_FILE_TO_COL: &str = "to";

/// Name of the parallel-key level synthesized when the source has none.
pub const SYNTHETIC_KEY_COL: &str = "key";

/// Row terminator column closing every node and net row.
pub const TERMINATOR_SENTINEL: &str = ";";
/// Leading marker column of net rows.
pub const MARKER_SENTINEL: &str = "~";

/// How header names (and the column names callers ask for) are normalized.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColumnNaming {
    /// Trim surrounding whitespace and lower-case.
    #[default]
    Lowercase,
    /// Trim surrounding whitespace only.
    Raw,
}

impl ColumnNaming {
    pub fn normalize(&self, name: &str) -> String {
        let trimmed = name.trim();
        match self {
            ColumnNaming::Lowercase => trimmed.to_lowercase(),
            ColumnNaming::Raw => trimmed.to_string(),
        }
    }
}
