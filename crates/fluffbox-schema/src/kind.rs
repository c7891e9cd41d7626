//! Managed runtime kinds.
//!
//! Every kind owns its own root directory (`<home>/<kind>_versions`), its own
//! upstream index format and its own set of environment variables. The set of
//! kinds is closed: adding one means adding a variant here and a runtime
//! implementation in `fluffbox-core`.

/// One of the toolchains fluffbox can install and switch between.
///
/// # Example
///
/// ```
/// use fluffbox_schema::RuntimeKind;
///
/// let kind: RuntimeKind = "java".parse().unwrap();
/// assert_eq!(kind.root_dir_name(), "java_versions");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// JavaScript runtime (Node.js).
    Node,
    /// Python interpreter (CPython).
    Python,
    /// Java virtual machine (Eclipse Temurin JDK).
    Java,
}

impl RuntimeKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 3] = [Self::Node, Self::Python, Self::Java];

    /// Short lowercase name used on the command line and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Python => "python",
            Self::Java => "java",
        }
    }

    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Node => "Node.js",
            Self::Python => "Python",
            Self::Java => "Java",
        }
    }

    /// Name of the directory holding this kind's versions under the managed root.
    pub fn root_dir_name(&self) -> &'static str {
        match self {
            Self::Node => "nodejs_versions",
            Self::Python => "python_versions",
            Self::Java => "java_versions",
        }
    }

    /// Position of this kind in [`RuntimeKind::ALL`], handy for per-kind tables.
    pub fn index(&self) -> usize {
        match self {
            Self::Node => 0,
            Self::Python => 1,
            Self::Java => 2,
        }
    }
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "node" | "nodejs" | "node.js" => Ok(Self::Node),
            "python" | "py" | "cpython" => Ok(Self::Python),
            "java" | "jdk" | "temurin" => Ok(Self::Java),
            _ => Err(format!("Unknown runtime kind: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("nodejs".parse::<RuntimeKind>(), Ok(RuntimeKind::Node));
        assert_eq!("PY".parse::<RuntimeKind>(), Ok(RuntimeKind::Python));
        assert_eq!("jdk".parse::<RuntimeKind>(), Ok(RuntimeKind::Java));
        assert!("ruby".parse::<RuntimeKind>().is_err());
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in RuntimeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
