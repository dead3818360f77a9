use std::fmt;
use std::str::FromStr;

/// Configures how the wrapper finds the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootDiscovery {
    /// A fixed number of parent steps above the wrapper's directory.
    Fixed(usize),
    /// The nearest ancestor of the wrapper's directory holding the marker file.
    Search,
}

impl RootDiscovery {
    /// Canonical mode name, without the depth.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed(_) => "fixed",
            Self::Search => "search",
        }
    }

    /// Build from a mode name and an optional depth override.
    pub fn from_parts(mode: Option<&str>, depth: Option<&str>) -> Result<Self, String> {
        let mode = match mode {
            Some(value) => value.parse()?,
            None => Self::default(),
        };

        match (mode, depth) {
            (Self::Fixed(_), Some(raw)) => raw
                .trim()
                .parse::<usize>()
                .map(Self::Fixed)
                .map_err(|_| format!("invalid root depth: {raw}")),
            (mode, _) => Ok(mode),
        }
    }
}

impl Default for RootDiscovery {
    fn default() -> Self {
        Self::Fixed(crate::paths::DEFAULT_ROOT_DEPTH)
    }
}

impl FromStr for RootDiscovery {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Self::default()),
            "search" | "search-upward" | "search_upward" => Ok(Self::Search),
            other => Err(format!("invalid root discovery mode: {other}")),
        }
    }
}

impl fmt::Display for RootDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(depth) => write!(f, "fixed({depth})"),
            Self::Search => f.write_str("search"),
        }
    }
}
