use std::path::{Path, PathBuf};

/// Ordered base directories searched for each request; earlier roots override later ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Candidate filesystem paths for a logical URL path, in precedence order.
    pub fn candidates(&self, logical_path: &str) -> Vec<PathBuf> {
        let relative = logical_path.trim_start_matches('/');
        self.roots
            .iter()
            .map(|root| join_logical(root, relative))
            .collect()
    }
}

fn join_logical(root: &Path, relative: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != ".") {
        path.push(segment);
    }
    path
}

/// True when any segment of `logical_path` could resolve outside its root.
///
/// Rejects `..`, drive or stream prefixes (`C:`), and segments that would
/// replace the root when pushed (`\\host\share`, `\x`).
pub fn escapes_root(logical_path: &str) -> bool {
    let climbs = logical_path
        .split(['/', '\\'])
        .any(|segment| segment == "..");
    climbs
        || logical_path.split('/').any(|segment| {
            segment.contains(':') || segment.starts_with('\\') || Path::new(segment).has_root()
        })
}
