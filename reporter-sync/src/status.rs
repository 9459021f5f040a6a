//! Working-tree status and the conflict/rebase classifier.

/// Two-character porcelain codes of unmerged paths.
const UNMERGED_CODES: &[&str] = &["UU", "AA", "DD", "AU", "UA", "DU", "UD"];

/// Ordered `git status --porcelain` lines, each a two-character code, a
/// space, and a path. Leading spaces are part of the code and are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    lines: Vec<String>,
}

impl WorkingTreeStatus {
    pub fn parse(porcelain: &str) -> Self {
        Self {
            lines: porcelain
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_clean(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn conflict(&self) -> ConflictState {
        classify(&self.lines)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictState {
    pub conflicted: bool,
    /// Heuristic: a both-modified (`UU`) path is taken to mean a rebase.
    pub rebase: bool,
}

/// Classify status lines. Pure.
pub fn classify<S: AsRef<str>>(lines: &[S]) -> ConflictState {
    let mut state = ConflictState::default();
    for line in lines {
        let line = line.as_ref();
        if line.starts_with("U ") || UNMERGED_CODES.iter().any(|code| line.starts_with(code)) {
            state.conflicted = true;
            if line.starts_with("UU") {
                state.rebase = true;
            }
        }
    }
    state
}
