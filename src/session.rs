//! Run-scoped shared state.

use crate::anonymize::SubstitutionTable;
use crate::relevance::DependencyTreeCache;

/// State shared by every file task of one collection run.
///
/// A session is built by the host at the start of a run and dropped at the
/// end, so placeholder numbering and cached dependency trees never carry
/// over into an unrelated run in the same process.
#[derive(Debug, Default)]
pub struct Session {
    pub trees: DependencyTreeCache,
    pub substitutions: SubstitutionTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Value;

    #[test]
    fn test_sessions_do_not_share_placeholders() {
        let first = Session::new();
        let second = Session::new();

        first.substitutions.placeholder(&Value::String("a".into()));
        let b = first.substitutions.placeholder(&Value::String("b".into()));
        assert_eq!(b, "[redacted1]");

        let fresh = second.substitutions.placeholder(&Value::String("b".into()));
        assert_eq!(fresh, "[redacted0]");
        assert!(second.trees.is_empty());
    }
}
