//! Range-containment deduplication.
//!
//! A call chain like `a().b().c()` produces one capture per call, and a
//! property read off a call result (`a().b`) produces a token whose value is
//! opaque. Both are pruned here before resolution.

use crate::tree::SourceRange;

use super::model::UsageSite;

fn ranges(usages: &[UsageSite]) -> Vec<Option<SourceRange>> {
    usages.iter().map(UsageSite::range).collect()
}

/// Drop every call whose range contains another call's range.
///
/// Only the innermost call of a chain survives: `a().b().c()` keeps `a`.
pub fn dedupe_functions(functions: Vec<UsageSite>) -> Vec<UsageSite> {
    let all = ranges(&functions);

    functions
        .into_iter()
        .enumerate()
        .filter(|(i, usage)| {
            let Some(own) = usage.range() else {
                return true;
            };
            !all.iter()
                .enumerate()
                .any(|(j, other)| j != *i && other.is_some_and(|other| own.contains(&other)))
        })
        .map(|(_, usage)| usage)
        .collect()
}

/// Drop every token whose range contains one of `functions`.
///
/// `functions` should be the calls as captured, before [`dedupe_functions`].
pub fn dedupe_tokens(tokens: Vec<UsageSite>, functions: &[UsageSite]) -> Vec<UsageSite> {
    let calls: Vec<SourceRange> = functions.iter().filter_map(UsageSite::range).collect();

    tokens
        .into_iter()
        .filter(|token| match token.range() {
            Some(own) => !calls.iter().any(|call| own.contains(call)),
            None => true,
        })
        .collect()
}
