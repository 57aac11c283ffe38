//! Boolean filter expressions over tag membership.
//!
//! Grammar, loosest to tightest binding: `|` for OR, juxtaposition
//! for AND, `!` for NOT, parentheses for grouping. The empty
//! expression matches everything.

use std::{collections::HashSet, iter::once, str::FromStr};

use lazy_regex::regex;
use thiserror::Error;

/// Compiled filter expression, built once per run and never mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TagExpr {
    /// Exact membership test for one tag.
    Literal(String),
    Not(Box<TagExpr>),
    And(Vec<TagExpr>),
    Or(Vec<TagExpr>),
    /// Matches every tag set; what the empty expression compiles to.
    True,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("unbalanced parentheses in filter {0:?}")]
    Unbalanced(String),
    #[error("unmatched ')' in filter {0:?}")]
    UnmatchedClose(String),
    #[error("empty clause in filter {0:?}")]
    EmptyClause(String),
    #[error("dangling '!' in filter {0:?}")]
    DanglingNot(String),
    #[error("leftover tokens in filter {0:?}")]
    LeftoverTokens(String),
}

/// Partial parse output: either a completed subexpression or a
/// top-level `|` separator waiting for clause splitting.
enum Entry {
    Or,
    Expr(TagExpr),
}

impl FromStr for TagExpr {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let toks: Vec<&str> = regex!(r"[()!|]|[^\s()!|]+")
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        if toks.is_empty() {
            return Ok(TagExpr::True);
        }

        // Output sequence for the innermost open group, with the
        // outer groups' prefixes below it. The whole input is parsed
        // inside an implicit parenthesis pair.
        let mut seq: Vec<Entry> = Vec::new();
        // Open groups: start offset in seq and whether the group
        // itself is negated.
        let mut stack: Vec<(usize, bool)> = Vec::new();
        // Negation parity for the next term. Consecutive '!' tokens
        // cancel pairwise by toggling this instead of stacking Not
        // nodes.
        let mut pending_not = false;

        for tok in once("(").chain(toks).chain(once(")")) {
            match tok {
                "(" => {
                    stack.push((seq.len(), pending_not));
                    pending_not = false;
                }
                "!" => pending_not = !pending_not,
                "|" => {
                    if pending_not {
                        return Err(ParseError::DanglingNot(text.into()));
                    }
                    seq.push(Entry::Or);
                }
                ")" => {
                    if pending_not {
                        return Err(ParseError::DanglingNot(text.into()));
                    }
                    let Some((start, negated)) = stack.pop() else {
                        return Err(ParseError::UnmatchedClose(text.into()));
                    };
                    let mut expr = clauses(seq.split_off(start))
                        .ok_or_else(|| {
                            ParseError::EmptyClause(text.into())
                        })?;
                    if negated {
                        expr = TagExpr::Not(Box::new(expr));
                    }
                    seq.push(Entry::Expr(expr));
                }
                word => {
                    let mut expr = TagExpr::Literal(word.into());
                    if pending_not {
                        expr = TagExpr::Not(Box::new(expr));
                        pending_not = false;
                    }
                    seq.push(Entry::Expr(expr));
                }
            }
        }

        if !stack.is_empty() {
            return Err(ParseError::Unbalanced(text.into()));
        }
        match (seq.pop(), seq.is_empty()) {
            (Some(Entry::Expr(root)), true) => Ok(root),
            _ => Err(ParseError::LeftoverTokens(text.into())),
        }
    }
}

/// Split a group's contents on top-level `|` into AND clauses and OR
/// them together. Single-term clauses and single-clause groups
/// collapse to the bare term with no wrapper node. None marks an
/// empty clause.
fn clauses(content: Vec<Entry>) -> Option<TagExpr> {
    let mut alternatives: Vec<TagExpr> = Vec::new();
    let mut terms: Vec<TagExpr> = Vec::new();

    for entry in content.into_iter().chain(once(Entry::Or)) {
        match entry {
            Entry::Expr(e) => terms.push(e),
            Entry::Or => {
                match terms.len() {
                    0 => return None,
                    1 => alternatives.push(terms.pop().unwrap()),
                    _ => alternatives
                        .push(TagExpr::And(std::mem::take(&mut terms))),
                }
            }
        }
    }

    if alternatives.len() == 1 {
        alternatives.pop()
    } else {
        Some(TagExpr::Or(alternatives))
    }
}

impl TagExpr {
    /// True iff the tag set satisfies the expression. Purely
    /// functional; case folding is the caller's job, applied to both
    /// the expression text and the tag set before this point.
    pub fn matches(&self, tags: &HashSet<String>) -> bool {
        match self {
            TagExpr::Literal(tag) => tags.contains(tag),
            TagExpr::Not(e) => !e.matches(tags),
            TagExpr::And(es) => es.iter().all(|e| e.matches(tags)),
            TagExpr::Or(es) => es.iter().any(|e| e.matches(tags)),
            TagExpr::True => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TagExpr {
        text.parse().unwrap()
    }

    fn tags(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_expression_matches_everything() {
        assert_eq!(parse(""), TagExpr::True);
        assert_eq!(parse("   "), TagExpr::True);
        assert!(parse("").matches(&tags(&[])));
        assert!(parse("").matches(&tags(&["a", "b"])));
    }

    #[test]
    fn single_literal() {
        assert_eq!(parse("a"), TagExpr::Literal("a".into()));
        assert!(parse("a").matches(&tags(&["a", "b"])));
        assert!(!parse("a").matches(&tags(&["b"])));
    }

    #[test]
    fn precedence_or_binds_loosest() {
        // a|b c is Or(a, And(b, c)) ...
        assert_eq!(
            parse("a|b c"),
            TagExpr::Or(vec![
                TagExpr::Literal("a".into()),
                TagExpr::And(vec![
                    TagExpr::Literal("b".into()),
                    TagExpr::Literal("c".into()),
                ]),
            ])
        );
        // ... while (a|b) c is And(Or(a, b), c).
        assert_eq!(
            parse("(a|b) c"),
            TagExpr::And(vec![
                TagExpr::Or(vec![
                    TagExpr::Literal("a".into()),
                    TagExpr::Literal("b".into()),
                ]),
                TagExpr::Literal("c".into()),
            ])
        );
    }

    #[test]
    fn redundant_parens_collapse() {
        assert_eq!(parse("((a))"), TagExpr::Literal("a".into()));
        assert_eq!(parse("(a b)"), parse("a b"));
        assert_eq!(parse("(a|b)"), parse("a|b"));
    }

    #[test]
    fn negation_parity() {
        assert_eq!(
            parse("!a"),
            TagExpr::Not(Box::new(TagExpr::Literal("a".into())))
        );
        // Even runs of '!' cancel to nothing, odd runs to one Not.
        assert_eq!(parse("!!a"), TagExpr::Literal("a".into()));
        assert_eq!(parse("!!!a"), parse("!a"));
        assert_eq!(parse("! ! a"), parse("a"));
    }

    #[test]
    fn negated_group() {
        let e = parse("!(a b)");
        assert_eq!(
            e,
            TagExpr::Not(Box::new(TagExpr::And(vec![
                TagExpr::Literal("a".into()),
                TagExpr::Literal("b".into()),
            ])))
        );
        assert!(e.matches(&tags(&["a"])));
        assert!(!e.matches(&tags(&["a", "b"])));
    }

    #[test]
    fn double_negation_is_identity() {
        for (expr, doubled) in [
            ("a", "!!a"),
            ("a b", "!!(a b)"),
            ("a|b", "! ! (a|b)"),
        ] {
            for set in [
                tags(&[]),
                tags(&["a"]),
                tags(&["b"]),
                tags(&["a", "b"]),
            ] {
                assert_eq!(
                    parse(expr).matches(&set),
                    parse(doubled).matches(&set),
                    "{expr} vs {doubled} over {set:?}"
                );
            }
        }
    }

    #[test]
    fn compound_evaluation() {
        let e = parse("science-fiction !(movie|short) good");
        assert!(e.matches(&tags(&["science-fiction", "good", "tv"])));
        assert!(!e.matches(&tags(&["science-fiction", "good", "movie"])));
        assert!(!e.matches(&tags(&["science-fiction", "tv"])));
    }

    #[test]
    fn malformed_expressions() {
        use ParseError::*;

        assert_eq!("(a".parse::<TagExpr>(), Err(Unbalanced("(a".into())));
        assert_eq!(
            "a)".parse::<TagExpr>(),
            Err(UnmatchedClose("a)".into()))
        );
        assert_eq!("|a".parse::<TagExpr>(), Err(EmptyClause("|a".into())));
        assert_eq!(
            "a||b".parse::<TagExpr>(),
            Err(EmptyClause("a||b".into()))
        );
        assert_eq!("a|".parse::<TagExpr>(), Err(EmptyClause("a|".into())));
        assert_eq!("!".parse::<TagExpr>(), Err(DanglingNot("!".into())));
        assert_eq!(
            "a !".parse::<TagExpr>(),
            Err(DanglingNot("a !".into()))
        );
        assert_eq!("()".parse::<TagExpr>(), Err(EmptyClause("()".into())));
    }
}
