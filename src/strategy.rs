//! Named extraction strategies and the first-success cascade.
//!
//! Semantic fields live in a structure with no fixed schema, so each field
//! is located by an ordered list of independently testable strategies. The
//! cascade itself is a pure function over `(context, strategies)`, so the
//! orchestration layer never hard-codes structure assumptions.

/// One named way of extracting a value from a context.
///
/// Plain function pointers keep strategies stateless and listable as
/// `const` tables, mirroring how selector rules are declared elsewhere.
pub struct FieldStrategy<C> {
    /// Short name used in diagnostics and tests.
    pub name: &'static str,
    /// The extraction attempt; `None` means "not found here".
    pub run: fn(&C) -> Option<String>,
}

/// A value together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub value: String,
    pub strategy: &'static str,
}

/// Run strategies in order and return the first non-empty result.
///
/// Empty or whitespace-only values are treated as misses so a sloppy
/// strategy cannot shadow a later, better one.
#[must_use]
pub fn cascade<C>(ctx: &C, strategies: &[FieldStrategy<C>]) -> Option<Located> {
    for strategy in strategies {
        if let Some(value) = (strategy.run)(ctx) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(Located {
                    value: value.to_string(),
                    strategy: strategy.name,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ctx {
        a: Option<String>,
        b: Option<String>,
    }

    fn from_a(ctx: &Ctx) -> Option<String> {
        ctx.a.clone()
    }

    fn from_b(ctx: &Ctx) -> Option<String> {
        ctx.b.clone()
    }

    const STRATEGIES: &[FieldStrategy<Ctx>] = &[
        FieldStrategy { name: "a", run: from_a },
        FieldStrategy { name: "b", run: from_b },
    ];

    #[test]
    fn first_success_wins() {
        let ctx = Ctx {
            a: Some("one".into()),
            b: Some("two".into()),
        };
        let hit = cascade(&ctx, STRATEGIES);
        assert_eq!(
            hit,
            Some(Located {
                value: "one".into(),
                strategy: "a"
            })
        );
    }

    #[test]
    fn blank_results_fall_through() {
        let ctx = Ctx {
            a: Some("   ".into()),
            b: Some("two".into()),
        };
        let hit = cascade(&ctx, STRATEGIES);
        assert_eq!(hit.map(|l| l.strategy), Some("b"));
    }

    #[test]
    fn all_misses_yield_none() {
        let ctx = Ctx { a: None, b: None };
        assert!(cascade(&ctx, STRATEGIES).is_none());
    }
}
