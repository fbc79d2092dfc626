//! Focus selection. The rule is pluggable through [FocusRule], [PredicateFocus] is the default.

use super::ResolverOptions;
use crate::{tree::DependencyTree, types::Sentence};

/// Everything a [FocusRule] may look at. Positions refer to tokens of `sentence`.
pub struct FocusContext<'a> {
    pub sentence: &'a Sentence,
    pub tree: &'a DependencyTree,
    pub cue: usize,
    /// Sorted positions of the scope.
    pub scope: &'a [usize],
    pub options: &'a ResolverOptions,
}

impl<'a> FocusContext<'a> {
    pub fn in_scope(&self, i: usize) -> bool {
        self.scope.binary_search(&i).is_ok()
    }

    fn distance(&self, i: usize) -> usize {
        if i > self.cue {
            i - self.cue
        } else {
            self.cue - i
        }
    }
}

/// Selects the focus of a cue.
pub trait FocusRule: Send + Sync {
    /// Returns the sorted focus positions. May be empty.
    fn focus(&self, context: &FocusContext) -> Vec<usize>;
}

/// Takes the predicate argument next to the cue as focus.
///
/// 1. The dependent of the cue's head which is closest to the cue and bears one of the focus relations.
///    The focus is its subtree restricted to the scope.
/// 2. For cues modifying a noun (e. g. *kein Hund*) the noun.
/// 3. Otherwise [fallback].
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateFocus;

impl FocusRule for PredicateFocus {
    fn focus(&self, context: &FocusContext) -> Vec<usize> {
        let tree = context.tree;
        let head = match tree.head(context.cue) {
            Some(head) => head,
            None => return fallback(context),
        };

        let argument = tree
            .children(head)
            .iter()
            .copied()
            .filter(|x| {
                *x != context.cue
                    && context.in_scope(*x)
                    && context.options.is_focus_relation(tree.relation(*x))
            })
            // prefer the right neighbour on equal distance
            .min_by_key(|x| (context.distance(*x), *x < context.cue));

        if let Some(argument) = argument {
            return tree
                .subtree(argument)
                .into_iter()
                .filter(|x| context.in_scope(*x))
                .collect();
        }

        if context
            .options
            .is_nominal_cue_relation(tree.relation(context.cue))
        {
            return vec![head];
        }

        fallback(context)
    }
}

/// The in-scope token other than the cue which is highest in the tree, closest to the cue on ties
/// and leftmost after that.
pub fn fallback(context: &FocusContext) -> Vec<usize> {
    context
        .scope
        .iter()
        .copied()
        .filter(|x| *x != context.cue)
        .min_by_key(|x| (context.tree.depth(*x), context.distance(*x), *x))
        .into_iter()
        .collect()
}
