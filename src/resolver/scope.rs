//! Scope of a cue: the clause it occurs in, cut off at the next coordinated clause.

use super::ResolverOptions;
use crate::{tree::DependencyTree, types::Sentence};

/// The node whose subtree is the scope of the cue at position `cue`.
///
/// This is the nearest ancestor of the cue whose relation marks a clause, or the root if there is none.
/// Conjuncts only count as clauses if they have a clause tag. A cue which is the root governs itself.
pub fn governing_node(
    sentence: &Sentence,
    tree: &DependencyTree,
    cue: usize,
    options: &ResolverOptions,
) -> usize {
    if tree.head(cue).is_none() {
        return cue;
    }

    tree.ancestors(cue)
        .find(|x| {
            let relation = tree.relation(*x);
            options.is_clause(relation)
                && (!options.is_coordination(relation)
                    || options.is_clause_pos(&sentence.tokens()[*x]))
        })
        .unwrap_or_else(|| tree.root())
}

/// Computes the scope of a simple cue as sorted token positions.
pub fn scope(
    sentence: &Sentence,
    tree: &DependencyTree,
    cue: usize,
    options: &ResolverOptions,
) -> Vec<usize> {
    let governor = governing_node(sentence, tree, cue, options);

    // coordinated nouns or adjectives belong to the clause, coordinated verbs start a new one
    let is_cut = |x: usize| {
        x > cue
            && options.is_coordination(tree.relation(x))
            && options.is_clause_pos(&sentence.tokens()[x])
            && !tree.is_ancestor(x, cue)
    };
    let positions = tree.subtree_where(governor, |x| !is_cut(x));

    // the rightmost conjunct cut off below the kept part of the clause
    let last_cut = positions
        .iter()
        .flat_map(|x| tree.children(*x))
        .copied()
        .filter(|x| is_cut(*x))
        .max();

    positions
        .into_iter()
        .filter(|x| match last_cut {
            Some(last_cut) => {
                !(*x > cue && *x < last_cut && options.is_coordinator(tree.relation(*x)))
            }
            None => true,
        })
        .filter(|x| !options.is_punctuation(&sentence.tokens()[*x]))
        .collect()
}

/// Computes the scope of an affix cue: everything the host word governs.
pub fn affix_scope(
    sentence: &Sentence,
    tree: &DependencyTree,
    host: usize,
    options: &ResolverOptions,
) -> Vec<usize> {
    tree.subtree(host)
        .into_iter()
        .filter(|x| !options.is_punctuation(&sentence.tokens()[*x]))
        .collect()
}
