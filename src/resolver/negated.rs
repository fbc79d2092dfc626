use super::ResolverOptions;
use crate::{tree::DependencyTree, types::Sentence};

/// Finds the negated marker of a simple cue: the token (usually the verb) whose meaning is negated.
///
/// Prefers the head of the cue. Otherwise looks for a token with a marker tag in the scope,
/// first to the right of the cue, then to the left.
pub fn negated(
    sentence: &Sentence,
    tree: &DependencyTree,
    cue: usize,
    scope: &[usize],
    options: &ResolverOptions,
) -> Option<usize> {
    let is_marker = |x: usize| options.is_negated_pos(sentence.tokens()[x].pos());

    if let Some(head) = tree.head(cue) {
        if scope.binary_search(&head).is_ok() && is_marker(head) {
            return Some(head);
        }
    }

    scope
        .iter()
        .copied()
        .find(|x| *x > cue && is_marker(*x))
        .or_else(|| {
            scope
                .iter()
                .rev()
                .copied()
                .find(|x| *x < cue && is_marker(*x))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::sentence;

    #[test]
    fn searches_right_then_left() {
        // "gesehen hat er ihn nicht mehr": the auxiliary heads the cue
        let sentence = sentence(&[
            ("gesehen", "VVPP", 2, "OC"),
            ("hat", "VAFIN", 0, "--"),
            ("er", "PPER", 2, "SB"),
            ("nicht", "PTKNEG", 2, "NG"),
            ("mehr", "ADV", 2, "MO"),
        ]);
        let tree = DependencyTree::new(&sentence).unwrap();
        let options = ResolverOptions::default();

        assert_eq!(negated(&sentence, &tree, 3, &[0, 1, 2, 3, 4], &options), Some(0));
        assert_eq!(negated(&sentence, &tree, 3, &[1, 2, 3, 4], &options), None);
    }
}
