//! The dependency tree of a sentence, validated once and then queried by token position.

use crate::types::Sentence;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("sentence has no tokens or no root")]
    NoRoot,
    #[error("sentence has multiple roots: {roots:?}")]
    MultipleRoots { roots: Vec<String> },
    #[error("token '{token}' has more than one head")]
    MultipleHeads { token: String },
    #[error("edge '{head}' -> '{token}' references a token outside the sentence")]
    DanglingHead { token: String, head: String },
    #[error("dependency cycle through token '{token}'")]
    Cycle { token: String },
}

/// A rooted tree over the token positions of a sentence. Every position except the root has exactly one head.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    heads: Vec<Option<usize>>,
    relations: Vec<String>,
    children: Vec<Vec<usize>>,
    depths: Vec<usize>,
    root: usize,
}

impl DependencyTree {
    /// Builds the tree from the edges of a sentence.
    ///
    /// # Errors
    /// If the edges do not form a single rooted, acyclic tree over all tokens.
    pub fn new(sentence: &Sentence) -> Result<Self, Error> {
        let n = sentence.tokens().len();
        let mut heads = vec![None; n];
        let mut relations = vec![String::new(); n];

        for edge in sentence.edges() {
            let (head, dependent) = match (
                sentence.position(&edge.head),
                sentence.position(&edge.dependent),
            ) {
                (Some(head), Some(dependent)) => (head, dependent),
                _ => {
                    return Err(Error::DanglingHead {
                        token: edge.dependent.clone(),
                        head: edge.head.clone(),
                    })
                }
            };

            if heads[dependent].is_some() {
                return Err(Error::MultipleHeads {
                    token: edge.dependent.clone(),
                });
            }

            heads[dependent] = Some(head);
            relations[dependent] = edge.relation.clone();
        }

        Self::from_heads(heads, relations).map_err(|error| match error {
            Error::MultipleRoots { roots } => Error::MultipleRoots {
                roots: roots
                    .iter()
                    .filter_map(|x| x.parse::<usize>().ok())
                    .map(|i| sentence.tokens()[i].id().to_string())
                    .collect(),
            },
            Error::Cycle { token } => Error::Cycle {
                token: token
                    .parse::<usize>()
                    .map(|i| sentence.tokens()[i].id().to_string())
                    .unwrap_or(token),
            },
            x => x,
        })
    }

    /// Builds the tree from a head position (or `None` for the root) and a relation per token.
    /// Errors refer to tokens by position.
    pub fn from_heads(heads: Vec<Option<usize>>, relations: Vec<String>) -> Result<Self, Error> {
        let n = heads.len();
        let roots: Vec<usize> = (0..n).filter(|i| heads[*i].is_none()).collect();

        let root = match roots.as_slice() {
            [] => {
                // a cycle covering the whole sentence leaves no root either
                return Err(Error::NoRoot);
            }
            [root] => *root,
            _ => {
                return Err(Error::MultipleRoots {
                    roots: roots.iter().map(|x| x.to_string()).collect(),
                })
            }
        };

        let mut children = vec![Vec::new(); n];
        for (i, head) in heads.iter().enumerate() {
            if let Some(head) = head {
                if *head >= n {
                    return Err(Error::DanglingHead {
                        token: i.to_string(),
                        head: head.to_string(),
                    });
                }
                children[*head].push(i);
            }
        }

        let mut depths = vec![0; n];
        for (i, depth) in depths.iter_mut().enumerate() {
            let mut current = i;
            let mut steps = 0;

            while let Some(head) = heads[current] {
                current = head;
                steps += 1;

                if steps > n {
                    return Err(Error::Cycle {
                        token: i.to_string(),
                    });
                }
            }
            *depth = steps;
        }

        Ok(DependencyTree {
            heads,
            relations,
            children,
            depths,
            root,
        })
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn head(&self, i: usize) -> Option<usize> {
        self.heads[i]
    }

    /// The relation label of the edge from the head of `i` to `i`. Empty for the root.
    pub fn relation(&self, i: usize) -> &str {
        &self.relations[i]
    }

    /// Dependents of `i` in sentence order.
    pub fn children(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    /// Distance to the root, the root has depth zero.
    pub fn depth(&self, i: usize) -> usize {
        self.depths[i]
    }

    /// Iterates from the head of `i` up to the root.
    pub fn ancestors(&self, i: usize) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.heads[i],
        }
    }

    pub fn is_ancestor(&self, ancestor: usize, i: usize) -> bool {
        self.ancestors(i).any(|x| x == ancestor)
    }

    /// All positions in the subtree rooted at `i` (including `i`), sorted.
    pub fn subtree(&self, i: usize) -> Vec<usize> {
        self.subtree_where(i, |_| true)
    }

    /// Like [DependencyTree::subtree] but does not descend into dependents for which `descend` is false.
    pub fn subtree_where<F>(&self, i: usize, descend: F) -> Vec<usize>
    where
        F: Fn(usize) -> bool,
    {
        let mut out = Vec::new();
        let mut stack = vec![i];

        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(
                self.children[current]
                    .iter()
                    .rev()
                    .filter(|x| descend(**x))
                    .copied(),
            );
        }

        out.sort_unstable();
        out
    }
}

pub struct Ancestors<'a> {
    tree: &'a DependencyTree,
    current: Option<usize>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let current = self.current?;
        self.current = self.tree.heads[current];
        Some(current)
    }
}
