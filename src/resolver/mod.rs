//! Finds the negation cues of a sentence and resolves scope, focus, negated marker and target for each of them.

use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::{
    frame::{Frame, FrameId, Membership, SplitWord},
    lexicon::{AffixPosition, CueCategory, CueLexicon},
    tree::{self, DependencyTree},
    types::{Sentence, Token},
    Error,
};

pub mod focus;
pub mod negated;
pub mod scope;

use focus::{FocusContext, FocusRule, PredicateFocus};

fn labels(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|x| x.to_string()).collect()
}

/// The rule tables of the resolver. Defaults are for German text annotated with
/// STTS tags and TIGER edge labels, with the common UD labels added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverOptions {
    /// Relations marking the root of a clause. The scope of a cue does not extend beyond its clause.
    pub clause_relations: Vec<String>,
    /// Relations of coordinated conjuncts. A conjunct after the cue ends the scope if it heads a clause.
    pub coordination_relations: Vec<String>,
    /// Tokens whose tag starts with one of these head a clause of their own when coordinated.
    pub clause_pos: Vec<String>,
    /// Relations of coordinating conjunctions.
    pub coordinator_relations: Vec<String>,
    /// Tokens whose tag starts with one of these are punctuation.
    pub punctuation_pos: Vec<String>,
    /// Relations of predicate arguments which are candidates for the focus.
    pub focus_relations: Vec<String>,
    /// Relations of cues negating the noun they depend on e. g. *kein*.
    pub nominal_cue_relations: Vec<String>,
    /// Tags of tokens which can be the negated marker.
    pub negated_pos: Vec<String>,
    /// Whether to take words missing from the lexicon as affix cues if an affix rule allows it.
    pub guess_unlisted: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            clause_relations: labels(&[
                "CJ",
                "RC",
                "RE",
                "PAR",
                "CC",
                "conj",
                "ccomp",
                "advcl",
                "acl",
                "acl:relcl",
                "parataxis",
                "csubj",
            ]),
            coordination_relations: labels(&["CJ", "conj"]),
            clause_pos: labels(&["V", "AUX"]),
            coordinator_relations: labels(&["CD", "cc"]),
            punctuation_pos: labels(&["$", "PUNCT"]),
            focus_relations: labels(&[
                "PD", "OA", "OC", "DA", "MO", "SVP", "obj", "xcomp", "iobj", "obl", "advmod",
            ]),
            nominal_cue_relations: labels(&["NK", "det"]),
            negated_pos: labels(&["VVPP", "VVIZU", "VVFIN", "VMFIN", "ART"]),
            guess_unlisted: false,
        }
    }
}

impl ResolverOptions {
    /// Reads options from JSON. Missing fields take their default value.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn is_clause(&self, relation: &str) -> bool {
        self.clause_relations.iter().any(|x| x == relation)
    }

    pub fn is_coordination(&self, relation: &str) -> bool {
        self.coordination_relations.iter().any(|x| x == relation)
    }

    pub fn is_clause_pos(&self, token: &Token) -> bool {
        self.clause_pos
            .iter()
            .any(|prefix| token.pos().starts_with(prefix.as_str()))
    }

    pub fn is_coordinator(&self, relation: &str) -> bool {
        self.coordinator_relations.iter().any(|x| x == relation)
    }

    pub fn is_punctuation(&self, token: &Token) -> bool {
        self.punctuation_pos
            .iter()
            .any(|prefix| token.pos().starts_with(prefix.as_str()))
    }

    pub fn is_focus_relation(&self, relation: &str) -> bool {
        self.focus_relations.iter().any(|x| x == relation)
    }

    pub fn is_nominal_cue_relation(&self, relation: &str) -> bool {
        self.nominal_cue_relations.iter().any(|x| x == relation)
    }

    pub fn is_negated_pos(&self, pos: &str) -> bool {
        self.negated_pos.iter().any(|x| x == pos)
    }
}

/// The frames found in one sentence together with the token to frame side table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    frames: Vec<Frame>,
    membership: Membership,
}

impl Resolution {
    /// Frames in the order of their cues.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

/// Applies a [CueLexicon] and the scope, focus and negated rules to sentences.
pub struct Resolver {
    lexicon: CueLexicon,
    options: ResolverOptions,
    focus_rule: Box<dyn FocusRule>,
}

impl Resolver {
    /// Creates a resolver using [PredicateFocus] to determine the focus.
    pub fn new(lexicon: CueLexicon, options: ResolverOptions) -> Self {
        Resolver {
            lexicon,
            options,
            focus_rule: Box::new(PredicateFocus),
        }
    }

    /// Replaces the focus rule.
    pub fn with_focus_rule<F: FocusRule + 'static>(mut self, rule: F) -> Self {
        self.focus_rule = Box::new(rule);
        self
    }

    pub fn lexicon(&self) -> &CueLexicon {
        &self.lexicon
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// The cue category of a token, considering exceptions around it.
    fn category(&self, sentence: &Sentence, forms: &[&str], i: usize) -> CueCategory {
        let token = &sentence.tokens()[i];

        let mut category = self.lexicon.classify(token.word(), token.pos());
        if category == CueCategory::None && self.options.guess_unlisted {
            category = self.lexicon.guess(token.word(), token.pos());
        }

        if category.is_cue() {
            let width = self.lexicon.max_exception_len();
            if width > 0 {
                let start = i.saturating_sub(width - 1);
                let end = (i + width).min(forms.len());

                if self.lexicon.matches_exception(&forms[start..end], i - start) {
                    debug!(
                        "'{}' in sentence {} is part of an exception phrase",
                        token.word(),
                        sentence.id()
                    );
                    return CueCategory::None;
                }
            }
        }

        category
    }

    /// Finds all cues of a sentence in token order and builds one [Frame] per cue.
    /// Frames are numbered `<sentence id>_f1`, `<sentence id>_f2`, ...
    ///
    /// # Errors
    /// If the dependency edges of the sentence do not form a tree.
    pub fn resolve(&self, sentence: &Sentence) -> Result<Resolution, tree::Error> {
        if sentence.tokens().is_empty() {
            return Ok(Resolution::default());
        }

        let tree = DependencyTree::new(sentence)?;
        let tokens = sentence.tokens();
        let forms: Vec<&str> = tokens.iter().map(|x| x.lower()).collect();

        let mut resolution = Resolution::default();

        for i in 0..tokens.len() {
            // partners of multi word cues are already part of a frame
            if resolution.membership.contains(tokens[i].id()) {
                continue;
            }

            let id = FrameId::nth(sentence.id(), resolution.frames.len());

            let frame = match self.category(sentence, &forms, i) {
                CueCategory::None => continue,
                CueCategory::Cue => self.cue_frame(id, sentence, &tree, i, None),
                CueCategory::AffixCue => match self.affix_frame(id.clone(), sentence, &tree, i) {
                    Some(frame) => frame,
                    None => self.cue_frame(id, sentence, &tree, i, None),
                },
                CueCategory::MultiWordCue => {
                    let partner = self.partner(sentence, &forms, &resolution.membership, i);
                    self.cue_frame(id, sentence, &tree, i, partner)
                }
            };

            resolution.membership.insert(&frame);
            resolution.frames.push(frame);
        }

        Ok(resolution)
    }

    /// The closest free token to the right matching the partner word of the multi word cue at `i`.
    fn partner(
        &self,
        sentence: &Sentence,
        forms: &[&str],
        membership: &Membership,
        i: usize,
    ) -> Option<usize> {
        let token = &sentence.tokens()[i];
        let partner = self.lexicon.entry(token.word(), token.pos())?.partner.as_ref()?;

        let found = (i + 1..forms.len()).find(|j| {
            forms[*j] == partner.as_str() && !membership.contains(sentence.tokens()[*j].id())
        });

        if found.is_none() {
            debug!(
                "no '{}' for '{}' in sentence {}, treating it as simple cue",
                partner,
                token.word(),
                sentence.id()
            );
        }
        found
    }

    fn cue_frame(
        &self,
        id: FrameId,
        sentence: &Sentence,
        tree: &DependencyTree,
        cue: usize,
        partner: Option<usize>,
    ) -> Frame {
        let mut scope = scope::scope(sentence, tree, cue, &self.options);
        if let Some(partner) = partner {
            scope.extend(scope::scope(sentence, tree, partner, &self.options));
            scope.sort_unstable();
            scope.dedup();
        }

        let context = FocusContext {
            sentence,
            tree,
            cue,
            scope: &scope,
            options: &self.options,
        };
        let focus = self.focus_rule.focus(&context);
        let negated = negated::negated(sentence, tree, cue, &scope, &self.options);

        let ids = |positions: &[usize]| -> Vec<String> {
            positions
                .iter()
                .map(|x| sentence.tokens()[*x].id().to_string())
                .collect()
        };

        let mut target = vec![cue];
        target.extend(partner);

        Frame::new(id, ids(&[cue]))
            .with_target(ids(&target))
            .with_negated(ids(&negated.into_iter().collect::<Vec<_>>()))
            .with_focus(ids(&focus))
            .with_scope(ids(&scope))
    }

    /// Builds the frame of an affix cue. `None` if no affix rule for the tag of the word splits it.
    fn affix_frame(
        &self,
        id: FrameId,
        sentence: &Sentence,
        tree: &DependencyTree,
        host: usize,
    ) -> Option<Frame> {
        let token = &sentence.tokens()[host];
        let affix = match self.lexicon.split_affix(token.word(), Some(token.pos())) {
            Some(affix) => affix,
            None => {
                debug!(
                    "no affix rule splits '{}' ({}) in sentence {}",
                    token.word(),
                    token.pos(),
                    sentence.id()
                );
                return None;
            }
        };

        let split = SplitWord::new(
            token.id(),
            affix.affix,
            affix.stem,
            affix.position == AffixPosition::Prefix,
        );
        let scope: Vec<&str> = scope::affix_scope(sentence, tree, host, &self.options)
            .into_iter()
            .map(|x| sentence.tokens()[x].id())
            .collect();

        Some(
            Frame::new(id, vec![token.id()])
                .with_negated(vec![token.id()])
                .with_focus(vec![token.id()])
                .with_scope(scope)
                .with_split(split),
        )
    }
}
