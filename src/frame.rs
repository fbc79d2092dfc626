//! Negation frames: the annotation of one negation instance.
//!
//! A frame refers to tokens by id only. Which frames a token belongs to is kept in a [Membership]
//! side table instead of on the token itself.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};

/// Identifies a frame, unique per sentence. Frames built by this crate are numbered
/// `<sentence id>_f<n>` starting at one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(String);

impl FrameId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        FrameId(id.into())
    }

    /// The id of the `index`th (zero-based) frame of a sentence.
    pub fn nth(sentence_id: &str, index: usize) -> Self {
        FrameId(format!("{}_f{}", sentence_id, index + 1))
    }

    /// The id of a frame element of this frame e. g. `s1_f1_e3`.
    pub fn element(&self, index: usize) -> String {
        format!("{}_e{}", self.0, index)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One part of a split word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPart {
    pub id: String,
    pub word: String,
}

/// A token split into the negating affix and the stem it attaches to e. g. *un|glücklich*.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitWord {
    token: String,
    parts: Vec<SplitPart>,
    affix: usize,
}

impl SplitWord {
    /// Splits the token into `affix` and `stem`, in surface order given by `affix_first`.
    /// Part ids are `<token id>_s0` and `<token id>_s1`.
    pub fn new(token: &str, affix: &str, stem: &str, affix_first: bool) -> Self {
        let words = if affix_first {
            [affix, stem]
        } else {
            [stem, affix]
        };

        SplitWord {
            token: token.to_string(),
            parts: words
                .iter()
                .enumerate()
                .map(|(i, word)| SplitPart {
                    id: format!("{}_s{}", token, i),
                    word: word.to_string(),
                })
                .collect(),
            affix: if affix_first { 0 } else { 1 },
        }
    }

    /// Builds a split word from parts read from a document. `affix` is the index of the negating part.
    pub fn from_parts(token: &str, parts: Vec<SplitPart>, affix: usize) -> Self {
        SplitWord {
            token: token.to_string(),
            parts,
            affix,
        }
    }

    /// The id of the host token.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn parts(&self) -> &[SplitPart] {
        &self.parts
    }

    pub fn affix(&self) -> Option<&SplitPart> {
        self.parts.get(self.affix)
    }

    /// The first part which is not the affix.
    pub fn stem(&self) -> Option<&SplitPart> {
        self.parts
            .iter()
            .enumerate()
            .find(|(i, _)| *i != self.affix)
            .map(|x| x.1)
    }
}

/// The negation annotation of one cue: cue, target, negated marker, focus and scope as sets of token ids.
/// All sets keep sentence order.
///
/// Focus is expected to lie within the scope but this is not enforced, see [Frame::focus_outside_scope].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    id: FrameId,
    cue: IndexSet<String>,
    target: IndexSet<String>,
    negated: IndexSet<String>,
    focus: IndexSet<String>,
    scope: IndexSet<String>,
    split: Option<SplitWord>,
}

fn to_set<I, S>(tokens: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokens.into_iter().map(Into::into).collect()
}

impl Frame {
    /// Creates a frame for the given cue tokens. The target defaults to the cue.
    pub fn new<I, S>(id: FrameId, cue: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cue = to_set(cue);

        Frame {
            id,
            target: cue.clone(),
            cue,
            negated: IndexSet::new(),
            focus: IndexSet::new(),
            scope: IndexSet::new(),
            split: None,
        }
    }

    pub fn with_target<I: IntoIterator<Item = S>, S: Into<String>>(mut self, tokens: I) -> Self {
        self.target = to_set(tokens);
        self
    }

    pub fn with_negated<I: IntoIterator<Item = S>, S: Into<String>>(mut self, tokens: I) -> Self {
        self.negated = to_set(tokens);
        self
    }

    pub fn with_focus<I: IntoIterator<Item = S>, S: Into<String>>(mut self, tokens: I) -> Self {
        self.focus = to_set(tokens);
        self
    }

    pub fn with_scope<I: IntoIterator<Item = S>, S: Into<String>>(mut self, tokens: I) -> Self {
        self.scope = to_set(tokens);
        self
    }

    pub fn with_split(mut self, split: SplitWord) -> Self {
        self.split = Some(split);
        self
    }

    pub fn id(&self) -> &FrameId {
        &self.id
    }

    /// The tokens which triggered this frame. Never empty for frames built by the resolver.
    pub fn cue(&self) -> &IndexSet<String> {
        &self.cue
    }

    /// The tokens literally carrying the negation: the cue plus the second word of multi word cues.
    pub fn target(&self) -> &IndexSet<String> {
        &self.target
    }

    pub fn negated(&self) -> &IndexSet<String> {
        &self.negated
    }

    pub fn focus(&self) -> &IndexSet<String> {
        &self.focus
    }

    pub fn scope(&self) -> &IndexSet<String> {
        &self.scope
    }

    /// The split word if this frame was triggered by an affix.
    pub fn split(&self) -> Option<&SplitWord> {
        self.split.as_ref()
    }

    /// Focus tokens which are not part of the scope. Non-empty output is a data quality signal, not an error.
    pub fn focus_outside_scope(&self) -> Vec<&str> {
        self.focus
            .iter()
            .filter(|x| !self.scope.contains(*x))
            .map(|x| x.as_str())
            .collect()
    }
}

/// Side table mapping token ids to the frames they are cue or target of.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Membership {
    frames: HashMap<String, Vec<FrameId>>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the cue and target tokens of a frame.
    pub fn insert(&mut self, frame: &Frame) {
        for token in frame.cue.iter().chain(frame.target.iter()) {
            let ids = self.frames.entry(token.clone()).or_insert_with(Vec::new);
            if !ids.contains(&frame.id) {
                ids.push(frame.id.clone());
            }
        }
    }

    /// Whether the token already triggers a frame.
    pub fn contains(&self, token_id: &str) -> bool {
        self.frames.contains_key(token_id)
    }

    pub fn frames_of(&self, token_id: &str) -> &[FrameId] {
        self.frames.get(token_id).map_or(&[][..], |x| x.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_part_order_follows_surface() {
        let prefix = SplitWord::new("s1_3", "un", "glücklich", true);
        assert_eq!(prefix.affix().unwrap().word, "un");
        assert_eq!(prefix.affix().unwrap().id, "s1_3_s0");
        assert_eq!(prefix.stem().unwrap().id, "s1_3_s1");

        let suffix = SplitWord::new("s1_7", "los", "zweifel", false);
        assert_eq!(suffix.affix().unwrap().id, "s1_7_s1");
        assert_eq!(suffix.stem().unwrap().word, "zweifel");
    }

    #[test]
    fn target_defaults_to_cue() {
        let frame = Frame::new(FrameId::nth("s4", 0), vec!["s4_2"]);

        assert_eq!(frame.id().as_str(), "s4_f1");
        assert_eq!(frame.target(), frame.cue());
        assert_eq!(frame.id().element(3), "s4_f1_e3");
    }

    #[test]
    fn focus_outside_scope_is_reported() {
        let frame = Frame::new(FrameId::new("f"), vec!["1"])
            .with_scope(vec!["1", "2"])
            .with_focus(vec!["2", "3"]);

        assert_eq!(frame.focus_outside_scope(), vec!["3"]);
    }

    #[test]
    fn membership_tracks_cue_and_target() {
        let frame = Frame::new(FrameId::new("s1_f1"), vec!["s1_1"]).with_target(vec!["s1_1", "s1_4"]);
        let mut membership = Membership::new();
        membership.insert(&frame);

        assert!(membership.contains("s1_4"));
        assert!(!membership.contains("s1_2"));
        assert_eq!(membership.frames_of("s1_1"), &[FrameId::new("s1_f1")]);
    }
}
