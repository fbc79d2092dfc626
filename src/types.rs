//! Fundamental types used by this crate.

use serde::{Deserialize, Serialize};

use crate::frame::{Frame, SplitWord};

/// A terminal of a sentence i. e. the surface word with its lemma and part-of-speech tag.
/// Tokens are immutable once the sentence is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    id: String,
    word: String,
    lemma: String,
    pos: String,
    lower: String,
}

impl Token {
    pub fn new<S: Into<String>>(id: S, word: S, lemma: S, pos: S) -> Self {
        let word = word.into();

        Token {
            id: id.into(),
            lower: word.to_lowercase(),
            word,
            lemma: lemma.into(),
            pos: pos.into(),
        }
    }

    /// The document-unique id of this token.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The surface form.
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The surface form in lowercase.
    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn lemma(&self) -> &str {
        &self.lemma
    }

    pub fn pos(&self) -> &str {
        &self.pos
    }
}

/// A labeled edge from a head token to one of its dependents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub head: String,
    pub dependent: String,
    pub relation: String,
}

impl DependencyEdge {
    pub fn new<S: Into<String>>(head: S, dependent: S, relation: S) -> Self {
        DependencyEdge {
            head: head.into(),
            dependent: dependent.into(),
            relation: relation.into(),
        }
    }
}

/// One sentence: ordered tokens, dependency edges and the negation frames attached to it.
/// The root token is the one token without an incoming edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    id: String,
    tokens: Vec<Token>,
    edges: Vec<DependencyEdge>,
    splits: Vec<SplitWord>,
    frames: Vec<Frame>,
}

impl Sentence {
    pub fn new<S: Into<String>>(id: S, tokens: Vec<Token>, edges: Vec<DependencyEdge>) -> Self {
        Sentence {
            id: id.into(),
            tokens,
            edges,
            splits: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Replaces the dependency edges e. g. with the output of an external parser.
    pub fn with_edges(mut self, edges: Vec<DependencyEdge>) -> Self {
        self.edges = edges;
        self
    }

    pub fn set_edges(&mut self, edges: Vec<DependencyEdge>) {
        self.edges = edges;
    }

    pub(crate) fn with_annotations(mut self, splits: Vec<SplitWord>, frames: Vec<Frame>) -> Self {
        self.splits = splits;
        self.frames = frames;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Gets the position of the token with the given id.
    pub fn position(&self, token_id: &str) -> Option<usize> {
        self.tokens.iter().position(|x| x.id == token_id)
    }

    pub fn token(&self, token_id: &str) -> Option<&Token> {
        self.tokens.iter().find(|x| x.id == token_id)
    }

    /// Split words of this sentence. For annotated sentences these are the hosts of affix cues.
    pub fn splits(&self) -> &[SplitWord] {
        &self.splits
    }

    /// The negation frames attached to this sentence.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Attaches frames, discarding any frames and split words attached before.
    pub fn set_frames(&mut self, frames: Vec<Frame>) {
        self.splits = frames.iter().filter_map(|x| x.split().cloned()).collect();
        self.frames = frames;
    }

    pub fn clear_frames(&mut self) {
        self.set_frames(Vec::new());
    }
}

/// A corpus document: its sentences in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    id: String,
    sentences: Vec<Sentence>,
}

impl Document {
    pub fn new<S: Into<String>>(id: S, sentences: Vec<Sentence>) -> Self {
        Document {
            id: id.into(),
            sentences,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn sentences_mut(&mut self) -> &mut [Sentence] {
        &mut self.sentences
    }

    pub fn sentence(&self, sentence_id: &str) -> Option<&Sentence> {
        self.sentences.iter().find(|x| x.id == sentence_id)
    }

    /// Iterates over all frames of all sentences in document order.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.sentences.iter().flat_map(|x| x.frames.iter())
    }
}
