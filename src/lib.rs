//! Rule-based negation detection over dependency-annotated treebank sentences.
//! # Overview
//!
//! negation has the following core abstractions:
//! - A [Sentence][types::Sentence] holding the ordered [Token][types::Token]s and the dependency edges of one sentence.
//! - A [CueLexicon][lexicon::CueLexicon] which classifies word forms as negation cues.
//! - A [Resolver][resolver::Resolver] which finds the cues of a sentence and computes scope, focus, negated marker and target for each of them.
//!   The result of one cue is a [Frame][frame::Frame].
//! - An [Evaluation][evaluate::Evaluation] comparing gold frames against predicted ones.
//!
//! Reading and writing the treebank XML lives in [corpus], applying the resolver to whole documents in [annotate].
//!
//! # Examples
//!
//! Resolve the negation of a sentence:
//!
//! ```
//! use negation::lexicon::CueLexicon;
//! use negation::resolver::{Resolver, ResolverOptions};
//! use negation::types::{DependencyEdge, Sentence, Token};
//!
//! let sentence = Sentence::new(
//!     "s1",
//!     vec![
//!         Token::new("s1_1", "Der", "der", "ART"),
//!         Token::new("s1_2", "Hund", "Hund", "NN"),
//!         Token::new("s1_3", "bellt", "bellen", "VVFIN"),
//!         Token::new("s1_4", "nicht", "nicht", "PTKNEG"),
//!         Token::new("s1_5", ".", "--", "$."),
//!     ],
//!     vec![
//!         DependencyEdge::new("s1_2", "s1_1", "NK"),
//!         DependencyEdge::new("s1_3", "s1_2", "SB"),
//!         DependencyEdge::new("s1_3", "s1_4", "NG"),
//!         DependencyEdge::new("s1_3", "s1_5", "--"),
//!     ],
//! );
//!
//! let resolver = Resolver::new(CueLexicon::german(), ResolverOptions::default());
//! let resolution = resolver.resolve(&sentence)?;
//!
//! let frame = &resolution.frames()[0];
//! assert_eq!(frame.target().iter().collect::<Vec<_>>(), vec!["s1_4"]);
//! assert_eq!(frame.scope().len(), 4);
//! # Ok::<(), negation::Error>(())
//! ```
//!
//! Evaluate a directory of annotated documents against gold annotations:
//!
//! ```no_run
//! use negation::{corpus::WorkList, evaluate};
//!
//! let gold = WorkList::from_dir("res/xml/train")?;
//! let report = evaluate::evaluate_corpus(&gold, "res/xml/train/output/tagged")?;
//! println!("{}", report);
//! # Ok::<(), negation::Error>(())
//! ```

use std::io;

use thiserror::Error;

pub mod annotate;
pub mod corpus;
pub mod evaluate;
pub mod extract;
pub mod frame;
pub mod lexicon;
pub mod resolver;
pub mod stats;
pub mod tree;
pub mod types;
pub(crate) mod utils;

#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Error parsing an input document.
    #[error(transparent)]
    Xml(#[from] roxmltree::Error),
    #[error(transparent)]
    XmlRead(#[from] xml::reader::Error),
    #[error(transparent)]
    XmlWrite(#[from] xml::writer::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The dependency structure of a sentence is not a tree.
    #[error(transparent)]
    Malformed(#[from] tree::Error),
    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("invalid lexicon entry on line {line}: {message}")]
    Lexicon { line: usize, message: String },
    #[error("invalid tabular data on line {line}: {message}")]
    Conll { line: usize, message: String },
    #[error("gold document has {gold} sentences, predicted document has {predicted} (or their ids differ)")]
    SentenceMismatch { gold: usize, predicted: usize },
}
