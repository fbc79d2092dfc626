//! Parses documents into [Document]s, including the negation frames of the semantics layer.

use indexmap::IndexSet;
use log::warn;
use roxmltree::Node;
use std::{collections::HashMap, path::Path};

use super::{
    document_id,
    heads::{ChildEdge, Constituency, UNATTACHED_RELATION},
};
use crate::{
    frame::{Frame, FrameId, SplitPart, SplitWord},
    types::{DependencyEdge, Document, Sentence, Token},
    Error,
};

/// Whether a frame name denotes a negation frame.
pub fn is_negation_frame(name: &str) -> bool {
    name.to_lowercase().contains("negation")
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |x| x.is_element() && x.tag_name().name() == name)
}

fn element<'a, 'input: 'a>(node: Node<'a, 'input>, name: &'a str) -> Option<Node<'a, 'input>> {
    elements(node, name).next()
}

fn required<'a>(
    node: Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str, Error> {
    node.attribute(attribute)
        .ok_or(Error::MissingAttribute { element, attribute })
}

/// Reads a document from disk. The document id is the file stem.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Document, Error> {
    let path = path.as_ref();
    let xml = fs_err::read_to_string(path)?;

    parse_document(document_id(path), &xml)
}

/// Parses a document from a string.
///
/// Dependency edges are taken from `head` / `deprel` attributes of the terminals if present,
/// otherwise derived from the nonterminals by head percolation.
///
/// # Errors
/// - If the XML is not well formed.
/// - If a sentence, terminal or splitword lacks an id (or a terminal its word).
pub fn parse_document<S: Into<String>>(id: S, xml: &str) -> Result<Document, Error> {
    let id = id.into();
    let document = roxmltree::Document::parse(xml)?;

    let sentences = document
        .descendants()
        .filter(|x| x.is_element() && x.tag_name().name() == "s")
        .map(|x| read_sentence(&id, x))
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(Document::new(id, sentences))
}

fn head_edges(tokens: &[Token], terminals: &[Node]) -> Vec<DependencyEdge> {
    terminals
        .iter()
        .zip(tokens)
        .filter_map(|(terminal, token)| {
            let head = terminal.attribute("head").filter(|x| !x.is_empty() && *x != "0")?;

            // heads are either token ids or one-based indices
            let head = if tokens.iter().any(|x| x.id() == head) {
                head.to_string()
            } else {
                match head.parse::<usize>() {
                    Ok(i) if i >= 1 && i <= tokens.len() => tokens[i - 1].id().to_string(),
                    _ => head.to_string(),
                }
            };

            Some(DependencyEdge::new(
                head,
                token.id().to_string(),
                terminal
                    .attribute("deprel")
                    .unwrap_or(UNATTACHED_RELATION)
                    .to_string(),
            ))
        })
        .collect()
}

struct RawSplit {
    host: String,
    parts: Vec<SplitPart>,
    affix: usize,
}

/// Resolves frame element references to token ids.
struct References<'a> {
    document_id: &'a str,
    positions: HashMap<&'a str, usize>,
    parts: HashMap<String, (usize, usize)>,
    splits: &'a [RawSplit],
    constituency: &'a Constituency,
}

impl<'a> References<'a> {
    fn resolve(&self, idref: &str, frame_id: &str) -> Vec<String> {
        if self.positions.contains_key(idref) {
            vec![idref.to_string()]
        } else if let Some((split, _)) = self.parts.get(idref) {
            vec![self.splits[*split].host.clone()]
        } else if self.constituency.is_nonterminal(idref) {
            self.constituency.terminal_yield(idref)
        } else {
            warn!(
                "{}: frame {} references unknown node '{}', dropping it",
                self.document_id, frame_id, idref
            );
            Vec::new()
        }
    }

    fn resolve_all<'n>(&self, node: Node<'n, '_>, frame_id: &str) -> IndexSet<String> {
        let mut tokens: Vec<String> = elements(node, "fenode")
            .filter_map(|x| x.attribute("idref"))
            .flat_map(|x| self.resolve(x, frame_id))
            .collect();

        tokens.sort_by_key(|x| self.positions.get(x.as_str()).copied());
        tokens.into_iter().collect()
    }
}

fn read_sentence(document_id: &str, node: Node) -> Result<Sentence, Error> {
    let id = required(node, "s", "id")?;
    let graph = element(node, "graph");

    let terminals: Vec<Node> = graph
        .and_then(|x| element(x, "terminals"))
        .map(|x| elements(x, "t").collect())
        .unwrap_or_default();

    let tokens = terminals
        .iter()
        .map(|x| -> Result<Token, Error> {
            Ok(Token::new(
                required(*x, "t", "id")?,
                required(*x, "t", "word")?,
                x.attribute("lemma").unwrap_or(""),
                x.attribute("pos").unwrap_or(""),
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut constituency = Constituency::new(
        tokens.iter().map(|x| x.id().to_string()).collect(),
        graph.and_then(|x| x.attribute("root")).map(Into::into),
    );
    if let Some(nonterminals) = graph.and_then(|x| element(x, "nonterminals")) {
        for nonterminal in elements(nonterminals, "nt") {
            let edges = elements(nonterminal, "edge")
                .map(|x| -> Result<ChildEdge, Error> {
                    Ok(ChildEdge {
                        label: x.attribute("label").unwrap_or(UNATTACHED_RELATION).to_string(),
                        child: required(x, "edge", "idref")?.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;

            constituency.add_nonterminal(required(nonterminal, "nt", "id")?.to_string(), edges);
        }
    }

    let edges = if terminals.iter().any(|x| x.attribute("head").is_some()) {
        head_edges(&tokens, &terminals)
    } else {
        constituency.dependencies()
    };

    let sem = element(node, "sem");

    let mut splits = Vec::new();
    if let Some(splitwords) = sem.and_then(|x| element(x, "splitwords")) {
        for splitword in elements(splitwords, "splitword") {
            let parts = elements(splitword, "part")
                .map(|x| -> Result<SplitPart, Error> {
                    Ok(SplitPart {
                        id: required(x, "part", "id")?.to_string(),
                        word: x.attribute("word").unwrap_or("").to_string(),
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;

            splits.push(RawSplit {
                host: required(splitword, "splitword", "idref")?.to_string(),
                parts,
                affix: 0,
            });
        }
    }

    let mut references = References {
        document_id,
        positions: tokens
            .iter()
            .enumerate()
            .map(|(i, x)| (x.id(), i))
            .collect(),
        parts: HashMap::new(),
        splits: &[],
        constituency: &constituency,
    };
    for (i, split) in splits.iter().enumerate() {
        for (j, part) in split.parts.iter().enumerate() {
            references.parts.insert(part.id.clone(), (i, j));
        }
    }

    let mut frames = Vec::new();
    let mut affixes = HashMap::new();

    if let Some(frame_nodes) = sem.and_then(|x| element(x, "frames")) {
        references.splits = &splits;

        for frame_node in elements(frame_nodes, "frame")
            .filter(|x| is_negation_frame(x.attribute("name").unwrap_or("")))
        {
            let frame_id = frame_node
                .attribute("id")
                .map(FrameId::new)
                .unwrap_or_else(|| FrameId::nth(id, frames.len()));

            let target_node = element(frame_node, "target");
            let target = target_node
                .map(|x| references.resolve_all(x, frame_id.as_str()))
                .unwrap_or_default();

            if target.is_empty() {
                warn!(
                    "{}: negation frame {} in sentence {} has no target, skipping it",
                    document_id, frame_id, id
                );
                continue;
            }

            let mut frame = Frame::new(frame_id.clone(), target.iter().take(1).cloned())
                .with_target(target);

            // the target of an affix cue refers to the affix part of a split word
            let affix_part = target_node
                .into_iter()
                .flat_map(|x| elements(x, "fenode"))
                .filter_map(|x| x.attribute("idref"))
                .find_map(|x| references.parts.get(x).copied());
            if let Some((split, part)) = affix_part {
                affixes.insert(split, part);
                frame = frame.with_split(SplitWord::from_parts(
                    &splits[split].host,
                    splits[split].parts.clone(),
                    part,
                ));
            }

            for fe in elements(frame_node, "fe") {
                let tokens = references.resolve_all(fe, frame_id.as_str());

                frame = match fe.attribute("name").unwrap_or("").to_lowercase().as_str() {
                    "focus" => frame.with_focus(tokens),
                    "negated" => frame.with_negated(tokens),
                    "scope" => frame.with_scope(tokens),
                    _ => frame,
                };
            }

            frames.push(frame);
        }
    }

    let splits = splits
        .into_iter()
        .enumerate()
        .map(|(i, split)| {
            let affix = affixes.get(&i).copied().unwrap_or(split.affix);
            SplitWord::from_parts(&split.host, split.parts, affix)
        })
        .collect();

    Ok(Sentence::new(id, tokens, edges).with_annotations(splits, frames))
}
