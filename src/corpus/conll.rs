//! The tabular exchange format with external dependency parsers.
//!
//! One token per line with the tab separated columns `index form lemma pos head deprel`, `_` marking
//! empty fields, and a blank line after each sentence. Parser output in the CoNLL-X / CoNLL-U (10 columns)
//! and CoNLL-2009 (12 or more columns) layouts is read as well.

use log::warn;
use std::io::{BufRead, Write};

use super::heads::UNATTACHED_RELATION;
use crate::{
    tree::DependencyTree,
    types::{DependencyEdge, Document},
    Error,
};

const EMPTY: &str = "_";

fn field(value: &str) -> &str {
    if value.is_empty() {
        EMPTY
    } else {
        value
    }
}

/// Writes all sentences of a document. Head and relation are filled in if the sentence has a valid dependency tree.
pub fn write_sentences<W: Write>(document: &Document, mut out: W) -> Result<(), Error> {
    for sentence in document.sentences() {
        let tree = if sentence.edges().is_empty() {
            None
        } else {
            DependencyTree::new(sentence).ok()
        };

        for (i, token) in sentence.tokens().iter().enumerate() {
            let (head, relation) = match &tree {
                Some(tree) => match tree.head(i) {
                    Some(head) => ((head + 1).to_string(), field(tree.relation(i)).to_string()),
                    None => ("0".to_string(), UNATTACHED_RELATION.to_string()),
                },
                None => (EMPTY.to_string(), EMPTY.to_string()),
            };

            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                i + 1,
                field(token.word()),
                field(token.lemma()),
                field(token.pos()),
                head,
                relation
            )?;
        }
        writeln!(out)?;
    }

    Ok(())
}

/// One token of a parsed sentence. `head` is one-based, zero marks the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken {
    pub form: String,
    pub head: usize,
    pub relation: String,
}

pub type ParsedSentence = Vec<ParsedToken>;

/// Column indices of form, head and relation (with the predicted fallback columns of CoNLL-2009).
fn layout(n_columns: usize) -> Option<(usize, (usize, Option<usize>), (usize, Option<usize>))> {
    match n_columns {
        n if n >= 12 => Some((1, (8, Some(9)), (10, Some(11)))),
        10 | 11 => Some((1, (6, None), (7, None))),
        6..=9 => Some((1, (4, None), (5, None))),
        _ => None,
    }
}

fn pick<'a>(columns: &[&'a str], (gold, predicted): (usize, Option<usize>)) -> &'a str {
    match (columns[gold], predicted) {
        (EMPTY, Some(predicted)) => columns[predicted],
        (value, _) => value,
    }
}

/// Reads parsed sentences. Comment lines (`#`) and multiword token ranges (`1-2`) are skipped.
///
/// # Errors
/// If a line has too few columns or a head which is not a number.
pub fn read_parse<R: BufRead>(reader: R) -> Result<Vec<ParsedSentence>, Error> {
    let mut sentences = Vec::new();
    let mut current = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();

        if line.is_empty() {
            if !current.is_empty() {
                sentences.push(std::mem::take(&mut current));
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns[0].contains('-') || columns[0].contains('.') {
            continue;
        }

        let (form, head, relation) = layout(columns.len()).ok_or_else(|| Error::Conll {
            line: i + 1,
            message: format!("expected at least 6 columns, found {}", columns.len()),
        })?;

        let head = match pick(&columns, head) {
            EMPTY => 0,
            x => x.parse::<usize>().map_err(|_| Error::Conll {
                line: i + 1,
                message: format!("invalid head '{}'", x),
            })?,
        };

        current.push(ParsedToken {
            form: columns[form].to_string(),
            head,
            relation: pick(&columns, relation).to_string(),
        });
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    Ok(sentences)
}

/// Replaces the dependency edges of the sentences of `document` with parsed ones, pairing sentences by order.
/// Sentences whose parse does not fit (token count, head out of range) keep their edges.
///
/// Returns the number of sentences which got new edges.
pub fn merge_parse(document: &mut Document, parses: &[ParsedSentence]) -> usize {
    if document.sentences().len() != parses.len() {
        warn!(
            "{}: {} sentences but {} parses, merging the common prefix",
            document.id(),
            document.sentences().len(),
            parses.len()
        );
    }

    let document_id = document.id().to_string();
    let mut merged = 0;

    for (sentence, parse) in document.sentences_mut().iter_mut().zip(parses) {
        let tokens = sentence.tokens();

        if tokens.len() != parse.len() || parse.iter().any(|x| x.head > tokens.len()) {
            warn!(
                "{}: parse of sentence {} does not fit its {} tokens, keeping its edges",
                document_id,
                sentence.id(),
                tokens.len()
            );
            continue;
        }

        let edges = parse
            .iter()
            .zip(tokens)
            .filter(|(parsed, _)| parsed.head > 0)
            .map(|(parsed, token)| {
                DependencyEdge::new(
                    tokens[parsed.head - 1].id().to_string(),
                    token.id().to_string(),
                    parsed.relation.clone(),
                )
            })
            .collect();

        sentence.set_edges(edges);
        merged += 1;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::parse_document;

    const SOURCE: &str = r#"<corpus>
  <s id="s1">
    <graph>
      <terminals>
        <t id="s1_1" word="Er" lemma="er" pos="PPER"/>
        <t id="s1_2" word="schläft" lemma="schlafen" pos="VVFIN"/>
        <t id="s1_3" word="nicht" lemma="nicht" pos="PTKNEG"/>
      </terminals>
    </graph>
  </s>
</corpus>"#;

    #[test]
    fn writes_placeholders_without_edges() {
        let document = parse_document("doc", SOURCE).unwrap();
        let mut out = Vec::new();
        write_sentences(&document, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1\tEr\ter\tPPER\t_\t_\n2\tschläft\tschlafen\tVVFIN\t_\t_\n3\tnicht\tnicht\tPTKNEG\t_\t_\n\n"
        );
    }

    #[test]
    fn merged_parse_is_written_back() {
        let mut document = parse_document("doc", SOURCE).unwrap();
        let parse = "1\tEr\ter\tPPER\t2\tSB\n2\tschläft\tschlafen\tVVFIN\t0\t--\n3\tnicht\tnicht\tPTKNEG\t2\tNG\n\n";

        let parses = read_parse(parse.as_bytes()).unwrap();
        assert_eq!(merge_parse(&mut document, &parses), 1);
        assert_eq!(
            document.sentences()[0].edges(),
            &[
                DependencyEdge::new("s1_2", "s1_1", "SB"),
                DependencyEdge::new("s1_2", "s1_3", "NG"),
            ]
        );

        let mut out = Vec::new();
        write_sentences(&document, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), parse);
    }

    #[test]
    fn reads_conll_2009() {
        let parse = "# sent_id = 1\n1\tEr\ter\ter\tPPER\tPPER\t_\t_\t_\t2\t_\tSB\n2\tschläft\tschlafen\tschlafen\tVVFIN\tVVFIN\t_\t_\t0\t0\t--\t--\n";
        let parses = read_parse(parse.as_bytes()).unwrap();

        assert_eq!(parses.len(), 1);
        assert_eq!(parses[0][0].head, 2);
        assert_eq!(parses[0][0].relation, "SB");
        assert_eq!(parses[0][1].head, 0);
    }

    #[test]
    fn mismatched_parse_keeps_edges() {
        let mut document = parse_document("doc", SOURCE).unwrap();
        let parses = read_parse("1\tEr\ter\tPPER\t0\t--\n".as_bytes()).unwrap();

        assert_eq!(merge_parse(&mut document, &parses), 0);
        assert!(document.sentences()[0].edges().is_empty());
    }

    #[test]
    fn invalid_head_is_an_error() {
        let error = read_parse("1\tEr\ter\tPPER\tx\tSB\n".as_bytes()).unwrap_err();
        assert!(matches!(error, Error::Conll { line: 1, .. }));
    }
}
