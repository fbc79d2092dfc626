//! Collects the cue words of annotated documents, e. g. to build a lexicon from a gold corpus.

use std::{collections::BTreeSet, io::Write};

use crate::{
    lexicon::{CueCategory, CueLexicon, CueLexiconEntry},
    types::Document,
    Error,
};

/// Lowercased cue words found in negation frames. All sets are sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedCues {
    pub words: BTreeSet<String>,
    /// Word and part-of-speech tag.
    pub word_pos: BTreeSet<(String, String)>,
    /// Hosts of split words i. e. words negated by an affix.
    pub affix_words: BTreeSet<String>,
    /// First and second word of targets spanning two tokens.
    pub pairs: BTreeSet<(String, String)>,
}

/// Collects the target words of all frames of the documents.
pub fn extract_cues<'a, I>(documents: I) -> ExtractedCues
where
    I: IntoIterator<Item = &'a Document>,
{
    let mut cues = ExtractedCues::default();

    for sentence in documents.into_iter().flat_map(|x| x.sentences()) {
        for frame in sentence.frames() {
            let tokens: Vec<_> = frame
                .target()
                .iter()
                .filter_map(|id| sentence.token(id))
                .collect();

            for token in &tokens {
                cues.words.insert(token.lower().to_string());
                cues.word_pos
                    .insert((token.lower().to_string(), token.pos().to_string()));
            }

            if let [first, second] = tokens.as_slice() {
                cues.pairs
                    .insert((first.lower().to_string(), second.lower().to_string()));
            }
        }

        for split in sentence.splits() {
            if let Some(token) = sentence.token(split.token()) {
                cues.affix_words.insert(token.lower().to_string());
                cues.words.insert(token.lower().to_string());
            }
        }
    }

    cues
}

impl CueLexicon {
    /// Builds a lexicon from extracted cues, with the affix rules and exceptions of [CueLexicon::german].
    /// Words only seen as the second word of a pair are not added on their own.
    pub fn from_extracted(cues: &ExtractedCues) -> Self {
        let german = CueLexicon::german();
        let mut lexicon = CueLexicon::empty(german.affixes().to_vec(), german.exceptions().to_vec());

        let partners: BTreeSet<&str> = cues.pairs.iter().map(|x| x.1.as_str()).collect();

        for word in &cues.words {
            if partners.contains(word.as_str()) {
                continue;
            }

            let category = if cues.affix_words.contains(word) {
                CueCategory::AffixCue
            } else {
                CueCategory::Cue
            };
            lexicon.insert(CueLexiconEntry::new(word.as_str(), None, category));
        }

        for (first, second) in &cues.pairs {
            lexicon.insert(
                CueLexiconEntry::new(first.as_str(), None, CueCategory::MultiWordCue)
                    .with_partner(second.as_str()),
            );
        }

        lexicon
    }
}

/// Writes one word per line to `plain` and `word\tPOS` lines to `pos`, if given.
pub fn write_lists<W1: Write, W2: Write>(
    cues: &ExtractedCues,
    mut plain: W1,
    pos: Option<W2>,
) -> Result<(), Error> {
    for word in &cues.words {
        writeln!(plain, "{}", word)?;
    }

    if let Some(mut pos) = pos {
        for (word, tag) in &cues.word_pos {
            writeln!(pos, "{}\t{}", word, tag)?;
        }
    }

    Ok(())
}
