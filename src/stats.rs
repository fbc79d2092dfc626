//! Per-document listings of the tokens in each negation frame, one text file per document.
//!
//! A sentence with split words is listed per split word, followed by the frames targeting it.
//! The remaining frames of a sentence are listed in a scope/focus section.

use log::{info, warn};
use std::{
    fmt,
    io::{BufWriter, Write},
    path::Path,
};

use crate::{
    annotate::{self, CorpusSummary, Stats},
    corpus::{self, WorkList},
    frame::{Frame, FrameId, SplitPart},
    types::{Document, Sentence},
    Error,
};

/// The frame element a token is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Target,
    Negated,
    Scope,
    Focus,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Target, Role::Negated, Role::Scope, Role::Focus];

    fn tokens(self, frame: &Frame) -> impl Iterator<Item = &String> {
        let tokens = match self {
            Role::Target => frame.target(),
            Role::Negated => frame.negated(),
            Role::Scope => frame.scope(),
            Role::Focus => frame.focus(),
        };
        tokens.iter()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Target => "TARGET",
            Role::Negated => "NEGATED",
            Role::Scope => "SCOPE",
            Role::Focus => "FOCUS",
        };
        write!(f, "{}", name)
    }
}

/// A token or split word part. Parts have no tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub id: String,
    pub word: String,
    pub pos: Option<String>,
}

impl TokenInfo {
    fn lookup(sentence: &Sentence, id: &str) -> Option<Self> {
        if let Some(token) = sentence.token(id) {
            return Some(TokenInfo {
                id: id.to_string(),
                word: token.word().to_string(),
                pos: Some(token.pos().to_string()),
            });
        }

        sentence
            .splits()
            .iter()
            .flat_map(|x| x.parts())
            .find(|x| x.id == id)
            .map(|part| TokenInfo {
                id: part.id.clone(),
                word: part.word.clone(),
                pos: None,
            })
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.id, self.word)?;
        if let Some(pos) = &self.pos {
            write!(f, "\t{}", pos)?;
        }
        Ok(())
    }
}

/// The tokens of one frame, target first, then negated marker, scope and focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameStats {
    pub id: FrameId,
    pub entries: Vec<(Role, TokenInfo)>,
}

impl FrameStats {
    fn new(sentence: &Sentence, frame: &Frame) -> Self {
        let mut entries = Vec::new();

        for role in Role::ALL.iter() {
            for id in role.tokens(frame) {
                match TokenInfo::lookup(sentence, id) {
                    Some(info) => entries.push((*role, info)),
                    None => warn!(
                        "frame {} in sentence {} refers to unknown token {}",
                        frame.id(),
                        sentence.id(),
                        id
                    ),
                }
            }
        }

        FrameStats {
            id: frame.id().clone(),
            entries,
        }
    }

    pub fn role(&self, role: Role) -> impl Iterator<Item = &TokenInfo> {
        self.entries
            .iter()
            .filter(move |(x, _)| *x == role)
            .map(|(_, info)| info)
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        for (role, info) in &self.entries {
            write!(f, "{}\t{}\t{}", info.id, role, info.word)?;
            if let Some(pos) = &info.pos {
                write!(f, "\t{}", pos)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// A split word with its parts and the frames whose target is the word or one of its parts.
    SplitWord {
        word: TokenInfo,
        parts: Vec<SplitPart>,
        frames: Vec<FrameStats>,
    },
    /// Frames of a sentence not targeting a split word.
    Frames(Vec<FrameStats>),
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::SplitWord {
                word,
                parts,
                frames,
            } => {
                writeln!(f, "\n=SPLITWORDS=")?;
                writeln!(f, "{}", word)?;
                for part in parts {
                    writeln!(f, "{}\t{}", part.id, part.word)?;
                }
                frames.iter().try_for_each(|x| write!(f, "{}", x))
            }
            Section::Frames(frames) => {
                writeln!(f, "\n=SCOPE/FOCUS=")?;
                frames.iter().try_for_each(|x| write!(f, "{}", x))
            }
        }
    }
}

/// The statistics of one document. Sentences without frames and split words have no section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub id: String,
    pub sections: Vec<Section>,
}

impl DocumentStats {
    pub fn frames(&self) -> usize {
        self.sections
            .iter()
            .map(|x| match x {
                Section::SplitWord { frames, .. } | Section::Frames(frames) => frames.len(),
            })
            .sum()
    }
}

impl fmt::Display for DocumentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.sections.iter().try_for_each(|x| write!(f, "{}", x))
    }
}

pub fn document_stats(document: &Document) -> DocumentStats {
    let mut sections = Vec::new();

    for sentence in document.sentences() {
        let mut listed = vec![false; sentence.frames().len()];

        for split in sentence.splits() {
            let word = match TokenInfo::lookup(sentence, split.token()) {
                Some(word) => word,
                None => {
                    warn!(
                        "{}: split word of unknown token {} in sentence {}",
                        document.id(),
                        split.token(),
                        sentence.id()
                    );
                    continue;
                }
            };

            let targets_split = |frame: &Frame| {
                frame.target().iter().any(|id| {
                    id == split.token() || split.parts().iter().any(|part| &part.id == id)
                })
            };

            let frames = sentence
                .frames()
                .iter()
                .enumerate()
                .filter(|(_, frame)| targets_split(*frame))
                .map(|(i, frame)| {
                    listed[i] = true;
                    FrameStats::new(sentence, frame)
                })
                .collect();

            sections.push(Section::SplitWord {
                word,
                parts: split.parts().to_vec(),
                frames,
            });
        }

        let frames: Vec<_> = sentence
            .frames()
            .iter()
            .zip(&listed)
            .filter(|(_, listed)| !**listed)
            .map(|(frame, _)| FrameStats::new(sentence, frame))
            .collect();

        if !frames.is_empty() {
            sections.push(Section::Frames(frames));
        }
    }

    DocumentStats {
        id: document.id().to_string(),
        sections,
    }
}

/// Writes the statistics of the document at `input` to `output`.
pub fn stats_file(input: &Path, output: &Path) -> Result<Stats, Error> {
    let document = corpus::read_document(input)?;
    let stats = document_stats(&document);

    let mut writer = BufWriter::new(fs_err::File::create(output)?);
    write!(writer, "{}", stats)?;
    writer.flush()?;

    Ok(Stats {
        sentences: document.sentences().len(),
        frames: stats.frames(),
        ..Stats::default()
    })
}

/// Writes the statistics of every document of the work list to `out_dir/<id>.stats.txt`.
pub fn stats_corpus(list: &WorkList, out_dir: &Path) -> Result<CorpusSummary, Error> {
    let summary = annotate::run(list, out_dir, "stats.txt", stats_file)?;

    info!(
        "Wrote statistics of {} documents ({} failed) to {}",
        summary.documents,
        summary.failed.len(),
        out_dir.display()
    );
    Ok(summary)
}
