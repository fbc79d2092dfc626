//! The cue lexicon: which word forms trigger a negation frame and how.
//!
//! Besides plain entries the lexicon knows affix rules (for words like *un|möglich* or *zweifel|los*)
//! and exception phrases which look like cues but are not negations e. g. *nicht nur*.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fmt,
    io::{BufRead, BufReader, Read},
    path::Path,
    str::FromStr,
};

use crate::Error;

/// Stems shorter than this are never split off an affix.
const MIN_STEM_CHARS: usize = 3;

/// How a word form takes part in a negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueCategory {
    /// Not a cue.
    None,
    /// A simple negation trigger e. g. *nicht*.
    Cue,
    /// Negation carried by a prefix or suffix of the word.
    AffixCue,
    /// The cue spans multiple tokens e. g. *weder ... noch*.
    MultiWordCue,
}

impl CueCategory {
    pub fn is_cue(&self) -> bool {
        *self != CueCategory::None
    }
}

impl FromStr for CueCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "none" => CueCategory::None,
            "cue" => CueCategory::Cue,
            "affix" | "affix_cue" => CueCategory::AffixCue,
            "multi" | "multi_word_cue" => CueCategory::MultiWordCue,
            x => return Err(format!("unknown cue category '{}'", x)),
        })
    }
}

impl fmt::Display for CueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CueCategory::None => "none",
            CueCategory::Cue => "cue",
            CueCategory::AffixCue => "affix",
            CueCategory::MultiWordCue => "multi",
        };
        write!(f, "{}", name)
    }
}

/// One lexicon entry. `word` is stored in lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CueLexiconEntry {
    pub word: String,
    /// If set, the entry only applies to tokens with exactly this part-of-speech tag.
    #[serde(default)]
    pub pos: Option<String>,
    pub category: CueCategory,
    /// The second word of a [CueCategory::MultiWordCue].
    #[serde(default)]
    pub partner: Option<String>,
}

impl CueLexiconEntry {
    pub fn new<S: Into<String>>(word: S, pos: Option<S>, category: CueCategory) -> Self {
        CueLexiconEntry {
            word: word.into().to_lowercase(),
            pos: pos.map(Into::into),
            category,
            partner: None,
        }
    }

    pub fn with_partner<S: Into<String>>(mut self, partner: S) -> Self {
        self.partner = Some(partner.into().to_lowercase());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffixPosition {
    Prefix,
    Suffix,
}

/// A negating affix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixRule {
    pub affix: String,
    pub position: AffixPosition,
    /// Part-of-speech tags the rule applies to. Empty means any.
    #[serde(default)]
    pub pos: Vec<String>,
    /// Part-of-speech tags for which words *not* in the lexicon are still taken as affix cues.
    #[serde(default)]
    pub guess_pos: Vec<String>,
}

impl AffixRule {
    fn new(affix: &str, position: AffixPosition, pos: &[&str], guess_pos: &[&str]) -> Self {
        AffixRule {
            affix: affix.to_string(),
            position,
            pos: pos.iter().map(|x| x.to_string()).collect(),
            guess_pos: guess_pos.iter().map(|x| x.to_string()).collect(),
        }
    }

    /// Splits `word` into (affix, stem) keeping the surface casing.
    fn split<'w>(&self, word: &'w str) -> Option<AffixMatch<'w>> {
        let lower = word.to_lowercase();
        let n_chars = word.chars().count();
        let affix_chars = self.affix.chars().count();

        // lowercasing must not change the length, otherwise char offsets do not carry over
        if lower.chars().count() != n_chars || n_chars < affix_chars + MIN_STEM_CHARS {
            return None;
        }

        let (is_match, boundary) = match self.position {
            AffixPosition::Prefix => (lower.starts_with(&self.affix), affix_chars),
            AffixPosition::Suffix => (lower.ends_with(&self.affix), n_chars - affix_chars),
        };
        if !is_match {
            return None;
        }

        let byte_boundary = word
            .char_indices()
            .nth(boundary)
            .map_or(word.len(), |x| x.0);
        let (first, second) = word.split_at(byte_boundary);

        Some(match self.position {
            AffixPosition::Prefix => AffixMatch {
                affix: first,
                stem: second,
                position: self.position,
            },
            AffixPosition::Suffix => AffixMatch {
                affix: second,
                stem: first,
                position: self.position,
            },
        })
    }
}

/// The result of splitting a word at a negating affix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AffixMatch<'w> {
    pub affix: &'w str,
    pub stem: &'w str,
    pub position: AffixPosition,
}

#[derive(Serialize, Deserialize)]
struct LexiconData {
    entries: Vec<CueLexiconEntry>,
    #[serde(default)]
    affixes: Vec<AffixRule>,
    #[serde(default)]
    exceptions: Vec<Vec<String>>,
}

/// Maps lowercased word forms to a [CueCategory].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "LexiconData", into = "LexiconData")]
pub struct CueLexicon {
    entries: HashMap<String, Vec<CueLexiconEntry>>,
    affixes: Vec<AffixRule>,
    exceptions: Vec<Vec<String>>,
}

impl From<LexiconData> for CueLexicon {
    fn from(data: LexiconData) -> Self {
        let mut lexicon = CueLexicon::empty(data.affixes, data.exceptions);
        for entry in data.entries {
            lexicon.insert(entry);
        }
        lexicon
    }
}

impl From<CueLexicon> for LexiconData {
    fn from(lexicon: CueLexicon) -> Self {
        let mut entries: Vec<_> = lexicon.entries.into_iter().flat_map(|x| x.1).collect();
        entries.sort_by(|a, b| (&a.word, &a.pos).cmp(&(&b.word, &b.pos)));

        LexiconData {
            entries,
            affixes: lexicon.affixes,
            exceptions: lexicon.exceptions,
        }
    }
}

const GERMAN_CUES: &[&str] = &[
    "nicht",
    "nichts",
    "nie",
    "niemals",
    "nimmer",
    "niemand",
    "nirgends",
    "nirgendwo",
    "nein",
    "kein",
    "keine",
    "keinen",
    "keinem",
    "keiner",
    "keines",
    "keinerlei",
    "keineswegs",
    "keinesfalls",
    "ohne",
];

const GERMAN_NON_CUES: &[&str] = &["nichtsdestotrotz", "nichtsdestoweniger"];

const GERMAN_EXCEPTIONS: &[&[&str]] = &[
    &["nicht", "nur"],
    &["nicht", "wahr"],
    &["nicht", "zuletzt"],
    &["nichts", "anderes", "als"],
];

/// Part-of-speech tags of words that can carry *un-* or *außer-*.
const UN_AUS_POS: &[&str] = &["ADJA", "ADJD", "NN", "VVFIN", "VVPP", "VVINF"];

lazy_static! {
    static ref GERMAN: CueLexicon = {
        let mut lexicon = CueLexicon::empty(
            vec![
                AffixRule::new("außer", AffixPosition::Prefix, UN_AUS_POS, &[]),
                AffixRule::new("un", AffixPosition::Prefix, UN_AUS_POS, &["ADJA", "ADJD"]),
                AffixRule::new("losen", AffixPosition::Suffix, &[], &[]),
                AffixRule::new("loser", AffixPosition::Suffix, &[], &[]),
                AffixRule::new("loses", AffixPosition::Suffix, &[], &[]),
                AffixRule::new("lose", AffixPosition::Suffix, &[], &[]),
                AffixRule::new("frei", AffixPosition::Suffix, &[], &[]),
                AffixRule::new("los", AffixPosition::Suffix, &[], &[]),
            ],
            GERMAN_EXCEPTIONS
                .iter()
                .map(|phrase| phrase.iter().map(|x| x.to_string()).collect())
                .collect(),
        );

        for word in GERMAN_CUES {
            lexicon.insert(CueLexiconEntry::new(*word, None, CueCategory::Cue));
        }
        for word in GERMAN_NON_CUES {
            lexicon.insert(CueLexiconEntry::new(*word, None, CueCategory::None));
        }
        lexicon.insert(
            CueLexiconEntry::new("weder", None, CueCategory::MultiWordCue).with_partner("noch"),
        );

        lexicon
    };
}

impl CueLexicon {
    /// Creates a lexicon without entries.
    pub fn empty(mut affixes: Vec<AffixRule>, exceptions: Vec<Vec<String>>) -> Self {
        // longest affix first so that e. g. "-lose" wins over "-los"
        affixes.sort_by(|a, b| b.affix.chars().count().cmp(&a.affix.chars().count()));

        CueLexicon {
            entries: HashMap::new(),
            affixes,
            exceptions: exceptions
                .into_iter()
                .filter(|x| !x.is_empty())
                .map(|phrase| phrase.into_iter().map(|x| x.to_lowercase()).collect())
                .collect(),
        }
    }

    /// The built-in German lexicon: common negation particles, pronouns and determiners,
    /// *weder ... noch*, the affixes *un-*, *außer-*, *-los(e)*, *-frei* and a few exception phrases.
    pub fn german() -> Self {
        GERMAN.clone()
    }

    /// Reads a lexicon from a text file, see [CueLexicon::from_reader]. Affix rules and exceptions
    /// of the German lexicon are used in addition to the ones in the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = fs_err::File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads a lexicon from lines of the form `word[\tPOS[\tcategory[\tpartner]]]`.
    ///
    /// - Lines starting with `#` are comments.
    /// - Lines starting with `!` define an exception phrase (whitespace separated words).
    /// - An empty POS column means the entry applies to any tag.
    /// - Without a category, words splitting at a known affix are affix cues, all others simple cues.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut lexicon = CueLexicon::empty(GERMAN.affixes.clone(), GERMAN.exceptions.clone());

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(phrase) = trimmed.strip_prefix('!') {
                let phrase: Vec<String> = phrase.split_whitespace().map(|x| x.to_lowercase()).collect();
                if phrase.is_empty() {
                    return Err(Error::Lexicon {
                        line: i + 1,
                        message: "empty exception phrase".into(),
                    });
                }
                lexicon.exceptions.push(phrase);
                continue;
            }

            let columns: Vec<&str> = line.split('\t').map(|x| x.trim()).collect();
            let word = columns[0];
            let pos = columns.get(1).filter(|x| !x.is_empty()).copied();
            let category = match columns.get(2).filter(|x| !x.is_empty()) {
                Some(category) => category.parse::<CueCategory>().map_err(|message| Error::Lexicon {
                    line: i + 1,
                    message,
                })?,
                None => lexicon.infer_category(word),
            };

            let mut entry = CueLexiconEntry::new(word, pos, category);
            if let Some(partner) = columns.get(3).filter(|x| !x.is_empty()) {
                entry = entry.with_partner(*partner);
            } else if category == CueCategory::MultiWordCue {
                return Err(Error::Lexicon {
                    line: i + 1,
                    message: format!("multi word cue '{}' needs a partner word", word),
                });
            }

            lexicon.insert(entry);
        }

        Ok(lexicon)
    }

    /// Reads a lexicon serialized as JSON.
    pub fn from_json<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn insert(&mut self, entry: CueLexiconEntry) {
        let entries = self.entries.entry(entry.word.clone()).or_insert_with(Vec::new);

        entries.retain(|x| x.pos != entry.pos);
        entries.push(entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(|x| x.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets the entry applying to this word and tag. An entry qualified with the
    /// tag takes precedence over an unqualified one.
    pub fn entry(&self, word: &str, pos: &str) -> Option<&CueLexiconEntry> {
        let entries = self.entries.get(&word.to_lowercase())?;

        entries
            .iter()
            .find(|x| x.pos.as_deref() == Some(pos))
            .or_else(|| entries.iter().find(|x| x.pos.is_none()))
    }

    /// Classifies a word. Unknown words (and known words whose tag filter does not match) are [CueCategory::None].
    pub fn classify(&self, word: &str, pos: &str) -> CueCategory {
        self.entry(word, pos)
            .map_or(CueCategory::None, |entry| entry.category)
    }

    /// Category for a word not found in the lexicon: an affix cue if the rule splitting it for its tag allows guessing.
    pub fn guess(&self, word: &str, pos: &str) -> CueCategory {
        let guessed = self
            .split_rule(word, Some(pos))
            .map_or(false, |(rule, _)| rule.guess_pos.iter().any(|x| x == pos));

        if guessed {
            debug!("guessing '{}' ({}) as affix cue", word, pos);
            CueCategory::AffixCue
        } else {
            CueCategory::None
        }
    }

    /// Splits a word at the first (longest) matching affix. If `pos` is given, rules restricted to other tags are skipped.
    pub fn split_affix<'w>(&self, word: &'w str, pos: Option<&str>) -> Option<AffixMatch<'w>> {
        self.split_rule(word, pos).map(|(_, split)| split)
    }

    fn split_rule<'w>(&self, word: &'w str, pos: Option<&str>) -> Option<(&AffixRule, AffixMatch<'w>)> {
        self.affixes
            .iter()
            .filter(|rule| match pos {
                Some(pos) => rule.pos.is_empty() || rule.pos.iter().any(|x| x == pos),
                None => true,
            })
            .find_map(|rule| rule.split(word).map(|split| (rule, split)))
    }

    fn infer_category(&self, word: &str) -> CueCategory {
        if self.split_affix(word, None).is_some() {
            CueCategory::AffixCue
        } else {
            CueCategory::Cue
        }
    }

    /// Affix rules, longest affix first.
    pub fn affixes(&self) -> &[AffixRule] {
        &self.affixes
    }

    /// Exception phrases, lowercased.
    pub fn exceptions(&self) -> &[Vec<String>] {
        &self.exceptions
    }

    /// Length of the longest exception phrase i. e. the window size needed by [CueLexicon::matches_exception].
    pub fn max_exception_len(&self) -> usize {
        self.exceptions.iter().map(|x| x.len()).max().unwrap_or(0)
    }

    /// Checks whether an exception phrase occurs in a window of consecutive lowercased word forms
    /// and covers the candidate cue at index `candidate` of the window.
    pub fn matches_exception<S: AsRef<str>>(&self, window: &[S], candidate: usize) -> bool {
        self.exceptions.iter().any(|phrase| {
            let n = phrase.len();

            (0..window.len().saturating_sub(n - 1))
                .filter(|start| *start <= candidate && candidate < start + n)
                .any(|start| {
                    window[start..start + n]
                        .iter()
                        .zip(phrase)
                        .all(|(word, expected)| word.as_ref() == expected)
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let lexicon = CueLexicon::german();

        assert_eq!(lexicon.classify("Nicht", "PTKNEG"), CueCategory::Cue);
        assert_eq!(lexicon.classify("KEIN", "PIAT"), CueCategory::Cue);
        assert_eq!(lexicon.classify("Hund", "NN"), CueCategory::None);
        assert_eq!(lexicon.classify("weder", "KON"), CueCategory::MultiWordCue);
        assert_eq!(
            lexicon.classify("Nichtsdestotrotz", "ADV"),
            CueCategory::None
        );
    }

    #[test]
    fn pos_qualified_entry_takes_precedence() {
        let mut lexicon = CueLexicon::default();
        lexicon.insert(CueLexiconEntry::new("nichts", None, CueCategory::Cue));
        lexicon.insert(CueLexiconEntry::new("nichts", Some("NN"), CueCategory::None));
        lexicon.insert(CueLexiconEntry::new("los", Some("ADV"), CueCategory::Cue));

        assert_eq!(lexicon.classify("Nichts", "NN"), CueCategory::None);
        assert_eq!(lexicon.classify("nichts", "PIS"), CueCategory::Cue);
        // a qualified entry does not apply to other tags
        assert_eq!(lexicon.classify("los", "PTKVZ"), CueCategory::None);
        assert_eq!(lexicon.len(), 3);
    }

    #[test]
    fn affixes_are_split_keeping_case() {
        let lexicon = CueLexicon::german();

        let split = lexicon.split_affix("Unglück", Some("NN")).unwrap();
        assert_eq!((split.affix, split.stem), ("Un", "glück"));
        assert_eq!(split.position, AffixPosition::Prefix);

        let split = lexicon.split_affix("zweifellos", None).unwrap();
        assert_eq!((split.affix, split.stem), ("los", "zweifel"));

        let split = lexicon.split_affix("hoffnungslosen", None).unwrap();
        assert_eq!((split.affix, split.stem), ("losen", "hoffnungs"));

        // stem too short
        assert!(lexicon.split_affix("Los", None).is_none());
        // tag filter
        assert!(lexicon.split_affix("unter", Some("APPR")).is_none());
    }

    #[test]
    fn guessing_requires_guess_tag() {
        let lexicon = CueLexicon::german();

        assert_eq!(lexicon.guess("unerwartet", "ADJD"), CueCategory::AffixCue);
        assert_eq!(lexicon.guess("Unterricht", "NN"), CueCategory::None);
        assert_eq!(lexicon.guess("arbeitslos", "ADJD"), CueCategory::None);
        // the tag filter of the guessing rule applies too
        assert_eq!(lexicon.guess("unklar", "ADV"), CueCategory::None);
        // split at the longer suffix, whose rule does not guess
        assert_eq!(lexicon.guess("unsorgenfrei", "ADJD"), CueCategory::None);
    }

    #[test]
    fn exceptions_must_cover_candidate() {
        let lexicon = CueLexicon::german();

        assert!(lexicon.matches_exception(&["er", "ist", "nicht", "nur"], 2));
        assert!(!lexicon.matches_exception(&["er", "ist", "nicht", "nur"], 1));
        assert!(!lexicon.matches_exception(&["das", "ist", "nicht", "gut"], 2));
        assert!(lexicon.matches_exception(&["nichts", "anderes", "als"], 0));
        assert_eq!(lexicon.max_exception_len(), 3);
    }

    #[test]
    fn text_format() {
        let text = "# cues\nnicht\nnichts\tNN\tnone\nweder\tKON\tmulti\tnoch\nzweifellos\tADJD\n! gar nicht so\n";
        let lexicon = CueLexicon::from_reader(text.as_bytes()).unwrap();

        assert_eq!(lexicon.classify("nicht", "PTKNEG"), CueCategory::Cue);
        assert_eq!(lexicon.classify("nichts", "NN"), CueCategory::None);
        assert_eq!(
            lexicon.entry("weder", "KON").unwrap().partner.as_deref(),
            Some("noch")
        );
        assert_eq!(lexicon.classify("zweifellos", "ADJD"), CueCategory::AffixCue);
        assert!(lexicon.matches_exception(&["gar", "nicht", "so"], 1));
    }

    #[test]
    fn text_format_errors_carry_line() {
        let error = CueLexicon::from_reader("nicht\nweder\t\tmulti\n".as_bytes()).unwrap_err();
        assert!(matches!(error, Error::Lexicon { line: 2, .. }));

        let error = CueLexicon::from_reader("nicht\t\tmaybe\n".as_bytes()).unwrap_err();
        assert!(matches!(error, Error::Lexicon { line: 1, .. }));
    }

    #[test]
    fn json_roundtrip_keeps_entries() {
        let lexicon = CueLexicon::german();
        let json = serde_json::to_string(&lexicon).unwrap();
        let restored = CueLexicon::from_json(json.as_bytes()).unwrap();

        assert_eq!(restored.len(), lexicon.len());
        assert_eq!(restored.classify("weder", "KON"), CueCategory::MultiWordCue);
        assert_eq!(restored.max_exception_len(), 3);
    }
}
