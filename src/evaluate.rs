//! Compares predicted negation frames against gold frames.
//!
//! Frames are aligned by token overlap, not by id: per sentence and per [Category], a greedy one-to-one matching
//! takes the pair with the largest intersection first. Ties go to the earlier gold frame, then the earlier
//! predicted frame (in document order). Counting is by tokens: every token in the intersection of a matched
//! pair is a true positive, every other predicted token a false positive and every other gold token a false negative.

use indexmap::IndexSet;
use log::{info, warn};
use std::{
    collections::HashSet,
    fmt,
    ops::AddAssign,
    path::{Path, PathBuf},
};

use crate::{
    corpus::{self, WorkList},
    frame::Frame,
    types::Document,
    utils::{parallelism::MaybeParallelIterator, ratio},
    Error,
};

#[cfg(feature = "rayon")]
use crate::utils::parallelism::ParallelIterator;

/// The frame component being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// The target tokens.
    Cue,
    Negated,
    Focus,
    Scope,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Cue,
        Category::Negated,
        Category::Focus,
        Category::Scope,
    ];

    pub fn tokens<'a>(&self, frame: &'a Frame) -> &'a IndexSet<String> {
        match self {
            Category::Cue => frame.target(),
            Category::Negated => frame.negated(),
            Category::Focus => frame.focus(),
            Category::Scope => frame.scope(),
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Cue => "CUEWORDS",
            Category::Negated => "NEGATED",
            Category::Focus => "FOCUS",
            Category::Scope => "SCOPE",
        };
        write!(f, "{}", name)
    }
}

/// Token counts of one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationCounts {
    /// `None` if nothing was predicted.
    pub fn precision(&self) -> Option<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_positives,
        )
    }

    /// `None` if the gold standard is empty.
    pub fn recall(&self) -> Option<f64> {
        ratio(
            self.true_positives,
            self.true_positives + self.false_negatives,
        )
    }

    /// `None` if both gold standard and prediction are empty.
    pub fn f1(&self) -> Option<f64> {
        ratio(
            2 * self.true_positives,
            2 * self.true_positives + self.false_positives + self.false_negatives,
        )
    }
}

impl AddAssign for EvaluationCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// A matched pair of token sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub gold: usize,
    pub predicted: usize,
    pub overlap: usize,
}

/// Greedily matches gold and predicted token sets one-to-one, largest overlap first.
/// Sets without common tokens are never matched.
pub fn align(gold: &[&IndexSet<String>], predicted: &[&IndexSet<String>]) -> Vec<Alignment> {
    let mut candidates: Vec<Alignment> = Vec::new();

    for (i, g) in gold.iter().enumerate() {
        for (j, p) in predicted.iter().enumerate() {
            let overlap = g.intersection(p).count();
            if overlap > 0 {
                candidates.push(Alignment {
                    gold: i,
                    predicted: j,
                    overlap,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.overlap
            .cmp(&a.overlap)
            .then(a.gold.cmp(&b.gold))
            .then(a.predicted.cmp(&b.predicted))
    });

    let mut gold_used = vec![false; gold.len()];
    let mut predicted_used = vec![false; predicted.len()];

    candidates
        .into_iter()
        .filter(|x| {
            if gold_used[x.gold] || predicted_used[x.predicted] {
                false
            } else {
                gold_used[x.gold] = true;
                predicted_used[x.predicted] = true;
                true
            }
        })
        .collect()
}

/// Counts true positives, false positives and false negatives of one category.
pub fn count(gold: &[&IndexSet<String>], predicted: &[&IndexSet<String>]) -> EvaluationCounts {
    let true_positives: usize = align(gold, predicted).iter().map(|x| x.overlap).sum();
    let gold_total: usize = gold.iter().map(|x| x.len()).sum();
    let predicted_total: usize = predicted.iter().map(|x| x.len()).sum();

    EvaluationCounts {
        true_positives,
        false_positives: predicted_total - true_positives,
        false_negatives: gold_total - true_positives,
    }
}

/// The comparison of gold and predicted frames of some sentences. Evaluations of disjoint parts add up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub sentences: usize,
    pub gold_frames: usize,
    pub predicted_frames: usize,
    /// Frames with a non-empty scope.
    pub gold_scope_frames: usize,
    pub predicted_scope_frames: usize,
    counts: [EvaluationCounts; 4],
    scope_intersection: usize,
    scope_union: usize,
}

impl Evaluation {
    /// Compares the frames of a single sentence.
    pub fn of_frames(gold: &[Frame], predicted: &[Frame]) -> Self {
        let mut evaluation = Evaluation {
            sentences: 1,
            gold_frames: gold.len(),
            predicted_frames: predicted.len(),
            gold_scope_frames: gold.iter().filter(|x| !x.scope().is_empty()).count(),
            predicted_scope_frames: predicted.iter().filter(|x| !x.scope().is_empty()).count(),
            ..Evaluation::default()
        };

        for category in Category::ALL.iter() {
            let gold: Vec<_> = gold.iter().map(|x| category.tokens(x)).collect();
            let predicted: Vec<_> = predicted.iter().map(|x| category.tokens(x)).collect();

            evaluation.counts[category.index()] = count(&gold, &predicted);
        }

        let gold_scope: HashSet<&str> = gold
            .iter()
            .flat_map(|x| x.scope().iter().map(|x| x.as_str()))
            .collect();
        let predicted_scope: HashSet<&str> = predicted
            .iter()
            .flat_map(|x| x.scope().iter().map(|x| x.as_str()))
            .collect();

        evaluation.scope_intersection = gold_scope.intersection(&predicted_scope).count();
        evaluation.scope_union = gold_scope.union(&predicted_scope).count();

        evaluation
    }

    /// Compares two versions of the same document, pairing sentences by id.
    ///
    /// # Errors
    /// If the documents do not consist of the same sentences.
    pub fn of_documents(gold: &Document, predicted: &Document) -> Result<Self, Error> {
        let gold_ids: HashSet<&str> = gold.sentences().iter().map(|x| x.id()).collect();
        let predicted_ids: HashSet<&str> = predicted.sentences().iter().map(|x| x.id()).collect();

        if gold_ids != predicted_ids {
            return Err(Error::SentenceMismatch {
                gold: gold.sentences().len(),
                predicted: predicted.sentences().len(),
            });
        }

        let mut evaluation = Evaluation::default();
        for sentence in gold.sentences() {
            let predicted_frames = predicted
                .sentence(sentence.id())
                .map_or(&[][..], |x| x.frames());

            evaluation += Evaluation::of_frames(sentence.frames(), predicted_frames);
        }

        Ok(evaluation)
    }

    pub fn counts(&self, category: Category) -> EvaluationCounts {
        self.counts[category.index()]
    }

    pub fn f1(&self, category: Category) -> Option<f64> {
        self.counts(category).f1()
    }

    /// Token overlap of the union of all gold scopes and the union of all predicted scopes.
    /// `None` if both are empty.
    pub fn jaccard(&self) -> Option<f64> {
        ratio(self.scope_intersection, self.scope_union)
    }
}

impl AddAssign for Evaluation {
    fn add_assign(&mut self, other: Self) {
        self.sentences += other.sentences;
        self.gold_frames += other.gold_frames;
        self.predicted_frames += other.predicted_frames;
        self.gold_scope_frames += other.gold_scope_frames;
        self.predicted_scope_frames += other.predicted_scope_frames;
        for (counts, other) in self.counts.iter_mut().zip(other.counts.iter()) {
            *counts += *other;
        }
        self.scope_intersection += other.scope_intersection;
        self.scope_union += other.scope_union;
    }
}

struct Metric(Option<f64>);

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.4}", value),
            None => write!(f, "n/a"),
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total sentences:  {}", self.sentences)?;
        writeln!(f, "Gold frames:      {}", self.gold_frames)?;
        writeln!(f, "Predicted frames: {}", self.predicted_frames)?;

        for category in &[Category::Cue, Category::Focus, Category::Negated] {
            writeln!(
                f,
                "{:<9} F1: {}",
                category.to_string(),
                Metric(self.f1(*category))
            )?;
        }

        let scope = self.counts(Category::Scope);
        writeln!(f, "{}", Category::Scope)?;
        writeln!(f, "  gold frames:      {}", self.gold_scope_frames)?;
        writeln!(f, "  predicted frames: {}", self.predicted_scope_frames)?;
        writeln!(f, "  precision:        {}", Metric(scope.precision()))?;
        writeln!(f, "  recall:           {}", Metric(scope.recall()))?;
        writeln!(f, "  F1:               {}", Metric(scope.f1()))?;
        writeln!(f, "  Jaccard:          {}", Metric(self.jaccard()))
    }
}

/// The evaluation of one document pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEvaluation {
    pub id: String,
    pub evaluation: Evaluation,
}

/// Per document evaluations and their sum.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub documents: Vec<DocumentEvaluation>,
    /// Gold documents which could not be evaluated.
    pub failed: Vec<PathBuf>,
    pub total: Evaluation,
}

impl Report {
    pub fn push(&mut self, id: String, evaluation: Evaluation) {
        self.total += evaluation.clone();
        self.documents.push(DocumentEvaluation { id, evaluation });
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for document in &self.documents {
            writeln!(f, "=== {} ===", document.id)?;
            writeln!(f, "{}", document.evaluation)?;
        }

        writeln!(f, "=== Total ({} documents) ===", self.documents.len())?;
        write!(f, "{}", self.total)
    }
}

fn evaluate_pair(gold: &Path, predicted: &Path) -> Result<(String, Evaluation), Error> {
    let gold_document = corpus::read_document(gold)?;
    let predicted_document = corpus::read_document(predicted)?;

    let evaluation = Evaluation::of_documents(&gold_document, &predicted_document)?;
    Ok((gold_document.id().to_string(), evaluation))
}

/// Evaluates every gold document of the work list against the document of the same name in `predicted_dir`.
/// Document pairs which can not be read or do not match are logged and left out.
pub fn evaluate_corpus<P: AsRef<Path>>(gold: &WorkList, predicted_dir: P) -> Result<Report, Error> {
    let pairs: Vec<(PathBuf, PathBuf)> = gold
        .iter()
        .map(|path| {
            (
                path.to_path_buf(),
                WorkList::output_path(path, predicted_dir.as_ref()),
            )
        })
        .collect();

    let results: Vec<_> = pairs
        .into_maybe_par_iter()
        .map(|(gold, predicted)| {
            let result = evaluate_pair(&gold, &predicted);
            (gold, result)
        })
        .collect();

    let mut report = Report::default();
    for (path, result) in results {
        match result {
            Ok((id, evaluation)) => report.push(id, evaluation),
            Err(error) => {
                warn!("skipping evaluation of {}: {}", path.display(), error);
                report.failed.push(path);
            }
        }
    }

    info!(
        "Evaluated {} documents, {} failed",
        report.documents.len(),
        report.failed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::FrameId, types::Sentence};

    fn set(tokens: &[&str]) -> IndexSet<String> {
        tokens.iter().map(|x| x.to_string()).collect()
    }

    fn frame(id: &str, tokens: &[&str]) -> Frame {
        Frame::new(FrameId::new(id), tokens.iter().take(1).copied())
            .with_target(tokens.iter().copied())
            .with_negated(tokens.iter().copied())
            .with_focus(tokens.iter().copied())
            .with_scope(tokens.iter().copied())
    }

    #[test]
    fn largest_overlap_is_matched_first() {
        let gold = [set(&["1", "2", "3"]), set(&["4", "5"])];
        let predicted = [set(&["2", "3", "4"])];
        let gold: Vec<_> = gold.iter().collect();
        let predicted: Vec<_> = predicted.iter().collect();

        assert_eq!(
            align(&gold, &predicted),
            vec![Alignment {
                gold: 0,
                predicted: 0,
                overlap: 2
            }]
        );

        let counts = count(&gold, &predicted);
        assert_eq!(counts.precision(), Some(2. / 3.));
        assert_eq!(counts.recall(), Some(2. / 5.));
        assert_eq!(counts.f1(), Some(4. / 8.));
    }

    #[test]
    fn ties_prefer_lower_ordinals() {
        let gold = [set(&["1", "2"]), set(&["1", "2"])];
        let predicted = [set(&["1", "2"]), set(&["1", "2"])];
        let gold: Vec<_> = gold.iter().collect();
        let predicted: Vec<_> = predicted.iter().collect();

        let alignment = align(&gold, &predicted);
        assert_eq!(
            alignment
                .iter()
                .map(|x| (x.gold, x.predicted))
                .collect::<Vec<_>>(),
            vec![(0, 0), (1, 1)]
        );
    }

    #[test]
    fn empty_prediction() {
        let gold: Vec<_> = (0..5)
            .map(|i| {
                let token = i.to_string();
                frame(&format!("g{}", i), &[token.as_str()])
            })
            .collect();
        let evaluation = Evaluation::of_frames(&gold, &[]);

        for category in Category::ALL.iter() {
            let counts = evaluation.counts(*category);
            assert_eq!(counts.recall(), Some(0.));
            assert_eq!(counts.precision(), None);
        }
        assert_eq!(evaluation.jaccard(), Some(0.));
    }

    #[test]
    fn nothing_to_compare_is_undefined() {
        let evaluation = Evaluation::of_frames(&[], &[]);

        for category in Category::ALL.iter() {
            assert_eq!(evaluation.f1(*category), None);
        }
        assert_eq!(evaluation.jaccard(), None);
        assert!(evaluation.to_string().contains("Jaccard:          n/a"));
    }

    #[test]
    fn identical_frames_score_one() {
        let frames = vec![frame("a", &["1", "2"]), frame("b", &["5"])];
        let evaluation = Evaluation::of_frames(&frames, &frames);

        for category in Category::ALL.iter() {
            assert_eq!(evaluation.f1(*category), Some(1.));
        }
        assert_eq!(evaluation.jaccard(), Some(1.));
    }

    #[test]
    fn sentence_sets_must_match() {
        let gold = Document::new("d", vec![Sentence::new("s1", Vec::new(), Vec::new())]);
        let predicted = Document::new("d", vec![Sentence::new("s2", Vec::new(), Vec::new())]);

        assert!(matches!(
            Evaluation::of_documents(&gold, &predicted),
            Err(Error::SentenceMismatch {
                gold: 1,
                predicted: 1
            })
        ));
    }

    #[test]
    fn report_lists_documents_and_total() {
        let mut report = Report::default();
        let frames = vec![frame("a", &["1"])];
        report.push("d1".into(), Evaluation::of_frames(&frames, &frames));
        report.push("d2".into(), Evaluation::of_frames(&frames, &[]));

        assert_eq!(report.total.sentences, 2);
        assert_eq!(report.total.counts(Category::Scope).false_negatives, 1);

        let text = report.to_string();
        assert!(text.contains("=== d1 ==="));
        assert!(text.contains("=== Total (2 documents) ==="));
        assert!(text.contains("CUEWORDS  F1: 0.6667"));
    }
}
