use std::collections::HashSet;

use lazy_static::lazy_static;
use negation::{
    annotate,
    corpus::{self, WorkList},
    evaluate::{self, Category, Evaluation},
    extract,
    frame::{Frame, FrameId},
    lexicon::{CueCategory, CueLexicon},
    resolver::{Resolver, ResolverOptions},
    stats::{self, Role, Section},
    types::{DependencyEdge, Document, Sentence, Token},
};
use quickcheck_macros::quickcheck;

const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<corpus>
  <s id="s1">
    <graph root="s1_3">
      <terminals>
        <t id="s1_1" word="Der" lemma="der" pos="ART" head="s1_2" deprel="NK"/>
        <t id="s1_2" word="Hund" lemma="Hund" pos="NN" head="s1_3" deprel="SB"/>
        <t id="s1_3" word="bellt" lemma="bellen" pos="VVFIN" head="0" deprel="--"/>
        <t id="s1_4" word="nicht" lemma="nicht" pos="PTKNEG" head="s1_3" deprel="NG"/>
        <t id="s1_5" word="." lemma="--" pos="$." head="s1_3" deprel="--"/>
      </terminals>
    </graph>
  </s>
  <s id="s2">
    <graph root="s2_2">
      <terminals>
        <t id="s2_1" word="Das" lemma="das" pos="PDS" head="2" deprel="SB"/>
        <t id="s2_2" word="ist" lemma="sein" pos="VAFIN" head="0" deprel="--"/>
        <t id="s2_3" word="unmöglich" lemma="unmöglich" pos="ADJD" head="2" deprel="PD"/>
      </terminals>
    </graph>
  </s>
  <s id="s3">
    <graph root="s3_2">
      <terminals>
        <t id="s3_1" word="Er" lemma="er" pos="PPER" head="2" deprel="SB"/>
        <t id="s3_2" word="lacht" lemma="lachen" pos="VVFIN" head="0" deprel="--"/>
      </terminals>
    </graph>
  </s>
</corpus>"#;

lazy_static! {
    static ref RESOLVER: Resolver = Resolver::new(
        CueLexicon::german(),
        ResolverOptions {
            guess_unlisted: true,
            ..ResolverOptions::default()
        }
    );
}

const WORDS: &[(&str, &str)] = &[
    ("nicht", "PTKNEG"),
    ("kein", "PIAT"),
    ("Hund", "NN"),
    ("bellt", "VVFIN"),
    ("weder", "KON"),
    ("noch", "KON"),
    ("unklar", "ADJD"),
    (".", "$."),
    ("nur", "ADV"),
    ("und", "KON"),
    ("ohne", "APPR"),
    ("zweifellos", "ADJD"),
];

const RELATIONS: &[&str] = &["SB", "OA", "NG", "NK", "CJ", "CD", "RC", "MO", "--", "OC"];

/// A random well-formed sentence: token 0 is the root, every other token attaches to an earlier one.
fn random_sentence(shape: &[(u8, u8, u8)]) -> Sentence {
    let tokens: Vec<Token> = shape
        .iter()
        .enumerate()
        .map(|(i, (word, _, _))| {
            let (word, pos) = WORDS[*word as usize % WORDS.len()];
            Token::new(format!("s1_{}", i + 1), word.to_string(), word.to_lowercase(), pos.to_string())
        })
        .collect();

    let edges = shape
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, (_, head, relation))| {
            DependencyEdge::new(
                tokens[*head as usize % i].id().to_string(),
                tokens[i].id().to_string(),
                RELATIONS[*relation as usize % RELATIONS.len()].to_string(),
            )
        })
        .collect();

    Sentence::new("s1", tokens, edges)
}

fn scope_frames(scopes: &[Vec<u8>]) -> Vec<Frame> {
    scopes
        .iter()
        .enumerate()
        .map(|(i, scope)| {
            Frame::new(FrameId::nth("s1", i), vec!["c"]).with_scope(scope.iter().map(|x| x.to_string()))
        })
        .collect()
}

#[test]
fn annotated_corpus_matches_itself() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs_err::write(input.path().join("doc.xml"), SOURCE).unwrap();

    let list = WorkList::from_dir(input.path()).unwrap();
    let summary = annotate::annotate_corpus(&*RESOLVER, &list, output.path(), None).unwrap();
    assert_eq!(summary.documents, 1);
    assert_eq!(summary.stats.frames, 2);

    let document = corpus::read_document(output.path().join("doc.xml")).unwrap();
    let frames: Vec<_> = document.frames().collect();
    assert_eq!(frames[0].target().iter().collect::<Vec<_>>(), vec!["s1_4"]);
    assert_eq!(
        frames[1].split().and_then(|x| x.affix()).map(|x| x.word.as_str()),
        Some("un")
    );
    assert!(document.sentences()[2].frames().is_empty());

    let gold = WorkList::from_dir(output.path()).unwrap();
    let report = evaluate::evaluate_corpus(&gold, output.path()).unwrap();
    assert!(report.failed.is_empty());
    assert_eq!(report.total.sentences, 3);
    for category in Category::ALL.iter() {
        assert_eq!(report.total.f1(*category), Some(1.));
    }
    assert_eq!(report.total.jaccard(), Some(1.));
}

#[test]
fn stripped_prediction_has_no_recall() {
    let gold_dir = tempfile::tempdir().unwrap();
    let stripped_dir = tempfile::tempdir().unwrap();

    let mut document = corpus::parse_document("doc", SOURCE).unwrap();
    annotate::annotate_document(&*RESOLVER, &mut document);
    let mut xml = Vec::new();
    corpus::write_document(SOURCE.as_bytes(), &document, &mut xml).unwrap();
    fs_err::write(gold_dir.path().join("doc.xml"), xml).unwrap();
    // no counterpart in the predicted directory
    fs_err::write(gold_dir.path().join("other.xml"), SOURCE).unwrap();

    let gold = WorkList::from_dir(gold_dir.path()).unwrap();
    annotate::strip_corpus(&WorkList::from_paths(vec![gold_dir.path().join("doc.xml")]), stripped_dir.path())
        .unwrap();

    let report = evaluate::evaluate_corpus(&gold, stripped_dir.path()).unwrap();
    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.failed, vec![gold_dir.path().join("other.xml")]);

    let scope = report.total.counts(Category::Scope);
    assert_eq!(scope.recall(), Some(0.));
    assert_eq!(scope.precision(), None);
    assert!(report.to_string().contains("n/a"));
}

#[test]
fn extracted_lexicon_finds_the_same_cues() {
    let mut document = corpus::parse_document("doc", SOURCE).unwrap();
    annotate::annotate_document(&*RESOLVER, &mut document);

    let cues = extract::extract_cues(vec![&document]);
    let lexicon = CueLexicon::from_extracted(&cues);
    assert_eq!(lexicon.classify("nicht", "PTKNEG"), CueCategory::Cue);
    assert_eq!(lexicon.classify("unmöglich", "ADJD"), CueCategory::AffixCue);

    let resolver = Resolver::new(lexicon, ResolverOptions::default());
    let mut again = corpus::parse_document("doc", SOURCE).unwrap();
    annotate::annotate_document(&resolver, &mut again);
    assert_eq!(
        again.frames().cloned().collect::<Vec<_>>(),
        document.frames().cloned().collect::<Vec<_>>()
    );
}

#[test]
fn statistics_of_annotated_corpus() {
    let input = tempfile::tempdir().unwrap();
    let annotated = tempfile::tempdir().unwrap();
    let listed = tempfile::tempdir().unwrap();
    fs_err::write(input.path().join("doc.xml"), SOURCE).unwrap();

    let list = WorkList::from_dir(input.path()).unwrap();
    annotate::annotate_corpus(&*RESOLVER, &list, annotated.path(), None).unwrap();

    let document = corpus::read_document(annotated.path().join("doc.xml")).unwrap();
    let document_stats = stats::document_stats(&document);
    assert_eq!(document_stats.frames(), 2);
    match &document_stats.sections[1] {
        Section::SplitWord { word, frames, .. } => {
            assert_eq!(word.id, "s2_3");
            let negated: Vec<_> = frames[0].role(Role::Negated).map(|x| x.id.as_str()).collect();
            assert_eq!(negated, vec!["s2_3"]);
        }
        other => panic!("unexpected section {:?}", other),
    }

    let summary = stats::stats_corpus(&WorkList::from_dir(annotated.path()).unwrap(), listed.path()).unwrap();
    assert_eq!(summary.documents, 1);
    let text = fs_err::read_to_string(listed.path().join("doc.stats.txt")).unwrap();
    assert!(text.contains("s1_4\tTARGET\tnicht\tPTKNEG\n"));
    assert!(text.contains("=SPLITWORDS=\ns2_3\tunmöglich\tADJD\n"));
}

#[quickcheck]
fn annotating_twice_gives_the_same_frames(shape: Vec<(u8, u8, u8)>) -> bool {
    let mut document = Document::new("doc", vec![random_sentence(&shape)]);

    annotate::annotate_document(&*RESOLVER, &mut document);
    let first: Vec<Frame> = document.frames().cloned().collect();
    annotate::annotate_document(&*RESOLVER, &mut document);

    first == document.frames().cloned().collect::<Vec<_>>()
}

#[quickcheck]
fn tokens_trigger_at_most_one_frame(shape: Vec<(u8, u8, u8)>) -> bool {
    let sentence = random_sentence(&shape);
    let resolution = RESOLVER.resolve(&sentence).unwrap();

    let mut seen = HashSet::new();
    resolution.frames().iter().enumerate().all(|(i, frame)| {
        frame.id() == &FrameId::nth("s1", i)
            && !frame.cue().is_empty()
            && frame.cue().iter().all(|x| sentence.token(x).is_some())
            && frame.cue().iter().all(|x| frame.target().contains(x))
            && frame.target().iter().all(|x| seen.insert(x.clone()))
    })
}

#[quickcheck]
fn jaccard_is_bounded(gold: Vec<Vec<u8>>, predicted: Vec<Vec<u8>>) -> bool {
    let evaluation = Evaluation::of_frames(&scope_frames(&gold), &scope_frames(&predicted));

    let gold_union: HashSet<u8> = gold.iter().flatten().copied().collect();
    let predicted_union: HashSet<u8> = predicted.iter().flatten().copied().collect();

    match evaluation.jaccard() {
        None => gold_union.is_empty() && predicted_union.is_empty(),
        Some(jaccard) => (0. ..=1.).contains(&jaccard) && ((jaccard == 1.) == (gold_union == predicted_union)),
    }
}

#[quickcheck]
fn identical_frames_are_perfect(scopes: Vec<Vec<u8>>) -> bool {
    let frames = scope_frames(&scopes);
    let evaluation = Evaluation::of_frames(&frames, &frames);

    let scope = evaluation.counts(Category::Scope);
    scope.false_positives == 0
        && scope.false_negatives == 0
        && (frames.is_empty() || evaluation.f1(Category::Cue) == Some(1.))
}

#[quickcheck]
fn swapping_sides_swaps_precision_and_recall(pairs: Vec<(Vec<u8>, Vec<u8>)>) -> bool {
    // one frame per sentence on each side
    let (left, right): (Evaluation, Evaluation) = pairs.iter().fold(
        (Evaluation::default(), Evaluation::default()),
        |(mut left, mut right), (a, b)| {
            let a = scope_frames(&[a.clone()]);
            let b = scope_frames(&[b.clone()]);
            left += Evaluation::of_frames(&a, &b);
            right += Evaluation::of_frames(&b, &a);
            (left, right)
        },
    );

    Category::ALL.iter().all(|category| {
        left.counts(*category).precision() == right.counts(*category).recall()
            && left.counts(*category).recall() == right.counts(*category).precision()
    })
}
