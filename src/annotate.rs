//! Applies a [Resolver] to documents and whole corpora.
//!
//! Failures are isolated: a malformed sentence loses its frames, a failing document is left out of the output.
//! Both are logged with the ids needed to find them again.

use log::{info, warn};
use std::{
    io::{BufReader, BufWriter},
    ops::AddAssign,
    path::{Path, PathBuf},
};

use crate::{
    corpus::{self, conll, WorkList},
    resolver::Resolver,
    types::Document,
    utils::parallelism::MaybeParallelRefIterator,
    Error,
};

#[cfg(feature = "rayon")]
use crate::utils::parallelism::ParallelIterator;

/// Counts of one annotation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub sentences: usize,
    pub frames: usize,
    /// Sentences skipped because their dependency structure is malformed.
    pub skipped: usize,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.sentences += other.sentences;
        self.frames += other.frames;
        self.skipped += other.skipped;
    }
}

/// The outcome of processing a [WorkList].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusSummary {
    /// Documents written successfully.
    pub documents: usize,
    /// Documents which failed, in work list order.
    pub failed: Vec<PathBuf>,
    pub stats: Stats,
}

/// Resolves all sentences of a document in order and attaches the frames, replacing earlier ones.
pub fn annotate_document(resolver: &Resolver, document: &mut Document) -> Stats {
    let document_id = document.id().to_string();
    let mut stats = Stats::default();

    for sentence in document.sentences_mut() {
        stats.sentences += 1;

        match resolver.resolve(sentence) {
            Ok(resolution) => {
                for frame in resolution.frames() {
                    let outside = frame.focus_outside_scope();
                    if !outside.is_empty() {
                        warn!(
                            "{}: focus {:?} of frame {} lies outside its scope",
                            document_id,
                            outside,
                            frame.id()
                        );
                    }
                }

                stats.frames += resolution.frames().len();
                sentence.set_frames(resolution.into_frames());
            }
            Err(error) => {
                warn!(
                    "{}: skipping malformed sentence {}: {}",
                    document_id,
                    sentence.id(),
                    error
                );
                sentence.clear_frames();
                stats.skipped += 1;
            }
        }
    }

    stats
}

/// Annotates the document at `input` and writes it to `output`.
/// If `parse` is given, the dependency edges are taken from that tabular file.
pub fn annotate_file(
    resolver: &Resolver,
    input: &Path,
    output: &Path,
    parse: Option<&Path>,
) -> Result<Stats, Error> {
    info!(
        "Writing negation frames from {} to {}",
        input.display(),
        output.display()
    );

    let xml = fs_err::read_to_string(input)?;
    let mut document = corpus::parse_document(corpus::document_id(input), &xml)?;

    if let Some(parse) = parse {
        let parses = conll::read_parse(BufReader::new(fs_err::File::open(parse)?))?;
        conll::merge_parse(&mut document, &parses);
    }

    let stats = annotate_document(resolver, &mut document);
    corpus::write_document(
        xml.as_bytes(),
        &document,
        BufWriter::new(fs_err::File::create(output)?),
    )?;

    Ok(stats)
}

/// Runs `job(input, output)` for every document of the work list, in parallel if enabled.
pub(crate) fn run<F>(list: &WorkList, out_dir: &Path, extension: &str, job: F) -> Result<CorpusSummary, Error>
where
    F: Fn(&Path, &Path) -> Result<Stats, Error> + Sync + Send,
{
    fs_err::create_dir_all(out_dir)?;

    let results: Vec<_> = list
        .paths()
        .maybe_par_iter()
        .map(|path| {
            let output = WorkList::output_path(path, out_dir).with_extension(extension);
            job(path.as_path(), output.as_path())
        })
        .collect();

    let mut summary = CorpusSummary::default();
    for (path, result) in list.paths().iter().zip(results) {
        match result {
            Ok(stats) => {
                summary.documents += 1;
                summary.stats += stats;
            }
            Err(error) => {
                warn!("skipping document {}: {}", path.display(), error);
                summary.failed.push(path.clone());
            }
        }
    }

    Ok(summary)
}

/// Annotates every document of the work list into `out_dir`.
/// With `parse_dir`, each document `x.xml` takes its dependency edges from `parse_dir/x.conll`.
pub fn annotate_corpus(
    resolver: &Resolver,
    list: &WorkList,
    out_dir: &Path,
    parse_dir: Option<&Path>,
) -> Result<CorpusSummary, Error> {
    let summary = run(list, out_dir, "xml", |input, output| {
        let parse = parse_dir.map(|dir| dir.join(format!("{}.conll", corpus::document_id(input))));
        annotate_file(resolver, input, output, parse.as_deref())
    })?;

    info!(
        "Annotated {} documents ({} failed): {} frames in {} sentences, {} sentences skipped",
        summary.documents,
        summary.failed.len(),
        summary.stats.frames,
        summary.stats.sentences,
        summary.stats.skipped
    );
    Ok(summary)
}

/// Writes the document at `input` to `output` without negation frames and split words.
pub fn strip_file(input: &Path, output: &Path) -> Result<(), Error> {
    info!("Removing negation frames from {}", input.display());

    corpus::strip_frames(
        BufReader::new(fs_err::File::open(input)?),
        BufWriter::new(fs_err::File::create(output)?),
    )
}

/// Strips every document of the work list into `out_dir`.
pub fn strip_corpus(list: &WorkList, out_dir: &Path) -> Result<CorpusSummary, Error> {
    run(list, out_dir, "xml", |input, output| {
        strip_file(input, output).map(|_| Stats::default())
    })
}

/// Writes every document of the work list in the tabular format to `out_dir/<id>.conll`.
pub fn export_corpus(list: &WorkList, out_dir: &Path) -> Result<CorpusSummary, Error> {
    run(list, out_dir, "conll", |input, output| {
        let document = corpus::read_document(input)?;
        conll::write_sentences(&document, BufWriter::new(fs_err::File::create(output)?))?;

        Ok(Stats {
            sentences: document.sentences().len(),
            ..Stats::default()
        })
    })
}
