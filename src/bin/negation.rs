use clap::{Parser, Subcommand};
use log::{info, warn};
use negation::{
    annotate,
    corpus::{self, WorkList},
    evaluate, extract,
    lexicon::CueLexicon,
    resolver::{Resolver, ResolverOptions},
    stats, Error,
};
use std::{
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[clap(version, about = "Negation cue, scope and focus detection for treebank documents")]
struct Opts {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Writes negation frames for every document of a directory.
    Annotate {
        #[clap(long, short)]
        input: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
        /// Cue lexicon, JSON if the extension is `.json`, the text format otherwise.
        #[clap(long)]
        lexicon: Option<PathBuf>,
        /// Resolver options as JSON.
        #[clap(long)]
        options: Option<PathBuf>,
        /// Directory with one tabular parse `<id>.conll` per document.
        #[clap(long)]
        parses: Option<PathBuf>,
    },
    /// Compares predicted against gold frames.
    Evaluate {
        #[clap(long)]
        gold: PathBuf,
        #[clap(long)]
        predicted: PathBuf,
    },
    /// Lists the cue words of annotated documents.
    Extract {
        #[clap(long, short)]
        input: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
        #[clap(long)]
        pos_output: Option<PathBuf>,
    },
    /// Lists the tokens of every negation frame, one text file per document.
    Stats {
        #[clap(long, short)]
        input: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Removes negation frames and split words.
    Strip {
        #[clap(long, short)]
        input: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
    /// Exports documents in the tabular parser format.
    Conll {
        #[clap(long, short)]
        input: PathBuf,
        #[clap(long, short)]
        output: PathBuf,
    },
}

fn load_lexicon(path: Option<&Path>) -> Result<CueLexicon, Error> {
    match path {
        Some(path) if path.extension().map_or(false, |x| x == "json") => {
            CueLexicon::from_json(BufReader::new(fs_err::File::open(path)?))
        }
        Some(path) => CueLexicon::from_path(path),
        None => Ok(CueLexicon::german()),
    }
}

fn load_options(path: Option<&Path>) -> Result<ResolverOptions, Error> {
    match path {
        Some(path) => ResolverOptions::from_json(BufReader::new(fs_err::File::open(path)?)),
        None => Ok(ResolverOptions::default()),
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    match opts.command {
        Command::Annotate {
            input,
            output,
            lexicon,
            options,
            parses,
        } => {
            let resolver = Resolver::new(
                load_lexicon(lexicon.as_deref())?,
                load_options(options.as_deref())?,
            );
            let list = WorkList::from_dir(&input)?;
            let summary = annotate::annotate_corpus(&resolver, &list, &output, parses.as_deref())?;

            println!(
                "Annotated {} documents, {} failed.",
                summary.documents,
                summary.failed.len()
            );
        }
        Command::Evaluate { gold, predicted } => {
            let list = WorkList::from_dir(&gold)?;
            let report = evaluate::evaluate_corpus(&list, &predicted)?;

            println!("{}", report);
        }
        Command::Extract {
            input,
            output,
            pos_output,
        } => {
            let list = WorkList::from_dir(&input)?;
            let documents: Vec<_> = list
                .iter()
                .filter_map(|path| match corpus::read_document(path) {
                    Ok(document) => Some(document),
                    Err(error) => {
                        warn!("skipping document {}: {}", path.display(), error);
                        None
                    }
                })
                .collect();
            let cues = extract::extract_cues(&documents);

            let pos = match pos_output {
                Some(path) => Some(BufWriter::new(fs_err::File::create(path)?)),
                None => None,
            };
            extract::write_lists(&cues, BufWriter::new(fs_err::File::create(&output)?), pos)?;

            info!("Extracted {} cue words to {}", cues.words.len(), output.display());
        }
        Command::Stats { input, output } => {
            let list = WorkList::from_dir(&input)?;
            let summary = stats::stats_corpus(&list, &output)?;

            println!(
                "Wrote statistics of {} documents, {} failed.",
                summary.documents,
                summary.failed.len()
            );
        }
        Command::Strip { input, output } => {
            let list = WorkList::from_dir(&input)?;
            let summary = annotate::strip_corpus(&list, &output)?;

            println!("Stripped {} documents, {} failed.", summary.documents, summary.failed.len());
        }
        Command::Conll { input, output } => {
            let list = WorkList::from_dir(&input)?;
            let summary = annotate::export_corpus(&list, &output)?;

            println!("Exported {} documents, {} failed.", summary.documents, summary.failed.len());
        }
    }

    Ok(())
}
