//! Command-line driver: reads a training and an evaluation corpus plus a feature template,
//! trains an averaged-perceptron arc-eager parser, writes predictions, and reports UAS/LAS.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use hanstholm::dictionary::Dictionary;
use hanstholm::error::ParserError;
use hanstholm::features::read_feature_file;
use hanstholm::input::read_corpus;
use hanstholm::learn::Learner;
use hanstholm::output::write_prediction;
use hanstholm::sentence::{ParseScore, Sentence};

#[derive(Parser, Debug)]
#[command(name = "hanstholm", about = "A transition-based dependency parser")]
struct Cli {
    /// Training corpus path
    #[arg(short = 'd', long = "data")]
    data: PathBuf,

    /// Evaluation corpus path
    #[arg(short = 'e', long = "eval")]
    eval: PathBuf,

    /// Feature template file
    #[arg(long = "template")]
    template: PathBuf,

    /// Number of training passes
    #[arg(long = "passes", default_value_t = 5)]
    passes: usize,

    /// Write predictions to this file
    #[arg(short = 'p', long = "predictions")]
    predictions: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .expect("failed to install logger");

    if let Err(err) = run(&cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), ParserError> {
    let mut dict = Dictionary::new();

    let train_sents = read_corpus(&cli.data, &mut dict)?;
    let eval_sents = read_corpus(&cli.eval, &mut dict)?;
    info!("data set loaded");
    info!("  train: {} sentences", train_sents.len());
    info!("  eval:  {} sentences", eval_sents.len());
    info!("using {} passes", cli.passes);

    let template_text = std::fs::read_to_string(&cli.template).map_err(|e| ParserError::InputParse {
        file: cli.template.clone(),
        line: 0,
        message: format!("could not read template file: {e}"),
    })?;
    let feature_tree = read_feature_file(&template_text, &mut dict)?;

    let num_arc = count_arc_constraints(&train_sents) + count_arc_constraints(&eval_sents);
    let num_span = count_span_constraints(&train_sents) + count_span_constraints(&eval_sents);
    if num_arc + num_span > 0 {
        info!(
            "using constrained parsing: {num_arc} arc constraint(s), {num_span} span constraint(s)"
        );
    }

    dict.freeze();

    let mut learner = Learner::new(dict.num_labels(), feature_tree);
    learner.fit(&train_sents, cli.passes);

    let mut writer: Box<dyn std::io::Write> = match &cli.predictions {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| ParserError::OutputFailure {
            path: path.clone(),
            source: e,
        })?)),
        None => Box::new(std::io::sink()),
    };

    let label_names = dict.label_names();
    let mut score = ParseScore::default();
    for (i, sent) in eval_sents.iter().enumerate() {
        let (heads, labels) = learner.parse(sent);
        write_prediction(&mut writer, sent, &heads, &labels, &label_names, i == 0)
            .map_err(|e| ParserError::OutputFailure {
                path: cli.predictions.clone().unwrap_or_default(),
                source: e,
            })?;
        sent.score(&heads, &labels, &mut score);
    }

    eprintln!("Test set results ({} sentences)", eval_sents.len());
    eprintln!(
        "   UAS: {}/{} = {:.2}",
        score.num_correct_unlabeled,
        score.num_total,
        score.uas() * 100.0
    );
    eprintln!(
        "   LAS: {}/{} = {:.2}",
        score.num_correct_labeled,
        score.num_total,
        score.las() * 100.0
    );

    Ok(())
}

fn count_arc_constraints(sentences: &[Sentence]) -> usize {
    sentences.iter().map(|s| s.arc_constraints.len()).sum()
}

fn count_span_constraints(sentences: &[Sentence]) -> usize {
    sentences.iter().map(|s| s.span_constraints.len()).sum()
}
