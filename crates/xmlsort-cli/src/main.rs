use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use xmlsort::{
    ANDROID_PATTERN, Error, ErrorKind, Options, Pattern, PatternRole, Span, sort_bytes,
    write_document,
};

const AFTER_HELP: &str = "\
Patterns look like element:attr1[=attr3],attr2. Commas separate the items. \
Without the element part a pattern applies to every element, except for \
--omit, where a bare name omits that element entirely.";

#[derive(Debug, Parser)]
#[command(
    name = "xmlsort",
    version,
    about = "Sort XML attributes and elements into a canonical order",
    after_help = AFTER_HELP
)]
struct Args {
    /// Input file, then output file, when not given with -f/-o
    #[arg(value_name = "FILE", num_args = 0..=2)]
    paths: Vec<PathBuf>,

    /// File to open for sort
    #[arg(short = 'f', long = "file", value_name = "INPUT", help_heading = "File options")]
    file: Option<PathBuf>,

    /// File to store the sorted XML (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT", help_heading = "File options")]
    output: Option<PathBuf>,

    /// Update the input file in place instead of an output file
    #[arg(short, long, help_heading = "File options")]
    inplace: bool,

    /// Sort pattern like "element:attr1,attr2,..."
    #[arg(short, long, value_name = "PATTERN", action = ArgAction::Append, help_heading = "Pattern options")]
    pattern: Vec<String>,

    /// Add the Android repo manifest patterns
    #[arg(long, help_heading = "Pattern options")]
    android: bool,

    /// Sort with case-insensitive comparison
    #[arg(short = 'C', long, help_heading = "Sorting options")]
    case_insensitive: bool,

    /// Ignore the comment elements
    #[arg(short = 'c', long = "comment", help_heading = "Sorting options")]
    ignore_comment: bool,

    /// Keep the occurrence order for elements
    #[arg(short = 'k', long = "keep-element-order", help_heading = "Sorting options")]
    keep_order: bool,

    /// Group the elements following an @word(...) comment, with a blank line and the comment ahead
    #[arg(short = 'g', long = "group", help_heading = "Sorting options")]
    use_group: bool,

    /// Omit elements or element attributes during output
    #[arg(
        short = 'r',
        long = "omit",
        visible_alias = "remove",
        value_name = "PATTERN",
        action = ArgAction::Append,
        help_heading = "Other options"
    )]
    omit: Vec<String>,

    /// Remove attr2 if its value equals the value of attr1
    #[arg(
        short = 'x',
        long = "suppress-duplicate",
        value_name = "attr1=attr2",
        action = ArgAction::Append,
        help_heading = "Other options"
    )]
    duplicates: Vec<String>,

    /// Reject documents nested deeper than this many elements (0 means unlimited)
    #[arg(long, value_name = "DEPTH", default_value_t = 256, help_heading = "Other options")]
    max_depth: u16,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<()> {
    let options = build_options(&args)?;

    let mut paths = args.paths.into_iter();
    let Some(input) = args.file.or_else(|| paths.next()) else {
        return Err(Error::new(ErrorKind::MissingInput, Span::empty()).into());
    };
    let mut output = args.output.or_else(|| paths.next());

    if args.inplace {
        if let Some(output) = &output {
            warn!(
                "\"{}\" will be replaced with \"{}\" in place",
                input.display(),
                output.display()
            );
        }
        output = Some(input.clone());
    }

    info!(input = %input.display(), "sorting");
    let content = std::fs::read(&input)
        .with_context(|| format!("failed to read input file {}", input.display()))?;
    let sorted = sort_bytes(&content, &options)
        .with_context(|| format!("failed to sort {}", input.display()))?;

    write_output(output.as_deref(), &sorted)
}

fn build_options(args: &Args) -> Result<Options> {
    let mut specs = args.pattern.clone();
    if args.android {
        specs.extend(ANDROID_PATTERN.iter().map(|spec| spec.to_string()));
    }

    let pattern = Pattern::parse(&specs, PatternRole::Order, args.case_insensitive)
        .context("bad --pattern")?;
    let duplicates = Pattern::parse(&args.duplicates, PatternRole::Duplicate, false)
        .context("bad --suppress-duplicate")?;
    let omit = Pattern::parse(&args.omit, PatternRole::Omit, false).context("bad --omit")?;
    debug!(?pattern, ?duplicates, ?omit, "patterns");

    Ok(Options::new()
        .with_pattern(pattern)
        .with_duplicates(duplicates)
        .with_omit(omit)
        .keep_order(args.keep_order)
        .use_group(args.use_group)
        .ignore_comment(args.ignore_comment)
        .with_max_depth(args.max_depth))
}

fn write_output(path: Option<&Path>, sorted: &str) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to write output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_document(&mut writer, sorted)
                .with_context(|| format!("failed to write output file {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            write_document(&mut stdout, sorted).context("failed to write stdout")
        }
    }
}
