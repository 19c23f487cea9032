use std::fs;
use std::io::{self, Read};

use htmlsoup::{compile, parse_with_options, ParseOptions, Select};
use tracing::{info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: htmlsoup <SELECTOR> [FILE] [--first] [--text] [--attr NAME]
                [--keep-whitespace] [--max-depth N] [--trace]

Reads HTML from FILE (or stdin) and prints the outer HTML of every element
matching SELECTOR, one per line.

  -1, --first           stop after the first match
      --text            print text content instead of markup
      --attr NAME       print attribute NAME instead of markup
      --keep-whitespace do not trim text runs
      --max-depth N     deepest element nesting accepted (default 512)
  -t, --trace           log parsing and matching to stderr";

struct Args {
    pub selector: String,
    pub input: Option<String>,
    pub first: bool,
    pub text: bool,
    pub attr: Option<String>,
    pub keep_whitespace: bool,
    pub max_depth: Option<usize>,
    pub trace: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("htmlsoup: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::DEBUG)
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .finish()
            .init();
        info!("Logger initialized");
    }

    let markup = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    for line in query(&args, &markup)? {
        println!("{}", line);
    }
    Ok(())
}

fn parse_args() -> Result<Args, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        println!("{}", USAGE);
        std::process::exit(0);
    }
    let args = Args {
        first: pargs.contains(["-1", "--first"]),
        text: pargs.contains("--text"),
        attr: pargs.opt_value_from_str("--attr")?,
        keep_whitespace: pargs.contains("--keep-whitespace"),
        max_depth: pargs.opt_value_from_str("--max-depth")?,
        trace: pargs.contains(["-t", "--trace"]),
        selector: pargs.free_from_str()?,
        input: pargs.opt_free_from_str()?,
    };
    Ok(args)
}

/// One output line per match
fn query(args: &Args, markup: &str) -> htmlsoup::Result<Vec<String>> {
    let options = ParseOptions {
        trim_text: !args.keep_whitespace,
        max_depth: args.max_depth.unwrap_or(ParseOptions::default().max_depth),
    };
    let doc = parse_with_options(markup, &options)?;
    let selector = compile(&args.selector)?;

    let span = span!(Level::DEBUG, "query", selector = args.selector.as_str());
    let _enter = span.enter();
    let matches = if args.first {
        selector.select_first(&doc).into_iter().collect()
    } else {
        selector.select(&doc)
    };
    info!(matches = matches.len(), "query finished");
    Ok(matches
        .into_iter()
        .map(|node| match &args.attr {
            Some(name) => node.attr(name).map(ToString::to_string).unwrap_or_default(),
            None if args.text => node.text_content(),
            None => node.outer_html(),
        })
        .collect())
}
