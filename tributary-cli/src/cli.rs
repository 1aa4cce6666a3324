use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tributary_nquads::Syntax;
use tributary_pipeline::{DEFAULT_CHUNK_SIZE, DEFAULT_QUEUE_DEPTH};

#[derive(Parser, Debug)]
#[command(
    name = "tributary",
    version,
    about = "Parse N-Triples / N-Quads through a batched background pipeline"
)]
pub struct Cli {
    /// Input files, parsed in order. `-` reads standard input.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Input syntax. Guessed from each file's extension when omitted.
    #[arg(long, value_enum)]
    pub syntax: Option<SyntaxArg>,

    /// Maximum number of events per batch
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, env = "TRIBUTARY_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Number of batches buffered between parser and consumer
    #[arg(long, default_value_t = DEFAULT_QUEUE_DEPTH, env = "TRIBUTARY_QUEUE_DEPTH")]
    pub queue_depth: usize,

    /// Detach the parse worker instead of joining it on shutdown
    #[arg(long)]
    pub background: bool,

    /// Skip term validation
    #[arg(long, conflicts_with = "strict")]
    pub no_check: bool,

    /// Abort on warnings, not just errors
    #[arg(long)]
    pub strict: bool,

    /// Base IRI for relative references
    #[arg(long, value_name = "IRI")]
    pub base: Option<String>,

    /// Prefix binding for output abbreviation, repeatable
    #[arg(long = "prefix", value_name = "PREFIX=IRI", value_parser = parse_prefix)]
    pub prefixes: Vec<(String, String)>,

    /// Print statements instead of counting them
    #[arg(long)]
    pub print: bool,

    /// Log progress and validation details to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// No logging at all
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SyntaxArg {
    /// N-Triples
    Nt,
    /// N-Quads
    Nq,
}

impl From<SyntaxArg> for Syntax {
    fn from(arg: SyntaxArg) -> Self {
        match arg {
            SyntaxArg::Nt => Syntax::NTriples,
            SyntaxArg::Nq => Syntax::NQuads,
        }
    }
}

fn parse_prefix(s: &str) -> Result<(String, String), String> {
    let (prefix, iri) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PREFIX=IRI, got '{s}'"))?;
    let prefix = prefix.trim().trim_end_matches(':');
    if iri.is_empty() {
        return Err(format!("empty namespace IRI for prefix '{prefix}'"));
    }
    Ok((prefix.to_string(), iri.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefix() {
        assert_eq!(
            parse_prefix("ex=http://example.org/").unwrap(),
            ("ex".to_string(), "http://example.org/".to_string())
        );
        assert_eq!(
            parse_prefix("ex:=http://example.org/").unwrap().0,
            "ex"
        );
        assert_eq!(parse_prefix("=http://example.org/").unwrap().0, "");
        assert!(parse_prefix("ex").is_err());
        assert!(parse_prefix("ex=").is_err());
    }

    #[test]
    fn test_args() {
        let cli = Cli::try_parse_from([
            "tributary",
            "--chunk-size",
            "500",
            "--prefix",
            "ex=http://example.org/",
            "--syntax",
            "nq",
            "a.nq",
            "b.nq",
        ])
        .unwrap();
        assert_eq!(cli.chunk_size, 500);
        assert_eq!(cli.queue_depth, DEFAULT_QUEUE_DEPTH);
        assert_eq!(cli.files.len(), 2);
        assert_eq!(cli.prefixes.len(), 1);
        assert_eq!(cli.syntax.map(Syntax::from), Some(Syntax::NQuads));
    }

    #[test]
    fn test_conflicting_flags() {
        assert!(Cli::try_parse_from(["tributary", "--no-check", "--strict", "a.nt"]).is_err());
        assert!(Cli::try_parse_from(["tributary"]).is_err());
    }
}
