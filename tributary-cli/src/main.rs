mod cli;
mod error;
mod output;

use clap::Parser;
use cli::Cli;
use error::{exit_with_error, CliError, CliResult};
use output::PrintSink;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tributary_graph_ir::CountingSink;
use tributary_nquads::{file_source, NQuadsReader, Syntax};
use tributary_pipeline::{Pipeline, Source};
use tributary_profile::{LogErrorHandler, PrefixIndex, TermProfile};
use tributary_vocab::prefixes;

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::EnvFilter;

    // --quiet silences everything; otherwise RUST_LOG wins over the defaults
    let filter = if cli.quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if cli.verbose {
                EnvFilter::new("info,tributary_pipeline=debug,tributary_nquads=debug")
            } else {
                EnvFilter::new("warn")
            }
        })
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr),
    );

    let _ = tracing::dispatcher::set_global_default(tracing::Dispatch::new(subscriber));
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        exit_with_error(e);
    }
}

fn open_source(path: &Path, syntax: Option<Syntax>) -> CliResult<Source> {
    if path.as_os_str() == "-" {
        let syntax = syntax.unwrap_or(Syntax::NQuads);
        let reader = NQuadsReader::new(BufReader::new(std::io::stdin()), syntax);
        return Ok(Source::new("<stdin>", reader));
    }
    file_source(path, syntax).map_err(|e| CliError::Input(format!("{}: {e}", path.display())))
}

fn run(cli: Cli) -> CliResult<()> {
    let mut user_prefixes = PrefixIndex::new();
    for (prefix, iri) in &cli.prefixes {
        user_prefixes.add(prefix, iri);
    }

    let handler = if cli.strict {
        LogErrorHandler::strict()
    } else {
        LogErrorHandler::default()
    };
    let mut builder = TermProfile::builder()
        .checking(!cli.no_check)
        .error_handler(Arc::new(handler))
        .prefixes(user_prefixes.clone());
    if let Some(base) = &cli.base {
        builder = builder.base(base.clone());
    }
    let profile = builder
        .build()
        .map_err(|abort| CliError::Usage(format!("--base: {abort}")))?;

    let pipeline = Pipeline::builder()
        .chunk_size(cli.chunk_size)
        .queue_depth(cli.queue_depth)
        .background(cli.background)
        .build()?;

    let syntax = cli.syntax.map(Syntax::from);
    let sources = cli
        .files
        .iter()
        .map(|path| open_source(path, syntax))
        .collect::<CliResult<Vec<_>>>()?;

    info!(
        files = sources.len(),
        chunk_size = cli.chunk_size,
        queue_depth = cli.queue_depth,
        checking = !cli.no_check,
        "starting parse"
    );
    let start = Instant::now();

    if cli.print {
        let mut abbreviations = PrefixIndex::with_prefixes(prefixes::STANDARD.iter().copied());
        for (prefix, iri) in user_prefixes.iter() {
            abbreviations.add(prefix, iri);
        }
        let out = BufWriter::new(std::io::stdout().lock());
        let sink = pipeline
            .submit_with_profile(sources, profile, PrintSink::new(out, abbreviations))?
            .join()?;
        let statements = sink.finish_output()?;
        info!(
            statements,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "parse complete"
        );
    } else {
        let mut handle = pipeline.submit_with_profile(sources, profile, CountingSink::new())?;
        handle.run()?;
        let stats = handle.stats();
        let sink = handle.join()?;
        let elapsed = start.elapsed();
        println!(
            "{} triples, {} quads, {} prefixes, {} bases in {:.3}s ({} batches)",
            sink.triples,
            sink.quads,
            sink.prefixes,
            sink.bases,
            elapsed.as_secs_f64(),
            stats.batches
        );
    }

    Ok(())
}
