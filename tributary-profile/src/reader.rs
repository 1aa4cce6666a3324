//! Reader seam: how a syntax reader hands events to its destination
//!
//! A reader drives a [`TermProfile`] to build terms and pushes the results
//! into an [`Emit`] destination. The destination is either a sink directly
//! ([`SinkEmitter`], used by [`parse_direct`]) or the pipeline's batcher.
//! Every emit can fail, which is how a cancelled pipeline stops a reader
//! mid-document.

use crate::error::Result;
use crate::profile::TermProfile;
use std::fmt;
use tributary_graph_ir::{Quad, StreamSink, Triple};

/// Destination for a reader's output.
pub trait Emit {
    fn base(&mut self, iri: &str) -> Result<()>;

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<()>;

    fn triple(&mut self, triple: Triple) -> Result<()>;

    fn quad(&mut self, quad: Quad) -> Result<()>;
}

/// A syntax reader over one input.
///
/// Implementations build every term through `profile` and stop at the first
/// error, returning it unchanged.
pub trait RdfReader: Send {
    fn read(&mut self, profile: &mut TermProfile, out: &mut dyn Emit) -> Result<()>;
}

impl<F> RdfReader for F
where
    F: FnMut(&mut TermProfile, &mut dyn Emit) -> Result<()> + Send,
{
    fn read(&mut self, profile: &mut TermProfile, out: &mut dyn Emit) -> Result<()> {
        self(profile, out)
    }
}

/// One input of a parse run: a reader plus the base IRI to start from.
pub struct Source {
    name: String,
    base: Option<String>,
    reader: Box<dyn RdfReader>,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl Source {
    pub fn new(name: impl Into<String>, reader: impl RdfReader + 'static) -> Self {
        Self {
            name: name.into(),
            base: None,
            reader: Box::new(reader),
        }
    }

    /// Base IRI in effect at the start of this source.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    /// Prepare `profile` for this source and run the reader.
    pub fn read(
        mut self,
        profile: &mut TermProfile,
        reset_blank_nodes: bool,
        out: &mut dyn Emit,
    ) -> Result<()> {
        profile.reset_for_source(self.base.as_deref(), reset_blank_nodes)?;
        self.reader.read(profile, out)
    }
}

/// Adapter that forwards emitted events straight to a sink.
pub struct SinkEmitter<'a, S: StreamSink + ?Sized> {
    sink: &'a mut S,
}

impl<'a, S: StreamSink + ?Sized> SinkEmitter<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }
}

impl<S: StreamSink + ?Sized> Emit for SinkEmitter<'_, S> {
    fn base(&mut self, iri: &str) -> Result<()> {
        self.sink.base(iri);
        Ok(())
    }

    fn prefix(&mut self, prefix: &str, iri: &str) -> Result<()> {
        self.sink.prefix(prefix, iri);
        Ok(())
    }

    fn triple(&mut self, triple: Triple) -> Result<()> {
        self.sink.triple(triple);
        Ok(())
    }

    fn quad(&mut self, quad: Quad) -> Result<()> {
        self.sink.quad(quad);
        Ok(())
    }
}

/// Parse `sources` in order on the calling thread, straight into `sink`.
///
/// Blank node labels share one scope across all sources. `finish` is called
/// only when every source parsed cleanly; on failure the remaining sources
/// are dropped unread and the error is returned as the reader raised it.
pub fn parse_direct<S: StreamSink + ?Sized>(
    sources: Vec<Source>,
    profile: &mut TermProfile,
    sink: &mut S,
) -> Result<()> {
    sink.start();
    let mut out = SinkEmitter::new(sink);
    let mut sources = sources.into_iter();
    for source in sources.by_ref() {
        let name = source.name.clone();
        tracing::debug!(source = %name, "parsing source");
        if let Err(e) = source.read(profile, false, &mut out) {
            let skipped = sources.len();
            if skipped > 0 {
                tracing::debug!(source = %name, skipped, "source failed; skipping remaining sources");
            }
            return Err(e);
        }
    }
    sink.finish();
    Ok(())
}
