//! Pipeline construction and submission

use crate::batcher::DispatchPredicate;
use crate::config::{BlankNodeScope, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::event::ParseEvent;
use crate::handle::PipelineHandle;
use crate::iter::{Quads, Triples};
use crate::worker;
use std::fmt;
use std::sync::Arc;
use tributary_graph_ir::StreamSink;
use tributary_profile::{ProfileConfig, Source, TermProfile};

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    profile: ProfileConfig,
    premature_dispatch: Option<DispatchPredicate>,
}

impl PipelineBuilder {
    /// Replace all serializable options at once.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    pub fn queue_depth(mut self, queue_depth: usize) -> Self {
        self.config.queue_depth = queue_depth;
        self
    }

    pub fn background(mut self, background: bool) -> Self {
        self.config.background = background;
        self
    }

    pub fn blank_node_scope(mut self, scope: BlankNodeScope) -> Self {
        self.config.blank_node_scope = scope;
        self
    }

    /// Options for the profile built for each submission.
    pub fn profile(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    /// Flush the current batch right after any event for which `predicate`
    /// returns true. Lowers first-item latency at the cost of throughput.
    pub fn premature_dispatch(
        mut self,
        predicate: impl Fn(&ParseEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.premature_dispatch = Some(Arc::new(predicate));
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        self.config.validate()?;
        Ok(Pipeline {
            config: self.config,
            profile: self.profile,
            premature_dispatch: self.premature_dispatch,
        })
    }
}

/// Runs parses on a background worker and delivers their events in batches.
///
/// One worker per submission parses the sources in order, without
/// interleaving. A `Pipeline` is a reusable description; each submission gets
/// its own worker, channel and term profile.
///
/// # Example
///
/// ```
/// use tributary_graph_ir::{CountingSink, Term, Triple};
/// use tributary_pipeline::Pipeline;
/// use tributary_profile::{Emit, Result, Source, TermProfile};
///
/// let reader = |_: &mut TermProfile, out: &mut dyn Emit| -> Result<()> {
///     for n in 0..5 {
///         out.triple(Triple::new(
///             Term::iri(format!("http://example.org/s{n}")),
///             Term::iri("http://example.org/p"),
///             Term::string("o"),
///         ))?;
///     }
///     Ok(())
/// };
///
/// let pipeline = Pipeline::builder().chunk_size(2).build().unwrap();
/// let handle = pipeline
///     .submit(vec![Source::new("doc", reader)], CountingSink::new())
///     .unwrap();
/// let sink = handle.join().unwrap();
/// assert_eq!(sink.triples, 5);
/// assert!(sink.finished);
/// ```
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    profile: ProfileConfig,
    premature_dispatch: Option<DispatchPredicate>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("profile", &self.profile)
            .field("premature_dispatch", &self.premature_dispatch.is_some())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
            profile: ProfileConfig::default(),
            premature_dispatch: None,
        }
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn new_profile(&self) -> Result<TermProfile> {
        TermProfile::from_config(&self.profile).map_err(|abort| PipelineError::Parse(abort.into()))
    }

    /// Start parsing `sources` for delivery onto `sink`.
    ///
    /// Returns as soon as the worker is running; nothing has necessarily been
    /// parsed yet. Drive delivery with [`PipelineHandle::run`] or
    /// [`PipelineHandle::join`].
    pub fn submit<S: StreamSink>(&self, sources: Vec<Source>, sink: S) -> Result<PipelineHandle<S>> {
        let profile = self.new_profile()?;
        self.submit_with_profile(sources, profile, sink)
    }

    /// As [`submit`](Self::submit), with a caller-built profile.
    pub fn submit_with_profile<S: StreamSink>(
        &self,
        sources: Vec<Source>,
        profile: TermProfile,
        sink: S,
    ) -> Result<PipelineHandle<S>> {
        tracing::debug!(
            sources = sources.len(),
            chunk_size = self.config.chunk_size,
            queue_depth = self.config.queue_depth,
            background = self.config.background,
            "submitting pipeline"
        );
        let link = worker::spawn(sources, profile, &self.config, self.premature_dispatch.clone())?;
        Ok(PipelineHandle::new(link, sink))
    }

    /// Pull triples instead of pushing onto a sink.
    pub fn triples(&self, sources: Vec<Source>) -> Result<Triples> {
        let profile = self.new_profile()?;
        let link = worker::spawn(sources, profile, &self.config, self.premature_dispatch.clone())?;
        Ok(Triples::new(link))
    }

    /// Pull quads instead of pushing onto a sink.
    pub fn quads(&self, sources: Vec<Source>) -> Result<Quads> {
        let profile = self.new_profile()?;
        let link = worker::spawn(sources, profile, &self.config, self.premature_dispatch.clone())?;
        Ok(Quads::new(link))
    }
}

/// Parse `sources` on a background worker with default settings, delivering
/// onto `sink` on the calling thread. Returns the sink.
pub fn parse_async<S: StreamSink>(sources: Vec<Source>, sink: S) -> Result<S> {
    Pipeline::default().submit(sources, sink)?.join()
}
