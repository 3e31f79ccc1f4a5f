//! Stage driver
//!
//! `parse_once(id, n)` applies stage `n` to one container. Applied to the
//! root, it then applies the same stage to every accumulator member in
//! construction order, including members created along the way, before the
//! root's counter advances. That makes a flat loop over stages behave
//! breadth-first over the whole document.

use super::accumulator::Accumulator;
use super::build;
use super::context::BuildContext;
use super::error::ParseError;
use super::stages::{recognizer_for, MAX_STAGE};
use crate::wikitext::ast::{NodeId, NodeKind, Tree};
use crate::wikitext::config::Config;
use std::sync::Arc;
use tracing::debug;

/// Knobs of a single parse
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Parse as a transcluded page: `<noinclude>` blocks are hidden and
    /// `<includeonly>` content is live
    pub include: bool,
    /// Stop after this many stages; unreached constructs stay literal text
    pub max_stage: u8,
    pub config: Arc<Config>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include: false,
            max_stage: MAX_STAGE,
            config: Config::shared_default(),
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, include: bool) -> Self {
        self.include = include;
        self
    }

    pub fn max_stage(mut self, max_stage: u8) -> Self {
        self.max_stage = max_stage.min(MAX_STAGE);
        self
    }

    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = config;
        self
    }
}

/// Apply `stage` to container `id`
///
/// No-op when `id` is not a generic container holding a single text child,
/// when it already went past `stage`, or when its text is empty.
pub(crate) fn parse_once(ctx: &mut BuildContext<'_>, id: NodeId, stage: u8) {
    let Some(token) = ctx.tree.token(id) else {
        return;
    };
    let kind = token.kind;
    let Some(current) = token.stage else {
        return;
    };
    if !kind.is_plain() || current > stage || stage >= MAX_STAGE {
        return;
    }
    let Some(recognizer) = recognizer_for(stage) else {
        return;
    };

    let text_child = match ctx.tree.children(id) {
        [only] if ctx.tree.is_text(*only) => Some(*only),
        _ => None,
    };
    if let Some(text_child) = text_child {
        let text = match ctx.tree.kind(text_child) {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Token(_) => String::new(),
        };
        if !text.is_empty() {
            ctx.stage = stage;
            ctx.owner = kind;
            let rewritten = recognizer.recognize(&text, ctx);
            ctx.tree.set_text_raw(text_child, rewritten);
        }
    }

    if id == ctx.tree.root() {
        let mut index = 0;
        while let Some(member) = ctx.accum.get(index) {
            parse_once(ctx, member, stage);
            index += 1;
        }
        debug!(
            stage,
            recognizer = recognizer.name(),
            tokens = ctx.accum.len(),
            "stage applied"
        );
    }

    if let Some(token) = ctx.tree.token_mut(id) {
        token.stage = Some(stage + 1);
    }
}

/// A parse in progress
///
/// Owns the tree and accumulator of one document. Stages can be stepped one
/// at a time, which is what the pipeline tests use to look at pending text;
/// [`parse_with`] simply runs every stage and builds.
pub struct ParseSession {
    tree: Tree,
    accum: Accumulator,
    include: bool,
    built: bool,
}

impl ParseSession {
    pub fn new(text: &str, options: &ParseOptions) -> Self {
        let source: String = text.chars().filter(|&c| c != '\0' && c != '\x7F').collect();
        Self {
            tree: Tree::with_source(&source, Arc::clone(&options.config), options.include),
            accum: Accumulator::new(),
            include: options.include,
            built: false,
        }
    }

    /// Next stage to apply to the root, `None` once built
    pub fn stage(&self) -> Option<u8> {
        self.tree.token(self.tree.root()).and_then(|t| t.stage)
    }

    /// Apply the next stage; returns false when there is nothing left to run
    pub fn run_stage(&mut self) -> bool {
        let Some(stage) = self.stage().filter(|&s| s < MAX_STAGE) else {
            return false;
        };
        let root = self.tree.root();
        let mut tree = self.tree.trusted();
        let mut ctx = BuildContext::new(&mut tree, &mut self.accum, self.include);
        parse_once(&mut ctx, root, stage);
        true
    }

    /// Apply stages until the root reaches `max_stage`
    pub fn run_until(&mut self, max_stage: u8) {
        while self.stage().is_some_and(|s| s < max_stage.min(MAX_STAGE)) {
            self.run_stage();
        }
    }

    /// Root text with sentinels in place of recognized constructs
    pub fn pending_text(&self) -> String {
        self.tree.to_string(self.tree.root())
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accum
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Resolve every sentinel into the node it stands for; a no-op once built
    pub fn build(&mut self) -> Result<(), ParseError> {
        if self.built {
            return Ok(());
        }
        let stage = self.stage().unwrap_or(MAX_STAGE);
        let mut tree = self.tree.trusted();
        build::build(&mut tree, &self.accum, stage)?;
        drop(tree);
        self.built = true;
        Ok(())
    }

    /// Build and hand the tree over
    pub fn finish(mut self) -> Result<Tree, ParseError> {
        self.build()?;
        Ok(self.tree)
    }
}

/// Parse `text` with the built-in configuration
pub fn parse(text: &str, include: bool, max_stage: u8) -> Result<Tree, ParseError> {
    parse_with(
        text,
        &ParseOptions::default()
            .include(include)
            .max_stage(max_stage),
    )
}

pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Tree, ParseError> {
    let mut session = ParseSession::new(text, options);
    session.run_until(options.max_stage);
    debug!(
        tokens = session.accumulator().len(),
        include = options.include,
        "stages complete, building"
    );
    session.finish()
}
