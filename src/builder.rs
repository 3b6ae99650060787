use std::sync::Arc;

use tracing::{debug, warn};

use crate::block::Block;
use crate::config::Settings;
use crate::context::{ConversionContext, Diagnostic};
use crate::error::{ConvertError, RegistryError};
use crate::parser;
use crate::registry::{BlockConverter, Registry};
use crate::rich_text::Segmenter;
use crate::token::{self, Nesting, Token};

/// Blocks of one document together with what was skipped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub blocks: Vec<Block>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Walks a token stream and dispatches every token to its registered converter.
///
/// The builder is immutable; each [`PageBuilder::convert`] call gets its own
/// [`ConversionContext`], so one builder can serve any number of documents.
#[derive(Debug, Clone)]
pub struct PageBuilder {
    registry: Arc<Registry>,
    settings: Settings,
    segmenter: Segmenter,
}

impl PageBuilder {
    pub fn new(registry: Arc<Registry>, settings: Settings) -> Self {
        let segmenter = Segmenter::new(settings.default_color);
        Self {
            registry,
            settings,
            segmenter,
        }
    }

    /// Builder with every built-in converter and the compiled-in settings.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Ok(Self::new(
            Arc::new(Registry::builtin()?),
            Settings::compiled_default(),
        ))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn lookup(&self, token_type: &str) -> Option<&dyn BlockConverter> {
        self.registry.lookup(token_type)
    }

    /// Tokenize and convert a Markdown document.
    pub fn convert(&self, markdown: &str) -> Result<Conversion, ConvertError> {
        let tokens = parser::parse(markdown);
        self.convert_tokens(&tokens)
    }

    /// Convert an already tokenized document. Pairing is checked up front.
    pub fn convert_tokens(&self, tokens: &[Token]) -> Result<Conversion, ConvertError> {
        token::validate(tokens)?;

        let mut ctx = ConversionContext::new();
        let blocks = self.walk(tokens, 0, tokens.len(), &mut ctx)?;
        let diagnostics = ctx.into_diagnostics();
        debug!(
            blocks = blocks.len(),
            diagnostics = diagnostics.len(),
            "converted document"
        );

        Ok(Conversion {
            blocks,
            diagnostics,
        })
    }

    /// Convert `tokens[start..end]` into blocks.
    ///
    /// Converters call this for their nested content so children go through
    /// the same dispatch and recovery as top-level tokens.
    pub fn walk(
        &self,
        tokens: &[Token],
        start: usize,
        end: usize,
        ctx: &mut ConversionContext,
    ) -> Result<Vec<Block>, ConvertError> {
        let end = end.min(tokens.len());
        let mut blocks = Vec::new();
        let mut idx = start;

        while idx < end {
            let token = &tokens[idx];

            let Some(converter) = self.registry.lookup(&token.kind) else {
                // The close of an unsupported span was already reported with its open
                if token.nesting != Nesting::Close {
                    debug!(kind = %token.kind, position = idx, "no converter");
                    ctx.report(Diagnostic::UnsupportedToken {
                        kind: token.kind.clone(),
                        position: idx,
                    });
                }
                idx += 1;
                continue;
            };

            debug!(kind = %token.kind, position = idx, converter = converter.name(), "dispatch");
            match converter.convert(tokens, idx, ctx, self) {
                Ok(converted) => {
                    if converted.next <= idx {
                        return Err(ConvertError::Stalled {
                            kind: token.kind.clone(),
                            position: idx,
                        });
                    }
                    blocks.extend(converted.blocks);
                    idx = converted.next;
                }
                Err(err) if err.is_recoverable() && !self.settings.strict => {
                    warn!("skipping construct: {err}");
                    let reason = match &err {
                        ConvertError::Failed { reason, .. } => reason.clone(),
                        other => other.to_string(),
                    };
                    ctx.report(Diagnostic::Skipped {
                        kind: token.kind.clone(),
                        position: idx,
                        reason,
                    });
                    idx = token::matching_close(tokens, idx)? + 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(blocks)
    }
}
