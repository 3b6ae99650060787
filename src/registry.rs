use std::collections::HashMap;
use std::sync::Arc;

use crate::block::Block;
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters;
use crate::error::{ConvertError, RegistryError};
use crate::token::Token;

/// Blocks produced by one converter call and the cursor position after its span.
#[derive(Debug, Clone, PartialEq)]
pub struct Converted {
    pub blocks: Vec<Block>,
    pub next: usize,
}

impl Converted {
    pub fn new(blocks: Vec<Block>, next: usize) -> Self {
        Self { blocks, next }
    }

    pub fn one(block: Block, next: usize) -> Self {
        Self::new(vec![block], next)
    }

    pub fn empty(next: usize) -> Self {
        Self::new(Vec::new(), next)
    }
}

/// Translates the token at `idx` (and the span it opens) into output blocks.
///
/// Implementations must return a `next` strictly greater than `idx`, and may
/// call back into `page` to convert nested content with the same dispatch.
pub trait BlockConverter: Send + Sync {
    /// Name used in diagnostics and registry errors.
    fn name(&self) -> &'static str;

    /// Token types this converter is responsible for.
    fn token_types(&self) -> &'static [&'static str];

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError>;
}

/// Token type → converter table. Built once at startup, read-only afterwards.
#[derive(Default, Clone)]
pub struct Registry {
    converters: HashMap<&'static str, Arc<dyn BlockConverter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in converter.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        converters::register_builtin(&mut registry)?;
        Ok(registry)
    }

    /// Add a converter; claiming a token type twice is a configuration error.
    pub fn register<C>(&mut self, converter: C) -> Result<(), RegistryError>
    where
        C: BlockConverter + 'static,
    {
        for token_type in converter.token_types() {
            if let Some(existing) = self.converters.get(token_type) {
                return Err(RegistryError::Duplicate {
                    token_type,
                    existing: existing.name(),
                    duplicate: converter.name(),
                });
            }
        }

        let converter: Arc<dyn BlockConverter> = Arc::new(converter);
        for token_type in converter.token_types() {
            self.converters.insert(token_type, Arc::clone(&converter));
        }
        Ok(())
    }

    pub fn lookup(&self, token_type: &str) -> Option<&dyn BlockConverter> {
        self.converters.get(token_type).map(|c| c.as_ref())
    }

    /// Registered token types, sorted.
    pub fn token_types(&self) -> Vec<&'static str> {
        let mut types: Vec<&'static str> = self.converters.keys().copied().collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("token_types", &self.token_types())
            .finish()
    }
}
