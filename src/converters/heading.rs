use crate::block::Block;
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters::inline_runs;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// Deepest heading level the target supports; `h4`–`h6` are clamped to it.
pub const MAX_LEVEL: u8 = 3;

pub struct HeadingConverter;

impl BlockConverter for HeadingConverter {
    fn name(&self) -> &'static str {
        "heading"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["heading_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        _ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;
        let token = &tokens[idx];
        let level = level(&token.tag).ok_or_else(|| {
            ConvertError::failed(
                &token.kind,
                idx,
                format!("unknown heading tag `{}`", token.tag),
            )
        })?;

        Ok(Converted::one(
            Block::Heading {
                level: level.min(MAX_LEVEL),
                rich_text: inline_runs(page, tokens, idx, close),
            },
            close + 1,
        ))
    }
}

fn level(tag: &str) -> Option<u8> {
    tag.strip_prefix('h')?
        .parse::<u8>()
        .ok()
        .filter(|level| (1..=6).contains(level))
}
