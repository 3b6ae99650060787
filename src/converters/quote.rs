use crate::block::{Block, Color};
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters::lead_paragraph;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// Block quotes, and GFM alerts (`> [!TIP]`) as coloured callouts.
pub struct QuoteConverter;

impl BlockConverter for QuoteConverter {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["blockquote_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;
        let (rich_text, children) =
            ctx.enter_depth(|ctx| lead_paragraph(tokens, idx + 1, close, ctx, page))?;

        let block = match alert_style(&tokens[idx].info) {
            Some((icon, color)) => Block::Callout {
                icon: Some(icon.to_string()),
                color,
                rich_text,
                children,
            },
            None => Block::Quote {
                rich_text,
                children,
            },
        };
        Ok(Converted::one(block, close + 1))
    }
}

/// Emoji and background colour for each alert kind.
fn alert_style(kind: &str) -> Option<(&'static str, Color)> {
    match kind {
        "note" => Some(("ℹ️", Color::BlueBackground)),
        "tip" => Some(("💡", Color::GreenBackground)),
        "important" => Some(("❗", Color::PurpleBackground)),
        "warning" => Some(("⚠️", Color::YellowBackground)),
        "caution" => Some(("🛑", Color::RedBackground)),
        _ => None,
    }
}

/// Thematic breaks.
pub struct DividerConverter;

impl BlockConverter for DividerConverter {
    fn name(&self) -> &'static str {
        "divider"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["hr"]
    }

    fn convert(
        &self,
        _tokens: &[Token],
        idx: usize,
        _ctx: &mut ConversionContext,
        _page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        Ok(Converted::one(Block::Divider, idx + 1))
    }
}
