//! Built-in converters, one module per block family.

pub mod advanced;
pub mod code;
pub mod equation;
pub mod heading;
pub mod list_item;
pub mod media;
pub mod paragraph;
pub mod quote;
pub mod table;

use crate::block::{Block, RichTextRun};
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::error::{ConvertError, RegistryError};
use crate::registry::Registry;
use crate::rich_text::References;
use crate::token::{Token, matching_close};

pub use advanced::{AdvancedConverter, AdvancedKind};
pub use code::CodeConverter;
pub use equation::EquationConverter;
pub use heading::HeadingConverter;
pub use list_item::{ListConverter, ListItemConverter};
pub use media::MediaConverter;
pub use paragraph::ParagraphConverter;
pub use quote::{DividerConverter, QuoteConverter};
pub use table::TableConverter;

pub fn register_builtin(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(ParagraphConverter)?;
    registry.register(HeadingConverter)?;
    registry.register(ListConverter)?;
    registry.register(ListItemConverter)?;
    registry.register(CodeConverter)?;
    registry.register(TableConverter)?;
    registry.register(MediaConverter)?;
    registry.register(EquationConverter)?;
    registry.register(QuoteConverter)?;
    registry.register(DividerConverter)?;
    for kind in AdvancedKind::ALL {
        registry.register(AdvancedConverter::new(kind))?;
    }
    Ok(())
}

/// Segmented text of the `inline` token between `open` and `close`.
pub(crate) fn inline_runs(
    page: &PageBuilder,
    tokens: &[Token],
    open: usize,
    close: usize,
) -> Vec<RichTextRun> {
    tokens
        .get(open + 1..close)
        .and_then(|span| span.iter().find(|t| t.kind == "inline"))
        .map(|inline| {
            page.segmenter()
                .segment_with(&inline.content, &references(&inline.children))
        })
        .unwrap_or_default()
}

/// Definitions behind the reference-style links among an inline token's children.
fn references(children: &[Token]) -> References {
    let mut refs = References::new();
    for child in children {
        let href = match child.kind.as_str() {
            "link_open" => child.attr("href"),
            "image" => child.attr("src"),
            _ => None,
        };
        if let (Some(label), Some(href)) = (child.attr("reference"), href) {
            refs.insert(label, href);
        }
    }
    refs
}

/// Split `tokens[start..end]` into the text of a leading paragraph and the
/// blocks that follow it.
///
/// Used by blocks that carry their own rich text plus children (list items,
/// quotes, callouts, toggles). Without a leading paragraph the rich text is
/// empty and everything becomes children.
pub(crate) fn lead_paragraph(
    tokens: &[Token],
    start: usize,
    end: usize,
    ctx: &mut ConversionContext,
    page: &PageBuilder,
) -> Result<(Vec<RichTextRun>, Vec<Block>), ConvertError> {
    if start < end && tokens[start].kind == "paragraph_open" {
        let close = matching_close(tokens, start)?;
        let rich_text = inline_runs(page, tokens, start, close);
        let children = page.walk(tokens, close + 1, end, ctx)?;
        return Ok((rich_text, children));
    }
    Ok((Vec::new(), page.walk(tokens, start, end, ctx)?))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::block::{Annotations, Block, RichTextRun};
    use crate::builder::{Conversion, PageBuilder};

    pub fn convert(markdown: &str) -> Conversion {
        PageBuilder::with_defaults()
            .unwrap()
            .convert(markdown)
            .unwrap()
    }

    pub fn blocks(markdown: &str) -> Vec<Block> {
        convert(markdown).blocks
    }

    pub fn text(s: &str) -> RichTextRun {
        RichTextRun::text(s, Annotations::default())
    }
}
