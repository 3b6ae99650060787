use crate::block::Block;
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters::{inline_runs, media};
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// `paragraph_open … inline … paragraph_close` → one paragraph block.
///
/// A paragraph whose only content is media (images, keyword links) or a
/// single display equation is handed to the converter registered for that
/// inline token instead, so it becomes media or equation blocks.
pub struct ParagraphConverter;

impl BlockConverter for ParagraphConverter {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["paragraph_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;

        let inline = tokens[idx + 1..close].iter().find(|t| t.kind == "inline");
        if let Some(inline) = inline {
            if let Some(blocks) = promote(&inline.children, ctx, page)? {
                return Ok(Converted::new(blocks, close + 1));
            }
        }

        let rich_text = inline_runs(page, tokens, idx, close);
        Ok(Converted::one(Block::paragraph(rich_text), close + 1))
    }
}

/// Blocks for a paragraph made only of standalone inline constructs, if it is one.
fn promote(
    children: &[Token],
    ctx: &mut ConversionContext,
    page: &PageBuilder,
) -> Result<Option<Vec<Block>>, ConvertError> {
    let mut items = Vec::new();
    let mut i = 0;
    while i < children.len() {
        let child = &children[i];
        if is_blank(child) {
            i += 1;
            continue;
        }
        if child.kind == "math_block" {
            items.push(i);
            i += 1;
            continue;
        }
        match media::span_end(children, i) {
            Some(end) => {
                items.push(i);
                i = end;
            }
            None => return Ok(None),
        }
    }

    // A display equation only stands alone when nothing else shares the paragraph
    let has_math = items.iter().any(|&i| children[i].kind == "math_block");
    if items.is_empty() || (has_math && items.len() > 1) {
        return Ok(None);
    }
    if items.iter().any(|&i| page.lookup(&children[i].kind).is_none()) {
        return Ok(None);
    }
    // Media without a destination stays text
    let unlinked = items
        .iter()
        .any(|&i| children[i].kind != "math_block" && !media::has_url(&children[i]));
    if unlinked {
        return Ok(None);
    }

    let mut blocks = Vec::new();
    for start in items {
        if let Some(converter) = page.lookup(&children[start].kind) {
            blocks.extend(converter.convert(children, start, ctx, page)?.blocks);
        }
    }
    Ok(Some(blocks))
}

fn is_blank(token: &Token) -> bool {
    match token.kind.as_str() {
        "softbreak" | "hardbreak" => true,
        "text" => token.content.trim().is_empty(),
        _ => false,
    }
}
