//! Container-based blocks (`::: name args` … `:::`) and `<details>` toggles.

use tracing::warn;

use crate::block::{Annotations, Block, Color, RichTextRun};
use crate::builder::PageBuilder;
use crate::context::{ConversionContext, Diagnostic};
use crate::converters::lead_paragraph;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// The rarely used block kinds, one converter instance each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancedKind {
    Toggle,
    Columns,
    Synced,
    Callout,
    Breadcrumb,
    TableOfContents,
    Mermaid,
    /// Recognised, not convertible.
    Button,
    /// Recognised, not convertible.
    Ai,
}

impl AdvancedKind {
    pub const ALL: [AdvancedKind; 9] = [
        AdvancedKind::Toggle,
        AdvancedKind::Columns,
        AdvancedKind::Synced,
        AdvancedKind::Callout,
        AdvancedKind::Breadcrumb,
        AdvancedKind::TableOfContents,
        AdvancedKind::Mermaid,
        AdvancedKind::Button,
        AdvancedKind::Ai,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AdvancedKind::Toggle => "toggle",
            AdvancedKind::Columns => "columns",
            AdvancedKind::Synced => "synced",
            AdvancedKind::Callout => "callout",
            AdvancedKind::Breadcrumb => "breadcrumb",
            AdvancedKind::TableOfContents => "table_of_contents",
            AdvancedKind::Mermaid => "mermaid",
            AdvancedKind::Button => "button",
            AdvancedKind::Ai => "ai",
        }
    }

    fn token_types(self) -> &'static [&'static str] {
        match self {
            AdvancedKind::Toggle => &["container_toggle_open", "details_open"],
            AdvancedKind::Columns => &["container_columns_open"],
            AdvancedKind::Synced => &["container_synced_open", "container_synced_block_open"],
            AdvancedKind::Callout => &["container_callout_open"],
            AdvancedKind::Breadcrumb => &["container_breadcrumb_open"],
            AdvancedKind::TableOfContents => {
                &["container_toc_open", "container_table_of_contents_open"]
            }
            AdvancedKind::Mermaid => &["container_mermaid_open"],
            AdvancedKind::Button => &["container_button_open"],
            AdvancedKind::Ai => &["container_ai_open", "container_ai_block_open"],
        }
    }
}

pub struct AdvancedConverter {
    kind: AdvancedKind,
}

impl AdvancedConverter {
    pub fn new(kind: AdvancedKind) -> Self {
        Self { kind }
    }

    fn toggle(
        &self,
        tokens: &[Token],
        idx: usize,
        close: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Block, ConvertError> {
        let title = tokens[idx].info.trim();
        let (rich_text, children) = ctx.enter_depth(|ctx| {
            if title.is_empty() {
                lead_paragraph(tokens, idx + 1, close, ctx, page)
            } else {
                Ok((page.segmenter().segment(title), page.walk(tokens, idx + 1, close, ctx)?))
            }
        })?;
        Ok(Block::Toggle {
            rich_text,
            children,
        })
    }

    /// Each `::: column` is one column; anything between them forms a column of its own.
    fn columns(
        &self,
        tokens: &[Token],
        idx: usize,
        close: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Block, ConvertError> {
        let columns = ctx.enter_depth(|ctx| -> Result<Vec<Vec<Block>>, ConvertError> {
            let mut columns = Vec::new();
            let mut stray_start: Option<usize> = None;
            let mut i = idx + 1;

            while i < close {
                if tokens[i].kind == "container_column_open" {
                    if let Some(start) = stray_start.take() {
                        push_column(&mut columns, page.walk(tokens, start, i, ctx)?);
                    }
                    let column_close = matching_close(tokens, i)?;
                    columns.push(page.walk(tokens, i + 1, column_close, ctx)?);
                    i = column_close + 1;
                } else {
                    stray_start.get_or_insert(i);
                    i = matching_close(tokens, i)? + 1;
                }
            }
            if let Some(start) = stray_start {
                push_column(&mut columns, page.walk(tokens, start, close, ctx)?);
            }
            Ok(columns)
        })?;

        if columns.len() < 2 {
            return Err(ConvertError::failed(
                &tokens[idx].kind,
                idx,
                format!("a column list needs at least two columns, found {}", columns.len()),
            ));
        }
        Ok(Block::ColumnList { columns })
    }

    /// `::: callout 🔥 Title`: a leading emoji argument becomes the icon.
    fn callout(
        &self,
        tokens: &[Token],
        idx: usize,
        close: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Block, ConvertError> {
        let (icon, title) = split_icon(tokens[idx].info.trim());
        let (rich_text, children) = ctx.enter_depth(|ctx| {
            if title.is_empty() {
                lead_paragraph(tokens, idx + 1, close, ctx, page)
            } else {
                Ok((page.segmenter().segment(title), page.walk(tokens, idx + 1, close, ctx)?))
            }
        })?;
        Ok(Block::Callout {
            icon: icon.map(str::to_string),
            color: Color::Default,
            rich_text,
            children,
        })
    }

    fn mermaid(&self, token: &Token, page: &PageBuilder) -> Block {
        let source = token.content.trim_end_matches('\n');
        let rich_text = if source.is_empty() {
            Vec::new()
        } else {
            vec![RichTextRun::text(source, Annotations::plain(page.settings().default_color))]
        };
        Block::Code {
            language: "mermaid".to_string(),
            rich_text,
        }
    }
}

impl BlockConverter for AdvancedConverter {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn token_types(&self) -> &'static [&'static str] {
        self.kind.token_types()
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;

        let block = match self.kind {
            AdvancedKind::Toggle => self.toggle(tokens, idx, close, ctx, page)?,
            AdvancedKind::Columns => self.columns(tokens, idx, close, ctx, page)?,
            AdvancedKind::Synced => Block::SyncedBlock {
                children: ctx.enter_depth(|ctx| page.walk(tokens, idx + 1, close, ctx))?,
            },
            AdvancedKind::Callout => self.callout(tokens, idx, close, ctx, page)?,
            AdvancedKind::Breadcrumb => Block::Breadcrumb,
            AdvancedKind::TableOfContents => Block::TableOfContents,
            AdvancedKind::Mermaid => self.mermaid(&tokens[idx], page),
            AdvancedKind::Button | AdvancedKind::Ai => {
                warn!(construct = self.kind.name(), position = idx, "unsupported block");
                ctx.report(Diagnostic::UnsupportedBlock {
                    construct: self.kind.name().to_string(),
                    position: idx,
                });
                return Ok(Converted::empty(close + 1));
            }
        };
        Ok(Converted::one(block, close + 1))
    }
}

fn push_column(columns: &mut Vec<Vec<Block>>, blocks: Vec<Block>) {
    if !blocks.is_empty() {
        columns.push(blocks);
    }
}

/// Split a leading emoji off the container arguments.
fn split_icon(args: &str) -> (Option<&str>, &str) {
    let (first, rest) = match args.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (args, ""),
    };
    let is_emoji = first
        .chars()
        .next()
        .is_some_and(|c| !c.is_ascii() && !c.is_alphanumeric());
    if is_emoji {
        (Some(first), rest)
    } else {
        (None, args)
    }
}
