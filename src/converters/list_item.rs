use tracing::debug;

use crate::block::Block;
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters::lead_paragraph;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// `bullet_list_open` / `ordered_list_open`: opens a numbering scope and
/// converts the items inside it.
pub struct ListConverter;

impl BlockConverter for ListConverter {
    fn name(&self) -> &'static str {
        "list"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["bullet_list_open", "ordered_list_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;
        let blocks = ctx.enter_list(|ctx| {
            debug!(depth = ctx.depth(), kind = %tokens[idx].kind, "entering list");
            page.walk(tokens, idx + 1, close, ctx)
        })?;
        Ok(Converted::new(blocks, close + 1))
    }
}

/// One `list_item_open … list_item_close` span.
///
/// The item's marker decides bulleted vs numbered; a task checkbox turns it
/// into a to-do. The first paragraph is the item's text and everything after
/// it (nested lists included) becomes its children.
pub struct ListItemConverter;

impl BlockConverter for ListItemConverter {
    fn name(&self) -> &'static str {
        "list_item"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["list_item_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;
        let token = &tokens[idx];

        // Numbered before the children so nested lists cannot touch this counter
        let number = is_ordered(&token.markup).then(|| ctx.next_number());
        let (rich_text, children) = lead_paragraph(tokens, idx + 1, close, ctx, page)?;

        let block = match (token.attr("checked"), number) {
            (Some(checked), _) => Block::ToDo {
                checked: checked == "true",
                rich_text,
                children,
            },
            (None, Some(number)) => Block::NumberedListItem {
                number,
                rich_text,
                children,
            },
            (None, None) => Block::BulletedListItem {
                rich_text,
                children,
            },
        };
        Ok(Converted::one(block, close + 1))
    }
}

/// `1.` and `3)` are ordered markers; `-`, `*` and `+` are not.
fn is_ordered(markup: &str) -> bool {
    markup.starts_with(|c: char| c.is_ascii_digit())
        && (markup.ends_with('.') || markup.ends_with(')'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::test_support::{blocks, text};

    fn numbers(blocks: &[Block]) -> Vec<u32> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::NumberedListItem { number, .. } => Some(*number),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bulleted_items() {
        assert_eq!(
            blocks("- one\n- two"),
            vec![
                Block::BulletedListItem {
                    rich_text: vec![text("one")],
                    children: vec![],
                },
                Block::BulletedListItem {
                    rich_text: vec![text("two")],
                    children: vec![],
                },
            ]
        );
    }

    #[test]
    fn literal_markers_do_not_affect_numbering() {
        assert_eq!(numbers(&blocks("1. a\n2. b\n5. c")), [1, 2, 3]);
        assert_eq!(numbers(&blocks("7. a\n7. b")), [1, 2]);
    }

    #[test]
    fn each_list_restarts_at_one() {
        let converted = blocks("1. a\n2. b\n\ntext\n\n1. c\n2. d");
        assert_eq!(numbers(&converted), [1, 2, 1, 2]);
    }

    #[test]
    fn nested_lists_number_independently() {
        let converted = blocks("1. a\n   1. x\n   2. y\n2. b");
        assert_eq!(numbers(&converted), [1, 2]);
        match &converted[0] {
            Block::NumberedListItem { children, .. } => assert_eq!(numbers(children), [1, 2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn nested_bullets_become_children() {
        let converted = blocks("- parent\n  - child");
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].rich_text(), [text("parent")]);
        assert_eq!(converted[0].children()[0].type_name(), "bulleted_list_item");
    }

    #[test]
    fn loose_item_keeps_extra_paragraphs_as_children() {
        let converted = blocks("- first\n\n  second\n- next");
        assert_eq!(converted[0].rich_text(), [text("first")]);
        assert_eq!(converted[0].children(), [Block::paragraph(vec![text("second")])]);
    }

    #[test]
    fn task_items_become_to_dos() {
        let converted = blocks("- [ ] open\n- [x] done");
        assert!(matches!(&converted[0], Block::ToDo { checked: false, .. }));
        assert!(matches!(&converted[1], Block::ToDo { checked: true, .. }));
        assert_eq!(converted[1].rich_text(), [text("done")]);
    }

    #[test]
    fn item_starting_with_code_has_no_text() {
        let converted = blocks("- ```\n  code\n  ```");
        assert!(converted[0].rich_text().is_empty());
        assert_eq!(converted[0].children()[0].type_name(), "code");
    }

    #[test]
    fn marker_kinds() {
        assert!(is_ordered("1."));
        assert!(is_ordered("12)"));
        assert!(!is_ordered("-"));
        assert!(!is_ordered("*"));
    }
}
