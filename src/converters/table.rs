use crate::block::{Block, RichTextRun};
use crate::builder::PageBuilder;
use crate::context::ConversionContext;
use crate::converters::inline_runs;
use crate::error::ConvertError;
use crate::registry::{BlockConverter, Converted};
use crate::token::{Token, matching_close};

/// `table_open … table_close` → one table block with a row per source row.
pub struct TableConverter;

impl BlockConverter for TableConverter {
    fn name(&self) -> &'static str {
        "table"
    }

    fn token_types(&self) -> &'static [&'static str] {
        &["table_open"]
    }

    fn convert(
        &self,
        tokens: &[Token],
        idx: usize,
        _ctx: &mut ConversionContext,
        page: &PageBuilder,
    ) -> Result<Converted, ConvertError> {
        let close = matching_close(tokens, idx)?;

        let mut rows: Vec<Vec<Vec<RichTextRun>>> = Vec::new();
        let mut has_column_header = false;
        let mut i = idx + 1;
        while i < close {
            let token = &tokens[i];
            match token.kind.as_str() {
                "thead_open" => has_column_header = true,
                "tr_open" => rows.push(Vec::new()),
                "th_open" | "td_open" => {
                    let cell_close = matching_close(tokens, i)?;
                    let cell = inline_runs(page, tokens, i, cell_close);
                    match rows.last_mut() {
                        Some(row) => row.push(cell),
                        None => {
                            return Err(ConvertError::failed(
                                &token.kind,
                                i,
                                "table cell outside a row",
                            ));
                        }
                    }
                    i = cell_close;
                }
                _ => {}
            }
            i += 1;
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Err(ConvertError::failed(&tokens[idx].kind, idx, "table has no columns"));
        }
        for row in &mut rows {
            row.resize_with(width, Vec::new);
        }

        Ok(Converted::one(
            Block::Table {
                width,
                has_column_header,
                rows,
            },
            close + 1,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Annotations, plain_text};
    use crate::context::Diagnostic;
    use crate::converters::test_support::{blocks, convert, text};

    #[test]
    fn two_by_two() {
        assert_eq!(
            blocks("| a | b |\n|---|---|\n| 1 | 2 |"),
            vec![Block::Table {
                width: 2,
                has_column_header: true,
                rows: vec![
                    vec![vec![text("a")], vec![text("b")]],
                    vec![vec![text("1")], vec![text("2")]],
                ],
            }]
        );
    }

    #[test]
    fn cells_are_segmented() {
        let converted = blocks("| name |\n|---|\n| **bold** |");
        let Block::Table { rows, .. } = &converted[0] else {
            panic!("expected a table");
        };
        let bold = Annotations {
            bold: true,
            ..Annotations::default()
        };
        assert_eq!(rows[1][0], vec![RichTextRun::text("bold", bold)]);
    }

    #[test]
    fn short_rows_are_padded() {
        let converted = blocks("| a | b | c |\n|---|---|---|\n| 1 |");
        let Block::Table { width, rows, .. } = &converted[0] else {
            panic!("expected a table");
        };
        assert_eq!(*width, 3);
        assert!(rows.iter().all(|row| row.len() == 3));
        assert_eq!(plain_text(&rows[1][0]), "1");
        assert!(rows[1][2].is_empty());
    }

    #[test]
    fn escaped_pipe_stays_in_cell() {
        let converted = blocks("| a \\| b |\n|---|\n| c |");
        let Block::Table { rows, .. } = &converted[0] else {
            panic!("expected a table");
        };
        assert_eq!(plain_text(&rows[0][0]), "a | b");
    }

    #[test]
    fn empty_table_is_skipped() {
        let tokens = vec![Token::open("table_open", "table"), Token::close("table_close", "table")];
        let conversion = PageBuilder::with_defaults()
            .unwrap()
            .convert_tokens(&tokens)
            .unwrap();
        assert!(conversion.blocks.is_empty());
        assert!(matches!(
            &conversion.diagnostics[..],
            [Diagnostic::Skipped { reason, .. }] if reason == "table has no columns"
        ));
        // Regular tables never hit that path
        assert!(convert("| x |\n|---|").diagnostics.is_empty());
    }
}
