//! Stage 3: tables
//!
//! Line based. A line whose first non-blank characters are `{|` opens a
//! table; `|}` closes the innermost one. Inside a table:
//!
//! | line starts with | meaning                                       |
//! |------------------|-----------------------------------------------|
//! | `\|-`            | new row, rest of the line is row attributes    |
//! | `\|+`            | caption cell                                   |
//! | `\|`             | data cells, split on `\|\|`                    |
//! | `!`              | header cells, split on `!!` or `\|\|`          |
//! | anything else    | continues the open cell, row or table          |
//!
//! `{{!}}` counts as a pipe wherever table syntax expects one. The newline
//! in front of a structural line belongs to its syntax token. Tables opened
//! inside a cell nest into that cell; an unclosed table ends with the text.

use super::{lines_with_offsets, parse_attributes, Recognizer};
use crate::wikitext::ast::{NodeId, Payload, TokenKind};
use crate::wikitext::parsing::context::BuildContext;
use crate::wikitext::parsing::sentinel::SentinelKind;
use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) struct Tables;

static ESCAPED_PIPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\x00\d+!\x7F").unwrap());

/// Length of the pipe at `at`, literal or escaped
fn pipe_at(text: &str, at: usize) -> Option<usize> {
    let rest = text.get(at..)?;
    if rest.starts_with('|') {
        Some(1)
    } else {
        ESCAPED_PIPE.find(rest).map(|m| m.end())
    }
}

struct Cell {
    td: NodeId,
    content: String,
}

struct OpenTable {
    table: NodeId,
    row: Option<NodeId>,
    cell: Option<Cell>,
}

#[derive(Default)]
struct TableState {
    out: String,
    open: Vec<OpenTable>,
}

impl TableState {
    /// Append text to whatever is innermost: the open cell, row, table, or
    /// the text around tables
    fn emit(&mut self, ctx: &mut BuildContext<'_>, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.open.last_mut() {
            None => self.out.push_str(text),
            Some(OpenTable {
                cell: Some(cell), ..
            }) => cell.content.push_str(text),
            Some(top) => {
                let parent = top.row.unwrap_or(top.table);
                ctx.text(parent, text);
            }
        }
    }

    fn finish_cell(&mut self, ctx: &mut BuildContext<'_>) {
        if let Some(cell) = self.open.last_mut().and_then(|t| t.cell.take()) {
            let inner = ctx.plain(TokenKind::TdInner, &cell.content);
            ctx.attach(cell.td, inner);
        }
    }

    fn open_table(&mut self, ctx: &mut BuildContext<'_>, lead: &str, attrs: &str) {
        self.emit(ctx, lead);
        let table = ctx.token(TokenKind::Table, Payload::None);
        let syntax = ctx.atom(TokenKind::TableSyntax, "{|");
        ctx.attach(table, syntax);
        let attributes = parse_attributes(ctx, attrs);
        ctx.attach(table, attributes);
        self.open.push(OpenTable {
            table,
            row: None,
            cell: None,
        });
    }

    /// Pop the innermost table and leave its sentinel in the enclosing text
    fn close_table(&mut self, ctx: &mut BuildContext<'_>, closing: Option<&str>) {
        self.finish_cell(ctx);
        let Some(top) = self.open.pop() else { return };
        if let Some(closing) = closing {
            let syntax = ctx.atom(TokenKind::TableSyntax, closing);
            ctx.attach(top.table, syntax);
        }
        let sentinel = ctx.sentinel(top.table, SentinelKind::Table);
        self.emit(ctx, &sentinel);
    }

    fn open_row(&mut self, ctx: &mut BuildContext<'_>, syntax: &str, attrs: &str) {
        self.finish_cell(ctx);
        let Some(top) = self.open.last_mut() else { return };
        let table = top.table;
        let tr = ctx.token(TokenKind::Tr, Payload::None);
        let syntax = ctx.atom(TokenKind::TableSyntax, syntax);
        ctx.attach(tr, syntax);
        let attributes = parse_attributes(ctx, attrs);
        ctx.attach(tr, attributes);
        ctx.attach(table, tr);
        if let Some(top) = self.open.last_mut() {
            top.row = Some(tr);
        }
    }

    fn open_cell(&mut self, ctx: &mut BuildContext<'_>, syntax: &str, part: &str) {
        self.finish_cell(ctx);
        let Some(parent) = self.open.last().map(|t| t.row.unwrap_or(t.table)) else {
            return;
        };
        let (attrs, content) = match split_cell_attributes(part) {
            Some((attrs, content)) => (Some(attrs), content),
            None => (None, part),
        };
        let td = ctx.token(
            TokenKind::Td,
            Payload::Td {
                attr_separator: attrs.is_some(),
            },
        );
        let syntax = ctx.atom(TokenKind::TableSyntax, syntax);
        ctx.attach(td, syntax);
        let attributes = parse_attributes(ctx, attrs.unwrap_or(""));
        ctx.attach(td, attributes);
        ctx.attach(parent, td);
        if let Some(top) = self.open.last_mut() {
            top.cell = Some(Cell {
                td,
                content: content.to_string(),
            });
        }
    }
}

/// `class="x" | content` → attributes and content; links and conversions
/// before the pipe mean it is not an attribute separator
fn split_cell_attributes(part: &str) -> Option<(&str, &str)> {
    let pipe = part.find('|')?;
    let attrs = &part[..pipe];
    if attrs.contains("[[") || attrs.contains("-{") {
        return None;
    }
    Some((attrs, &part[pipe + 1..]))
}

/// Split cell text on `||` (and `!!` in header rows), returning each cell
/// with the separator that opens it; the first cell has an empty separator
fn split_cells(text: &str, header: bool) -> Vec<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut cells = Vec::new();
    let mut separator = "";
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let width = match bytes[i] {
            b'|' | b'\0' => pipe_at(text, i).and_then(|a| pipe_at(text, i + a).map(|b| a + b)),
            b'!' if header && bytes.get(i + 1) == Some(&b'!') => Some(2),
            _ => None,
        };
        match width {
            Some(width) => {
                cells.push((separator, &text[start..i]));
                separator = &text[i..i + width];
                i += width;
                start = i;
            }
            None => i += 1,
        }
    }
    cells.push((separator, &text[start..]));
    cells
}

impl Recognizer for Tables {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn recognize(&self, text: &str, ctx: &mut BuildContext<'_>) -> String {
        if !text.contains("{|") {
            return text.to_string();
        }
        let mut state = TableState::default();
        let first_at_line_start = ctx.at_line_start();

        for (offset, line) in lines_with_offsets(text) {
            let newline = if offset == 0 { "" } else { "\n" };
            if offset == 0 && !first_at_line_start {
                state.emit(ctx, line);
                continue;
            }
            let body = line.trim_start_matches([' ', '\t']);
            let lead = format!("{}{}", newline, &line[..line.len() - body.len()]);

            if let Some(attrs) = body.strip_prefix("{|") {
                state.open_table(ctx, &lead, attrs);
                continue;
            }
            if state.open.is_empty() {
                state.emit(ctx, &format!("{newline}{line}"));
                continue;
            }

            if let Some(pipe) = pipe_at(body, 0) {
                let rest = &body[pipe..];
                if let Some(after) = rest.strip_prefix('}') {
                    let closing = format!("{}{}", lead, &body[..pipe + 1]);
                    state.close_table(ctx, Some(&closing));
                    state.emit(ctx, after);
                } else if rest.starts_with('-') {
                    let dashes = rest.len() - rest.trim_start_matches('-').len();
                    let syntax = format!("{}{}", lead, &body[..pipe + dashes]);
                    state.open_row(ctx, &syntax, &rest[dashes..]);
                } else if let Some(caption) = rest.strip_prefix('+') {
                    let syntax = format!("{}{}", lead, &body[..pipe + 1]);
                    state.open_cell(ctx, &syntax, caption);
                } else {
                    for (i, (separator, part)) in split_cells(rest, false).into_iter().enumerate() {
                        let syntax = if i == 0 {
                            format!("{}{}", lead, &body[..pipe])
                        } else {
                            separator.to_string()
                        };
                        state.open_cell(ctx, &syntax, part);
                    }
                }
            } else if let Some(rest) = body.strip_prefix('!') {
                for (i, (separator, part)) in split_cells(rest, true).into_iter().enumerate() {
                    let syntax = if i == 0 {
                        format!("{lead}!")
                    } else {
                        separator.to_string()
                    };
                    state.open_cell(ctx, &syntax, part);
                }
            } else {
                state.emit(ctx, &format!("{newline}{line}"));
            }
        }

        while !state.open.is_empty() {
            state.close_table(ctx, None);
        }
        state.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cells_on_double_pipes() {
        assert_eq!(split_cells(" a || b", false), vec![("", " a "), ("||", " b")]);
        assert_eq!(split_cells(" a !! b", false), vec![("", " a !! b")]);
        assert_eq!(split_cells(" a !! b", true), vec![("", " a "), ("!!", " b")]);
    }

    #[test]
    fn escaped_pipes_count() {
        let text = " a \u{0}3!\u{7f}\u{0}4!\u{7f} b";
        let cells = split_cells(text, false);
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].1, " b");
    }

    #[test]
    fn cell_attributes_stop_at_links() {
        assert_eq!(split_cell_attributes(r#" style="x" | y"#), Some((r#" style="x" "#, " y")));
        assert_eq!(split_cell_attributes(" [[a|b]]"), None);
        assert_eq!(split_cell_attributes(" plain"), None);
    }
}
