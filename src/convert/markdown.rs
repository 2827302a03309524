//! DOM-walking HTML → Markdown renderer.
//!
//! The default conversion strategy: a recursive walk over the parsed
//! document emitting ATX headings, `-` bullet lists, fenced code blocks,
//! `**`/`_` emphasis, and GitHub-flavored tables. `<script>` and `<style>`
//! subtrees are dropped entirely.
//!
//! Table separator rows follow the GFM conventions: a separator is placed
//! after the first `<thead>` row, or after the first row of a `<tbody>`
//! whose first row is made of `<th>` cells when the table has no
//! `<thead>`; a table that would otherwise have no separator gets one
//! synthesized after its first row.

use ego_tree::NodeRef;
use regex::Regex;
use scraper::{Html, Node};
use std::sync::LazyLock;

static MULTI_BLANK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n{3,}").expect("BUG: hardcoded regex r\"\\n{3,}\" is statically valid")
});

/// Subtrees that never contribute to the Markdown output.
const DROPPED_TAGS: [&str; 6] = ["script", "style", "head", "noscript", "template", "svg"];

/// Convert an HTML document to Markdown.
///
/// Empty or whitespace-only input yields an empty string.
#[must_use]
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_document(html);
    let mut out = String::new();
    render_children(document.tree.root(), &mut out);

    let collapsed = MULTI_BLANK.replace_all(&out, "\n\n");
    collapsed.trim().to_string()
}

fn render_children(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        render_node(child, out);
    }
}

fn render_node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => push_text(out, text),
        Node::Element(element) => {
            let tag = element.name();
            if DROPPED_TAGS.contains(&tag) {
                return;
            }
            match tag {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level = tag[1..].parse::<usize>().unwrap_or(1);
                    let text = single_line(&inline_text(node));
                    if !text.is_empty() {
                        ensure_blank_line(out);
                        out.push_str(&"#".repeat(level));
                        out.push(' ');
                        out.push_str(&text);
                        ensure_blank_line(out);
                    }
                }
                "p" => {
                    let text = inline_text(node);
                    let text = text.trim();
                    if !text.is_empty() {
                        ensure_blank_line(out);
                        out.push_str(text);
                        ensure_blank_line(out);
                    }
                }
                "br" => out.push('\n'),
                "hr" => {
                    ensure_blank_line(out);
                    out.push_str("---");
                    ensure_blank_line(out);
                }
                "pre" => render_code_block(node, out),
                "ul" | "ol" => {
                    ensure_blank_line(out);
                    render_list(node, out, 0);
                    ensure_blank_line(out);
                }
                "blockquote" => {
                    let mut inner = String::new();
                    render_children(node, &mut inner);
                    let inner = MULTI_BLANK.replace_all(&inner, "\n\n");
                    let inner = inner.trim();
                    if !inner.is_empty() {
                        ensure_blank_line(out);
                        for line in inner.lines() {
                            out.push_str("> ");
                            out.push_str(line);
                            out.push('\n');
                        }
                        ensure_blank_line(out);
                    }
                }
                "table" => render_table(node, out),
                "a" | "strong" | "b" | "em" | "i" | "code" | "img" | "span" | "small" | "sub"
                | "sup" | "mark" | "abbr" | "time" | "label" => {
                    render_inline(node, out);
                }
                "dt" | "dd" | "figcaption" | "caption" | "summary" | "li" => {
                    let text = inline_text(node);
                    let text = text.trim();
                    if !text.is_empty() {
                        ensure_newline(out);
                        out.push_str(text);
                        ensure_newline(out);
                    }
                }
                _ => {
                    // Generic container: recurse with block separation.
                    ensure_blank_line(out);
                    render_children(node, out);
                    ensure_blank_line(out);
                }
            }
        }
        _ => render_children(node, out),
    }
}

// ---------------------------------------------------------------------------
// Inline rendering
// ---------------------------------------------------------------------------

fn inline_text(node: NodeRef<'_, Node>) -> String {
    let mut buffer = String::new();
    for child in node.children() {
        render_inline(child, &mut buffer);
    }
    buffer.trim().to_string()
}

fn render_inline(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => push_text(out, text),
        Node::Element(element) => {
            let tag = element.name();
            if DROPPED_TAGS.contains(&tag) {
                return;
            }
            match tag {
                "strong" | "b" => wrap_inline(node, out, "**"),
                "em" | "i" => wrap_inline(node, out, "_"),
                "code" => {
                    let code = single_line(&raw_text(node));
                    if !code.is_empty() {
                        out.push('`');
                        out.push_str(&code);
                        out.push('`');
                    }
                }
                "a" => {
                    let inner = inline_text(node);
                    match element.attr("href") {
                        Some(href) if !href.trim().is_empty() => {
                            let label = if inner.is_empty() {
                                href.trim()
                            } else {
                                inner.as_str()
                            };
                            out.push('[');
                            out.push_str(label);
                            out.push_str("](");
                            out.push_str(href.trim());
                            out.push(')');
                        }
                        _ => out.push_str(&inner),
                    }
                }
                "img" => {
                    if let Some(src) = element.attr("src") {
                        let alt = element.attr("alt").unwrap_or_default().trim().to_string();
                        out.push_str("![");
                        out.push_str(&alt);
                        out.push_str("](");
                        out.push_str(src.trim());
                        out.push(')');
                    }
                }
                "br" => out.push('\n'),
                _ => {
                    for child in node.children() {
                        render_inline(child, out);
                    }
                }
            }
        }
        _ => {
            for child in node.children() {
                render_inline(child, out);
            }
        }
    }
}

fn wrap_inline(node: NodeRef<'_, Node>, out: &mut String, marker: &str) {
    let inner = inline_text(node);
    if inner.is_empty() {
        return;
    }
    if !out.is_empty() && !out.ends_with(char::is_whitespace) && !out.ends_with(['(', '[']) {
        out.push(' ');
    }
    out.push_str(marker);
    out.push_str(&inner);
    out.push_str(marker);
}

/// Append collapsed text, preserving single word-boundary spaces.
fn push_text(out: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        // Whitespace-only run: keep one separating space mid-line.
        if !out.is_empty() && !out.ends_with(char::is_whitespace) {
            out.push(' ');
        }
        return;
    }

    let has_leading_ws = text.starts_with(|c: char| c.is_whitespace());
    if has_leading_ws && !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(|c: char| c.is_whitespace()) {
        out.push(' ');
    }
}

/// All descendant text verbatim, whitespace preserved.
fn raw_text(node: NodeRef<'_, Node>) -> String {
    let mut buffer = String::new();
    collect_raw_text(node, &mut buffer);
    buffer
}

fn collect_raw_text(node: NodeRef<'_, Node>, buffer: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => buffer.push_str(text),
            _ => collect_raw_text(child, buffer),
        }
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

fn render_list(list: NodeRef<'_, Node>, out: &mut String, depth: usize) {
    let ordered = matches!(list.value(), Node::Element(el) if el.name() == "ol");
    let mut index: usize = 1;

    for child in list.children() {
        let Node::Element(element) = child.value() else {
            continue;
        };
        if element.name() != "li" {
            continue;
        }

        let mut line = String::new();
        let mut nested = Vec::new();
        for item_child in child.children() {
            match item_child.value() {
                Node::Element(el) if matches!(el.name(), "ul" | "ol") => nested.push(item_child),
                _ => render_inline(item_child, &mut line),
            }
        }

        let marker = if ordered {
            format!("{index}.")
        } else {
            "-".to_string()
        };
        index += 1;

        ensure_newline(out);
        out.push_str(&"  ".repeat(depth));
        out.push_str(&marker);
        out.push(' ');
        out.push_str(&single_line(&line));
        out.push('\n');

        for sublist in nested {
            render_list(sublist, out, depth + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Code blocks
// ---------------------------------------------------------------------------

fn render_code_block(pre: NodeRef<'_, Node>, out: &mut String) {
    let language = pre
        .children()
        .find_map(|child| match child.value() {
            Node::Element(el) if el.name() == "code" => el.attr("class").and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
                    .map(str::to_string)
            }),
            _ => None,
        })
        .unwrap_or_default();

    let body = raw_text(pre);
    let body = body.trim_matches('\n');

    ensure_blank_line(out);
    out.push_str("```");
    out.push_str(&language);
    out.push('\n');
    out.push_str(body);
    out.push_str("\n```");
    ensure_blank_line(out);
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(PartialEq, Eq, Clone, Copy)]
enum RowSection {
    Thead,
    FirstTbody,
    Other,
}

struct TableRow {
    cells: Vec<String>,
    has_header_cells: bool,
    section: RowSection,
}

fn render_table(table: NodeRef<'_, Node>, out: &mut String) {
    let mut rows = Vec::new();
    let mut saw_tbody = false;

    for child in table.children() {
        let Node::Element(element) = child.value() else {
            continue;
        };
        match element.name() {
            "caption" => {
                let caption = inline_text(child);
                if !caption.is_empty() {
                    ensure_blank_line(out);
                    out.push_str(&caption);
                    ensure_blank_line(out);
                }
            }
            "thead" => collect_rows(child, RowSection::Thead, &mut rows),
            "tbody" => {
                let section = if saw_tbody {
                    RowSection::Other
                } else {
                    RowSection::FirstTbody
                };
                saw_tbody = true;
                collect_rows(child, section, &mut rows);
            }
            "tfoot" => collect_rows(child, RowSection::Other, &mut rows),
            "tr" => collect_row(child, RowSection::Other, &mut rows),
            _ => {}
        }
    }

    if rows.is_empty() {
        return;
    }

    let has_thead = rows.iter().any(|row| row.section == RowSection::Thead);
    let mut separator_after = if has_thead {
        rows.iter().position(|row| row.section == RowSection::Thead)
    } else {
        rows.iter()
            .position(|row| row.section == RowSection::FirstTbody)
            .filter(|&first| rows[first].has_header_cells)
    };
    if separator_after.is_none() {
        separator_after = Some(0);
    }

    ensure_blank_line(out);
    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for cell in &row.cells {
            out.push(' ');
            out.push_str(cell);
            out.push_str(" |");
        }
        out.push('\n');
        if separator_after == Some(i) {
            out.push('|');
            for _ in &row.cells {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }
    ensure_blank_line(out);
}

fn collect_rows(section_node: NodeRef<'_, Node>, section: RowSection, rows: &mut Vec<TableRow>) {
    for child in section_node.children() {
        if matches!(child.value(), Node::Element(el) if el.name() == "tr") {
            collect_row(child, section, rows);
        }
    }
}

fn collect_row(tr: NodeRef<'_, Node>, section: RowSection, rows: &mut Vec<TableRow>) {
    let mut cells = Vec::new();
    let mut has_header_cells = false;

    for child in tr.children() {
        let Node::Element(element) = child.value() else {
            continue;
        };
        match element.name() {
            "th" => {
                has_header_cells = true;
                cells.push(cell_text(child));
            }
            "td" => cells.push(cell_text(child)),
            _ => {}
        }
    }

    if !cells.is_empty() {
        rows.push(TableRow {
            cells,
            has_header_cells,
            section,
        });
    }
}

fn cell_text(cell: NodeRef<'_, Node>) -> String {
    single_line(&inline_text(cell)).replace('|', "\\|")
}

// ---------------------------------------------------------------------------
// Buffer helpers
// ---------------------------------------------------------------------------

fn ensure_blank_line(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if out.is_empty() || out.ends_with("\n\n") {
        return;
    }
    if out.ends_with('\n') {
        out.push('\n');
    } else {
        out.push_str("\n\n");
    }
}

fn ensure_newline(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
    if out.is_empty() || out.ends_with('\n') {
        return;
    }
    out.push('\n');
}
