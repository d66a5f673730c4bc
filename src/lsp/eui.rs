//! Language service for EUI markup files.
//!
//! Line-local only: the text before the cursor is classified into one of a
//! few completion contexts, and each context maps to one vocabulary table.
//! No tokenizer, no tree, no document-wide validation.

use lsp_types::{CompletionItem, CompletionItemKind, Position, Range};

use super::vocabulary::{KeywordSpec, Vocabulary};
use super::{HoverInfo, LanguageService};

/// Language identifier the editor associates with this service.
pub const LANGUAGE_ID: &str = "eui";

/// Characters that should make the editor ask for fresh completions.
pub const TRIGGER_CHARACTERS: &[char] = &['=', '"', ' ', ',', '.', '('];

/// What the author is expected to type next on the current line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineContext {
    /// No `=` on the line yet.
    AwaitingKeyword,
    /// A registered keyword directly followed by `=`.
    AwaitingParameter(&'static KeywordSpec),
    /// Inside a `click="` event value.
    AwaitingAction,
    /// Nothing applies.
    Empty,
}

/// Classify the line text before the cursor.
///
/// Rules apply in order: no `=` at all, then a trailing `keyword =`, then a
/// `click="` anywhere on the line. A trailing keyword wins over `click="`
/// when both are present.
pub fn classify(line: &str, vocab: &Vocabulary) -> LineContext {
    if !line.contains('=') {
        return LineContext::AwaitingKeyword;
    }

    if let Some(keyword) = trailing_assignment(line).and_then(|word| vocab.keyword(word)) {
        return LineContext::AwaitingParameter(keyword);
    }

    if line.contains("click=\"") {
        return LineContext::AwaitingAction;
    }

    LineContext::Empty
}

/// Turn a context into suggestion items. Every call builds new items.
pub fn resolve(context: &LineContext, vocab: &Vocabulary) -> Vec<CompletionItem> {
    match context {
        LineContext::AwaitingKeyword => vocab
            .keywords()
            .iter()
            .map(|k| {
                suggestion(
                    k.name,
                    CompletionItemKind::KEYWORD,
                    k.description,
                    k.name.to_string(),
                )
            })
            .collect(),
        LineContext::AwaitingParameter(keyword) => keyword
            .params
            .iter()
            // Pre-open the quoted value; the closing quote is left to the author.
            .map(|p| {
                suggestion(
                    p.name,
                    CompletionItemKind::FIELD,
                    p.description,
                    format!("{}=\"", p.name),
                )
            })
            .collect(),
        LineContext::AwaitingAction => vocab
            .actions()
            .iter()
            .map(|a| {
                suggestion(
                    a.name,
                    CompletionItemKind::FUNCTION,
                    a.description,
                    a.name.to_string(),
                )
            })
            .collect(),
        LineContext::Empty => Vec::new(),
    }
}

fn suggestion(
    label: &str,
    kind: CompletionItemKind,
    detail: &str,
    insert_text: String,
) -> CompletionItem {
    CompletionItem {
        label: label.to_string(),
        kind: Some(kind),
        detail: Some(detail.to_string()),
        insert_text: Some(insert_text),
        ..Default::default()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The word in a trailing `word =` (whitespace allowed around `=`).
fn trailing_assignment(line: &str) -> Option<&str> {
    let before = line.trim_end().strip_suffix('=')?.trim_end();
    let start = before
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(i, _)| i)?;
    Some(&before[start..])
}

/// Byte offset of a UTF-16 column within `line`, clamped to the line end.
fn byte_offset(line: &str, utf16_col: u32) -> usize {
    let mut units = 0u32;
    for (i, c) in line.char_indices() {
        if units >= utf16_col {
            return i;
        }
        units += c.len_utf16() as u32;
    }
    line.len()
}

fn utf16_len(s: &str) -> u32 {
    s.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Text of line `pos.line` up to the cursor.
fn line_prefix(content: &str, pos: Position) -> &str {
    let line = content.lines().nth(pos.line as usize).unwrap_or("");
    &line[..byte_offset(line, pos.character)]
}

/// Language service for `.eui` / `.ewui` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuiService {
    vocab: Vocabulary,
}

impl EuiService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Completions for a line already cut at the cursor.
    pub fn complete_line(&self, line: &str) -> Vec<CompletionItem> {
        resolve(&classify(line, &self.vocab), &self.vocab)
    }
}

impl LanguageService for EuiService {
    fn completions(&self, content: &str, pos: Position) -> Vec<CompletionItem> {
        self.complete_line(line_prefix(content, pos))
    }

    fn hover(&self, content: &str, pos: Position) -> Option<HoverInfo> {
        let line = content.lines().nth(pos.line as usize)?;
        let col = byte_offset(line, pos.character);

        let is_token = |c: char| c.is_alphanumeric() || c == '_';
        let start = line[..col]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_token(*c))
            .last()
            .map_or(col, |(i, _)| i);
        let end = line[col..]
            .char_indices()
            .find(|(_, c)| !is_token(*c))
            .map_or(line.len(), |(i, _)| col + i);
        if start == end {
            return None;
        }
        let token = &line[start..end];

        let lead = line.trim_start();
        let lead_word = &lead[..lead.find(|c: char| !is_word_char(c)).unwrap_or(lead.len())];
        let line_keyword = self.vocab.keyword(lead_word);
        let is_lead = start == line.len() - lead.len();

        let text = if let Some(kw) = line_keyword.filter(|k| is_lead && k.name == token) {
            let mut text = format!("**{}**\n{}", kw.name, kw.description);
            if !kw.params.is_empty() {
                text.push_str("\nParams:");
                for p in kw.params {
                    text.push_str(&format!("\n  {}: {}", p.name, p.description));
                }
            }
            text
        } else if let Some(param) =
            line_keyword.and_then(|k| k.params.iter().find(|p| p.name == token))
        {
            format!("**{}**\n{}", param.name, param.description)
        } else if let Some(action) = self.vocab.action(token) {
            format!("**{}**\n{}", action.name, action.description)
        } else {
            return None;
        };

        Some(HoverInfo {
            content: text,
            range: Some(Range::new(
                Position::new(pos.line, utf16_len(&line[..start])),
                Position::new(pos.line, utf16_len(&line[..end])),
            )),
        })
    }
}
