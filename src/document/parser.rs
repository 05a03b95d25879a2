//! Grammar loading, parsing and edit descriptors.
//!
//! Each grammar is loaded once per process and shared read-only. Parsers carry
//! mutable state and are not `Sync`, so every thread keeps its own reusable
//! parser per grammar instead.

use std::cell::RefCell;
use std::sync::LazyLock;

use tree_sitter::{InputEdit, Language, Parser, Point, Tree};

use super::position::{advance, LineIndex, Position};
use super::DocumentType;
use crate::error::SyntaxError;

static JSON_LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_json::LANGUAGE.into());
static YAML_LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_yaml::LANGUAGE.into());

thread_local! {
    static JSON_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
    static YAML_PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// The shared grammar for a document type.
pub fn language(document_type: DocumentType) -> &'static Language {
    match document_type {
        DocumentType::Json => &JSON_LANGUAGE,
        DocumentType::Yaml => &YAML_LANGUAGE,
    }
}

/// Parses `text`, reusing `old_tree` for an incremental parse when given.
///
/// The grammars are error tolerant: malformed input still yields a tree, with
/// `ERROR` and missing nodes embedded where recovery happened. An `Err` here
/// means the parser produced nothing at all.
pub fn parse(
    document_type: DocumentType,
    text: &str,
    old_tree: Option<&Tree>,
) -> Result<Tree, SyntaxError> {
    let slot = match document_type {
        DocumentType::Json => &JSON_PARSER,
        DocumentType::Yaml => &YAML_PARSER,
    };

    slot.with(|cell| {
        let mut cell = cell.borrow_mut();
        if cell.is_none() {
            let mut parser = Parser::new();
            parser
                .set_language(language(document_type))
                .map_err(|source| SyntaxError::Language {
                    document_type,
                    source,
                })?;
            *cell = Some(parser);
        }
        let Some(parser) = cell.as_mut() else {
            return Err(SyntaxError::ParseFailed { document_type });
        };

        parser
            .parse(text, old_tree)
            .ok_or(SyntaxError::ParseFailed { document_type })
    })
}

/// A text replacement expressed in editor positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub start: Position,
    pub end: Position,
    pub text: String,
}

impl TextChange {
    pub fn new(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Applies `change` to `old_text`, returning the new text and the grammar
/// edit descriptor that describes the same replacement.
pub fn apply_change(
    old_text: &str,
    lines: &LineIndex,
    change: &TextChange,
) -> Result<(String, InputEdit), SyntaxError> {
    if change.start > change.end {
        return Err(SyntaxError::invalid_edit(format!(
            "start {:?} is after end {:?}",
            change.start, change.end
        )));
    }
    if change.end.line >= lines.line_count() {
        return Err(SyntaxError::invalid_edit(format!(
            "line {} is past the end of a {}-line document",
            change.end.line,
            lines.line_count()
        )));
    }

    let start_position = lines.point_for(old_text, change.start);
    let old_end_position = lines.point_for(old_text, change.end);
    let start_byte = lines
        .offset_of(old_text, start_position)
        .ok_or_else(|| SyntaxError::invalid_edit("start is outside the document"))?;
    let old_end_byte = lines
        .offset_of(old_text, old_end_position)
        .ok_or_else(|| SyntaxError::invalid_edit("end is outside the document"))?;

    let mut new_text = String::with_capacity(old_text.len() + change.text.len());
    new_text.push_str(&old_text[..start_byte]);
    new_text.push_str(&change.text);
    new_text.push_str(&old_text[old_end_byte..]);

    let edit = InputEdit {
        start_byte,
        old_end_byte,
        new_end_byte: start_byte + change.text.len(),
        start_position,
        old_end_position,
        new_end_position: advance(start_position, &change.text),
    };
    Ok((new_text, edit))
}

/// Checks that `edit` is consistent with the old and new content lengths.
pub fn validate_edit(edit: &InputEdit, old_len: usize, new_len: usize) -> Result<(), SyntaxError> {
    if edit.start_byte > edit.old_end_byte || edit.start_byte > edit.new_end_byte {
        return Err(SyntaxError::invalid_edit("edit range is inverted"));
    }
    if edit.old_end_byte > old_len {
        return Err(SyntaxError::invalid_edit(format!(
            "old end byte {} exceeds the previous content length {}",
            edit.old_end_byte, old_len
        )));
    }
    if edit.new_end_byte > new_len {
        return Err(SyntaxError::invalid_edit(format!(
            "new end byte {} exceeds the new content length {}",
            edit.new_end_byte, new_len
        )));
    }
    if old_len - edit.old_end_byte != new_len - edit.new_end_byte {
        return Err(SyntaxError::invalid_edit(
            "text after the edit does not line up with the new content",
        ));
    }
    Ok(())
}

/// Convenience for callers building descriptors by hand.
pub fn input_edit(
    start_byte: usize,
    old_end_byte: usize,
    new_end_byte: usize,
    start_position: Point,
    old_end_position: Point,
    new_end_position: Point,
) -> InputEdit {
    InputEdit {
        start_byte,
        old_end_byte,
        new_end_byte,
        start_position,
        old_end_position,
        new_end_position,
    }
}
