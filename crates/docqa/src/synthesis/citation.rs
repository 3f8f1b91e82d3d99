//! Citation construction and key assignment

use std::collections::HashSet;

use crate::types::{Citation, DocumentGroup, LineSpan, RetrievalResult};

/// Produce the alphabetic key for a zero-based citation index
///
/// Keys run A..Z, then AA, AB, ... like spreadsheet columns.
pub fn citation_key(index: usize) -> String {
    let mut index = index;
    let mut key = String::new();
    loop {
        key.insert(0, (b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    key
}

/// Build citations from chunk-level evidence
///
/// One citation per unique (path, span) identity, keys assigned in
/// first-seen order across the evidence sequence.
pub fn build_citations(results: &[RetrievalResult]) -> Vec<Citation> {
    let mut seen: HashSet<(String, Option<LineSpan>)> = HashSet::new();
    let mut citations = Vec::new();

    for result in results {
        if !seen.insert((result.relative_path.clone(), result.line_span)) {
            continue;
        }
        citations.push(Citation {
            key: citation_key(citations.len()),
            relative_path: result.relative_path.clone(),
            line_span: result.line_span,
        });
    }

    citations
}

/// Build citations from document-level evidence, one per document
pub fn build_citations_from_documents(documents: &[DocumentGroup]) -> Vec<Citation> {
    documents
        .iter()
        .enumerate()
        .map(|(index, document)| Citation {
            key: citation_key(index),
            relative_path: document.relative_path.clone(),
            line_span: None,
        })
        .collect()
}

/// Format the key map handed to the model alongside the evidence
pub fn format_key_map(citations: &[Citation]) -> String {
    citations
        .iter()
        .map(Citation::format_key_map_line)
        .collect::<Vec<_>>()
        .join("\n")
}
