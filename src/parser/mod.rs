//! Document parser: links, plain text, and terms
//!
//! This module turns fetched HTML into the two things the indexer needs:
//! - anchors with their visible text, for the link graph
//! - a linearized text stream, tokenized into positional terms

mod html;
mod tokenizer;

pub use html::{extract_links, extract_text, parse_document, ParsedDocument, RawLink};
pub use tokenizer::tokenize;
