/*!
 * Script translation pipeline.
 *
 * This module contains the text processing and dispatch logic. It is split
 * into several submodules:
 *
 * - `escapes`: Escape sequence protection around engine calls
 * - `placeholders`: Markup token to numeric placeholder mapping
 * - `classifier`: Dialogue versus code decisions for quoted spans
 * - `cascade`: Ordered engine chain with circuit breaking
 * - `document`: Line-by-line processing of one document
 * - `batch`: Cool-down between groups of documents
 */

// Re-export main types for easier usage
pub use self::batch::BatchThrottle;
pub use self::cascade::{CascadeDispatcher, EngineState};
pub use self::document::{
    process_document, Classification, DocumentOptions, DocumentStats, ProcessedDocument,
    TextUnit, UnitOutcome,
};
pub use self::placeholders::{PlaceholderMap, TokenFamily};

// Submodules
pub mod batch;
pub mod cascade;
pub mod classifier;
pub mod document;
pub mod escapes;
pub mod placeholders;
