/*!
 * # Subnotes - cultural notes for subtitles
 *
 * A Rust library that annotates subtitle lines with short cultural
 * explanations produced by an LLM and summarises the notes by category.
 *
 * ## Features
 *
 * - Unpack season archives of `.srt` files
 * - Read subtitle files, keep a leading percentage of lines, count tokens
 * - Generate a cultural note per line and classify it into a closed
 *   vocabulary using various providers:
 *   - OpenAI API
 *   - Anthropic API
 *   - LM Studio (OpenAI-compatible local server)
 * - Bounded concurrent annotation with per-request timeouts
 * - Season result tables, category bar charts, a cross-season count matrix
 *   and heatmap
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `archive`: Season archive extraction
 * - `subtitle_processor`: SRT parsing and line selection
 * - `tokens`: Token estimation
 * - `annotation`: Prompting, note cleanup and category resolution
 * - `season`: Per-season pipeline
 * - `report`: Spreadsheets, category counts and charts
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers:
 *   - `providers::openai`: OpenAI-compatible API client
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
// Test names use camelCase segments
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod annotation;
pub mod app_config;
pub mod app_controller;
pub mod archive;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod report;
pub mod season;
pub mod subtitle_processor;
pub mod tokens;

// Re-export main types for easier usage
pub use annotation::{Annotation, AnnotationGenerator, AnnotationRecord, Category, CategoryVocabulary};
pub use app_config::Config;
pub use errors::{AnnotationError, ProviderError, ReportError, SubtitleError};
pub use language_utils::resolve_language_name;
pub use report::{CategoryCountMatrix, CategoryCounts};
pub use season::{SeasonProcessor, SeasonReport};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
