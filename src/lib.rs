//! ctxeval - In-context vs out-of-context machine translation evaluation
//!
//! Translates news test sets through third-party MT providers once as a whole
//! document and once sentence by sentence, then scores both with BLEU, TER and
//! chrF against human references.

pub mod cli;
pub mod compare;
pub mod config;
pub mod corpus;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod report;
pub mod translate;
