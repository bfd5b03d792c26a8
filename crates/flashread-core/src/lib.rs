//! Platform-independent RSVP reading core: tokenizer, page index, pacing
//! engine, progress tracking and persistence policies.

#![no_std]

extern crate alloc;

pub mod import;
pub mod input;
pub mod pacer;
pub mod page_index;
pub mod progress;
pub mod session;
pub mod settings;
pub mod storage;
pub mod tokenizer;
