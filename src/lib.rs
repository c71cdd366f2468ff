//! FRIDAY assistant panel.
//!
//! A small desktop assistant: a typed or spoken query is looked up against a
//! page-summary service, the answer is typed into the transcript while it is
//! spoken aloud, and a keyword search jumps to the site's static pages.

pub mod app;
pub mod config;
pub mod conversation;
pub mod input;
pub mod lookup;
pub mod render;
pub mod search;
pub mod speech;
