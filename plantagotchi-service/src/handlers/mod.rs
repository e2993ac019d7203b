//! HTTP handlers for the plantagotchi service.

pub mod meta;
pub mod question;
pub mod species;
