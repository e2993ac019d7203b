pub mod input;
pub mod parser;
pub mod prompts;
pub mod providers;
