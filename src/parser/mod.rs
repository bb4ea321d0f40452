// Interaction script parser

pub mod ast;
pub mod command;
pub mod lexer;
pub mod pipeline;

pub use ast::{ControlChange, Event, Script};
pub use pipeline::{parse, parse_script};
