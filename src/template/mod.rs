//! Template module - scanning and parsing Mustache source into a tag tree

mod delimiters;
mod parser;
mod pragma;
mod scanner;
mod tag;

pub use delimiters::Delimiters;
pub use parser::{parse, parse_named};
pub use pragma::Pragma;
pub use scanner::Scanner;
pub use tag::{Tag, TagId, TagKind, Template};
