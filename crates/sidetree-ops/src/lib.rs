pub mod compose;
pub mod parse;
pub mod wire;

pub use compose::{apply_patches, to_document_view, DocumentView};
pub use parse::{
    parse_create, parse_deactivate, parse_recover, parse_update, ParsedCreate, ParsedDeactivate,
    ParsedRecover, ParsedUpdate,
};
