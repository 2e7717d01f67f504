use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Edit at {pos} (removing {removed} bytes) falls outside document of length {len}")]
    EditOutOfBounds {
        pos: usize,
        removed: usize,
        len: usize,
    },

    #[error("Edit boundary at {pos} is not a character boundary")]
    NotCharBoundary { pos: usize },
}

impl ParseError {
    pub fn edit_out_of_bounds(pos: usize, removed: usize, len: usize) -> Self {
        Self::EditOutOfBounds { pos, removed, len }
    }

    pub fn not_char_boundary(pos: usize) -> Self {
        Self::NotCharBoundary { pos }
    }
}
