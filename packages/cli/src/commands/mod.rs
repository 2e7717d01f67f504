pub mod check;
pub mod export;

pub use check::{check, CheckArgs};
pub use export::{export, ExportArgs};
