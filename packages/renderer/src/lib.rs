//! # Notedown Renderer
//!
//! Turns a parsed node tree into an ordered sequence of preview fragments,
//! one per top-level node. Structural nodes render synchronously; diagram
//! and math blocks go through an external renderer asynchronously, showing
//! their source as a placeholder until the result lands.
//!
//! Fragments are cached by node identity and validated by content hash, so
//! an edit re-renders only what changed and a stale asynchronous result can
//! never overwrite newer content.

pub mod cache;
pub mod external;
pub mod fragment;
pub mod pipeline;
pub mod scheduler;
pub mod sync;

pub use cache::FragmentCache;
pub use external::{Diagnostic, ExternalRenderer, NullRenderer, RenderedMarkup};
pub use fragment::{FragmentKind, FragmentStatus, PreviewNode, RenderedFragment};
pub use pipeline::RenderPipeline;
pub use scheduler::{RenderCompletion, RenderJob, RenderScheduler};
pub use sync::{PreviewAnchor, SyncMap};
