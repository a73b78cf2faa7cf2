mod render;
mod types;

pub use render::render;
pub use types::{FileChange, FileStatus};

// Typed access to parsed lines, used by tests
#[allow(unused_imports)]
pub use render::{parse_hunk_header, parse_patch, NO_PATCH_PLACEHOLDER};
#[allow(unused_imports)]
pub use types::{DiffHunk, DiffLine, DiffLineType};
