mod arena;
mod handle;
mod node;
mod raw_scapegoat_tree;
mod verify;

pub(crate) use handle::Handle;
pub(crate) use raw_scapegoat_tree::RawScapegoatTree;
pub use verify::VerifyReport;
