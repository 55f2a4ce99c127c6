//! Asset sources and output naming.

mod kind;
pub mod output;
mod replace;
mod source;

pub use kind::AssetKind;
pub use output::{Artifact, artifact_file_name, gzip_path};
pub use replace::FindReplace;
pub use source::{FetchError, FsReader, SourceReader, SourceRef};
