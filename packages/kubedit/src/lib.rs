pub mod combine;
pub mod document;
pub mod editset;
pub mod error;
pub mod merge;
pub mod navigation;
pub mod position;
pub mod value;
pub mod writer;

pub use combine::{combine, combine_all, ManifestEdit};
pub use document::{ManifestDocument, Notation, SourceDocument};
pub use editset::{EditSet, Update};
pub use error::Error;
pub use kubedit_parsers::Range;
pub use navigation::{map_node_of, object_of, MapNode, MappingReference};
pub use position::Position;
pub use value::MergeValue;
