pub mod bundle;
pub mod placement;
pub mod record;
pub mod writer;

pub use bundle::{GridBundle, GridBundleBuilder, BUNDLE_VERSION};
pub use placement::{place_trees, TreePlacement};
pub use record::{GridRecord, NO_DATA_VALUE};
pub use writer::{read_bitcode, read_json, read_raw_grid, write_bitcode, write_json, write_raw_grid, ExportResult};
