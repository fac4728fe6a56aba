mod field;
mod snapshot;

pub use field::{FieldName, Origin};
pub use snapshot::FormSnapshot;
