pub use portcullis_types::capability::{Feature, Quota, QuotaLimit};
pub use portcullis_types::prelude::*;

// vim: ts=4
