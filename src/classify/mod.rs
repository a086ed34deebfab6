pub mod bucket;
pub mod movement;

pub use bucket::{buckets_on, classify_bucket, Bucket, BucketThresholds};
pub use movement::{classify_movement, movements_between, Movement};
