pub mod buffer;
pub mod config;
pub mod dict;
pub mod dispatcher;
pub mod feedback;
pub mod host;
pub mod magic;
pub mod operators;
pub mod resize;
pub mod rng;
pub mod timing;
pub mod tuning;

pub use crate::{
    buffer::Buffer,
    config::MutationConfig,
    dict::Dictionary,
    dispatcher::mutate,
    feedback::CmpFeedback,
    host::MutationHost,
    magic::{MagicValue, MAGIC_VALUES},
    timing::CoverageTiming,
};
