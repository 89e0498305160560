//! Detection module for rawcheckr

mod result;

pub use result::{sndfile, ClassificationResult, HypothesisScore};
