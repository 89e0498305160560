//! Configuration module for rawcheckr

mod classifier;

pub use classifier::{Band, ClassifierConfig, ConfigBuilder};
