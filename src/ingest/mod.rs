pub mod classifier;
pub mod engine;
pub mod fingerprint;
pub mod hasher;
pub mod scanner;
