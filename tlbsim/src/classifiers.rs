//! Classifiers

// Modules
pub mod tlb;
