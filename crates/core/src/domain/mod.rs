pub mod contract;
pub mod prediction;
