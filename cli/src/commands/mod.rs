pub mod rank;
pub mod serve;
