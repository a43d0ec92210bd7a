pub mod athar;
