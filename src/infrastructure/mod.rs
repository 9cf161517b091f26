pub mod extraction;
pub mod gateway;
pub mod observability;
pub mod persistence;
pub mod serving;
