pub mod subnets;

pub use subnets::SubnetPolicy;
