pub mod hasher;
pub mod hrw;
pub mod partition;
pub mod skeleton;
pub mod tree;
pub mod types;
