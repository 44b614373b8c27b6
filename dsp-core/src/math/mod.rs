//! Numeric building blocks shared by filter design and model estimation

pub mod arrays;
pub mod linalg;
pub mod simplex;
pub mod special;
