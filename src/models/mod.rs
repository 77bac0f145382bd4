mod article;

pub use article::*;
