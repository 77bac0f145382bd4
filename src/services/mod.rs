pub mod articles;
pub mod audit;
pub mod reslug;
pub mod resolver;
pub mod slug;
