mod article;
mod feed;

pub use article::{Article, Enclosure};
pub use feed::{Feed, FetchMeta};
