//! Search filters, detail queries and page metadata shared by every
//! resource.

mod search_model;


pub use search_model::{page_count, DetailQuery, PageInfo, SearchFilter};
