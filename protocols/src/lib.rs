//! Wire formats of the result endpoint: the search form that is posted and the
//! HTML page that comes back.

pub mod form;
pub mod page;

pub use form::SearchForm;
pub use page::parse_result_page;
