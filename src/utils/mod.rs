pub mod http_client;
pub mod naming;
pub mod pagination;

pub use http_client::{HttpClient, StandardHttpClient};
pub use naming::{blob_file_name, sanitize_display_name};
pub use pagination::{PageSlice, paginate};
