mod collection;
mod state;

pub use collection::{
    delete_files, FetchTicket, FileListing, FilePageListing, PageSource, PagedCollection,
};
pub use state::{total_pages, PaginationState, PAGE_SIZE};
