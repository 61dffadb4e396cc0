//! URL handling module for Ripple-Search
//!
//! Every URL stored in the index passes through here first. A page is
//! identified by its canonical string, so links discovered on different
//! pages that resolve to the same document share one `url` row.

mod normalize;

pub use normalize::{canonicalize_url, resolve_link};
