//! Title normalization and fuzzy matching used to line up records from
//! different sources and catalogs.

mod lookup;
mod normalize;
mod similarity;

pub use lookup::LookupTable;
pub use normalize::{normalize_title, search_query, title_variants};
pub use similarity::{best_match, token_set, token_similarity};
