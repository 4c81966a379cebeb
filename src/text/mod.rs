// Text cleaning: raw response text -> words that exist in the semantic space.

pub mod cleaner;
