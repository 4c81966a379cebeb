// Output: the per-group participant x dimension tables, the run summary,
// and terminal display.

pub mod summary;
pub mod table;
pub mod terminal;
