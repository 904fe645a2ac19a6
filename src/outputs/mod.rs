//! Output generation for the harvested news.
//!
//! # Submodules
//!
//! - [`dataset`]: the CSV dataset. Appends batches, seeds the file on first
//!   run, and publishes the canonical snapshot the ticker reads
//!
//! # Output Structure
//!
//! ```text
//! data_dir/
//! ├── final_new.csv  # working dataset, grows every cycle
//! └── news.csv       # last published snapshot
//! ```

pub mod dataset;
