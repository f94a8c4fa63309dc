//! Summary statistics for generation reports.
//!
//! ```
//! use evoflap_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([3.0, 1.0, 2.0]).unwrap();
//! assert_eq!(stats.min, 1.0);
//! assert_eq!(stats.median, 2.0);
//! ```

pub mod descriptive;
