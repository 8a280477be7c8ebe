//! Estimation pipeline.
//!
//! Stages, in the order a host runs them:
//! 1. [`clean`] once per session
//! 2. [`partition`] whenever the geography selection changes
//! 3. [`extract`] for each submitted description
//! 4. [`train_and_predict`] with the partition and extracted features
//!
//! [`Estimator`] bundles the stages behind one session object.

pub mod clean;
pub mod encode;
pub mod estimator;
pub mod extract;
pub mod metrics;
pub mod partition;
pub mod prompts;
pub mod split;
pub mod train;

pub use clean::{clean, CleanedDataset};
pub use encode::{Column, ColumnLayout};
pub use estimator::{Estimate, Estimator};
pub use extract::{extract, first_number, parse_extraction_response, ExtractionResponse, ParsedAddress};
pub use metrics::mean_absolute_percentage_error;
pub use partition::{partition, Partition, PriceSummary};
pub use prompts::{format_system_prompt, format_user_prompt, NO_DATA_SENTINEL};
pub use split::{train_test_split, Split};
pub use train::{train_and_predict, train_and_predict_with};
