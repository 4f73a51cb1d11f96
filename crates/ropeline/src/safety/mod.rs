//! Safety compliance: the Company Safety Rating engine and the activity-log import that feeds it.

pub mod activity;
pub mod csr;
