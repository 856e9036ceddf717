pub mod activity;
pub mod party;
pub mod pickup;
pub mod recycler;
pub mod report;
