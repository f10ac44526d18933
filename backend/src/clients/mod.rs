//! Clients for the two external collaborators this service depends on: the
//! payment tracking API (report datasets) and blob storage (artifacts).
//! Both sit behind traits so handlers and jobs can be exercised against
//! in-memory stubs.

pub mod storage;
pub mod tracking;
