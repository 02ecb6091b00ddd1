//! Client for the managed unlocking proxy that fronts every storefront request.

mod client;
mod dtos;

pub use client::{UnlockerClient, clean_url};
pub use dtos::UnlockRequest;
