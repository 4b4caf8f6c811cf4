//! Client-side state for the storefront and admin dashboard.
//!
//! UI-framework agnostic: views own a store, call its async actions and
//! render from the resulting [`remote::RemoteData`] values.

pub mod api;
pub mod filters;
pub mod forms;
pub mod guard;
pub mod remote;
pub mod store;
