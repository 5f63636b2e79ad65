// SPDX-License-Identifier: AGPL-3.0-or-later
//! Local filesystem backend for filekit
//!
//! [`LocalFile`] implements the handle contract on top of `std::fs`;
//! [`RootRegistry`] lists the filesystem roots once per process.

mod local;
mod provider;
mod roots;

pub use local::LocalFile;
pub use provider::LocalProvider;
pub use roots::RootRegistry;
