//! Cache module - Named Moka caches shared across handlers.
//!
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Cheap-to-clone typed handle over a Moka cache
//! - `CacheConfig` - Capacity and expiry settings
//!
//! ## Usage
//!
//! ```rust,ignore
//! let admins = registry.get_or_create::<(i64, u64), Option<AdminInfo>>(
//!     "admin_permissions",
//!     CacheConfig::admin_rights(),
//! );
//! admins.insert(key, info);
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
