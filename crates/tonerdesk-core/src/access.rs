//! Access policy evaluation.
//!
//! Every check takes the [`Actor`] explicitly and reads nothing else. There are
//! three independent permission dimensions:
//!
//! | Field | Unset or empty means |
//! |-------|----------------------|
//! | `page_permissions` | every page is accessible |
//! | `location_permissions` (per dimension) | every id in that dimension is visible |
//! | `read_write_permissions` | no module is writable |
//!
//! Visibility is open by default while writes are closed by default. Do not
//! "harmonize" the two.
//!
//! # Example
//!
//! ```
//! use tonerdesk_core::access::{Actor, can_access_page, can_write};
//!
//! let actor = Actor::default().with_write_modules(["inventory"]);
//!
//! assert!(can_access_page(&actor, "printers"));
//! assert!(can_write(&actor, "inventory"));
//! assert!(!can_write(&actor, "billing"));
//! ```

use std::borrow::Borrow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Location visibility restrictions. Each dimension is checked on its own;
/// restricting sites says nothing about provinces or departments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocationPermissions {
    #[serde(default)]
    pub provinces: Option<BTreeSet<i64>>,
    #[serde(default)]
    pub sites: Option<BTreeSet<i64>>,
    #[serde(default)]
    pub departments: Option<BTreeSet<i64>>,
}

/// The authenticated principal whose permissions are evaluated.
///
/// The serialized shape matches the `users` permission columns, so `null`,
/// a missing key, and `[]` all deserialize to "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    #[serde(default)]
    pub page_permissions: Option<BTreeSet<String>>,
    #[serde(default)]
    pub location_permissions: Option<LocationPermissions>,
    #[serde(default)]
    pub read_write_permissions: Option<BTreeSet<String>>,
}

impl Actor {
    pub fn with_pages<I, S>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.page_permissions = Some(pages.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_write_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_write_permissions = Some(modules.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_locations(mut self, locations: LocationPermissions) -> Self {
        self.location_permissions = Some(locations);
        self
    }

    pub fn can_access_page(&self, page: &str) -> bool {
        can_access_page(self, page)
    }

    pub fn can_view_province(&self, province_id: i64) -> bool {
        can_view_province(self, province_id)
    }

    pub fn can_view_site(&self, site_id: i64) -> bool {
        can_view_site(self, site_id)
    }

    pub fn can_view_department(&self, department_id: i64) -> bool {
        can_view_department(self, department_id)
    }

    pub fn can_write(&self, module: &str) -> bool {
        can_write(self, module)
    }
}

/// Open-by-default membership: an unset or empty set allows everything.
fn allows_open<T, Q>(set: Option<&BTreeSet<T>>, item: &Q) -> bool
where
    T: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    match set {
        Some(set) if !set.is_empty() => set.contains(item),
        _ => true,
    }
}

/// Closed-by-default membership: an unset or empty set allows nothing.
fn allows_closed<T, Q>(set: Option<&BTreeSet<T>>, item: &Q) -> bool
where
    T: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    match set {
        Some(set) if !set.is_empty() => set.contains(item),
        _ => false,
    }
}

fn location_dimension(
    actor: &Actor,
    pick: impl FnOnce(&LocationPermissions) -> Option<&BTreeSet<i64>>,
    id: i64,
) -> bool {
    match actor.location_permissions.as_ref() {
        None => true,
        Some(locations) => allows_open(pick(locations), &id),
    }
}

/// Returns true when the actor may open the named page.
pub fn can_access_page(actor: &Actor, page: &str) -> bool {
    allows_open(actor.page_permissions.as_ref(), page)
}

pub fn can_view_province(actor: &Actor, province_id: i64) -> bool {
    location_dimension(actor, |l| l.provinces.as_ref(), province_id)
}

pub fn can_view_site(actor: &Actor, site_id: i64) -> bool {
    location_dimension(actor, |l| l.sites.as_ref(), site_id)
}

pub fn can_view_department(actor: &Actor, department_id: i64) -> bool {
    location_dimension(actor, |l| l.departments.as_ref(), department_id)
}

/// Returns true only when the module was explicitly granted write access.
pub fn can_write(actor: &Actor, module: &str) -> bool {
    allows_closed(actor.read_write_permissions.as_ref(), module)
}
