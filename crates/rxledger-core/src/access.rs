//! # Access & Navigation
//!
//! Role → menu and role → route tables, plus a path matcher.
//!
//! ```text
//! has_access("/branch/sales/pos?tab=1", "cashier")
//!     │
//!     ├── normalise ──────► /branch/sales/pos
//!     ├── public?  ───────► no
//!     ├── developer? ─────► no
//!     └── allow-list ─────► "/branch/sales" is a segment prefix ──► true
//! ```
//!
//! Allow-list patterns may contain `:param` segments, each matching exactly
//! one path segment. Everything here is static data and pure functions.

use serde::Serialize;
use std::fmt;

// =============================================================================
// Roles
// =============================================================================

/// A user role. Strings that name no known role parse to [`Role::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Developer,
    TenantAdmin,
    BranchManager,
    Pharmacist,
    Cashier,
    InventoryClerk,
    Unknown,
}

impl Role {
    pub fn parse(s: &str) -> Role {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "developer" => Role::Developer,
            "tenant_admin" => Role::TenantAdmin,
            "branch_manager" => Role::BranchManager,
            "pharmacist" => Role::Pharmacist,
            "cashier" => Role::Cashier,
            "inventory_clerk" => Role::InventoryClerk,
            _ => Role::Unknown,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::TenantAdmin => "tenant_admin",
            Role::BranchManager => "branch_manager",
            Role::Pharmacist => "pharmacist",
            Role::Cashier => "cashier",
            Role::InventoryClerk => "inventory_clerk",
            Role::Unknown => "unknown",
        }
    }

    /// Route patterns this role may open, besides public paths.
    fn allowed_routes(&self) -> &'static [&'static str] {
        match self {
            Role::Developer => &["/"],
            Role::TenantAdmin => &["/tenant", "/branch"],
            Role::BranchManager => &["/branch"],
            Role::Pharmacist => &[
                "/branch/dashboard",
                "/branch/sales",
                "/branch/customers",
                "/branch/inventory/products",
                "/branch/purchases/:id/view",
            ],
            Role::Cashier => &["/branch/dashboard", "/branch/sales", "/branch/customers"],
            Role::InventoryClerk => &[
                "/branch/dashboard",
                "/branch/inventory",
                "/branch/purchases",
                "/branch/suppliers",
            ],
            Role::Unknown => &[],
        }
    }

    /// Returns true if this role may open `path`.
    pub fn can_access(&self, path: &str) -> bool {
        let path = normalize_path(path);

        if PUBLIC_PATHS.contains(&path.as_str()) {
            return true;
        }
        if *self == Role::Developer {
            return true;
        }

        let segments = split_segments(&path);
        self.allowed_routes()
            .iter()
            .any(|pattern| pattern_matches_prefix(pattern, &segments))
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::parse(s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Path Matching
// =============================================================================

/// Paths every visitor may open, matched exactly.
pub const PUBLIC_PATHS: &[&str] = &["/", "/login", "/unauthorized"];

/// Strips query, fragment, repeated and trailing slashes.
///
/// ```rust
/// use rxledger_core::access::normalize_path;
///
/// assert_eq!(normalize_path("/branch//sales/?x=1#top"), "/branch/sales");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let segments = split_segments(&path[..end]);
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// True when every pattern segment matches the corresponding leading path
/// segment. `:name` matches any single segment.
fn pattern_matches_prefix(pattern: &str, path: &[&str]) -> bool {
    let pattern = split_segments(pattern);
    if pattern.len() > path.len() {
        return false;
    }
    pattern
        .iter()
        .zip(path)
        .all(|(p, s)| p.starts_with(':') || p == s)
}

/// Checks whether a role (by name) may open `path`.
///
/// ## Example
/// ```rust
/// use rxledger_core::access::has_access;
///
/// assert!(has_access("/branch/sales/pos", "cashier"));
/// assert!(!has_access("/tenant/users", "cashier"));
/// ```
pub fn has_access(path: &str, role: &str) -> bool {
    Role::parse(role).can_access(path)
}

// =============================================================================
// Menus
// =============================================================================

/// One navigation entry; `children` nest at most one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
    pub children: &'static [MenuEntry],
}

const fn entry(label: &'static str, path: &'static str, icon: &'static str) -> MenuEntry {
    MenuEntry {
        label,
        path,
        icon,
        children: &[],
    }
}

const fn group(
    label: &'static str,
    path: &'static str,
    icon: &'static str,
    children: &'static [MenuEntry],
) -> MenuEntry {
    MenuEntry {
        label,
        path,
        icon,
        children,
    }
}

const SALES_GROUP: MenuEntry = group(
    "Sales",
    "/branch/sales",
    "shopping-cart",
    &[
        entry("Point of Sale", "/branch/sales/pos", "scan"),
        entry("Sales History", "/branch/sales/history", "receipt"),
        entry("Refunds", "/branch/sales/refunds", "undo"),
    ],
);

const INVENTORY_GROUP: MenuEntry = group(
    "Inventory",
    "/branch/inventory",
    "package",
    &[
        entry("Products", "/branch/inventory/products", "pill"),
        entry("Stock Levels", "/branch/inventory/stock", "layers"),
    ],
);

const PURCHASES_GROUP: MenuEntry = group(
    "Purchases",
    "/branch/purchases",
    "truck",
    &[
        entry("Purchase Orders", "/branch/purchases/orders", "clipboard"),
        entry("Suppliers", "/branch/suppliers", "factory"),
    ],
);

const BRANCH_DASHBOARD: MenuEntry = entry("Dashboard", "/branch/dashboard", "gauge");
const CUSTOMERS: MenuEntry = entry("Customers", "/branch/customers", "users");

const DEVELOPER_MENU: &[MenuEntry] = &[
    entry("Tenants", "/developer/tenants", "building"),
    entry("System Health", "/developer/health", "activity"),
];

const TENANT_ADMIN_MENU: &[MenuEntry] = &[
    entry("Overview", "/tenant/dashboard", "gauge"),
    entry("Branches", "/tenant/branches", "map-pin"),
    entry("Users", "/tenant/users", "user-cog"),
    BRANCH_DASHBOARD,
    SALES_GROUP,
    INVENTORY_GROUP,
    PURCHASES_GROUP,
    CUSTOMERS,
];

const BRANCH_MANAGER_MENU: &[MenuEntry] = &[
    BRANCH_DASHBOARD,
    SALES_GROUP,
    INVENTORY_GROUP,
    PURCHASES_GROUP,
    CUSTOMERS,
];

const PHARMACIST_MENU: &[MenuEntry] = &[
    BRANCH_DASHBOARD,
    SALES_GROUP,
    entry("Products", "/branch/inventory/products", "pill"),
    CUSTOMERS,
];

const CASHIER_MENU: &[MenuEntry] = &[
    BRANCH_DASHBOARD,
    entry("Point of Sale", "/branch/sales/pos", "scan"),
    entry("Sales History", "/branch/sales/history", "receipt"),
    CUSTOMERS,
];

const INVENTORY_CLERK_MENU: &[MenuEntry] = &[BRANCH_DASHBOARD, INVENTORY_GROUP, PURCHASES_GROUP];

/// Ordered navigation menu for a role. Unknown roles get none.
pub fn menu_for(role: Role) -> &'static [MenuEntry] {
    match role {
        Role::Developer => DEVELOPER_MENU,
        Role::TenantAdmin => TENANT_ADMIN_MENU,
        Role::BranchManager => BRANCH_MANAGER_MENU,
        Role::Pharmacist => PHARMACIST_MENU,
        Role::Cashier => CASHIER_MENU,
        Role::InventoryClerk => INVENTORY_CLERK_MENU,
        Role::Unknown => &[],
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 7] = [
        Role::Developer,
        Role::TenantAdmin,
        Role::BranchManager,
        Role::Pharmacist,
        Role::Cashier,
        Role::InventoryClerk,
        Role::Unknown,
    ];

    fn flatten(menu: &[MenuEntry]) -> Vec<&'static str> {
        menu.iter()
            .flat_map(|e| std::iter::once(e.path).chain(e.children.iter().map(|c| c.path)))
            .collect()
    }

    #[test]
    fn test_cashier_routes() {
        assert!(has_access("/branch/sales/pos", "cashier"));
        assert!(!has_access("/tenant/users", "cashier"));
        assert!(!has_access("/branch/purchases", "cashier"));
    }

    #[test]
    fn test_prefix_is_segment_wise() {
        // "/branch/sales" must not authorise "/branch/salesreport"
        assert!(!has_access("/branch/salesreport", "cashier"));
        assert!(has_access("/branch/sales/", "cashier"));
    }

    #[test]
    fn test_param_segments_match_one_segment() {
        assert!(has_access("/branch/purchases/po-17/view", "pharmacist"));
        assert!(has_access("/branch/purchases/po-17/view/lines", "pharmacist"));
        assert!(!has_access("/branch/purchases/po-17/edit", "pharmacist"));
        assert!(!has_access("/branch/purchases", "pharmacist"));
    }

    #[test]
    fn test_public_paths_are_exact() {
        for role in ALL_ROLES {
            assert!(role.can_access("/login"));
            assert!(role.can_access("/"));
            assert!(role.can_access("/unauthorized?from=/tenant"));
        }
        assert!(!has_access("/login/admin", "cashier"));
    }

    #[test]
    fn test_developer_and_unknown() {
        assert!(has_access("/anything/at/all", "developer"));
        assert!(!has_access("/branch/dashboard", "janitor"));
        assert_eq!(Role::parse("Tenant-Admin"), Role::TenantAdmin);
        assert_eq!(Role::parse("janitor"), Role::Unknown);
    }

    #[test]
    fn test_every_menu_entry_is_reachable() {
        for role in ALL_ROLES {
            for path in flatten(menu_for(role)) {
                assert!(role.can_access(path), "{} cannot open its own menu entry {}", role, path);
            }
        }
    }

    #[test]
    fn test_menus_nest_one_level() {
        for role in ALL_ROLES {
            for entry in menu_for(role) {
                assert!(entry.children.iter().all(|c| c.children.is_empty()));
            }
        }
        assert!(menu_for(Role::Unknown).is_empty());
    }
}
