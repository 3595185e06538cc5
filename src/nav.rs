use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct NavItem {
    pub name: &'static str,
    pub href: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedNavItem {
    pub name: &'static str,
    pub href: &'static str,
    pub active: bool,
}

const fn item(name: &'static str, href: &'static str) -> NavItem {
    NavItem { name, href }
}

pub static DASHBOARD_NAV: [NavItem; 10] = [
    item("Dashboard", "/dashboard"),
    item("Students", "/dashboard/students"),
    item("SIS Module", "/dashboard/sis"),
    item("Teachers", "/dashboard/teachers"),
    item("Parents", "/dashboard/parents"),
    item("Finance", "/dashboard/finance"),
    item("Transport", "/dashboard/transport"),
    item("Library", "/dashboard/library"),
    item("Inventory", "/dashboard/inventory"),
    item("Settings", "/dashboard/settings"),
];

pub static TRANSPORT_NAV: [NavItem; 7] = [
    item("Dashboard", "/dashboard/transport"),
    item("Buses", "/dashboard/transport/buses"),
    item("Drivers", "/dashboard/transport/drivers"),
    item("Routes", "/dashboard/transport/routes"),
    item("Assignments", "/dashboard/transport/assignments"),
    item("Incidents", "/dashboard/transport/incidents"),
    item("Fees", "/dashboard/transport/fees"),
];

pub fn nav_set(name: &str) -> Option<&'static [NavItem]> {
    match name {
        "dashboard" => Some(&DASHBOARD_NAV),
        "transport" => Some(&TRANSPORT_NAV),
        _ => None,
    }
}

fn normalize(route: &str) -> &str {
    let trimmed = route.split(['?', '#']).next().unwrap_or(route);
    match trimmed.trim_end_matches('/') {
        "" => "/",
        r => r,
    }
}

/// An item is active only when its href is exactly the current route.
pub fn resolve(nav: &[NavItem], current_route: &str) -> Vec<ResolvedNavItem> {
    let route = normalize(current_route);
    nav.iter()
        .map(|i| ResolvedNavItem {
            name: i.name,
            href: i.href,
            active: i.href == route,
        })
        .collect()
}

pub fn page_title(nav: &[NavItem], current_route: &str) -> &'static str {
    let route = normalize(current_route);
    nav.iter()
        .find(|i| i.href == route)
        .map(|i| i.name)
        .unwrap_or("Dashboard")
}
