//! Navigation variants presented by the shared portal chrome.

use serde::Serialize;

/// Which flavour of the shared navigation a principal sees.
///
/// This only selects labels and links; it grants nothing. Data scoping is
/// enforced by the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NavVariant {
    #[default]
    Citizen,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavMenu {
    pub variant: NavVariant,
    pub items: Vec<NavItem>,
}

const CITIZEN_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        path: "/dashboard",
    },
    NavItem {
        label: "Certificates",
        path: "/certificates",
    },
    NavItem {
        label: "Property Tax",
        path: "/property-tax",
    },
    NavItem {
        label: "Grievances",
        path: "/grievances",
    },
    NavItem {
        label: "Announcements",
        path: "/announcements",
    },
];

const ADMIN_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        path: "/admin",
    },
    NavItem {
        label: "Users",
        path: "/admin/users",
    },
    NavItem {
        label: "Certificates",
        path: "/admin/certificates",
    },
    NavItem {
        label: "Property Tax",
        path: "/admin/property-tax",
    },
    NavItem {
        label: "Grievances",
        path: "/admin/grievances",
    },
    NavItem {
        label: "Announcements",
        path: "/admin/announcements",
    },
];

impl NavVariant {
    pub fn items(self) -> &'static [NavItem] {
        match self {
            NavVariant::Citizen => CITIZEN_ITEMS,
            NavVariant::Admin => ADMIN_ITEMS,
        }
    }

    pub fn menu(self) -> NavMenu {
        NavMenu {
            variant: self,
            items: self.items().to_vec(),
        }
    }
}
