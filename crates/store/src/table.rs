use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::query::Row;

/// Named collections of the portal data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Certificates,
    Grievances,
    PropertyTax,
    Announcements,
    UserRoles,
    Profiles,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Certificates,
        Table::Grievances,
        Table::PropertyTax,
        Table::Announcements,
        Table::UserRoles,
        Table::Profiles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Certificates => "certificates",
            Table::Grievances => "grievances",
            Table::PropertyTax => "property_tax",
            Table::Announcements => "announcements",
            Table::UserRoles => "user_roles",
            Table::Profiles => "profiles",
        }
    }

    /// Column holding the owning principal id, if rows are owned at all.
    pub fn owner_column(self) -> Option<&'static str> {
        match self {
            Table::Certificates | Table::Grievances | Table::PropertyTax | Table::UserRoles => {
                Some("user_id")
            }
            Table::Profiles => Some("id"),
            Table::Announcements => None,
        }
    }

    /// Fill column defaults for a new row. Values already present win.
    pub fn apply_defaults(self, row: &mut Row, now: DateTime<Utc>) {
        let now = json!(now);
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::now_v7().to_string()));
        row.entry("created_at").or_insert_with(|| now.clone());

        let defaults: &[(&str, Value)] = match self {
            Table::Certificates => &[
                ("status", json!("pending")),
                ("application_date", now.clone()),
            ],
            Table::Grievances => &[
                ("status", json!("pending")),
                ("priority", json!("normal")),
                ("submitted_date", now.clone()),
            ],
            Table::PropertyTax => &[("status", json!("unpaid"))],
            Table::Announcements => &[
                ("priority", json!("normal")),
                ("published_date", now.clone()),
            ],
            Table::UserRoles => &[("role", json!("citizen"))],
            Table::Profiles => &[],
        };

        for (column, value) in defaults {
            row.entry(*column).or_insert_with(|| value.clone());
        }
    }
}

impl core::fmt::Display for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown table '{s}'"))
    }
}
