//! Row-level access policy.
//!
//! Service callers and administrators see every row. Citizens get the
//! per-table grants below, where `Own` means the table's owner column must
//! equal the caller's principal id.

use core::fmt;

use egov_auth::PrincipalId;

use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Denied,
    Own,
    All,
}

/// Resolved privilege tier of a caller for a single store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Service,
    Admin(PrincipalId),
    Citizen(PrincipalId),
}

pub fn access(tier: Tier, table: Table, op: Operation) -> Access {
    match tier {
        Tier::Service | Tier::Admin(_) => Access::All,
        Tier::Citizen(_) => citizen_access(table, op),
    }
}

fn citizen_access(table: Table, op: Operation) -> Access {
    use Access::*;
    use Operation::*;

    match (table, op) {
        (Table::Certificates | Table::Grievances, Select | Insert) => Own,
        (Table::Certificates | Table::Grievances, Update) => Denied,
        (Table::PropertyTax, Select | Update) => Own,
        (Table::PropertyTax, Insert) => Denied,
        (Table::Announcements, Select) => All,
        (Table::Announcements, Insert | Update) => Denied,
        (Table::UserRoles, Select) => Own,
        (Table::UserRoles, Insert | Update) => Denied,
        (Table::Profiles, _) => Own,
    }
}
