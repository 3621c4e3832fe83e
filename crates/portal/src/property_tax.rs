use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use egov_auth::PrincipalId;
use egov_core::{DomainError, DomainResult, Entity, PropertyTaxId, require_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Residential,
    Commercial,
    Agricultural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaxStatus {
    #[default]
    Unpaid,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyTax {
    pub id: PropertyTaxId,
    pub user_id: PrincipalId,
    pub property_number: String,
    pub owner_name: String,
    pub property_address: String,
    #[serde(default)]
    pub property_type: PropertyType,
    pub area_sqft: Decimal,
    pub tax_amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: TaxStatus,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Entity for PropertyTax {
    type Id = PropertyTaxId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Columns written back when a record is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxPayment {
    pub status: TaxStatus,
    pub payment_date: DateTime<Utc>,
}

impl PropertyTax {
    pub fn is_paid(&self) -> bool {
        self.status == TaxStatus::Paid
    }

    /// Unpaid and past its due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid() && self.due_date < today
    }

    pub fn pay(&self, now: DateTime<Utc>) -> DomainResult<TaxPayment> {
        if self.is_paid() {
            return Err(DomainError::conflict(format!(
                "property tax {} is already paid",
                self.id
            )));
        }
        Ok(TaxPayment {
            status: TaxStatus::Paid,
            payment_date: now,
        })
    }
}

/// Administrator's assessment of a citizen's property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPropertyTax {
    pub user_id: PrincipalId,
    pub property_number: String,
    pub owner_name: String,
    pub property_address: String,
    #[serde(default)]
    pub property_type: PropertyType,
    pub area_sqft: Decimal,
    pub tax_amount: Decimal,
    pub due_date: NaiveDate,
}

impl NewPropertyTax {
    pub fn validate(&self) -> DomainResult<()> {
        require_text("property_number", &self.property_number)?;
        require_text("owner_name", &self.owner_name)?;
        require_text("property_address", &self.property_address)?;
        if self.area_sqft <= Decimal::ZERO {
            return Err(DomainError::validation("area_sqft must be positive"));
        }
        if self.tax_amount <= Decimal::ZERO {
            return Err(DomainError::validation("tax_amount must be positive"));
        }
        Ok(())
    }
}

/// Citizen-side totals over their own records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxSummary {
    pub unpaid: usize,
    pub paid: usize,
    pub total_unpaid: Decimal,
    pub total_paid: Decimal,
}

impl TaxSummary {
    pub fn from_records(records: &[PropertyTax]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            if r.is_paid() {
                acc.paid += 1;
                acc.total_paid += r.tax_amount;
            } else {
                acc.unpaid += 1;
                acc.total_unpaid += r.tax_amount;
            }
            acc
        })
    }
}

/// Administrator-side collection stats over all records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaxCollectionStats {
    pub total_collected: Decimal,
    pub pending: usize,
    pub overdue: usize,
}

impl TaxCollectionStats {
    pub fn compute(records: &[PropertyTax], today: NaiveDate) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            if r.is_paid() {
                acc.total_collected += r.tax_amount;
            } else {
                acc.pending += 1;
                if r.is_overdue(today) {
                    acc.overdue += 1;
                }
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(amount: i64, paid: bool, due: NaiveDate) -> PropertyTax {
        PropertyTax {
            id: PropertyTaxId::new(),
            user_id: PrincipalId::new(),
            property_number: "PN-1".to_string(),
            owner_name: "Ravi".to_string(),
            property_address: "Ward 3".to_string(),
            property_type: PropertyType::Residential,
            area_sqft: Decimal::new(1200, 0),
            tax_amount: Decimal::new(amount, 2),
            due_date: due,
            status: if paid { TaxStatus::Paid } else { TaxStatus::Unpaid },
            payment_date: None,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn paying_twice_is_a_conflict() {
        let unpaid = record(10_000, false, date(2025, 3, 31));
        let payment = unpaid.pay(Utc::now()).unwrap();
        assert_eq!(payment.status, TaxStatus::Paid);

        let paid = record(10_000, true, date(2025, 3, 31));
        assert!(matches!(paid.pay(Utc::now()), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn overdue_counts_only_unpaid_records_past_due() {
        let today = date(2025, 6, 1);
        let records = vec![
            record(100, false, date(2025, 5, 31)),
            record(100, false, date(2025, 6, 1)),
            record(100, true, date(2024, 1, 1)),
        ];
        let stats = TaxCollectionStats::compute(&records, today);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.total_collected, Decimal::new(100, 2));
    }

    #[test]
    fn assessments_need_positive_amounts() {
        let mut form = NewPropertyTax {
            user_id: PrincipalId::new(),
            property_number: "PN-7".to_string(),
            owner_name: "Meena".to_string(),
            property_address: "Main road".to_string(),
            property_type: PropertyType::Commercial,
            area_sqft: Decimal::new(500, 0),
            tax_amount: Decimal::ZERO,
            due_date: date(2025, 12, 31),
        };
        assert!(form.validate().is_err());
        form.tax_amount = Decimal::new(250_000, 2);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn amounts_accept_json_numbers() {
        let form: NewPropertyTax = serde_json::from_value(serde_json::json!({
            "user_id": PrincipalId::new(),
            "property_number": "PN-9",
            "owner_name": "Meena",
            "property_address": "Main road",
            "property_type": "agricultural",
            "area_sqft": 4000,
            "tax_amount": 1250.5,
            "due_date": "2025-12-31",
        }))
        .unwrap();
        assert_eq!(form.tax_amount, Decimal::new(12505, 1));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Paid plus unpaid totals always partition the record set.
        #[test]
        fn summary_partitions_records(
            entries in prop::collection::vec((1i64..1_000_000i64, any::<bool>(), 0u32..60), 0..20)
        ) {
            let today = date(2025, 1, 31);
            let records: Vec<PropertyTax> = entries
                .iter()
                .map(|(amount, paid, offset)| {
                    let due = today - chrono::Duration::days(i64::from(*offset))
                        + chrono::Duration::days(30);
                    record(*amount, *paid, due)
                })
                .collect();

            let summary = TaxSummary::from_records(&records);
            let stats = TaxCollectionStats::compute(&records, today);
            let total: Decimal = records.iter().map(|r| r.tax_amount).sum();

            prop_assert_eq!(summary.paid + summary.unpaid, records.len());
            prop_assert_eq!(summary.total_paid + summary.total_unpaid, total);
            prop_assert_eq!(stats.total_collected, summary.total_paid);
            prop_assert_eq!(stats.pending, summary.unpaid);
            prop_assert!(stats.overdue <= stats.pending);
        }
    }
}
