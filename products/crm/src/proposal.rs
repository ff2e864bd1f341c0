use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub category: Option<String>,
    pub active: bool,
}

impl Product {
    /// Gross margin over price, in percent. Free products have no margin.
    pub fn margin_percent(&self) -> f64 {
        if self.price_cents == 0 {
            return 0.0;
        }
        (self.price_cents - self.cost_cents) as f64 / self.price_cents as f64 * 100.0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalItem {
    pub product_code: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
}

impl ProposalItem {
    /// Quantity times unit price, less the line discount. Saturates at the
    /// `i64` bounds.
    pub fn subtotal_cents(&self) -> i64 {
        i64::from(self.quantity)
            .saturating_mul(self.unit_price_cents)
            .saturating_sub(self.discount_cents)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub number: String,
    pub title: String,
    pub status: ProposalStatus,
    pub total_cents: i64,
    pub discount_cents: i64,
    pub valid_until: NaiveDate,
    pub accepted_at: Option<DateTime<Utc>>,
    pub items: Vec<ProposalItem>,
}

impl Proposal {
    pub fn final_value_cents(&self) -> i64 {
        self.total_cents.saturating_sub(self.discount_cents)
    }

    pub fn items_total_cents(&self) -> i64 {
        self.items
            .iter()
            .map(ProposalItem::subtotal_cents)
            .fold(0, i64::saturating_add)
    }

    /// Resets the stored total from the line items.
    pub fn recalculate_total(&mut self) {
        self.total_cents = self.items_total_cents();
    }

    pub fn accept(&mut self, now: DateTime<Utc>) {
        self.status = ProposalStatus::Accepted;
        self.accepted_at = Some(now);
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        today > self.valid_until
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn product(price_cents: i64, cost_cents: i64) -> Product {
        Product {
            code: "ERP-01".into(),
            name: "ERP".into(),
            price_cents,
            cost_cents,
            category: None,
            active: true,
        }
    }

    #[test]
    fn product_margin() {
        assert_eq!(
            product(1_500_000, 500_000).margin_percent(),
            2.0 / 3.0 * 100.0
        );
        assert_eq!(product(0, 100).margin_percent(), 0.0);
    }

    #[test]
    fn proposal_totals() {
        let mut proposal = Proposal {
            number: "P-2025-001".into(),
            title: "ERP rollout".into(),
            status: ProposalStatus::Draft,
            total_cents: 0,
            discount_cents: 100_000,
            valid_until: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            accepted_at: None,
            items: vec![
                ProposalItem {
                    product_code: "ERP-01".into(),
                    quantity: 2,
                    unit_price_cents: 1_500_000,
                    discount_cents: 200_000,
                },
                ProposalItem {
                    product_code: "SUP-01".into(),
                    quantity: 12,
                    unit_price_cents: 120_000,
                    discount_cents: 0,
                },
            ],
        };
        assert_eq!(proposal.items[0].subtotal_cents(), 2_800_000);
        proposal.recalculate_total();
        assert_eq!(proposal.total_cents, 4_240_000);
        assert_eq!(proposal.final_value_cents(), 4_140_000);

        let now = Utc.with_ymd_and_hms(2025, 7, 1, 15, 0, 0).unwrap();
        proposal.accept(now);
        assert_eq!(proposal.status, ProposalStatus::Accepted);
        assert_eq!(proposal.accepted_at, Some(now));
        assert!(
            proposal.is_expired(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap())
        );
    }

    #[test]
    fn huge_quantities_saturate_instead_of_overflowing() {
        let item = ProposalItem {
            product_code: "BULK".into(),
            quantity: 4_000_000,
            unit_price_cents: 3_000_000_000_000,
            discount_cents: 0,
        };
        assert_eq!(item.subtotal_cents(), i64::MAX);

        let proposal = Proposal {
            number: "P-2025-002".into(),
            title: "Bulk".into(),
            status: ProposalStatus::Draft,
            total_cents: 0,
            discount_cents: 0,
            valid_until: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            accepted_at: None,
            items: vec![item.clone(), item],
        };
        assert_eq!(proposal.items_total_cents(), i64::MAX);
    }
}
