// models/giftmodels.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GiftCategory {
    Basic,
    Premium,
    Luxury,
}

/// Static catalog entry. 100 credits = $1.00, so a gift's USD value in
/// cents equals its credit cost.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Gift {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub credit_cost: i64,
    pub category: GiftCategory,
}

impl Gift {
    pub fn usd_value_cents(&self) -> i64 {
        self.credit_cost
    }

    pub fn usd_value(&self) -> f64 {
        self.credit_cost as f64 / 100.0
    }
}

const CATALOG: &[Gift] = &[
    Gift { id: "rose", name: "Rose", icon: "🌹", credit_cost: 10, category: GiftCategory::Basic },
    Gift { id: "heart", name: "Heart", icon: "❤️", credit_cost: 25, category: GiftCategory::Basic },
    Gift { id: "chocolates", name: "Box of Chocolates", icon: "🍫", credit_cost: 50, category: GiftCategory::Basic },
    Gift { id: "teddy_bear", name: "Teddy Bear", icon: "🧸", credit_cost: 100, category: GiftCategory::Premium },
    Gift { id: "perfume", name: "Perfume", icon: "🌸", credit_cost: 250, category: GiftCategory::Premium },
    Gift { id: "bouquet", name: "Bouquet", icon: "💐", credit_cost: 500, category: GiftCategory::Premium },
    Gift { id: "diamond_ring", name: "Diamond Ring", icon: "💍", credit_cost: 1000, category: GiftCategory::Luxury },
    Gift { id: "sports_car", name: "Sports Car", icon: "🏎️", credit_cost: 2500, category: GiftCategory::Luxury },
    Gift { id: "yacht", name: "Yacht", icon: "🛥️", credit_cost: 5000, category: GiftCategory::Luxury },
];

pub fn gift_catalog() -> &'static [Gift] {
    CATALOG
}

pub fn find_gift(id: &str) -> Option<&'static Gift> {
    CATALOG.iter().find(|g| g.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique() {
        for (i, gift) in CATALOG.iter().enumerate() {
            assert!(
                CATALOG.iter().skip(i + 1).all(|other| other.id != gift.id),
                "duplicate gift id {}",
                gift.id
            );
        }
    }

    #[test]
    fn usd_value_follows_credit_cost() {
        let rose = find_gift("rose").unwrap();
        assert_eq!(rose.usd_value_cents(), 10);
        assert_eq!(rose.usd_value(), 0.10);

        let ring = find_gift("diamond_ring").unwrap();
        assert_eq!(ring.usd_value(), 10.0);
    }

    #[test]
    fn unknown_gift_is_none() {
        assert!(find_gift("unicorn").is_none());
    }
}
