use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const PLACEHOLDER_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Monthly,
    Yearly,
}

impl Plan {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Cancelled,
    PastDue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub current_period_start: String,
    pub current_period_end: String,
    pub consultations_used: u32,
    pub consultations_limit: u32,
}

impl Subscription {
    /// Free, inactive plan covering the next 30 days.
    pub fn placeholder(user_id: &str, now: DateTime<Utc>) -> Self {
        Self::starting(user_id, Plan::Free, SubscriptionStatus::Inactive, 0, PLACEHOLDER_PERIOD_DAYS, now)
    }

    /// Active paid plan from `now`. No payment is taken.
    pub fn activate(user_id: &str, offer: &PlanOffer, now: DateTime<Utc>) -> Self {
        Self::starting(
            user_id,
            offer.plan,
            SubscriptionStatus::Active,
            offer.consultations,
            offer.period.days(),
            now,
        )
    }

    fn starting(
        user_id: &str,
        plan: Plan,
        status: SubscriptionStatus,
        consultations_limit: u32,
        days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!("sub_{}", Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            plan,
            status,
            current_period_start: now.to_rfc3339(),
            current_period_end: (now + Duration::days(days)).to_rfc3339(),
            consultations_used: 0,
            consultations_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Month,
    Year,
}

impl BillingPeriod {
    pub fn days(&self) -> i64 {
        match self {
            Self::Month => 30,
            Self::Year => 365,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Inr,
}

impl Currency {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "usd" => Some(Self::Usd),
            "inr" => Some(Self::Inr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Price {
    pub usd: u32,
    pub inr: u32,
}

impl Price {
    /// `$59` or `₹33,999` (Indian digit grouping).
    pub fn format(&self, currency: Currency) -> String {
        match currency {
            Currency::Usd => format!("${}", self.usd),
            Currency::Inr => format!("₹{}", group_indian(self.inr)),
        }
    }
}

// Last three digits, then pairs: 1234567 -> 12,34,567.
fn group_indian(value: u32) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanOffer {
    pub plan: Plan,
    pub name: &'static str,
    pub price: Price,
    pub period: BillingPeriod,
    pub popular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<Price>,
    pub features: &'static [&'static str],
    pub consultations: u32,
}

/// Paid plans, in display order.
pub static PLAN_OFFERS: [PlanOffer; 2] = [
    PlanOffer {
        plan: Plan::Monthly,
        name: "Monthly Pro",
        price: Price { usd: 59, inr: 4999 },
        period: BillingPeriod::Month,
        popular: false,
        savings: None,
        features: &[
            "Unlimited medicine analysis",
            "5 doctor consultations per month",
            "Priority customer support",
            "Advanced AI insights",
            "Medicine interaction checker",
            "Personalized health reports",
            "Mobile app access",
        ],
        consultations: 5,
    },
    PlanOffer {
        plan: Plan::Yearly,
        name: "Yearly Pro",
        price: Price { usd: 399, inr: 33999 },
        period: BillingPeriod::Year,
        popular: true,
        savings: Some(Price { usd: 309, inr: 25989 }),
        features: &[
            "Unlimited medicine analysis",
            "60 doctor consultations per year",
            "Priority customer support",
            "Advanced AI insights",
            "Medicine interaction checker",
            "Personalized health reports",
            "Mobile app access",
            "Family account (up to 4 members)",
            "Health tracking dashboard",
            "Prescription management",
        ],
        consultations: 60,
    },
];

/// A plan offer with prices rendered in one currency.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedPlan {
    pub plan: Plan,
    pub name: &'static str,
    pub price: String,
    pub period: BillingPeriod,
    pub popular: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<String>,
    pub consultations: u32,
    pub features: &'static [&'static str],
}

impl PlanOffer {
    pub fn priced(&self, currency: Currency) -> PricedPlan {
        PricedPlan {
            plan: self.plan,
            name: self.name,
            price: self.price.format(currency),
            period: self.period,
            popular: self.popular,
            savings: self.savings.map(|s| s.format(currency)),
            consultations: self.consultations,
            features: self.features,
        }
    }
}

pub fn price_list(currency: Currency) -> Vec<PricedPlan> {
    PLAN_OFFERS.iter().map(|offer| offer.priced(currency)).collect()
}

/// `None` for the free plan, which is never sold.
pub fn offer_for(plan: Plan) -> Option<&'static PlanOffer> {
    PLAN_OFFERS.iter().find(|offer| offer.plan == plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yearly_plan_is_the_popular_one() {
        let yearly = offer_for(Plan::Yearly).unwrap();
        assert!(yearly.popular);
        assert_eq!(yearly.consultations, 60);
        assert_eq!(yearly.savings, Some(Price { usd: 309, inr: 25989 }));
        assert!(offer_for(Plan::Free).is_none());
    }

    #[test]
    fn prices_format_per_currency() {
        let monthly = offer_for(Plan::Monthly).unwrap();
        assert_eq!(monthly.price.format(Currency::Usd), "$59");
        assert_eq!(monthly.price.format(Currency::Inr), "₹4,999");
        let yearly = offer_for(Plan::Yearly).unwrap();
        assert_eq!(yearly.price.format(Currency::Inr), "₹33,999");
        assert_eq!(group_indian(999), "999");
        assert_eq!(group_indian(1234567), "12,34,567");
    }

    #[test]
    fn price_list_renders_one_currency() {
        let list = price_list(Currency::Usd);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].price, "$59");
        assert!(list[0].savings.is_none());
        assert_eq!(list[1].savings.as_deref(), Some("$309"));
        let value = serde_json::to_value(&list[0]).unwrap();
        assert!(value.get("savings").is_none());
        assert_eq!(value["period"], "month");
    }

    #[test]
    fn activation_covers_the_billing_period() {
        let now = Utc::now();
        let sub = Subscription::activate("u1", offer_for(Plan::Yearly).unwrap(), now);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.plan, Plan::Yearly);
        assert_eq!(sub.consultations_limit, 60);
        let end = DateTime::parse_from_rfc3339(&sub.current_period_end).unwrap();
        assert_eq!((end.with_timezone(&Utc) - now).num_days(), 365);
    }

    #[test]
    fn placeholder_is_free_and_inactive() {
        let sub = Subscription::placeholder("u1", Utc::now());
        assert_eq!(sub.plan, Plan::Free);
        assert_eq!(sub.status, SubscriptionStatus::Inactive);
        assert_eq!(sub.consultations_limit, 0);
        assert!(sub.id.starts_with("sub_"));
    }
}
