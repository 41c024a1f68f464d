//! Shared record types consumed by every analytics component.
//!
//! All three record streams are owned by the CRUD layer. The engine only
//! ever borrows them.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A point on the dashboard's timeline (local wall-clock, millisecond precision).
pub type Timestamp = NaiveDateTime;

/// A stable, unique identifier for any stored record.
pub type RecordId = String;

/// Programs recorded without a type are reported under this track.
pub const DEFAULT_PROGRAM_TYPE: ProgramType = ProgramType::Wellness;

// ── Enumerations ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Essential,
    Premium,
    Elite,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Essential, Tier::Premium, Tier::Elite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free      => "free",
            Self::Essential => "essential",
            Self::Premium   => "premium",
            Self::Elite     => "elite",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramType {
    Wellness,
    Sleep,
    MentalPerformance,
    Bundle,
}

impl ProgramType {
    pub const ALL: [ProgramType; 4] = [
        ProgramType::Wellness,
        ProgramType::Sleep,
        ProgramType::MentalPerformance,
        ProgramType::Bundle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wellness          => "wellness",
            Self::Sleep             => "sleep",
            Self::MentalPerformance => "mental_performance",
            Self::Bundle            => "bundle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Paused,
    Cancelled,
    Expired,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active    => "active",
            Self::Paused    => "paused",
            Self::Cancelled => "cancelled",
            Self::Expired   => "expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active"    => Some(Self::Active),
            "paused"    => Some(Self::Paused),
            "cancelled" => Some(Self::Cancelled),
            "expired"   => Some(Self::Expired),
            _ => None,
        }
    }

    /// Cancelled and expired memberships both count toward lifetime churn.
    pub fn is_churned(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    Subscription,
    Supplement,
    LabTesting,
    Service,
    OneTime,
}

impl PurchaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Supplement   => "supplement",
            Self::LabTesting   => "lab_testing",
            Self::Service      => "service",
            Self::OneTime      => "one_time",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "subscription" => Some(Self::Subscription),
            "supplement"   => Some(Self::Supplement),
            "lab_testing"  => Some(Self::LabTesting),
            "service"      => Some(Self::Service),
            "one_time"     => Some(Self::OneTime),
            _ => None,
        }
    }

    /// Reporting category. One-time purchases are folded into services.
    pub fn category(&self) -> RevenueCategory {
        match self {
            Self::Subscription           => RevenueCategory::Membership,
            Self::Supplement             => RevenueCategory::Supplement,
            Self::LabTesting             => RevenueCategory::LabTesting,
            Self::Service | Self::OneTime => RevenueCategory::Service,
        }
    }
}

/// The four fixed revenue categories used by charts and the forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueCategory {
    Membership,
    Supplement,
    LabTesting,
    Service,
}

impl RevenueCategory {
    pub const ALL: [RevenueCategory; 4] = [
        RevenueCategory::Membership,
        RevenueCategory::Supplement,
        RevenueCategory::LabTesting,
        RevenueCategory::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::Supplement => "supplement",
            Self::LabTesting => "lab_testing",
            Self::Service    => "service",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketingStatus {
    Lead,
    Prospect,
    Customer,
    Vip,
    Churned,
}

impl MarketingStatus {
    pub const ALL: [MarketingStatus; 5] = [
        MarketingStatus::Lead,
        MarketingStatus::Prospect,
        MarketingStatus::Customer,
        MarketingStatus::Vip,
        MarketingStatus::Churned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead     => "lead",
            Self::Prospect => "prospect",
            Self::Customer => "customer",
            Self::Vip      => "vip",
            Self::Churned  => "churned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id:            RecordId,
    pub client_id:     RecordId,
    pub tier:          Tier,
    #[serde(default)]
    pub program_type:  Option<ProgramType>,
    pub status:        MembershipStatus,
    #[serde(default)]
    pub monthly_price: Option<f64>,
    pub start_date:    NaiveDate,
    #[serde(default)]
    pub end_date:      Option<NaiveDate>,
    #[serde(default)]
    pub renewal_date:  Option<NaiveDate>,
}

impl MembershipRecord {
    /// Monthly price with a missing value treated as zero.
    pub fn price(&self) -> f64 {
        self.monthly_price.unwrap_or(0.0).max(0.0)
    }

    pub fn program(&self) -> ProgramType {
        self.program_type.unwrap_or(DEFAULT_PROGRAM_TYPE)
    }

    pub fn starts_at(&self) -> Timestamp {
        start_of_day(self.start_date)
    }

    pub fn ends_at(&self) -> Option<Timestamp> {
        self.end_date.map(start_of_day)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id:            RecordId,
    pub client_id:     RecordId,
    pub purchase_type: PurchaseType,
    pub amount:        f64,
    pub purchased_at:  Timestamp,
}

impl PurchaseRecord {
    pub fn category(&self) -> RevenueCategory {
        self.purchase_type.category()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id:               RecordId,
    pub full_name:        String,
    pub email:            String,
    pub created_at:       Timestamp,
    pub marketing_status: MarketingStatus,
}

// ── Calendar helpers ─────────────────────────────────────────────────────────

pub fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 on `date`.
pub fn end_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN))
}
