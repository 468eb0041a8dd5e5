use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Load lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    /// Posted by a shipper, not yet priced
    Created,
    /// Quote requested, waiting on carrier tenders
    Quoted,
    /// At least one carrier tender recorded
    Tendered,
    /// A tender was accepted
    Awarded,
    /// Carrier has the freight
    PickedUp,
    /// Freight moving to destination
    InTransit,
    /// Delivered to consignee
    Delivered,
    /// Withdrawn before delivery
    Cancelled,
}

impl LoadStatus {
    /// Forward path, in order.
    pub const PIPELINE: [LoadStatus; 7] = [
        LoadStatus::Created,
        LoadStatus::Quoted,
        LoadStatus::Tendered,
        LoadStatus::Awarded,
        LoadStatus::PickedUp,
        LoadStatus::InTransit,
        LoadStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Created => "created",
            LoadStatus::Quoted => "quoted",
            LoadStatus::Tendered => "tendered",
            LoadStatus::Awarded => "awarded",
            LoadStatus::PickedUp => "picked_up",
            LoadStatus::InTransit => "in_transit",
            LoadStatus::Delivered => "delivered",
            LoadStatus::Cancelled => "cancelled",
        }
    }

    /// Position on the forward path; `None` for `Cancelled`.
    pub fn rank(&self) -> Option<usize> {
        Self::PIPELINE.iter().position(|s| s == self)
    }

    /// Next status on the forward path
    pub fn next(&self) -> Option<LoadStatus> {
        self.rank().and_then(|i| Self::PIPELINE.get(i + 1).copied())
    }

    /// Check if this status can transition to another status
    pub fn can_transition_to(&self, target: LoadStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match target {
            LoadStatus::Cancelled => true,
            _ => self.next() == Some(target),
        }
    }

    /// Get valid next statuses from the current one
    pub fn valid_transitions(&self) -> Vec<LoadStatus> {
        if self.is_terminal() {
            return Vec::new();
        }
        let mut out: Vec<LoadStatus> = self.next().into_iter().collect();
        out.push(LoadStatus::Cancelled);
        out
    }

    /// Validated move to `target`
    pub fn transition_to(&self, target: LoadStatus) -> crate::error::Result<StatusTransition> {
        if !self.can_transition_to(target) {
            return Err(crate::error::BrokerError::InvalidTransition {
                from: *self,
                to: target,
            });
        }
        Ok(StatusTransition::new(*self, target))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadStatus::Delivered | LoadStatus::Cancelled)
    }

    /// Early or terminal statuses. Attached tenders still block deletion.
    pub fn is_deletable(&self) -> bool {
        matches!(
            self,
            LoadStatus::Created | LoadStatus::Quoted | LoadStatus::Delivered | LoadStatus::Cancelled
        )
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(LoadStatus::Created),
            "quoted" => Ok(LoadStatus::Quoted),
            "tendered" => Ok(LoadStatus::Tendered),
            "awarded" => Ok(LoadStatus::Awarded),
            "picked_up" => Ok(LoadStatus::PickedUp),
            "in_transit" => Ok(LoadStatus::InTransit),
            "delivered" => Ok(LoadStatus::Delivered),
            "cancelled" => Ok(LoadStatus::Cancelled),
            _ => Err(format!("Unknown load status: {}", s)),
        }
    }
}

impl TryFrom<&str> for LoadStatus {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Status transition record (for logging and event payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: LoadStatus,
    pub to: LoadStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl StatusTransition {
    pub fn new(from: LoadStatus, to: LoadStatus) -> Self {
        Self {
            from,
            to,
            timestamp: chrono::Utc::now(),
        }
    }
}
