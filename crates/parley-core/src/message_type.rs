use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Task categories offered as one-click suggestion requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    #[default]
    ProfessionalInquiry,
    ProjectClarification,
    PriceNegotiation,
    DeadlineExtension,
    RevisionRequest,
}

impl MessageType {
    pub fn all() -> [MessageType; 5] {
        [
            MessageType::ProfessionalInquiry,
            MessageType::ProjectClarification,
            MessageType::PriceNegotiation,
            MessageType::DeadlineExtension,
            MessageType::RevisionRequest,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::ProfessionalInquiry => "professional-inquiry",
            MessageType::ProjectClarification => "project-clarification",
            MessageType::PriceNegotiation => "price-negotiation",
            MessageType::DeadlineExtension => "deadline-extension",
            MessageType::RevisionRequest => "revision-request",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageType::ProfessionalInquiry => "Professional Inquiry",
            MessageType::ProjectClarification => "Project Clarification",
            MessageType::PriceNegotiation => "Price Negotiation",
            MessageType::DeadlineExtension => "Deadline Extension",
            MessageType::RevisionRequest => "Revision Request",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MessageType::ProfessionalInquiry => "💼",
            MessageType::ProjectClarification => "❓",
            MessageType::PriceNegotiation => "💰",
            MessageType::DeadlineExtension => "⏰",
            MessageType::RevisionRequest => "✏️",
        }
    }

    /// Instruction embedded in the user prompt for this category.
    pub fn instruction(&self) -> &'static str {
        match self {
            MessageType::ProfessionalInquiry => {
                "Generate professional suggestions for initial project communication"
            }
            MessageType::ProjectClarification => {
                "Generate suggestions for asking about project requirements"
            }
            MessageType::PriceNegotiation => {
                "Generate diplomatic suggestions for discussing project pricing"
            }
            MessageType::DeadlineExtension => {
                "Generate courteous suggestions for requesting deadline extension"
            }
            MessageType::RevisionRequest => {
                "Generate polite suggestions for requesting project revisions"
            }
        }
    }

    /// Position in [`MessageType::all`], used for the numbered hotkeys.
    pub fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(0)
    }
}

impl FromStr for MessageType {
    type Err = String;

    /// Parse a slug such as `price-negotiation`, ignoring case and padding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|t| t.as_str() == slug)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::all().iter().map(|t| t.as_str()).collect();
                format!("unknown message type '{}' (expected one of: {})", s.trim(), known.join(", "))
            })
    }
}
