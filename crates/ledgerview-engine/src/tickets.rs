//! Ticket normalizer
//!
//! Maps raw request records to billable tickets priced by urgency tier.
//! Records that cannot be billed are skipped, never raised as errors.

use ledgerview_core::{
    config::TicketPricing,
    models::{BillableTicket, RawTicket, UrgencyTier},
    MonthKey,
};
use rust_decimal::Decimal;
use std::fmt;
use tracing::debug;

/// Category used when the export carries none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Why a raw ticket was not billed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketSkip {
    NonBillableCategory,
    MissingHours,
    InvalidDate,
}

impl fmt::Display for TicketSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketSkip::NonBillableCategory => write!(f, "non-billable category"),
            TicketSkip::MissingHours => write!(f, "missing or zero estimated hours"),
            TicketSkip::InvalidDate => write!(f, "missing or malformed date"),
        }
    }
}

/// Output of one normalizer run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketBatch {
    pub tickets: Vec<BillableTicket>,
    pub skipped: usize,
    /// Ids of tickets priced at the fallback tier
    pub unknown_urgency_ids: Vec<String>,
}

/// Normalize every raw ticket, preserving input order
pub fn normalize_tickets(raw: &[RawTicket], pricing: &TicketPricing) -> TicketBatch {
    let mut batch = TicketBatch::default();

    for (index, record) in raw.iter().enumerate() {
        match normalize_ticket(index, record, pricing) {
            Ok(ticket) => {
                if ticket.urgency_fallback {
                    batch.unknown_urgency_ids.push(ticket.id.clone());
                }
                batch.tickets.push(ticket);
            }
            Err(reason) => {
                debug!("Skipping ticket at index {}: {}", index, reason);
                batch.skipped += 1;
            }
        }
    }

    batch
}

/// Normalize a single raw ticket
///
/// `index` is the record's position in the export and only feeds the
/// generated id of tickets without one.
pub fn normalize_ticket(
    index: usize,
    raw: &RawTicket,
    pricing: &TicketPricing,
) -> Result<BillableTicket, TicketSkip> {
    let category = raw.category.as_deref().unwrap_or(UNCATEGORIZED);
    if pricing.is_non_billable(category) {
        return Err(TicketSkip::NonBillableCategory);
    }

    let hours = match raw.estimated_hours {
        Some(hours) if hours > Decimal::ZERO => hours,
        _ => return Err(TicketSkip::MissingHours),
    };

    let date = raw.date.as_deref().ok_or(TicketSkip::InvalidDate)?;
    let month = MonthKey::from_date_str(date).ok_or(TicketSkip::InvalidDate)?;

    let (urgency, urgency_fallback) = match raw.urgency.as_deref().and_then(UrgencyTier::from_str) {
        Some(tier) => (tier, false),
        None => (pricing.fallback_tier(), true),
    };

    let rate = if pricing.is_migration(category) {
        Decimal::ZERO
    } else {
        pricing.rate_for(urgency)
    };
    let amount = hours * rate;

    Ok(BillableTicket {
        id: raw
            .id
            .clone()
            .unwrap_or_else(|| format!("ticket-{}", index)),
        date: date.trim().to_string(),
        month,
        category: category.to_string(),
        urgency,
        urgency_fallback,
        description: raw.request_summary.clone(),
        hours,
        rate,
        amount,
        free_hours_applied: Decimal::ZERO,
        net_amount: amount,
    })
}
