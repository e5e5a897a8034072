//! Journal statistics over a set of trades.
//!
//! Wins, losses and break-evens are decided by the sign of
//! `profit_percent`. Trades without a profit value only count toward
//! the total.

use serde::Serialize;

use super::trade::Trade;

/// Aggregate performance figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalStats {
    /// Number of trades considered.
    pub total: usize,
    /// Trades with positive profit.
    pub wins: usize,
    /// Trades with negative profit.
    pub losses: usize,
    /// Trades closed at exactly zero.
    pub breakeven: usize,
    /// `wins / total * 100`, 0 for an empty set.
    pub win_rate: f64,
    /// Mean realized R:R over trades that recorded one.
    pub average_rr: f64,
    /// Sum of profit percentages.
    pub total_profit_percent: f64,
}

impl JournalStats {
    /// Compute statistics for `trades`.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = Self {
            total: trades.len(),
            ..Self::default()
        };

        let mut rr_sum = 0.0;
        let mut rr_count = 0usize;

        for trade in trades {
            if let Some(profit) = trade.fields.profit_percent {
                stats.total_profit_percent += profit;
                if profit > 0.0 {
                    stats.wins += 1;
                } else if profit < 0.0 {
                    stats.losses += 1;
                } else {
                    stats.breakeven += 1;
                }
            }
            if let Some(rr) = trade.fields.realized_rr {
                rr_sum += rr;
                rr_count += 1;
            }
        }

        if stats.total > 0 {
            stats.win_rate = stats.wins as f64 / stats.total as f64 * 100.0;
        }
        if rr_count > 0 {
            stats.average_rr = rr_sum / rr_count as f64;
        }

        stats
    }
}
