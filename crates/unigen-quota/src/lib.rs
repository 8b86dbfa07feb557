// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily quota enforcement for external providers.
//!
//! The tracker keeps in-memory running totals of today's calls and tokens
//! per provider and enforces the caps from `QuotaConfig`. It emits a
//! `tracing::warn` at 80% of any cap and returns
//! `UnigenError::QuotaExhausted` when a cap is reached.
//!
//! On restart, `from_ledger()` re-hydrates totals from the persistent usage
//! ledger so enforcement survives process restarts.

use chrono::{Datelike, Utc};
use tracing::warn;
use unigen_config::QuotaConfig;
use unigen_core::UnigenError;
use unigen_storage::UsageLedger;

/// An external provider subject to daily caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Tavily,
    Google,
}

impl Provider {
    /// Ledger key and log label.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Tavily => "tavily",
            Self::Google => "google",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    calls: u64,
    tokens: u64,
}

/// In-memory quota tracker with daily call and token caps.
pub struct QuotaTracker {
    openai: Totals,
    tavily: Totals,
    google: Totals,
    config: QuotaConfig,
    /// Day-of-year for daily reset detection.
    current_day: u32,
}

impl QuotaTracker {
    /// Create a new tracker with zero totals.
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            openai: Totals::default(),
            tavily: Totals::default(),
            google: Totals::default(),
            config,
            current_day: Utc::now().ordinal(),
        }
    }

    /// Create a tracker initialized from existing ledger data.
    ///
    /// This handles restart recovery: on startup, today's totals are read
    /// back from the ledger so enforcement is continuous.
    pub async fn from_ledger(
        config: QuotaConfig,
        ledger: &UsageLedger,
    ) -> Result<Self, UnigenError> {
        let now = Utc::now();
        let today = now.format("%Y-%m-%d").to_string();

        let mut tracker = Self::new(config);
        tracker.current_day = now.ordinal();
        for provider in [Provider::OpenAi, Provider::Tavily, Provider::Google] {
            let usage = ledger.day_usage(&today, provider.name()).await?;
            let totals = tracker.totals_mut(provider);
            totals.calls = usage.calls;
            totals.tokens = usage.tokens;
        }
        Ok(tracker)
    }

    /// Check whether the quota allows another call to `provider`.
    ///
    /// Emits `tracing::warn` at 80% of a cap. Returns
    /// `UnigenError::QuotaExhausted` when a cap is reached.
    pub fn check(&mut self, provider: Provider) -> Result<(), UnigenError> {
        self.maybe_reset_daily();

        let (call_cap, token_cap) = self.caps(provider);
        let totals = *self.totals_mut(provider);

        if let Some(cap) = call_cap {
            if totals.calls >= cap {
                return Err(UnigenError::QuotaExhausted {
                    message: format!(
                        "daily call cap of {cap} for {} reached, resumes at midnight UTC",
                        provider.name()
                    ),
                });
            }
            if totals.calls * 10 >= cap * 8 {
                warn!(
                    provider = provider.name(),
                    calls = totals.calls,
                    cap,
                    "approaching daily call cap (80%+)"
                );
            }
        }

        if let Some(cap) = token_cap {
            if totals.tokens >= cap {
                return Err(UnigenError::QuotaExhausted {
                    message: format!(
                        "daily token cap of {cap} for {} reached, resumes at midnight UTC",
                        provider.name()
                    ),
                });
            }
            if totals.tokens * 10 >= cap * 8 {
                warn!(
                    provider = provider.name(),
                    tokens = totals.tokens,
                    cap,
                    "approaching daily token cap (80%+)"
                );
            }
        }

        Ok(())
    }

    /// Reserve one call under the caps, counting it immediately.
    ///
    /// Counting at reservation time keeps the cap strict when several
    /// attributes resolve concurrently. Callers roll back with [`cancel`]
    /// when the provider call itself fails.
    ///
    /// [`cancel`]: Self::cancel
    pub fn reserve(&mut self, provider: Provider) -> Result<(), UnigenError> {
        self.check(provider)?;
        self.totals_mut(provider).calls += 1;
        Ok(())
    }

    /// Roll back a reservation whose provider call failed.
    pub fn cancel(&mut self, provider: Provider) {
        self.maybe_reset_daily();
        let totals = self.totals_mut(provider);
        totals.calls = totals.calls.saturating_sub(1);
    }

    /// Add the token cost reported for a reserved call.
    pub fn add_tokens(&mut self, provider: Provider, tokens: u64) {
        self.maybe_reset_daily();
        self.totals_mut(provider).tokens += tokens;
    }

    fn caps(&self, provider: Provider) -> (Option<u64>, Option<u64>) {
        match provider {
            Provider::OpenAi => (
                self.config.openai_daily_calls.map(u64::from),
                self.config.openai_daily_tokens,
            ),
            Provider::Tavily => (self.config.tavily_daily_calls.map(u64::from), None),
            Provider::Google => (self.config.google_daily_calls.map(u64::from), None),
        }
    }

    fn totals_mut(&mut self, provider: Provider) -> &mut Totals {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Tavily => &mut self.tavily,
            Provider::Google => &mut self.google,
        }
    }

    /// Reset all totals if the day has changed.
    fn maybe_reset_daily(&mut self) {
        let today = Utc::now().ordinal();
        if today != self.current_day {
            self.openai = Totals::default();
            self.tavily = Totals::default();
            self.google = Totals::default();
            self.current_day = today;
        }
    }
}
