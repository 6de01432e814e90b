//! OAuth token lifecycle.
//!
//! A token is "soon invalid" when it expires before `now + buffer`. The lazy
//! path ([`TokenManager::ensure_valid_token`]) runs before each provider call;
//! the proactive path ([`ProactiveRefreshScheduler`]) sweeps one provider's
//! credentials on an interval with a wider threshold.

mod manager;
mod refresher;
mod scheduler;

pub use manager::TokenManager;
pub use refresher::{
    OAuthTokenRefresher, RefreshedToken, TokenRefresher,
    DEFAULT_TOKEN_LIFETIME_SECS, MAX_TOKEN_LIFETIME_SECS,
};
pub use scheduler::{ProactiveRefreshScheduler, SweepReport};
