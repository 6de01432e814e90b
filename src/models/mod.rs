//! Data models for the CRM integration layer.
//!
//! This module contains the data structures representing OAuth credentials,
//! local and provider contacts, merged search results, meetings and suggestions.

pub mod contact;
pub mod credential;
pub mod meeting;
pub mod suggestion;

pub use contact::{
    value_to_string, CanonicalContact, ContactSource, LocalContact, ProviderContact,
};
pub use credential::{Credential, ProviderId, INSTANCE_URL_KEY};
pub use meeting::{Meeting, TranscriptSegment};
pub use suggestion::{Suggestion, SuggestionDraft};
