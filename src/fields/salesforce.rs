//! Salesforce Contact field catalogue.
//!
//! Canonical names are snake_case; API names are the standard Contact sObject fields.

use super::{FieldCategory, FieldConfig, FieldDescriptor};
use crate::models::ProviderId;

/// Field declaration for Salesforce contacts.
pub struct SalesforceFields;

impl FieldConfig for SalesforceFields {
    const PROVIDER: ProviderId = ProviderId::Salesforce;
    const FIRST_NAME: &'static str = "first_name";
    const LAST_NAME: &'static str = "last_name";
    const EMAIL: &'static str = "email";

    fn fields() -> Vec<FieldDescriptor> {
        use FieldCategory::*;

        vec![
            FieldDescriptor::new("first_name", "First Name")
                .api("FirstName")
                .category(Basic),
            FieldDescriptor::new("last_name", "Last Name")
                .api("LastName")
                .category(Basic),
            FieldDescriptor::new("email", "Email")
                .api("Email")
                .category(Basic),
            FieldDescriptor::new("birthdate", "Birthdate")
                .api("Birthdate")
                .category(Basic),
            FieldDescriptor::new("phone", "Phone")
                .api("Phone")
                .category(Phone),
            FieldDescriptor::new("mobile_phone", "Mobile Phone")
                .api("MobilePhone")
                .category(Phone),
            FieldDescriptor::new("home_phone", "Home Phone")
                .api("HomePhone")
                .category(Phone),
            FieldDescriptor::new("other_phone", "Other Phone")
                .api("OtherPhone")
                .category(Phone),
            FieldDescriptor::new("title", "Title")
                .api("Title")
                .category(Work),
            FieldDescriptor::new("department", "Department")
                .api("Department")
                .category(Work),
            FieldDescriptor::new("mailing_street", "Mailing Street")
                .api("MailingStreet")
                .category(Address),
            FieldDescriptor::new("mailing_city", "Mailing City")
                .api("MailingCity")
                .category(Address),
            FieldDescriptor::new("mailing_state", "Mailing State")
                .api("MailingState")
                .category(Address),
            FieldDescriptor::new("mailing_postal_code", "Mailing Postal Code")
                .api("MailingPostalCode")
                .category(Address),
            FieldDescriptor::new("mailing_country", "Mailing Country")
                .api("MailingCountry")
                .category(Address),
            FieldDescriptor::new("lead_source", "Lead Source")
                .api("LeadSource")
                .category(Other),
            FieldDescriptor::new("description", "Description")
                .api("Description")
                .category(Other),
        ]
    }
}
