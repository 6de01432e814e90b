//! HubSpot contact property catalogue.
//!
//! HubSpot property names are already stable identifiers, so canonical names
//! equal API names and no api_name overrides are declared.

use super::{FieldCategory, FieldConfig, FieldDescriptor};
use crate::models::ProviderId;

/// Field declaration for HubSpot contacts.
pub struct HubspotFields;

impl FieldConfig for HubspotFields {
    const PROVIDER: ProviderId = ProviderId::Hubspot;
    const FIRST_NAME: &'static str = "firstname";
    const LAST_NAME: &'static str = "lastname";
    const EMAIL: &'static str = "email";

    fn fields() -> Vec<FieldDescriptor> {
        use FieldCategory::*;

        vec![
            FieldDescriptor::new("firstname", "First Name").category(Basic),
            FieldDescriptor::new("lastname", "Last Name").category(Basic),
            FieldDescriptor::new("email", "Email").category(Basic),
            FieldDescriptor::new("phone", "Phone Number").category(Phone),
            FieldDescriptor::new("mobilephone", "Mobile Phone").category(Phone),
            FieldDescriptor::new("fax", "Fax Number").category(Phone),
            FieldDescriptor::new("company", "Company").category(Work),
            FieldDescriptor::new("jobtitle", "Job Title").category(Work),
            FieldDescriptor::new("industry", "Industry").category(Work),
            FieldDescriptor::new("address", "Street Address").category(Address),
            FieldDescriptor::new("city", "City").category(Address),
            FieldDescriptor::new("state", "State/Region").category(Address),
            FieldDescriptor::new("zip", "Postal Code").category(Address),
            FieldDescriptor::new("country", "Country").category(Address),
            FieldDescriptor::new("website", "Website URL").category(Online),
            FieldDescriptor::new("twitterhandle", "Twitter Username").category(Online),
            FieldDescriptor::new("lifecyclestage", "Lifecycle Stage").category(Other),
            FieldDescriptor::new("hs_lead_status", "Lead Status"),
        ]
    }
}
