//! Customer records and their input forms.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::types::{CustomerId, CustomerStatus, Email, Phone};
use crate::validation::{ValidationErrors, required_text};

const NAME_REQUIRED: &str = "Name is required";
const EMAIL_INVALID: &str = "Valid email required";
const PHONE_INVALID: &str = "Valid phone required";
const COMPANY_REQUIRED: &str = "Company is required";
const STATUS_INVALID: &str = "Status required";

/// A customer as persisted in the `customers` slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub company: String,
    pub status: CustomerStatus,
}

/// Validated fields for a customer that has not been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub company: String,
    pub status: CustomerStatus,
}

/// A partial customer update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<Phone>,
    pub company: Option<String>,
    pub status: Option<CustomerStatus>,
}

impl CustomerPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.status.is_none()
    }
}

impl Entity for Customer {
    type Id = CustomerId;
    type New = NewCustomer;
    type Patch = CustomerPatch;

    const SLOT: &'static str = "customers";
    const KIND: &'static str = "customer";

    fn id(&self) -> &CustomerId {
        &self.id
    }

    fn generate_id() -> CustomerId {
        CustomerId::generate()
    }

    fn from_new(id: CustomerId, new: NewCustomer) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            status: new.status,
        }
    }

    fn apply(&mut self, patch: CustomerPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.company.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Raw customer input, as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: String,
}

impl CustomerForm {
    /// Check every field. Empty when the form can be submitted.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        self.parse().err().unwrap_or_default()
    }

    /// Validate and convert into [`NewCustomer`].
    ///
    /// # Errors
    ///
    /// Returns the full set of field errors if any rule fails.
    pub fn parse(&self) -> Result<NewCustomer, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = errors.check("name", required_text(&self.name, NAME_REQUIRED));
        let email = errors.check("email", parse_email(&self.email));
        let phone = errors.check("phone", parse_phone(&self.phone));
        let company = errors.check("company", required_text(&self.company, COMPANY_REQUIRED));
        let status = errors.check("status", parse_status(&self.status));

        match (name, email, phone, company, status) {
            (Some(name), Some(email), Some(phone), Some(company), Some(status))
                if errors.is_empty() =>
            {
                Ok(NewCustomer {
                    name,
                    email,
                    phone,
                    company,
                    status,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Customer> for CustomerForm {
    fn from(customer: &Customer) -> Self {
        Self {
            name: customer.name.clone(),
            email: customer.email.to_string(),
            phone: customer.phone.to_string(),
            company: customer.company.clone(),
            status: customer.status.to_string(),
        }
    }
}

/// Raw input for a partial update; only present fields are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPatchForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
}

impl CustomerPatchForm {
    /// Check the fields that are present.
    #[must_use]
    pub fn validate(&self) -> ValidationErrors {
        self.parse().err().unwrap_or_default()
    }

    /// Validate and convert into [`CustomerPatch`].
    ///
    /// # Errors
    ///
    /// Returns the field errors for any present field that fails its rule.
    pub fn parse(&self) -> Result<CustomerPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let patch = CustomerPatch {
            name: self
                .name
                .as_deref()
                .and_then(|v| errors.check("name", required_text(v, NAME_REQUIRED))),
            email: self
                .email
                .as_deref()
                .and_then(|v| errors.check("email", parse_email(v))),
            phone: self
                .phone
                .as_deref()
                .and_then(|v| errors.check("phone", parse_phone(v))),
            company: self
                .company
                .as_deref()
                .and_then(|v| errors.check("company", required_text(v, COMPANY_REQUIRED))),
            status: self
                .status
                .as_deref()
                .and_then(|v| errors.check("status", parse_status(v))),
        };
        if errors.is_empty() { Ok(patch) } else { Err(errors) }
    }
}

/// Validate a complete customer form.
#[must_use]
pub fn validate_customer(form: &CustomerForm) -> ValidationErrors {
    form.validate()
}

fn parse_email(value: &str) -> Result<Email, &'static str> {
    Email::parse(value).map_err(|_| EMAIL_INVALID)
}

fn parse_phone(value: &str) -> Result<Phone, &'static str> {
    Phone::parse(value).map_err(|_| PHONE_INVALID)
}

fn parse_status(value: &str) -> Result<CustomerStatus, &'static str> {
    value.parse().map_err(|_| STATUS_INVALID)
}
